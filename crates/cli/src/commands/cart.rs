//! Cart commands.

use till_core::ItemId;
use till_register::session::{CartUpdate, SalesSession};
use till_register::storage::KeyValueStore;

use crate::output;

/// Print the cart with its totals.
pub fn show<S: KeyValueStore>(session: &SalesSession<S>) {
    output::cart(
        session.cart(),
        &session.totals(),
        session.config().currency,
        session.config().tax_percent(),
    );
}

pub fn add<S: KeyValueStore>(session: &mut SalesSession<S>, id: &str) {
    let update = session.add_item(&ItemId::new(id));
    report(session, &update);
}

pub fn scan<S: KeyValueStore>(session: &mut SalesSession<S>, code: &str) {
    let update = session.scan(code);
    report(session, &update);
}

pub fn remove<S: KeyValueStore>(session: &mut SalesSession<S>, id: &str) {
    let update = session.remove_item(&ItemId::new(id));
    report(session, &update);
}

pub fn undo<S: KeyValueStore>(session: &mut SalesSession<S>) {
    let update = session.undo_remove();
    report(session, &update);
}

pub fn quantity<S: KeyValueStore>(session: &mut SalesSession<S>, id: &str, delta: i64) {
    let update = session.update_quantity(&ItemId::new(id), delta);
    report(session, &update);
}

pub fn clear<S: KeyValueStore>(session: &mut SalesSession<S>) {
    let update = session.clear();
    report(session, &update);
}

/// Print the notice, then the totals if the cart changed.
fn report<S: KeyValueStore>(session: &SalesSession<S>, update: &CartUpdate) {
    output::notice(&update.notice);
    if !update.notice.is_error() {
        output::summary(
            &update.totals,
            session.config().currency,
            session.config().tax_percent(),
        );
    }
}
