//! Catalog listing.

use till_register::session::SalesSession;
use till_register::storage::KeyValueStore;

use crate::output;

/// Print catalog items matching the given filters, falling back to the
/// saved search and category. The saved filters are not changed.
pub fn list<S: KeyValueStore>(
    session: &SalesSession<S>,
    search: Option<&str>,
    category: Option<&str>,
) {
    let search = search.unwrap_or_else(|| session.search());
    let category = category.or_else(|| session.category());
    let items = session.catalog().filter(search, category);
    output::catalog(&items, session.cart(), session.config().currency);
}
