//! Checkout command.
//!
//! Checkout is split in two so the shell can keep serving input while the
//! payment settles: [`start`] reviews and confirms, [`finish`] applies the
//! settlement outcome.

use till_register::checkout::{
    OrderSnapshot, PaymentConfirmation, PaymentError, PaymentProcessor, SimulatedProcessor,
};
use till_register::notice::Notice;
use till_register::session::SalesSession;
use till_register::storage::KeyValueStore;
use tracing::info;

use crate::output;

/// Review the cart, settle payment and print the receipt.
///
/// A declined payment leaves the cart untouched.
///
/// # Errors
///
/// Returns an error if the cart is empty or payment fails.
pub async fn run<S: KeyValueStore>(
    session: &mut SalesSession<S>,
    notes: Option<String>,
) -> till_register::Result<()> {
    let snapshot = start(session, notes)?;
    let processor = SimulatedProcessor::new(session.config().processing_delay);
    let outcome = processor.settle(&snapshot).await;
    finish(session, outcome)
}

/// Print the order summary and confirm it, moving the flow to processing.
///
/// # Errors
///
/// Returns an error (already shown as a notice) if the cart is empty or a
/// payment is already processing.
pub fn start<S: KeyValueStore>(
    session: &mut SalesSession<S>,
    notes: Option<String>,
) -> till_register::Result<OrderSnapshot> {
    report(review_and_confirm(session, notes))
}

/// Apply a settlement outcome and print the receipt.
///
/// # Errors
///
/// Returns an error (already shown as a notice) if the payment failed.
pub fn finish<S: KeyValueStore>(
    session: &mut SalesSession<S>,
    outcome: Result<PaymentConfirmation, PaymentError>,
) -> till_register::Result<()> {
    report(complete(session, outcome))
}

fn review_and_confirm<S: KeyValueStore>(
    session: &mut SalesSession<S>,
    notes: Option<String>,
) -> till_register::Result<OrderSnapshot> {
    let totals = session.begin_checkout()?;
    output::cart(
        session.cart(),
        &totals,
        session.config().currency,
        session.config().tax_percent(),
    );

    let snapshot = session.confirm_checkout(notes)?;
    output::notice(&Notice::info("Processing payment..."));
    Ok(snapshot)
}

fn complete<S: KeyValueStore>(
    session: &mut SalesSession<S>,
    outcome: Result<PaymentConfirmation, PaymentError>,
) -> till_register::Result<()> {
    let sale = session.finish_checkout(outcome)?;

    output::notice(&sale.notice);
    output::receipt(&sale.receipt);
    info!(receipt_id = %sale.receipt.id, "Receipt printed");

    session.cancel_checkout()?;
    Ok(())
}

fn report<T>(result: till_register::Result<T>) -> till_register::Result<T> {
    if let Err(e) = &result {
        output::notice(&e.notice());
    }
    result
}
