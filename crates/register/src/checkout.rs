//! Checkout flow.
//!
//! A small state machine that turns a reviewed cart into a completed sale:
//!
//! 1. [`CheckoutFlow::begin_review`] opens the order summary (cart must be non-empty)
//! 2. [`CheckoutFlow::confirm`] snapshots notes and lines and enters `Processing`
//! 3. A [`PaymentProcessor`] settles the snapshot
//! 4. [`CheckoutFlow::complete`] clears the cart and produces a [`Receipt`],
//!    or returns to `Reviewing` with the cart intact if payment was declined
//!
//! Settlement is awaited outside the flow, so the caller's event loop stays
//! free while a payment is in flight. A second confirmation during that time
//! is rejected.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use till_core::{CartLine, CheckoutStatus, CurrencyCode};
use tracing::{debug, info, warn};

use crate::cart::CartLedger;
use crate::receipt::Receipt;

/// Errors raised by checkout transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Checkout needs at least one line in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A payment is already being processed.
    #[error("a payment is already processing")]
    AlreadyProcessing,

    /// The requested step is not valid from the current stage.
    #[error("cannot {action} while {status}")]
    InvalidTransition {
        status: CheckoutStatus,
        action: &'static str,
    },

    /// Settlement failed; the cart is unchanged.
    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),
}

/// Why a payment did not settle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("declined: {0}")]
    Declined(String),
}

/// Notes and lines captured at the moment payment began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSnapshot {
    pub notes: Option<String>,
    pub lines: Vec<CartLine>,
    pub captured_at: DateTime<Utc>,
}

/// Proof that a payment settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub settled_at: DateTime<Utc>,
}

/// Settles an order.
///
/// Implementations must not touch the cart; the flow applies the outcome.
pub trait PaymentProcessor: Send + Sync {
    /// Settle the order described by `order`.
    fn settle(
        &self,
        order: &OrderSnapshot,
    ) -> impl Future<Output = Result<PaymentConfirmation, PaymentError>> + Send;
}

/// A processor that waits for a fixed delay and always succeeds.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedProcessor {
    delay: Duration,
}

impl SimulatedProcessor {
    /// Create a processor that settles after `delay`.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl PaymentProcessor for SimulatedProcessor {
    async fn settle(&self, order: &OrderSnapshot) -> Result<PaymentConfirmation, PaymentError> {
        debug!(lines = order.lines.len(), delay_ms = self.delay.as_millis(), "Simulating settlement");
        tokio::time::sleep(self.delay).await;
        Ok(PaymentConfirmation {
            settled_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Default)]
enum Stage {
    #[default]
    Idle,
    Reviewing,
    Processing(OrderSnapshot),
    Completed(Box<Receipt>),
}

/// The checkout state machine.
#[derive(Debug, Clone, Default)]
pub struct CheckoutFlow {
    stage: Stage,
    last_failure: Option<PaymentError>,
}

impl CheckoutFlow {
    /// A flow in the `Idle` stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage.
    #[must_use]
    pub const fn status(&self) -> CheckoutStatus {
        match self.stage {
            Stage::Idle => CheckoutStatus::Idle,
            Stage::Reviewing => CheckoutStatus::Reviewing,
            Stage::Processing(_) => CheckoutStatus::Processing,
            Stage::Completed(_) => CheckoutStatus::Completed,
        }
    }

    /// The snapshot being settled, while `Processing`.
    #[must_use]
    pub const fn pending(&self) -> Option<&OrderSnapshot> {
        match &self.stage {
            Stage::Processing(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// The receipt of the last sale, while `Completed`.
    #[must_use]
    pub fn receipt(&self) -> Option<&Receipt> {
        match &self.stage {
            Stage::Completed(receipt) => Some(receipt.as_ref()),
            _ => None,
        }
    }

    /// The reason the most recent settlement was declined, until the next
    /// confirmation.
    #[must_use]
    pub const fn last_failure(&self) -> Option<&PaymentError> {
        self.last_failure.as_ref()
    }

    /// Open the order summary.
    ///
    /// Allowed from `Idle` and `Completed`; repeating it while `Reviewing`
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// `EmptyCart` if the cart has no lines, `AlreadyProcessing` while a
    /// payment is in flight.
    pub fn begin_review(&mut self, cart: &CartLedger) -> Result<(), CheckoutError> {
        if matches!(self.stage, Stage::Processing(_)) {
            return Err(CheckoutError::AlreadyProcessing);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if !matches!(self.stage, Stage::Reviewing) {
            debug!(from = %self.status(), "Checkout review opened");
        }
        self.stage = Stage::Reviewing;
        Ok(())
    }

    /// Close the order summary without changing anything.
    ///
    /// Also dismisses a completed sale. A no-op when `Idle`.
    ///
    /// # Errors
    ///
    /// `AlreadyProcessing` once payment has started.
    pub fn cancel(&mut self) -> Result<(), CheckoutError> {
        if matches!(self.stage, Stage::Processing(_)) {
            return Err(CheckoutError::AlreadyProcessing);
        }
        self.stage = Stage::Idle;
        Ok(())
    }

    /// Confirm the order and start payment.
    ///
    /// Captures `notes` and the cart's current lines. The returned snapshot
    /// is what the processor settles and what the receipt will show.
    ///
    /// # Errors
    ///
    /// `AlreadyProcessing` if a payment is in flight, `InvalidTransition`
    /// unless `Reviewing`, `EmptyCart` if the cart was emptied meanwhile.
    pub fn confirm(
        &mut self,
        cart: &CartLedger,
        notes: Option<String>,
    ) -> Result<OrderSnapshot, CheckoutError> {
        match self.stage {
            Stage::Reviewing => {}
            Stage::Processing(_) => return Err(CheckoutError::AlreadyProcessing),
            Stage::Idle | Stage::Completed(_) => {
                return Err(CheckoutError::InvalidTransition {
                    status: self.status(),
                    action: "confirm",
                });
            }
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let snapshot = OrderSnapshot {
            notes: notes.filter(|n| !n.trim().is_empty()),
            lines: cart.lines().to_vec(),
            captured_at: Utc::now(),
        };
        self.last_failure = None;
        self.stage = Stage::Processing(snapshot.clone());
        info!(lines = snapshot.lines.len(), "Checkout processing");
        Ok(snapshot)
    }

    /// Apply the settlement outcome.
    ///
    /// On success the cart is cleared (its pending undo too) and the flow
    /// moves to `Completed` with a receipt built from the snapshot. On
    /// failure the flow returns to `Reviewing` and the cart is left as is.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless `Processing`; `Payment` when the outcome
    /// was a failure.
    pub fn complete(
        &mut self,
        outcome: Result<PaymentConfirmation, PaymentError>,
        cart: &mut CartLedger,
        context: &ReceiptContext<'_>,
    ) -> Result<Receipt, CheckoutError> {
        let snapshot = match std::mem::take(&mut self.stage) {
            Stage::Processing(snapshot) => snapshot,
            other => {
                self.stage = other;
                return Err(CheckoutError::InvalidTransition {
                    status: self.status(),
                    action: "complete",
                });
            }
        };

        match outcome {
            Ok(confirmation) => {
                cart.clear();
                cart.discard_undo();
                let receipt = Receipt::from_snapshot(
                    snapshot,
                    context.store_name,
                    context.currency,
                    context.tax_rate,
                    confirmation.settled_at,
                );
                info!(receipt_id = %receipt.id, total = %receipt.totals.total, "Checkout completed");
                self.stage = Stage::Completed(Box::new(receipt.clone()));
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, "Payment failed, returning to review");
                self.stage = Stage::Reviewing;
                self.last_failure = Some(e.clone());
                Err(CheckoutError::Payment(e))
            }
        }
    }
}

/// Store details stamped onto receipts.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptContext<'a> {
    pub store_name: &'a str,
    pub currency: CurrencyCode,
    pub tax_rate: Decimal,
}
