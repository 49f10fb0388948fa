//! Status enums for the register.

use serde::{Deserialize, Serialize};

/// Stage of the checkout flow.
///
/// ```text
/// Idle -> Reviewing -> Processing -> Completed -> (Idle)
///          |    ^           |
///          v    +-----------+  payment declined, cart intact
///         Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    /// No checkout in progress.
    #[default]
    Idle,
    /// The order summary is open and awaiting confirmation.
    Reviewing,
    /// Payment settlement is in flight.
    Processing,
    /// The last sale settled; the cart has been cleared.
    Completed,
}

impl std::fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Reviewing => write!(f, "reviewing"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Severity of a transient user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    #[default]
    Info,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Info => write!(f, "info"),
            Self::Error => write!(f, "error"),
        }
    }
}
