//! Unified error handling.
//!
//! Each module has its own error enum; [`Error`] wraps them for callers that
//! drive several modules at once, such as the CLI.

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::notice::Notice;
use crate::storage::StorageError;

/// Register-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog could not be loaded or is invalid.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A cart operation referred to a missing line.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A checkout transition was rejected or payment failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// A cashier-facing notice for this error.
    ///
    /// Storage and catalog failures are reported generically; the detail goes
    /// to the log.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Cart(err) => Notice::error(format!("Cart: {err}")),
            Self::Checkout(CheckoutError::Payment(err)) => {
                Notice::error(format!("Payment failed ({err}). Please try again."))
            }
            Self::Checkout(err) => Notice::error(format!("Checkout: {err}")),
            Self::Config(err) => Notice::error(err.to_string()),
            Self::Catalog(_) => Notice::error("Product catalog is unavailable"),
            Self::Storage(_) => Notice::error("Could not access local storage"),
        }
    }
}

/// Result type alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
