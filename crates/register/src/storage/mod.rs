//! Device-local key-value storage.
//!
//! # Architecture
//!
//! - [`KeyValueStore`] is the raw string store, scoped to one device.
//!   [`MemoryStore`] keeps values in process;
//!   [`FileStore`] mirrors them to a single JSON file.
//! - [`SalesStorage`] is the persistence adapter on top: it knows the fixed
//!   keys and how the cart and filters are encoded, and treats anything it
//!   cannot decode as absent.
//!
//! There is no versioning or conflict resolution. The last write wins.

mod file;
mod memory;
mod sales;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sales::{SalesStorage, SavedState};

use thiserror::Error;

/// Keys under which register state is stored.
pub mod keys {
    /// Serialized cart lines (JSON array).
    pub const CART: &str = "sales_cart";

    /// Catalog search text (raw string).
    pub const SEARCH_TERM: &str = "sales_searchTerm";

    /// Selected category filter (raw string; absent means no filter).
    pub const SELECTED_CATEGORY: &str = "sales_selectedCategory";
}

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A string-to-string store scoped to one device or profile.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Delete every key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn clear(&mut self) -> Result<(), StorageError>;
}
