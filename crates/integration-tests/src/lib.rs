//! Integration tests for Till.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p till-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `register_flow` - Cart behavior through the sales session
//! - `checkout_flow` - Review, settlement and receipts
//! - `persistence` - State mirrored to a storage file and restored
//!
//! The tests share a [`TestContext`] that gives each test its own storage
//! file under the system temp directory.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use till_core::{Barcode, Item, ItemId};
use till_register::catalog::Catalog;
use till_register::config::RegisterConfig;
use till_register::session::SalesSession;
use till_register::storage::FileStore;

/// Per-test storage location and configuration.
pub struct TestContext {
    dir: PathBuf,
    pub config: RegisterConfig,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("till-it-{}", uuid::Uuid::new_v4()));
        let config = RegisterConfig {
            store_name: "Test Store".to_string(),
            processing_delay: Duration::from_millis(1800),
            storage_path: dir.join("storage.json"),
            ..RegisterConfig::default()
        };
        Self { dir, config }
    }

    /// Path of the storage file.
    #[must_use]
    pub fn storage_path(&self) -> &Path {
        &self.config.storage_path
    }

    /// Open a session over the storage file, as a fresh process would.
    #[must_use]
    pub fn open(&self, catalog: Catalog) -> SalesSession<FileStore> {
        let store = FileStore::open(self.storage_path()).expect("Failed to open storage");
        SalesSession::open(self.config.clone(), catalog, store)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// Two items: A at 10.00 and B at 20.00.
#[must_use]
pub fn two_item_catalog() -> Catalog {
    let item = |id: &str, price: i64, category: &str, barcode: &str| Item {
        id: ItemId::new(id),
        name: format!("Item {id}"),
        price: Decimal::new(price, 0),
        image_ref: String::new(),
        category: category.to_string(),
        barcode: Some(Barcode::parse(barcode).expect("valid barcode")),
    };
    Catalog::new(vec![
        item("A", 10, "Snacks", "1000"),
        item("B", 20, "Drinks", "2000"),
    ])
    .expect("valid catalog")
}
