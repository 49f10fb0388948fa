//! Persistence adapter for the register's cart and filters.

use till_core::CartLine;
use tracing::warn;

use super::{KeyValueStore, StorageError, keys};

/// The state restored at session start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedState {
    pub cart: Vec<CartLine>,
    pub search: String,
    pub category: Option<String>,
}

/// Reads and writes register state under the fixed storage keys.
///
/// The cart is stored as JSON; the search text and category are stored as
/// raw strings. A missing category key means "no filter".
#[derive(Debug)]
pub struct SalesStorage<S> {
    store: S,
}

impl<S: KeyValueStore> SalesStorage<S> {
    /// Wrap a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Restore each value independently, defaulting whatever is missing,
    /// unreadable or malformed.
    pub fn load(&self) -> SavedState {
        let cart = self
            .read(keys::CART)
            .and_then(|json| match serde_json::from_str::<Vec<CartLine>>(&json) {
                Ok(lines) => Some(lines),
                Err(e) => {
                    warn!(key = keys::CART, error = %e, "Discarding malformed saved cart");
                    None
                }
            })
            .unwrap_or_default();

        let search = self.read(keys::SEARCH_TERM).unwrap_or_default();
        let category = self.read(keys::SELECTED_CATEGORY).filter(|c| !c.is_empty());

        SavedState {
            cart,
            search,
            category,
        }
    }

    /// Write the cart, search text and category.
    ///
    /// # Errors
    ///
    /// Returns the first write that failed.
    pub fn save(
        &mut self,
        cart: &[CartLine],
        search: &str,
        category: Option<&str>,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart)?;
        self.store.set(keys::CART, &json)?;
        self.store.set(keys::SEARCH_TERM, search)?;
        match category {
            Some(category) => self.store.set(keys::SELECTED_CATEGORY, category),
            None => self.store.remove(keys::SELECTED_CATEGORY),
        }
    }

    /// Delete everything, including keys this adapter does not own.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.clear()
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            warn!(key, error = %e, "Failed to read saved value");
            None
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use till_core::{Item, ItemId};

    use super::*;
    use crate::storage::MemoryStore;

    fn line(id: &str, quantity: u32) -> CartLine {
        CartLine {
            item: Arc::new(Item {
                id: ItemId::new(id),
                name: format!("Product {id}"),
                price: Decimal::new(2999, 2),
                image_ref: "https://via.placeholder.com/150".to_string(),
                category: "Category A".to_string(),
                barcode: None,
            }),
            quantity,
        }
    }

    #[test]
    fn test_empty_store_loads_defaults() {
        let storage = SalesStorage::new(MemoryStore::new());
        assert_eq!(storage.load(), SavedState::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut storage = SalesStorage::new(MemoryStore::new());
        let cart = vec![line("1", 2), line("3", 1)];
        storage.save(&cart, "prod", Some("Category A")).unwrap();

        let state = storage.load();
        assert_eq!(state.cart, cart);
        assert_eq!(state.search, "prod");
        assert_eq!(state.category.as_deref(), Some("Category A"));
    }

    #[test]
    fn test_search_and_category_stored_as_raw_strings() {
        let mut storage = SalesStorage::new(MemoryStore::new());
        storage.save(&[], "tea", Some("Drinks")).unwrap();

        let store = storage.store();
        assert_eq!(store.get(keys::SEARCH_TERM).unwrap().as_deref(), Some("tea"));
        assert_eq!(
            store.get(keys::SELECTED_CATEGORY).unwrap().as_deref(),
            Some("Drinks")
        );
        assert_eq!(store.get(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_no_category_removes_key() {
        let mut storage = SalesStorage::new(MemoryStore::new());
        storage.save(&[], "", Some("Drinks")).unwrap();
        storage.save(&[], "", None).unwrap();

        assert_eq!(storage.store().get(keys::SELECTED_CATEGORY).unwrap(), None);
        assert_eq!(storage.load().category, None);
    }

    #[test]
    fn test_malformed_cart_does_not_affect_other_values() {
        let mut store = MemoryStore::new();
        store.set(keys::CART, "{not json").unwrap();
        store.set(keys::SEARCH_TERM, "biscuits").unwrap();
        store.set(keys::SELECTED_CATEGORY, "Snacks").unwrap();

        let state = SalesStorage::new(store).load();
        assert!(state.cart.is_empty());
        assert_eq!(state.search, "biscuits");
        assert_eq!(state.category.as_deref(), Some("Snacks"));
    }

    #[test]
    fn test_loads_cart_written_by_dashboard() {
        let mut store = MemoryStore::new();
        store
            .set(
                keys::CART,
                r#"[{"product":{"id":"1","name":"Product 1","price":29.99,"image":"https://via.placeholder.com/150","category":"Category A"},"quantity":3}]"#,
            )
            .unwrap();

        let state = SalesStorage::new(store).load();
        assert_eq!(state.cart.len(), 1);
        assert_eq!(state.cart[0].quantity, 3);
        assert_eq!(state.cart[0].item.price, Decimal::new(2999, 2));
    }
}
