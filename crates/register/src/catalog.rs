//! Product catalog.
//!
//! The catalog is the static list of purchasable items. It is validated once
//! when loaded and never mutated afterwards; items are handed out as
//! [`Arc<Item>`] so cart lines share them.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use till_core::{Barcode, Item, ItemId};
use tracing::debug;

/// Highest unit price a catalog item may carry.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Errors that can occur when loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two items share an id.
    #[error("duplicate item id: {0}")]
    DuplicateId(ItemId),

    /// An item has a negative price.
    #[error("item {id} has a negative price ({price})")]
    NegativePrice { id: ItemId, price: Decimal },

    /// An item's price is above [`MAX_PRICE`].
    #[error("item {id} has a price above 1000000000 ({price})")]
    PriceTooHigh { id: ItemId, price: Decimal },

    /// The catalog file could not be read.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog JSON is malformed.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An immutable, validated list of items.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Arc<Item>>,
}

impl Catalog {
    /// Build a catalog, validating unique ids and prices in
    /// `0..=MAX_PRICE`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId`, `CatalogError::NegativePrice` or
    /// `CatalogError::PriceTooHigh`.
    pub fn new(items: Vec<Item>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.price < Decimal::ZERO {
                return Err(CatalogError::NegativePrice {
                    id: item.id.clone(),
                    price: item.price,
                });
            }
            if item.price > MAX_PRICE {
                return Err(CatalogError::PriceTooHigh {
                    id: item.id.clone(),
                    price: item.price,
                });
            }
            if !seen.insert(&item.id) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
        }

        Ok(Self {
            items: items.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse a catalog from a JSON array of items.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<Item> = serde_json::from_str(json)?;
        Self::new(items)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        debug!(path = %path.display(), items = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    /// The built-in demo catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let item = |id: &str, name: &str, cents: i64, category: &str, barcode: &str| {
            Arc::new(Item {
                id: ItemId::new(id),
                name: name.to_string(),
                price: Decimal::new(cents, 2),
                image_ref: "https://via.placeholder.com/150".to_string(),
                category: category.to_string(),
                barcode: Barcode::parse(barcode).ok(),
            })
        };

        Self {
            items: vec![
                item("1", "Product 1", 2999, "Category A", "8901000000011"),
                item("2", "Product 2", 3999, "Category B", "8901000000028"),
                item("3", "Product 3", 1999, "Category A", "8901000000035"),
            ],
        }
    }

    /// All items in catalog order.
    #[must_use]
    pub fn items(&self) -> &[Arc<Item>] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Arc<Item>> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Find the item carrying `code`, scanning the catalog in order.
    #[must_use]
    pub fn find_by_barcode(&self, code: &Barcode) -> Option<&Arc<Item>> {
        self.items
            .iter()
            .find(|item| item.barcode.as_ref() == Some(code))
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for item in &self.items {
            if !categories.contains(&item.category.as_str()) {
                categories.push(&item.category);
            }
        }
        categories
    }

    /// Items whose name contains `search` (case-insensitive) and, when a
    /// category is selected, whose category matches it exactly.
    #[must_use]
    pub fn filter(&self, search: &str, category: Option<&str>) -> Vec<&Arc<Item>> {
        let needle = search.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .filter(|item| category.is_none_or(|c| item.category == c))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, price: Decimal, category: &str) -> Item {
        Item {
            id: ItemId::new(id),
            name: name.to_string(),
            price,
            image_ref: String::new(),
            category: category.to_string(),
            barcode: None,
        }
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = Catalog::new(vec![
            item("a", "Apple", Decimal::ONE, "Fruit"),
            item("a", "Apricot", Decimal::ONE, "Fruit"),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id.as_str() == "a"));
    }

    #[test]
    fn test_rejects_negative_price() {
        let result = Catalog::new(vec![item("a", "Apple", Decimal::new(-1, 0), "Fruit")]);
        assert!(matches!(result, Err(CatalogError::NegativePrice { .. })));
    }

    #[test]
    fn test_rejects_price_above_limit() {
        let price = Decimal::from_str_exact("30000000000000000000").unwrap();
        let result = Catalog::new(vec![item("a", "Gold Bar", price, "Metals")]);
        assert!(matches!(result, Err(CatalogError::PriceTooHigh { id, .. }) if id.as_str() == "a"));

        assert!(Catalog::new(vec![item("b", "Car", MAX_PRICE, "Vehicles")]).is_ok());
    }

    #[test]
    fn test_accepts_free_items() {
        let catalog = Catalog::new(vec![item("bag", "Bag", Decimal::ZERO, "Misc")]).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_find_by_barcode() {
        let catalog = Catalog::builtin();
        let code = Barcode::parse("8901000000028").unwrap();
        let found = catalog.find_by_barcode(&code).unwrap();
        assert_eq!(found.id.as_str(), "2");
    }

    #[test]
    fn test_find_by_barcode_not_found() {
        let catalog = Catalog::builtin();
        let code = Barcode::parse("X1").unwrap();
        assert!(catalog.find_by_barcode(&code).is_none());
    }

    #[test]
    fn test_categories_first_seen_order() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.categories(), vec!["Category A", "Category B"]);
    }

    #[test]
    fn test_filter_by_search_is_case_insensitive() {
        let catalog = Catalog::new(vec![
            item("1", "Green Tea", Decimal::ONE, "Drinks"),
            item("2", "Black Coffee", Decimal::ONE, "Drinks"),
            item("3", "Tea Biscuits", Decimal::ONE, "Snacks"),
        ])
        .unwrap();

        let names: Vec<&str> = catalog
            .filter("TEA", None)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Green Tea", "Tea Biscuits"]);

        let names: Vec<&str> = catalog
            .filter("tea", Some("Snacks"))
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Tea Biscuits"]);
    }

    #[test]
    fn test_filter_empty_search_matches_all() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.filter("", None).len(), 3);
        assert_eq!(catalog.filter("", Some("Category A")).len(), 2);
    }

    #[test]
    fn test_from_json() {
        let catalog = Catalog::from_json(
            r#"[{"id":"x","name":"Widget","price":"2.50","image":"w.png","category":"Tools","barcode":"X1"}]"#,
        )
        .unwrap();
        let code = Barcode::parse("X1").unwrap();
        assert_eq!(
            catalog.find_by_barcode(&code).unwrap().price,
            Decimal::new(250, 2)
        );
    }
}
