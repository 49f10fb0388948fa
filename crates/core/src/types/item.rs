//! Catalog items and cart lines.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Barcode, ItemId};

/// A purchasable catalog item.
///
/// Items are immutable once loaded; carts hold them behind an [`Arc`] so a
/// line shares the catalog's copy instead of cloning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique catalog identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Unit price in the register's currency. Never negative.
    pub price: Decimal,
    /// Image URL or asset reference.
    #[serde(rename = "image")]
    pub image_ref: String,
    /// Category used by the catalog filter.
    pub category: String,
    /// Barcode printed on the product, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<Barcode>,
}

/// One line of a cart: an item and how many of it.
///
/// Serialized as `{"product": {...}, "quantity": n}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The item on this line.
    #[serde(rename = "product")]
    pub item: Arc<Item>,
    /// Quantity, always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// Price of the whole line (`price × quantity`), saturating at
    /// [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.item
            .price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}
