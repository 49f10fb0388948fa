//! Cart ledger.
//!
//! An ordered list of [`CartLine`]s, one per distinct item id, in the order
//! items were first added. Quantities are always at least 1: the only way a
//! line leaves the cart is an explicit removal (or clearing the whole cart).
//!
//! Quantities are capped at [`MAX_QUANTITY`] and totals saturate rather than
//! overflow, so no stored cart can make them panic.
//!
//! The most recent removal is kept aside so it can be undone. Undo is
//! single-level; a newer removal replaces the older one.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use till_core::{CartLine, Item, ItemId};

/// Largest quantity a single line may hold.
pub const MAX_QUANTITY: u32 = 9_999;

/// Errors reported by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// No line exists for the item.
    #[error("item {0} is not in the cart")]
    ItemNotFound(ItemId),
}

/// Subtotal, tax and total derived from the cart's lines.
///
/// Always recomputed from the lines; never stored alongside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Totals of an empty cart.
    pub const ZERO: Self = Self {
        subtotal: Decimal::ZERO,
        tax: Decimal::ZERO,
        total: Decimal::ZERO,
    };
}

/// Compute totals for `lines` at `tax_rate` (a fraction, `0.05` for 5%).
///
/// The amounts are exact; rounding is left to display. Amounts beyond
/// [`Decimal::MAX`] saturate.
#[must_use]
pub fn compute_totals(lines: &[CartLine], tax_rate: Decimal) -> CartTotals {
    let subtotal = lines
        .iter()
        .map(CartLine::line_total)
        .fold(Decimal::ZERO, |sum, amount| {
            sum.checked_add(amount).unwrap_or(Decimal::MAX)
        });
    let tax = subtotal.checked_mul(tax_rate).unwrap_or(Decimal::MAX);
    CartTotals {
        subtotal,
        tax,
        total: subtotal.checked_add(tax).unwrap_or(Decimal::MAX),
    }
}

/// The in-memory collection of items and quantities for the current sale.
#[derive(Debug, Clone, Default)]
pub struct CartLedger {
    lines: Vec<CartLine>,
    last_removed: Option<CartLine>,
}

impl CartLedger {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            last_removed: None,
        }
    }

    /// Rebuild a cart from previously saved lines.
    ///
    /// Lines for an id that already appeared are merged into the first one
    /// and quantities are clamped to `1..=MAX_QUANTITY`, so the result upholds the ledger
    /// invariants whatever was stored.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut ledger = Self::new();
        for line in lines {
            ledger.merge_line(line);
        }
        ledger
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn line(&self, id: &ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.item.id == id)
    }

    /// Whether the item is already in the cart.
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.line(id).is_some()
    }

    /// Add one unit of `item`.
    ///
    /// Increments the existing line (up to [`MAX_QUANTITY`]) or appends a
    /// new line with quantity 1. Returns the line as it now stands.
    pub fn add_item(&mut self, item: Arc<Item>) -> CartLine {
        if let Some(line) = self.line_mut(&item.id) {
            line.quantity = line.quantity.saturating_add(1).min(MAX_QUANTITY);
            return line.clone();
        }
        let line = CartLine { item, quantity: 1 };
        self.lines.push(line.clone());
        line
    }

    /// Remove the line for `id` and keep it for [`undo_remove`](Self::undo_remove).
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if no line exists for `id`; the
    /// previously removed line stays recoverable in that case.
    pub fn remove_item(&mut self, id: &ItemId) -> Result<CartLine, CartError> {
        let index = self
            .position(id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;
        let removed = self.lines.remove(index);
        self.last_removed = Some(removed.clone());
        Ok(removed)
    }

    /// The line the next [`undo_remove`](Self::undo_remove) would restore.
    #[must_use]
    pub const fn last_removed(&self) -> Option<&CartLine> {
        self.last_removed.as_ref()
    }

    /// Re-insert the most recently removed line at the end of the cart.
    ///
    /// If the same item was added again since the removal, the restored
    /// quantity is merged into that line instead. Returns `None` when there
    /// is nothing to undo.
    pub fn undo_remove(&mut self) -> Option<CartLine> {
        let line = self.last_removed.take()?;
        Some(self.merge_line(line))
    }

    /// Forget the pending undo.
    pub fn discard_undo(&mut self) {
        self.last_removed = None;
    }

    /// Change a line's quantity by `delta`, kept within `1..=MAX_QUANTITY`.
    ///
    /// Returns the updated line, or `None` if the item is not in the cart.
    pub fn update_quantity(&mut self, id: &ItemId, delta: i64) -> Option<CartLine> {
        let line = self.line_mut(id)?;
        let next = i64::from(line.quantity)
            .saturating_add(delta)
            .clamp(1, i64::from(MAX_QUANTITY));
        line.quantity = u32::try_from(next).unwrap_or(MAX_QUANTITY);
        Some(line.clone())
    }

    /// Empty the cart. A pending undo survives.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Subtotal, tax and total at `tax_rate`.
    #[must_use]
    pub fn totals(&self, tax_rate: Decimal) -> CartTotals {
        compute_totals(&self.lines, tax_rate)
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Pre-tax subtotal divided by the number of lines; zero when empty.
    #[must_use]
    pub fn average_line_value(&self) -> Decimal {
        if self.lines.is_empty() {
            return Decimal::ZERO;
        }
        compute_totals(&self.lines, Decimal::ZERO).subtotal / Decimal::from(self.lines.len())
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.lines.iter().position(|line| &line.item.id == id)
    }

    fn line_mut(&mut self, id: &ItemId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| &line.item.id == id)
    }

    fn merge_line(&mut self, line: CartLine) -> CartLine {
        let quantity = line.quantity.clamp(1, MAX_QUANTITY);
        if let Some(existing) = self.line_mut(&line.item.id) {
            existing.quantity = existing.quantity.saturating_add(quantity).min(MAX_QUANTITY);
            return existing.clone();
        }
        let line = CartLine {
            item: line.item,
            quantity,
        };
        self.lines.push(line.clone());
        line
    }
}
