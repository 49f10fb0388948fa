//! Sale receipts.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use till_core::{CartLine, CurrencyCode, Price};
use uuid::Uuid;

use crate::cart::{CartTotals, compute_totals};
use crate::checkout::OrderSnapshot;

/// The artifact of a completed sale.
///
/// Built from the [`OrderSnapshot`] captured when payment started, so it
/// reflects the cart at that instant regardless of what happened after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub id: Uuid,
    pub store_name: String,
    pub completed_at: DateTime<Utc>,
    pub currency: CurrencyCode,
    pub notes: Option<String>,
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    /// Tax rate the totals were computed at, as a fraction.
    pub tax_rate: Decimal,
}

impl Receipt {
    /// Build a receipt for a settled order.
    #[must_use]
    pub fn from_snapshot(
        snapshot: OrderSnapshot,
        store_name: &str,
        currency: CurrencyCode,
        tax_rate: Decimal,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let totals = compute_totals(&snapshot.lines, tax_rate);
        Self {
            id: Uuid::new_v4(),
            store_name: store_name.to_string(),
            completed_at,
            currency,
            notes: snapshot.notes,
            lines: snapshot.lines,
            totals,
            tax_rate,
        }
    }

    /// Total units sold.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    fn price(&self, amount: Decimal) -> Price {
        Price::new(amount, self.currency)
    }

    /// Plain-text rendering for printing.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}", self.store_name);
        let _ = writeln!(out, "Receipt {}", self.id);
        let _ = writeln!(out, "{}", self.completed_at.format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(out, "{}", "-".repeat(40));
        for line in &self.lines {
            let _ = writeln!(
                out,
                "{:<24} x{:<4} {:>9}",
                line.item.name,
                line.quantity,
                self.price(line.line_total()).to_string()
            );
        }
        let _ = writeln!(out, "{}", "-".repeat(40));
        let _ = writeln!(out, "{:<30} {:>9}", "Subtotal", self.price(self.totals.subtotal).to_string());
        let tax_label = format!("Tax ({}%)", (self.tax_rate * Decimal::ONE_HUNDRED).normalize());
        let _ = writeln!(out, "{:<30} {:>9}", tax_label, self.price(self.totals.tax).to_string());
        let _ = writeln!(out, "{:<30} {:>9}", "Total", self.price(self.totals.total).to_string());
        let _ = writeln!(out, "Order Notes: {}", self.notes.as_deref().unwrap_or("-"));
        out
    }
}
