//! Terminal rendering for register state.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use rust_decimal::Decimal;
use till_core::{CurrencyCode, Item, Price};
use till_register::cart::{CartLedger, CartTotals};
use till_register::notice::Notice;
use till_register::receipt::Receipt;

pub fn notice(notice: &Notice) {
    println!("{notice}");
}

/// Catalog table; items already in the cart are marked.
pub fn catalog(items: &[&Arc<Item>], cart: &CartLedger, currency: CurrencyCode) {
    if items.is_empty() {
        println!("No products match.");
        return;
    }
    println!(
        "{:<6} {:<24} {:<14} {:>10}  {:<14} {}",
        "ID", "NAME", "CATEGORY", "PRICE", "BARCODE", "CART"
    );
    for item in items {
        println!(
            "{:<6} {:<24} {:<14} {:>10}  {:<14} {}",
            item.id.as_str(),
            item.name,
            item.category,
            Price::new(item.price, currency).to_string(),
            item.barcode.as_ref().map_or("-", |code| code.as_str()),
            in_cart_badge(cart, item),
        );
    }
}

fn in_cart_badge(cart: &CartLedger, item: &Item) -> &'static str {
    if cart.contains(&item.id) { "In Cart" } else { "" }
}

pub fn cart(cart: &CartLedger, totals: &CartTotals, currency: CurrencyCode, tax_percent: Decimal) {
    if cart.is_empty() {
        println!("Cart is empty.");
        return;
    }
    for line in cart.lines() {
        println!(
            "{:<6} {:<24} x{:<4} {:>10}",
            line.item.id.as_str(),
            line.item.name,
            line.quantity,
            Price::new(line.line_total(), currency).to_string(),
        );
    }
    println!("{} item(s) in {} line(s)", cart.total_items(), cart.len());
    println!(
        "{:<37} {:>10}",
        "Avg. line value",
        Price::new(cart.average_line_value(), currency).to_string()
    );
    summary(totals, currency, tax_percent);
}

pub fn summary(totals: &CartTotals, currency: CurrencyCode, tax_percent: Decimal) {
    let price = |amount| Price::new(amount, currency).to_string();
    println!("{:<37} {:>10}", "Subtotal", price(totals.subtotal));
    println!("{:<37} {:>10}", format!("Tax ({tax_percent}%)"), price(totals.tax));
    println!("{:<37} {:>10}", "Total", price(totals.total));
}

pub fn receipt(receipt: &Receipt) {
    print!("{}", receipt.render());
}
