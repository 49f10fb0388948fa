//! Sales session.
//!
//! The command surface a register UI calls. It owns the catalog, cart ledger,
//! catalog filters, checkout flow and storage, and after every cart or filter
//! mutation it writes the new state to storage. Mutators return the derived
//! state and a notice instead of triggering any re-render themselves.

use std::sync::Arc;

use till_core::{Barcode, CartLine, CheckoutStatus, Item, ItemId};
use tracing::{debug, info, instrument, warn};

use crate::cart::{CartLedger, CartTotals};
use crate::catalog::Catalog;
use crate::checkout::{
    CheckoutError, CheckoutFlow, OrderSnapshot, PaymentConfirmation, PaymentError,
    PaymentProcessor, ReceiptContext,
};
use crate::config::RegisterConfig;
use crate::notice::Notice;
use crate::receipt::Receipt;
use crate::storage::{KeyValueStore, SalesStorage, StorageError};

/// Result of a cart mutation: the new totals and what to tell the cashier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartUpdate {
    pub totals: CartTotals,
    pub notice: Notice,
}

/// A settled sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSale {
    pub receipt: Receipt,
    pub notice: Notice,
}

/// One register session.
#[derive(Debug)]
pub struct SalesSession<S> {
    config: RegisterConfig,
    catalog: Catalog,
    cart: CartLedger,
    search: String,
    category: Option<String>,
    checkout: CheckoutFlow,
    storage: SalesStorage<S>,
}

impl<S: KeyValueStore> SalesSession<S> {
    /// Start a session, restoring the cart and filters from `store`.
    ///
    /// Saved lines whose item is still in the catalog are re-pointed at the
    /// catalog's copy; others keep the saved item.
    pub fn open(config: RegisterConfig, catalog: Catalog, store: S) -> Self {
        let storage = SalesStorage::new(store);
        let saved = storage.load();

        let lines = saved.cart.into_iter().map(|line| match catalog.get(&line.item.id) {
            Some(item) => CartLine {
                item: Arc::clone(item),
                quantity: line.quantity,
            },
            None => line,
        });
        let cart = CartLedger::from_lines(lines);

        info!(
            lines = cart.len(),
            search = %saved.search,
            category = ?saved.category,
            "Sales session opened"
        );

        Self {
            config,
            catalog,
            cart,
            search: saved.search,
            category: saved.category,
            checkout: CheckoutFlow::new(),
            storage,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RegisterConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartLedger {
        &self.cart
    }

    #[must_use]
    pub const fn checkout_flow(&self) -> &CheckoutFlow {
        &self.checkout
    }

    #[must_use]
    pub fn checkout_status(&self) -> CheckoutStatus {
        self.checkout.status()
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        self.storage.store()
    }

    /// Current totals at the configured tax rate.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.cart.totals(self.config.tax_rate)
    }

    /// Catalog search text.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Selected category filter.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Catalog items matching the current search and category.
    #[must_use]
    pub fn visible_items(&self) -> Vec<&Arc<Item>> {
        self.catalog.filter(&self.search, self.category.as_deref())
    }

    /// Add one unit of a catalog item.
    #[instrument(skip_all, fields(item_id = %id))]
    pub fn add_item(&mut self, id: &ItemId) -> CartUpdate {
        let Some(item) = self.catalog.get(id).map(Arc::clone) else {
            debug!("Item not in catalog");
            return self.update(Notice::error(format!("Product {id} not found")));
        };
        self.add(item)
    }

    /// Add the item carrying a scanned barcode.
    #[instrument(skip(self))]
    pub fn scan(&mut self, input: &str) -> CartUpdate {
        let code = match Barcode::parse(input) {
            Ok(code) => code,
            Err(e) => return self.update(Notice::error(format!("Invalid barcode: {e}"))),
        };
        match self.catalog.find_by_barcode(&code).map(Arc::clone) {
            Some(item) => self.add(item),
            None => {
                debug!(barcode = %code, "No item for barcode");
                self.update(Notice::error("Product not found for barcode"))
            }
        }
    }

    /// Remove an item's line; it can be restored with [`undo_remove`](Self::undo_remove).
    #[instrument(skip_all, fields(item_id = %id))]
    pub fn remove_item(&mut self, id: &ItemId) -> CartUpdate {
        match self.cart.remove_item(id) {
            Ok(line) => {
                self.persist();
                self.update(Notice::info(format!("{} removed from cart", line.item.name)))
            }
            Err(e) => self.update(Notice::error(capitalize(&e.to_string()))),
        }
    }

    /// Restore the most recently removed line.
    #[instrument(skip(self))]
    pub fn undo_remove(&mut self) -> CartUpdate {
        match self.cart.undo_remove() {
            Some(line) => {
                self.persist();
                self.update(Notice::success(format!(
                    "{} restored to cart",
                    line.item.name
                )))
            }
            None => self.update(Notice::info("Nothing to undo")),
        }
    }

    /// The line [`undo_remove`](Self::undo_remove) would restore.
    #[must_use]
    pub const fn undo_available(&self) -> Option<&CartLine> {
        self.cart.last_removed()
    }

    /// Change an item's quantity by `delta`, never below 1. An item that is
    /// not in the cart is left alone.
    #[instrument(skip_all, fields(item_id = %id, delta))]
    pub fn update_quantity(&mut self, id: &ItemId, delta: i64) -> CartUpdate {
        match self.cart.update_quantity(id, delta) {
            Some(line) => {
                self.persist();
                self.update(Notice::info(format!(
                    "{} quantity: {}",
                    line.item.name, line.quantity
                )))
            }
            None => {
                debug!("Quantity change for item not in cart ignored");
                self.update(Notice::info(format!("Product {id} is not in the cart")))
            }
        }
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> CartUpdate {
        self.cart.clear();
        self.persist();
        self.update(Notice::info("Cart cleared."))
    }

    /// Set the catalog search text.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.persist();
    }

    /// Select a category filter, or clear it with `None`.
    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category.filter(|c| !c.is_empty());
        self.persist();
    }

    /// Erase all saved state and reset the session to an empty cart with
    /// no filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared; in-memory state is
    /// reset regardless.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.cart = CartLedger::new();
        self.search.clear();
        self.category = None;
        self.checkout = CheckoutFlow::new();
        info!("Register state reset");
        self.storage.clear()
    }

    /// Open the checkout summary.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::begin_review`].
    pub fn begin_checkout(&mut self) -> Result<CartTotals, CheckoutError> {
        self.checkout.begin_review(&self.cart)?;
        Ok(self.totals())
    }

    /// Close the checkout summary, or dismiss a completed sale.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::cancel`].
    pub fn cancel_checkout(&mut self) -> Result<(), CheckoutError> {
        self.checkout.cancel()
    }

    /// Confirm the order and start payment.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::confirm`].
    #[instrument(skip(self, notes))]
    pub fn confirm_checkout(
        &mut self,
        notes: Option<String>,
    ) -> Result<OrderSnapshot, CheckoutError> {
        self.checkout.confirm(&self.cart, notes)
    }

    /// Apply a settlement outcome. A successful sale clears and persists the
    /// cart.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::complete`].
    #[instrument(skip(self, outcome))]
    pub fn finish_checkout(
        &mut self,
        outcome: Result<PaymentConfirmation, PaymentError>,
    ) -> Result<CompletedSale, CheckoutError> {
        let context = ReceiptContext {
            store_name: &self.config.store_name,
            currency: self.config.currency,
            tax_rate: self.config.tax_rate,
        };
        let receipt = self.checkout.complete(outcome, &mut self.cart, &context)?;
        self.persist();
        Ok(CompletedSale {
            receipt,
            notice: Notice::success("Order completed!"),
        })
    }

    /// Run a whole checkout: review, confirm, settle, complete.
    ///
    /// # Errors
    ///
    /// Any transition error, or `CheckoutError::Payment` if `processor`
    /// declines (the cart is left intact and the flow is back in review).
    pub async fn checkout<P: PaymentProcessor>(
        &mut self,
        notes: Option<String>,
        processor: &P,
    ) -> Result<CompletedSale, CheckoutError> {
        self.begin_checkout()?;
        let snapshot = self.confirm_checkout(notes)?;
        let outcome = processor.settle(&snapshot).await;
        self.finish_checkout(outcome)
    }

    fn add(&mut self, item: Arc<Item>) -> CartUpdate {
        let line = self.cart.add_item(item);
        self.persist();
        self.update(Notice::success(format!("{} added to cart", line.item.name)))
    }

    fn update(&self, notice: Notice) -> CartUpdate {
        CartUpdate {
            totals: self.totals(),
            notice,
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self
            .storage
            .save(self.cart.lines(), &self.search, self.category.as_deref())
        {
            warn!(error = %e, "Failed to save register state");
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;
    use till_core::Severity;

    use super::*;
    use crate::checkout::SimulatedProcessor;
    use crate::storage::{MemoryStore, keys};

    fn session() -> SalesSession<MemoryStore> {
        SalesSession::open(RegisterConfig::default(), Catalog::builtin(), MemoryStore::new())
    }

    fn id(raw: &str) -> ItemId {
        ItemId::new(raw)
    }

    #[test]
    fn test_add_item_reports_and_persists() {
        let mut session = session();
        let update = session.add_item(&id("1"));

        assert_eq!(update.notice, Notice::success("Product 1 added to cart"));
        assert_eq!(update.totals.subtotal, Decimal::new(2999, 2));

        let saved = session.store().get(keys::CART).unwrap().unwrap();
        assert!(saved.contains("\"quantity\":1"));
    }

    #[test]
    fn test_add_unknown_item() {
        let mut session = session();
        let update = session.add_item(&id("99"));
        assert!(update.notice.is_error());
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_scan_adds_matching_item() {
        let mut session = session();
        let update = session.scan(" 8901000000035\n");
        assert_eq!(update.notice.severity, Severity::Success);
        assert!(session.cart().contains(&id("3")));
    }

    #[test]
    fn test_scan_unknown_barcode() {
        let mut session = session();
        let update = session.scan("X1");
        assert_eq!(update.notice, Notice::error("Product not found for barcode"));
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_scan_blank_input() {
        let mut session = session();
        let update = session.scan("   ");
        assert!(update.notice.is_error());
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_remove_and_undo() {
        let mut session = session();
        session.add_item(&id("1"));
        session.add_item(&id("1"));
        session.add_item(&id("2"));

        let update = session.remove_item(&id("1"));
        assert_eq!(update.notice, Notice::info("Product 1 removed from cart"));
        assert_eq!(session.undo_available().unwrap().quantity, 2);

        let update = session.undo_remove();
        assert_eq!(update.notice, Notice::success("Product 1 restored to cart"));
        let order: Vec<&str> = session
            .cart()
            .lines()
            .iter()
            .map(|l| l.item.id.as_str())
            .collect();
        assert_eq!(order, vec!["2", "1"]);
        assert_eq!(session.cart().line(&id("1")).unwrap().quantity, 2);

        assert_eq!(session.undo_remove().notice, Notice::info("Nothing to undo"));
    }

    #[test]
    fn test_remove_missing_item() {
        let mut session = session();
        let update = session.remove_item(&id("1"));
        assert_eq!(update.notice, Notice::error("Item 1 is not in the cart"));
    }

    #[test]
    fn test_update_quantity_floor() {
        let mut session = session();
        session.add_item(&id("2"));
        session.update_quantity(&id("2"), 3);
        let update = session.update_quantity(&id("2"), -10);
        assert_eq!(update.notice, Notice::info("Product 2 quantity: 1"));
        assert_eq!(session.cart().line(&id("2")).unwrap().quantity, 1);
    }

    #[test]
    fn test_update_quantity_of_absent_item_is_a_no_op() {
        let mut session = session();
        session.add_item(&id("1"));
        let before = session.store().get(keys::CART).unwrap();

        let update = session.update_quantity(&id("2"), 3);
        assert_eq!(update.notice, Notice::info("Product 2 is not in the cart"));
        assert!(!update.notice.is_error());
        assert!(!session.cart().contains(&id("2")));
        assert_eq!(session.store().get(keys::CART).unwrap(), before);
    }

    #[test]
    fn test_filters_persist_and_restore() {
        let mut session = session();
        session.add_item(&id("3"));
        session.set_search("product");
        session.set_category(Some("Category A".to_string()));
        assert_eq!(session.visible_items().len(), 2);
        let store = session.store().clone();

        let restored = SalesSession::open(RegisterConfig::default(), Catalog::builtin(), store);
        assert_eq!(restored.search(), "product");
        assert_eq!(restored.category(), Some("Category A"));
        assert_eq!(restored.cart().len(), 1);
        assert!(Arc::ptr_eq(
            &restored.cart().lines()[0].item,
            restored.catalog().get(&id("3")).unwrap()
        ));
    }

    #[test]
    fn test_clearing_category_removes_key() {
        let mut session = session();
        session.set_category(Some("Category B".to_string()));
        session.set_category(None);
        assert_eq!(session.store().get(keys::SELECTED_CATEGORY).unwrap(), None);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = session();
        session.add_item(&id("1"));
        session.set_search("x");
        session.reset().unwrap();

        assert!(session.cart().is_empty());
        assert_eq!(session.search(), "");
        assert!(session.store().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_clears_cart_and_returns_receipt() {
        let mut session = session();
        session.add_item(&id("1"));
        session.add_item(&id("1"));
        session.add_item(&id("2"));
        let expected = session.cart().lines().to_vec();

        let sale = session
            .checkout(Some("paid cash".to_string()), &SimulatedProcessor::new(Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(sale.notice, Notice::success("Order completed!"));
        assert_eq!(sale.receipt.lines, expected);
        assert_eq!(sale.receipt.notes.as_deref(), Some("paid cash"));
        assert!(session.cart().is_empty());
        assert_eq!(session.checkout_status(), CheckoutStatus::Completed);
        assert_eq!(session.store().get(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_checkout_empty_cart() {
        let mut session = session();
        assert_eq!(session.begin_checkout(), Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_declined_payment_keeps_cart() {
        let mut session = session();
        session.add_item(&id("1"));
        session.begin_checkout().unwrap();
        session.confirm_checkout(None).unwrap();

        let err = session
            .finish_checkout(Err(PaymentError::Declined("insufficient funds".to_string())))
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Payment(_)));
        assert_eq!(session.cart().len(), 1);
        assert_eq!(session.checkout_status(), CheckoutStatus::Reviewing);
    }
}
