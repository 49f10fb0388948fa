//! Till Register library.
//!
//! The sales register behind the point-of-sale dashboard: a product
//! [`catalog`], the [`cart`] ledger with derived totals and single-level undo,
//! the [`checkout`] state machine with simulated settlement, and [`storage`]
//! that mirrors the cart and filter selections to device-local key-value
//! storage after every mutation.
//!
//! [`session::SalesSession`] ties these together and is the surface a UI
//! calls. Every mutator returns the new derived state so callers re-render
//! explicitly.
//!
//! # Example
//!
//! ```rust
//! use till_core::ItemId;
//! use till_register::catalog::Catalog;
//! use till_register::config::RegisterConfig;
//! use till_register::session::SalesSession;
//! use till_register::storage::MemoryStore;
//!
//! let mut session = SalesSession::open(
//!     RegisterConfig::default(),
//!     Catalog::builtin(),
//!     MemoryStore::new(),
//! );
//!
//! let update = session.add_item(&ItemId::new("1"));
//! assert_eq!(update.notice.message, "Product 1 added to cart");
//! assert_eq!(session.cart().total_items(), 1);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notice;
pub mod receipt;
pub mod session;
pub mod storage;

pub use error::{Error, Result};
