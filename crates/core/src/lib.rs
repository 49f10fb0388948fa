//! Till Core - Shared types library.
//!
//! This crate provides the domain types used across all Till components:
//! - `register` - Catalog, cart ledger, checkout flow and persistence
//! - `cli` - The `till` command-line register
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no clocks.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for item IDs, barcodes, prices, catalog items and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
