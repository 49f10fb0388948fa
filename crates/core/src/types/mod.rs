//! Core types for Till.
//!
//! This module provides type-safe wrappers for common point-of-sale concepts.

pub mod barcode;
pub mod id;
pub mod item;
pub mod price;
pub mod status;

pub use barcode::{Barcode, BarcodeError};
pub use id::*;
pub use item::{CartLine, Item};
pub use price::{CurrencyCode, Price};
pub use status::*;
