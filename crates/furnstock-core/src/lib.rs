//! # furnstock-core: Pure Business Logic for Furnstock
//!
//! This crate holds the furniture back-office domain as pure functions and
//! plain data types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Furnstock Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Back-office CLI (apps/backoffice)               │   │
//! │  │   product add ──► delivery create ──► sale create ──► reports   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ furnstock-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ discount  │  │   rules   │  │   │
//! │  │   │ Delivery  │  │ Discount  │  │  markup   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  furnstock-db (Database Layer)                  │   │
//! │  │      SQLite, stock ledger, delivery and sale transactions       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockEntry, Delivery, Sale, etc.)
//! - [`money`] - `Money` (integer cents) and `Discount` (basis points)
//! - [`pricing`] - Effective price under discount, retail markup
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use furnstock_core::money::{Discount, Money};
//! use furnstock_core::pricing::{effective_price, markup_price};
//!
//! let base = Money::from_major_minor(1000, 0);
//! let price = effective_price(base, Some(Discount::from_percent(10)));
//! assert_eq!(price, Money::from_major_minor(900, 0));
//!
//! let retail = markup_price(Money::from_major_minor(500, 0));
//! assert_eq!(retail, Money::from_major_minor(600, 0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Discount, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Retail markup applied to a supplier's purchase price, in basis points.
///
/// 12000 bps = 120% of the purchase price (a fixed 20% margin).
pub const RETAIL_MARKUP_BPS: i64 = 12_000;

/// Largest quantity accepted on a single delivery or sale line.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Largest amount, in cents, a price, line total or document total may
/// reach. Keeps every ledger sum well inside i64.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000_000;

/// Maximum length of a product SKU.
pub const MAX_SKU_LEN: usize = 50;

/// Maximum number of digits in a supplier INN (tax id).
pub const MAX_INN_DIGITS: usize = 12;
