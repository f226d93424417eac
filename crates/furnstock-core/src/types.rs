//! # Domain Types
//!
//! Core domain types used throughout Furnstock.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Category     │◄──│    Product      │──►│   StockEntry    │        │
//! │  │  id, name       │   │  id, sku        │   │  product_id     │        │
//! │  └─────────────────┘   │  price_cents    │   │  quantity >= 0  │        │
//! │                        │  discount_bps   │   │  last_updated   │        │
//! │                        └────────▲────────┘   └─────────────────┘        │
//! │                                 │                                       │
//! │            ┌────────────────────┴───────────────────┐                   │
//! │  ┌─────────┴───────┐                      ┌─────────┴───────┐           │
//! │  │  DeliveryItem   │                      │    SaleItem     │           │
//! │  │  purchase price │                      │  sale price     │           │
//! │  └────────▲────────┘                      └────────▲────────┘           │
//! │  ┌────────┴────────┐   ┌──────────────┐   ┌────────┴────────┐           │
//! │  │    Delivery     │──►│   Supplier   │   │      Sale       │──► Employee│
//! │  └─────────────────┘   └──────────────┘   └─────────────────┘           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Representation
//! Row types keep money as `*_cents: i64` and discounts as `discount_bps: i64`
//! so they map column-for-column onto SQLite. Accessors hand out the typed
//! `Money` / `Discount` values. Input types (`New*`, `*Line`) use the typed
//! values directly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Discount, Money};
use crate::pricing;

/// Converts a stored basis-point column into a `Discount`, clamping values
/// the schema CHECK would already have rejected.
fn discount_from_column(bps: i64) -> Discount {
    Discount::try_from_bps(bps.clamp(0, Discount::MAX_BPS as i64) as u32).unwrap_or_default()
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Stock Keeping Unit - unique, case-sensitive business identifier.
    pub sku: String,

    pub category_id: String,

    /// Base unit price in cents. Overwritten by every delivery.
    pub price_cents: i64,

    /// Standing discount in basis points (0-10000).
    pub discount_bps: i64,

    pub material: Option<String>,
    pub color: Option<String>,

    /// Dimensions, positive when present.
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,

    /// Opaque reference to a photo managed outside this system.
    pub photo_path: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn discount(&self) -> Discount {
        discount_from_column(self.discount_bps)
    }

    /// Current selling price under the standing discount.
    pub fn effective_price(&self) -> Money {
        pricing::effective_price(self.price(), Some(self.discount()))
    }
}

/// Input for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub category_id: String,
    pub price: Money,
    #[serde(default)]
    pub discount: Discount,
    pub material: Option<String>,
    pub color: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub photo_path: Option<String>,
}

impl NewProduct {
    /// Minimal input: everything optional left empty, no discount.
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        category_id: impl Into<String>,
        price: Money,
    ) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            category_id: category_id.into(),
            price,
            discount: Discount::NONE,
            material: None,
            color: None,
            length: None,
            width: None,
            height: None,
            photo_path: None,
        }
    }

    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = discount;
        self
    }
}

/// Catalog listing row: product joined with its category name and stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductListing {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub category_id: String,
    pub category_name: String,
    pub price_cents: i64,
    pub discount_bps: i64,
    pub material: Option<String>,
    pub color: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub photo_path: Option<String>,
    pub quantity: i64,
}

impl ProductListing {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn discount(&self) -> Discount {
        discount_from_column(self.discount_bps)
    }

    pub fn effective_price(&self) -> Money {
        pricing::effective_price(self.price(), Some(self.discount()))
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Per-product stock level. Quantity is never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockEntry {
    pub product_id: String,
    pub quantity: i64,
    pub last_updated: DateTime<Utc>,
}

/// One row of the inventory report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryRow {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub category_name: String,
    pub quantity: i64,
    pub price_cents: i64,
    pub discount_bps: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl InventoryRow {
    pub fn effective_price(&self) -> Money {
        pricing::effective_price(
            Money::from_cents(self.price_cents),
            Some(discount_from_column(self.discount_bps)),
        )
    }

    /// Stock value at the current selling price. Saturates at i64::MAX
    /// cents.
    pub fn stock_value(&self) -> Money {
        self.effective_price().saturating_multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    /// Tax id: digits only, not unique.
    pub inn: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub inn: String,
    pub email: Option<String>,
}

// =============================================================================
// Employee
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: String,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub position: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// "Last First [Middle]".
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref().map(str::trim) {
            Some(middle) if !middle.is_empty() => {
                format!("{} {} {}", self.last_name, self.first_name, middle)
            }
            _ => format!("{} {}", self.last_name, self.first_name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub position: Option<String>,
}

// =============================================================================
// Delivery
// =============================================================================

/// Delivery header. `total_cents` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Delivery {
    pub id: String,
    pub supplier_id: String,
    pub delivery_date: NaiveDate,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Delivery {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DeliveryItem {
    pub id: String,
    pub delivery_id: String,
    /// Position in the caller's item list, starting at 1.
    pub line_no: i64,
    pub product_id: String,
    pub quantity: i64,
    pub purchase_price_cents: i64,
}

impl DeliveryItem {
    pub fn line_total(&self) -> Money {
        pricing::line_total(Money::from_cents(self.purchase_price_cents), self.quantity)
    }
}

/// One requested delivery line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLine {
    pub product_id: String,
    pub quantity: i64,
    pub purchase_price: Money,
}

impl DeliveryLine {
    pub fn new(product_id: impl Into<String>, quantity: i64, purchase_price: Money) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            purchase_price,
        }
    }

    pub fn line_total(&self) -> Money {
        pricing::line_total(self.purchase_price, self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDelivery {
    pub supplier_id: String,
    pub delivery_date: NaiveDate,
    pub items: Vec<DeliveryLine>,
}

/// Delivery header joined with supplier name, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DeliverySummary {
    pub id: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub delivery_date: NaiveDate,
    pub total_cents: i64,
    pub item_count: i64,
}

/// Delivery line joined with product sku and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DeliveryItemDetail {
    pub delivery_id: String,
    pub line_no: i64,
    pub product_id: String,
    pub sku: String,
    pub product_name: String,
    pub quantity: i64,
    pub purchase_price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryWithItems {
    #[serde(flatten)]
    pub delivery: DeliverySummary,
    pub items: Vec<DeliveryItemDetail>,
}

// =============================================================================
// Sale
// =============================================================================

/// Sale header. `total_cents` is the sum of per-line totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub sale_date: NaiveDate,
    pub total_cents: i64,
    pub customer_name: String,
    pub employee_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Sold line with price and discount snapshotted at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub line_no: i64,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price actually charged (after discount).
    pub sale_price_cents: i64,
    /// Discount actually applied.
    pub discount_bps: i64,
}

impl SaleItem {
    pub fn line_total(&self) -> Money {
        pricing::line_total(Money::from_cents(self.sale_price_cents), self.quantity)
    }

    pub fn discount(&self) -> Discount {
        discount_from_column(self.discount_bps)
    }
}

/// One requested sale line. `discount_override` replaces the product's
/// standing discount for this line only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
    pub discount_override: Option<Discount>,
}

impl SaleLine {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            discount_override: None,
        }
    }

    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount_override = Some(discount);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSale {
    pub customer_name: String,
    pub employee_id: Option<String>,
    pub sale_date: NaiveDate,
    pub items: Vec<SaleLine>,
}

/// Sale header joined with the employee's full name, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleSummary {
    pub id: String,
    pub sale_date: NaiveDate,
    pub total_cents: i64,
    pub customer_name: String,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub item_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItemDetail {
    pub sale_id: String,
    pub line_no: i64,
    pub product_id: String,
    pub sku: String,
    pub product_name: String,
    pub quantity: i64,
    pub sale_price_cents: i64,
    pub discount_bps: i64,
}

impl SaleItemDetail {
    pub fn line_total(&self) -> Money {
        pricing::line_total(Money::from_cents(self.sale_price_cents), self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: SaleSummary,
    pub items: Vec<SaleItemDetail>,
}

// =============================================================================
// Unit Tests
// =============================================================================
