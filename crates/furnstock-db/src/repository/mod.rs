//! # Repository Module
//!
//! Database repository implementations for Furnstock.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CLI command                                                            │
//! │       │  db.sales().create_sale(&request)                               │
//! │       ▼                                                                 │
//! │  SaleRepository ──────────┐                                             │
//! │       │                   │ same transaction connection                 │
//! │       │                   ▼                                             │
//! │       │        product::fetch_product(conn, ..)                         │
//! │       │        stock::decrease(conn, ..)                                │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories hold a `SqlitePool` for standalone calls. Building blocks that
//! must run inside another repository's transaction are free functions taking
//! `&mut SqliteConnection`, so callers pass `&mut *tx`.
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`] - Product categories
//! - [`supplier::SupplierRepository`] - Suppliers
//! - [`employee::EmployeeRepository`] - Sales staff
//! - [`product::ProductRepository`] - Catalog CRUD and listings
//! - [`stock::StockRepository`] - Stock ledger and inventory report
//! - [`delivery::DeliveryRepository`] - Delivery transaction and reads
//! - [`sale::SaleRepository`] - Sale transaction and reads

use uuid::Uuid;

pub mod category;
pub mod delivery;
pub mod employee;
pub mod product;
pub mod sale;
pub mod stock;
pub mod supplier;

/// Generates a new entity id (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
