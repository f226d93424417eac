//! # furnstock-db: Database Layer for Furnstock
//!
//! SQLite persistence for the furniture back-office: catalog records, the
//! stock ledger and the two stock-moving transactions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Furnstock Data Flow                              │
//! │                                                                         │
//! │  furnstock delivery create ...                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   furnstock-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌─────────────────┐   ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories   │   │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │◄───│ Delivery / Sale │   │  (embedded)  │   │    │
//! │  │   │  SqlitePool   │    │ Stock ledger    │   │ 001_init.sql │   │    │
//! │  │   │               │    │ Product, ...    │   │              │   │    │
//! │  │   └───────────────┘    └─────────────────┘   └──────────────┘   │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     SQLite Database (WAL)                       │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repositories, stock ledger, delivery and sale transactions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use furnstock_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("furnstock.db")).await?;
//! let sale_id = db.sales().create_sale(&new_sale).await?;
//! let inventory = db.stock().get_inventory().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::category::CategoryRepository;
pub use repository::delivery::DeliveryRepository;
pub use repository::employee::EmployeeRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::StockRepository;
pub use repository::supplier::SupplierRepository;
