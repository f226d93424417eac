//! # Stock Ledger
//!
//! One `stock` row per product. Quantity only moves through deliveries
//! (up) and sales (down) and is never negative.
//!
//! ## Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Sale A and Sale B both see quantity = 3 and both want 2            │
//! │                                                                     │
//! │  ❌ read-then-write:  3 - 2 = 1 (A)    3 - 2 = 1 (B)  → sold 4 of 3 │
//! │                                                                     │
//! │  ✅ UPDATE stock SET quantity = quantity - 2                        │
//! │       WHERE product_id = ? AND quantity >= 2                        │
//! │                                                                     │
//! │     A: 1 row affected  → quantity 1                                 │
//! │     B: 0 rows affected → InsufficientStock, B rolls back            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger operations are free functions over `&mut SqliteConnection`
//! so the delivery and sale transactions can run them on their own
//! connection. [`StockRepository`] wraps them for standalone use.

use chrono::{DateTime, Utc};
use furnstock_core::validation::validate_quantity;
use furnstock_core::{CoreError, InventoryRow, StockEntry, ValidationError};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::DbResult;

// =============================================================================
// Ledger Operations (transaction-composable)
// =============================================================================

/// Creates the stock row for a new product with quantity 0.
pub async fn initialize(
    conn: &mut SqliteConnection,
    product_id: &str,
    now: DateTime<Utc>,
) -> DbResult<()> {
    debug!(product_id = %product_id, "Initializing stock");

    sqlx::query("INSERT INTO stock (product_id, quantity, last_updated) VALUES (?1, 0, ?2)")
        .bind(product_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Adds `amount` to the product's stock, creating the row if missing.
///
/// ## Returns
/// * `Err(Validation)` - `amount` is out of range, or the new quantity
///   would not fit in an i64 (SQLite would store it as REAL); nothing is
///   changed
pub async fn increase(
    conn: &mut SqliteConnection,
    product_id: &str,
    amount: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    validate_quantity(amount)?;

    debug!(product_id = %product_id, amount, "Increasing stock");

    let result = sqlx::query(
        r#"
        INSERT INTO stock (product_id, quantity, last_updated)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(product_id) DO UPDATE SET
            quantity = quantity + excluded.quantity,
            last_updated = excluded.last_updated
        WHERE quantity <= ?4 - excluded.quantity
        "#,
    )
    .bind(product_id)
    .bind(amount)
    .bind(now)
    .bind(i64::MAX)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        warn!(product_id = %product_id, amount, "Stock increase rejected: quantity overflow");
        return Err(ValidationError::OutOfRange {
            field: "stock quantity".to_string(),
            min: 0,
            max: i64::MAX,
        }
        .into());
    }

    Ok(())
}

/// Removes `amount` from the product's stock.
///
/// ## Returns
/// * `Err(InsufficientStock)` - `amount` exceeds the current quantity
///   (a missing row counts as 0); nothing is changed
/// * `Err(ProductNotFound)` - the product doesn't exist
pub async fn decrease(
    conn: &mut SqliteConnection,
    product_id: &str,
    amount: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    validate_quantity(amount)?;

    debug!(product_id = %product_id, amount, "Decreasing stock");

    let result = sqlx::query(
        r#"
        UPDATE stock
        SET quantity = quantity - ?2, last_updated = ?3
        WHERE product_id = ?1 AND quantity >= ?2
        "#,
    )
    .bind(product_id)
    .bind(amount)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let sku: Option<String> = sqlx::query_scalar("SELECT sku FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;
        let sku = sku.ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        let available = get_quantity(conn, product_id).await?;

        warn!(
            product_id = %product_id,
            sku = %sku,
            available,
            requested = amount,
            "Stock decrease rejected"
        );

        return Err(CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            sku,
            available,
            requested: amount,
        }
        .into());
    }

    Ok(())
}

/// Current quantity; 0 when the product has no stock row.
pub async fn get_quantity(conn: &mut SqliteConnection, product_id: &str) -> DbResult<i64> {
    let quantity: Option<i64> = sqlx::query_scalar("SELECT quantity FROM stock WHERE product_id = ?1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(quantity.unwrap_or(0))
}

pub async fn get_entry(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Option<StockEntry>> {
    let entry = sqlx::query_as::<_, StockEntry>(
        "SELECT product_id, quantity, last_updated FROM stock WHERE product_id = ?1",
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(entry)
}

// =============================================================================
// Repository (pool-level)
// =============================================================================

/// Pool-level access to the stock ledger and the inventory report.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Current quantity; 0 when the product has no stock row. Read-only.
    pub async fn get(&self, product_id: &str) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        get_quantity(&mut *conn, product_id).await
    }

    pub async fn entry(&self, product_id: &str) -> DbResult<Option<StockEntry>> {
        let mut conn = self.pool.acquire().await?;
        get_entry(&mut *conn, product_id).await
    }

    pub async fn increase(&self, product_id: &str, amount: i64) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        increase(&mut *conn, product_id, amount, Utc::now()).await
    }

    pub async fn decrease(&self, product_id: &str, amount: i64) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        decrease(&mut *conn, product_id, amount, Utc::now()).await
    }

    /// Inventory report: every product with its category and stock,
    /// ordered by category then product name.
    pub async fn get_inventory(&self) -> DbResult<Vec<InventoryRow>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT
                p.id AS product_id,
                p.sku,
                p.name,
                c.name AS category_name,
                COALESCE(s.quantity, 0) AS quantity,
                p.price_cents,
                p.discount_bps,
                s.last_updated
            FROM products p
            INNER JOIN categories c ON c.id = p.category_id
            LEFT JOIN stock s ON s.product_id = p.id
            ORDER BY c.name, p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Inventory loaded");
        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
