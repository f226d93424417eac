//! # Sale Repository
//!
//! Outgoing stock to customers.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_sale("Ivanov", employee?, date, [(P1, 2, None), (P2, 1, 15%)])  │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ▼  Pass 1: check only, nothing written                               │
//! │    employee exists? (if given)                                          │
//! │    each line: product exists? enough stock for all lines of it?         │
//! │               price = effective_price(base, override or stored)         │
//! │               total += price × qty                                      │
//! │    │                                                                    │
//! │    ▼  Pass 2: write                                                     │
//! │    INSERT sales (total)                                                 │
//! │    each line: INSERT sale_items (price + discount snapshot)             │
//! │               stock -= qty (conditional decrement)                      │
//! │    │                                                                    │
//! │  COMMIT ──► sale id                                                     │
//! │                                                                         │
//! │  Any error ──► transaction dropped ──► ROLLBACK, nothing persists       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use furnstock_core::pricing::{checked_line_total, checked_total, effective_price};
use furnstock_core::validation::validate_sale;
use furnstock_core::{
    CoreError, Discount, Money, NewSale, Product, Sale, SaleItem, SaleItemDetail, SaleLine,
    SaleSummary, SaleWithItems, ValidationError,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use super::{employee, new_id, product, stock};
use crate::error::{DbError, DbResult};

const SUMMARY_SELECT: &str = r#"
    SELECT
        s.id,
        s.sale_date,
        s.total_cents,
        s.customer_name,
        s.employee_id,
        CASE WHEN e.id IS NULL THEN NULL
             ELSE e.last_name || ' ' || e.first_name
                  || COALESCE(' ' || NULLIF(TRIM(e.middle_name), ''), '')
        END AS employee_name,
        (SELECT COUNT(*) FROM sale_items si WHERE si.sale_id = s.id) AS item_count
    FROM sales s
    LEFT JOIN employees e ON e.id = s.employee_id
"#;

const DATE_FILTER: &str = "(?1 IS NULL OR s.sale_date >= ?1) AND (?2 IS NULL OR s.sale_date <= ?2)";

/// Price and discount a line will be sold at.
struct PricedLine {
    unit_price: Money,
    discount: Discount,
}

fn price_line(product: &Product, line: &SaleLine) -> PricedLine {
    let discount = line.discount_override.unwrap_or_else(|| product.discount());
    PricedLine {
        unit_price: effective_price(product.price(), Some(discount)),
        discount,
    }
}

async fn load_product(conn: &mut SqliteConnection, product_id: &str) -> DbResult<Product> {
    product::fetch_product(conn, product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()).into())
}

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale: header, snapshotted lines and stock decrements, all
    /// or nothing.
    ///
    /// ## Returns
    /// * `Ok(id)` - The new sale id
    /// * `Err(Validation)` - Empty list, blank customer, quantity out of
    ///   range, or a line or sale total above `MAX_AMOUNT_CENTS`
    /// * `Err(ProductNotFound | EmployeeNotFound)` - Unknown reference
    /// * `Err(InsufficientStock)` - A product is short; repeated lines for
    ///   the same product count together
    pub async fn create_sale(&self, input: &NewSale) -> DbResult<String> {
        validate_sale(input)?;

        let now = Utc::now();
        let sale_id = new_id();
        let customer_name = input.customer_name.trim();

        debug!(
            customer = %customer_name,
            lines = input.items.len(),
            "Creating sale"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        if let Some(employee_id) = input.employee_id.as_deref() {
            if !employee::exists(&mut *tx, employee_id).await? {
                return Err(CoreError::EmployeeNotFound(employee_id.to_string()).into());
            }
        }

        // Pass 1: check every line before writing anything.
        let mut requested: HashMap<&str, i64> = HashMap::new();
        let mut total = Money::zero();

        for line in &input.items {
            let product = load_product(&mut *tx, &line.product_id).await?;

            let wanted = requested.entry(line.product_id.as_str()).or_insert(0);
            *wanted = wanted
                .checked_add(line.quantity)
                .ok_or_else(|| ValidationError::OutOfRange {
                    field: "quantity".to_string(),
                    min: 1,
                    max: i64::MAX,
                })?;

            let available = stock::get_quantity(&mut *tx, &product.id).await?;
            if *wanted > available {
                warn!(
                    product_id = %product.id,
                    sku = %product.sku,
                    available,
                    requested = *wanted,
                    "Sale rejected: insufficient stock"
                );
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    sku: product.sku,
                    available,
                    requested: *wanted,
                }
                .into());
            }

            let amount = checked_line_total(price_line(&product, line).unit_price, line.quantity)?;
            total = checked_total(total, amount)?;
        }

        // Pass 2: write header, lines and stock movements.
        sqlx::query(
            r#"
            INSERT INTO sales (id, sale_date, total_cents, customer_name, employee_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&sale_id)
        .bind(input.sale_date)
        .bind(total.cents())
        .bind(customer_name)
        .bind(input.employee_id.as_deref())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for (index, line) in input.items.iter().enumerate() {
            let product = load_product(&mut *tx, &line.product_id).await?;
            let priced = price_line(&product, line);

            sqlx::query(
                r#"
                INSERT INTO sale_items
                    (id, sale_id, line_no, product_id, quantity, sale_price_cents, discount_bps)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(new_id())
            .bind(&sale_id)
            .bind(index as i64 + 1)
            .bind(&product.id)
            .bind(line.quantity)
            .bind(priced.unit_price.cents())
            .bind(priced.discount.bps() as i64)
            .execute(&mut *tx)
            .await?;

            stock::decrease(&mut *tx, &product.id, line.quantity, now).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale_id,
            customer = %customer_name,
            total = %total,
            "Sale committed"
        );
        Ok(sale_id)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_date, total_cents, customer_name, employee_id, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(sale)
    }

    /// Lines of one sale in input order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, line_no, product_id, quantity, sale_price_cents, discount_bps
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Sale headers with employee names, newest first.
    pub async fn list(&self) -> DbResult<Vec<SaleSummary>> {
        self.list_between(None, None).await
    }

    async fn list_between(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<Vec<SaleSummary>> {
        let sql = format!(
            "{} WHERE {} ORDER BY s.sale_date DESC, s.created_at DESC",
            SUMMARY_SELECT, DATE_FILTER
        );
        let sales = sqlx::query_as::<_, SaleSummary>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// Sales with their lines, optionally limited to an inclusive date range,
    /// newest first.
    pub async fn get_sales_with_items(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<Vec<SaleWithItems>> {
        let sales = self.list_between(from, to).await?;

        let sql = format!(
            r#"
            SELECT
                si.sale_id,
                si.line_no,
                si.product_id,
                p.sku,
                p.name AS product_name,
                si.quantity,
                si.sale_price_cents,
                si.discount_bps
            FROM sale_items si
            INNER JOIN sales s ON s.id = si.sale_id
            INNER JOIN products p ON p.id = si.product_id
            WHERE {}
            ORDER BY si.sale_id, si.line_no
            "#,
            DATE_FILTER
        );
        let details = sqlx::query_as::<_, SaleItemDetail>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        let mut by_sale: HashMap<String, Vec<SaleItemDetail>> = HashMap::new();
        for detail in details {
            by_sale.entry(detail.sale_id.clone()).or_default().push(detail);
        }

        debug!(count = sales.len(), from = ?from, to = ?to, "Loaded sales with items");

        Ok(sales
            .into_iter()
            .map(|sale| {
                let items = by_sale.remove(&sale.id).unwrap_or_default();
                SaleWithItems { sale, items }
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
