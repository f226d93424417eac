//! # Delivery Repository
//!
//! Incoming stock from suppliers.
//!
//! ## Delivery Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_delivery(supplier, date, [(P1, 10, 500.00), (P2, 2, 80.00)])    │
//! │                                                                         │
//! │  validate lines (non-empty, qty > 0, price > 0)                         │
//! │       │                                                                 │
//! │  BEGIN ▼                                                                │
//! │  supplier exists?  ──no──► SupplierNotFound ──► ROLLBACK                │
//! │       │                                                                 │
//! │  INSERT deliveries (total = 0)                                          │
//! │       │                                                                 │
//! │  for each line, in order:                                               │
//! │       product exists? ──no──► ProductNotFound ──► ROLLBACK              │
//! │       INSERT delivery_items (line_no)                                   │
//! │       stock += qty                                                      │
//! │       product.price = markup(purchase price)                            │
//! │       total += qty × purchase price                                     │
//! │       │                                                                 │
//! │  UPDATE deliveries SET total                                            │
//! │  COMMIT ──► delivery id                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The markup overwrite ignores any standing discount on the product; the
//! discount stays as it was and applies to the new price.

use std::collections::HashMap;

use chrono::Utc;
use furnstock_core::pricing::{checked_line_total, checked_total, markup_price};
use furnstock_core::validation::validate_delivery;
use furnstock_core::{
    CoreError, Delivery, DeliveryItem, DeliveryItemDetail, DeliverySummary, DeliveryWithItems,
    Money, NewDelivery,
};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{new_id, product, stock, supplier};
use crate::error::{DbError, DbResult};

const SUMMARY_SELECT: &str = r#"
    SELECT
        d.id,
        d.supplier_id,
        s.name AS supplier_name,
        d.delivery_date,
        d.total_cents,
        (SELECT COUNT(*) FROM delivery_items di WHERE di.delivery_id = d.id) AS item_count
    FROM deliveries d
    INNER JOIN suppliers s ON s.id = d.supplier_id
"#;

#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: SqlitePool,
}

impl DeliveryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DeliveryRepository { pool }
    }

    /// Records a delivery: lines, stock increments and repricing, all or
    /// nothing.
    ///
    /// ## Returns
    /// * `Ok(id)` - The new delivery id
    /// * `Err(Validation)` - Empty list, non-positive quantity or price, or
    ///   an amount above `MAX_AMOUNT_CENTS`
    /// * `Err(SupplierNotFound | ProductNotFound)` - Unknown reference;
    ///   nothing was written
    pub async fn create_delivery(&self, input: &NewDelivery) -> DbResult<String> {
        validate_delivery(input)?;

        let now = Utc::now();
        let delivery_id = new_id();

        debug!(
            supplier_id = %input.supplier_id,
            lines = input.items.len(),
            "Creating delivery"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        if !supplier::exists(&mut *tx, &input.supplier_id).await? {
            return Err(CoreError::SupplierNotFound(input.supplier_id.clone()).into());
        }

        sqlx::query(
            r#"
            INSERT INTO deliveries (id, supplier_id, delivery_date, total_cents, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            "#,
        )
        .bind(&delivery_id)
        .bind(&input.supplier_id)
        .bind(input.delivery_date)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut total = Money::zero();

        for (index, line) in input.items.iter().enumerate() {
            if product::fetch_product(&mut *tx, &line.product_id)
                .await?
                .is_none()
            {
                return Err(CoreError::ProductNotFound(line.product_id.clone()).into());
            }

            sqlx::query(
                r#"
                INSERT INTO delivery_items
                    (id, delivery_id, line_no, product_id, quantity, purchase_price_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(new_id())
            .bind(&delivery_id)
            .bind(index as i64 + 1)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.purchase_price.cents())
            .execute(&mut *tx)
            .await?;

            stock::increase(&mut *tx, &line.product_id, line.quantity, now).await?;
            product::set_price(&mut *tx, &line.product_id, markup_price(line.purchase_price), now)
                .await?;

            total = checked_total(total, checked_line_total(line.purchase_price, line.quantity)?)?;
        }

        sqlx::query("UPDATE deliveries SET total_cents = ?2 WHERE id = ?1")
            .bind(&delivery_id)
            .bind(total.cents())
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            delivery_id = %delivery_id,
            supplier_id = %input.supplier_id,
            total = %total,
            "Delivery committed"
        );
        Ok(delivery_id)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Delivery>> {
        let delivery = sqlx::query_as::<_, Delivery>(
            "SELECT id, supplier_id, delivery_date, total_cents, created_at FROM deliveries WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(delivery)
    }

    /// Lines of one delivery in input order.
    pub async fn get_items(&self, delivery_id: &str) -> DbResult<Vec<DeliveryItem>> {
        let items = sqlx::query_as::<_, DeliveryItem>(
            r#"
            SELECT id, delivery_id, line_no, product_id, quantity, purchase_price_cents
            FROM delivery_items
            WHERE delivery_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(delivery_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Delivery headers with supplier names, newest first.
    pub async fn list(&self) -> DbResult<Vec<DeliverySummary>> {
        let sql = format!(
            "{} ORDER BY d.delivery_date DESC, d.created_at DESC",
            SUMMARY_SELECT
        );
        let deliveries = sqlx::query_as::<_, DeliverySummary>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(deliveries)
    }

    /// Every delivery with its lines (product sku and name included),
    /// newest first.
    pub async fn get_deliveries_with_items(&self) -> DbResult<Vec<DeliveryWithItems>> {
        let deliveries = self.list().await?;

        let details = sqlx::query_as::<_, DeliveryItemDetail>(
            r#"
            SELECT
                di.delivery_id,
                di.line_no,
                di.product_id,
                p.sku,
                p.name AS product_name,
                di.quantity,
                di.purchase_price_cents
            FROM delivery_items di
            INNER JOIN products p ON p.id = di.product_id
            ORDER BY di.delivery_id, di.line_no
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_delivery: HashMap<String, Vec<DeliveryItemDetail>> = HashMap::new();
        for detail in details {
            by_delivery
                .entry(detail.delivery_id.clone())
                .or_default()
                .push(detail);
        }

        Ok(deliveries
            .into_iter()
            .map(|delivery| {
                let items = by_delivery.remove(&delivery.id).unwrap_or_default();
                DeliveryWithItems { delivery, items }
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_support::{category, date, product, stock_up, supplier, test_db};
    use crate::DbError;
    use furnstock_core::{
        CoreError, DeliveryLine, Money, NewDelivery, ValidationError, MAX_AMOUNT_CENTS,
    };

    #[tokio::test]
    async fn test_delivery_raises_stock_and_reprices() {
        let db = test_db().await;
        let c = category(&db, "Wardrobes").await;
        let s = supplier(&db, "Fabrika").await;
        let p = product(&db, &c.id, "WRD-1", 70_000, 0).await;
        stock_up(&db, &p.id, 3).await;

        let id = db
            .deliveries()
            .create_delivery(&NewDelivery {
                supplier_id: s.id.clone(),
                delivery_date: date(2024, 5, 2),
                items: vec![DeliveryLine::new(&p.id, 10, Money::from_cents(50_000))],
            })
            .await
            .unwrap();

        assert_eq!(db.stock().get(&p.id).await.unwrap(), 13);
        assert_eq!(db.products().get_product(&p.id).await.unwrap().price_cents, 60_000);

        let delivery = db.deliveries().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(delivery.total(), Money::from_cents(500_000));
        assert_eq!(delivery.delivery_date, date(2024, 5, 2));
        assert_eq!(delivery.supplier_id, s.id);
    }

    #[tokio::test]
    async fn test_oversized_delivery_is_rejected_without_writes() {
        let db = test_db().await;
        let c = category(&db, "Wardrobes").await;
        let s = supplier(&db, "Fabrika").await;
        let p = product(&db, &c.id, "WRD-1", 70_000, 0).await;
        stock_up(&db, &p.id, 3).await;

        let request = |items| NewDelivery {
            supplier_id: s.id.clone(),
            delivery_date: date(2024, 5, 2),
            items,
        };

        let err = db
            .deliveries()
            .create_delivery(&request(vec![DeliveryLine::new(
                &p.id,
                100_000_000_000_000,
                Money::from_cents(100_000),
            )]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        let err = db
            .deliveries()
            .create_delivery(&request(vec![
                DeliveryLine::new(&p.id, 1, Money::from_cents(MAX_AMOUNT_CENTS / 2 + 1)),
                DeliveryLine::new(&p.id, 1, Money::from_cents(MAX_AMOUNT_CENTS / 2 + 1)),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        assert_eq!(db.stock().get(&p.id).await.unwrap(), 3);
        assert_eq!(db.products().get_product(&p.id).await.unwrap().price_cents, 70_000);
        assert!(db.deliveries().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_total_matches_lines_and_order_is_kept() {
        let db = test_db().await;
        let c = category(&db, "Chairs").await;
        let s = supplier(&db, "Fabrika").await;
        let b = product(&db, &c.id, "CH-B", 1_000, 0).await;
        let a = product(&db, &c.id, "CH-A", 1_000, 0).await;

        let request = NewDelivery {
            supplier_id: s.id.clone(),
            delivery_date: date(2024, 5, 2),
            items: vec![
                DeliveryLine::new(&b.id, 3, Money::from_cents(1_999)),
                DeliveryLine::new(&a.id, 1, Money::from_cents(12_345)),
                DeliveryLine::new(&b.id, 2, Money::from_cents(2_001)),
            ],
        };
        let id = db.deliveries().create_delivery(&request).await.unwrap();

        let items = db.deliveries().get_items(&id).await.unwrap();
        let order: Vec<(&str, i64)> = items
            .iter()
            .map(|i| (i.product_id.as_str(), i.line_no))
            .collect();
        assert_eq!(order, vec![(b.id.as_str(), 1), (a.id.as_str(), 2), (b.id.as_str(), 3)]);

        let line_sum: Money = items.iter().map(|i| i.line_total()).sum();
        let delivery = db.deliveries().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(delivery.total(), line_sum);
        assert_eq!(delivery.total_cents, 3 * 1_999 + 12_345 + 2 * 2_001);

        // Last line for a product wins the repricing.
        assert_eq!(db.products().get_product(&b.id).await.unwrap().price_cents, 2_401);
        assert_eq!(db.stock().get(&b.id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back_everything() {
        let db = test_db().await;
        let c = category(&db, "Chairs").await;
        let s = supplier(&db, "Fabrika").await;
        let p = product(&db, &c.id, "CH-1", 1_000, 0).await;

        let err = db
            .deliveries()
            .create_delivery(&NewDelivery {
                supplier_id: s.id.clone(),
                delivery_date: date(2024, 5, 2),
                items: vec![
                    DeliveryLine::new(&p.id, 4, Money::from_cents(5_000)),
                    DeliveryLine::new("ghost", 1, Money::from_cents(5_000)),
                ],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(ref id)) if id == "ghost"));

        assert_eq!(db.stock().get(&p.id).await.unwrap(), 0);
        assert_eq!(db.products().get_product(&p.id).await.unwrap().price_cents, 1_000);
        assert!(db.deliveries().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_supplier() {
        let db = test_db().await;
        let c = category(&db, "Chairs").await;
        let p = product(&db, &c.id, "CH-1", 1_000, 0).await;

        let err = db
            .deliveries()
            .create_delivery(&NewDelivery {
                supplier_id: "nobody".to_string(),
                delivery_date: date(2024, 5, 2),
                items: vec![DeliveryLine::new(&p.id, 1, Money::from_cents(5_000))],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::SupplierNotFound(_))));
        assert_eq!(db.stock().get(&p.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_lines_rejected_before_writing() {
        let db = test_db().await;
        let s = supplier(&db, "Fabrika").await;

        let err = db
            .deliveries()
            .create_delivery(&NewDelivery {
                supplier_id: s.id.clone(),
                delivery_date: date(2024, 5, 2),
                items: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert!(db.deliveries().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deliveries_with_items_newest_first() {
        let db = test_db().await;
        let c = category(&db, "Chairs").await;
        let s = supplier(&db, "Fabrika").await;
        let p = product(&db, &c.id, "CH-1", 1_000, 0).await;

        for (day, qty) in [(1, 2), (9, 5)] {
            db.deliveries()
                .create_delivery(&NewDelivery {
                    supplier_id: s.id.clone(),
                    delivery_date: date(2024, 6, day),
                    items: vec![DeliveryLine::new(&p.id, qty, Money::from_cents(800))],
                })
                .await
                .unwrap();
        }

        let all = db.deliveries().get_deliveries_with_items().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].delivery.delivery_date, date(2024, 6, 9));
        assert_eq!(all[0].delivery.supplier_name, "Fabrika");
        assert_eq!(all[0].delivery.item_count, 1);
        assert_eq!(all[0].items[0].quantity, 5);
        assert_eq!(all[0].items[0].sku, "CH-1");
        assert_eq!(all[1].items[0].quantity, 2);
    }
}
