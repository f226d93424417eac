//! # Product Repository
//!
//! Catalog operations for products.
//!
//! ## Key Operations
//! - SKU-unique create / update (stock row created with the product)
//! - Listings joined with category name and stock level
//! - Price overwrite used by the delivery transaction
//!
//! ## Product Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_product ──► products row + stock row (quantity 0), one tx       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  delivery ──► stock += qty, price = purchase × 1.20                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  sale ──► stock -= qty (price and discount snapshotted on the line)     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  delete_product ──► stock row cascades                                  │
//! │                     (refused while deliveries or sales reference it)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use furnstock_core::validation::{validate_new_product, validate_sku};
use furnstock_core::{CoreError, Money, NewProduct, Product, ProductListing, ValidationError};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::{category, new_id, stock};
use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = r#"
    id, name, sku, category_id, price_cents, discount_bps,
    material, color, length, width, height, photo_path,
    created_at, updated_at
"#;

const LISTING_SELECT: &str = r#"
    SELECT
        p.id, p.name, p.sku, p.category_id, c.name AS category_name,
        p.price_cents, p.discount_bps,
        p.material, p.color, p.length, p.width, p.height, p.photo_path,
        COALESCE(s.quantity, 0) AS quantity
    FROM products p
    INNER JOIN categories c ON c.id = p.category_id
    LEFT JOIN stock s ON s.product_id = p.id
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by id, `None` if missing.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut *conn, id).await
    }

    /// Gets a product by id.
    ///
    /// ## Returns
    /// * `Err(ProductNotFound)` - No product with this id
    pub async fn get_product(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Catalog listing, optionally restricted to one category, ordered by
    /// name.
    pub async fn get_products(&self, category_id: Option<&str>) -> DbResult<Vec<ProductListing>> {
        let sql = format!(
            "{} WHERE (?1 IS NULL OR p.category_id = ?1) ORDER BY p.name, p.sku",
            LISTING_SELECT
        );
        let listings = sqlx::query_as::<_, ProductListing>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = listings.len(), category_id = ?category_id, "Listed products");
        Ok(listings)
    }

    /// Exact, case-sensitive SKU lookup.
    pub async fn search_by_sku(&self, sku: &str) -> DbResult<Option<ProductListing>> {
        let sql = format!("{} WHERE p.sku = ?1", LISTING_SELECT);
        let listing = sqlx::query_as::<_, ProductListing>(&sql)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(listing)
    }

    /// Products with a standing discount, biggest discount first.
    pub async fn list_discounted(
        &self,
        category_id: Option<&str>,
    ) -> DbResult<Vec<ProductListing>> {
        let sql = format!(
            "{} WHERE p.discount_bps > 0 AND (?1 IS NULL OR p.category_id = ?1) \
             ORDER BY p.discount_bps DESC, p.name",
            LISTING_SELECT
        );
        let listings = sqlx::query_as::<_, ProductListing>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(listings)
    }

    /// Creates a product and its stock row (quantity 0) atomically.
    ///
    /// ## Returns
    /// * `Err(Validation(Duplicate))` - SKU already in use
    /// * `Err(CategoryNotFound)` - Unknown category
    pub async fn create_product(&self, input: &NewProduct) -> DbResult<Product> {
        validate_new_product(input)?;

        let now = Utc::now();
        let product = build_product(new_id(), input, now, now);

        debug!(sku = %product.sku, "Creating product");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        ensure_category(&mut *tx, &product.category_id).await?;
        ensure_sku_free(&mut *tx, &product.sku, None).await?;

        sqlx::query(&format!(
            "INSERT INTO products ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            PRODUCT_COLUMNS
        ))
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.discount_bps)
        .bind(&product.material)
        .bind(&product.color)
        .bind(product.length)
        .bind(product.width)
        .bind(product.height)
        .bind(&product.photo_path)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| sku_conflict(e, &product.sku))?;

        stock::initialize(&mut *tx, &product.id, now).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %product.id, sku = %product.sku, "Product created");
        Ok(product)
    }

    /// Replaces every editable field of a product. The SKU must stay unique
    /// among the other products.
    pub async fn update_product(&self, id: &str, input: &NewProduct) -> DbResult<Product> {
        validate_new_product(input)?;

        debug!(id = %id, sku = %input.sku, "Updating product");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let existing = fetch_product(&mut *tx, id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
        let product = build_product(existing.id, input, existing.created_at, Utc::now());

        ensure_category(&mut *tx, &product.category_id).await?;
        ensure_sku_free(&mut *tx, &product.sku, Some(id)).await?;

        sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                sku = ?3,
                category_id = ?4,
                price_cents = ?5,
                discount_bps = ?6,
                material = ?7,
                color = ?8,
                length = ?9,
                width = ?10,
                height = ?11,
                photo_path = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.discount_bps)
        .bind(&product.material)
        .bind(&product.color)
        .bind(product.length)
        .bind(product.width)
        .bind(product.height)
        .bind(&product.photo_path)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| sku_conflict(e, &product.sku))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %product.id, sku = %product.sku, "Product updated");
        Ok(product)
    }

    /// Deletes a product; its stock row goes with it.
    ///
    /// ## Returns
    /// * `Err(ProductNotFound)` - No product with this id
    /// * `Err(ForeignKeyViolation)` - Deliveries or sales reference it
    pub async fn delete_product(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Overwrites the base price of a product.
    pub async fn set_price(&self, product_id: &str, price: Money) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        set_price(&mut *conn, product_id, price, Utc::now()).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Transaction Building Blocks
// =============================================================================

/// Loads a product on the caller's connection.
pub async fn fetch_product(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(product)
}

/// Overwrites a product's base price on the caller's connection.
///
/// ## Returns
/// * `Err(ProductNotFound)` - No product with this id
pub async fn set_price(
    conn: &mut SqliteConnection,
    product_id: &str,
    price: Money,
    now: DateTime<Utc>,
) -> DbResult<()> {
    debug!(product_id = %product_id, price = %price, "Setting product price");

    let result = sqlx::query("UPDATE products SET price_cents = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(product_id)
        .bind(price.cents())
        .bind(now)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::ProductNotFound(product_id.to_string()).into());
    }
    Ok(())
}

fn build_product(
    id: String,
    input: &NewProduct,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Product {
    Product {
        id,
        name: input.name.trim().to_string(),
        sku: input.sku.trim().to_string(),
        category_id: input.category_id.trim().to_string(),
        price_cents: input.price.cents(),
        discount_bps: input.discount.bps() as i64,
        material: input.material.clone(),
        color: input.color.clone(),
        length: input.length,
        width: input.width,
        height: input.height,
        photo_path: input.photo_path.clone(),
        created_at,
        updated_at,
    }
}

async fn ensure_category(conn: &mut SqliteConnection, category_id: &str) -> DbResult<()> {
    if !category::exists(conn, category_id).await? {
        return Err(CoreError::CategoryNotFound(category_id.to_string()).into());
    }
    Ok(())
}

/// Fails with `Duplicate` when another product (not `except_id`) has `sku`.
async fn ensure_sku_free(
    conn: &mut SqliteConnection,
    sku: &str,
    except_id: Option<&str>,
) -> DbResult<()> {
    validate_sku(sku)?;

    let taken: Option<String> = sqlx::query_scalar(
        "SELECT id FROM products WHERE sku = ?1 AND (?2 IS NULL OR id <> ?2)",
    )
    .bind(sku)
    .bind(except_id)
    .fetch_optional(&mut *conn)
    .await?;

    if taken.is_some() {
        return Err(duplicate_sku(sku));
    }
    Ok(())
}

fn duplicate_sku(sku: &str) -> DbError {
    ValidationError::Duplicate {
        field: "sku".to_string(),
        value: sku.to_string(),
    }
    .into()
}

/// Maps a UNIQUE failure on insert/update back to a duplicate-SKU error.
fn sku_conflict(err: sqlx::Error, sku: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => duplicate_sku(sku),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_support::{category, product, stock_up, test_db};
    use crate::DbError;
    use furnstock_core::{CoreError, Discount, Money, NewProduct, ValidationError};

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let c = category(&db, "Sofas").await;

        let mut input = NewProduct::new("Corner sofa", "SOFA-CRN", &c.id, Money::from_cents(150_000));
        input.material = Some("velvet".to_string());
        input.length = Some(260.0);

        let created = db.products().create_product(&input).await.unwrap();
        let fetched = db.products().get_product(&created.id).await.unwrap();
        assert_eq!(fetched.sku, "SOFA-CRN");
        assert_eq!(fetched.material.as_deref(), Some("velvet"));
        assert_eq!(fetched.length, Some(260.0));
        assert_eq!(fetched.price(), Money::from_cents(150_000));
        assert_eq!(db.stock().get(&created.id).await.unwrap(), 0);
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected_case_sensitive() {
        let db = test_db().await;
        let c = category(&db, "Sofas").await;
        product(&db, &c.id, "SOFA-1", 10_000, 0).await;

        let dup = NewProduct::new("Other", "SOFA-1", &c.id, Money::from_cents(5_000));
        let err = db.products().create_product(&dup).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));

        let lower = NewProduct::new("Other", "sofa-1", &c.id, Money::from_cents(5_000));
        assert!(db.products().create_product(&lower).await.is_ok());
        assert_eq!(db.products().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_category() {
        let db = test_db().await;
        let input = NewProduct::new("Lamp", "LAMP-1", "missing", Money::from_cents(1_000));
        let err = db.products().create_product(&input).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CategoryNotFound(_))));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_checks_sku_against_others_only() {
        let db = test_db().await;
        let c = category(&db, "Chairs").await;
        let a = product(&db, &c.id, "CH-A", 5_000, 0).await;
        product(&db, &c.id, "CH-B", 6_000, 0).await;

        // Keeping its own SKU is fine.
        let same = NewProduct::new("Chair A2", "CH-A", &c.id, Money::from_cents(5_500))
            .with_discount(Discount::from_percent(5));
        let updated = db.products().update_product(&a.id, &same).await.unwrap();
        assert_eq!(updated.name, "Chair A2");
        assert_eq!(updated.created_at, a.created_at);
        assert_eq!(db.products().get_product(&a.id).await.unwrap().discount_bps, 500);

        let clash = NewProduct::new("Chair A", "CH-B", &c.id, Money::from_cents(5_000));
        assert!(db.products().update_product(&a.id, &clash).await.is_err());

        let err = db.products().update_product("ghost", &same).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_listings_and_filters() {
        let db = test_db().await;
        let chairs = category(&db, "Chairs").await;
        let tables = category(&db, "Tables").await;
        let chair = product(&db, &chairs.id, "CH-1", 10_000, 10).await;
        product(&db, &chairs.id, "CH-2", 8_000, 25).await;
        product(&db, &tables.id, "TB-1", 40_000, 0).await;
        stock_up(&db, &chair.id, 3).await;

        let all = db.products().get_products(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let only_chairs = db.products().get_products(Some(&chairs.id)).await.unwrap();
        assert_eq!(only_chairs.len(), 2);
        assert!(only_chairs.iter().all(|l| l.category_name == "Chairs"));

        let found = db.products().search_by_sku("CH-1").await.unwrap().unwrap();
        assert_eq!(found.quantity, 3);
        assert_eq!(found.effective_price().cents(), 9_000);
        assert!(db.products().search_by_sku("ch-1").await.unwrap().is_none());

        let discounted = db.products().list_discounted(None).await.unwrap();
        let skus: Vec<&str> = discounted.iter().map(|l| l.sku.as_str()).collect();
        assert_eq!(skus, vec!["CH-2", "CH-1"]);
    }

    #[tokio::test]
    async fn test_set_price_and_delete_cascades_stock() {
        let db = test_db().await;
        let c = category(&db, "Beds").await;
        let p = product(&db, &c.id, "BED-1", 30_000, 0).await;
        stock_up(&db, &p.id, 2).await;

        db.products().set_price(&p.id, Money::from_cents(36_000)).await.unwrap();
        assert_eq!(db.products().get_product(&p.id).await.unwrap().price_cents, 36_000);

        db.products().delete_product(&p.id).await.unwrap();
        assert!(db.stock().entry(&p.id).await.unwrap().is_none());
        assert!(db.products().get_by_id(&p.id).await.unwrap().is_none());

        let err = db.products().delete_product(&p.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(db.products().set_price(&p.id, Money::from_cents(1)).await.is_err());
    }
}
