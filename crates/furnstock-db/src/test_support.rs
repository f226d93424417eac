//! Shared fixtures for repository tests.

use chrono::NaiveDate;
use furnstock_core::{Category, Discount, Money, NewProduct, NewSupplier, Product, Supplier};

use crate::pool::{Database, DbConfig};

pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(crate) async fn category(db: &Database, name: &str) -> Category {
    db.categories().insert(name).await.expect("insert category")
}

pub(crate) async fn supplier(db: &Database, name: &str) -> Supplier {
    db.suppliers()
        .insert(&NewSupplier {
            name: name.to_string(),
            city: Some("Kazan".to_string()),
            phone: None,
            inn: "1655000000".to_string(),
            email: None,
        })
        .await
        .expect("insert supplier")
}

/// Product with the given price (cents) and discount (whole percent).
pub(crate) async fn product(
    db: &Database,
    category_id: &str,
    sku: &str,
    price_cents: i64,
    discount_percent: u32,
) -> Product {
    let input = NewProduct::new(
        format!("Item {}", sku),
        sku,
        category_id,
        Money::from_cents(price_cents),
    )
    .with_discount(Discount::from_percent(discount_percent));
    db.products()
        .create_product(&input)
        .await
        .expect("insert product")
}

pub(crate) async fn stock_up(db: &Database, product_id: &str, quantity: i64) {
    db.stock()
        .increase(product_id, quantity)
        .await
        .expect("increase stock");
}
