//! # Supplier Repository
//!
//! Suppliers are looked up by id; the INN (tax id) is not unique, so
//! `delete_by_inn` may remove several rows.

use chrono::Utc;
use furnstock_core::validation::{validate_inn, validate_new_supplier};
use furnstock_core::{NewSupplier, Supplier};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::new_id;
use crate::error::DbResult;

const SUPPLIER_COLUMNS: &str = "id, name, city, phone, inn, email, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

/// Blank optional text is stored as NULL.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Lists suppliers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let sql = format!("SELECT {} FROM suppliers ORDER BY name, created_at", SUPPLIER_COLUMNS);
        let suppliers = sqlx::query_as::<_, Supplier>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(suppliers)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let sql = format!("SELECT {} FROM suppliers WHERE id = ?1", SUPPLIER_COLUMNS);
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(supplier)
    }

    pub async fn insert(&self, input: &NewSupplier) -> DbResult<Supplier> {
        validate_new_supplier(input)?;

        let now = Utc::now();
        let supplier = Supplier {
            id: new_id(),
            name: input.name.trim().to_string(),
            city: non_blank(&input.city),
            phone: non_blank(&input.phone),
            inn: input.inn.trim().to_string(),
            email: non_blank(&input.email),
            created_at: now,
            updated_at: now,
        };

        debug!(name = %supplier.name, inn = %supplier.inn, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, city, phone, inn, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.city)
        .bind(&supplier.phone)
        .bind(&supplier.inn)
        .bind(&supplier.email)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Deletes a supplier by id. Returns the number of removed rows (0 or 1).
    pub async fn delete_by_id(&self, id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(id = %id, removed = result.rows_affected(), "Deleted supplier");
        Ok(result.rows_affected())
    }

    /// Deletes every supplier with the given INN. Returns the number removed.
    pub async fn delete_by_inn(&self, inn: &str) -> DbResult<u64> {
        validate_inn(inn)?;

        let result = sqlx::query("DELETE FROM suppliers WHERE inn = ?1")
            .bind(inn.trim())
            .execute(&self.pool)
            .await?;

        info!(inn = %inn, removed = result.rows_affected(), "Deleted suppliers by INN");
        Ok(result.rows_affected())
    }
}

/// Checks whether a supplier exists, on the caller's connection.
pub async fn exists(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM suppliers WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use crate::test_support::{supplier, test_db};
    use furnstock_core::NewSupplier;

    fn input(name: &str, inn: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            city: Some("  ".to_string()),
            phone: Some("+7 843 000-00-00".to_string()),
            inn: inn.to_string(),
            email: Some("sales@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_normalizes_blank_fields() {
        let db = test_db().await;
        let created = db.suppliers().insert(&input("Mebel Plus", "7701234567")).await.unwrap();

        let fetched = db.suppliers().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.city, None);
        assert_eq!(fetched.phone.as_deref(), Some("+7 843 000-00-00"));
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_rejects_bad_inn() {
        let db = test_db().await;
        assert!(db.suppliers().insert(&input("Bad", "77-01")).await.is_err());
        assert!(db.suppliers().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_inn_removes_all_matches() {
        let db = test_db().await;
        db.suppliers().insert(&input("Branch A", "7700000001")).await.unwrap();
        db.suppliers().insert(&input("Branch B", "7700000001")).await.unwrap();
        let other = db.suppliers().insert(&input("Other", "7700000002")).await.unwrap();

        assert_eq!(db.suppliers().delete_by_inn("7700000001").await.unwrap(), 2);
        assert_eq!(db.suppliers().delete_by_inn("7700000001").await.unwrap(), 0);

        let remaining = db.suppliers().list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, other.id);
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let db = test_db().await;
        let s = supplier(&db, "Fabrika").await;
        assert_eq!(db.suppliers().delete_by_id(&s.id).await.unwrap(), 1);
        assert_eq!(db.suppliers().delete_by_id(&s.id).await.unwrap(), 0);
    }
}
