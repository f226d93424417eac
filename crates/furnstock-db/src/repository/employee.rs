//! # Employee Repository

use chrono::Utc;
use furnstock_core::validation::validate_new_employee;
use furnstock_core::{Employee, NewEmployee};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::new_id;
use crate::error::DbResult;

const EMPLOYEE_COLUMNS: &str = "id, last_name, first_name, middle_name, position, created_at";

#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    /// Lists employees ordered by last name, first name.
    pub async fn list(&self) -> DbResult<Vec<Employee>> {
        let sql = format!(
            "SELECT {} FROM employees ORDER BY last_name, first_name",
            EMPLOYEE_COLUMNS
        );
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Employee>> {
        let sql = format!("SELECT {} FROM employees WHERE id = ?1", EMPLOYEE_COLUMNS);
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    pub async fn insert(&self, input: &NewEmployee) -> DbResult<Employee> {
        validate_new_employee(input)?;

        let employee = Employee {
            id: new_id(),
            last_name: input.last_name.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            middle_name: input
                .middle_name
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            position: input.position.clone(),
            created_at: Utc::now(),
        };

        debug!(name = %employee.full_name(), "Inserting employee");

        sqlx::query(
            r#"
            INSERT INTO employees (id, last_name, first_name, middle_name, position, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.last_name)
        .bind(&employee.first_name)
        .bind(&employee.middle_name)
        .bind(&employee.position)
        .bind(employee.created_at)
        .execute(&self.pool)
        .await?;

        Ok(employee)
    }
}

/// Checks whether an employee exists, on the caller's connection.
pub async fn exists(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM employees WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_db;
    use furnstock_core::NewEmployee;

    #[tokio::test]
    async fn test_insert_get_list() {
        let db = test_db().await;
        let repo = db.employees();

        let petrova = repo
            .insert(&NewEmployee {
                last_name: "Petrova".to_string(),
                first_name: "Anna".to_string(),
                middle_name: Some("".to_string()),
                position: Some("Manager".to_string()),
            })
            .await
            .unwrap();
        repo.insert(&NewEmployee {
            last_name: "Ivanov".to_string(),
            first_name: "Ivan".to_string(),
            middle_name: Some("Ivanovich".to_string()),
            position: None,
        })
        .await
        .unwrap();

        let fetched = repo.get_by_id(&petrova.id).await.unwrap().unwrap();
        assert_eq!(fetched.middle_name, None);
        assert_eq!(fetched.full_name(), "Petrova Anna");

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .iter()
            .map(|e| e.full_name())
            .collect();
        assert_eq!(names, vec!["Ivanov Ivan Ivanovich", "Petrova Anna"]);
    }

    #[tokio::test]
    async fn test_requires_names() {
        let db = test_db().await;
        let result = db.employees().insert(&NewEmployee::default()).await;
        assert!(result.is_err());
    }
}
