//! # Category Commands

use clap::Subcommand;
use furnstock_core::Category;
use tracing::info;

use super::Context;
use crate::error::{CliError, CliResult};

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// List categories by name
    List,

    /// Add a category
    Add {
        /// Category name, must be unique
        name: String,
    },

    /// Delete a category that no product uses
    Delete {
        /// Category id
        id: String,
    },
}

pub async fn run(ctx: &Context, cmd: CategoryCommand) -> CliResult<String> {
    match cmd {
        CategoryCommand::List => {
            let categories = ctx.db.categories().list().await?;
            ctx.render(&categories, |categories| render_list(categories))
        }
        CategoryCommand::Add { name } => {
            let category = ctx.db.categories().insert(&name).await?;
            info!(id = %category.id, name = %category.name, "Category added");
            ctx.render(&category, |c| format!("Added category {} ({})", c.name, c.id))
        }
        CategoryCommand::Delete { id } => {
            if !ctx.db.categories().delete(&id).await? {
                return Err(CliError::not_found("Category", &id));
            }
            info!(id = %id, "Category deleted");
            ctx.render(&serde_json::json!({ "deleted": id }), |_| {
                format!("Deleted category {}", id)
            })
        }
    }
}

fn render_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories".to_string();
    }

    categories
        .iter()
        .map(|c| format!("{:<36}  {}", c.id, c.name))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{json_context, text_context};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_add_list_delete() {
        let ctx = text_context().await;

        let out = run(&ctx, CategoryCommand::Add { name: "Sofas".into() })
            .await
            .unwrap();
        assert!(out.starts_with("Added category Sofas"));

        let out = run(&ctx, CategoryCommand::List).await.unwrap();
        assert!(out.contains("Sofas"));

        let id = ctx.db.categories().list().await.unwrap()[0].id.clone();
        run(&ctx, CategoryCommand::Delete { id: id.clone() })
            .await
            .unwrap();

        let err = run(&ctx, CategoryCommand::Delete { id }).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_a_validation_error() {
        let ctx = json_context().await;
        run(&ctx, CategoryCommand::Add { name: "Beds".into() })
            .await
            .unwrap();

        let err = run(&ctx, CategoryCommand::Add { name: "Beds".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_json_list() {
        let ctx = json_context().await;
        run(&ctx, CategoryCommand::Add { name: "Chairs".into() })
            .await
            .unwrap();

        let out = run(&ctx, CategoryCommand::List).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["name"], "Chairs");
    }
}
