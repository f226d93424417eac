//! # Supplier Commands

use clap::{Args, Subcommand};
use furnstock_core::{NewSupplier, Supplier};
use tracing::info;

use super::{or_dash, Context};
use crate::error::{CliError, CliResult};

#[derive(Debug, Subcommand)]
pub enum SupplierCommand {
    /// List suppliers by name
    List,

    /// Show one supplier
    Show { id: String },

    /// Register a supplier
    Add(SupplierArgs),

    /// Delete a supplier by id
    Delete { id: String },

    /// Delete every supplier with this tax number
    DeleteByInn { inn: String },
}

#[derive(Debug, Clone, Args)]
pub struct SupplierArgs {
    #[arg(long)]
    pub name: String,

    /// Taxpayer number, digits only
    #[arg(long)]
    pub inn: String,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,
}

impl From<SupplierArgs> for NewSupplier {
    fn from(args: SupplierArgs) -> Self {
        NewSupplier {
            name: args.name,
            city: args.city,
            phone: args.phone,
            inn: args.inn,
            email: args.email,
        }
    }
}

pub async fn run(ctx: &Context, cmd: SupplierCommand) -> CliResult<String> {
    match cmd {
        SupplierCommand::List => {
            let suppliers = ctx.db.suppliers().list().await?;
            ctx.render(&suppliers, |s| render_list(s))
        }
        SupplierCommand::Show { id } => {
            let supplier = ctx
                .db
                .suppliers()
                .get_by_id(&id)
                .await?
                .ok_or_else(|| CliError::not_found("Supplier", &id))?;
            ctx.render(&supplier, render_detail)
        }
        SupplierCommand::Add(args) => {
            let supplier = ctx.db.suppliers().insert(&args.into()).await?;
            info!(id = %supplier.id, inn = %supplier.inn, "Supplier added");
            ctx.render(&supplier, |s| format!("Added supplier {} ({})", s.name, s.id))
        }
        SupplierCommand::Delete { id } => {
            let removed = ctx.db.suppliers().delete_by_id(&id).await?;
            if removed == 0 {
                return Err(CliError::not_found("Supplier", &id));
            }
            ctx.render(&serde_json::json!({ "deleted": removed }), |_| {
                format!("Deleted supplier {}", id)
            })
        }
        SupplierCommand::DeleteByInn { inn } => {
            let removed = ctx.db.suppliers().delete_by_inn(&inn).await?;
            info!(inn = %inn, removed, "Suppliers deleted by INN");
            ctx.render(&serde_json::json!({ "deleted": removed }), |_| {
                format!("Deleted {} supplier(s) with INN {}", removed, inn)
            })
        }
    }
}

fn render_list(suppliers: &[Supplier]) -> String {
    if suppliers.is_empty() {
        return "No suppliers".to_string();
    }

    suppliers
        .iter()
        .map(|s| {
            format!(
                "{:<36}  {:<30} {:<14} {:<16} {}",
                s.id,
                s.name,
                s.inn,
                or_dash(s.city.as_deref()),
                or_dash(s.phone.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_detail(s: &Supplier) -> String {
    [
        format!("Supplier  {} ({})", s.name, s.id),
        format!("INN       {}", s.inn),
        format!("City      {}", or_dash(s.city.as_deref())),
        format!("Phone     {}", or_dash(s.phone.as_deref())),
        format!("Email     {}", or_dash(s.email.as_deref())),
    ]
    .join("\n")
}
