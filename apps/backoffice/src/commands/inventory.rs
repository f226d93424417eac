//! # Inventory Command
//!
//! Stock on hand per product, grouped by category, with the value of the
//! stock at current effective prices.

use clap::Args;
use furnstock_core::{InventoryRow, Money};
use serde::Serialize;

use super::{resolve_product, Context};
use crate::error::CliResult;

#[derive(Debug, Clone, Args)]
pub struct InventoryArgs {
    /// Only this product (id or sku)
    #[arg(long)]
    pub product: Option<String>,

    /// Only rows with stock at or below this quantity
    #[arg(long)]
    pub below: Option<i64>,
}

#[derive(Debug, Serialize)]
struct StockLevel {
    product_id: String,
    sku: String,
    quantity: i64,
}

pub async fn run(ctx: &Context, args: InventoryArgs) -> CliResult<String> {
    if let Some(reference) = args.product {
        let product = resolve_product(&ctx.db, &reference).await?;
        let level = StockLevel {
            quantity: ctx.db.stock().get(&product.id).await?,
            product_id: product.id,
            sku: product.sku,
        };
        return ctx.render(&level, |l| format!("{}  {} in stock", l.sku, l.quantity));
    }

    let mut rows = ctx.db.stock().get_inventory().await?;
    if let Some(limit) = args.below {
        rows.retain(|row| row.quantity <= limit);
    }

    ctx.render(&rows, |rows| render_inventory(ctx, rows))
}

fn render_inventory(ctx: &Context, rows: &[InventoryRow]) -> String {
    if rows.is_empty() {
        return "No products".to_string();
    }

    let mut lines = vec![format!(
        "{} inventory\n{:<14} {:<20} {:<32} {:>6} {:>14} {:>16}",
        ctx.config.store.name, "Category", "SKU", "Name", "Stock", "Sells at", "Value"
    )];
    for row in rows {
        lines.push(format!(
            "{:<14} {:<20} {:<32} {:>6} {:>14} {:>16}",
            row.category_name,
            row.sku,
            row.name,
            row.quantity,
            ctx.money(row.effective_price()),
            ctx.money(row.stock_value())
        ));
    }

    let units = rows.iter().fold(0_i64, |acc, row| acc.saturating_add(row.quantity));
    let value = rows
        .iter()
        .fold(Money::zero(), |acc, row| acc.saturating_add(row.stock_value()));
    lines.push(format!("Total: {} unit(s), value {}", units, ctx.money(value)));

    lines.join("\n")
}
