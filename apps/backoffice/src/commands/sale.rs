//! # Sale Commands
//!
//! Recording sales and reading them back.
//!
//! ## Item Syntax
//! ```text
//! --item PRODUCT:QTY            use the product's current discount
//! --item PRODUCT:QTY:DISCOUNT   explicit discount for this line (percent)
//!
//!   SOF-OSLO-OAK:1          1 sofa at its standing discount
//!   CHR-CLASSIC-WHT:4:15    4 chairs at 15% off
//!   CHR-CLASSIC-WHT:4:0     4 chairs at full price
//! ```
//!
//! The whole sale is one transaction: if any line is short on stock nothing
//! is written and the command exits with `INSUFFICIENT_STOCK`.

use chrono::{NaiveDate, Utc};
use clap::{ArgAction, Args, Subcommand};
use furnstock_core::{Discount, Money, NewSale, SaleLine, SaleWithItems};
use tracing::info;

use super::product::parse_discount;
use super::{parse_date, parse_quantity, resolve_product, Context};
use crate::error::{CliError, CliResult};

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// Record a sale; lowers stock
    Record(RecordSaleArgs),

    /// List sales, newest first
    List,

    /// Show one sale with its lines
    Show { id: String },

    /// Sales with their lines, optionally within a date range
    Report {
        /// First day included (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Last day included (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RecordSaleArgs {
    #[arg(long = "customer")]
    pub customer_name: String,

    /// Employee id of the seller
    #[arg(long = "employee")]
    pub employee_id: Option<String>,

    /// Sale date (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Sale line as PRODUCT:QTY[:DISCOUNT] (product id or sku)
    #[arg(
        long = "item",
        value_parser = parse_sale_item,
        action = ArgAction::Append,
        required = true
    )]
    pub items: Vec<SaleItemArg>,
}

/// One `--item` of a sale, before the product is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleItemArg {
    pub product: String,
    pub quantity: i64,
    pub discount: Option<Discount>,
}

pub(crate) fn parse_sale_item(raw: &str) -> Result<SaleItemArg, String> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    let (product, quantity, discount) = match parts.as_slice() {
        [product, quantity] => (*product, *quantity, None),
        [product, quantity, discount] => (*product, *quantity, Some(parse_discount(discount)?)),
        _ => return Err(format!("invalid item '{raw}', expected PRODUCT:QTY[:DISCOUNT]")),
    };

    if product.is_empty() {
        return Err("product cannot be empty".to_string());
    }

    Ok(SaleItemArg {
        product: product.to_string(),
        quantity: parse_quantity(quantity)?,
        discount,
    })
}

pub async fn run(ctx: &Context, cmd: SaleCommand) -> CliResult<String> {
    match cmd {
        SaleCommand::Record(args) => record(ctx, args).await,
        SaleCommand::List => {
            let sales = ctx.db.sales().list().await?;
            ctx.render(&sales, |list| {
                if list.is_empty() {
                    return "No sales".to_string();
                }
                list.iter()
                    .map(|s| {
                        format!(
                            "{}  {}  {:<24} {:<28} {:>3} lines  {:>14}",
                            s.sale_date,
                            s.id,
                            s.customer_name,
                            s.employee_name.as_deref().unwrap_or("-"),
                            s.item_count,
                            ctx.money(Money::from_cents(s.total_cents))
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        SaleCommand::Show { id } => {
            let sale = ctx
                .db
                .sales()
                .get_sales_with_items(None, None)
                .await?
                .into_iter()
                .find(|s| s.sale.id == id)
                .ok_or_else(|| CliError::not_found("Sale", &id))?;
            ctx.render(&sale, |s| render_sale(ctx, s))
        }
        SaleCommand::Report { from, to } => {
            let sales = ctx.db.sales().get_sales_with_items(from, to).await?;
            ctx.render(&sales, |list| {
                if list.is_empty() {
                    return "No sales".to_string();
                }
                let total: Money = list.iter().map(|s| Money::from_cents(s.sale.total_cents)).sum();
                let mut blocks: Vec<String> = list.iter().map(|s| render_sale(ctx, s)).collect();
                blocks.push(format!("{} sale(s), revenue {}", list.len(), ctx.money(total)));
                blocks.join("\n\n")
            })
        }
    }
}

async fn record(ctx: &Context, args: RecordSaleArgs) -> CliResult<String> {
    let mut items = Vec::with_capacity(args.items.len());
    for item in &args.items {
        let product = resolve_product(&ctx.db, &item.product).await?;
        let line = SaleLine::new(product.id, item.quantity);
        items.push(match item.discount {
            Some(discount) => line.with_discount(discount),
            None => line,
        });
    }

    let input = NewSale {
        customer_name: args.customer_name,
        employee_id: args.employee_id,
        sale_date: args.date.unwrap_or_else(|| Utc::now().date_naive()),
        items,
    };

    let id = ctx.db.sales().create_sale(&input).await?;
    let sale = ctx
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| CliError::not_found("Sale", &id))?;

    info!(id = %id, lines = input.items.len(), "Sale recorded from CLI");

    ctx.render(&sale, |s| {
        format!(
            "Recorded sale {} for {} on {}: {} line(s), total {}",
            s.id,
            s.customer_name,
            s.sale_date,
            input.items.len(),
            ctx.money(s.total())
        )
    })
}

fn render_sale(ctx: &Context, s: &SaleWithItems) -> String {
    let mut lines = vec![format!(
        "Sale {}  {}  {}  seller {}  total {}",
        s.sale.id,
        s.sale.sale_date,
        s.sale.customer_name,
        s.sale.employee_name.as_deref().unwrap_or("-"),
        ctx.money(Money::from_cents(s.sale.total_cents))
    )];
    for item in &s.items {
        lines.push(format!(
            "  {:>2}. {:<20} {:<32} {:>4} x {:>14}  {:>7}  = {:>14}",
            item.line_no,
            item.sku,
            item.product_name,
            item.quantity,
            ctx.money(Money::from_cents(item.sale_price_cents)),
            discount_label(item.discount_bps),
            ctx.money(item.line_total())
        ));
    }
    lines.join("\n")
}

fn discount_label(bps: i64) -> String {
    match u32::try_from(bps).ok().and_then(|b| Discount::try_from_bps(b).ok()) {
        Some(d) if !d.is_zero() => format!("-{}", d),
        _ => String::new(),
    }
}
