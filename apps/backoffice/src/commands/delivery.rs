//! # Delivery Commands
//!
//! Recording goods received from a supplier.
//!
//! ## Recording Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  furnstock delivery record --supplier <ID> \                            │
//! │      --item SOF-OSLO-OAK:10:500 --item CHR-CLASSIC-WHT:4:37.80          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PRODUCT:QTY:PRICE ──► resolve sku/id ──► DeliveryLine                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  create_delivery (one transaction)                                      │
//! │    • header + items in input order                                      │
//! │    • stock += qty per line                                              │
//! │    • price  := purchase price + 20% per line                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use clap::{ArgAction, Args, Subcommand};
use furnstock_core::{DeliveryLine, DeliveryWithItems, Money, NewDelivery};
use tracing::info;

use super::{parse_date, parse_money, parse_quantity, resolve_product, Context};
use crate::error::{CliError, CliResult};

#[derive(Debug, Subcommand)]
pub enum DeliveryCommand {
    /// Record a delivery; raises stock and reprices the products
    Record(RecordDeliveryArgs),

    /// List deliveries, newest first
    List,

    /// Show one delivery with its lines
    Show { id: String },

    /// Every delivery with its lines
    Report,
}

#[derive(Debug, Clone, Args)]
pub struct RecordDeliveryArgs {
    /// Supplier id
    #[arg(long = "supplier")]
    pub supplier_id: String,

    /// Delivery date (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Delivery line as PRODUCT:QTY:PRICE (product id or sku)
    #[arg(
        long = "item",
        value_parser = parse_delivery_item,
        action = ArgAction::Append,
        required = true
    )]
    pub items: Vec<DeliveryItemArg>,
}

/// One `--item` of a delivery, before the product is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryItemArg {
    pub product: String,
    pub quantity: i64,
    pub purchase_price: Money,
}

pub(crate) fn parse_delivery_item(raw: &str) -> Result<DeliveryItemArg, String> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    let [product, quantity, price] = parts.as_slice() else {
        return Err(format!("invalid item '{raw}', expected PRODUCT:QTY:PRICE"));
    };

    if product.is_empty() {
        return Err("product cannot be empty".to_string());
    }

    let purchase_price = parse_money(price)?;
    if !purchase_price.is_positive() {
        return Err("purchase price must be positive".to_string());
    }

    Ok(DeliveryItemArg {
        product: product.to_string(),
        quantity: parse_quantity(quantity)?,
        purchase_price,
    })
}

pub async fn run(ctx: &Context, cmd: DeliveryCommand) -> CliResult<String> {
    match cmd {
        DeliveryCommand::Record(args) => record(ctx, args).await,
        DeliveryCommand::List => {
            let deliveries = ctx.db.deliveries().list().await?;
            ctx.render(&deliveries, |list| {
                if list.is_empty() {
                    return "No deliveries".to_string();
                }
                list.iter()
                    .map(|d| {
                        format!(
                            "{}  {}  {:<30} {:>3} lines  {:>14}",
                            d.delivery_date,
                            d.id,
                            d.supplier_name,
                            d.item_count,
                            ctx.money(Money::from_cents(d.total_cents))
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        DeliveryCommand::Show { id } => {
            let delivery = ctx
                .db
                .deliveries()
                .get_deliveries_with_items()
                .await?
                .into_iter()
                .find(|d| d.delivery.id == id)
                .ok_or_else(|| CliError::not_found("Delivery", &id))?;
            ctx.render(&delivery, |d| render_delivery(ctx, d))
        }
        DeliveryCommand::Report => {
            let deliveries = ctx.db.deliveries().get_deliveries_with_items().await?;
            ctx.render(&deliveries, |list| {
                if list.is_empty() {
                    return "No deliveries".to_string();
                }
                list.iter()
                    .map(|d| render_delivery(ctx, d))
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })
        }
    }
}

async fn record(ctx: &Context, args: RecordDeliveryArgs) -> CliResult<String> {
    let mut items = Vec::with_capacity(args.items.len());
    for item in &args.items {
        let product = resolve_product(&ctx.db, &item.product).await?;
        items.push(DeliveryLine::new(product.id, item.quantity, item.purchase_price));
    }

    let input = NewDelivery {
        supplier_id: args.supplier_id,
        delivery_date: args.date.unwrap_or_else(|| Utc::now().date_naive()),
        items,
    };

    let id = ctx.db.deliveries().create_delivery(&input).await?;
    let delivery = ctx
        .db
        .deliveries()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| CliError::not_found("Delivery", &id))?;

    info!(id = %id, lines = input.items.len(), "Delivery recorded from CLI");

    ctx.render(&delivery, |d| {
        format!(
            "Recorded delivery {} on {}: {} line(s), total {}",
            d.id,
            d.delivery_date,
            input.items.len(),
            ctx.money(d.total())
        )
    })
}

fn render_delivery(ctx: &Context, d: &DeliveryWithItems) -> String {
    let mut lines = vec![format!(
        "Delivery {}  {}  {}  total {}",
        d.delivery.id,
        d.delivery.delivery_date,
        d.delivery.supplier_name,
        ctx.money(Money::from_cents(d.delivery.total_cents))
    )];
    for item in &d.items {
        lines.push(format!(
            "  {:>2}. {:<20} {:<32} {:>4} x {:>14}",
            item.line_no,
            item.sku,
            item.product_name,
            item.quantity,
            ctx.money(Money::from_cents(item.purchase_price_cents))
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::text_context;
    use crate::error::ErrorCode;
    use furnstock_core::{NewProduct, NewSupplier};

    #[test]
    fn test_parse_delivery_item() {
        let item = parse_delivery_item("SOF-OSLO-OAK:10:500").unwrap();
        assert_eq!(item.product, "SOF-OSLO-OAK");
        assert_eq!(item.quantity, 10);
        assert_eq!(item.purchase_price.cents(), 50_000);

        let item = parse_delivery_item("CH-1 : 4 : 37,80").unwrap();
        assert_eq!(item.purchase_price.cents(), 3_780);

        assert!(parse_delivery_item("SOF-1:10").is_err());
        assert!(parse_delivery_item("SOF-1:0:500").is_err());
        assert!(parse_delivery_item("SOF-1:2:0").is_err());
        assert!(parse_delivery_item(":2:10").is_err());
        assert!(parse_delivery_item("SOF-1:2:10:extra").is_err());
    }

    #[tokio::test]
    async fn test_record_by_sku_reprices_and_stocks() {
        let ctx = text_context().await;
        let cat = ctx.db.categories().insert("Sofas").await.unwrap();
        let product = ctx
            .db
            .products()
            .create_product(&NewProduct::new(
                "Oslo Sofa",
                "SOF-OSLO",
                &cat.id,
                Money::from_cents(100_000),
            ))
            .await
            .unwrap();
        let supplier = ctx
            .db
            .suppliers()
            .insert(&NewSupplier {
                name: "Volga Works".into(),
                inn: "1655123456".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let out = run(
            &ctx,
            DeliveryCommand::Record(RecordDeliveryArgs {
                supplier_id: supplier.id.clone(),
                date: Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
                items: vec![parse_delivery_item("SOF-OSLO:10:500").unwrap()],
            }),
        )
        .await
        .unwrap();
        assert!(out.contains("on 2024-03-01: 1 line(s), total 5000.00"));

        assert_eq!(ctx.db.stock().get(&product.id).await.unwrap(), 10);
        let repriced = ctx.db.products().get_product(&product.id).await.unwrap();
        assert_eq!(repriced.price_cents, 60_000);

        let report = run(&ctx, DeliveryCommand::Report).await.unwrap();
        assert!(report.contains("Volga Works"));
        assert!(report.contains("SOF-OSLO"));
    }

    #[tokio::test]
    async fn test_record_unknown_product() {
        let ctx = text_context().await;
        let err = run(
            &ctx,
            DeliveryCommand::Record(RecordDeliveryArgs {
                supplier_id: "any".into(),
                date: None,
                items: vec![parse_delivery_item("GHOST:1:10").unwrap()],
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
