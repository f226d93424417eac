//! # Product Commands
//!
//! Catalog maintenance for the back office.
//!
//! ## Price Display
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SKU               Name              Price     Disc   Sells at   Stock  │
//! │  SOF-OSLO-OAK      Oslo Sofa         1000.00   10%    900.00     4      │
//! │                                      ▲         ▲      ▲                 │
//! │                                      │         │      └─ effective      │
//! │                                      │         │         price          │
//! │                                      │         └─ standing discount     │
//! │                                      └─ base price (set by deliveries   │
//! │                                         as purchase price + 20%)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products can be addressed by id or by sku wherever a `PRODUCT` argument
//! is taken.

use clap::{Args, Subcommand};
use furnstock_core::validation::validate_price;
use furnstock_core::{Discount, Money, NewProduct, ProductListing};
use std::time::Instant;
use tracing::{debug, info};

use super::{or_dash, parse_money, resolve_product, Context};
use crate::error::{CliError, CliResult};

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// List products with category, effective price and stock
    List {
        /// Only this category
        #[arg(long = "category")]
        category_id: Option<String>,
    },

    /// List discounted products, biggest discount first
    Discounted {
        #[arg(long = "category")]
        category_id: Option<String>,
    },

    /// Show one product (by id or sku)
    Show { product: String },

    /// Add a product; stock starts at 0
    Add(ProductArgs),

    /// Replace all fields of a product
    Update {
        /// Product id or sku
        product: String,

        #[command(flatten)]
        fields: ProductArgs,
    },

    /// Overwrite the base price
    SetPrice {
        product: String,

        #[arg(value_parser = parse_money)]
        price: Money,
    },

    /// Delete a product that has no deliveries or sales
    Delete { product: String },
}

#[derive(Debug, Clone, Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: String,

    /// Unique article code (letters, digits, - _ . /)
    #[arg(long)]
    pub sku: String,

    /// Category id
    #[arg(long = "category")]
    pub category_id: String,

    /// Base price, e.g. 1299.50
    #[arg(long, value_parser = parse_money)]
    pub price: Money,

    /// Standing discount in percent, e.g. 15 or 12.5
    #[arg(long, value_parser = parse_discount, default_value = "0")]
    pub discount: Discount,

    #[arg(long)]
    pub material: Option<String>,

    #[arg(long)]
    pub color: Option<String>,

    /// Length in cm
    #[arg(long)]
    pub length: Option<f64>,

    /// Width in cm
    #[arg(long)]
    pub width: Option<f64>,

    /// Height in cm
    #[arg(long)]
    pub height: Option<f64>,

    /// Photo file reference, stored as given
    #[arg(long = "photo")]
    pub photo_path: Option<String>,
}

impl From<ProductArgs> for NewProduct {
    fn from(args: ProductArgs) -> Self {
        NewProduct {
            name: args.name,
            sku: args.sku,
            category_id: args.category_id,
            price: args.price,
            discount: args.discount,
            material: args.material,
            color: args.color,
            length: args.length,
            width: args.width,
            height: args.height,
            photo_path: args.photo_path,
        }
    }
}

pub(crate) fn parse_discount(raw: &str) -> Result<Discount, String> {
    raw.parse::<Discount>().map_err(|e| e.to_string())
}

pub async fn run(ctx: &Context, cmd: ProductCommand) -> CliResult<String> {
    match cmd {
        ProductCommand::List { category_id } => {
            let start = Instant::now();
            let listings = ctx.db.products().get_products(category_id.as_deref()).await?;
            debug!(
                count = listings.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Products listed"
            );
            ctx.render(&listings, |l| render_listings(ctx, l))
        }
        ProductCommand::Discounted { category_id } => {
            let listings = ctx
                .db
                .products()
                .list_discounted(category_id.as_deref())
                .await?;
            ctx.render(&listings, |l| render_listings(ctx, l))
        }
        ProductCommand::Show { product } => {
            let listing = find_listing(ctx, &product).await?;
            ctx.render(&listing, |l| render_detail(ctx, l))
        }
        ProductCommand::Add(args) => {
            let created = ctx.db.products().create_product(&args.into()).await?;
            info!(id = %created.id, sku = %created.sku, "Product added");
            ctx.render(&created, |p| format!("Added product {} ({})", p.sku, p.id))
        }
        ProductCommand::Update { product, fields } => {
            let existing = resolve_product(&ctx.db, &product).await?;
            let updated = ctx
                .db
                .products()
                .update_product(&existing.id, &fields.into())
                .await?;
            info!(id = %updated.id, sku = %updated.sku, "Product updated");
            ctx.render(&updated, |p| format!("Updated product {} ({})", p.sku, p.id))
        }
        ProductCommand::SetPrice { product, price } => {
            validate_price("price", price)?;
            let existing = resolve_product(&ctx.db, &product).await?;
            ctx.db.products().set_price(&existing.id, price).await?;
            let updated = ctx.db.products().get_product(&existing.id).await?;
            info!(id = %updated.id, price = %price, "Product price set");
            ctx.render(&updated, |p| {
                format!("{} now costs {}", p.sku, ctx.money(p.price()))
            })
        }
        ProductCommand::Delete { product } => {
            let existing = resolve_product(&ctx.db, &product).await?;
            ctx.db.products().delete_product(&existing.id).await?;
            ctx.render(&existing, |p| format!("Deleted product {} ({})", p.sku, p.id))
        }
    }
}

async fn find_listing(ctx: &Context, reference: &str) -> CliResult<ProductListing> {
    let product = resolve_product(&ctx.db, reference).await?;
    ctx.db
        .products()
        .search_by_sku(&product.sku)
        .await?
        .ok_or_else(|| CliError::not_found("Product", reference))
}

fn render_listings(ctx: &Context, listings: &[ProductListing]) -> String {
    if listings.is_empty() {
        return "No products".to_string();
    }

    let mut lines = vec![format!(
        "{:<20} {:<32} {:<14} {:>14} {:>7} {:>14} {:>6}",
        "SKU", "Name", "Category", "Price", "Disc", "Sells at", "Stock"
    )];
    for l in listings {
        lines.push(format!(
            "{:<20} {:<32} {:<14} {:>14} {:>7} {:>14} {:>6}",
            l.sku,
            l.name,
            l.category_name,
            ctx.money(l.price()),
            l.discount().to_string(),
            ctx.money(l.effective_price()),
            l.quantity
        ));
    }
    lines.join("\n")
}

fn render_detail(ctx: &Context, l: &ProductListing) -> String {
    let dimension = |v: Option<f64>| v.map(|v| format!("{}", v)).unwrap_or_else(|| "-".into());

    [
        format!("Product   {} ({})", l.name, l.id),
        format!("SKU       {}", l.sku),
        format!("Category  {}", l.category_name),
        format!("Price     {}", ctx.money(l.price())),
        format!("Discount  {}", l.discount()),
        format!("Sells at  {}", ctx.money(l.effective_price())),
        format!("Stock     {}", l.quantity),
        format!("Material  {}", or_dash(l.material.as_deref())),
        format!("Color     {}", or_dash(l.color.as_deref())),
        format!(
            "Size cm   {} x {} x {}",
            dimension(l.length),
            dimension(l.width),
            dimension(l.height)
        ),
        format!("Photo     {}", or_dash(l.photo_path.as_deref())),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{json_context, text_context};
    use crate::error::ErrorCode;

    fn args(category_id: &str, sku: &str, price: &str, discount: &str) -> ProductArgs {
        ProductArgs {
            name: format!("Product {}", sku),
            sku: sku.to_string(),
            category_id: category_id.to_string(),
            price: price.parse().unwrap(),
            discount: discount.parse().unwrap(),
            material: Some("oak".into()),
            color: None,
            length: Some(200.0),
            width: None,
            height: None,
            photo_path: None,
        }
    }

    #[tokio::test]
    async fn test_add_then_show_by_sku() {
        let ctx = text_context().await;
        let cat = ctx.db.categories().insert("Tables").await.unwrap();

        run(&ctx, ProductCommand::Add(args(&cat.id, "TBL-1", "1000", "10")))
            .await
            .unwrap();

        let out = run(&ctx, ProductCommand::Show { product: "TBL-1".into() })
            .await
            .unwrap();
        assert!(out.contains("Price     1000.00"));
        assert!(out.contains("Sells at  900.00"));
        assert!(out.contains("Stock     0"));
        assert!(out.contains("Material  oak"));
    }

    #[tokio::test]
    async fn test_set_price_and_reject_non_positive() {
        let ctx = json_context().await;
        let cat = ctx.db.categories().insert("Tables").await.unwrap();
        run(&ctx, ProductCommand::Add(args(&cat.id, "TBL-2", "500", "0")))
            .await
            .unwrap();

        let out = run(
            &ctx,
            ProductCommand::SetPrice {
                product: "TBL-2".into(),
                price: Money::from_cents(60_000),
            },
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["price_cents"], 60_000);

        let err = run(
            &ctx,
            ProductCommand::SetPrice {
                product: "TBL-2".into(),
                price: Money::zero(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_discounted_listing_order() {
        let ctx = text_context().await;
        let cat = ctx.db.categories().insert("Chairs").await.unwrap();
        for (sku, discount) in [("CH-A", "5"), ("CH-B", "0"), ("CH-C", "25")] {
            run(&ctx, ProductCommand::Add(args(&cat.id, sku, "100", discount)))
                .await
                .unwrap();
        }

        let out = run(&ctx, ProductCommand::Discounted { category_id: None })
            .await
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("CH-C"));
        assert!(lines[2].starts_with("CH-A"));
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let ctx = text_context().await;
        let err = run(&ctx, ProductCommand::Delete { product: "NOPE".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_parse_discount() {
        assert_eq!(parse_discount("15").unwrap().bps(), 1_500);
        assert_eq!(parse_discount("12.5%").unwrap().bps(), 1_250);
        assert!(parse_discount("120").is_err());
        assert!(parse_discount("-5").is_err());
    }
}
