//! # Back-Office Commands
//!
//! Every subcommand of the `furnstock` binary.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (dispatch, Context, shared parsing)
//! ├── category.rs   ◄─── Category list/add/delete
//! ├── product.rs    ◄─── Catalog CRUD, discounted listing, price changes
//! ├── supplier.rs   ◄─── Supplier register
//! ├── employee.rs   ◄─── Employee register
//! ├── delivery.rs   ◄─── Record deliveries, delivery reports
//! ├── sale.rs       ◄─── Record sales, sales reports
//! └── inventory.rs  ◄─── Stock on hand and stock value
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  $ furnstock --json sale record --customer Ivanov --item CHR-1:2        │
//! │         │                                                               │
//! │         │ (clap derive)                                                 │
//! │         ▼                                                               │
//! │  Command::Sale(SaleCommand::Record(args))                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  execute(&ctx, command) ──► sale::run(&ctx, cmd)                        │
//! │         │                      │                                        │
//! │         │                      ▼                                        │
//! │         │               db.sales().create_sale(&input)                  │
//! │         ▼                                                               │
//! │  CliResult<String>  ── text table, or pretty JSON with --json           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands return the rendered output instead of printing it, so they can
//! be exercised against an in-memory database.

pub mod category;
pub mod delivery;
pub mod employee;
pub mod inventory;
pub mod product;
pub mod sale;
pub mod supplier;

use chrono::NaiveDate;
use clap::Subcommand;
use furnstock_core::validation::validate_quantity;
use furnstock_core::{CoreError, Money, Product};
use furnstock_db::Database;
use serde::Serialize;

use crate::config::BackofficeConfig;
use crate::error::CliResult;

/// Everything a command needs.
pub struct Context {
    pub db: Database,
    pub config: BackofficeConfig,
    /// Render output as pretty JSON instead of text.
    pub json: bool,
}

impl Context {
    pub fn new(db: Database, config: BackofficeConfig, json: bool) -> Self {
        Context { db, config, json }
    }

    /// JSON when `--json` is set, otherwise the text produced by `text`.
    pub fn render<T, F>(&self, value: &T, text: F) -> CliResult<String>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        if self.json {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(text(value))
        }
    }

    pub fn money(&self, amount: Money) -> String {
        self.config.format_currency(amount)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage product categories
    #[command(subcommand)]
    Category(category::CategoryCommand),

    /// Manage the product catalog
    #[command(subcommand)]
    Product(product::ProductCommand),

    /// Manage suppliers
    #[command(subcommand)]
    Supplier(supplier::SupplierCommand),

    /// Manage employees
    #[command(subcommand)]
    Employee(employee::EmployeeCommand),

    /// Record and report deliveries
    #[command(subcommand)]
    Delivery(delivery::DeliveryCommand),

    /// Record and report sales
    #[command(subcommand)]
    Sale(sale::SaleCommand),

    /// Show stock on hand
    Inventory(inventory::InventoryArgs),
}

/// Runs one command and returns what should be printed.
pub async fn execute(ctx: &Context, command: Command) -> CliResult<String> {
    match command {
        Command::Category(cmd) => category::run(ctx, cmd).await,
        Command::Product(cmd) => product::run(ctx, cmd).await,
        Command::Supplier(cmd) => supplier::run(ctx, cmd).await,
        Command::Employee(cmd) => employee::run(ctx, cmd).await,
        Command::Delivery(cmd) => delivery::run(ctx, cmd).await,
        Command::Sale(cmd) => sale::run(ctx, cmd).await,
        Command::Inventory(args) => inventory::run(ctx, args).await,
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Finds a product by id, falling back to an exact sku match.
pub(crate) async fn resolve_product(db: &Database, reference: &str) -> CliResult<Product> {
    if let Some(product) = db.products().get_by_id(reference).await? {
        return Ok(product);
    }

    match db.products().search_by_sku(reference).await? {
        Some(listing) => Ok(db.products().get_product(&listing.id).await?),
        None => Err(CoreError::ProductNotFound(reference.to_string()).into()),
    }
}

/// `YYYY-MM-DD` date argument.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

pub(crate) fn parse_money(raw: &str) -> Result<Money, String> {
    raw.parse::<Money>().map_err(|e| e.to_string())
}

/// Positive item quantity.
pub(crate) fn parse_quantity(raw: &str) -> Result<i64, String> {
    let quantity: i64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity '{raw}'"))?;
    validate_quantity(quantity).map_err(|e| e.to_string())?;
    Ok(quantity)
}

/// Text for an optional column.
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Context;
    use crate::config::BackofficeConfig;
    use furnstock_db::{Database, DbConfig};

    /// Context over a fresh in-memory database; text output, bare amounts.
    pub async fn text_context() -> Context {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut config = BackofficeConfig::default();
        config.store.currency_symbol = String::new();
        Context::new(db, config, false)
    }

    pub async fn json_context() -> Context {
        let mut ctx = text_context().await;
        ctx.json = true;
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert!(parse_date("15.03.2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3").unwrap(), 3);
        assert!(parse_quantity("0").is_err());
        assert!(parse_quantity("-2").is_err());
        assert!(parse_quantity("two").is_err());
        assert!(parse_quantity("100000000000000").is_err());
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(Some("Kazan")), "Kazan");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(None), "-");
    }
}
