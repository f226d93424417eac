//! # Furnstock Back Office
//!
//! Command line front end for the furniture back office.
//!
//! ## Module Organization
//! ```text
//! furnstock_backoffice/
//! ├── lib.rs          ◄─── You are here (CLI definition, startup, run)
//! ├── config.rs       ◄─── BackofficeConfig (TOML + environment)
//! ├── error.rs        ◄─── CliError: code, message, exit status
//! └── commands/
//!     ├── mod.rs      ◄─── Dispatch + Context
//!     ├── category.rs
//!     ├── product.rs
//!     ├── supplier.rs
//!     ├── employee.rs
//!     ├── delivery.rs
//!     ├── sale.rs
//!     └── inventory.rs
//! ```
//!
//! ## Output
//! Command output goes to stdout, logs and errors go to stderr, so
//! `furnstock --json ... | jq` sees only the JSON document.

pub mod commands;
pub mod config;
pub mod error;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::{Command, Context};
use config::BackofficeConfig;
use error::{CliError, CliResult};
use furnstock_db::{Database, DbConfig};

#[derive(Debug, Parser)]
#[command(
    name = "furnstock",
    about = "Furniture back office: catalog, deliveries, sales and stock",
    version
)]
pub struct Cli {
    /// Render command output as pretty JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: backoffice.toml in the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Database file, overrides config and FURNSTOCK_DB_PATH
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Runs the back office and returns the process exit status.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Back-Office Startup                               │
/// │                                                                         │
/// │  1. Parse Command Line ───────────────────────────────────────────────► │
/// │     • clap derive, --json / --config / --db are global                  │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → backoffice.toml → FURNSTOCK_* → --db                   │
/// │                                                                         │
/// │  3. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber on stderr                                      │
/// │     • RUST_LOG wins, else [logging] filter                              │
/// │                                                                         │
/// │  4. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  5. Execute Command ──────────────────────────────────────────────────► │
/// │     • print output, or the error with its exit status                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> i32 {
    let cli = Cli::parse();
    let json = cli.json;

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", CliError::internal(format!("Failed to start runtime: {}", e)));
            return 1;
        }
    };

    match runtime.block_on(run_cli(cli)) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            0
        }
        Err(err) => {
            report_error(&err, json);
            err.exit_code()
        }
    }
}

/// Loads config, opens the database and executes the parsed command.
pub async fn run_cli(cli: Cli) -> CliResult<String> {
    let mut config = BackofficeConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.db {
        config.database.path = Some(path);
    }

    init_tracing(&config.logging.filter);

    let db_path = config.database_path()?;
    info!(?db_path, store = %config.store.name, "Starting Furnstock back office");

    let db_config = DbConfig::new(db_path).max_connections(config.database.max_connections);
    let db = Database::new(db_config).await?;

    let ctx = Context::new(db, config, cli.json);
    let result = commands::execute(&ctx, cli.command).await;
    ctx.db.close().await;

    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=furnstock=trace` - Show trace for furnstock crates only
/// - Default: `[logging] filter`, which defaults to `info,furnstock=debug,sqlx=warn`
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second call (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn report_error(err: &CliError, json: bool) {
    if json {
        match serde_json::to_string_pretty(err) {
            Ok(body) => eprintln!("{}", body),
            Err(_) => eprintln!("{}", err),
        }
    } else {
        eprintln!("{}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sale_record() {
        let cli = Cli::try_parse_from([
            "furnstock",
            "sale",
            "record",
            "--customer",
            "Ivanov",
            "--item",
            "SOF-OSLO:2",
            "--item",
            "CHR-1:4:15",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Command::Sale(commands::sale::SaleCommand::Record(args)) => {
                assert_eq!(args.customer_name, "Ivanov");
                assert_eq!(args.items.len(), 2);
                assert_eq!(args.items[1].quantity, 4);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bad_item_is_a_usage_error() {
        let result = Cli::try_parse_from([
            "furnstock",
            "delivery",
            "record",
            "--supplier",
            "s1",
            "--item",
            "SOF-OSLO:2",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["furnstock", "delivery", "record", "--supplier", "s1"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_cli_against_file_database() {
        let dir = std::env::temp_dir().join(format!("furnstock-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join("furnstock.db");
        let db_arg = db_path.to_string_lossy().to_string();

        let cli = Cli::try_parse_from(["furnstock", "--db", &db_arg, "category", "add", "Sofas"])
            .unwrap();
        let out = run_cli(cli).await.unwrap();
        assert!(out.starts_with("Added category Sofas"));

        let cli = Cli::try_parse_from(["furnstock", "--db", &db_arg, "--json", "category", "list"])
            .unwrap();
        let out = run_cli(cli).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["name"], "Sofas");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
