//! # Seed Data Generator
//!
//! Populates the database with furniture for development.
//!
//! ## Usage
//! ```bash
//! # Default: every model in every finish
//! cargo run -p furnstock-db --bin seed
//!
//! # Cap the number of products
//! cargo run -p furnstock-db --bin seed -- --count 40
//!
//! # Specify database path
//! cargo run -p furnstock-db --bin seed -- --db ./data/furnstock.db
//! ```
//!
//! ## Generated Data
//! - Categories: Sofas, Tables, Chairs, Wardrobes, Beds
//! - Products: `{CATEGORY}-{MODEL}-{FINISH}` SKUs with material, color,
//!   dimensions and a discount on every seventh item
//! - One supplier, one sales employee
//! - One opening delivery so products have stock (prices become
//!   purchase price + 20%)

use chrono::Utc;
use furnstock_core::{
    DeliveryLine, Discount, Money, NewDelivery, NewEmployee, NewProduct, NewSupplier,
};
use clap::Parser;
use furnstock_db::{Database, DbConfig};

/// (SKU prefix, category name, models with base purchase price in whole units
/// and dimensions L×W×H in cm)
type Model = (&'static str, i64, (f64, f64, f64));

const CATEGORIES: &[(&str, &str, &[Model])] = &[
    (
        "SOF",
        "Sofas",
        &[
            ("Oslo", 42_000, (220.0, 95.0, 85.0)),
            ("Bergen", 55_000, (260.0, 160.0, 90.0)),
            ("Malmo", 31_000, (190.0, 90.0, 80.0)),
        ],
    ),
    (
        "TBL",
        "Tables",
        &[
            ("Dining", 24_000, (180.0, 90.0, 75.0)),
            ("Coffee", 8_500, (110.0, 60.0, 45.0)),
            ("Desk", 13_000, (140.0, 70.0, 75.0)),
        ],
    ),
    (
        "CHR",
        "Chairs",
        &[
            ("Classic", 4_200, (45.0, 50.0, 92.0)),
            ("Bar", 5_100, (40.0, 40.0, 105.0)),
            ("Office", 9_900, (60.0, 60.0, 120.0)),
        ],
    ),
    (
        "WRD",
        "Wardrobes",
        &[
            ("Two-door", 27_000, (120.0, 60.0, 210.0)),
            ("Sliding", 39_000, (200.0, 65.0, 240.0)),
        ],
    ),
    (
        "BED",
        "Beds",
        &[
            ("Single", 16_000, (200.0, 90.0, 40.0)),
            ("Double", 28_000, (200.0, 160.0, 45.0)),
        ],
    ),
];

/// (SKU suffix, material, color, price factor in percent)
const FINISHES: &[(&str, &str, &str, i64)] = &[
    ("OAK", "oak", "natural", 110),
    ("WAL", "walnut", "dark brown", 125),
    ("WHT", "MDF", "white", 90),
];

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Furnstock Seed Data Generator")]
struct SeedArgs {
    /// Maximum number of products (default: all)
    #[arg(short, long)]
    count: Option<usize>,

    /// Database file path
    #[arg(short, long, default_value = "./furnstock_dev.db")]
    db: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = SeedArgs::parse();
    let count = args.count.unwrap_or(usize::MAX);
    let db_path = args.db;

    println!("🌱 Furnstock Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let supplier = db
        .suppliers()
        .insert(&NewSupplier {
            name: "Volga Furniture Works".to_string(),
            city: Some("Kazan".to_string()),
            phone: Some("+7 843 555-01-02".to_string()),
            inn: "1655123456".to_string(),
            email: Some("orders@volga-furniture.example".to_string()),
        })
        .await?;
    db.employees()
        .insert(&NewEmployee {
            last_name: "Petrova".to_string(),
            first_name: "Anna".to_string(),
            middle_name: Some("Sergeevna".to_string()),
            position: Some("Sales consultant".to_string()),
        })
        .await?;

    println!("✓ Supplier and employee created");
    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut opening_delivery = Vec::new();
    let mut generated = 0;

    'categories: for (prefix, category_name, models) in CATEGORIES {
        let category = db.categories().insert(category_name).await?;

        for (model_idx, (model, base_price, (length, width, height))) in models.iter().enumerate() {
            for (finish_idx, (suffix, material, color, factor)) in FINISHES.iter().enumerate() {
                if generated >= count {
                    break 'categories;
                }

                let purchase = Money::from_major_minor(base_price * factor / 100, 0);
                let sku = format!("{}-{}-{}", prefix, model.to_uppercase(), suffix);
                let mut input = NewProduct::new(
                    format!("{} {} ({})", model, category_name.trim_end_matches('s'), color),
                    &sku,
                    &category.id,
                    purchase,
                );
                input.material = Some(material.to_string());
                input.color = Some(color.to_string());
                input.length = Some(*length);
                input.width = Some(*width);
                input.height = Some(*height);
                if generated % 7 == 3 {
                    input = input.with_discount(Discount::from_percent(10));
                }

                let product = match db.products().create_product(&input).await {
                    Ok(product) => product,
                    Err(e) => {
                        eprintln!("Failed to insert {}: {}", sku, e);
                        continue;
                    }
                };

                let quantity = 1 + ((model_idx * 3 + finish_idx) % 6) as i64;
                opening_delivery.push(DeliveryLine::new(product.id, quantity, purchase));
                generated += 1;
            }
        }
    }

    println!("✓ Generated {} products", generated);

    if !opening_delivery.is_empty() {
        let delivery_id = db
            .deliveries()
            .create_delivery(&NewDelivery {
                supplier_id: supplier.id,
                delivery_date: Utc::now().date_naive(),
                items: opening_delivery,
            })
            .await?;
        println!("✓ Opening delivery {} recorded", delivery_id);
    }

    let inventory = db.stock().get_inventory().await?;
    let units = inventory
        .iter()
        .fold(0_i64, |acc, row| acc.saturating_add(row.quantity));
    let value = inventory
        .iter()
        .fold(Money::zero(), |acc, row| acc.saturating_add(row.stock_value()));

    println!();
    println!("  Units in stock: {}", units);
    println!("  Stock value:    {}", value);
    println!("  Elapsed:        {:?}", start.elapsed());
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
