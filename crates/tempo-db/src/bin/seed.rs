//! # Catalog Seeder
//!
//! Loads the default watch collection into an empty catalog.
//!
//! ## Usage
//! ```bash
//! # Uses DATABASE_PATH (default: ./tempo.db)
//! cargo run -p tempo-db --bin seed
//!
//! # Specify database path
//! cargo run -p tempo-db --bin seed -- --db ./data/tempo.db
//! ```
//!
//! Running it twice is harmless: a catalog that already has products is
//! left alone.

use chrono::Utc;
use std::env;
use tempo_core::money::format_currency;
use tempo_core::{Money, Product, STOREFRONT_URL};
use tempo_db::repository::product::generate_product_id;
use tempo_db::{AppConfig, Database};
use tracing_subscriber::EnvFilter;

/// (name, description, category, price in whole pesos, discount %, stock, featured)
const WATCHES: &[(&str, &str, &str, i64, i64, i64, bool)] = &[
    (
        "Elegance Chrono",
        "Cronógrafo clásico con caja de acero y correa de cuero.",
        "Clásico",
        450_000,
        10,
        50,
        true,
    ),
    (
        "Sportive GT",
        "Reloj deportivo sumergible a 100 m con bisel giratorio.",
        "Deportivo",
        320_000,
        0,
        75,
        true,
    ),
    (
        "Midnight Sapphire",
        "Esfera azul medianoche y cristal de zafiro.",
        "Lujo",
        750_000,
        15,
        30,
        true,
    ),
    (
        "Aura Minimalist",
        "Diseño minimalista de perfil delgado.",
        "Minimalista",
        280_000,
        0,
        100,
        false,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    let mut db_config = config.db_config();

    let args: Vec<String> = env::args().collect();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tempo Catalog Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $DATABASE_PATH or ./tempo.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tempo Catalog Seeder");
    println!("====================");
    println!("Database: {}", db_config.database_path.display());
    println!();

    let db = Database::new(db_config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Catalog already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        db.close().await;
        return Ok(());
    }

    let now = Utc::now();

    for &(name, description, category, pesos, discount, stock, is_featured) in WATCHES {
        let product = Product {
            id: generate_product_id(),
            name: name.to_string(),
            description: Some(description.to_string()),
            category: category.to_string(),
            price_cents: Money::from_major_minor(pesos, 0).cents(),
            discount,
            stock,
            is_featured,
            created_at: now,
            updated_at: now,
        };

        db.products().insert(&product).await?;

        println!(
            "  + {:<18} {:>10}  -{}%  stock {}",
            product.name,
            format_currency(product.price()),
            product.discount,
            product.stock
        );
    }

    println!();
    println!("✓ Seeded {} watches", WATCHES.len());
    println!("  Storefront: {}", STOREFRONT_URL);

    db.close().await;
    Ok(())
}
