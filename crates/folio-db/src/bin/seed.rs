//! # Seed Data Generator
//!
//! Populates the database with demo customers and catalog items for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults
//! cargo run -p folio-db --bin seed
//!
//! # Specify database path
//! cargo run -p folio-db --bin seed -- --db ./data/folio.db
//!
//! # Custom opening stock per item
//! cargo run -p folio-db --bin seed -- --stock 50
//! ```
//!
//! Opening stock goes through the stock ledger as INITIAL movements, so
//! a freshly seeded database already reconciles: for every item,
//! SUM(movements.quantity) == items.stock_quantity.

use std::env;

use folio_core::ReferenceType;
use folio_db::repository::item::NewItem;
use folio_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// Demo catalog: (code, title, author, price_cents).
const BOOKS: &[(&str, &str, &str, i64)] = &[
    ("BK-0001", "The Village in the Jungle", "Leonard Woolf", 1850),
    ("BK-0002", "Madol Doova", "Martin Wickramasinghe", 950),
    ("BK-0003", "Gamperaliya", "Martin Wickramasinghe", 1200),
    ("BK-0004", "Viragaya", "Martin Wickramasinghe", 1100),
    ("BK-0005", "Reef", "Romesh Gunesekera", 2400),
    ("BK-0006", "Anil's Ghost", "Michael Ondaatje", 2750),
    ("BK-0007", "Running in the Family", "Michael Ondaatje", 2300),
    ("BK-0008", "Funny Boy", "Shyam Selvadurai", 2100),
    ("BK-0009", "Island of a Thousand Mirrors", "Nayomi Munaweera", 1950),
    ("BK-0010", "The Road from Elephant Pass", "Nihal De Silva", 1650),
    ("ST-0001", "A4 Exercise Book 120pg", "", 180),
    ("ST-0002", "A4 Exercise Book 200pg", "", 260),
    ("ST-0003", "Ballpoint Pen Blue", "", 60),
    ("ST-0004", "Ballpoint Pen Red", "", 60),
    ("ST-0005", "Pencil HB", "", 40),
    ("ST-0006", "Eraser", "", 30),
    ("ST-0007", "Ruler 30cm", "", 120),
    ("ST-0008", "Geometry Box", "", 650),
    ("ST-0009", "Drawing Book A3", "", 340),
    ("ST-0010", "Highlighter Yellow", "", 150),
];

/// Demo customers: (account_no, name, phone).
const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("ACC-0001", "Nimal Perera", "0771234567"),
    ("ACC-0002", "Kamala Fernando", "0719876543"),
    ("ACC-0003", "Sunil Jayawardena", "0765551234"),
    ("ACC-0004", "Dilani Wijesinghe", "0723334444"),
    ("ACC-0005", "Royal College Library", "0112695340"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./folio_dev.db");
    let mut opening_stock: i64 = 25;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--stock" | "-s" => {
                if i + 1 < args.len() {
                    opening_stock = args[i + 1].parse().unwrap_or(25);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Folio Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./folio_dev.db)");
                println!("  -s, --stock <N>     Opening stock per item (default: 25)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Folio Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.items().list_active(1).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has catalog items");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding customers...");
    for &(account_no, name, phone) in CUSTOMERS {
        db.customers()
            .create(account_no, name, Some(phone), None, None)
            .await?;
    }
    println!("✓ {} customers", CUSTOMERS.len());

    println!();
    println!("Seeding catalog items...");
    for &(code, name, author, price_cents) in BOOKS {
        let item = db
            .items()
            .create(NewItem {
                code: code.to_string(),
                name: name.to_string(),
                description: None,
                price_cents,
                cost_cents: Some(price_cents * 60 / 100),
                min_stock_level: 5,
                isbn: None,
                author: if author.is_empty() {
                    None
                } else {
                    Some(author.to_string())
                },
            })
            .await?;

        db.stock_ledger()
            .record_receipt(
                &item.id,
                opening_stock,
                ReferenceType::Initial,
                Some("opening stock"),
                "seed",
            )
            .await?;
    }
    println!("✓ {} items with {} units opening stock each", BOOKS.len(), opening_stock);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
