//! # Seed Data Generator
//!
//! Populates the database with branches, customers and products for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p sales-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p sales-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p sales-db --bin seed -- --db ./data/sales.db
//! ```
//!
//! Everything is written in a single unit of work: a failure leaves the
//! database untouched.

use chrono::Utc;
use sales_core::{Branch, Customer, Product, MAX_PRICE_CENTS};
use sales_db::{Database, DbConfig, UnitOfWork};
use std::env;
use uuid::Uuid;

const BRANCHES: &[&str] = &["Centro", "Zona Norte", "Zona Sul", "Aeroporto", "Shopping Leste"];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Ana Souza", "ana.souza@mail.com"),
    ("Bruno Lima", "bruno.lima@mail.com"),
    ("Carla Mendes", "carla.mendes@mail.com"),
    ("Diego Rocha", "diego.rocha@mail.com"),
    ("Elisa Prado", "elisa.prado@mail.com"),
    ("Fábio Nunes", "fabio.nunes@mail.com"),
    ("Gabriela Reis", "gabriela.reis@mail.com"),
    ("Heitor Alves", "heitor.alves@mail.com"),
];

/// Product families for realistic test data
const PRODUCTS: &[&str] = &[
    "Espresso Beans",
    "French Press",
    "Ceramic Mug",
    "Paper Filters",
    "Milk Frother",
    "Gooseneck Kettle",
    "Burr Grinder",
    "Cold Brew Jar",
    "Travel Tumbler",
    "Pour Over Dripper",
];

const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 250),
    ("Large", 500),
    ("Pack of 2", 900),
    ("Pack of 6", 2_400),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./sales_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Sales Backend Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./sales_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Sales Backend Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let mut uow = db.begin().await?;

    let existing = uow.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let now = Utc::now();

    for name in BRANCHES {
        uow.branches()
            .create(Branch {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    println!("✓ {} branches", BRANCHES.len());

    for (name, email) in CUSTOMERS {
        uow.customers()
            .create(Customer {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                email: Some(email.to_string()),
                phone: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    println!("✓ {} customers", CUSTOMERS.len());

    let mut generated = 0;
    'outer: for round in 0.. {
        for (product_idx, name) in PRODUCTS.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = round * 1_000 + product_idx * 10 + size_idx;
                uow.products()
                    .create(generate_product(name, size, *price_addon, round, seed))
                    .await?;
                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    uow.commit().await.into_result()?;

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with realistic data.
fn generate_product(name: &str, size: &str, price_addon: i64, round: usize, seed: usize) -> Product {
    let now = Utc::now();

    // $1.99 - $49.99 plus the size addon
    let base_price = 199 + ((seed * 37) % 4_800) as i64;
    let price_cents = (base_price + price_addon).min(MAX_PRICE_CENTS);

    let full_name = if round == 0 {
        format!("{} {}", name, size)
    } else {
        format!("{} {} #{}", name, size, round + 1)
    };

    Product {
        id: Uuid::new_v4().to_string(),
        name: full_name,
        description: Some(format!("{} ({})", name, size.to_lowercase())),
        price_cents,
        is_active: seed % 17 != 0,
        created_at: now,
        updated_at: now,
    }
}
