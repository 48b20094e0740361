//! # Sample Cart Seeder
//!
//! Writes a sample cart into a storage file so the storefront opens with
//! something in it during development.
//!
//! ## Usage
//! ```bash
//! # Seed 3 products (default) into ./marketplace_dev.db
//! cargo run -p marketplace-storage --bin seed
//!
//! # Seed more products, overwriting any saved cart
//! cargo run -p marketplace-storage --bin seed -- --count 8 --force
//!
//! # Specify storage path and key
//! cargo run -p marketplace-storage --bin seed -- --db ./data/storage.db --key @GoMarketplace:products
//! ```

use std::env;

use marketplace_core::{format_value, Cart, NewCartItem, PRODUCTS_STORAGE_KEY};
use marketplace_storage::{KeyValueStorage, SqliteStorage, StorageConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Catalog used for sample items: (title, price in reais)
const CATALOG: &[(&str, f64)] = &[
    ("Camiseta Hipster", 39.9),
    ("Camiseta Ruby", 29.9),
    ("Caneca Preta", 24.9),
    ("Moletom Rocketseat", 159.9),
    ("Boné Trucker", 49.5),
    ("Meia Estampada", 12.0),
    ("Mochila Dev", 1249.99),
    ("Adesivos (pack)", 9.9),
];

/// Base URL for product images.
const IMAGE_BASE_URL: &str = "https://storage.gomarketplace.dev/products";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 3;
    let mut db_path = String::from("./marketplace_dev.db");
    let mut key = String::from(PRODUCTS_STORAGE_KEY);
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--key" | "-k" => {
                if i + 1 < args.len() {
                    key = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("GoMarketplace Sample Cart Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products in the cart (default: 3)");
                println!("  -d, --db <PATH>    Storage file path (default: ./marketplace_dev.db)");
                println!("  -k, --key <KEY>    Storage key (default: {})", PRODUCTS_STORAGE_KEY);
                println!("  -f, --force        Overwrite an existing cart");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let storage = SqliteStorage::new(StorageConfig::new(&db_path)).await?;
    info!(db = %db_path, key = %key, "Storage ready");

    if !force && storage.get_item(&key).await?.is_some() {
        println!("⚠ A cart is already saved under '{}'", key);
        println!("  Pass --force to overwrite it.");
        return Ok(());
    }

    let cart = sample_cart(count);
    let blob = serde_json::to_string(&cart)?;
    storage.set_item(&key, &blob).await?;

    println!("✓ Seeded {} products into {}", cart.len(), db_path);
    for item in cart.items() {
        println!(
            "  {:>2} × {:<24} {}",
            item.quantity,
            item.title,
            format_value(item.price)
        );
    }
    println!("  Subtotal: {}", cart.subtotal());

    storage.close().await;
    Ok(())
}

/// Builds a cart from the first `count` catalog entries (cycling when
/// `count` is larger than the catalog). Every other product gets a
/// second unit so quantities vary.
fn sample_cart(count: usize) -> Cart {
    let mut cart = Cart::new();

    for (idx, (title, price)) in CATALOG.iter().cycle().take(count).enumerate() {
        let id = Uuid::new_v4().to_string();
        let item = NewCartItem::new(
            id.clone(),
            *title,
            format!("{}/{}.png", IMAGE_BASE_URL, id),
            *price,
        );
        cart.add(item);
        if idx % 2 == 1 {
            cart.increment(&id);
        }
    }

    cart
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,marketplace=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
