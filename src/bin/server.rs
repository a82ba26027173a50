//! Development server — in-memory store, seeded catalog, HTTP on
//! `ORDERS_ADDR` (default `0.0.0.0:3000`). Log level via `RUST_LOG`.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use storefront_orders::{
    http, CatalogRegistry, InMemoryStore, OrderService, Product, StockRepository,
    StoreStockRepository,
};

/// The storefront's departments and their subcategory collections.
const DEPARTMENTS: &[(&str, &[&str])] = &[
    ("clothing", &["shirts", "trousers", "jackets", "sarees", "shoes"]),
    (
        "electronics",
        &["mobiles", "laptops", "headphones", "televisions", "cameras"],
    ),
    (
        "food",
        &["snacks", "beverages", "chocolates", "biscuits", "noodles"],
    ),
    ("grocery", &["vegetables", "fruits", "dairy", "pulses", "spices"]),
    (
        "stationary",
        &["pens", "notebooks", "markers", "folders", "art_supplies"],
    ),
];

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("ORDERS_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let store = InMemoryStore::new();
    let mut catalog = CatalogRegistry::new();

    for (department, subcategories) in DEPARTMENTS {
        for subcategory in *subcategories {
            let repo = StoreStockRepository::new(store.clone(), *subcategory);
            seed_demo_products(&repo, department, subcategory);
            catalog = catalog.register(*subcategory, Arc::new(repo));
        }
    }

    let service = Arc::new(OrderService::new(store, Arc::new(catalog)));

    info!(%addr, "orders service listening");
    http::serve(service, &addr).await
}

/// A handful of placeholder rows per subcategory so checkout has something
/// to decrement against.
fn seed_demo_products(
    repo: &StoreStockRepository<InMemoryStore>,
    department: &str,
    subcategory: &str,
) {
    for n in 1..=3u32 {
        let product = Product {
            id: n.to_string(),
            name: format!("{subcategory} sample {n}"),
            price: Decimal::new(499 + i64::from(n) * 150, 2),
            stock_quantity: 100,
            image: format!("/img/{department}/{subcategory}/{n}.jpg"),
        };
        if let Err(e) = repo.put(&product) {
            tracing::warn!(subcategory, error = %e, "seed failed");
        }
    }
}
