//! Catalog — per-subcategory product stock, resolved through a registry.
//!
//! The storefront's catalog is sharded into one collection per product
//! subcategory (`shirts`, `mobiles`, ...). Instead of interpolating the
//! subcategory into a table name per request, every subcategory is
//! registered once at startup as a [`StockRepository`] in a
//! [`CatalogRegistry`]; the order service resolves the tag at write time
//! and treats a miss as a best-effort stock failure.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::{StagedRow, Store, StoreError};

/// A catalog product row. The order service does not own these — it only
/// reads prices for seeding/tests and decrements `stock_quantity`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    /// Signed on purpose: decrements are unconditional, so concurrent
    /// orders can drive this below zero.
    pub stock_quantity: i64,
    pub image: String,
}

/// Stock-level access for one subcategory's products.
pub trait StockRepository: Send + Sync {
    /// Fetch a product by id.
    fn product(&self, id: &str) -> Result<Option<Product>, StoreError>;

    /// Current stock level, if the product exists.
    fn stock_of(&self, id: &str) -> Result<Option<i64>, StoreError>;

    /// Decrement stock by `quantity` and return the new level.
    ///
    /// There is no floor check — the level may go negative.
    fn decrement_stock(&self, id: &str, quantity: u32) -> Result<i64, StoreError>;

    /// Upsert a product (seeding and catalog maintenance).
    fn put(&self, product: &Product) -> Result<(), StoreError>;
}

/// Store-backed stock repository for a single subcategory collection.
///
/// The collection name is fixed at construction, so the store only ever
/// sees keys this repository was built for.
pub struct StoreStockRepository<S> {
    store: S,
    collection: String,
}

impl<S: Store> StoreStockRepository<S> {
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn key(&self, id: &str) -> String {
        StagedRow::key_for(&self.collection, id)
    }

    fn load(&self, id: &str) -> Result<Option<Product>, StoreError> {
        match self.store.get_raw(&self.key(id))? {
            Some(bytes) => {
                let product = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Serde(e.to_string()))?;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }
}

impl<S: Store> StockRepository for StoreStockRepository<S> {
    fn product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        self.load(id)
    }

    fn stock_of(&self, id: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.load(id)?.map(|p| p.stock_quantity))
    }

    fn decrement_stock(&self, id: &str, quantity: u32) -> Result<i64, StoreError> {
        let mut product = self.load(id)?.ok_or_else(|| StoreError::NotFound {
            collection: self.collection.clone(),
            id: id.to_string(),
        })?;

        product.stock_quantity -= i64::from(quantity);

        let bytes =
            serde_json::to_vec(&product).map_err(|e| StoreError::Serde(e.to_string()))?;
        self.store.save_raw(&self.key(id), bytes)?;

        Ok(product.stock_quantity)
    }

    fn put(&self, product: &Product) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec(product).map_err(|e| StoreError::Serde(e.to_string()))?;
        self.store.save_raw(&self.key(&product.id), bytes)
    }
}

/// Subcategory tag → stock repository, built once at startup.
#[derive(Default)]
pub struct CatalogRegistry {
    repos: HashMap<String, Arc<dyn StockRepository>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository for a subcategory tag.
    ///
    /// Uses builder pattern — returns `self` for chaining.
    pub fn register(
        mut self,
        subcategory: impl Into<String>,
        repo: Arc<dyn StockRepository>,
    ) -> Self {
        self.repos.insert(subcategory.into(), repo);
        self
    }

    /// Resolve the repository for a subcategory tag.
    pub fn resolve(&self, subcategory: &str) -> Option<&Arc<dyn StockRepository>> {
        self.repos.get(subcategory)
    }

    /// List registered subcategory tags.
    pub fn subcategories(&self) -> Vec<&str> {
        self.repos.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn shirts_repo() -> StoreStockRepository<InMemoryStore> {
        let repo = StoreStockRepository::new(InMemoryStore::new(), "shirts");
        repo.put(&Product {
            id: "7".into(),
            name: "Oxford Shirt".into(),
            price: Decimal::new(2000, 2),
            stock_quantity: 10,
            image: "/img/shirts/7.jpg".into(),
        })
        .unwrap();
        repo
    }

    #[test]
    fn put_and_product() {
        let repo = shirts_repo();
        let product = repo.product("7").unwrap().unwrap();
        assert_eq!(product.name, "Oxford Shirt");
        assert_eq!(product.stock_quantity, 10);
        assert!(repo.product("8").unwrap().is_none());
    }

    #[test]
    fn decrement_reduces_stock() {
        let repo = shirts_repo();
        let remaining = repo.decrement_stock("7", 2).unwrap();
        assert_eq!(remaining, 8);
        assert_eq!(repo.stock_of("7").unwrap(), Some(8));
    }

    #[test]
    fn decrement_has_no_floor() {
        let repo = shirts_repo();
        let remaining = repo.decrement_stock("7", 25).unwrap();
        assert_eq!(remaining, -15);
    }

    #[test]
    fn decrement_missing_product_is_not_found() {
        let repo = shirts_repo();
        let err = repo.decrement_stock("404", 1).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn repositories_do_not_collide_across_subcategories() {
        let store = InMemoryStore::new();
        let shirts = StoreStockRepository::new(store.clone(), "shirts");
        let mobiles = StoreStockRepository::new(store, "mobiles");

        shirts
            .put(&Product {
                id: "1".into(),
                name: "Tee".into(),
                price: Decimal::new(999, 2),
                stock_quantity: 5,
                image: String::new(),
            })
            .unwrap();

        assert!(shirts.product("1").unwrap().is_some());
        assert!(mobiles.product("1").unwrap().is_none());
    }

    #[test]
    fn registry_resolves_registered_tags_only() {
        let registry = CatalogRegistry::new().register("shirts", Arc::new(shirts_repo()));

        assert!(registry.resolve("shirts").is_some());
        assert!(registry.resolve("mobiles").is_none());
        assert_eq!(registry.subcategories(), vec!["shirts"]);
    }
}
