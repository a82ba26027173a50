//! Storage layer — typed collections with optimistic versioning.
//!
//! A `Collection` is a serializable row type bound to a named collection
//! (a table in SQL, a key prefix here). The `Store` trait provides reads,
//! inserts, scans, and version-checked updates, plus two things the order
//! service leans on:
//!
//! - an atomic [`WriteBatch`] for multi-row all-or-nothing inserts
//!   (the order header + line items commit), and
//! - raw `key -> bytes` access for collections whose name is only known
//!   at runtime (the per-subcategory catalog tables).
//!
//! ## Example
//!
//! ```ignore
//! use storefront_orders::{Collection, InMemoryStore, Store};
//!
//! #[derive(Serialize, Deserialize, Clone)]
//! struct Profile {
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! impl Collection for Profile {
//!     const NAME: &'static str = "profiles";
//!     fn id(&self) -> &str { &self.id }
//! }
//!
//! let store = InMemoryStore::new();
//! store.insert(&profile)?;
//! let loaded = store.get::<Profile>("p-1")?;
//! ```

mod batch;
mod in_memory;
mod store;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Trait for row types stored in a named collection.
pub trait Collection: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name for this row type (e.g., "orders", "order_items").
    const NAME: &'static str;

    /// Returns the unique identifier for this row.
    fn id(&self) -> &str;
}

/// A versioned wrapper around row data for optimistic concurrency control.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Optimistic concurrency conflict, or insert of an existing key.
    #[error("conflict on {collection}:{id} (expected version {expected}, actual {actual})")]
    Conflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },
    /// Row not found.
    #[error("not found: {collection}:{id}")]
    NotFound { collection: String, id: String },
    /// Serialization/deserialization error.
    #[error("row serialization error: {0}")]
    Serde(String),
    /// Storage-level error.
    #[error("storage error: {0}")]
    Storage(String),
}

pub use batch::{BatchExt, WriteBatch};
pub use in_memory::InMemoryStore;
pub use store::{StagedRow, Store};
