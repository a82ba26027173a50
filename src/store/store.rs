//! Store — abstract row storage for collections.
//!
//! The surface is deliberately narrow: the order domain only ever inserts
//! (single rows or an atomic batch), reads, scans, and version-checked
//! updates. Orders are never deleted, so there is no delete.

use super::{Collection, StoreError, Versioned};

/// A row serialized and keyed, ready to be applied by [`Store::apply_batch`].
#[derive(Debug, Clone)]
pub struct StagedRow {
    /// Storage key: `"COLLECTION:id"`.
    pub key: String,
    /// Serialized row bytes.
    pub bytes: Vec<u8>,
}

impl StagedRow {
    /// Build the storage key for a collection name and row id.
    pub fn key_for(collection: &str, id: &str) -> String {
        format!("{}:{}", collection, id)
    }
}

/// Abstract row storage for collections.
pub trait Store: Send + Sync {
    /// Get a row by ID. Returns None if not found.
    fn get<C: Collection>(&self, id: &str) -> Result<Option<Versioned<C>>, StoreError>;

    /// Insert a new row. Fails if it already exists.
    fn insert<C: Collection>(&self, row: &C) -> Result<Versioned<C>, StoreError>;

    /// Update an existing row with optimistic concurrency control.
    fn update<C: Collection>(
        &self,
        row: &C,
        expected_version: u64,
    ) -> Result<Versioned<C>, StoreError>;

    /// Find rows matching a predicate.
    fn find<C: Collection>(
        &self,
        predicate: &dyn Fn(&C) -> bool,
    ) -> Result<Vec<Versioned<C>>, StoreError>;

    /// Allocate the next id from the store-wide sequence.
    fn allocate_id(&self) -> u64;

    /// Apply a set of staged inserts as one atomic unit: either every row
    /// is written or none is. A key conflict on any row rejects the batch.
    fn apply_batch(&self, rows: Vec<StagedRow>) -> Result<(), StoreError>;

    /// Get raw row bytes by key. Used for collections addressed by a
    /// runtime name (the catalog's subcategory tables).
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Save raw row bytes by key (upsert).
    fn save_raw(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
}
