//! WriteBatch — chain rows into a single all-or-nothing insert.
//!
//! Rows are serialized as they are staged; `commit` hands the whole set to
//! the store, which applies it atomically. A serialization failure or a key
//! conflict on any row means no row is written.
//!
//! ## Example
//!
//! ```ignore
//! store
//!     .batch()
//!     .insert(&order)
//!     .insert(&first_item)
//!     .insert(&second_item)
//!     .commit()?;
//! ```

use super::{Collection, StagedRow, Store, StoreError};

/// Builder for staging multiple inserts into one atomic commit.
pub struct WriteBatch<'a, S> {
    store: &'a S,
    rows: Vec<StagedRow>,
    error: Option<StoreError>,
}

impl<'a, S: Store> WriteBatch<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            rows: vec![],
            error: None,
        }
    }

    /// Stage a row for insertion. The first staging failure is held and
    /// surfaced at `commit`, so chains never partially apply.
    pub fn insert<C: Collection>(mut self, row: &C) -> Self {
        if self.error.is_some() {
            return self;
        }

        match serde_json::to_vec(row) {
            Ok(bytes) => self.rows.push(StagedRow {
                key: StagedRow::key_for(C::NAME, row.id()),
                bytes,
            }),
            Err(e) => self.error = Some(StoreError::Serde(e.to_string())),
        }

        self
    }

    /// Number of rows staged so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing has been staged.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Commit all staged rows atomically.
    pub fn commit(self) -> Result<(), StoreError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.store.apply_batch(self.rows)
    }
}

/// Extension trait to start a batch chain from any store.
pub trait BatchExt: Store + Sized {
    fn batch(&self) -> WriteBatch<'_, Self> {
        WriteBatch::new(self)
    }
}

impl<S: Store> BatchExt for S {}
