// src/store.rs
//
// Tabular-store collaborator contract. The relay core never owns durable
// state; it appends collection runs, reads the full history back with row
// identity, and flips the sent flag on one row. The bundled in-memory
// implementation backs local runs and tests; a spreadsheet or database
// backend plugs in behind the same trait.

use anyhow::{bail, Result};
use std::sync::Mutex;

use crate::collect::types::CollectedItem;

/// One persisted row. `row` is the opaque 1-based identity assigned by the
/// store on write; `collected_at` stays in its persisted string form so a
/// hand-edited or corrupted row cannot break the read path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredItem {
    pub row: u64,
    pub collected_at: String,
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub source_query: String,
    pub sent: bool,
}

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Append one collection run. Always appends; never deduplicates
    /// against prior runs.
    async fn append(&self, items: &[CollectedItem]) -> Result<()>;

    /// Full history with row identity, oldest first.
    async fn read_all(&self) -> Result<Vec<StoredItem>>;

    /// Flip the sent flag on one row.
    async fn mark_sent(&self, row: u64) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Vec<StoredItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn append(&self, items: &[CollectedItem]) -> Result<()> {
        let mut rows = self.inner.lock().expect("store mutex poisoned");
        for item in items {
            let row = rows.len() as u64 + 1;
            rows.push(StoredItem {
                row,
                collected_at: item.collected_at.to_rfc3339(),
                title: item.title.clone(),
                link: item.link.clone(),
                snippet: item.snippet.clone(),
                source_query: item.source_query.clone(),
                sent: item.sent,
            });
        }
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<StoredItem>> {
        let rows = self.inner.lock().expect("store mutex poisoned");
        Ok(rows.clone())
    }

    async fn mark_sent(&self, row: u64) -> Result<()> {
        let mut rows = self.inner.lock().expect("store mutex poisoned");
        match rows.iter_mut().find(|r| r.row == row) {
            Some(r) => {
                r.sent = true;
                Ok(())
            }
            None => bail!("unknown store row {row}"),
        }
    }
}
