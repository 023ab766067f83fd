use std::sync::Arc;

use crate::entry_list;
use crate::error::{Result, StoreError, ValidationError};
use crate::journal_entry::{Entry, EntryId};
use crate::storage::KeyValueStorage;

pub const ENTRIES_KEY: &str = "journalEntries";

/// Owns the persisted entry list: one JSON array, newest first, under a
/// single storage key.
///
/// There is no append primitive. Every mutation loads the whole list,
/// changes it in memory and writes it back with [`EntryStore::replace_all`].
#[derive(Clone)]
pub struct EntryStore {
    storage: Arc<dyn KeyValueStorage>,
    key: &'static str,
}

impl EntryStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        EntryStore {
            storage,
            key: ENTRIES_KEY,
        }
    }

    #[tracing::instrument(skip(self), fields(key = self.key))]
    pub async fn load(&self) -> Result<Vec<Entry>> {
        let stored = self
            .storage
            .get_item(self.key)
            .await
            .map_err(|source| StoreError::Read {
                key: self.key.to_owned(),
                source,
            })?;

        let Some(serialized) = stored else {
            tracing::debug!("no entries stored yet");
            return Ok(Vec::new());
        };

        let entries: Vec<Entry> =
            serde_json::from_str(&serialized).map_err(|source| StoreError::Parse {
                key: self.key.to_owned(),
                source,
            })?;
        tracing::debug!(count = entries.len(), "loaded entries");
        Ok(entries)
    }

    /// Like [`EntryStore::load`], but a failed read is logged and yields an
    /// empty list.
    pub async fn load_or_empty(&self) -> Vec<Entry> {
        match self.load().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "error loading entries");
                Vec::new()
            }
        }
    }

    #[tracing::instrument(skip(self, entries), fields(key = self.key, count = entries.len()))]
    pub async fn replace_all(&self, entries: &[Entry]) -> Result<()> {
        if let Some(blank) = entries.iter().find(|e| e.text.trim().is_empty()) {
            tracing::warn!(id = %blank.id, "refusing to store entry with empty text");
            return Err(ValidationError::EmptyText.into());
        }

        let write_err = |source: std::io::Error| StoreError::Write {
            key: self.key.to_owned(),
            source,
        };
        let serialized =
            serde_json::to_string(entries).map_err(|e| write_err(std::io::Error::other(e)))?;
        self.storage
            .set_item(self.key, serialized)
            .await
            .map_err(write_err)
    }

    /// Prepends `entry` and returns the list as written.
    pub async fn add(&self, entry: Entry) -> Result<Vec<Entry>> {
        let mut entries = self.load().await?;
        let id = entry.id;
        entries.insert(0, entry);
        self.replace_all(&entries).await?;
        tracing::info!(%id, count = entries.len(), "entry saved");
        Ok(entries)
    }

    /// Replaces the entry with the same id. `Ok(None)` if no such entry
    /// exists, in which case nothing is written.
    pub async fn update(&self, entry: Entry) -> Result<Option<Vec<Entry>>> {
        let mut entries = self.load().await?;
        let id = entry.id;
        let Some(slot) = entries.iter_mut().find(|e| e.id == id) else {
            tracing::warn!(%id, "update of unknown entry ignored");
            return Ok(None);
        };
        *slot = entry;
        self.replace_all(&entries).await?;
        tracing::info!(%id, "entry updated");
        Ok(Some(entries))
    }

    /// Removes the entry with `id`. `Ok(None)` if it was not present, in
    /// which case nothing is written.
    pub async fn delete(&self, id: EntryId) -> Result<Option<Vec<Entry>>> {
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            tracing::debug!(%id, "delete of unknown entry ignored");
            return Ok(None);
        }
        self.replace_all(&entries).await?;
        tracing::info!(%id, "entry deleted");
        Ok(Some(entries))
    }

    pub async fn recent(&self, n: usize) -> Result<Vec<Entry>> {
        let entries = self.load().await?;
        Ok(entry_list::recent(&entries, n))
    }
}
