//! Install metadata
//!
//! Tracks, per store and per entry, when the user last installed something
//! and which marks they stamped on it. Persisted as one JSON document shaped
//! `{ "<store title>": { "<entry title>": { "updated": ..., "marks": ... } } }`
//! so the file stays mergeable across application versions.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Mark flags a user can stamp on an entry, OR-combinable
pub mod marks {
    /// Star mark
    pub const STAR: u8 = 1 << 0;
    /// Heart mark
    pub const HEART: u8 = 1 << 1;
    /// Diamond mark
    pub const DIAMOND: u8 = 1 << 2;
    /// Club mark
    pub const CLUB: u8 = 1 << 3;
    /// Spade mark
    pub const SPADE: u8 = 1 << 4;
}

/// Metadata recorded for one store entry
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMeta {
    /// When the entry was last installed, if ever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    /// OR-combination of [`marks`] flags
    #[serde(default, skip_serializing_if = "is_zero")]
    pub marks: u8,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(marks: &u8) -> bool {
    *marks == 0
}

/// Install metadata for all stores, keyed by store title then entry title
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MetaStore {
    #[serde(flatten)]
    stores: HashMap<String, HashMap<String, EntryMeta>>,
}

impl MetaStore {
    /// Load metadata from a JSON file; a missing file yields an empty store
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no metadata file, starting empty");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write metadata to a JSON file, overwriting any existing one
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Record that `entry` in `store` was installed just now
    pub fn mark_updated(&mut self, store: &str, entry: &str) {
        self.entry_mut(store, entry).updated = Some(Utc::now());
    }

    /// When `entry` in `store` was last installed, if ever
    #[must_use]
    pub fn updated(&self, store: &str, entry: &str) -> Option<DateTime<Utc>> {
        self.stores.get(store)?.get(entry)?.updated
    }

    /// Current mark flags for `entry` in `store` (0 if unknown)
    #[must_use]
    pub fn marks(&self, store: &str, entry: &str) -> u8 {
        self.stores
            .get(store)
            .and_then(|entries| entries.get(entry))
            .map(|meta| meta.marks)
            .unwrap_or(0)
    }

    /// Replace the mark flags for `entry` in `store`
    pub fn set_marks(&mut self, store: &str, entry: &str, marks: u8) {
        self.entry_mut(store, entry).marks = marks;
    }

    /// Flip one mark flag for `entry` in `store`, returning the new flags
    pub fn toggle_mark(&mut self, store: &str, entry: &str, mark: u8) -> u8 {
        let meta = self.entry_mut(store, entry);
        meta.marks ^= mark;
        meta.marks
    }

    /// Titles of all entries in `store` carrying at least one mark
    #[must_use]
    pub fn marked_entries(&self, store: &str) -> Vec<&str> {
        let Some(entries) = self.stores.get(store) else {
            return Vec::new();
        };
        let mut titles: Vec<&str> = entries
            .iter()
            .filter(|(_, meta)| meta.marks != 0)
            .map(|(title, _)| title.as_str())
            .collect();
        titles.sort_unstable();
        titles
    }

    fn entry_mut(&mut self, store: &str, entry: &str) -> &mut EntryMeta {
        self.stores
            .entry(store.to_string())
            .or_default()
            .entry(entry.to_string())
            .or_default()
    }
}
