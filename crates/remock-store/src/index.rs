//! The response status index: fixture key -> last-seen HTTP status code.
//!
//! Persisted as a single JSON object (`responseList.json`) per spec-scoped
//! bundle. Loaded once at the start of a run so the stub interceptor knows
//! which fixtures exist, and read-modify-written by the materializer after
//! each recording pass. A `BTreeMap` keeps the serialized form byte-stable
//! across runs, which makes a no-op materialization truly a no-op on disk.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ops;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseStatusIndex {
    entries: BTreeMap<String, u16>,
}

impl ResponseStatusIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the index from disk. A missing file yields an empty index;
    /// malformed JSON is an error since every future stub run would be
    /// working from corrupt state.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ops::read_json(path)?.unwrap_or_default())
    }

    /// Writes the index back to disk as one JSON object.
    pub fn save(&self, path: &Path) -> Result<()> {
        ops::write_json(path, self)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn status(&self, key: &str) -> Option<u16> {
        self.entries.get(key).copied()
    }

    /// Records the last-seen status for a fixture key. Last write wins.
    pub fn insert(&mut self, key: String, status: u16) {
        self.entries.insert(key, status);
    }

    pub fn remove(&mut self, key: &str) -> Option<u16> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
