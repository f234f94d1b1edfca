//! Per-spec fixture bundles.
//!
//! Every test spec owns one bundle directory under the store root:
//!
//! ```text
//! <root>/<spec_key>/
//!   hars/              network archives, one per recorded test
//!   apiData/           response payloads, one JSON file per fixture key
//!   responseList.json  fixture key -> last-seen HTTP status code
//! ```
//!
//! The directory and file names mirror the on-disk format produced by the
//! original capture tooling so existing fixture trees keep working.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::archive::Archive;
use crate::error::Result;
use crate::index::ResponseStatusIndex;
use crate::ops;

pub const ARCHIVES_DIR: &str = "hars";
pub const PAYLOADS_DIR: &str = "apiData";
pub const INDEX_FILE: &str = "responseList.json";
pub const ARCHIVE_EXT: &str = "har";

/// Storage for one test spec's archives, payloads, and status index.
#[derive(Debug, Clone)]
pub struct SpecBundle {
    dir: PathBuf,
}

impl SpecBundle {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn archives_dir(&self) -> PathBuf {
        self.dir.join(ARCHIVES_DIR)
    }

    pub fn payloads_dir(&self) -> PathBuf {
        self.dir.join(PAYLOADS_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    pub fn archive_path(&self, name: &str) -> PathBuf {
        self.archives_dir().join(format!("{name}.{ARCHIVE_EXT}"))
    }

    pub fn payload_path(&self, key: &str) -> PathBuf {
        self.payloads_dir().join(format!("{key}.json"))
    }

    /// Creates the bundle's directory layout. Idempotent.
    pub fn ensure_layout(&self) -> Result<()> {
        ops::ensure_dir(&self.archives_dir())?;
        ops::ensure_dir(&self.payloads_dir())
    }

    /// Reads a named archive, or `None` if it was never saved.
    pub fn read_archive(&self, name: &str) -> Result<Option<Archive>> {
        ops::read_json(&self.archive_path(name))
    }

    pub fn load_index(&self) -> Result<ResponseStatusIndex> {
        ResponseStatusIndex::load(&self.index_path())
    }

    pub fn save_index(&self, index: &ResponseStatusIndex) -> Result<()> {
        index.save(&self.index_path())
    }

    /// Reads a stored fixture payload, or `None` if absent.
    pub fn read_payload(&self, key: &str) -> Result<Option<Value>> {
        ops::read_json(&self.payload_path(key))
    }

    /// Persists a fixture payload. Overwrites any previous payload for the
    /// same key (last write wins).
    pub fn write_payload(&self, key: &str, payload: &Value) -> Result<()> {
        ops::write_json(&self.payload_path(key), payload)
    }
}
