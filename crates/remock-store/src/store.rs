//! The archive store root: one bundle per test spec, plus garbage
//! collection over the whole tree.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::bundle::SpecBundle;
use crate::error::Result;
use crate::ops;

/// Root of the fixture store (the `savedResponse` directory in a host's
/// fixtures folder). Bundles live directly beneath it, keyed by sanitized
/// spec name.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    root: PathBuf,
}

impl ArchiveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The bundle for one spec key. Purely path arithmetic; nothing is
    /// created until the bundle is written to.
    pub fn bundle(&self, spec_key: &str) -> SpecBundle {
        SpecBundle::new(self.root.join(spec_key))
    }

    /// Lists the spec keys that currently have a bundle on disk.
    pub fn spec_keys(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                keys.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Deletes every bundle whose spec key is not in `active_spec_keys`,
    /// including its archives, payloads, and status index. Returns the
    /// deleted keys. A garbage-collection pass, never run automatically.
    pub fn prune_orphaned_fixtures(&self, active_spec_keys: &[String]) -> Result<Vec<String>> {
        let active: BTreeSet<&str> = active_spec_keys.iter().map(String::as_str).collect();
        let mut deleted = Vec::new();

        for key in self.spec_keys()? {
            if active.contains(key.as_str()) {
                continue;
            }
            debug!(spec = %key, "pruning orphaned fixture bundle");
            ops::delete_dir_recursive(self.bundle(&key).dir())?;
            deleted.push(key);
        }

        if !deleted.is_empty() {
            info!(count = deleted.len(), "pruned orphaned fixture bundles");
        }
        Ok(deleted)
    }

    /// Deletes every bundle and archive under the store root. Full reset.
    pub fn purge_all(&self) -> Result<()> {
        info!(root = %self.root.display(), "purging fixture store");
        ops::delete_dir_recursive(&self.root)
    }
}
