//! Housekeeping primitives for the archive store.
//!
//! Each operation is independently idempotent: read-side operations treat a
//! missing file or directory as empty/false rather than an error, and the
//! create/delete operations are safe to repeat.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Result, StoreError};

/// Reads and deserializes a JSON file.
///
/// Returns `Ok(None)` if the file does not exist. Malformed JSON is an
/// error: downstream consumers would otherwise operate on corrupt data.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let value = serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

/// Serializes a value as JSON and writes it to `path`, creating parent
/// directories as needed.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string(value)?;
    fs::write(path, content)?;
    Ok(())
}

/// Deletes a file, returning `true` if it existed.
pub fn delete_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Recursively deletes a directory. A missing directory is a no-op.
pub fn delete_dir_recursive(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Creates a directory and any missing parents. No-op if it already exists.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}
