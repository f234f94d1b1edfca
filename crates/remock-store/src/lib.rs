//! # remock-store
//!
//! Durable file storage for the Remock fixture broker.
//!
//! This crate provides:
//! - Per-spec fixture bundles (network archives, response payloads, and the
//!   response status index)
//! - The HAR-shaped archive model written by the host's capture layer
//! - Idempotent housekeeping primitives (read-json, delete, recursive
//!   delete, ensure-dir)
//! - Garbage collection over the store root (prune orphans, purge all)

pub mod archive;
pub mod bundle;
mod error;
pub mod index;
pub mod ops;
mod store;

pub use archive::{Archive, ArchiveEntry, ArchiveLog, ArchiveRequest};
pub use bundle::{ARCHIVE_EXT, ARCHIVES_DIR, INDEX_FILE, PAYLOADS_DIR, SpecBundle};
pub use error::{Result, StoreError};
pub use index::ResponseStatusIndex;
pub use store::ArchiveStore;
