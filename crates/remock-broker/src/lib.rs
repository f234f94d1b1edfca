//! # remock-broker
//!
//! The async edge of the Remock fixture broker.
//!
//! This crate provides:
//! - The `Fetcher` strategy with a default GET implementation
//! - The post-run materialization pipeline (fan-out fetch, fan-in write)
//! - `RequestBroker`, the thin wiring over the host's test lifecycle
//! - The host-facing task surface (read/delete/materialize/clean/purge)
//!
//! # Examples
//!
//! ```no_run
//! use remock_broker::RequestBroker;
//! use remock_core::RemockConfig;
//! use remock_store::ArchiveStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ArchiveStore::new("cypress/fixtures/savedResponse");
//!     let config = RemockConfig::default();
//!     let mut broker = RequestBroker::new(config, &store, "checkout.spec", None)?;
//!
//!     // Per test: resolve the mode, arm the interceptor if stubbing.
//!     let setup = broker.before_test("[r] adds an item", "checkout suite")?;
//!     // ... run the test ...
//!     let archive = broker.after_test(&setup.resolved.mode, &setup.resolved.title);
//!     // ... if `archive` is Some, save the capture under that name ...
//!
//!     // Once after the suite: turn archives into stub fixtures.
//!     if let Some(outcome) = broker.after_run().await? {
//!         println!("materialized {} fixtures", outcome.fetched);
//!     }
//!     Ok(())
//! }
//! ```

mod broker;
mod error;
pub mod fetcher;
pub mod materializer;
pub mod tasks;

pub use broker::{RequestBroker, TestSetup};
pub use error::{BrokerError, Result};
pub use fetcher::{FetchError, FetchedResponse, Fetcher, HttpFetcher};
pub use materializer::{
    DEFAULT_FETCH_TIMEOUT, MaterializeOutcome, MaterializeRequest, Materializer,
};
pub use tasks::{TaskContext, TaskRequest, dispatch};

/// Installs a global `tracing` subscriber reading `RUST_LOG`, defaulting
/// to `info`. Hosts embedding the broker call this once at startup; a
/// second call is a no-op.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
