//! Post-run response materialization.
//!
//! Turns the archives recorded during a run into stub fixtures: collect
//! the distinct service URLs across all named archives, fetch a canonical
//! response for each one not already materialized, persist payloads, and
//! rewrite the status index once after everything settles.
//!
//! Fetches fan out concurrently with no per-host rate limit (a documented
//! limitation). Each fetch carries its own timeout so one stuck endpoint
//! cannot stall the batch forever.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use remock_core::fixture_key;
use remock_store::SpecBundle;

use crate::error::Result;
use crate::fetcher::{FetchError, FetchedResponse, Fetcher};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// One materialization pass over a finished run's archives.
#[derive(Debug, Clone)]
pub struct MaterializeRequest {
    /// Prefix stripped when deriving fixture keys.
    pub service_url: String,
    /// Names of the archives recorded during the run.
    pub archive_names: Vec<String>,
    /// Re-fetch URLs whose fixtures already exist.
    pub override_existing: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaterializeOutcome {
    /// URLs fetched and persisted.
    pub fetched: usize,
    /// URLs skipped because their fixture already existed.
    pub skipped: usize,
    /// URLs whose fetch failed; absent from the index.
    pub failed: usize,
}

pub struct Materializer {
    bundle: SpecBundle,
    fetcher: Arc<dyn Fetcher>,
    token: String,
    fetch_timeout: Duration,
}

impl Materializer {
    pub fn new(bundle: SpecBundle, fetcher: Arc<dyn Fetcher>, token: impl Into<String>) -> Self {
        Self {
            bundle,
            fetcher,
            token: token.into(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Runs one materialization pass.
    ///
    /// Per-URL fetch failures are logged and skipped; the pass only fails
    /// on structural problems (malformed archive or index, disk write
    /// failure) that would corrupt state for future runs.
    pub async fn run(&self, request: &MaterializeRequest) -> Result<MaterializeOutcome> {
        self.bundle.ensure_layout()?;
        let mut index = self.bundle.load_index()?;

        let mut candidates: BTreeSet<String> = BTreeSet::new();
        for name in &request.archive_names {
            let Some(archive) = self.bundle.read_archive(name)? else {
                warn!(archive = %name, "recorded archive not found on disk, skipping");
                continue;
            };
            for url in archive.request_urls() {
                candidates.insert(truncate_at_token(url, &self.token).to_string());
            }
        }

        let distinct = candidates.len();
        if !request.override_existing {
            candidates
                .retain(|url| !index.contains(&fixture_key(url, &request.service_url, &self.token)));
        }
        let skipped = distinct - candidates.len();

        info!(
            distinct,
            skipped,
            to_fetch = candidates.len(),
            "materializing responses"
        );

        let fetches = candidates.into_iter().map(|url| {
            let fetcher = Arc::clone(&self.fetcher);
            let timeout = self.fetch_timeout;
            async move {
                let result = match tokio::time::timeout(timeout, fetcher.fetch(&url)).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout(timeout.as_secs())),
                };
                (url, result)
            }
        });
        let settled: Vec<(String, std::result::Result<FetchedResponse, FetchError>)> =
            join_all(fetches).await;

        // All shared-state writes happen here, after every fetch settled.
        let mut fetched = 0;
        let mut failed = 0;
        for (url, result) in settled {
            match result {
                Ok(response) => {
                    let key = fixture_key(&url, &request.service_url, &self.token);
                    self.bundle.write_payload(&key, &response.body)?;
                    index.insert(key, response.status);
                    fetched += 1;
                }
                Err(err) => {
                    warn!(%url, error = %err, "fetch failed, fixture skipped");
                    failed += 1;
                }
            }
        }

        self.bundle.save_index(&index)?;

        Ok(MaterializeOutcome {
            fetched,
            skipped,
            failed,
        })
    }
}

/// Truncates a URL at the first occurrence of the disambiguation token.
fn truncate_at_token<'a>(url: &'a str, token: &str) -> &'a str {
    if token.is_empty() {
        url
    } else {
        url.split(token).next().unwrap_or(url)
    }
}
