//! The fetch strategy used by the materializer.
//!
//! The HTTP client behind replay fetches is a pluggable collaborator: the
//! default implementation issues plain GETs through `reqwest`, and hosts
//! that need auth headers or non-GET semantics inject their own `Fetcher`
//! (selected once at broker construction via `useCustomFetcher`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A canonical response for one service URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}")]
    Status { status: u16 },

    #[error("fetch timed out after {0} seconds")]
    Timeout(u64),
}

/// Strategy interface for obtaining the canonical response of a service
/// URL during materialization.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError>;
}

/// Default GET-based fetcher.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        debug!(%url, "fetching canonical response");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await?;
        Ok(FetchedResponse {
            status: status.as_u16(),
            body,
        })
    }
}
