//! Broker configuration.
//!
//! Option names follow the host-visible camelCase keys so a config block
//! lifted straight out of the runner's config file deserializes as-is.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoreError, Result};

pub const DEFAULT_INTERCEPT_PATTERN: &str = "*";
pub const DEFAULT_DISAMBIGUATION_TOKEN: &str = "&iid";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemockConfig {
    /// Fixed timestamp to freeze the wall clock during mocked tests.
    /// RFC 3339 or a plain `YYYY-MM-DD` date.
    pub mock_date: Option<String>,

    /// String, glob, or `/regex/flags` matched against outbound URLs.
    pub intercept_pattern: String,

    /// Service URL prefix stripped when deriving fixture keys.
    #[serde(rename = "baseURL")]
    pub base_url: String,

    /// Global defaults when no per-test/suite override applies.
    pub record_all: bool,
    pub stub_all: bool,

    /// Explicit name lists seeding the session's mode sets.
    pub record_tests: Vec<String>,
    pub record_suites: Vec<String>,
    pub stub_tests: Vec<String>,
    pub stub_suites: Vec<String>,
    pub blacklist_tests: Vec<String>,
    pub blacklist_suites: Vec<String>,

    /// If true, the materializer re-fetches fixtures that already exist.
    pub update_api_response: bool,

    /// If true and a fetcher collaborator is injected, use it instead of
    /// the default GET fetcher.
    pub use_custom_fetcher: bool,

    /// Token marking the truncation point in a URL before key derivation.
    pub disambiguation_token: String,
}

impl Default for RemockConfig {
    fn default() -> Self {
        Self {
            mock_date: None,
            intercept_pattern: DEFAULT_INTERCEPT_PATTERN.to_string(),
            base_url: String::new(),
            record_all: false,
            stub_all: true,
            record_tests: Vec::new(),
            record_suites: Vec::new(),
            stub_tests: Vec::new(),
            stub_suites: Vec::new(),
            blacklist_tests: Vec::new(),
            blacklist_suites: Vec::new(),
            update_api_response: false,
            use_custom_fetcher: false,
            disambiguation_token: DEFAULT_DISAMBIGUATION_TOKEN.to_string(),
        }
    }
}

impl RemockConfig {
    /// Builds a config from the JSON value the host hands over. Unknown
    /// keys are ignored; missing keys take their defaults.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Loads a config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The configured mock date as epoch milliseconds, if set and
    /// parseable. An unparseable date is logged and treated as unset
    /// rather than failing the whole run.
    pub fn mock_date_ms(&self) -> Option<i64> {
        let raw = self.mock_date.as_deref()?;
        match parse_mock_date(raw) {
            Some(ms) => Some(ms),
            None => {
                warn!(mock_date = %raw, "unparseable mockDate, wall clock will not be frozen");
                None
            }
        }
    }
}

fn parse_mock_date(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).timestamp_millis());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().timestamp_millis())
}
