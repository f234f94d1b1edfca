//! HAR-shaped network archives written by the host's capture layer.
//!
//! One archive is saved per recorded test. The materializer reads each
//! archive exactly once and only cares about the request URLs, so the model
//! deserializes just that slice of the HAR format and ignores the rest.

use serde::Deserialize;

/// A captured network archive (`<bundle>/hars/<name>.har`).
#[derive(Debug, Clone, Deserialize)]
pub struct Archive {
    pub log: ArchiveLog,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveLog {
    #[serde(default)]
    pub entries: Vec<ArchiveEntry>,
}

/// One recorded exchange. Ordered as captured.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveEntry {
    pub request: ArchiveRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveRequest {
    pub url: String,
}

impl Archive {
    /// Returns the request URLs in capture order.
    pub fn request_urls(&self) -> impl Iterator<Item = &str> {
        self.log.entries.iter().map(|entry| entry.request.url.as_str())
    }
}
