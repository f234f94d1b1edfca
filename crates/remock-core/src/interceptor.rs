//! Stub-mode request interception.
//!
//! When a test resolves to stub mode the host installs a request filter
//! and routes every matching outbound URL through [`StubInterceptor::decide`].
//! A cache miss is non-fatal and only observable via a log line: the
//! request falls through to the real network so a new endpoint never
//! silently breaks a run. The interceptor is a cheap per-test value built
//! from the status-index snapshot loaded at run start; the host re-arms it
//! for every test since interception state may be reset between tests.

use serde_json::Value;
use tracing::{debug, warn};

use remock_store::{ResponseStatusIndex, SpecBundle};

use crate::naming::fixture_key;
use crate::pattern::InterceptPattern;

/// Header tagging a stubbed response so callers can tell replay from live
/// traffic.
pub const STUB_HEADER_NAME: &str = "x-stubbed-response";
pub const STUB_HEADER_VALUE: &str = "true";

/// What the host should do with one intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubDecision {
    /// Serve the stored fixture instead of hitting the network.
    Reply(StubReply),
    /// Forward the request to the real network unmodified.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubReply {
    pub status: u16,
    pub body: Value,
    pub headers: Vec<(String, String)>,
}

pub struct StubInterceptor {
    pattern: InterceptPattern,
    service_url: String,
    token: String,
    index: ResponseStatusIndex,
    bundle: SpecBundle,
}

impl StubInterceptor {
    pub fn new(
        pattern: InterceptPattern,
        service_url: impl Into<String>,
        token: impl Into<String>,
        index: ResponseStatusIndex,
        bundle: SpecBundle,
    ) -> Self {
        Self {
            pattern,
            service_url: service_url.into(),
            token: token.into(),
            index,
            bundle,
        }
    }

    /// Decides whether to serve a stored fixture for `url`.
    ///
    /// Every failure mode on this path degrades to `Continue`: a URL the
    /// pattern does not cover, a key missing from the index, or an indexed
    /// key whose payload file is unreadable. Read-side problems must never
    /// fail a test run.
    pub fn decide(&self, url: &str) -> StubDecision {
        if !self.pattern.matches(url) {
            return StubDecision::Continue;
        }

        let key = fixture_key(url, &self.service_url, &self.token);
        let Some(status) = self.index.status(&key) else {
            debug!(fixture = %key, %url, "fixture miss, forwarding to network");
            return StubDecision::Continue;
        };

        match self.bundle.read_payload(&key) {
            Ok(Some(body)) => StubDecision::Reply(StubReply {
                status,
                body,
                headers: vec![(STUB_HEADER_NAME.to_string(), STUB_HEADER_VALUE.to_string())],
            }),
            Ok(None) => {
                warn!(fixture = %key, "indexed fixture has no payload file, forwarding");
                StubDecision::Continue
            }
            Err(err) => {
                warn!(fixture = %key, error = %err, "unreadable fixture payload, forwarding");
                StubDecision::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const SERVICE: &str = "https://api.example/";

    fn interceptor_with(
        tmp: &TempDir,
        indexed: &[(&str, u16)],
        payloads: &[(&str, Value)],
    ) -> StubInterceptor {
        let bundle = SpecBundle::new(tmp.path());
        bundle.ensure_layout().unwrap();
        let mut index = ResponseStatusIndex::new();
        for (key, status) in indexed {
            index.insert((*key).to_string(), *status);
        }
        for (key, payload) in payloads {
            bundle.write_payload(key, payload).unwrap();
        }
        StubInterceptor::new(
            InterceptPattern::parse("https://api.example/**").unwrap(),
            SERVICE,
            "&iid",
            index,
            bundle,
        )
    }

    #[test]
    fn indexed_fixture_is_served_with_stub_header() {
        let tmp = TempDir::new().unwrap();
        let interceptor = interceptor_with(
            &tmp,
            &[("v1_items_x_1", 200)],
            &[("v1_items_x_1", json!({"items": []}))],
        );

        // Both disambiguated URLs resolve to the same fixture.
        for url in [
            "https://api.example/v1/items?x=1&iid=9",
            "https://api.example/v1/items?x=1&iid=2",
        ] {
            let StubDecision::Reply(reply) = interceptor.decide(url) else {
                panic!("expected a stubbed reply for {url}");
            };
            assert_eq!(reply.status, 200);
            assert_eq!(reply.body, json!({"items": []}));
            assert_eq!(
                reply.headers,
                vec![("x-stubbed-response".to_string(), "true".to_string())]
            );
        }
    }

    #[test]
    fn unindexed_url_falls_through() {
        let tmp = TempDir::new().unwrap();
        let interceptor = interceptor_with(&tmp, &[], &[]);

        assert_eq!(
            interceptor.decide("https://api.example/v1/new-endpoint"),
            StubDecision::Continue
        );
    }

    #[test]
    fn url_outside_pattern_is_not_touched() {
        let tmp = TempDir::new().unwrap();
        let interceptor = interceptor_with(
            &tmp,
            &[("v1_items_x_1", 200)],
            &[("v1_items_x_1", json!({}))],
        );

        assert_eq!(
            interceptor.decide("https://analytics.example/beacon"),
            StubDecision::Continue
        );
    }

    #[test]
    fn indexed_key_with_missing_payload_falls_through() {
        let tmp = TempDir::new().unwrap();
        let interceptor = interceptor_with(&tmp, &[("v1_items_x_1", 200)], &[]);

        assert_eq!(
            interceptor.decide("https://api.example/v1/items?x=1"),
            StubDecision::Continue
        );
    }

    #[test]
    fn malformed_payload_falls_through() {
        let tmp = TempDir::new().unwrap();
        let interceptor = interceptor_with(&tmp, &[("v1_items_x_1", 200)], &[]);
        fs::write(
            SpecBundle::new(tmp.path()).payload_path("v1_items_x_1"),
            "{broken",
        )
        .unwrap();

        assert_eq!(
            interceptor.decide("https://api.example/v1/items?x=1"),
            StubDecision::Continue
        );
    }
}
