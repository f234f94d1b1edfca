//! Per-run mode resolution.
//!
//! One `TestRunSession` lives for the duration of a test-run process and
//! owns the mutable mode sets; there is no ambient global state. Before
//! each test the host calls [`TestRunSession::resolve`], which parses the
//! title markers, grows the sets, and computes the active mode.

use std::collections::HashSet;

use tracing::debug;

use crate::config::RemockConfig;
use crate::marker::{MarkerError, MarkerKind, parse_title};

/// The mode computed for one test, before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDecision {
    pub recording: bool,
    pub stubbing: bool,
    pub blacklisted: bool,
    /// Whether the host should freeze the wall clock for this test. The
    /// freeze value comes from [`TestRunSession::mock_date_ms`].
    pub date_mock_active: bool,
}

impl ModeDecision {
    fn blacklisted() -> Self {
        Self {
            recording: false,
            stubbing: false,
            blacklisted: true,
            date_mock_active: false,
        }
    }
}

/// A resolved test: the (possibly marker-stripped) titles plus the mode.
///
/// The host is expected to adopt the stripped titles so the mutation
/// persists for the remainder of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTest {
    pub title: String,
    pub suite_title: String,
    pub mode: ModeDecision,
}

/// State for one test-run process: the grow-only mode sets and the global
/// flags seeded from configuration.
#[derive(Debug)]
pub struct TestRunSession {
    record_all: bool,
    stub_all: bool,
    mock_date_ms: Option<i64>,

    blacklist_tests: HashSet<String>,
    blacklist_suites: HashSet<String>,
    record_tests: HashSet<String>,
    record_suites: HashSet<String>,
    stub_tests: HashSet<String>,
    stub_suites: HashSet<String>,
}

impl TestRunSession {
    pub fn new(config: &RemockConfig) -> Self {
        Self {
            record_all: config.record_all,
            stub_all: config.stub_all,
            mock_date_ms: config.mock_date_ms(),
            blacklist_tests: config.blacklist_tests.iter().cloned().collect(),
            blacklist_suites: config.blacklist_suites.iter().cloned().collect(),
            record_tests: config.record_tests.iter().cloned().collect(),
            record_suites: config.record_suites.iter().cloned().collect(),
            stub_tests: config.stub_tests.iter().cloned().collect(),
            stub_suites: config.stub_suites.iter().cloned().collect(),
        }
    }

    /// Resolves the mode for one test, growing the mode sets from any
    /// title markers. Called before each test.
    ///
    /// Evaluation order is fixed: blacklist first (and it short-circuits
    /// everything), then record, then stub. Recording always takes
    /// precedence over stubbing.
    pub fn resolve(
        &mut self,
        test_title: &str,
        suite_title: &str,
    ) -> Result<ResolvedTest, MarkerError> {
        let test = parse_title(test_title)?;
        let suite = parse_title(suite_title)?;

        match test.marker {
            Some(MarkerKind::Blacklist) => {
                self.blacklist_tests.insert(test.title.clone());
            }
            Some(MarkerKind::ForceRecord) => {
                self.record_tests.insert(test.title.clone());
            }
            Some(MarkerKind::ForceStub) => {
                self.stub_tests.insert(test.title.clone());
            }
            None => {}
        }
        match suite.marker {
            Some(MarkerKind::Blacklist) => {
                self.blacklist_suites.insert(suite.title.clone());
            }
            Some(MarkerKind::ForceRecord) => {
                self.record_suites.insert(suite.title.clone());
            }
            Some(MarkerKind::ForceStub) => {
                self.stub_suites.insert(suite.title.clone());
            }
            None => {}
        }

        let blacklisted = test.marker == Some(MarkerKind::Blacklist)
            || suite.marker == Some(MarkerKind::Blacklist)
            || self.blacklist_tests.contains(&test.title)
            || self.blacklist_suites.contains(&suite.title);

        if blacklisted {
            debug!(test = %test.title, "test is blacklisted, no recording or stubbing");
            return Ok(ResolvedTest {
                title: test.title,
                suite_title: suite.title,
                mode: ModeDecision::blacklisted(),
            });
        }

        let recording = test.marker == Some(MarkerKind::ForceRecord)
            || suite.marker == Some(MarkerKind::ForceRecord)
            || self.record_tests.contains(&test.title)
            || self.record_suites.contains(&suite.title)
            || self.record_all;

        let stubbing = !recording
            && (test.marker == Some(MarkerKind::ForceStub)
                || suite.marker == Some(MarkerKind::ForceStub)
                || self.stub_tests.contains(&test.title)
                || self.stub_suites.contains(&suite.title)
                || self.stub_all);

        let date_mock_active = recording || stubbing || self.mock_date_ms.is_some();

        debug!(test = %test.title, recording, stubbing, date_mock_active, "resolved test mode");

        Ok(ResolvedTest {
            title: test.title,
            suite_title: suite.title,
            mode: ModeDecision {
                recording,
                stubbing,
                blacklisted: false,
                date_mock_active,
            },
        })
    }

    /// The configured static mock date, as epoch milliseconds.
    pub fn mock_date_ms(&self) -> Option<i64> {
        self.mock_date_ms
    }

    pub fn is_record_test(&self, title: &str) -> bool {
        self.record_tests.contains(title)
    }

    pub fn is_stub_test(&self, title: &str) -> bool {
        self.stub_tests.contains(title)
    }

    pub fn is_blacklisted_test(&self, title: &str) -> bool {
        self.blacklist_tests.contains(title)
    }
}
