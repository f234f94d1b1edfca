//! Thin per-run wiring over the policy engine and the store.
//!
//! `RequestBroker` mirrors the host's test lifecycle without owning it:
//! the host calls [`RequestBroker::before_test`] before each test,
//! [`RequestBroker::after_test`] after each, and
//! [`RequestBroker::after_run`] once the suite finishes. The host remains
//! responsible for arming its capture layer, saving archives under the
//! names this broker hands out, and re-installing the interceptor.

use std::mem;
use std::sync::Arc;

use tracing::info;

use remock_core::{
    InterceptPattern, ModeDecision, RemockConfig, ResolvedTest, StubInterceptor, TestRunSession,
    sanitize,
};
use remock_store::{ArchiveStore, ResponseStatusIndex, SpecBundle};

use crate::error::Result;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::materializer::{MaterializeOutcome, MaterializeRequest, Materializer};

/// Everything the host needs to set up one test.
pub struct TestSetup {
    pub resolved: ResolvedTest,
    /// Present exactly when the test runs in stub mode; the host installs
    /// it into its request-interception facility.
    pub interceptor: Option<StubInterceptor>,
}

pub struct RequestBroker {
    config: RemockConfig,
    session: TestRunSession,
    bundle: SpecBundle,
    pattern: InterceptPattern,
    /// Status index snapshot loaded once at run start; stub decisions for
    /// the whole run are made against it.
    index_snapshot: ResponseStatusIndex,
    fetcher: Arc<dyn Fetcher>,
    recorded: Vec<String>,
}

impl RequestBroker {
    /// Builds the broker for one run of `spec_name` against `store`.
    ///
    /// `custom_fetcher` is only consulted when the config sets
    /// `useCustomFetcher`; otherwise the default GET fetcher is used. The
    /// strategy is resolved here, once.
    pub fn new(
        config: RemockConfig,
        store: &ArchiveStore,
        spec_name: &str,
        custom_fetcher: Option<Arc<dyn Fetcher>>,
    ) -> Result<Self> {
        let bundle = store.bundle(&sanitize(spec_name));
        let pattern = InterceptPattern::parse(&config.intercept_pattern)
            .map_err(remock_core::CoreError::from)?;
        let index_snapshot = bundle.load_index()?;
        info!(
            spec = %spec_name,
            known_fixtures = index_snapshot.len(),
            "fixture broker ready"
        );

        let fetcher: Arc<dyn Fetcher> = match custom_fetcher {
            Some(custom) if config.use_custom_fetcher => custom,
            _ => Arc::new(HttpFetcher::new()?),
        };

        let session = TestRunSession::new(&config);
        Ok(Self {
            config,
            session,
            bundle,
            pattern,
            index_snapshot,
            fetcher,
            recorded: Vec::new(),
        })
    }

    /// Resolves the mode for the next test and, when stubbing, builds the
    /// interceptor the host should arm.
    pub fn before_test(&mut self, test_title: &str, suite_title: &str) -> Result<TestSetup> {
        let resolved = self
            .session
            .resolve(test_title, suite_title)
            .map_err(remock_core::CoreError::from)?;

        let interceptor = resolved.mode.stubbing.then(|| {
            StubInterceptor::new(
                self.pattern.clone(),
                self.config.base_url.clone(),
                self.config.disambiguation_token.clone(),
                self.index_snapshot.clone(),
                self.bundle.clone(),
            )
        });

        Ok(TestSetup {
            resolved,
            interceptor,
        })
    }

    /// Called after a test finishes. For a recording test, returns the
    /// sanitized archive name the host must save the capture under, and
    /// remembers it for materialization.
    pub fn after_test(&mut self, mode: &ModeDecision, test_title: &str) -> Option<String> {
        if mode.blacklisted || !mode.recording {
            return None;
        }
        let archive_name = sanitize(test_title);
        self.recorded.push(archive_name.clone());
        Some(archive_name)
    }

    /// Called once after the suite: materializes fixtures for every test
    /// recorded this run. Returns `None` when nothing was recorded.
    pub async fn after_run(&mut self) -> Result<Option<MaterializeOutcome>> {
        let archive_names = mem::take(&mut self.recorded);
        if archive_names.is_empty() {
            return Ok(None);
        }

        let materializer = Materializer::new(
            self.bundle.clone(),
            Arc::clone(&self.fetcher),
            self.config.disambiguation_token.clone(),
        );
        let outcome = materializer
            .run(&MaterializeRequest {
                service_url: self.config.base_url.clone(),
                archive_names,
                override_existing: self.config.update_api_response,
            })
            .await?;
        Ok(Some(outcome))
    }

    /// The session's mock-date freeze value, for hosts arming a clock mock.
    pub fn mock_date_ms(&self) -> Option<i64> {
        self.session.mock_date_ms()
    }

    pub fn bundle(&self) -> &SpecBundle {
        &self.bundle
    }
}
