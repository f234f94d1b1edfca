//! End-to-end record/replay flow: a recording run saves archives, the
//! materializer turns them into fixtures, and a later stub run serves
//! those fixtures while unindexed URLs fall through.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use tempfile::TempDir;

use remock_broker::{FetchError, FetchedResponse, Fetcher, RequestBroker};
use remock_core::{RemockConfig, StubDecision};
use remock_store::ArchiveStore;

const SERVICE: &str = "https://api.example/";

/// Serves one canned payload for the deduplicated items URL.
struct ItemsFetcher {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Fetcher for ItemsFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match url {
            "https://api.example/v1/items?x=1" => Ok(FetchedResponse {
                status: 200,
                body: json!({"items": ["a", "b"]}),
            }),
            _ => Err(FetchError::Status { status: 500 }),
        }
    }
}

fn config() -> RemockConfig {
    RemockConfig::from_value(json!({
        "interceptPattern": "https://api.example/**",
        "baseURL": SERVICE,
        "stubAll": true,
        "recordAll": false
    }))
    .unwrap()
}

#[tokio::test]
async fn recorded_archives_become_served_fixtures() {
    let tmp = TempDir::new().unwrap();
    let store = ArchiveStore::new(tmp.path().join("savedResponse"));
    let fetcher = Arc::new(ItemsFetcher {
        calls: AtomicUsize::new(0),
    });

    // --- Recording run -------------------------------------------------
    let mut recording_config = config();
    recording_config.use_custom_fetcher = true;
    let mut broker = RequestBroker::new(
        recording_config,
        &store,
        "items.spec",
        Some(fetcher.clone() as Arc<dyn Fetcher>),
    )
    .unwrap();

    let setup = broker.before_test("[r] lists items", "items suite").unwrap();
    assert!(setup.resolved.mode.recording);
    assert!(setup.interceptor.is_none(), "recording tests are not stubbed");

    // The host's capture layer saves the archive under the broker-issued
    // name after the test; two entries differ only in their `&iid` suffix.
    let archive_name = broker
        .after_test(&setup.resolved.mode, &setup.resolved.title)
        .expect("recording test yields an archive name");
    assert_eq!(archive_name, "lists_items");

    let bundle = broker.bundle().clone();
    bundle.ensure_layout().unwrap();
    fs::write(
        bundle.archive_path(&archive_name),
        serde_json::to_string(&json!({
            "log": {"entries": [
                {"request": {"url": "https://api.example/v1/items?x=1&iid=9"}},
                {"request": {"url": "https://api.example/v1/items?x=1&iid=2"}}
            ]}
        }))
        .unwrap(),
    )
    .unwrap();

    let outcome = broker.after_run().await.unwrap().expect("archives recorded");
    assert_eq!(outcome.fetched, 1, "disambiguated URLs collapse to one fetch");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

    // --- Stub run (fresh process) --------------------------------------
    let mut broker = RequestBroker::new(config(), &store, "items.spec", None).unwrap();
    let setup = broker.before_test("lists items", "items suite").unwrap();
    assert!(setup.resolved.mode.stubbing);
    let interceptor = setup.interceptor.expect("stub mode arms an interceptor");

    for url in [
        "https://api.example/v1/items?x=1&iid=9",
        "https://api.example/v1/items?x=1&iid=2",
    ] {
        let StubDecision::Reply(reply) = interceptor.decide(url) else {
            panic!("expected stubbed reply for {url}");
        };
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, json!({"items": ["a", "b"]}));
        assert!(
            reply
                .headers
                .iter()
                .any(|(name, value)| name == "x-stubbed-response" && value == "true")
        );
    }

    // A URL that was never recorded falls through to the live network.
    assert_eq!(
        interceptor.decide("https://api.example/v1/unrecorded"),
        StubDecision::Continue
    );

    // A stub run records nothing, so after_run is a no-op.
    assert!(broker.after_run().await.unwrap().is_none());
}

#[tokio::test]
async fn second_materialization_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let store = ArchiveStore::new(tmp.path().join("savedResponse"));
    let fetcher = Arc::new(ItemsFetcher {
        calls: AtomicUsize::new(0),
    });

    let mut run_config = config();
    run_config.use_custom_fetcher = true;

    for expected_calls in [1, 1] {
        let mut broker = RequestBroker::new(
            run_config.clone(),
            &store,
            "items.spec",
            Some(fetcher.clone() as Arc<dyn Fetcher>),
        )
        .unwrap();
        let setup = broker.before_test("[r] lists items", "items suite").unwrap();
        let archive_name = broker
            .after_test(&setup.resolved.mode, &setup.resolved.title)
            .unwrap();

        let bundle = broker.bundle().clone();
        bundle.ensure_layout().unwrap();
        fs::write(
            bundle.archive_path(&archive_name),
            serde_json::to_string(&json!({
                "log": {"entries": [
                    {"request": {"url": "https://api.example/v1/items?x=1"}}
                ]}
            }))
            .unwrap(),
        )
        .unwrap();

        broker.after_run().await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), expected_calls);
    }
}
