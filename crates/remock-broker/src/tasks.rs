//! Host-facing named operations.
//!
//! The host's task-dispatch mechanism (however it transports requests)
//! hands over a plain-data request and expects a plain-data result back,
//! or a tagged error. Every operation here is asynchronous from the
//! host's point of view even when the work underneath is synchronous
//! filesystem access.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use remock_store::{ArchiveStore, ops};

use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::materializer::{MaterializeRequest, Materializer};

/// A named operation with its plain-data arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "task", rename_all = "camelCase")]
pub enum TaskRequest {
    #[serde(rename_all = "camelCase")]
    ReadFile { path: PathBuf },
    #[serde(rename_all = "camelCase")]
    DeleteFile { path: PathBuf },
    #[serde(rename_all = "camelCase")]
    DeleteDirectory { path: PathBuf },
    #[serde(rename_all = "camelCase")]
    EnsureDirectory { path: PathBuf },
    #[serde(rename_all = "camelCase")]
    MaterializeResponses {
        spec_key: String,
        #[serde(rename = "serviceURL")]
        service_url: String,
        archive_names: Vec<String>,
        #[serde(default)]
        override_existing: bool,
    },
    #[serde(rename_all = "camelCase")]
    CleanOrphanedFixtures { active_specs: Vec<String> },
    PurgeAll,
}

/// Shared collaborators the task surface needs.
pub struct TaskContext {
    pub store: ArchiveStore,
    pub fetcher: Arc<dyn Fetcher>,
    pub disambiguation_token: String,
}

/// Dispatches one task. The `Err` side is reported to the host via
/// [`crate::BrokerError::to_tagged_value`].
pub async fn dispatch(ctx: &TaskContext, request: TaskRequest) -> Result<Value> {
    debug!(?request, "dispatching task");
    match request {
        TaskRequest::ReadFile { path } => {
            let value: Option<Value> = ops::read_json(&path)?;
            Ok(value.unwrap_or(Value::Null))
        }
        TaskRequest::DeleteFile { path } => Ok(Value::Bool(ops::delete_file(&path)?)),
        TaskRequest::DeleteDirectory { path } => {
            ops::delete_dir_recursive(&path)?;
            Ok(Value::Null)
        }
        TaskRequest::EnsureDirectory { path } => {
            ops::ensure_dir(&path)?;
            Ok(Value::Null)
        }
        TaskRequest::MaterializeResponses {
            spec_key,
            service_url,
            archive_names,
            override_existing,
        } => {
            let materializer = Materializer::new(
                ctx.store.bundle(&spec_key),
                Arc::clone(&ctx.fetcher),
                ctx.disambiguation_token.clone(),
            );
            let outcome = materializer
                .run(&MaterializeRequest {
                    service_url,
                    archive_names,
                    override_existing,
                })
                .await?;
            Ok(serde_json::to_value(outcome)?)
        }
        TaskRequest::CleanOrphanedFixtures { active_specs } => {
            let deleted = ctx.store.prune_orphaned_fixtures(&active_specs)?;
            Ok(json!({ "deleted": deleted }))
        }
        TaskRequest::PurgeAll => {
            ctx.store.purge_all()?;
            Ok(Value::Null)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchError, FetchedResponse};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    struct NoFetcher;

    #[async_trait::async_trait]
    impl Fetcher for NoFetcher {
        async fn fetch(&self, _url: &str) -> std::result::Result<FetchedResponse, FetchError> {
            Err(FetchError::Status { status: 500 })
        }
    }

    fn context(tmp: &TempDir) -> TaskContext {
        TaskContext {
            store: ArchiveStore::new(tmp.path().join("savedResponse")),
            fetcher: Arc::new(NoFetcher),
            disambiguation_token: "&iid".to_string(),
        }
    }

    #[test]
    fn requests_deserialize_from_host_shapes() {
        let request: TaskRequest = serde_json::from_value(json!({
            "task": "readFile",
            "path": "/tmp/responseList.json"
        }))
        .unwrap();
        assert!(matches!(request, TaskRequest::ReadFile { .. }));

        let request: TaskRequest = serde_json::from_value(json!({
            "task": "materializeResponses",
            "specKey": "checkout_spec",
            "serviceURL": "https://api.example/",
            "archiveNames": ["adds_an_item"],
            "overrideExisting": true
        }))
        .unwrap();
        let TaskRequest::MaterializeResponses {
            spec_key,
            override_existing,
            ..
        } = request
        else {
            panic!("wrong variant");
        };
        assert_eq!(spec_key, "checkout_spec");
        assert!(override_existing);

        let request: TaskRequest =
            serde_json::from_value(json!({ "task": "purgeAll" })).unwrap();
        assert!(matches!(request, TaskRequest::PurgeAll));
    }

    #[tokio::test]
    async fn read_file_returns_null_for_missing() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp);

        let result = dispatch(
            &ctx,
            TaskRequest::ReadFile {
                path: tmp.path().join("absent.json"),
            },
        )
        .await
        .unwrap();
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn read_file_surfaces_malformed_json_as_tagged_parse_error() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp);
        let path = tmp.path().join("bad.json");
        fs::write(&path, "{oops").unwrap();

        let err = dispatch(&ctx, TaskRequest::ReadFile { path }).await.unwrap_err();
        assert_eq!(err.kind(), "parse");
        assert_eq!(err.to_tagged_value()["kind"], "parse");
    }

    #[tokio::test]
    async fn delete_and_ensure_round_trip() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp);
        let dir = tmp.path().join("fresh");

        dispatch(&ctx, TaskRequest::EnsureDirectory { path: dir.clone() })
            .await
            .unwrap();
        assert!(dir.is_dir());

        let file = dir.join("f.json");
        fs::write(&file, "{}").unwrap();
        let deleted = dispatch(&ctx, TaskRequest::DeleteFile { path: file.clone() })
            .await
            .unwrap();
        assert_eq!(deleted, Value::Bool(true));
        let deleted = dispatch(&ctx, TaskRequest::DeleteFile { path: file })
            .await
            .unwrap();
        assert_eq!(deleted, Value::Bool(false));

        dispatch(&ctx, TaskRequest::DeleteDirectory { path: dir.clone() })
            .await
            .unwrap();
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn clean_orphans_reports_deleted_specs() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp);
        ctx.store.bundle("live_spec").ensure_layout().unwrap();
        ctx.store.bundle("dead_spec").ensure_layout().unwrap();

        let result = dispatch(
            &ctx,
            TaskRequest::CleanOrphanedFixtures {
                active_specs: vec!["live_spec".to_string()],
            },
        )
        .await
        .unwrap();
        assert_eq!(result, json!({ "deleted": ["dead_spec"] }));
    }

    #[tokio::test]
    async fn purge_all_resets_the_store() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp);
        ctx.store.bundle("a_spec").ensure_layout().unwrap();

        dispatch(&ctx, TaskRequest::PurgeAll).await.unwrap();
        assert!(ctx.store.spec_keys().unwrap().is_empty());
    }
}
