use serde_json::{Value, json};
use thiserror::Error;

use crate::fetcher::FetchError;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Core(#[from] remock_core::CoreError),

    #[error(transparent)]
    Store(#[from] remock_store::StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BrokerError {
    /// Stable error kind for the host's task-failure reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Core(remock_core::CoreError::Marker(_)) => "marker",
            Self::Core(remock_core::CoreError::Pattern(_)) => "pattern",
            Self::Core(remock_core::CoreError::ConfigParse { .. }) => "parse",
            Self::Core(remock_core::CoreError::Json(_)) => "parse",
            Self::Core(remock_core::CoreError::Store(err)) => store_kind(err),
            Self::Core(remock_core::CoreError::Io(_)) => "io",
            Self::Store(err) => store_kind(err),
            Self::Fetch(_) => "fetch",
            Self::Io(_) => "io",
            Self::Json(_) => "parse",
        }
    }

    /// The plain-data shape handed back through the host's task channel.
    pub fn to_tagged_value(&self) -> Value {
        json!({ "kind": self.kind(), "message": self.to_string() })
    }
}

fn store_kind(err: &remock_store::StoreError) -> &'static str {
    match err {
        remock_store::StoreError::Parse { .. } | remock_store::StoreError::Json(_) => "parse",
        remock_store::StoreError::Io(_) => "io",
    }
}

pub type Result<T> = std::result::Result<T, BrokerError>;
