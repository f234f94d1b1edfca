use std::path::PathBuf;
use thiserror::Error;

use crate::marker::MarkerError;
use crate::pattern::PatternError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Marker(#[from] MarkerError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Store(#[from] remock_store::StoreError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
