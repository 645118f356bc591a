//! Error types for cantus-core.

use crate::engine::EngineError;
use crate::model_id::ModelId;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Stable, machine-readable error classification shared by every Cantus crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Default model not yet available.
    NotReady,
    /// Explicit model requested before its background load completed.
    ModelNotLoaded,
    UnknownModel,
    FetchFailed,
    InitFailed,
    InvalidParameter,
    InferenceFailed,
    Timeout,
    Storage,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotReady => "not_ready",
            Self::ModelNotLoaded => "model_not_loaded",
            Self::UnknownModel => "unknown_model",
            Self::FetchFailed => "fetch_failed",
            Self::InitFailed => "init_failed",
            Self::InvalidParameter => "invalid_parameter",
            Self::InferenceFailed => "inference_failed",
            Self::Timeout => "timeout",
            Self::Storage => "storage",
            Self::Config => "config",
        }
    }

    /// Whether the same request may succeed later without operator intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotReady | Self::ModelNotLoaded)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from materializing artifacts locally.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Artifact source not found: {0}")]
    MissingSource(PathBuf),

    #[error("Unsupported artifact location: {0}")]
    UnsupportedLocation(String),

    #[error("Download of {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from loading a model. None of these are fatal to the process; the
/// caller decides whether to skip, log or propagate.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unknown model: {0}")]
    UnknownModel(ModelId),

    #[error("Failed to fetch artifacts for {id}: {source}")]
    FetchFailed {
        id: ModelId,
        #[source]
        source: FetchError,
    },

    #[error("Failed to initialize {id}: {source}")]
    InitFailed {
        id: ModelId,
        #[source]
        source: EngineError,
    },

    #[error("Loading {id} timed out after {timeout:?}")]
    Timeout { id: ModelId, timeout: Duration },
}

impl LoadError {
    pub fn model_id(&self) -> &ModelId {
        match self {
            Self::UnknownModel(id) => id,
            Self::FetchFailed { id, .. } | Self::InitFailed { id, .. } | Self::Timeout { id, .. } => {
                id
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownModel(_) => ErrorKind::UnknownModel,
            Self::FetchFailed { .. } => ErrorKind::FetchFailed,
            Self::InitFailed { .. } => ErrorKind::InitFailed,
            Self::Timeout { .. } => ErrorKind::Timeout,
        }
    }
}
