//! Error types for model warm-up and dispatch.

use crate::registry::ModelStatus;
use cantus_core::{EngineError, ErrorKind, LoadError, ModelId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Per-request failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Service not ready: default model is still loading")]
    NotReady,

    #[error("Model not loaded: {id} ({status})")]
    ModelNotLoaded { id: ModelId, status: ModelStatus },

    #[error("Invalid parameter '{name}': {value} (must be finite and greater than zero)")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("Inference failed on {id}: {source}")]
    InferenceFailed {
        id: ModelId,
        #[source]
        source: EngineError,
    },
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotReady => ErrorKind::NotReady,
            Self::ModelNotLoaded { .. } => ErrorKind::ModelNotLoaded,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::InferenceFailed { .. } => ErrorKind::InferenceFailed,
        }
    }
}

/// Startup failures. Only the default model can fail warm-up; background loads
/// are logged and abandoned instead.
#[derive(Debug, Error)]
pub enum WarmupError {
    #[error("Default model {id} failed to load: {source}")]
    DefaultModel {
        id: ModelId,
        #[source]
        source: LoadError,
    },
}

impl WarmupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DefaultModel { source, .. } => source.kind(),
        }
    }
}

/// Errors from reading a catalog manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate model in manifest: {0}")]
    Duplicate(ModelId),
}
