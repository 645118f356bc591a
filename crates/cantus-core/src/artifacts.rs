//! Artifact sets for loadable models.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a model's artifacts can be fetched from, as resolved by a catalog.
///
/// Locations are plain paths or `file://` URIs; how they are interpreted is up
/// to the [`ArtifactFetcher`](crate::ArtifactFetcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocations {
    pub checkpoint: String,
    pub config: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocoder: Option<String>,
}

impl ArtifactLocations {
    pub fn new(checkpoint: impl Into<String>, config: impl Into<String>) -> Self {
        Self {
            checkpoint: checkpoint.into(),
            config: config.into(),
            vocoder: None,
        }
    }

    pub fn with_vocoder(mut self, vocoder: impl Into<String>) -> Self {
        self.vocoder = Some(vocoder.into());
        self
    }
}

/// Local, fetched artifacts needed to construct a speech engine.
///
/// Immutable once built: a reload produces a fresh value that replaces the old
/// registry entry wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifacts {
    checkpoint: PathBuf,
    config: PathBuf,
    vocoder: Option<PathBuf>,
}

impl ModelArtifacts {
    pub fn new(checkpoint: PathBuf, config: PathBuf, vocoder: Option<PathBuf>) -> Self {
        Self {
            checkpoint,
            config,
            vocoder,
        }
    }

    pub fn checkpoint(&self) -> &Path {
        &self.checkpoint
    }

    pub fn config(&self) -> &Path {
        &self.config
    }

    pub fn vocoder(&self) -> Option<&Path> {
        self.vocoder.as_deref()
    }
}
