//! TOML-backed catalog.
//!
//! ```toml
//! [[models]]
//! id = "tts/en/ljspeech/tacotron2-DDC"
//! checkpoint = "en/model.pth"
//! config = "en/config.json"
//! vocoder = "vocoders/hifigan.pth"   # optional
//! ```
//!
//! Relative locations in a manifest read from disk are resolved against the
//! manifest's directory.

use crate::error::ManifestError;
use cantus_core::{ArtifactLocations, CatalogSource, ModelId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    models: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: ModelId,
    #[serde(flatten)]
    locations: ArtifactLocations,
}

/// In-memory catalog preserving manifest order.
#[derive(Debug, Clone, Default)]
pub struct ManifestCatalog {
    order: Vec<ModelId>,
    locations: HashMap<ModelId, ArtifactLocations>,
}

impl ManifestCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. A repeated id keeps its first position and takes
    /// the new locations.
    pub fn with_model(mut self, id: impl Into<ModelId>, locations: ArtifactLocations) -> Self {
        let id = id.into();
        if self.locations.insert(id.clone(), locations).is_none() {
            self.order.push(id);
        }
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ManifestError> {
        let file: ManifestFile = toml::from_str(content)?;
        let mut catalog = Self::new();
        for entry in file.models {
            if catalog.locations.contains_key(&entry.id) {
                return Err(ManifestError::Duplicate(entry.id));
            }
            catalog = catalog.with_model(entry.id, entry.locations);
        }
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut catalog = Self::from_toml_str(&content)?;

        if let Some(base) = path.parent() {
            for locations in catalog.locations.values_mut() {
                locations.checkpoint = resolve_relative(base, &locations.checkpoint);
                locations.config = resolve_relative(base, &locations.config);
                if let Some(vocoder) = locations.vocoder.as_mut() {
                    *vocoder = resolve_relative(base, vocoder);
                }
            }
        }

        tracing::debug!(path = %path.display(), models = catalog.len(), "manifest loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn resolve_relative(base: &Path, location: &str) -> String {
    if location.contains("://") || Path::new(location).is_absolute() {
        return location.to_string();
    }
    base.join(location).to_string_lossy().into_owned()
}

impl CatalogSource for ManifestCatalog {
    fn list_available(&self) -> Vec<ModelId> {
        self.order.clone()
    }

    fn resolve(&self, id: &ModelId) -> Option<ArtifactLocations> {
        self.locations.get(id).cloned()
    }

    fn contains(&self, id: &ModelId) -> bool {
        self.locations.contains_key(id)
    }
}
