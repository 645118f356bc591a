//! Catalog listing with per-model load status.

use crate::registry::{ModelRegistry, ModelStatus};
use cantus_core::{CatalogSource, ModelId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub model_id: ModelId,
    #[serde(rename = "type")]
    pub task_type: String,
    pub language: String,
    pub dataset: String,
    pub architecture: String,
    pub status: ModelStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelListing {
    pub total_models: usize,
    /// Catalog order.
    pub models: Vec<ModelInfo>,
    /// Only identifiers with at least task type, language and dataset.
    pub models_by_language: BTreeMap<String, Vec<ModelInfo>>,
    /// Languages named by any identifier; ids without a language segment add none.
    pub languages: BTreeSet<String>,
    pub total_languages: usize,
    pub current_model: Option<ModelId>,
}

/// Describe every catalog entry, loaded or not.
pub fn list_models(
    catalog: &dyn CatalogSource,
    registry: &ModelRegistry,
    current_model: Option<ModelId>,
) -> ModelListing {
    let models: Vec<ModelInfo> = catalog
        .list_available()
        .into_iter()
        .map(|id| {
            let d = id.descriptor();
            ModelInfo {
                status: registry.status(&id),
                model_id: id,
                task_type: d.task_type,
                language: d.language,
                dataset: d.dataset,
                architecture: d.architecture,
            }
        })
        .collect();

    let mut models_by_language: BTreeMap<String, Vec<ModelInfo>> = BTreeMap::new();
    for info in models.iter().filter(|m| m.model_id.descriptor().is_complete()) {
        models_by_language
            .entry(info.language.clone())
            .or_default()
            .push(info.clone());
    }
    let languages: BTreeSet<String> = models
        .iter()
        .filter_map(|m| m.model_id.language().map(str::to_string))
        .collect();

    ModelListing {
        total_models: models.len(),
        models,
        models_by_language,
        total_languages: languages.len(),
        languages,
        current_model,
    }
}
