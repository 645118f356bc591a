//! Collaborator traits: where models are listed and how their artifacts arrive.

use crate::artifacts::{ArtifactLocations, ModelArtifacts};
use crate::error::FetchError;
use crate::model_id::ModelId;

/// Enumerates the models that can be loaded and resolves their artifact locations.
pub trait CatalogSource: Send + Sync {
    /// Every identifier the catalog knows about, in catalog order.
    fn list_available(&self) -> Vec<ModelId>;

    /// Artifact locations for `id`, or `None` when the catalog does not know it.
    fn resolve(&self, id: &ModelId) -> Option<ArtifactLocations>;

    fn contains(&self, id: &ModelId) -> bool {
        self.resolve(id).is_some()
    }
}

/// Materializes artifact locations as local files.
///
/// Implementations must be idempotent: fetching the same identifier twice (or
/// from two threads at once) yields the same artifacts and never leaves a
/// partially written file behind.
pub trait ArtifactFetcher: Send + Sync {
    fn fetch(&self, id: &ModelId, locations: &ArtifactLocations)
        -> Result<ModelArtifacts, FetchError>;
}
