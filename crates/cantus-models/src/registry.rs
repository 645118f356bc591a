//! Model registry - the single source of truth for "is this model usable now".
//!
//! Published entries live in a sharded [`DashMap`] keyed by [`ModelId`]. An entry
//! is constructed completely (artifacts + engine) before it is inserted as one
//! `Arc`, so readers observe either nothing or a ready entry. Inserts for
//! distinct identifiers touch different shards and never wait on each other
//! beyond a shard's brief write lock.
//!
//! Load progress (`Queued`, `Loading`, `Failed`) is tracked in a second map so it
//! can never be mistaken for a published entry.

use cantus_core::{ModelArtifacts, ModelId, SpeechEngine};
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// A loaded, ready-to-serve model.
pub struct RegistryEntry {
    id: ModelId,
    artifacts: ModelArtifacts,
    engine: Arc<dyn SpeechEngine>,
    loaded_at: Instant,
}

impl RegistryEntry {
    pub fn id(&self) -> &ModelId {
        &self.id
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    pub fn engine(&self) -> &Arc<dyn SpeechEngine> {
        &self.engine
    }

    pub fn sample_rate(&self) -> u32 {
        self.engine.sample_rate()
    }

    pub fn loaded_at(&self) -> Instant {
        self.loaded_at
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id)
            .field("artifacts", &self.artifacts)
            .field("engine", &self.engine.capabilities().name)
            .finish()
    }
}

/// Lifecycle state of one identifier, as seen by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ModelStatus {
    NotLoaded,
    Queued,
    Loading,
    Ready,
    /// Abandoned for the rest of the process lifetime.
    Failed(String),
}

impl ModelStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => f.write_str("not loaded"),
            Self::Queued => f.write_str("queued"),
            Self::Loading => f.write_str("loading"),
            Self::Ready => f.write_str("ready"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Concurrent identifier → loaded model store.
#[derive(Default)]
pub struct ModelRegistry {
    entries: DashMap<ModelId, Arc<RegistryEntry>>,
    pending: DashMap<ModelId, ModelStatus>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a ready entry. Never blocks on loads in progress.
    pub fn get(&self, id: &ModelId) -> Option<Arc<RegistryEntry>> {
        self.entries.get(id).map(|e| Arc::clone(e.value()))
    }

    pub fn contains(&self, id: &ModelId) -> bool {
        self.entries.contains_key(id)
    }

    /// Publish a ready entry for `id`.
    ///
    /// The entry is built before touching the map; an existing entry is replaced
    /// wholesale (last writer wins). Returns the published entry.
    pub fn insert(
        &self,
        id: ModelId,
        artifacts: ModelArtifacts,
        engine: Arc<dyn SpeechEngine>,
    ) -> Arc<RegistryEntry> {
        let entry = Arc::new(RegistryEntry {
            id: id.clone(),
            artifacts,
            engine,
            loaded_at: Instant::now(),
        });

        let replaced = self.entries.insert(id.clone(), Arc::clone(&entry)).is_some();
        self.pending.remove(&id);

        tracing::debug!(model = %id, replaced, "registry entry published");
        entry
    }

    /// Record that a load for `id` has been scheduled. Ignored once ready.
    pub fn mark_queued(&self, id: &ModelId) {
        self.set_pending(id, ModelStatus::Queued);
    }

    /// Record that a load for `id` has begun. Ignored once ready.
    pub fn mark_loading(&self, id: &ModelId) {
        self.set_pending(id, ModelStatus::Loading);
    }

    /// Record a terminal load failure for `id`. Ignored once ready.
    pub fn mark_failed(&self, id: &ModelId, reason: impl Into<String>) {
        self.set_pending(id, ModelStatus::Failed(reason.into()));
    }

    fn set_pending(&self, id: &ModelId, status: ModelStatus) {
        // Entries never regress from ready.
        if self.entries.contains_key(id) {
            return;
        }
        self.pending.insert(id.clone(), status);
        // Lost a race with `insert`: drop the stale marker.
        if self.entries.contains_key(id) {
            self.pending.remove(id);
        }
    }

    pub fn status(&self, id: &ModelId) -> ModelStatus {
        if self.entries.contains_key(id) {
            return ModelStatus::Ready;
        }
        self.pending
            .get(id)
            .map(|s| s.value().clone())
            .unwrap_or(ModelStatus::NotLoaded)
    }

    /// Identifiers of every ready entry, sorted.
    pub fn loaded_ids(&self) -> Vec<ModelId> {
        let mut ids: Vec<ModelId> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of ready entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("ready", &self.entries.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
