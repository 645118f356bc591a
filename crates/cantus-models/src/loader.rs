//! Model loader: catalog resolve → artifact fetch → engine construction.

use cantus_core::{
    ArtifactFetcher, CatalogSource, EngineError, EngineFactory, LoadError, ModelArtifacts,
    ModelId, SpeechEngine,
};
use crossbeam_channel::RecvTimeoutError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A successfully loaded model, not yet published to the registry.
pub struct LoadedModel {
    pub artifacts: ModelArtifacts,
    pub engine: Arc<dyn SpeechEngine>,
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("artifacts", &self.artifacts)
            .field("sample_rate", &self.engine.sample_rate())
            .finish()
    }
}

/// Turns an identifier into a runnable engine.
///
/// Cheap to clone; clones share the catalog, fetcher and factory so warm-up
/// workers can each hold one.
#[derive(Clone)]
pub struct ModelLoader {
    catalog: Arc<dyn CatalogSource>,
    fetcher: Arc<dyn ArtifactFetcher>,
    factory: EngineFactory,
    timeout: Option<Duration>,
}

impl ModelLoader {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        fetcher: Arc<dyn ArtifactFetcher>,
        factory: EngineFactory,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            factory,
            timeout: None,
        }
    }

    /// Bound each load. The timed-out load keeps running on its own thread;
    /// its result is discarded.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogSource> {
        &self.catalog
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Load `id`. Blocks the calling thread for the duration of fetch + init.
    pub fn load(&self, id: &ModelId) -> Result<LoadedModel, LoadError> {
        match self.timeout {
            None => self.load_now(id),
            Some(timeout) => self.load_with_timeout(id, timeout),
        }
    }

    fn load_now(&self, id: &ModelId) -> Result<LoadedModel, LoadError> {
        let locations = self
            .catalog
            .resolve(id)
            .ok_or_else(|| LoadError::UnknownModel(id.clone()))?;

        let artifacts = self
            .fetcher
            .fetch(id, &locations)
            .map_err(|source| LoadError::FetchFailed {
                id: id.clone(),
                source,
            })?;

        let engine = (self.factory)(id, &artifacts).map_err(|source| LoadError::InitFailed {
            id: id.clone(),
            source,
        })?;

        tracing::debug!(
            model = %id,
            sample_rate = engine.sample_rate(),
            engine = %engine.capabilities().name,
            "model loaded"
        );
        Ok(LoadedModel { artifacts, engine })
    }

    fn load_with_timeout(&self, id: &ModelId, timeout: Duration) -> Result<LoadedModel, LoadError> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let loader = self.clone();
        let worker_id = id.clone();

        std::thread::Builder::new()
            .name("cantus-load".into())
            .spawn(move || {
                // Receiver may be gone after a timeout.
                let _ = tx.send(loader.load_now(&worker_id));
            })
            .map_err(|e| LoadError::InitFailed {
                id: id.clone(),
                source: EngineError::Init(format!("Failed to spawn load thread: {}", e)),
            })?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(LoadError::Timeout {
                id: id.clone(),
                timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(LoadError::InitFailed {
                id: id.clone(),
                source: EngineError::Init("load thread exited without a result".into()),
            }),
        }
    }
}

impl fmt::Debug for ModelLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelLoader")
            .field("catalog_size", &self.catalog.list_available().len())
            .field("timeout", &self.timeout)
            .finish()
    }
}
