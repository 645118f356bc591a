//! Startup warm-up: the default model synchronously, everything else in the
//! background.
//!
//! ```text
//! start()
//!   ├─ load(default) ──► registry.insert ──► ready.set()     (caller's thread)
//!   └─ queue rest ──► [cantus-warmup-0..N] ──► load ──► registry.insert
//!                                                └─► warn!, mark_failed (abandoned)
//! ```
//!
//! Readiness is raised before any background work is queued, so a slow catalog
//! never delays the first request.

use crate::error::WarmupError;
use crate::loader::ModelLoader;
use crate::registry::{ModelRegistry, RegistryEntry};
use cantus_core::{ModelId, ReadyFlag};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

#[derive(Debug, Clone)]
pub struct WarmupConfig {
    pub default_model: ModelId,
    /// Worker pool size. `None` spawns one worker per queued model.
    pub max_concurrent_loads: Option<usize>,
    /// When the default fails, try the first other catalog entry before giving up.
    pub fallback_to_first_available: bool,
}

impl WarmupConfig {
    pub fn new(default_model: impl Into<ModelId>) -> Self {
        Self {
            default_model: default_model.into(),
            max_concurrent_loads: None,
            fallback_to_first_available: false,
        }
    }

    pub fn max_concurrent_loads(mut self, n: usize) -> Self {
        self.max_concurrent_loads = Some(n.max(1));
        self
    }

    pub fn fallback_to_first_available(mut self, enabled: bool) -> Self {
        self.fallback_to_first_available = enabled;
        self
    }
}

/// Result of a successful `start`.
pub struct WarmupOutcome {
    /// The registry entry now serving as the default (may be the fallback).
    pub default: Arc<RegistryEntry>,
    pub handle: WarmupHandle,
}

/// Final tally of background loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarmupReport {
    pub loaded: Vec<ModelId>,
    pub failed: Vec<(ModelId, String)>,
}

#[derive(Default)]
struct Progress {
    pending: AtomicUsize,
    loaded: Mutex<Vec<ModelId>>,
    failed: Mutex<Vec<(ModelId, String)>>,
}

impl Progress {
    fn report(&self) -> WarmupReport {
        let mut loaded = self.loaded.lock().clone();
        let mut failed = self.failed.lock().clone();
        loaded.sort();
        failed.sort();
        WarmupReport { loaded, failed }
    }
}

/// Observes background warm-up.
pub struct WarmupHandle {
    progress: Arc<Progress>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WarmupHandle {
    /// Background loads not yet finished (either way).
    pub fn pending(&self) -> usize {
        self.progress.pending.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.pending() == 0
    }

    /// Snapshot of what has finished so far.
    pub fn report(&self) -> WarmupReport {
        self.progress.report()
    }

    /// Block until every background worker has exited.
    pub fn wait(&self) -> WarmupReport {
        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("warm-up worker panicked");
            }
        }
        self.report()
    }
}

impl std::fmt::Debug for WarmupHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarmupHandle")
            .field("pending", &self.pending())
            .finish()
    }
}

pub struct WarmupScheduler {
    loader: ModelLoader,
    registry: Arc<ModelRegistry>,
    ready: Arc<ReadyFlag>,
    config: WarmupConfig,
}

impl WarmupScheduler {
    pub fn new(
        loader: ModelLoader,
        registry: Arc<ModelRegistry>,
        ready: Arc<ReadyFlag>,
        config: WarmupConfig,
    ) -> Self {
        Self {
            loader,
            registry,
            ready,
            config,
        }
    }

    /// Load the default model on this thread, raise readiness, then hand the
    /// rest of the catalog to background workers.
    ///
    /// Returns an error (and leaves readiness unset) only when no default
    /// could be loaded.
    pub fn start(self) -> Result<WarmupOutcome, WarmupError> {
        let catalog = self.loader.catalog().list_available();
        let default = self.load_default(&catalog)?;

        if self.ready.set() {
            tracing::info!(model = %default.id(), sample_rate = default.sample_rate(), "default model ready");
        }

        // A failed configured default is not retried in the background.
        let queue: Vec<ModelId> = catalog
            .into_iter()
            .filter(|id| {
                id != default.id() && *id != self.config.default_model && !self.registry.contains(id)
            })
            .collect();
        let handle = self.spawn_background(queue);

        Ok(WarmupOutcome { default, handle })
    }

    fn load_default(&self, catalog: &[ModelId]) -> Result<Arc<RegistryEntry>, WarmupError> {
        let id = &self.config.default_model;
        tracing::info!(model = %id, "loading default model");
        self.registry.mark_loading(id);

        let err = match self.loader.load(id) {
            Ok(loaded) => return Ok(self.registry.insert(id.clone(), loaded.artifacts, loaded.engine)),
            Err(e) => e,
        };
        self.registry.mark_failed(id, err.to_string());

        if self.config.fallback_to_first_available {
            if let Some(fallback) = catalog.iter().find(|c| *c != id) {
                tracing::warn!(model = %id, fallback = %fallback, error = %err, "default model failed, trying fallback");
                self.registry.mark_loading(fallback);
                match self.loader.load(fallback) {
                    Ok(loaded) => {
                        return Ok(self
                            .registry
                            .insert(fallback.clone(), loaded.artifacts, loaded.engine))
                    }
                    Err(e) => {
                        tracing::error!(model = %fallback, error = %e, "fallback model failed");
                        self.registry.mark_failed(fallback, e.to_string());
                    }
                }
            }
        }

        tracing::error!(model = %id, error = %err, "default model failed to load");
        Err(WarmupError::DefaultModel {
            id: id.clone(),
            source: err,
        })
    }

    fn spawn_background(self, queue: Vec<ModelId>) -> WarmupHandle {
        let progress = Arc::new(Progress::default());
        let total = queue.len();
        if total == 0 {
            return WarmupHandle {
                progress,
                workers: Mutex::new(Vec::new()),
            };
        }

        let worker_count = self.config.max_concurrent_loads.unwrap_or(total).clamp(1, total);
        progress.pending.store(total, Ordering::Release);

        let (tx, rx) = crossbeam_channel::unbounded::<ModelId>();
        for id in queue {
            self.registry.mark_queued(&id);
            // Receiver is alive in this scope.
            let _ = tx.send(id);
        }
        drop(tx);

        tracing::info!(queued = total, workers = worker_count, "background warm-up started");

        let mut workers = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let rx = rx.clone();
            let loader = self.loader.clone();
            let registry = Arc::clone(&self.registry);
            let progress = Arc::clone(&progress);

            let spawned = std::thread::Builder::new()
                .name(format!("cantus-warmup-{}", index))
                .spawn(move || {
                    for id in rx.iter() {
                        load_one(&loader, &registry, &progress, id);
                    }
                });

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => tracing::error!(worker = index, error = %e, "failed to spawn warm-up worker"),
            }
        }

        if workers.is_empty() {
            // Nothing will drain the queue; abandon it.
            for id in rx.try_iter() {
                let reason = "no warm-up worker available".to_string();
                self.registry.mark_failed(&id, reason.clone());
                progress.failed.lock().push((id, reason));
                progress.pending.fetch_sub(1, Ordering::AcqRel);
            }
        }

        WarmupHandle {
            progress,
            workers: Mutex::new(workers),
        }
    }
}

fn load_one(loader: &ModelLoader, registry: &ModelRegistry, progress: &Progress, id: ModelId) {
    registry.mark_loading(&id);
    match loader.load(&id) {
        Ok(loaded) => {
            registry.insert(id.clone(), loaded.artifacts, loaded.engine);
            tracing::info!(model = %id, "background model ready");
            progress.loaded.lock().push(id);
        }
        Err(e) => {
            tracing::warn!(model = %id, kind = %e.kind(), error = %e, "background load abandoned");
            let reason = e.to_string();
            registry.mark_failed(&id, reason.clone());
            progress.failed.lock().push((id, reason));
        }
    }
    progress.pending.fetch_sub(1, Ordering::AcqRel);
}
