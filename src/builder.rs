//! Builder for configuring and constructing a `Cantus` service.

use crate::config::CantusConfig;
use crate::{Cantus, Error, Result};
use cantus_core::{
    ArtifactFetcher, CatalogSource, EngineError, EngineFactory, ModelArtifacts, ModelId,
    ReadyFlag, SpeechEngine,
};
use cantus_dsp::FftSize;
use cantus_models::{
    CacheFetcher, DefaultPolicy, Dispatcher, ManifestCatalog, ModelLoader, ModelRegistry,
    WarmupScheduler,
};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "export")]
use cantus_export::{ArtifactWriter, WavArtifactWriter};

/// `build()` blocks until the default model is loaded and ready; the rest of
/// the catalog keeps loading in the background afterwards.
///
/// A catalog (or a `manifest` path in the config) and an engine factory are
/// required. The fetcher defaults to [`CacheFetcher`] over `cache_dir` and the
/// writer to [`WavArtifactWriter`] over `output_dir`.
///
/// # Example
///
/// ```ignore
/// let cantus = Cantus::builder()
///     .config(CantusConfig::from_path("cantus.toml")?)
///     .engine(|id, artifacts| onnx::load_tts(id, artifacts))
///     .max_concurrent_loads(4)
///     .build()?;
/// ```
#[derive(Default)]
pub struct CantusBuilder {
    config: CantusConfig,
    catalog: Option<Arc<dyn CatalogSource>>,
    fetcher: Option<Arc<dyn ArtifactFetcher>>,
    engine_factory: Option<EngineFactory>,
    load_timeout: Option<Duration>,

    #[cfg(feature = "export")]
    writer: Option<Arc<dyn ArtifactWriter>>,
}

impl CantusBuilder {
    /// Replace the whole configuration. Later setters override its fields.
    pub fn config(mut self, config: CantusConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_model(mut self, id: impl Into<ModelId>) -> Self {
        self.config.default_model = id.into();
        self
    }

    pub fn catalog(mut self, catalog: impl CatalogSource + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    pub fn shared_catalog(mut self, catalog: Arc<dyn CatalogSource>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn fetcher(mut self, fetcher: impl ArtifactFetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn engine_factory(mut self, factory: EngineFactory) -> Self {
        self.engine_factory = Some(factory);
        self
    }

    /// Closure form of [`engine_factory`](Self::engine_factory).
    pub fn engine<F>(self, factory: F) -> Self
    where
        F: Fn(&ModelId, &ModelArtifacts) -> std::result::Result<Arc<dyn SpeechEngine>, EngineError>
            + Send
            + Sync
            + 'static,
    {
        self.engine_factory(Arc::new(factory))
    }

    #[cfg(feature = "export")]
    pub fn writer(mut self, writer: impl ArtifactWriter + 'static) -> Self {
        self.writer = Some(Arc::new(writer));
        self
    }

    pub fn max_concurrent_loads(mut self, n: usize) -> Self {
        self.config.max_concurrent_loads = Some(n);
        self
    }

    /// Per-load time limit, kept at full precision. Takes precedence over
    /// `load_timeout_secs` in the config.
    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    pub fn default_policy(mut self, policy: DefaultPolicy) -> Self {
        self.config.default_policy = policy;
        self
    }

    pub fn fallback_to_first_available(mut self, enabled: bool) -> Self {
        self.config.fallback_to_first_available = enabled;
        self
    }

    pub fn fft_size(mut self, fft_size: FftSize) -> Self {
        self.config.fft_size = fft_size;
        self
    }

    pub fn build(self) -> Result<Cantus> {
        let config = self.config;
        config.validate()?;
        if self.load_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::Config("load_timeout must be greater than zero".into()));
        }
        let load_timeout = self.load_timeout.or_else(|| config.load_timeout());

        let catalog: Arc<dyn CatalogSource> = match (self.catalog, &config.manifest) {
            (Some(catalog), _) => catalog,
            (None, Some(manifest)) => Arc::new(ManifestCatalog::from_path(manifest)?),
            (None, None) => {
                return Err(Error::Config(
                    "No catalog configured. Use .catalog() or set `manifest` in the config.".into(),
                ))
            }
        };

        let factory = self.engine_factory.ok_or_else(|| {
            Error::Config("No engine factory configured. Use .engine() to set one.".into())
        })?;

        let fetcher = self
            .fetcher
            .unwrap_or_else(|| Arc::new(CacheFetcher::new(config.cache_dir.clone())) as Arc<dyn ArtifactFetcher>);

        let loader = ModelLoader::new(Arc::clone(&catalog), fetcher, factory)
            .with_timeout(load_timeout);
        let registry = Arc::new(ModelRegistry::new());
        let ready = Arc::new(ReadyFlag::new());

        let outcome = WarmupScheduler::new(
            loader,
            Arc::clone(&registry),
            Arc::clone(&ready),
            config.warmup_config(),
        )
        .start()?;

        let dispatcher = Dispatcher::new(Arc::clone(&registry), ready, config.default_policy);
        dispatcher.bind_default(&outcome.default);

        #[cfg(feature = "export")]
        let writer = self
            .writer
            .unwrap_or_else(|| {
                Arc::new(WavArtifactWriter::new(config.output_dir.clone())) as Arc<dyn ArtifactWriter>
            });

        tracing::info!(
            default_model = %outcome.default.id(),
            catalog = catalog.list_available().len(),
            pending = outcome.handle.pending(),
            policy = ?config.default_policy,
            "cantus ready"
        );

        Ok(Cantus::from_parts(
            config,
            catalog,
            registry,
            dispatcher,
            outcome.handle,
            #[cfg(feature = "export")]
            writer,
        ))
    }
}
