//! The `Cantus` service handle that ties warm-up, dispatch, post-processing
//! and artifact writing together.

use crate::config::CantusConfig;
use crate::Result;
use cantus_core::{CatalogSource, ModelId};
use cantus_dsp::PostProcessor;
use cantus_models::{
    list_models, DispatchError, Dispatcher, ModelListing, ModelRegistry, SynthesisRequest, SynthesisResult,
    WarmupHandle,
};
use std::sync::Arc;

#[cfg(feature = "export")]
use cantus_export::{ArtifactRef, ArtifactWriter};
#[cfg(feature = "export")]
use serde::Serialize;

/// A written synthesis result.
#[cfg(feature = "export")]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisOutput {
    pub artifact: ArtifactRef,
    pub model: ModelId,
    pub sample_rate: u32,
    pub duration_secs: f64,
}

/// Speech-synthesis service.
///
/// Cheap to clone; clones share the registry, the current default model and
/// the background warm-up. Every method takes `&self` and is safe to call
/// from any number of request threads.
///
/// # Example
///
/// ```ignore
/// use cantus::prelude::*;
///
/// let cantus = Cantus::builder()
///     .catalog(ManifestCatalog::from_path("models.toml")?)
///     .engine(|id, artifacts| my_backend::load(id, artifacts))
///     .build()?;                        // default model is ready here
///
/// let out = cantus.synthesize(&SynthesisRequest::new("hello").speed(1.2))?;
/// println!("{}", out.artifact.filename);
/// ```
#[derive(Clone)]
pub struct Cantus {
    inner: Arc<CantusInner>,
}

struct CantusInner {
    config: CantusConfig,
    catalog: Arc<dyn CatalogSource>,
    registry: Arc<ModelRegistry>,
    dispatcher: Dispatcher,
    post: PostProcessor,
    warmup: WarmupHandle,
    #[cfg(feature = "export")]
    writer: Arc<dyn ArtifactWriter>,
}

impl Cantus {
    pub fn builder() -> crate::CantusBuilder {
        crate::CantusBuilder::default()
    }

    pub(crate) fn from_parts(
        config: CantusConfig,
        catalog: Arc<dyn CatalogSource>,
        registry: Arc<ModelRegistry>,
        dispatcher: Dispatcher,
        warmup: WarmupHandle,
        #[cfg(feature = "export")] writer: Arc<dyn ArtifactWriter>,
    ) -> Self {
        let post = PostProcessor::new(config.fft_size);
        Self {
            inner: Arc::new(CantusInner {
                config,
                catalog,
                registry,
                dispatcher,
                post,
                warmup,
                #[cfg(feature = "export")]
                writer,
            }),
        }
    }

    /// Dispatch, post-process and return the audio without writing it.
    ///
    /// Speed and pitch are range-checked before the engine runs.
    pub fn render(&self, request: &SynthesisRequest) -> Result<SynthesisResult> {
        if !self.is_ready() {
            return Err(DispatchError::NotReady.into());
        }
        PostProcessor::validate(request.speed, request.pitch)?;

        let raw = self.inner.dispatcher.synthesize(request)?;
        let samples =
            self.inner
                .post
                .process(&raw.samples, raw.sample_rate, request.speed, request.pitch)?;

        Ok(SynthesisResult { samples, ..raw })
    }

    /// Dispatch, post-process and write one artifact.
    #[cfg(feature = "export")]
    pub fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisOutput> {
        let rendered = self.render(request)?;
        let artifact = self
            .inner
            .writer
            .write(&rendered.samples, rendered.sample_rate)?;

        Ok(SynthesisOutput {
            duration_secs: rendered.samples.len() as f64 / rendered.sample_rate as f64,
            artifact,
            model: rendered.model,
            sample_rate: rendered.sample_rate,
        })
    }

    /// Every catalog entry with its load status, grouped by language.
    pub fn models(&self) -> ModelListing {
        list_models(
            self.inner.catalog.as_ref(),
            &self.inner.registry,
            self.current_model(),
        )
    }

    pub fn is_ready(&self) -> bool {
        self.inner.dispatcher.is_ready()
    }

    /// Model serving requests that don't name one.
    pub fn current_model(&self) -> Option<ModelId> {
        self.inner.dispatcher.current_model()
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.inner.registry
    }

    pub fn warmup(&self) -> &WarmupHandle {
        &self.inner.warmup
    }

    pub fn config(&self) -> &CantusConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for Cantus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cantus")
            .field("dispatcher", &self.inner.dispatcher)
            .field("registry", &self.inner.registry)
            .field("warmup", &self.inner.warmup)
            .finish()
    }
}
