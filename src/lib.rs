//! # Cantus - Speech-Synthesis Model Serving
//!
//! Serves text-to-speech requests against a default voice model immediately,
//! while the rest of the model catalog downloads and initializes in the
//! background.
//!
//! ## Architecture
//!
//! Cantus is an umbrella crate that coordinates:
//! - **cantus-core** - Model identifiers, artifacts, engine and catalog traits
//! - **cantus-models** - Registry, loader, background warm-up, per-request dispatch
//! - **cantus-dsp** - Post-processing (phase-vocoder time stretch, pitch shift)
//! - **cantus-export** - WAV artifact writing with collision-free names
//!
//! ## Quick Start
//!
//! ```ignore
//! use cantus::prelude::*;
//!
//! let cantus = Cantus::builder()
//!     .catalog(ManifestCatalog::from_path("models.toml")?)
//!     .engine(|id, artifacts| my_backend::load(id, artifacts))
//!     .build()?;
//!
//! // Default model
//! let out = cantus.synthesize(&SynthesisRequest::new("hello"))?;
//!
//! // Explicit model; fails with `ModelNotLoaded` until its background load lands
//! let out = cantus.synthesize(
//!     &SynthesisRequest::new("bonjour").model("tts/fr/css10/vits").pitch(1.2),
//! )?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Everything below
//! - `export` - Local WAV artifact writer; without it only [`Cantus::render`] is available

/// Re-export of cantus-core for direct access
pub use cantus_core as core;

pub use cantus_core::{
    ArtifactFetcher, ArtifactLocations, CatalogSource, EngineCapabilities, EngineError,
    EngineFactory, ErrorKind, ModelArtifacts, ModelDescriptor, ModelId, ReadyFlag, SpeechEngine,
};

pub use cantus_models as models;

pub use cantus_models::{
    CacheFetcher, DefaultPolicy, DispatchError, ManifestCatalog, ModelInfo, ModelListing,
    ModelRegistry, ModelStatus, SynthesisRequest, SynthesisResult, WarmupHandle, WarmupReport,
};

pub use cantus_dsp as dsp;

pub use cantus_dsp::{FftSize, PostProcessor};

// Export
#[cfg(feature = "export")]
pub use cantus_export as export;

#[cfg(feature = "export")]
pub use cantus_export::{ArtifactRef, ArtifactWriter, BitDepth, WavArtifactWriter};

mod builder;
mod config;
mod engine;
mod error;

pub use builder::CantusBuilder;
pub use config::{CantusConfig, DEFAULT_MODEL};
pub use engine::Cantus;
#[cfg(feature = "export")]
pub use engine::SynthesisOutput;
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Cantus, CantusBuilder, CantusConfig};

    pub use crate::core::{CatalogSource, EngineError, ModelArtifacts, ModelId, SpeechEngine};

    pub use crate::models::{DefaultPolicy, ManifestCatalog, ModelStatus, SynthesisRequest};

    #[cfg(feature = "export")]
    pub use crate::{ArtifactRef, SynthesisOutput};
}
