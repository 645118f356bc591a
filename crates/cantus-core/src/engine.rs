//! Speech engine abstraction - framework-agnostic synthesis.
//!
//! Defines the [`SpeechEngine`] trait that inference frameworks implement. The
//! API is text in, flat mono `Vec<f32>` out at the engine's native sample rate.
//! No framework-specific tensor types cross the boundary.

use crate::artifacts::ModelArtifacts;
use crate::model_id::ModelId;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by engines, either while being constructed or while synthesizing.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unsupported artifact format: {0}")]
    UnsupportedFormat(String),

    #[error("Engine initialization failed: {0}")]
    Init(String),

    #[error("Invalid input text: {0}")]
    InvalidText(String),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),
}

#[derive(Debug, Clone)]
pub struct EngineCapabilities {
    /// e.g. "Coqui/Tacotron2", "ONNX Runtime"
    pub name: String,
    pub has_gpu: bool,
}

impl Default for EngineCapabilities {
    fn default() -> Self {
        Self {
            name: "unknown".into(),
            has_gpu: false,
        }
    }
}

/// A runnable synthesis engine bound to one artifact set.
///
/// # Thread Safety
///
/// One engine instance is shared by every request that selects its model, so
/// all methods take `&self`. Implementations that keep internal caches must
/// synchronize them internally; callers never mutate shared engine state.
pub trait SpeechEngine: Send + Sync {
    /// Synthesize `text` into mono samples at [`sample_rate`](Self::sample_rate).
    fn synthesize(&self, text: &str) -> Result<Vec<f32>, EngineError>;

    /// Native output sample rate in Hz.
    fn sample_rate(&self) -> u32;

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities::default()
    }
}

/// Factory that builds an engine from fetched artifacts.
///
/// Called once per successful fetch, on whichever thread performs the load
/// (the caller's thread for the default model, a warm-up worker otherwise).
pub type EngineFactory = Arc<
    dyn Fn(&ModelId, &ModelArtifacts) -> Result<Arc<dyn SpeechEngine>, EngineError> + Send + Sync,
>;
