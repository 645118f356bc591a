//! Cantus core - shared vocabulary for the speech-synthesis model registry.
//!
//! Defines the identifiers, artifact sets and collaborator traits every other
//! Cantus crate speaks in:
//!
//! - [`ModelId`] / [`ModelDescriptor`] - catalog keys and their parsed segments
//! - [`ArtifactLocations`] / [`ModelArtifacts`] - where a model comes from and where it lives
//! - [`SpeechEngine`] / [`EngineFactory`] - the runnable inference handle
//! - [`CatalogSource`] / [`ArtifactFetcher`] - external providers
//! - [`ReadyFlag`] - set-once readiness gate
//!
//! This crate contains NO inference framework dependencies. Engines are provided
//! through [`EngineFactory`] by the application (ONNX Runtime, candle, a Python
//! bridge, ...).

mod artifacts;
mod catalog;
mod engine;
mod error;
mod lockfree;
mod model_id;

pub use artifacts::{ArtifactLocations, ModelArtifacts};
pub use catalog::{ArtifactFetcher, CatalogSource};
pub use engine::{EngineCapabilities, EngineError, EngineFactory, SpeechEngine};
pub use error::{ErrorKind, FetchError, LoadError};
pub use lockfree::ReadyFlag;
pub use model_id::{ModelDescriptor, ModelId, UNKNOWN_SEGMENT};
