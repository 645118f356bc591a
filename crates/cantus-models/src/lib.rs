//! Cantus models - registry, loading, warm-up and dispatch.
//!
//! ```text
//! ┌──────────────┐   load    ┌─────────────┐  insert   ┌───────────────┐
//! │ WarmupSched. │ ────────► │ ModelLoader │ ────────► │ ModelRegistry │
//! └──────────────┘           └─────────────┘           └───────┬───────┘
//!        │ ready.set()                                          │ get
//!        ▼                                                      ▼
//!   ReadyFlag ───────────────────────────────────────────► Dispatcher
//! ```
//!
//! The default model is loaded on the caller's thread; every other catalog
//! entry is loaded by a bounded pool of background workers. Requests never wait
//! for a load: an explicit model that is not yet registered fails with
//! [`DispatchError::ModelNotLoaded`].

mod dispatch;
mod error;
mod fetch;
mod listing;
mod loader;
mod manifest;
mod registry;
mod warmup;

pub use dispatch::{DefaultPolicy, Dispatcher, DispatcherState, SynthesisRequest, SynthesisResult};
pub use error::{DispatchError, ManifestError, Result, WarmupError};
pub use fetch::CacheFetcher;
pub use listing::{list_models, ModelInfo, ModelListing};
pub use loader::{LoadedModel, ModelLoader};
pub use manifest::ManifestCatalog;
pub use registry::{ModelRegistry, ModelStatus, RegistryEntry};
pub use warmup::{WarmupConfig, WarmupHandle, WarmupOutcome, WarmupReport, WarmupScheduler};
