//! Per-request model resolution and inference.
//!
//! The current default is a [`DispatcherState`] held in an [`ArcSwapOption`]:
//! requests load it without locking and a switch replaces it whole, so a
//! request never pairs one model's id with another model's engine.

use crate::error::{DispatchError, Result};
use crate::registry::{ModelRegistry, RegistryEntry};
use arc_swap::ArcSwapOption;
use cantus_core::{ModelId, ReadyFlag, SpeechEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What happens to the current default after an explicit-model request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// A successful explicit request makes that model the new default.
    #[default]
    FollowLastExplicit,
    /// The startup default never changes.
    Fixed,
}

/// The model that serves requests without an explicit `model`.
pub struct DispatcherState {
    pub id: ModelId,
    pub engine: Arc<dyn SpeechEngine>,
}

impl DispatcherState {
    pub fn from_entry(entry: &RegistryEntry) -> Self {
        Self {
            id: entry.id().clone(),
            engine: Arc::clone(entry.engine()),
        }
    }
}

fn default_factor() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    #[serde(default = "default_factor")]
    pub speed: f32,
    #[serde(default = "default_factor")]
    pub pitch: f32,
    #[serde(default)]
    pub model: Option<ModelId>,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speed: 1.0,
            pitch: 1.0,
            model: None,
        }
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Reject non-finite or non-positive factors.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("speed", self.speed), ("pitch", self.pitch)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DispatchError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Raw engine output for one request.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub model: ModelId,
}

pub struct Dispatcher {
    registry: Arc<ModelRegistry>,
    ready: Arc<ReadyFlag>,
    state: ArcSwapOption<DispatcherState>,
    policy: DefaultPolicy,
}

impl Dispatcher {
    pub fn new(registry: Arc<ModelRegistry>, ready: Arc<ReadyFlag>, policy: DefaultPolicy) -> Self {
        Self {
            registry,
            ready,
            state: ArcSwapOption::empty(),
            policy,
        }
    }

    /// Install the startup default.
    ///
    /// Usually called before readiness is raised. If readiness is already set
    /// without a bound default, `synthesize` keeps returning
    /// [`DispatchError::NotReady`] until this is called.
    pub fn bind_default(&self, entry: &RegistryEntry) {
        self.state.store(Some(Arc::new(DispatcherState::from_entry(entry))));
    }

    pub fn current_model(&self) -> Option<ModelId> {
        self.state.load_full().map(|s| s.id.clone())
    }

    pub fn policy(&self) -> DefaultPolicy {
        self.policy
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_set()
    }

    pub fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult> {
        if !self.ready.is_set() {
            return Err(DispatchError::NotReady);
        }
        request.validate()?;

        let (id, engine) = self.resolve(request.model.as_ref())?;

        let samples = engine
            .synthesize(&request.text)
            .map_err(|source| DispatchError::InferenceFailed {
                id: id.clone(),
                source,
            })?;

        Ok(SynthesisResult {
            samples,
            sample_rate: engine.sample_rate(),
            model: id,
        })
    }

    fn resolve(&self, requested: Option<&ModelId>) -> Result<(ModelId, Arc<dyn SpeechEngine>)> {
        let current = self.state.load_full().ok_or(DispatchError::NotReady)?;

        let requested = match requested {
            Some(id) if *id != current.id => id,
            _ => return Ok((current.id.clone(), Arc::clone(&current.engine))),
        };

        let entry = self
            .registry
            .get(requested)
            .ok_or_else(|| DispatchError::ModelNotLoaded {
                id: requested.clone(),
                status: self.registry.status(requested),
            })?;

        if self.policy == DefaultPolicy::FollowLastExplicit {
            self.state
                .store(Some(Arc::new(DispatcherState::from_entry(&entry))));
            tracing::info!(from = %current.id, to = %entry.id(), "default model switched");
        }

        Ok((entry.id().clone(), Arc::clone(entry.engine())))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("current_model", &self.current_model())
            .field("policy", &self.policy)
            .field("ready", &self.ready.is_set())
            .finish()
    }
}
