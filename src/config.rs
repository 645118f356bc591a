//! Service configuration, loadable from TOML.
//!
//! ```toml
//! default_model = "tts/en/ljspeech/tacotron2-DDC"
//! manifest = "models.toml"
//! cache_dir = "./models"
//! output_dir = "./audio"
//! max_concurrent_loads = 4
//! load_timeout_secs = 600
//! default_policy = "follow_last_explicit"   # or "fixed"
//! fallback_to_first_available = false
//! fft_size = "medium"
//! ```
//!
//! Every field is optional; missing fields take the [`Default`] values.

use crate::{Error, Result};
use cantus_core::ModelId;
use cantus_dsp::FftSize;
use cantus_models::{DefaultPolicy, WarmupConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "tts/en/ljspeech/tacotron2-DDC";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CantusConfig {
    /// Loaded synchronously at startup; failure is fatal.
    pub default_model: ModelId,
    /// Catalog manifest, used when no catalog is given to the builder.
    pub manifest: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Background worker pool size. `None` = one worker per queued model.
    pub max_concurrent_loads: Option<usize>,
    /// Per-load timeout. `None` = wait indefinitely.
    pub load_timeout_secs: Option<u64>,
    pub default_policy: DefaultPolicy,
    pub fallback_to_first_available: bool,
    pub fft_size: FftSize,
}

impl Default for CantusConfig {
    fn default() -> Self {
        Self {
            default_model: ModelId::new(DEFAULT_MODEL),
            manifest: None,
            cache_dir: PathBuf::from("./models"),
            output_dir: PathBuf::from("./audio"),
            max_concurrent_loads: None,
            load_timeout_secs: None,
            default_policy: DefaultPolicy::default(),
            fallback_to_first_available: false,
            fft_size: FftSize::default(),
        }
    }
}

impl CantusConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file. A relative `manifest` is resolved against the
    /// file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_toml_str(&std::fs::read_to_string(path)?)?;
        if let (Some(manifest), Some(base)) = (config.manifest.as_mut(), path.parent()) {
            if manifest.is_relative() {
                *manifest = base.join(&*manifest);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_model.as_str().trim().is_empty() {
            return Err(Error::Config("default_model must not be empty".into()));
        }
        if self.max_concurrent_loads == Some(0) {
            return Err(Error::Config("max_concurrent_loads must be at least 1".into()));
        }
        if self.load_timeout_secs == Some(0) {
            return Err(Error::Config("load_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_secs.map(Duration::from_secs)
    }

    pub fn warmup_config(&self) -> WarmupConfig {
        let mut warmup = WarmupConfig::new(self.default_model.clone())
            .fallback_to_first_available(self.fallback_to_first_available);
        if let Some(n) = self.max_concurrent_loads {
            warmup = warmup.max_concurrent_loads(n);
        }
        warmup
    }
}
