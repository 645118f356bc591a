//! Centralized error type for the cantus umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use cantus_core::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] cantus_core::LoadError),

    #[error(transparent)]
    Dispatch(#[from] cantus_models::DispatchError),

    #[error(transparent)]
    Warmup(#[from] cantus_models::WarmupError),

    #[error("DSP: {0}")]
    Dsp(#[from] cantus_dsp::DspError),

    #[cfg(feature = "export")]
    #[error("Export: {0}")]
    Export(#[from] cantus_export::ExportError),

    #[error("Manifest: {0}")]
    Manifest(#[from] cantus_models::ManifestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Load(e) => e.kind(),
            Error::Dispatch(e) => e.kind(),
            Error::Warmup(e) => e.kind(),
            Error::Dsp(
                cantus_dsp::DspError::InvalidParameter { .. } | cantus_dsp::DspError::OutOfRange { .. },
            ) => ErrorKind::InvalidParameter,
            // Post-processing runs after inference; a resampler failure fails the request.
            Error::Dsp(cantus_dsp::DspError::Resample(_)) => ErrorKind::InferenceFailed,
            #[cfg(feature = "export")]
            Error::Export(_) => ErrorKind::Storage,
            Error::Io(_) => ErrorKind::Storage,
            Error::Manifest(_) | Error::Config(_) | Error::Toml(_) => ErrorKind::Config,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
