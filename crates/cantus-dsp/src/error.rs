//! Error types for cantus-dsp.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DspError>;

/// Largest accepted stretch, resample or pitch factor; the smallest is its
/// reciprocal.
pub const MAX_FACTOR: f64 = 16.0;

#[derive(Debug, Error)]
pub enum DspError {
    #[error("Invalid parameter '{name}': {value} (must be finite and greater than zero)")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Parameter '{name}' out of range: {value} (expected {min} to {max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Resampling failed: {0}")]
    Resample(String),
}

impl From<rubato::ResamplerConstructionError> for DspError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        DspError::Resample(e.to_string())
    }
}

/// Accept only finite, strictly positive values.
pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DspError::InvalidParameter { name, value })
    }
}

/// Positive and within `[1 / MAX_FACTOR, MAX_FACTOR]`.
pub(crate) fn check_factor(name: &'static str, value: f64) -> Result<()> {
    check_positive(name, value)?;
    let min = 1.0 / MAX_FACTOR;
    // Small tolerance so a factor and its reciprocal round-trip at the bounds.
    let slack = 1e-9;
    if value < min * (1.0 - slack) || value > MAX_FACTOR * (1.0 + slack) {
        return Err(DspError::OutOfRange {
            name,
            value,
            min,
            max: MAX_FACTOR,
        });
    }
    Ok(())
}
