//! Time-stretching parameters.

use serde::{Deserialize, Serialize};

/// FFT size for the phase vocoder.
///
/// Larger sizes resolve pitch better at the cost of smeared transients.
/// Speech sits comfortably at the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FftSize {
    /// 1024-point FFT (~46ms @ 22.05kHz)
    Small = 1024,

    /// 2048-point FFT (~93ms @ 22.05kHz) - Default
    #[default]
    Medium = 2048,

    /// 4096-point FFT (~186ms @ 22.05kHz)
    Large = 4096,
}

impl FftSize {
    pub fn size(&self) -> usize {
        *self as usize
    }

    /// Analysis hop (FFT size / 4 = 75% overlap)
    pub fn hop_size(&self) -> usize {
        self.size() / 4
    }

    pub fn window_seconds(&self, sample_rate: u32) -> f64 {
        self.size() as f64 / sample_rate as f64
    }
}
