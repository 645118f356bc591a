//! Pitch-preserving time stretch.
//!
//! Offline phase vocoder: the whole utterance is analyzed at once, frames are
//! resampled along the time axis with interpolated magnitudes and accumulated
//! phases, then resynthesized by windowed overlap-add.

mod phase_vocoder;
mod types;

pub use phase_vocoder::PhaseVocoder;
pub use types::FftSize;
