//! Cantus DSP - post-processing for synthesized speech.
//!
//! - [`time_stretch`] - offline phase vocoder ([`PhaseVocoder`], [`FftSize`])
//! - [`pitch_shift`] - stretch + resample, duration preserved
//! - [`resample`] - arbitrary-ratio sinc resampling (rubato)
//! - [`process`] / [`PostProcessor`] - speed then pitch, skipped at unity
//!
//! ```
//! let samples = vec![0.0f32; 4410];
//! let out = cantus_dsp::process(&samples, 22050, 1.0, 1.0).unwrap();
//! assert_eq!(out, samples);
//! ```

mod error;
mod pitch;
mod process;
mod resample;
pub mod time_stretch;

pub use error::{DspError, Result, MAX_FACTOR};
pub use pitch::{pitch_shift, pitch_to_semitones, semitones_to_ratio};
pub use process::{process, PostProcessor};
pub use resample::resample;
pub use time_stretch::{FftSize, PhaseVocoder};
