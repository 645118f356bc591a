//! Speed then pitch, each only when it deviates from unity.

use crate::error::{check_factor, check_positive, Result};
use crate::pitch::{pitch_shift, pitch_to_semitones};
use crate::time_stretch::{FftSize, PhaseVocoder};

#[inline]
fn is_unity(factor: f32) -> bool {
    (factor - 1.0).abs() <= f32::EPSILON
}

/// Post-processing pipeline bound to one FFT size.
///
/// Stateless between calls; share one instance across threads.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    vocoder: PhaseVocoder,
}

impl PostProcessor {
    pub fn new(fft_size: FftSize) -> Self {
        Self {
            vocoder: PhaseVocoder::new(fft_size),
        }
    }

    pub fn fft_size(&self) -> usize {
        self.vocoder.fft_size()
    }

    /// Check `speed` and `pitch` without touching any audio.
    ///
    /// Both must be finite, positive and within `[1 / MAX_FACTOR, MAX_FACTOR]`.
    ///
    /// [`MAX_FACTOR`]: crate::MAX_FACTOR
    pub fn validate(speed: f32, pitch: f32) -> Result<()> {
        check_factor("speed", speed as f64)?;
        check_factor("pitch", pitch as f64)
    }

    /// Apply `speed` (>1 shortens, pitch preserved) then `pitch` (frequency
    /// multiplier, duration preserved).
    ///
    /// Factors are checked with [`PostProcessor::validate`] and `sample_rate`
    /// must be positive; validation happens before any transform. With both
    /// factors at unity the input is returned unchanged.
    pub fn process(&self, samples: &[f32], sample_rate: u32, speed: f32, pitch: f32) -> Result<Vec<f32>> {
        Self::validate(speed, pitch)?;
        check_positive("sample_rate", sample_rate as f64)?;

        let mut audio = if is_unity(speed) {
            samples.to_vec()
        } else {
            self.vocoder.stretch(samples, 1.0 / speed as f64)?
        };

        if !is_unity(pitch) {
            let semitones = pitch_to_semitones(pitch as f64);
            audio = pitch_shift(&self.vocoder, &audio, semitones)?;
        }

        tracing::trace!(
            sample_rate,
            speed,
            pitch,
            input = samples.len(),
            output = audio.len(),
            "post-processed"
        );
        Ok(audio)
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new(FftSize::default())
    }
}

/// One-shot [`PostProcessor::process`] with the default FFT size.
pub fn process(samples: &[f32], sample_rate: u32, speed: f32, pitch: f32) -> Result<Vec<f32>> {
    PostProcessor::default().process(samples, sample_rate, speed, pitch)
}
