//! Duration-preserving pitch shift.
//!
//! Stretch by the frequency ratio, then resample back so the stretched signal
//! plays in the original duration at a shifted pitch.

use crate::error::{check_factor, Result};
use crate::resample::resample;
use crate::time_stretch::PhaseVocoder;

/// Pitch multiplier → semitones (`2.0` → `+12`, `0.5` → `-12`).
pub fn pitch_to_semitones(pitch: f64) -> f64 {
    12.0 * pitch.log2()
}

/// Semitones → frequency ratio.
pub fn semitones_to_ratio(semitones: f64) -> f64 {
    2f64.powf(semitones / 12.0)
}

/// Shift `samples` by `semitones` without changing their length.
pub fn pitch_shift(vocoder: &PhaseVocoder, samples: &[f32], semitones: f64) -> Result<Vec<f32>> {
    let ratio = semitones_to_ratio(semitones);
    check_factor("pitch_ratio", ratio)?;
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let stretched = vocoder.stretch(samples, ratio)?;
    let mut shifted = resample(&stretched, 1.0 / ratio)?;
    shifted.resize(samples.len(), 0.0);
    Ok(shifted)
}
