//! Mono resampling by arbitrary (non-integer) ratios using rubato.

use crate::error::{check_factor, DspError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

const SINC_LEN: usize = 128;

/// Below this many samples the sinc resampler is not worth setting up.
const MIN_SINC_INPUT: usize = 32;

/// Resample `input` by `ratio` (output rate / input rate).
///
/// The sinc filter delay is compensated, so output sample `i` lines up with
/// input position `i / ratio`. Output length is `round(len * ratio)`.
/// `ratio` must lie within `[1 / MAX_FACTOR, MAX_FACTOR]`.
pub fn resample(input: &[f32], ratio: f64) -> Result<Vec<f32>> {
    check_factor("ratio", ratio)?;
    if input.is_empty() || (ratio - 1.0).abs() <= f64::EPSILON {
        return Ok(input.to_vec());
    }

    let target_len = ((input.len() as f64) * ratio).round().max(1.0) as usize;
    if input.len() < MIN_SINC_INPUT {
        return Ok(resample_linear(input, ratio, target_len));
    }

    let params = SincInterpolationParameters {
        sinc_len: SINC_LEN,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };

    // Flush the filter tail with trailing silence.
    let mut padded = input.to_vec();
    padded.resize(input.len() + SINC_LEN, 0.0);

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, padded.len(), 1)
        .map_err(DspError::from)?;

    let mut output = match resampler.process(&[padded], None) {
        Ok(mut channels) => channels.pop().unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "sinc resampling failed, using linear interpolation");
            return Ok(resample_linear(input, ratio, target_len));
        }
    };

    let delay = ((SINC_LEN / 2) as f64 * ratio).round() as usize;
    output.drain(..delay.min(output.len()));
    output.resize(target_len, 0.0);
    Ok(output)
}

fn resample_linear(input: &[f32], ratio: f64, target_len: usize) -> Vec<f32> {
    let last = input.len() - 1;
    (0..target_len)
        .map(|i| {
            let pos = i as f64 / ratio;
            let left = (pos.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let frac = (pos - left as f64).clamp(0.0, 1.0) as f32;
            input[left] * (1.0 - frac) + input[right] * frac
        })
        .collect()
}
