//! Phase Vocoder for Offline Time-Stretching
//!
//! ## Algorithm Overview
//!
//! 1. **Analysis**: pad by half a window, Hann-window every hop, forward FFT
//! 2. **Time resampling**: step through the frames at `1 / stretch_factor`,
//!    linearly interpolating magnitudes between neighbouring frames
//! 3. **Phase accumulation**: advance each bin by its expected phase plus the
//!    wrapped deviation measured between the two source frames
//! 4. **Synthesis**: conjugate-mirror, inverse FFT, windowed overlap-add,
//!    normalized by the summed squared window
//!
//! Output length is `round(input.len() * stretch_factor)`. Pitch is preserved.

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use super::types::FftSize;
use crate::error::{check_factor, Result};

/// Overlap-add normalization floor.
const WINDOW_SUM_EPSILON: f32 = 1e-8;

/// Offline phase vocoder.
///
/// Holds the window and FFT plans only; `stretch` keeps no state between
/// calls, so one instance can serve concurrent requests.
#[derive(Clone)]
pub struct PhaseVocoder {
    fft_size: usize,
    hop: usize,
    window: Vec<f32>,
    expected_phase_diff: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl PhaseVocoder {
    pub fn new(fft_size: FftSize) -> Self {
        let size = fft_size.size();
        let hop = fft_size.hop_size();
        let num_bins = size / 2 + 1;

        let expected_phase_diff: Vec<f32> = (0..num_bins)
            .map(|k| 2.0 * PI * (k as f32) * (hop as f32) / (size as f32))
            .collect();

        let mut planner = FftPlanner::<f32>::new();
        Self {
            fft_size: size,
            hop,
            window: Self::create_hann_window(size),
            expected_phase_diff,
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        }
    }

    /// Periodic Hann window.
    fn create_hann_window(size: usize) -> Vec<f32> {
        (0..size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
            .collect()
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop
    }

    /// Stretch `input` in time by `stretch_factor` (>1 = longer/slower,
    /// <1 = shorter/faster).
    ///
    /// `stretch_factor` must be finite, positive and within
    /// `[1 / MAX_FACTOR, MAX_FACTOR]`.
    pub fn stretch(&self, input: &[f32], stretch_factor: f64) -> Result<Vec<f32>> {
        check_factor("stretch_factor", stretch_factor)?;
        let target_len = (input.len() as f64 * stretch_factor).round() as usize;
        if input.is_empty() || target_len == 0 {
            return Ok(vec![0.0; target_len]);
        }

        let spectra = self.analyze(input);
        let frames = self.resample_frames(&spectra, stretch_factor);
        let mut output = self.synthesize(&frames);

        // Drop the centering pad, then fix the length.
        let start = (self.fft_size / 2).min(output.len());
        output.drain(..start);
        output.resize(target_len, 0.0);
        Ok(output)
    }

    /// Centered STFT, one half spectrum per frame.
    fn analyze(&self, input: &[f32]) -> Vec<Vec<Complex32>> {
        let half = self.fft_size / 2;
        let num_bins = half + 1;

        let mut padded = vec![0.0f32; half];
        padded.extend_from_slice(input);
        padded.resize(padded.len() + half + self.hop, 0.0);

        let num_frames = 1 + (padded.len() - self.fft_size) / self.hop;
        let mut buffer = vec![Complex32::new(0.0, 0.0); self.fft_size];
        let mut spectra = Vec::with_capacity(num_frames);

        for frame in 0..num_frames {
            let offset = frame * self.hop;
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex32::new(padded[offset + i] * self.window[i], 0.0);
            }
            self.forward.process(&mut buffer);
            spectra.push(buffer[..num_bins].to_vec());
        }

        spectra
    }

    /// Walk the analysis frames at `1 / stretch_factor` frames per output frame.
    fn resample_frames(&self, spectra: &[Vec<Complex32>], stretch_factor: f64) -> Vec<Vec<Complex32>> {
        let num_bins = self.fft_size / 2 + 1;
        let rate = 1.0 / stretch_factor;
        let num_frames = spectra.len();
        let num_steps = (num_frames as f64 / rate).ceil() as usize;
        let silent = vec![Complex32::new(0.0, 0.0); num_bins];

        let mut phase_accumulator: Vec<f32> = spectra[0].iter().map(|c| c.arg()).collect();
        let mut frames = Vec::with_capacity(num_steps);

        for step in 0..num_steps {
            let t = step as f64 * rate;
            let left = (t.floor() as usize).min(num_frames - 1);
            let alpha = (t - left as f64) as f32;
            let current = &spectra[left];
            let next = spectra.get(left + 1).unwrap_or(&silent);

            let mut frame = Vec::with_capacity(num_bins);
            for k in 0..num_bins {
                let magnitude = (1.0 - alpha) * current[k].norm() + alpha * next[k].norm();
                frame.push(Complex32::from_polar(magnitude, phase_accumulator[k]));

                let expected = self.expected_phase_diff[k];
                let deviation = Self::wrap_phase(next[k].arg() - current[k].arg() - expected);
                phase_accumulator[k] = Self::wrap_phase(phase_accumulator[k] + expected + deviation);
            }
            frames.push(frame);
        }

        frames
    }

    /// Inverse STFT by windowed overlap-add.
    fn synthesize(&self, frames: &[Vec<Complex32>]) -> Vec<f32> {
        let num_bins = self.fft_size / 2 + 1;
        let len = frames.len().saturating_sub(1) * self.hop + self.fft_size;
        let mut output = vec![0.0f32; len];
        let mut window_sum = vec![0.0f32; len];
        let mut buffer = vec![Complex32::new(0.0, 0.0); self.fft_size];
        let scale = 1.0 / self.fft_size as f32;

        for (index, frame) in frames.iter().enumerate() {
            buffer[..num_bins].copy_from_slice(frame);
            // Mirror for real-valued output (conjugate symmetry)
            for i in 1..num_bins - 1 {
                buffer[self.fft_size - i] = frame[i].conj();
            }
            self.inverse.process(&mut buffer);

            let offset = index * self.hop;
            for i in 0..self.fft_size {
                let w = self.window[i];
                output[offset + i] += buffer[i].re * scale * w;
                window_sum[offset + i] += w * w;
            }
        }

        for (sample, &norm) in output.iter_mut().zip(&window_sum) {
            if norm > WINDOW_SUM_EPSILON {
                *sample /= norm;
            }
        }
        output
    }

    /// Wrap phase to [-PI, PI)
    #[inline]
    fn wrap_phase(phase: f32) -> f32 {
        (phase + PI).rem_euclid(2.0 * PI) - PI
    }
}

impl std::fmt::Debug for PhaseVocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseVocoder")
            .field("fft_size", &self.fft_size)
            .field("hop", &self.hop)
            .finish()
    }
}
