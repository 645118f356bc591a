//! Tolerance constants for audio assertions.

/// Floating point rounding errors. Use where post-processing is skipped.
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Audio perceptual tolerance (~-60dB, inaudible differences).
pub const PERCEPTUAL_EPSILON: f32 = 0.001;

/// Silence threshold (~-80dB).
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// 16-bit quantization step size, for reading back `Int16` artifacts.
pub const INT16_EPSILON: f32 = 1.0 / 32768.0;

/// Allowed relative deviation of a stretched length from `len / speed`.
pub const LENGTH_TOLERANCE: f64 = 0.01;
