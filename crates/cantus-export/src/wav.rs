//! Mono WAV encoding using hound
//!
//! Supports 16-bit integer and 32-bit float output.

use crate::error::{ExportError, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};
use std::io::{Seek, Write};

/// Output sample format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitDepth {
    #[default]
    Int16,
    Float32,
}

impl BitDepth {
    /// Bits per sample.
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Float32 => 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavConfig {
    pub sample_rate: u32,
    pub bit_depth: BitDepth,
}

impl WavConfig {
    pub fn mono(sample_rate: u32, bit_depth: BitDepth) -> Self {
        Self {
            sample_rate,
            bit_depth,
        }
    }

    fn spec(&self) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bit_depth.bits(),
            sample_format: match self.bit_depth {
                BitDepth::Float32 => SampleFormat::Float,
                BitDepth::Int16 => SampleFormat::Int,
            },
        }
    }
}

/// Encode mono audio into any seekable sink.
pub fn encode_wav_mono<W: Write + Seek>(sink: W, samples: &[f32], config: &WavConfig) -> Result<()> {
    if config.sample_rate == 0 {
        return Err(ExportError::InvalidData("sample rate must be non-zero".into()));
    }

    let mut writer = WavWriter::new(sink, config.spec())?;
    match config.bit_depth {
        BitDepth::Int16 => {
            for &sample in samples {
                writer.write_sample(float_to_i16(sample))?;
            }
        }
        BitDepth::Float32 => {
            for &sample in samples {
                writer.write_sample(sample)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Encode mono audio to WAV in memory
pub fn encode_wav_mono_memory(samples: &[f32], config: &WavConfig) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    encode_wav_mono(std::io::Cursor::new(&mut buffer), samples, config)?;
    Ok(buffer)
}

/// Convert float sample (-1.0 to 1.0) to 16-bit integer, clipping out-of-range input.
#[inline]
pub fn float_to_i16(sample: f32) -> i16 {
    let clamped = if sample.is_finite() { sample.clamp(-1.0, 1.0) } else { 0.0 };
    (clamped * 32767.0) as i16
}
