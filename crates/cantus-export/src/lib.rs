//! Cantus export - persisting synthesized speech.
//!
//! - [`WavArtifactWriter`] - mono WAV files in an output directory
//! - [`UniqueNamer`] - `tts_<YYYYmmdd_HHMMSS>_<seq>.wav` names
//! - [`encode_wav_mono_memory`] - in-memory encoding for callers that stream bytes

mod error;
mod naming;
mod wav;
mod writer;

pub use error::{ExportError, Result};
pub use naming::{UniqueNamer, DEFAULT_PREFIX, TIMESTAMP_FORMAT};
pub use wav::{encode_wav_mono, encode_wav_mono_memory, float_to_i16, BitDepth, WavConfig};
pub use writer::{ArtifactRef, ArtifactWriter, WavArtifactWriter};
