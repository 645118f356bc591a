//! Artifact persistence.

use crate::error::{ExportError, Result};
use crate::naming::UniqueNamer;
use crate::wav::{encode_wav_mono, BitDepth, WavConfig};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

/// Where a written artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRef {
    pub path: PathBuf,
    pub filename: String,
}

/// Persists processed audio and hands back a reference to it.
pub trait ArtifactWriter: Send + Sync {
    fn write(&self, samples: &[f32], sample_rate: u32) -> Result<ArtifactRef>;
}

/// How many fresh names to try before giving up on a crowded directory.
const MAX_NAME_ATTEMPTS: usize = 16;

/// Writes mono WAV files into one directory, never overwriting.
#[derive(Debug)]
pub struct WavArtifactWriter {
    output_dir: PathBuf,
    bit_depth: BitDepth,
    namer: UniqueNamer,
}

impl WavArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            bit_depth: BitDepth::default(),
            namer: UniqueNamer::default(),
        }
    }

    pub fn with_bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    pub fn with_namer(mut self, namer: UniqueNamer) -> Self {
        self.namer = namer;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn create_unique(&self) -> Result<(fs::File, PathBuf, String)> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = self.namer.next_name();
            let path = self.output_dir.join(&filename);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((file, path, filename)),
                // Left over from an earlier process in the same second.
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(ExportError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!(
                "no free artifact name in {} after {} attempts",
                self.output_dir.display(),
                MAX_NAME_ATTEMPTS
            ),
        )))
    }
}

impl ArtifactWriter for WavArtifactWriter {
    fn write(&self, samples: &[f32], sample_rate: u32) -> Result<ArtifactRef> {
        fs::create_dir_all(&self.output_dir)?;
        let (file, path, filename) = self.create_unique()?;

        let config = WavConfig::mono(sample_rate, self.bit_depth);
        if let Err(e) = encode_wav_mono(BufWriter::new(file), samples, &config) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        tracing::debug!(path = %path.display(), samples = samples.len(), sample_rate, "artifact written");
        Ok(ArtifactRef { path, filename })
    }
}
