//! Error types for cantus-export

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid audio data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;

impl From<hound::Error> for ExportError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => ExportError::Io(io),
            other => ExportError::Encoding(other.to_string()),
        }
    }
}
