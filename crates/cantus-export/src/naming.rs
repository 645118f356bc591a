//! Collision-free artifact names: `<prefix>_<YYYYmmdd_HHMMSS>_<seq>.<ext>`.

use chrono::Local;
use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_PREFIX: &str = "tts";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Second-granularity timestamp plus a monotonic sequence number, so two
/// artifacts created in the same second still get distinct names.
#[derive(Debug)]
pub struct UniqueNamer {
    prefix: String,
    extension: String,
    sequence: AtomicU64,
}

impl UniqueNamer {
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn next_name(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}_{}_{:06}.{}",
            self.prefix,
            Local::now().format(TIMESTAMP_FORMAT),
            seq,
            self.extension
        )
    }
}

impl Default for UniqueNamer {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, "wav")
    }
}
