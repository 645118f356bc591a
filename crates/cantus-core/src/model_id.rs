//! Model identifiers.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Placeholder for identifier segments the catalog did not provide.
pub const UNKNOWN_SEGMENT: &str = "unknown";

/// Opaque catalog key, structured as `<task-type>/<language>/<dataset>/<architecture>`.
///
/// Cheap to clone (shared string). Hashes and compares like the underlying `str`,
/// so maps keyed by `ModelId` can be queried with `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(Arc<str>);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Arc::from(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the `/`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Language segment (second), if present.
    pub fn language(&self) -> Option<&str> {
        self.segments().nth(1).filter(|s| !s.is_empty())
    }

    /// Parse the segments into a descriptor, filling gaps with [`UNKNOWN_SEGMENT`].
    pub fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::parse(self)
    }

    /// Directory name used for the local artifact cache (`/` is not path-safe).
    pub fn cache_dir_name(&self) -> String {
        self.0.replace('/', "--")
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for ModelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ModelId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ModelId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Parsed view of a [`ModelId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub model_id: ModelId,
    #[serde(rename = "type")]
    pub task_type: String,
    pub language: String,
    pub dataset: String,
    pub architecture: String,
    /// Number of segments actually present in the identifier.
    #[serde(skip)]
    pub segment_count: usize,
}

impl ModelDescriptor {
    pub fn parse(id: &ModelId) -> Self {
        let parts: Vec<&str> = id.segments().collect();
        let segment = |i: usize| {
            parts
                .get(i)
                .filter(|s| !s.is_empty())
                .map_or_else(|| UNKNOWN_SEGMENT.to_string(), |s| s.to_string())
        };

        Self {
            model_id: id.clone(),
            task_type: segment(0),
            language: segment(1),
            dataset: segment(2),
            architecture: segment(3),
            segment_count: parts.len(),
        }
    }

    /// True when at least task type, language and dataset are present.
    pub fn is_complete(&self) -> bool {
        self.segment_count >= 3
    }
}
