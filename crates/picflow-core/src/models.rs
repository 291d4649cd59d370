//! Pipeline data model.
//!
//! Artifacts are referenced by opaque URI handles: the caller hands the
//! pipeline a `SourceUri`, the manipulator returns `ArtifactUri` handles
//! owned by its artifact store, and variants carry those handles to the
//! uploader, which reads each exactly once.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sizes::SizeName;

/// Opaque handle to a caller-supplied source image (a path or URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceUri(String);

impl SourceUri {
    pub fn new(uri: impl Into<String>) -> Self {
        SourceUri(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceUri {
    fn from(uri: &str) -> Self {
        SourceUri(uri.to_string())
    }
}

impl From<String> for SourceUri {
    fn from(uri: String) -> Self {
        SourceUri(uri)
    }
}

/// Opaque handle to a compressed artifact held by an artifact store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactUri(String);

impl ArtifactUri {
    pub fn new(uri: impl Into<String>) -> Self {
        ArtifactUri(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A source image with probed pixel dimensions.
///
/// Immutable for the duration of one pipeline run; owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub uri: SourceUri,
    pub width: u32,
    pub height: u32,
}

/// Output of a single manipulator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    pub uri: ArtifactUri,
    pub width: u32,
    pub height: u32,
}

/// One compressed derivative of a source image at a named size.
///
/// Produced by the compression engine; the uploader reads its bytes once
/// and discards it. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedVariant {
    pub size: SizeName,
    pub uri: ArtifactUri,
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
}

/// Terminal artifact of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Origin-assigned image identifier.
    pub image_id: String,
    /// The requested sizes, in their original order.
    pub variants: Vec<SizeName>,
}
