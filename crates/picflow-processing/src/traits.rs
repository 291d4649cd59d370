//! Collaborator traits for the compression pipeline.
//!
//! The engine only talks to these seams; swapping the backing
//! implementation (local codec, remote service, test double) never touches
//! the search algorithm.

use async_trait::async_trait;
use bytes::Bytes;

use picflow_core::{ArtifactUri, Dimensions, ImageArtifact, PipelineError, SourceUri};

use crate::ops::{EncodeOptions, Operation};

/// Applies ordered geometric operations to a source image and re-encodes it.
#[async_trait]
pub trait ImageManipulator: Send + Sync {
    /// Apply `operations` in order and re-encode as JPEG at
    /// `encode.quality`, returning a handle to the new artifact.
    async fn manipulate(
        &self,
        source: &SourceUri,
        operations: &[Operation],
        encode: EncodeOptions,
    ) -> Result<ImageArtifact, PipelineError>;
}

/// Read access to manipulation artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Byte length of an artifact.
    async fn byte_size(&self, uri: &ArtifactUri) -> Result<u64, PipelineError>;

    /// Full artifact contents.
    async fn read(&self, uri: &ArtifactUri) -> Result<Bytes, PipelineError>;
}

/// Probes the pixel dimensions of a source image.
#[async_trait]
pub trait DimensionProber: Send + Sync {
    /// Width and height of the source, or a dimension error if they cannot
    /// be determined.
    async fn dimensions_of(&self, source: &SourceUri) -> Result<Dimensions, PipelineError>;
}
