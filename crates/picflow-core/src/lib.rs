//! Core types for the picflow image variant pipeline.
//!
//! This crate holds the domain model shared by the processing and client
//! crates: named variant sizes and their compression profiles, the artifact
//! and variant types that flow through the pipeline, and the unified error
//! type. It performs no I/O.

pub mod constants;
pub mod error;
pub mod models;
pub mod sizes;

pub use error::PipelineError;
pub use models::{
    ArtifactUri, CompressedVariant, ImageArtifact, PipelineResult, SourceImage, SourceUri,
};
pub use sizes::{Dimensions, ParseSizeError, SizeName, SizeProfile};
