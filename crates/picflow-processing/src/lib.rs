//! Image compression for the picflow pipeline.
//!
//! The compression engine runs an iterative quality/scale budget search per
//! requested size against an [`ImageManipulator`] collaborator, measuring
//! each attempt through an [`ArtifactStore`]. The [`LocalImageBackend`]
//! implements both (plus dimension probing) with the `image` and `mozjpeg`
//! crates.

pub mod engine;
pub mod ladder;
pub mod local;
pub mod ops;
pub mod traits;

pub use engine::CompressionEngine;
pub use local::LocalImageBackend;
pub use ops::{EncodeOptions, Operation};
pub use traits::{ArtifactStore, DimensionProber, ImageManipulator};
