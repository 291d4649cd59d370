//! Pipeline error types.
//!
//! All failure modes of the pipeline are unified under `PipelineError`.
//! Errors carry enough context to identify the offending size; none are
//! swallowed, and no local recovery (retry, fallback size) happens anywhere
//! in this workspace. Recovery policy belongs to the caller.

use thiserror::Error;

use crate::sizes::SizeName;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source dimensions could not be determined. Aborts before any
    /// compression work.
    #[error("failed to determine source dimensions: {0}")]
    Dimension(String),

    /// The iterative search exhausted every quality and scale step without
    /// meeting the size's byte budget.
    #[error("{size} variant cannot be compressed below {max_bytes} bytes")]
    BudgetExceeded { size: SizeName, max_bytes: u64 },

    /// The image manipulator itself failed (e.g. corrupt source).
    #[error("image manipulation failed: {0}")]
    Manipulation(String),

    /// The origin did not supply an upload URL for a requested size.
    #[error("no presigned upload URL for size {size}")]
    MissingPresignedUrl { size: SizeName },

    /// Object storage rejected the variant PUT.
    #[error("storage upload for {size} failed with status {status}")]
    StorageUpload { size: SizeName, status: u16 },

    /// The origin confirm call failed after all uploads succeeded. Leaves
    /// unconfirmed objects in storage; no rollback is attempted.
    #[error("upload confirmation failed: {0}")]
    Confirm(String),

    /// Origin API responded with a non-success status.
    #[error("origin request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure on any remote call.
    #[error("network error: {0}")]
    Network(String),
}

impl PipelineError {
    /// The variant size this error concerns, if it names one.
    pub fn size(&self) -> Option<SizeName> {
        match self {
            PipelineError::BudgetExceeded { size, .. }
            | PipelineError::MissingPresignedUrl { size }
            | PipelineError::StorageUpload { size, .. } => Some(*size),
            _ => None,
        }
    }
}
