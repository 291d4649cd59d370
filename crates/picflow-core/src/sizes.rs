//! Variant sizes and their compression profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named variant sizes produced by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeName {
    Large,
    Medium,
    Small,
}

impl SizeName {
    /// All sizes, in the order a gallery upload requests them.
    pub const ALL: [SizeName; 3] = [SizeName::Large, SizeName::Medium, SizeName::Small];

    pub fn as_str(self) -> &'static str {
        match self {
            SizeName::Large => "large",
            SizeName::Medium => "medium",
            SizeName::Small => "small",
        }
    }

    /// Static compression profile for this size.
    pub fn profile(self) -> &'static SizeProfile {
        match self {
            SizeName::Large => &LARGE,
            SizeName::Medium => &MEDIUM,
            SizeName::Small => &SMALL,
        }
    }
}

impl fmt::Display for SizeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown size name: {0}")]
pub struct ParseSizeError(pub String);

impl FromStr for SizeName {
    type Err = ParseSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "large" => Ok(SizeName::Large),
            "medium" => Ok(SizeName::Medium),
            "small" => Ok(SizeName::Small),
            _ => Err(ParseSizeError(s.to_string())),
        }
    }
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Static compression configuration for one variant size.
///
/// `max_bytes` limits must match the server-side validation of the same
/// sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeProfile {
    /// Base JPEG encode quality in (0, 1].
    pub quality: f32,
    /// Proportional downscale applied to the source dimensions.
    pub scale: Option<f32>,
    /// Fixed output dimensions (square thumbnail).
    pub fixed: Option<Dimensions>,
    /// Byte budget the compressed variant must stay within.
    pub max_bytes: u64,
}

/// Full-frame variant: quality/downscale search only.
pub const LARGE: SizeProfile = SizeProfile {
    quality: 0.9,
    scale: None,
    fixed: None,
    max_bytes: 6 * 1024 * 1024,
};

/// Proportionally downscaled variant.
pub const MEDIUM: SizeProfile = SizeProfile {
    quality: 0.6,
    scale: Some(0.6),
    fixed: None,
    max_bytes: 2 * 1024 * 1024,
};

/// Center-cropped square thumbnail.
pub const SMALL: SizeProfile = SizeProfile {
    quality: 0.75,
    scale: None,
    fixed: Some(Dimensions {
        width: 256,
        height: 256,
    }),
    max_bytes: 512 * 1024,
};
