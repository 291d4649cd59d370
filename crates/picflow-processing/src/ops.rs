//! Geometric operations and the pure planners that build them.

use picflow_core::{Dimensions, SizeProfile};

/// A single geometric operation. The manipulator applies operations in the
/// order given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Crop {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    Resize {
        width: u32,
        height: u32,
    },
}

/// Re-encode parameters for one manipulator invocation. Output format is
/// always JPEG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeOptions {
    /// Quality in (0, 1].
    pub quality: f32,
}

/// Center square crop over the source frame. Offsets round half away from
/// zero for odd-sized frames.
pub fn center_square_crop(width: u32, height: u32) -> Operation {
    let min_dim = width.min(height);
    Operation::Crop {
        x: (f64::from(width - min_dim) / 2.0).round() as u32,
        y: (f64::from(height - min_dim) / 2.0).round() as u32,
        width: min_dim,
        height: min_dim,
    }
}

/// Proportionally scaled dimensions, rounded half away from zero.
pub fn scaled_dimensions(dims: Dimensions, scale: f32) -> Dimensions {
    Dimensions {
        width: (f64::from(dims.width) * f64::from(scale)).round() as u32,
        height: (f64::from(dims.height) * f64::from(scale)).round() as u32,
    }
}

/// Geometric operations for the first attempt at a profile: nothing for a
/// full-frame size, a proportional resize for a scaled size, a center
/// square crop plus resize for a fixed-output size.
pub fn initial_operations(profile: &SizeProfile, source: Dimensions) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(2);
    if let Some(fixed) = profile.fixed {
        ops.push(center_square_crop(source.width, source.height));
        ops.push(Operation::Resize {
            width: fixed.width,
            height: fixed.height,
        });
    } else if let Some(scale) = profile.scale {
        let target = scaled_dimensions(source, scale);
        ops.push(Operation::Resize {
            width: target.width,
            height: target.height,
        });
    }
    ops
}

/// Operations for a downscale retry: the profile's crop (if any) followed
/// by a resize to `target`.
pub fn downscale_operations(
    profile: &SizeProfile,
    source: Dimensions,
    target: Dimensions,
) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(2);
    if profile.fixed.is_some() {
        ops.push(center_square_crop(source.width, source.height));
    }
    ops.push(Operation::Resize {
        width: target.width,
        height: target.height,
    });
    ops
}
