//! The fixed quality/scale search ladder.
//!
//! The ladder is a closed, ordered sequence; the first attempt that lands
//! within budget wins and no further refinement happens. Planning is pure:
//! each attempt is derived from the profile, the source dimensions, and the
//! previous attempt's output dimensions, so every rung can be tested
//! without touching a codec.

use picflow_core::{Dimensions, SizeProfile};

use crate::ops::{self, Operation};

/// Quality steps tried after the base attempt exceeds its budget.
pub const QUALITY_STEPS: [f32; 6] = [0.85, 0.80, 0.75, 0.70, 0.65, 0.60];

/// Downscale factors tried after the quality steps are exhausted. Each
/// factor compounds on the previous attempt's dimensions, not the source's.
pub const SCALE_STEPS: [f32; 5] = [0.9, 0.8, 0.7, 0.6, 0.5];

/// Quality held while walking the scale steps.
pub const SCALE_STEP_QUALITY: f32 = 0.6;

/// Worst-case manipulator invocations per size.
pub const MAX_ATTEMPTS: usize = 1 + QUALITY_STEPS.len() + SCALE_STEPS.len();

/// One rung of the search ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LadderStep {
    /// First attempt at the profile's base quality.
    Initial,
    /// Same geometry, reduced quality.
    Quality(f32),
    /// Downscale the previous attempt by this factor at
    /// [`SCALE_STEP_QUALITY`].
    Scale(f32),
}

/// The full ordered ladder for one size.
pub fn steps() -> impl Iterator<Item = LadderStep> {
    std::iter::once(LadderStep::Initial)
        .chain(QUALITY_STEPS.iter().copied().map(LadderStep::Quality))
        .chain(SCALE_STEPS.iter().copied().map(LadderStep::Scale))
}

/// Operations and encode quality for one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptPlan {
    pub operations: Vec<Operation>,
    pub quality: f32,
}

/// Pure reducer from ladder step to attempt plan.
///
/// `previous` is the output dimensions of the last attempt; scale steps
/// shrink from there, quality steps re-run the initial geometry.
pub fn plan_attempt(
    profile: &SizeProfile,
    source: Dimensions,
    previous: Option<Dimensions>,
    step: LadderStep,
) -> AttemptPlan {
    match step {
        LadderStep::Initial => AttemptPlan {
            operations: ops::initial_operations(profile, source),
            quality: profile.quality,
        },
        LadderStep::Quality(quality) => AttemptPlan {
            operations: ops::initial_operations(profile, source),
            quality,
        },
        LadderStep::Scale(factor) => {
            let base = previous.unwrap_or(source);
            let target = ops::scaled_dimensions(base, factor);
            AttemptPlan {
                operations: ops::downscale_operations(profile, source, target),
                quality: SCALE_STEP_QUALITY,
            }
        }
    }
}
