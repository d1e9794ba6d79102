//! Angle conversion for gates.
//!
//! Every rotation in this crate is stored as an exponent in *half turns*:
//! an angle of `t` half turns is `t · π` radians. Gates are usually
//! specified in one of four ways, and [`chosen_angle_to_half_turns`]
//! resolves exactly one of them:
//!
//! | Field | Conversion |
//! |-------|------------|
//! | `half_turns` | as is |
//! | `rads` | `rads / π` |
//! | `degs` | `degs / 180` |
//! | `duration` | `2 · duration / π` |
//!
//! A duration `d` describes evolution `exp(-i d H)` under the gate's
//! generator, which for the fermionic two-qubit gates corresponds to an
//! exponent of `2d/π`.

use std::f64::consts::PI;

use crate::error::{IrError, IrResult};

/// A possibly partial angle specification.
///
/// At most one field may be set; see [`chosen_angle_to_half_turns`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngleSpec {
    /// Number of half turns.
    pub half_turns: Option<f64>,
    /// Radians.
    pub rads: Option<f64>,
    /// Degrees.
    pub degs: Option<f64>,
    /// Exponent as a duration of time.
    pub duration: Option<f64>,
}

impl AngleSpec {
    /// Empty specification; resolves to the default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the half turns.
    #[must_use]
    pub fn half_turns(mut self, half_turns: f64) -> Self {
        self.half_turns = Some(half_turns);
        self
    }

    /// Set the radians.
    #[must_use]
    pub fn rads(mut self, rads: f64) -> Self {
        self.rads = Some(rads);
        self
    }

    /// Set the degrees.
    #[must_use]
    pub fn degs(mut self, degs: f64) -> Self {
        self.degs = Some(degs);
        self
    }

    /// Set the duration.
    #[must_use]
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Resolve to half turns, see [`chosen_angle_to_half_turns`].
    pub fn to_half_turns(&self, default: f64) -> IrResult<f64> {
        chosen_angle_to_half_turns(self, default)
    }

    fn n_specified(&self) -> usize {
        [self.half_turns, self.rads, self.degs, self.duration]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }
}

/// Returns a half-turns value based on the given specification.
///
/// At most one of `half_turns`, `rads`, `degs` or `duration` may be set. If
/// none is set, `default` is returned.
///
/// # Errors
///
/// [`IrError::RedundantAngle`] if more than one field is set.
pub fn chosen_angle_to_half_turns(spec: &AngleSpec, default: f64) -> IrResult<f64> {
    if spec.n_specified() > 1 {
        return Err(IrError::RedundantAngle);
    }

    let half_turns = match *spec {
        AngleSpec {
            duration: Some(d), ..
        } => half_turns_from_duration(d),
        AngleSpec {
            half_turns: Some(t),
            ..
        } => t,
        AngleSpec { rads: Some(r), .. } => half_turns_from_rads(r),
        AngleSpec { degs: Some(g), .. } => half_turns_from_degs(g),
        _ => default,
    };
    Ok(half_turns)
}

/// Convert radians to half turns.
#[inline]
pub fn half_turns_from_rads(rads: f64) -> f64 {
    rads / PI
}

/// Convert degrees to half turns.
#[inline]
pub fn half_turns_from_degs(degs: f64) -> f64 {
    degs / 180.0
}

/// Convert an evolution duration to half turns.
#[inline]
pub fn half_turns_from_duration(duration: f64) -> f64 {
    2.0 * duration / PI
}
