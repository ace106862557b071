//! Strategies that let plants and loops vary saturation handling or inject
//! feed-forward without touching the step algorithm.

use nalgebra::SVector;
use tracing::error;

use crate::error::{ControlError, Result};

/// Plant-side validation of a command before it is applied.
pub trait InputCheck<const NU: usize> {
    /// Returns an error if `u` may not be applied to the plant.
    ///
    /// # Errors
    ///
    /// Implementations return [`ControlError::SaturationViolation`] for
    /// commands outside the hardware range.
    fn check_u(
        &self,
        u: &SVector<f64, NU>,
        u_min: &SVector<f64, NU>,
        u_max: &SVector<f64, NU>,
    ) -> Result<()>;
}

/// Loop-side saturation of a freshly computed command.
pub trait InputCap<const NU: usize> {
    /// Limits `u` in place so the plant can accept it.
    fn cap_u(&self, u: &mut SVector<f64, NU>, u_min: &SVector<f64, NU>, u_max: &SVector<f64, NU>);
}

/// Feed-forward term computed from the current estimate and reference.
pub trait FeedForward<const NX: usize, const NU: usize> {
    fn feed_forward(&self, x_hat: &SVector<f64, NX>, r: &SVector<f64, NX>) -> SVector<f64, NU>;
}

/// Rejects any component outside `[U_min, U_max]`. NaN is always rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardwareRangeCheck;

impl<const NU: usize> InputCheck<NU> for HardwareRangeCheck {
    fn check_u(
        &self,
        u: &SVector<f64, NU>,
        u_min: &SVector<f64, NU>,
        u_max: &SVector<f64, NU>,
    ) -> Result<()> {
        for index in 0..NU {
            let (value, min, max) = (u[index], u_min[index], u_max[index]);
            if !(min..=max).contains(&value) {
                error!(index, value, min, max, "command outside hardware range");
                return Err(ControlError::saturation_violation(index, value, min, max));
            }
        }
        Ok(())
    }
}

/// Independent per-component saturation; no joint or ellipsoidal projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentwiseCap;

impl<const NU: usize> InputCap<NU> for ComponentwiseCap {
    fn cap_u(&self, u: &mut SVector<f64, NU>, u_min: &SVector<f64, NU>, u_max: &SVector<f64, NU>) {
        for index in 0..NU {
            if u[index] > u_max[index] {
                u[index] = u_max[index];
            } else if u[index] < u_min[index] {
                u[index] = u_min[index];
            }
        }
    }
}

/// Always produces a zero feed-forward command.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroFeedForward;

impl<const NX: usize, const NU: usize> FeedForward<NX, NU> for ZeroFeedForward {
    fn feed_forward(&self, _x_hat: &SVector<f64, NX>, _r: &SVector<f64, NX>) -> SVector<f64, NU> {
        SVector::zeros()
    }
}
