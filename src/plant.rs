use nalgebra::{SMatrix, SVector};
use tracing::trace;

use crate::error::{ControlError, Result};
use crate::hooks::{HardwareRangeCheck, InputCheck};
use crate::schedule::Schedule;

/// An immutable discrete-time linear plant model.
///
/// The model describes one step of the plant dynamics:
///
/// x(k+1) = A x(k) + B u(k)
/// y(k)   = C x(k) + D u(k)
///
/// together with the hardware range `[U_min, U_max]` of every input.
///
/// # Type Parameters
///
/// * `NX` - Number of states
/// * `NU` - Number of inputs (actuators)
/// * `NY` - Number of outputs (sensors)
///
/// The dimensions of all six matrices follow from these parameters, so an
/// inconsistent model cannot be constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantModel<const NX: usize, const NU: usize, const NY: usize> {
    a: SMatrix<f64, NX, NX>,
    b: SMatrix<f64, NX, NU>,
    c: SMatrix<f64, NY, NX>,
    d: SMatrix<f64, NY, NU>,
    u_min: SVector<f64, NU>,
    u_max: SVector<f64, NU>,
}

impl<const NX: usize, const NU: usize, const NY: usize> PlantModel<NX, NU, NY> {
    /// Creates a plant model from its six matrices.
    ///
    /// # Arguments
    ///
    /// * `a` - State transition matrix (NX × NX)
    /// * `b` - Input matrix (NX × NU)
    /// * `c` - Output matrix (NY × NX)
    /// * `d` - Feedthrough matrix (NY × NU)
    /// * `u_min` - Lower hardware bound of every input
    /// * `u_max` - Upper hardware bound of every input
    ///
    /// # Example
    ///
    /// ```
    /// use nalgebra::{Matrix1, Matrix1x2, Matrix2, Matrix2x1, Vector1};
    /// use state_feedback::PlantModel;
    ///
    /// let model = PlantModel::<2, 1, 1>::new(
    ///     Matrix2::new(1.0, 0.0084, 0.0, 0.7066),
    ///     Matrix2x1::new(0.00019, 0.0353),
    ///     Matrix1x2::new(1.0, 0.0),
    ///     Matrix1::new(0.0),
    ///     Vector1::new(-12.0),
    ///     Vector1::new(12.0),
    /// );
    /// assert_eq!(model.u_max()[0], 12.0);
    /// ```
    pub fn new(
        a: SMatrix<f64, NX, NX>,
        b: SMatrix<f64, NX, NU>,
        c: SMatrix<f64, NY, NX>,
        d: SMatrix<f64, NY, NU>,
        u_min: SVector<f64, NU>,
        u_max: SVector<f64, NU>,
    ) -> Self {
        Self {
            a,
            b,
            c,
            d,
            u_min,
            u_max,
        }
    }

    /// Creates a plant model from row-major element lists.
    ///
    /// This is the runtime counterpart of [`PlantModel::new`] for data whose
    /// shape is not known to the compiler, such as gain files.
    ///
    /// # Errors
    ///
    /// * [`ControlError::DimensionMismatch`] if any list has the wrong length
    /// * [`ControlError::InvalidBounds`] if some `u_min[i] > u_max[i]`
    pub fn from_row_slices(
        a: &[f64],
        b: &[f64],
        c: &[f64],
        d: &[f64],
        u_min: &[f64],
        u_max: &[f64],
    ) -> Result<Self> {
        let model = Self::new(
            matrix_from_row_slice("A", a)?,
            matrix_from_row_slice("B", b)?,
            matrix_from_row_slice("C", c)?,
            matrix_from_row_slice("D", d)?,
            matrix_from_row_slice("U_min", u_min)?,
            matrix_from_row_slice("U_max", u_max)?,
        );

        for index in 0..NU {
            let (min, max) = (model.u_min[index], model.u_max[index]);
            if min > max {
                return Err(ControlError::InvalidBounds { index, min, max });
            }
        }

        Ok(model)
    }

    pub fn a(&self) -> &SMatrix<f64, NX, NX> {
        &self.a
    }

    pub fn b(&self) -> &SMatrix<f64, NX, NU> {
        &self.b
    }

    pub fn c(&self) -> &SMatrix<f64, NY, NX> {
        &self.c
    }

    pub fn d(&self) -> &SMatrix<f64, NY, NU> {
        &self.d
    }

    pub fn u_min(&self) -> &SVector<f64, NU> {
        &self.u_min
    }

    pub fn u_max(&self) -> &SVector<f64, NU> {
        &self.u_max
    }
}

/// Builds a statically sized matrix from a row-major slice, checking its length.
pub(crate) fn matrix_from_row_slice<const R: usize, const C: usize>(
    name: &'static str,
    data: &[f64],
) -> Result<SMatrix<f64, R, C>> {
    if data.len() != R * C {
        return Err(ControlError::dimension_mismatch(name, R * C, data.len()));
    }
    Ok(SMatrix::from_row_slice(data))
}

/// The simulated state of a (possibly gain-scheduled) plant.
///
/// A `PlantState` owns a schedule of [`PlantModel`]s and the plant's state
/// `x`, output `y` and applied input `u`. Callers write `u` and call
/// [`PlantState::update`] once per time step.
///
/// Before applying `u`, the plant validates it against the active model's
/// hardware range using the `H` check. Out-of-range commands are treated as
/// controller bugs and reported as errors instead of being clamped.
#[derive(Debug, Clone)]
pub struct PlantState<const NX: usize, const NU: usize, const NY: usize, H = HardwareRangeCheck> {
    models: Schedule<PlantModel<NX, NU, NY>>,
    check: H,
    /// Plant state vector
    pub x: SVector<f64, NX>,
    /// Plant output vector (what the sensors read)
    pub y: SVector<f64, NY>,
    /// Input applied on the next update
    pub u: SVector<f64, NU>,
}

impl<const NX: usize, const NU: usize, const NY: usize> PlantState<NX, NU, NY> {
    /// Creates a plant from a schedule of models with all vectors zeroed.
    pub fn new(models: Schedule<PlantModel<NX, NU, NY>>) -> Self {
        Self::with_check(models, HardwareRangeCheck)
    }

    /// Creates a plant with a single model.
    pub fn from_model(model: PlantModel<NX, NU, NY>) -> Self {
        Self::new(Schedule::new(model))
    }
}

impl<const NX: usize, const NU: usize, const NY: usize, H: InputCheck<NU>>
    PlantState<NX, NU, NY, H>
{
    /// Creates a plant that validates inputs with a custom check.
    pub fn with_check(models: Schedule<PlantModel<NX, NU, NY>>, check: H) -> Self {
        Self {
            models,
            check,
            x: SVector::zeros(),
            y: SVector::zeros(),
            u: SVector::zeros(),
        }
    }

    /// The active plant model.
    pub fn model(&self) -> &PlantModel<NX, NU, NY> {
        self.models.active()
    }

    pub fn models(&self) -> &Schedule<PlantModel<NX, NU, NY>> {
        &self.models
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn active_index(&self) -> usize {
        self.models.active_index()
    }

    /// Selects the active model, clamping out-of-range indices.
    ///
    /// The state vectors are left untouched; only the next update sees the
    /// new matrices.
    pub fn set_active_index(&mut self, index: usize) {
        self.models.set_active_index(index);
    }

    /// Zeroes `x`, `y` and `u`.
    pub fn reset(&mut self) {
        self.x.fill(0.0);
        self.y.fill(0.0);
        self.u.fill(0.0);
    }

    /// Validates `u` against the active model's hardware range.
    ///
    /// # Errors
    ///
    /// Returns whatever the plant's input check reports, by default
    /// [`ControlError::SaturationViolation`].
    pub fn check_u(&self) -> Result<()> {
        let model = self.model();
        self.check.check_u(&self.u, model.u_min(), model.u_max())
    }

    /// Advances the plant one time step with the current input.
    ///
    /// Computes
    ///
    /// x' = A x + B u
    /// y  = C x' + D u
    ///
    /// after checking that `u` lies inside the hardware range.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::SaturationViolation`] if `u` is outside
    /// `[U_min, U_max]`. In that case `x` and `y` are left unchanged.
    pub fn update(&mut self) -> Result<()> {
        self.check_u()?;

        let model = self.models.active();
        self.x = model.a() * self.x + model.b() * self.u;
        self.y = model.c() * self.x + model.d() * self.u;

        trace!(model = self.models.active_index(), "plant stepped");
        Ok(())
    }
}
