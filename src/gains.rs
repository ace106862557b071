//! Gain files: the serialized form of offline-designed gain schedules.
//!
//! A gain file describes one scheduled loop as a list of
//! [`StateSpaceGains`] records, one per operating regime. Every matrix is
//! stored as a flat row-major list of numbers, so the file itself carries no
//! dimensions; they are supplied by the caller's const generics and checked
//! on conversion.

use std::fs;
use std::path::Path;

use nalgebra::SMatrix;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::controller::Controller;
use crate::error::{ControlError, Result};
use crate::feedback::FeedbackLoop;
use crate::plant::{matrix_from_row_slice, PlantModel, PlantState};
use crate::schedule::Schedule;

/// The matrices of one scheduled controller, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpaceGains {
    pub a: Vec<f64>,
    pub b: Vec<f64>,
    pub c: Vec<f64>,
    pub d: Vec<f64>,
    pub l: Vec<f64>,
    pub k: Vec<f64>,
    pub u_max: Vec<f64>,
    pub u_min: Vec<f64>,
}

impl StateSpaceGains {
    /// Converts the plant part of the record into a typed model.
    ///
    /// # Errors
    ///
    /// Fails with [`ControlError::DimensionMismatch`] or
    /// [`ControlError::InvalidBounds`] if the record does not describe an
    /// `NX`-state, `NU`-input, `NY`-output plant.
    pub fn plant_model<const NX: usize, const NU: usize, const NY: usize>(
        &self,
    ) -> Result<PlantModel<NX, NU, NY>> {
        PlantModel::from_row_slices(&self.a, &self.b, &self.c, &self.d, &self.u_min, &self.u_max)
    }

    /// Converts the whole record into a typed controller.
    ///
    /// # Errors
    ///
    /// Same as [`StateSpaceGains::plant_model`], plus dimension checks on
    /// `L` and `K`. Matrices are checked in `A, B, C, D, L, K` order.
    pub fn controller<const NX: usize, const NU: usize, const NY: usize>(
        &self,
    ) -> Result<Controller<NX, NU, NY>> {
        let plant = self.plant_model()?;
        let l = matrix_from_row_slice("L", &self.l)?;
        let k = matrix_from_row_slice("K", &self.k)?;
        Ok(Controller::new(l, k, plant))
    }

    /// Flattens a controller back into a record.
    pub fn from_controller<const NX: usize, const NU: usize, const NY: usize>(
        controller: &Controller<NX, NU, NY>,
    ) -> Self {
        Self {
            a: row_major(controller.a()),
            b: row_major(controller.b()),
            c: row_major(controller.c()),
            d: row_major(controller.d()),
            l: row_major(controller.l()),
            k: row_major(controller.k()),
            u_max: controller.u_max().iter().copied().collect(),
            u_min: controller.u_min().iter().copied().collect(),
        }
    }
}

fn row_major<const R: usize, const C: usize>(matrix: &SMatrix<f64, R, C>) -> Vec<f64> {
    // nalgebra stores column-major; transpose to walk rows
    matrix.transpose().iter().copied().collect()
}

/// A named, ordered list of gain records for one scheduled loop.
///
/// # Example
///
/// ```
/// use state_feedback::GainSchedule;
///
/// let schedule = GainSchedule::from_toml_str(
///     r#"
///     name = "Integrator"
///     dt = 0.01
///
///     [[gains]]
///     a = [1.0]
///     b = [1.0]
///     c = [1.0]
///     d = [0.0]
///     l = [0.0]
///     k = [1.0]
///     u_max = [1.0]
///     u_min = [-1.0]
///     "#,
/// )
/// .unwrap();
///
/// let feedback = schedule.build_loop::<1, 1, 1>().unwrap();
/// assert_eq!(feedback.controller_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainSchedule {
    /// Name of the mechanism the gains were designed for
    pub name: String,
    /// Control period the gains were discretized with, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<f64>,
    /// One record per operating regime, in schedule order
    pub gains: Vec<StateSpaceGains>,
}

impl GainSchedule {
    /// Flattens a controller schedule into a gain schedule.
    pub fn from_controllers<const NX: usize, const NU: usize, const NY: usize>(
        name: impl Into<String>,
        dt: Option<f64>,
        controllers: &Schedule<Controller<NX, NU, NY>>,
    ) -> Self {
        Self {
            name: name.into(),
            dt,
            gains: controllers.iter().map(StateSpaceGains::from_controller).collect(),
        }
    }

    /// Parses a gain schedule from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Parse`] for malformed TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a gain schedule from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Io`] if the file cannot be read and
    /// [`ControlError::Parse`] if it is not a valid gain file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let schedule = Self::from_toml_str(&fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            name = %schedule.name,
            regimes = schedule.gains.len(),
            "loaded gain schedule"
        );
        Ok(schedule)
    }

    /// Renders the schedule as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Serialize`] if the schedule cannot be encoded.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Writes the schedule to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Serialize`] or [`ControlError::Io`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Builds the typed controller schedule.
    ///
    /// # Errors
    ///
    /// [`ControlError::EmptySchedule`] if there are no records, or the first
    /// conversion error encountered.
    pub fn controllers<const NX: usize, const NU: usize, const NY: usize>(
        &self,
    ) -> Result<Schedule<Controller<NX, NU, NY>>> {
        let controllers = self
            .gains
            .iter()
            .map(|gains| gains.controller::<NX, NU, NY>())
            .collect::<Result<Vec<_>>>()?;
        Schedule::from_vec(controllers)
    }

    /// Builds the typed plant model schedule.
    ///
    /// # Errors
    ///
    /// Same as [`GainSchedule::controllers`].
    pub fn plant_models<const NX: usize, const NU: usize, const NY: usize>(
        &self,
    ) -> Result<Schedule<PlantModel<NX, NU, NY>>> {
        let models = self
            .gains
            .iter()
            .map(|gains| gains.plant_model::<NX, NU, NY>())
            .collect::<Result<Vec<_>>>()?;
        Schedule::from_vec(models)
    }

    /// Builds a feedback loop over every record in the schedule.
    ///
    /// # Errors
    ///
    /// Same as [`GainSchedule::controllers`].
    pub fn build_loop<const NX: usize, const NU: usize, const NY: usize>(
        &self,
    ) -> Result<FeedbackLoop<NX, NU, NY>> {
        Ok(FeedbackLoop::new(self.controllers()?))
    }

    /// Builds a simulated plant over every record in the schedule.
    ///
    /// # Errors
    ///
    /// Same as [`GainSchedule::plant_models`].
    pub fn build_plant<const NX: usize, const NU: usize, const NY: usize>(
        &self,
    ) -> Result<PlantState<NX, NU, NY>> {
        Ok(PlantState::new(self.plant_models()?))
    }
}

impl std::str::FromStr for GainSchedule {
    type Err = ControlError;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_toml_str(text)
    }
}
