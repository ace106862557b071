use nalgebra::{SMatrix, SVector};

use crate::plant::PlantModel;

/// A plant model paired with the observer and feedback gains designed for it.
///
/// Controllers are immutable. Gain scheduling is realised by handing several
/// controllers, each designed for a different operating regime, to one
/// [`FeedbackLoop`](crate::FeedbackLoop) that shares a single estimator state
/// between them.
///
/// # Gains
///
/// * `L` (NX × NY) - Observer gain applied to the measurement residual
/// * `K` (NU × NX) - Feedback gain applied to `R - X_hat`
#[derive(Debug, Clone, PartialEq)]
pub struct Controller<const NX: usize, const NU: usize, const NY: usize> {
    l: SMatrix<f64, NX, NY>,
    k: SMatrix<f64, NU, NX>,
    plant: PlantModel<NX, NU, NY>,
}

impl<const NX: usize, const NU: usize, const NY: usize> Controller<NX, NU, NY> {
    /// Bundles the observer gain `l` and feedback gain `k` with `plant`.
    ///
    /// # Example
    ///
    /// ```
    /// use nalgebra::{Matrix1, Matrix1x2, Matrix2, Matrix2x1, Vector1};
    /// use state_feedback::{Controller, PlantModel};
    ///
    /// let plant = PlantModel::<2, 1, 1>::new(
    ///     Matrix2::new(1.0, 0.0084, 0.0, 0.7066),
    ///     Matrix2x1::new(0.00019, 0.0353),
    ///     Matrix1x2::new(1.0, 0.0),
    ///     Matrix1::new(0.0),
    ///     Vector1::new(-12.0),
    ///     Vector1::new(12.0),
    /// );
    /// let controller = Controller::new(
    ///     Matrix2x1::new(1.6066, 51.034),
    ///     Matrix1x2::new(264.83, 10.68),
    ///     plant,
    /// );
    /// assert_eq!(controller.k()[(0, 0)], 264.83);
    /// ```
    pub fn new(
        l: SMatrix<f64, NX, NY>,
        k: SMatrix<f64, NU, NX>,
        plant: PlantModel<NX, NU, NY>,
    ) -> Self {
        Self { l, k, plant }
    }

    pub fn l(&self) -> &SMatrix<f64, NX, NY> {
        &self.l
    }

    pub fn k(&self) -> &SMatrix<f64, NU, NX> {
        &self.k
    }

    pub fn plant(&self) -> &PlantModel<NX, NU, NY> {
        &self.plant
    }

    pub fn a(&self) -> &SMatrix<f64, NX, NX> {
        self.plant.a()
    }

    pub fn b(&self) -> &SMatrix<f64, NX, NU> {
        self.plant.b()
    }

    pub fn c(&self) -> &SMatrix<f64, NY, NX> {
        self.plant.c()
    }

    pub fn d(&self) -> &SMatrix<f64, NY, NU> {
        self.plant.d()
    }

    pub fn u_min(&self) -> &SVector<f64, NU> {
        self.plant.u_min()
    }

    pub fn u_max(&self) -> &SVector<f64, NU> {
        self.plant.u_max()
    }
}
