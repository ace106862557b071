//! Closed-loop simulation of a feedback loop driving a simulated plant.

use nalgebra::SVector;
use tracing::debug;

use crate::error::Result;
use crate::feedback::FeedbackLoop;
use crate::hooks::{FeedForward, InputCap, InputCheck};
use crate::plant::PlantState;

/// One recorded control cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<const NX: usize, const NU: usize, const NY: usize> {
    pub tick: usize,
    /// Time at the end of the cycle, in seconds
    pub time: f64,
    /// True plant state after the cycle
    pub x: SVector<f64, NX>,
    /// Loop estimate after the cycle
    pub x_hat: SVector<f64, NX>,
    /// Command applied during the cycle
    pub u: SVector<f64, NU>,
    /// Plant output after the cycle
    pub y: SVector<f64, NY>,
}

/// A feedback loop wired to a simulated plant.
///
/// Each cycle copies the plant's output into the loop, runs the loop, hands
/// the resulting command to the plant and steps it. The plant's input check
/// stays active, so a loop that emits an out-of-range command makes the
/// simulation fail.
///
/// The plant and loop may be built from different models to study
/// model mismatch.
#[derive(Debug, Clone)]
pub struct Simulation<const NX: usize, const NU: usize, const NY: usize, H, Cap, Ff> {
    pub plant: PlantState<NX, NU, NY, H>,
    pub feedback: FeedbackLoop<NX, NU, NY, Cap, Ff>,
    dt: f64,
    tick: usize,
}

impl<const NX: usize, const NU: usize, const NY: usize, H, Cap, Ff>
    Simulation<NX, NU, NY, H, Cap, Ff>
where
    H: InputCheck<NU>,
    Cap: InputCap<NU>,
    Ff: FeedForward<NX, NU>,
{
    /// Creates a simulation stepping every `dt` seconds.
    pub fn new(
        plant: PlantState<NX, NU, NY, H>,
        feedback: FeedbackLoop<NX, NU, NY, Cap, Ff>,
        dt: f64,
    ) -> Self {
        Self {
            plant,
            feedback,
            dt,
            tick: 0,
        }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of completed cycles.
    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Switches both the plant and the loop to regime `index` (clamped).
    pub fn set_schedule_index(&mut self, index: usize) {
        self.plant.set_active_index(index);
        self.feedback.set_controller_index(index);
    }

    /// Resets the plant, the loop and the cycle counter.
    pub fn reset(&mut self) {
        self.plant.reset();
        self.feedback.reset();
        self.tick = 0;
    }

    /// Runs one control cycle.
    ///
    /// # Errors
    ///
    /// Propagates the plant's input check failure. The cycle is then rolled
    /// back: the plant, the loop's vectors and the cycle counter are left as
    /// they were before the call.
    pub fn step(&mut self, update_observer: bool, stop_motors: bool) -> Result<Sample<NX, NU, NY>> {
        let loop_before = (
            self.feedback.x_hat,
            self.feedback.u,
            self.feedback.u_uncapped,
            self.feedback.y,
        );
        let plant_u_before = self.plant.u;

        self.feedback.y = self.plant.y;
        self.feedback.update(update_observer, stop_motors);
        self.plant.u = self.feedback.u;
        if let Err(err) = self.plant.update() {
            (
                self.feedback.x_hat,
                self.feedback.u,
                self.feedback.u_uncapped,
                self.feedback.y,
            ) = loop_before;
            self.plant.u = plant_u_before;
            return Err(err);
        }

        self.tick += 1;
        Ok(Sample {
            tick: self.tick,
            time: self.tick as f64 * self.dt,
            x: self.plant.x,
            x_hat: self.feedback.x_hat,
            u: self.plant.u,
            y: self.plant.y,
        })
    }

    /// Drives the plant toward `reference` for `ticks` cycles with the
    /// observer enabled, returning every sample.
    ///
    /// # Errors
    ///
    /// Stops at the first failing cycle, see [`Simulation::step`].
    pub fn run(
        &mut self,
        ticks: usize,
        reference: SVector<f64, NX>,
    ) -> Result<Vec<Sample<NX, NU, NY>>> {
        self.feedback.r = reference;
        let samples = (0..ticks)
            .map(|_| self.step(true, false))
            .collect::<Result<Vec<_>>>()?;

        if let Some(last) = samples.last() {
            debug!(
                ticks,
                time = last.time,
                error = (reference - last.x).norm(),
                "simulation finished"
            );
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{Matrix1, Matrix1x2, Matrix2, Matrix2x1, Vector1, Vector2};

    use super::*;
    use crate::controller::Controller;
    use crate::error::ControlError;
    use crate::hooks::{ComponentwiseCap, HardwareRangeCheck, ZeroFeedForward};
    use crate::plant::PlantModel;
    use crate::schedule::Schedule;

    fn angle_adjust_plant() -> PlantModel<2, 1, 1> {
        PlantModel::new(
            Matrix2::new(1.0, 0.00844804908295, 0.0, 0.706562970689),
            Matrix2x1::new(0.000186726546509, 0.0353055515475),
            Matrix1x2::new(1.0, 0.0),
            Matrix1::new(0.0),
            Vector1::new(-12.0),
            Vector1::new(12.0),
        )
    }

    fn angle_adjust_controller() -> Controller<2, 1, 1> {
        Controller::new(
            Matrix2x1::new(1.60656297069, 51.0341417582),
            Matrix1x2::new(264.830871921, 10.681380124),
            angle_adjust_plant(),
        )
    }

    #[test]
    fn test_closed_loop_converges() {
        let mut sim = Simulation::new(
            PlantState::from_model(angle_adjust_plant()),
            FeedbackLoop::from_controller(angle_adjust_controller()),
            0.01,
        );

        let samples = sim.run(300, Vector2::new(0.5, 0.0)).unwrap();

        assert_eq!(samples.len(), 300);
        assert_relative_eq!(samples[299].time, 3.0, epsilon = 1e-9);
        let last = samples[299];
        assert!((last.x[0] - 0.5).abs() < 1e-3, "position {}", last.x[0]);
        assert!(last.x[1].abs() < 1e-2, "velocity {}", last.x[1]);
        assert!((last.x_hat - last.x).norm() < 1e-3);
        assert!(samples.iter().all(|s| s.u[0].abs() <= 12.0));
    }

    #[test]
    fn test_stop_motors_holds_plant_idle() {
        let mut sim = Simulation::new(
            PlantState::from_model(angle_adjust_plant()),
            FeedbackLoop::from_controller(angle_adjust_controller()),
            0.01,
        );
        sim.feedback.r = Vector2::new(1.0, 0.0);

        for _ in 0..10 {
            let sample = sim.step(true, true).unwrap();
            assert_eq!(sample.u, Vector1::zeros());
            assert_eq!(sample.x, Vector2::zeros());
        }
        assert_eq!(sim.tick(), 10);

        sim.reset();
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.feedback.r, Vector2::zeros());
    }

    #[derive(Debug, Clone, Copy)]
    struct NoCap;

    impl InputCap<1> for NoCap {
        fn cap_u(
            &self,
            _u: &mut SVector<f64, 1>,
            _u_min: &SVector<f64, 1>,
            _u_max: &SVector<f64, 1>,
        ) {
        }
    }

    #[test]
    fn test_uncapped_loop_trips_plant_check() {
        let mut sim = Simulation::new(
            PlantState::from_model(angle_adjust_plant()),
            FeedbackLoop::with_hooks(
                Schedule::new(angle_adjust_controller()),
                NoCap,
                ZeroFeedForward,
            ),
            0.01,
        );

        let err = sim.run(5, Vector2::new(1.0, 0.0)).unwrap_err();

        assert!(matches!(err, ControlError::SaturationViolation { index: 0, .. }));
        assert_eq!(sim.plant.x, Vector2::zeros());
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn test_rejected_cycle_rolls_back_loop_and_plant() {
        let mut sim = Simulation::new(
            PlantState::from_model(angle_adjust_plant()),
            FeedbackLoop::with_hooks(
                Schedule::new(angle_adjust_controller()),
                NoCap,
                ZeroFeedForward,
            ),
            0.01,
        );
        sim.feedback.r = Vector2::new(5.0, 0.0);

        assert!(sim.step(true, false).is_err());

        assert_eq!(sim.plant.x, Vector2::zeros());
        assert_eq!(sim.plant.u, Vector1::zeros());
        assert_eq!(sim.feedback.x_hat, Vector2::zeros());
        assert_eq!(sim.feedback.u, Vector1::zeros());
        assert_eq!(sim.feedback.u_uncapped, Vector1::zeros());
        assert_eq!(sim.feedback.r, Vector2::new(5.0, 0.0));
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn test_schedule_index_switches_both_sides() {
        let plants = Schedule::from_vec(vec![angle_adjust_plant(), angle_adjust_plant()]).unwrap();
        let controllers =
            Schedule::from_vec(vec![angle_adjust_controller(), angle_adjust_controller()]).unwrap();
        let mut sim: Simulation<2, 1, 1, HardwareRangeCheck, ComponentwiseCap, ZeroFeedForward> =
            Simulation::new(PlantState::new(plants), FeedbackLoop::new(controllers), 0.005);

        sim.set_schedule_index(3);

        assert_eq!(sim.plant.active_index(), 1);
        assert_eq!(sim.feedback.controller_index(), 1);
        assert_eq!(sim.dt(), 0.005);
    }
}
