use nalgebra::{SMatrix, SVector};
use tracing::trace;

use crate::controller::Controller;
use crate::hooks::{ComponentwiseCap, FeedForward, InputCap, ZeroFeedForward};
use crate::plant::PlantModel;
use crate::schedule::Schedule;

/// A discrete-time state feedback loop with a steady-state observer.
///
/// The loop owns a schedule of [`Controller`]s and the estimator state shared
/// between them. Each control cycle the caller writes the latest measurement
/// into `y` and the goal state into `r`, then calls
/// [`FeedbackLoop::update`]. The saturated actuator command is left in `u`
/// and the state estimate for the next cycle in `x_hat`.
///
/// # Step Algorithm
///
/// With the active controller's A, B, C, K, L and input range:
///
/// U_uncapped = K (R - X_hat)
/// U          = cap(U_uncapped, U_min, U_max)         (or 0 when stopped)
/// X_hat'     = (A - L C) X_hat + L Y + B U           (observer update)
/// X_hat'     = A X_hat + B U                         (open-loop prediction)
///
/// # Type Parameters
///
/// * `NX`, `NU`, `NY` - State, input and output dimensions
/// * `Cap` - Saturation strategy applied to the raw command
/// * `Ff` - Feed-forward strategy backing [`FeedbackLoop::feed_forward`]
///
/// # Example
///
/// ```
/// use nalgebra::{Matrix1, Vector1};
/// use state_feedback::{FeedbackLoop, PlantModel};
///
/// let plant = PlantModel::<1, 1, 1>::new(
///     Matrix1::new(1.0),
///     Matrix1::new(1.0),
///     Matrix1::new(1.0),
///     Matrix1::new(0.0),
///     Vector1::new(-1.0),
///     Vector1::new(1.0),
/// );
/// let mut feedback = FeedbackLoop::from_gains(Matrix1::new(0.0), Matrix1::new(1.0), plant);
///
/// feedback.r = Vector1::new(5.0);
/// feedback.update(true, false);
///
/// assert_eq!(feedback.u_uncapped[0], 5.0);
/// assert_eq!(feedback.u[0], 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct FeedbackLoop<
    const NX: usize,
    const NU: usize,
    const NY: usize,
    Cap = ComponentwiseCap,
    Ff = ZeroFeedForward,
> {
    controllers: Schedule<Controller<NX, NU, NY>>,
    cap: Cap,
    feed_forward: Ff,
    /// Estimated plant state
    pub x_hat: SVector<f64, NX>,
    /// Goal state
    pub r: SVector<f64, NX>,
    /// Saturated actuator command from the last update
    pub u: SVector<f64, NU>,
    /// Command before saturation from the last update that ran the controller
    pub u_uncapped: SVector<f64, NU>,
    /// Feed-forward command from the last call to `feed_forward`
    pub u_ff: SVector<f64, NU>,
    /// Latest measurement, written by the caller before each update
    pub y: SVector<f64, NY>,
}

impl<const NX: usize, const NU: usize, const NY: usize> FeedbackLoop<NX, NU, NY> {
    /// Creates a loop over a schedule of controllers, with the first active.
    pub fn new(controllers: Schedule<Controller<NX, NU, NY>>) -> Self {
        Self::with_hooks(controllers, ComponentwiseCap, ZeroFeedForward)
    }

    /// Creates a loop with a single controller.
    pub fn from_controller(controller: Controller<NX, NU, NY>) -> Self {
        Self::new(Schedule::new(controller))
    }

    /// Creates a loop with a single controller built from its parts.
    pub fn from_gains(
        l: SMatrix<f64, NX, NY>,
        k: SMatrix<f64, NU, NX>,
        plant: PlantModel<NX, NU, NY>,
    ) -> Self {
        Self::from_controller(Controller::new(l, k, plant))
    }
}

impl<const NX: usize, const NU: usize, const NY: usize, Cap, Ff> FeedbackLoop<NX, NU, NY, Cap, Ff>
where
    Cap: InputCap<NU>,
    Ff: FeedForward<NX, NU>,
{
    /// Creates a loop with custom saturation and feed-forward strategies.
    ///
    /// All vectors start at zero.
    pub fn with_hooks(
        controllers: Schedule<Controller<NX, NU, NY>>,
        cap: Cap,
        feed_forward: Ff,
    ) -> Self {
        Self {
            controllers,
            cap,
            feed_forward,
            x_hat: SVector::zeros(),
            r: SVector::zeros(),
            u: SVector::zeros(),
            u_uncapped: SVector::zeros(),
            u_ff: SVector::zeros(),
            y: SVector::zeros(),
        }
    }

    /// The active controller.
    pub fn controller(&self) -> &Controller<NX, NU, NY> {
        self.controllers.active()
    }

    pub fn controllers(&self) -> &Schedule<Controller<NX, NU, NY>> {
        &self.controllers
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub fn controller_index(&self) -> usize {
        self.controllers.active_index()
    }

    /// Selects the active controller, clamping out-of-range indices to the
    /// last controller.
    ///
    /// The estimate, goal, measurement and command are left untouched; only
    /// the next [`update`](Self::update) uses the new matrices.
    pub fn set_controller_index(&mut self, index: usize) {
        self.controllers.set_active_index(index);
    }

    pub fn a(&self) -> &SMatrix<f64, NX, NX> {
        self.controller().a()
    }

    pub fn b(&self) -> &SMatrix<f64, NX, NU> {
        self.controller().b()
    }

    pub fn c(&self) -> &SMatrix<f64, NY, NX> {
        self.controller().c()
    }

    pub fn d(&self) -> &SMatrix<f64, NY, NU> {
        self.controller().d()
    }

    pub fn k(&self) -> &SMatrix<f64, NU, NX> {
        self.controller().k()
    }

    pub fn l(&self) -> &SMatrix<f64, NX, NY> {
        self.controller().l()
    }

    pub fn u_min(&self) -> &SVector<f64, NU> {
        self.controller().u_min()
    }

    pub fn u_max(&self) -> &SVector<f64, NU> {
        self.controller().u_max()
    }

    /// Zeroes the estimate, goal, measurement and all command vectors.
    ///
    /// Typically called when the mechanism is re-enabled; the controller
    /// schedule and active index are kept.
    pub fn reset(&mut self) {
        self.x_hat.fill(0.0);
        self.r.fill(0.0);
        self.u.fill(0.0);
        self.u_uncapped.fill(0.0);
        self.u_ff.fill(0.0);
        self.y.fill(0.0);
    }

    /// Recomputes `u_ff` from the current estimate and goal.
    ///
    /// The result is advisory: [`update`](Self::update) never adds it to `u`.
    /// Callers that want feed-forward must compose it themselves.
    pub fn feed_forward(&mut self) -> &SVector<f64, NU> {
        self.u_ff = self.feed_forward.feed_forward(&self.x_hat, &self.r);
        &self.u_ff
    }

    /// Saturates `u` in place with the loop's capping strategy.
    pub fn cap_u(&mut self) {
        let controller = self.controllers.active();
        self.cap.cap_u(&mut self.u, controller.u_min(), controller.u_max());
    }

    /// Runs one control cycle.
    ///
    /// # Arguments
    ///
    /// * `update_observer` - Correct the estimate with the measurement in `y`.
    ///   When `false` the estimate is propagated open-loop and `y` is ignored.
    /// * `stop_motors` - Force `u` to exactly zero (safe idle). The estimate
    ///   still advances, using the zero command.
    ///
    /// # Behaviour
    ///
    /// 1. Unless stopped, `u_uncapped = K (r - x_hat)` and `u` is the capped
    ///    copy of it. When stopped, `u` is zeroed and `u_uncapped` keeps its
    ///    previous value.
    /// 2. `x_hat` advances with the observer or the open-loop model.
    pub fn update(&mut self, update_observer: bool, stop_motors: bool) {
        if stop_motors {
            self.u.fill(0.0);
        } else {
            self.u_uncapped = self.controllers.active().k() * (self.r - self.x_hat);
            self.u = self.u_uncapped;
            self.cap_u();
        }

        let controller = self.controllers.active();
        let (a, b) = (controller.a(), controller.b());
        if update_observer {
            let (c, l) = (controller.c(), controller.l());
            self.x_hat = (a - l * c) * self.x_hat + l * self.y + b * self.u;
        } else {
            self.x_hat = a * self.x_hat + b * self.u;
        }

        trace!(
            controller = self.controllers.active_index(),
            update_observer,
            stop_motors,
            "feedback loop stepped"
        );
    }
}
