//! Discrete-time state-space feedback control.
//!
//! This crate runs pre-computed linear controllers: plant models, observer
//! gains and feedback gains are designed offline and handed in as constants
//! (or loaded from a gain file). Each control cycle a [`FeedbackLoop`]
//! computes a saturated actuator command from the goal state and the current
//! state estimate, then advances the estimate with a steady-state observer.
//!
//! # Building blocks
//!
//! - [`PlantModel`] - immutable `{A, B, C, D, U_min, U_max}`
//! - [`PlantState`] - a simulated plant stepping through a schedule of models
//! - [`Controller`] - a plant model with its observer gain `L` and feedback
//!   gain `K`
//! - [`FeedbackLoop`] - the control step, with gain scheduling over several
//!   controllers
//! - [`Schedule`] - the non-empty, index-clamped list both of them use
//! - [`hooks`] - saturation check, capping and feed-forward strategies
//! - [`GainSchedule`] - TOML gain files
//! - [`Simulation`] - a loop driving a simulated plant
//!
//! Dimensions are const generic parameters (`NX` states, `NU` inputs, `NY`
//! outputs), so mismatched matrices do not compile. Only data loaded at run
//! time is checked, on conversion.
//!
//! # Example
//!
//! ```
//! use nalgebra::{Matrix1, Matrix1x2, Matrix2, Matrix2x1, Vector1, Vector2};
//! use state_feedback::{FeedbackLoop, PlantModel};
//!
//! let plant = PlantModel::<2, 1, 1>::new(
//!     Matrix2::new(1.0, 0.00844804908295, 0.0, 0.706562970689),
//!     Matrix2x1::new(0.000186726546509, 0.0353055515475),
//!     Matrix1x2::new(1.0, 0.0),
//!     Matrix1::new(0.0),
//!     Vector1::new(-12.0),
//!     Vector1::new(12.0),
//! );
//! let mut feedback = FeedbackLoop::from_gains(
//!     Matrix2x1::new(1.60656297069, 51.0341417582),
//!     Matrix1x2::new(264.830871921, 10.681380124),
//!     plant,
//! );
//!
//! // One cycle: measurement in, goal in, command out.
//! feedback.y = Vector1::new(0.0);
//! feedback.r = Vector2::new(0.5, 0.0);
//! feedback.update(true, false);
//! assert_eq!(feedback.u[0], 12.0);
//! ```

pub mod controller;
pub mod error;
pub mod feedback;
pub mod gains;
pub mod hooks;
pub mod plant;
pub mod schedule;
pub mod sim;

pub use controller::Controller;
pub use error::{ControlError, Result};
pub use feedback::FeedbackLoop;
pub use gains::{GainSchedule, StateSpaceGains};
pub use hooks::{
    ComponentwiseCap, FeedForward, HardwareRangeCheck, InputCap, InputCheck, ZeroFeedForward,
};
pub use plant::{PlantModel, PlantState};
pub use schedule::Schedule;
pub use sim::{Sample, Simulation};
