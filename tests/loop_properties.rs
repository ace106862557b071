//! Property-based tests for the feedback loop and plant.
//!
//! Run with: cargo test --test loop_properties

use nalgebra::{Matrix1x2, Matrix2, Matrix2x1, SMatrix, Vector1, Vector2};
use proptest::prelude::*;
use state_feedback::{
    ComponentwiseCap, Controller, FeedbackLoop, InputCap, PlantModel, PlantState, Schedule,
};

// =============================================================================
// Fixtures and strategies
// =============================================================================

fn plant_with_c(c: Matrix1x2<f64>) -> PlantModel<2, 1, 1> {
    PlantModel::new(
        Matrix2::new(1.0, 0.00844804908295, 0.0, 0.706562970689),
        Matrix2x1::new(0.000186726546509, 0.0353055515475),
        c,
        SMatrix::<f64, 1, 1>::zeros(),
        Vector1::new(-12.0),
        Vector1::new(12.0),
    )
}

fn controller_with_c(c: Matrix1x2<f64>) -> Controller<2, 1, 1> {
    Controller::new(
        Matrix2x1::new(1.60656297069, 51.0341417582),
        Matrix1x2::new(264.830871921, 10.681380124),
        plant_with_c(c),
    )
}

fn controller() -> Controller<2, 1, 1> {
    controller_with_c(Matrix1x2::new(1.0, 0.0))
}

fn arb_vector2() -> impl Strategy<Value = Vector2<f64>> {
    prop::array::uniform2(-100.0..100.0f64).prop_map(|[a, b]| Vector2::new(a, b))
}

fn arb_vector1() -> impl Strategy<Value = Vector1<f64>> {
    (-100.0..100.0f64).prop_map(Vector1::new)
}

// =============================================================================
// Schedule indices
// =============================================================================

proptest! {
    /// Reading back the controller index always gives the clamped request.
    #[test]
    fn controller_index_is_clamped(count in 1usize..8, index in 0usize..32) {
        let controllers = Schedule::from_vec(vec![controller(); count]).unwrap();
        let mut feedback = FeedbackLoop::new(controllers);

        feedback.set_controller_index(index);

        prop_assert_eq!(feedback.controller_index(), index.min(count - 1));
    }

    /// Same clamping policy on the plant side.
    #[test]
    fn plant_index_is_clamped(count in 1usize..8, index in 0usize..32) {
        let models =
            Schedule::from_vec(vec![plant_with_c(Matrix1x2::new(1.0, 0.0)); count]).unwrap();
        let mut plant = PlantState::new(models);

        plant.set_active_index(index);

        prop_assert_eq!(plant.active_index(), index.min(count - 1));
    }
}

// =============================================================================
// Step behaviour
// =============================================================================

proptest! {
    /// Stopping the motors yields exactly zero whatever the loop state.
    #[test]
    fn stop_motors_gives_zero(
        x_hat in arb_vector2(),
        r in arb_vector2(),
        y in arb_vector1(),
        update_observer in any::<bool>(),
    ) {
        let mut feedback = FeedbackLoop::from_controller(controller());
        feedback.x_hat = x_hat;
        feedback.r = r;
        feedback.y = y;

        feedback.update(update_observer, true);

        prop_assert_eq!(feedback.u, Vector1::zeros());
    }

    /// After a running step the command always lies inside the input range.
    #[test]
    fn command_within_bounds(x_hat in arb_vector2(), r in arb_vector2(), y in arb_vector1()) {
        let mut feedback = FeedbackLoop::from_controller(controller());
        feedback.x_hat = x_hat;
        feedback.r = r;
        feedback.y = y;

        feedback.update(true, false);

        prop_assert!(feedback.u[0] >= -12.0 && feedback.u[0] <= 12.0);
        if feedback.u_uncapped[0].abs() <= 12.0 {
            prop_assert_eq!(feedback.u[0], feedback.u_uncapped[0]);
        }
    }

    /// Open-loop prediction depends on neither the measurement nor C.
    #[test]
    fn open_loop_ignores_measurement_and_c(
        x_hat in arb_vector2(),
        r in arb_vector2(),
        y1 in arb_vector1(),
        y2 in arb_vector1(),
        c2 in arb_vector2(),
    ) {
        let mut first = FeedbackLoop::from_controller(controller());
        let mut second = FeedbackLoop::from_controller(controller_with_c(c2.transpose()));
        first.x_hat = x_hat;
        second.x_hat = x_hat;
        first.r = r;
        second.r = r;
        first.y = y1;
        second.y = y2;

        first.update(false, false);
        second.update(false, false);

        prop_assert_eq!(first.x_hat, second.x_hat);
        prop_assert_eq!(first.u, second.u);
    }

    /// Reset clears every vector regardless of history.
    #[test]
    fn reset_zeroes_loop(
        x_hat in arb_vector2(),
        r in arb_vector2(),
        y in arb_vector1(),
        steps in 0usize..5,
    ) {
        let mut feedback = FeedbackLoop::from_controller(controller());
        feedback.x_hat = x_hat;
        feedback.r = r;
        feedback.y = y;
        for _ in 0..steps {
            feedback.update(true, false);
        }
        feedback.feed_forward();

        feedback.reset();

        prop_assert_eq!(feedback.x_hat, Vector2::zeros());
        prop_assert_eq!(feedback.r, Vector2::zeros());
        prop_assert_eq!(feedback.u, Vector1::zeros());
        prop_assert_eq!(feedback.u_uncapped, Vector1::zeros());
        prop_assert_eq!(feedback.u_ff, Vector1::zeros());
        prop_assert_eq!(feedback.y, Vector1::zeros());
    }
}

// =============================================================================
// Capping
// =============================================================================

proptest! {
    /// Components above or below their bound are replaced by it; the rest
    /// pass through untouched.
    #[test]
    fn componentwise_capping(values in prop::array::uniform3(-50.0..50.0f64)) {
        let u_min = nalgebra::Vector3::new(-1.0, -10.0, 0.0);
        let u_max = nalgebra::Vector3::new(1.0, 10.0, 20.0);
        let original = nalgebra::Vector3::from(values);
        let mut u = original;

        ComponentwiseCap.cap_u(&mut u, &u_min, &u_max);

        for i in 0..3 {
            if original[i] > u_max[i] {
                prop_assert_eq!(u[i], u_max[i]);
            } else if original[i] < u_min[i] {
                prop_assert_eq!(u[i], u_min[i]);
            } else {
                prop_assert_eq!(u[i], original[i]);
            }
        }
    }
}
