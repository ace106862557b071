use nalgebra::{Matrix1, Matrix1x2, Matrix2, Matrix2x1, Vector1, Vector2};
use state_feedback::{Controller, FeedbackLoop, PlantModel, PlantState, Simulation};

// Angle adjust mechanism, 2 states (position, velocity), 1 input (volts),
// 1 output (position), discretized at 100 Hz.
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

fn main() {
    tracing_subscriber::fmt::init();

    let dt = 0.01;
    let mut sim = Simulation::new(
        PlantState::from_model(angle_adjust_plant()),
        FeedbackLoop::from_controller(angle_adjust_controller()),
        dt,
    );

    // Move to 0.5 rad, then disable the motors and let it coast.
    match sim.run(150, Vector2::new(0.5, 0.0)) {
        Ok(samples) => {
            for sample in samples.iter().step_by(10) {
                println!(
                    "{:.2} {:.4} {:.4} {:.3}",
                    sample.time, sample.x[0], sample.x_hat[0], sample.u[0]
                );
            }
        }
        Err(e) => println!("Simulation failed: {}", e),
    }

    for _ in 0..20 {
        match sim.step(true, true) {
            Ok(sample) => println!(
                "{:.2} {:.4} {:.4} {:.3} (stopped)",
                sample.time, sample.x[0], sample.x_hat[0], sample.u[0]
            ),
            Err(e) => {
                println!("Simulation failed: {}", e);
                break;
            }
        }
    }
}
