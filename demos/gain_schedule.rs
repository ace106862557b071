use nalgebra::{Matrix1, Vector1};
use state_feedback::{Controller, GainSchedule, PlantModel, Schedule, Simulation};

// Shooter wheel velocity loop, 1 state (wheel speed in rad/s), 1 input
// (volts), 1 output, discretized at 100 Hz. The two regimes share the plant
// but use an aggressive spin-up gain and a gentler hold gain.
fn shooter_plant() -> PlantModel<1, 1, 1> {
    PlantModel::new(
        Matrix1::new(0.963935786812),
        Matrix1::new(3.57792913985),
        Matrix1::new(1.0),
        Matrix1::new(0.0),
        Vector1::new(-2.0),
        Vector1::new(12.0),
    )
}

fn main() -> state_feedback::Result<()> {
    tracing_subscriber::fmt::init();

    let controllers = Schedule::from_vec(vec![
        Controller::new(
            Matrix1::new(0.663935786812),
            Matrix1::new(0.101716879398),
            shooter_plant(),
        ),
        Controller::new(
            Matrix1::new(0.463935786812),
            Matrix1::new(0.031844059052),
            shooter_plant(),
        ),
    ])?;

    let path = std::env::temp_dir().join("shooter_gains.toml");
    GainSchedule::from_controllers("Shooter", Some(0.01), &controllers).save(&path)?;

    let schedule = GainSchedule::load(&path)?;
    let dt = schedule.dt.unwrap_or(0.01);
    let mut sim = Simulation::new(
        schedule.build_plant::<1, 1, 1>()?,
        schedule.build_loop::<1, 1, 1>()?,
        dt,
    );

    let goal = Vector1::new(500.0);
    for (regime, ticks) in [(0, 100), (1, 100)] {
        sim.set_schedule_index(regime);
        let samples = sim.run(ticks, goal)?;
        for sample in samples.iter().step_by(20) {
            println!(
                "regime {} t={:.2} speed={:.1} estimate={:.1} volts={:.2}",
                regime, sample.time, sample.x[0], sample.x_hat[0], sample.u[0]
            );
        }
    }

    Ok(())
}
