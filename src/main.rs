//! Lid driven cavity
//!
//! cargo run --release -- [config.json] [restart.h5]
//!
//! Parameters missing in the json file take their default value,
//! set `RUST_LOG=debug` to follow the iterations of each step.
//! A restart file provides the initial flow field, the time
//! starts again from zero.
//!
//! Important: Disable obenblas multithreading:
//! ```text
//! export OPENBLAS_NUM_THREADS=1
//! ```
use fracstep::config::SimulationConfig;
use fracstep::fractional_step::Simulation;
use fracstep::{integrate, Integrate};

fn main() -> fracstep::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            log::info!("read configuration {:?}", path);
            SimulationConfig::from_file(path)?
        }
        None => SimulationConfig::default(),
    };
    log::info!("{:?}", config);

    let mut simulation = Simulation::lid_driven_cavity(&config)?;
    if let Some(restart) = args.next() {
        simulation.read_unwrap(&restart);
        simulation.reset_time();
    }
    // Write first field
    simulation.callback();
    integrate(&mut simulation, config.max_time, config.save_intervall);
    Ok(())
}
