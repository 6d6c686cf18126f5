//! # Time integration
//! Drives the [`FractionalStepStrategy`] through time and writes
//! snapshots of the fields.
//!
//! # Example
//! Lid driven cavity
//! ```ignore
//! use fracstep::config::SimulationConfig;
//! use fracstep::fractional_step::Simulation;
//! use fracstep::integrate;
//!
//! let config = SimulationConfig::default();
//! let mut simulation = Simulation::lid_driven_cavity(&config).unwrap();
//! simulation.write_intervall = Some(0.5);
//! integrate(&mut simulation, 1.0, Some(0.1));
//! ```
use super::strategy::{FractionalStepStrategy, StepOutcome};
use crate::config::SimulationConfig;
use crate::field::Variable;
use crate::io::{read_scalar_from_hdf5, write_scalar_to_hdf5};
use crate::mesh::Mesh;
use crate::process::{Model, ProcessInfo};
use crate::types::TimeLevel;
use crate::{Integrate, Result};
use std::collections::HashMap;

/// Model, process context and strategy of a transient run
pub struct Simulation {
    /// Mesh and nodal fields
    pub model: Model,
    /// Time, time step and convergence flags
    pub process: ProcessInfo,
    strategy: FractionalStepStrategy,
    /// Collected per time step: time, iterations, converged, |u|
    pub diagnostics: HashMap<String, Vec<f64>>,
    /// Time intervall for write fields
    /// If none, same intervall as diagnostics
    pub write_intervall: Option<f64>,
    /// Directory of the snapshots
    pub output_dir: String,
    last_outcome: Option<StepOutcome>,
}

impl Simulation {
    /// New run
    pub fn new(model: Model, process: ProcessInfo, strategy: FractionalStepStrategy) -> Self {
        let mut diagnostics = HashMap::new();
        for key in ["time", "iterations", "converged", "velocity"] {
            diagnostics.insert(key.to_owned(), Vec::<f64>::new());
        }
        Self {
            model,
            process,
            strategy,
            diagnostics,
            write_intervall: None,
            output_dir: "data".to_owned(),
            last_outcome: None,
        }
    }

    /// Lid driven cavity: fluid at rest in a rectangle, the top
    /// wall moves with `lid_velocity` in x, all other walls are
    /// at rest. The pressure is fixed to zero in the lower left
    /// corner.
    ///
    /// # Errors
    /// Invalid configuration
    pub fn lid_driven_cavity(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mesh = Mesh::rectangle(config.nx, config.ny, config.length, config.height);
        let mut model = Model::new(mesh);
        let coords = model.mesh.coordinates().clone();
        let eps = 1e-10 * config.length.min(config.height);
        for (node, x) in coords.outer_iter().enumerate() {
            let top = (x[1] - config.height).abs() < eps;
            let wall = x[0] < eps || x[1] < eps || (x[0] - config.length).abs() < eps;
            if top {
                model.fields.fix(node, Variable::Velocity, 0, config.lid_velocity);
                model.fields.fix(node, Variable::Velocity, 1, 0.);
            } else if wall {
                model.fields.fix(node, Variable::Velocity, 0, 0.);
                model.fields.fix(node, Variable::Velocity, 1, 0.);
            }
        }
        model.fields.fix(0, Variable::Pressure, 0, 0.);

        let process = ProcessInfo::new(config.dt);
        let strategy = FractionalStepStrategy::incompressible(
            config.strategy.clone(),
            config.viscosity,
            config.density,
        );
        strategy.check(&model, &process)?;
        let mut simulation = Self::new(model, process, strategy);
        simulation.write_intervall = config.save_intervall;
        if config.disturbance > 0. {
            simulation.random_disturbance(config.disturbance);
        }
        Ok(simulation)
    }

    /// Add random disturbances in `[-amp, amp)` to the free
    /// velocity components
    pub fn random_disturbance(&mut self, amp: f64) {
        use ndarray::Array2;
        use ndarray_rand::rand_distr::Uniform;
        use ndarray_rand::RandomExt;
        if !(amp > 0.) {
            return;
        }
        let n_nodes = self.model.mesh.n_nodes();
        let dim = self.model.domain_size().dim();
        let rand: Array2<f64> = Array2::random((n_nodes, dim), Uniform::new(-amp, amp));
        let velocity = self.model.fields.field_mut(Variable::Velocity);
        for ((node, d), r) in rand.indexed_iter() {
            if !velocity.fixed[[node, d]] {
                velocity.v[[node, d]] += r;
            }
        }
    }

    /// Outcome of the last time step
    pub fn last_outcome(&self) -> Option<&StepOutcome> {
        self.last_outcome.as_ref()
    }

    /// L2 norm of the current velocity
    pub fn velocity_norm(&self) -> f64 {
        self.model
            .fields
            .norm_l2(Variable::Velocity, TimeLevel::Current, self.strategy.comm())
    }

    /// Reset time
    pub fn reset_time(&mut self) {
        self.process.time = 0.;
        self.process.step = 0;
    }

    /// Restart from file, fields and time are left untouched
    /// if the snapshot can't be read
    ///
    /// # Errors
    /// Can't read file
    pub fn read(&mut self, filename: &str) -> Result<()> {
        let time = read_scalar_from_hdf5::<f64>(filename, "time")?;
        self.model.fields.read(filename, "fields")?;
        self.process.time = time;
        log::info!(" <== {:?}", filename);
        Ok(())
    }

    /// Restart from file, and handle error
    pub fn read_unwrap(&mut self, filename: &str) {
        match self.read(filename) {
            Ok(_) => log::info!("Reading file {:?} was successfull.", filename),
            Err(e) => log::error!("Error while reading file {:?}. Error: {}", filename, e),
        }
    }

    /// Write fields and scalars to hdf5 file
    ///
    /// # Errors
    /// Can't write file
    pub fn write(&self, filename: &str) -> Result<()> {
        self.model.fields.write(filename, "fields")?;
        crate::io::write_to_hdf5(filename, "coordinates", self.model.mesh.coordinates())?;
        write_scalar_to_hdf5(filename, "time", self.process.time)?;
        write_scalar_to_hdf5(filename, "dt", self.process.delta_time)?;
        log::info!(" ==> {:?}", filename);
        Ok(())
    }
}

impl Integrate for Simulation {
    /// Update 1 timestep
    fn update(&mut self) {
        self.model.fields.clone_time_level();
        self.process.advance();
        log::debug!("time step {}, time = {:e}", self.process.step, self.process.time);
        let outcome = self
            .strategy
            .solve_solution_step(&mut self.model, &mut self.process);
        if !outcome.is_converged() {
            log::warn!(
                "time step {} not converged ({:?} after {} iterations)",
                self.process.step,
                outcome.termination,
                outcome.iterations
            );
        }
        self.last_outcome = Some(outcome);
    }

    fn get_time(&self) -> f64 {
        self.process.time
    }

    fn get_dt(&self) -> f64 {
        self.process.delta_time
    }

    fn callback(&mut self) {
        let time = self.process.time;
        let dt = self.process.delta_time;
        let write = self.write_intervall.map_or(true, |dt_save| {
            (time % dt_save) < dt / 2. || (time % dt_save) > dt_save - dt / 2.
        });
        if write {
            if let Err(e) = std::fs::create_dir_all(&self.output_dir) {
                log::error!("Can't create {:?}: {}", self.output_dir, e);
            } else {
                let fname = format!("{}/flow{:0>8.2}.h5", self.output_dir, time);
                if let Err(e) = self.write(&fname) {
                    log::error!("Error while writing file {:?}. Error: {}", fname, e);
                }
            }
        }

        let velocity = self.velocity_norm();
        let (iterations, converged) = self
            .last_outcome
            .map_or((0, false), |o| (o.iterations, o.is_converged()));
        log::info!(
            "time = {:4.2}      |u| = {:4.2e}     iterations = {}",
            time,
            velocity,
            iterations,
        );
        for (key, value) in [
            ("time", time),
            ("iterations", iterations as f64),
            ("converged", f64::from(u8::from(converged))),
            ("velocity", velocity),
        ] {
            if let Some(d) = self.diagnostics.get_mut(key) {
                d.push(value);
            }
        }
    }

    fn exit(&mut self) -> bool {
        // Break if velocity is nan
        self.velocity_norm().is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfig;
    use crate::integrate;

    fn small_cavity() -> SimulationConfig {
        SimulationConfig {
            nx: 4,
            ny: 4,
            dt: 0.05,
            max_time: 0.2,
            save_intervall: None,
            viscosity: 0.1,
            strategy: StrategyConfig {
                max_iterations: 6,
                ..StrategyConfig::default()
            },
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_cavity_boundary_conditions() {
        let simulation = Simulation::lid_driven_cavity(&small_cavity()).unwrap();
        let fields = &simulation.model.fields;
        // top right corner moves, bottom left is at rest
        assert!(fields.is_fixed(24, Variable::Velocity, 0));
        assert_eq!(fields.get(24, Variable::Velocity, 0, TimeLevel::Current), 1.);
        assert_eq!(fields.get(0, Variable::Velocity, 0, TimeLevel::Current), 0.);
        assert!(fields.is_fixed(0, Variable::Pressure, 0));
        // interior node is free
        assert!(!fields.is_fixed(12, Variable::Velocity, 0));
    }

    #[test]
    fn test_cavity_integrates() {
        let config = small_cavity();
        let mut simulation = Simulation::lid_driven_cavity(&config).unwrap();
        integrate(&mut simulation, config.max_time, None);
        assert!(simulation.process.step >= 4);
        let norm = simulation.velocity_norm();
        assert!(norm.is_finite());
        // lid velocity is kept
        let fields = &simulation.model.fields;
        assert_eq!(fields.get(24, Variable::Velocity, 0, TimeLevel::Current), 1.);
        // the fluid below the lid is dragged along
        assert!(fields.get(17, Variable::Velocity, 0, TimeLevel::Current) > 0.);
        assert!(simulation.last_outcome().is_some());
    }

    #[test]
    fn test_exit_on_nan() {
        let mut simulation = Simulation::lid_driven_cavity(&small_cavity()).unwrap();
        assert!(!simulation.exit());
        simulation
            .model
            .fields
            .set(12, Variable::Velocity, 1, TimeLevel::Current, f64::NAN);
        assert!(simulation.exit());
    }

    #[test]
    fn test_restart() {
        let path = std::env::temp_dir().join("fracstep_test_restart.h5");
        let filename = path.to_str().unwrap();
        let _ = std::fs::remove_file(filename);
        let config = small_cavity();
        let mut simulation = Simulation::lid_driven_cavity(&config).unwrap();
        integrate(&mut simulation, 0.1, None);
        simulation.write(filename).unwrap();
        let velocity = simulation.velocity_norm();

        let mut restarted = Simulation::lid_driven_cavity(&config).unwrap();
        let initial = restarted.velocity_norm();
        restarted.read_unwrap("does_not_exist.h5");
        assert_eq!(restarted.process.time, 0.);
        assert_eq!(restarted.velocity_norm(), initial);

        restarted.read_unwrap(filename);
        assert!(restarted.process.time > 0.);
        assert_eq!(restarted.velocity_norm(), velocity);
        restarted.reset_time();
        assert_eq!(restarted.process.time, 0.);
        assert_eq!(restarted.process.step, 0);
        std::fs::remove_file(filename).unwrap();
    }

    #[test]
    fn test_invalid_config() {
        let mut config = small_cavity();
        config.dt = -1.;
        assert!(Simulation::lid_driven_cavity(&config).is_err());
    }
}
