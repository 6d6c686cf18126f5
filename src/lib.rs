//! # `fracstep`: Fractional step solver for incompressible flow
//!<img align="right" src="https://rustacean.net/assets/cuddlyferris.png" width="80">
//!
//! # Dependencies
//! - cargo >= v1.56
//! - `hdf5` (sudo apt-get install -y libhdf5-dev)
//! - blas/lapack for `ndarray-linalg` (default: system openblas)
//!
//! With feature `mpi`, partition reductions go through an mpi
//! universe. The following additional dependencies are required:
//!
//! - mpi installation
//! - libclang
//!
//! # Important
//!
//! Openblas multithreading conflicts with internal multithreading.
//! Turn it off for better performance:
//! ```text
//! export OPENBLAS_NUM_THREADS=1
//! ```
//!
//! # Details
//!
//! The core of this library is the iteration controller of the
//! fractional step (velocity-pressure splitting) scheme, see
//! [`fractional_step::FractionalStepStrategy`]. Per time step it
//! - solves the momentum equation for the velocity,
//! - solves the continuity equation for a pressure increment,
//! - corrects the velocity with the elemental fluxes of the increment,
//!
//! until both sub-problems converged, and freezes the step at the
//! previous time level if a sub-solve breaks down.
//!
//! Sub-solvers, element fluxes and element state updates are
//! collaborators behind narrow traits
//! ([`fractional_step::SubSolver`], [`fractional_step::FluxContributor`],
//! [`fractional_step::StateAdvancer`]). Linear simplex (P1)
//! implementations for triangles and tetrahedra are included.
//!
//! # Example
//! Lid driven cavity ( Run with `cargo run --release` )
//! ```ignore
//! use fracstep::config::SimulationConfig;
//! use fracstep::fractional_step::Simulation;
//! use fracstep::integrate;
//!
//! fn main() {
//!     env_logger::init();
//!     let config = SimulationConfig::default();
//!     let mut simulation = Simulation::lid_driven_cavity(&config).unwrap();
//!     integrate(&mut simulation, config.max_time, config.save_intervall);
//! }
//! ```
//!
//! ## Postprocess the output
//!
//! Snapshots are written as `hdf5` files to the `data` folder. Each
//! holds the node coordinates, the time and for every nodal variable
//! the group `fields/<name>` with both time levels and fixed flags.
//!
//! ## Documentation
//!
//! Download and run:
//!
//! `cargo doc --open`
#![warn(missing_docs)]
#![allow(clippy::unnecessary_cast)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate enum_dispatch;
pub mod config;
pub mod error;
pub mod field;
pub mod fractional_step;
pub mod io;
pub mod mesh;
pub mod mpi;
pub mod process;
pub mod solver;
pub mod types;
pub use error::{Error, Result};

const MAX_TIMESTEP: usize = 10_000_000;

/// Integrate trait, step forward in time, and write results
pub trait Integrate {
    /// Update solution
    fn update(&mut self);
    /// Receive current time
    fn get_time(&self) -> f64;
    /// Get timestep
    fn get_dt(&self) -> f64;
    /// Callback function (can be used for i/o)
    fn callback(&mut self);
    /// Additional break criteria
    fn exit(&mut self) -> bool;
}

/// Integrade pde, that implements the Integrate trait.
///
/// Specify `save_intervall` to force writing an output.
///
/// Stop Criteria:
/// 1. Timestep limit
/// 2. Time limit
/// 3. [`Integrate::exit`]
pub fn integrate<T: Integrate>(pde: &mut T, max_time: f64, save_intervall: Option<f64>) {
    let mut timestep: usize = 0;
    let eps_dt = pde.get_dt() * 1e-4;
    loop {
        // Update
        pde.update();
        timestep += 1;

        // Save
        if let Some(dt_save) = &save_intervall {
            if (pde.get_time() % dt_save) < pde.get_dt() / 2.
                || (pde.get_time() % dt_save) > dt_save - pde.get_dt() / 2.
            {
                pde.callback();
            }
        }

        // Break
        if pde.get_time() + eps_dt >= max_time {
            log::info!("time limit reached: {:?}", pde.get_time());
            break;
        }
        if timestep >= MAX_TIMESTEP {
            log::info!("timestep limit reached: {:?}", timestep);
            break;
        }
        if pde.exit() {
            log::warn!("break criteria triggered");
            break;
        }
    }
}
