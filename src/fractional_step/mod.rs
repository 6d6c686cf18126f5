//! # Fractional step
//! Velocity-pressure splitting of one time step of an
//! incompressible flow.
//!
//! Each iteration solves the momentum equation for the velocity,
//! the continuity equation for a pressure increment and corrects
//! the velocity with the elemental flux of that increment. The
//! [`FractionalStepStrategy`] drives the iterations and decides
//! after every sub-solve whether the step is accepted, iterated
//! further or frozen at the previous time level.
//!
//! # Example
//! Lid driven cavity, see also `src/main.rs`
//! ```ignore
//! use fracstep::config::SimulationConfig;
//! use fracstep::fractional_step::Simulation;
//! use fracstep::integrate;
//!
//! let config = SimulationConfig::default();
//! let mut simulation = Simulation::lid_driven_cavity(&config).unwrap();
//! integrate(&mut simulation, config.max_time, config.save_intervall);
//! ```
pub mod assembly;
pub mod convergence;
pub mod fallback;
pub mod flux;
pub mod projection;
pub mod simulation;
pub mod strategy;
pub mod sub_solver;
pub use assembly::{Assemble, MomentumAssembler, PressureAssembler};
pub use convergence::{relative_error, Convergence, ConvergenceCriterion, ConvergenceReport, ZERO_TOL};
pub use fallback::{is_bad_convergence, FallbackPolicy};
pub use flux::{FluxContributor, NoStateUpdate, PressureGradientFlux, StateAdvancer};
pub use projection::calculate_end_of_step_velocity;
pub use simulation::Simulation;
pub use strategy::{FractionalStepStrategy, StepOutcome, Termination};
pub use sub_solver::{DofSet, LinearStrategy, SubSolver};
