//! Iteration controller of one time step
use super::assembly::{MomentumAssembler, PressureAssembler};
use super::convergence::{Convergence, ConvergenceCriterion};
use super::fallback::FallbackPolicy;
use super::flux::{FluxContributor, NoStateUpdate, PressureGradientFlux, StateAdvancer};
use super::projection::calculate_end_of_step_velocity;
use super::sub_solver::{LinearStrategy, SubSolver};
use crate::config::StrategyConfig;
use crate::field::{FieldStore, Variable};
use crate::mpi::{Communicator, Serial};
use crate::process::{FractionalStep, Model, ProcessInfo};
use crate::solver::Solver;
use crate::{Error, Result};
use ndarray::Zip;

/// Iterations below this index never terminate a step as converged
const MIN_CONVERGED_ITERATION: usize = 2;

/// Why the iteration of a time step stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Momentum and continuity converged
    Converged,
    /// Maximum number of iterations reached
    Exhausted,
    /// Fields were restored to the previous time level
    Frozen,
}

/// Result of [`FractionalStepStrategy::solve_solution_step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Reason to stop
    pub termination: Termination,
    /// Number of iterations performed
    pub iterations: usize,
    /// Last momentum solve converged
    pub momentum_converged: bool,
    /// Last continuity solve converged
    pub continuity_converged: bool,
    /// Classification of the last momentum error
    pub velocity: Convergence,
    /// Classification of the last continuity error
    pub pressure: Convergence,
}

impl StepOutcome {
    /// Step is accepted
    pub fn is_converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Fractional step strategy
///
/// Per iteration: momentum solve, continuity solve (skipped
/// if frozen), end of step velocity. Bad sub-solves are handled
/// by the [`FallbackPolicy`].
pub struct FractionalStepStrategy {
    config: StrategyConfig,
    momentum: Box<dyn SubSolver>,
    continuity: Box<dyn SubSolver>,
    flux: Box<dyn FluxContributor>,
    state: Box<dyn StateAdvancer>,
    comm: Box<dyn Communicator>,
    policy: FallbackPolicy,
    velocity_criterion: ConvergenceCriterion,
    pressure_criterion: ConvergenceCriterion,
}

impl FractionalStepStrategy {
    /// New strategy from its collaborators. Elements carry no
    /// state and the run is serial, see [`Self::with_state_advancer`]
    /// and [`Self::with_communicator`].
    pub fn new(
        config: StrategyConfig,
        momentum: Box<dyn SubSolver>,
        continuity: Box<dyn SubSolver>,
        flux: Box<dyn FluxContributor>,
    ) -> Self {
        let policy = FallbackPolicy::new(&config);
        let velocity_criterion = ConvergenceCriterion::new(Variable::Velocity, config.velocity_tolerance);
        let pressure_criterion = ConvergenceCriterion::new(Variable::Pressure, config.pressure_tolerance);
        Self {
            config,
            momentum,
            continuity,
            flux,
            state: Box::new(NoStateUpdate),
            comm: Box::new(Serial),
            policy,
            velocity_criterion,
            pressure_criterion,
        }
    }

    /// Incompressible flow with the linear simplex assemblers
    /// and the pressure gradient correction.
    pub fn incompressible(config: StrategyConfig, viscosity: f64, density: f64) -> Self {
        let dim = config.domain_size.dim();
        let momentum = LinearStrategy::new(
            Variable::Velocity,
            dim,
            MomentumAssembler { viscosity, density },
            Solver::from(config.linear_solver),
        );
        let continuity = LinearStrategy::new(
            Variable::Pressure,
            1,
            PressureAssembler { density },
            Solver::from(config.linear_solver),
        )
        .with_increment(Variable::PressureIncrement);
        Self::new(
            config,
            Box::new(momentum),
            Box::new(continuity),
            Box::new(PressureGradientFlux { density }),
        )
    }

    /// Replace the element state update
    pub fn with_state_advancer(mut self, state: Box<dyn StateAdvancer>) -> Self {
        self.state = state;
        self
    }

    /// Replace the communicator
    pub fn with_communicator(mut self, comm: Box<dyn Communicator>) -> Self {
        self.comm = comm;
        self
    }

    /// Configuration
    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Communicator
    pub fn comm(&self) -> &dyn Communicator {
        self.comm.as_ref()
    }

    /// Validate configuration, mesh and process context
    ///
    /// # Errors
    /// First inconsistency found
    pub fn check(&self, model: &Model, process: &ProcessInfo) -> Result<()> {
        self.config.validate()?;
        if model.domain_size() != self.config.domain_size {
            return Err(Error::config(
                "domain_size",
                usize::from(self.config.domain_size),
                "differs from the mesh",
            ));
        }
        model.mesh.check()?;
        if model.fields.n_nodes() != model.mesh.n_nodes() {
            return Err(Error::SizeMismatch {
                name: "nodal fields".to_owned(),
                expected: model.mesh.n_nodes(),
                actual: model.fields.n_nodes(),
            });
        }
        if !(process.delta_time > 0. && process.delta_time.is_finite()) {
            return Err(Error::config(
                "delta_time",
                process.delta_time,
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Iterate one time step.
    ///
    /// The previous time level must hold the last converged
    /// step and the current level the predictor. The step never
    /// terminates as converged before the fourth iteration.
    pub fn solve_solution_step(&mut self, model: &mut Model, process: &mut ProcessInfo) -> StepOutcome {
        let max_iterations = self.config.max_iterations;
        let mut frozen = false;
        let mut momentum_converged = false;
        let mut continuity_converged = false;
        let mut termination = Termination::Exhausted;
        let mut iterations = 0;
        let mut velocity = Convergence::NotConverged;
        let mut pressure = Convergence::NotConverged;

        for it in 0..max_iterations {
            iterations = it + 1;
            log::debug!("fractional step iteration {}", it);
            if it == 0 {
                self.momentum.initialize_step(model, process);
                self.continuity.initialize_step(model, process);
            }

            process.fractional_step = FractionalStep::Momentum;
            let dv = self.momentum.solve(model, process);
            let report = self.velocity_criterion.evaluate(dv, &model.fields, self.comm.as_ref());
            velocity = report.convergence;
            momentum_converged =
                self.policy
                    .check_momentum(report.relative_error, process, &mut model.fields, &mut frozen);

            if !frozen {
                process.fractional_step = FractionalStep::Continuity;
                let dp = self.continuity.solve(model, process);
                let report = self.pressure_criterion.evaluate(dp, &model.fields, self.comm.as_ref());
                pressure = report.convergence;
                continuity_converged = self.policy.check_continuity(
                    report.relative_error,
                    process,
                    &mut model.fields,
                    &mut frozen,
                );
            }

            process.fractional_step = FractionalStep::Projection;
            calculate_end_of_step_velocity(model, process, self.flux.as_ref(), self.comm.as_ref());

            let converged = momentum_converged && continuity_converged && it > MIN_CONVERGED_ITERATION;
            // the last iteration updates even if it froze
            if converged || it + 1 == max_iterations {
                self.update_state(model, process);
            }
            if converged {
                log::info!("fractional step converged in {} iterations", iterations);
                process.bad_velocity_convergence = false;
                process.bad_pressure_convergence = false;
                termination = Termination::Converged;
                break;
            }
            if frozen {
                termination = Termination::Frozen;
                break;
            }
        }

        if !momentum_converged && !continuity_converged {
            log::warn!(
                "neither velocity nor pressure converged within {} iterations",
                iterations
            );
        }
        if velocity == Convergence::Invalid || pressure == Convergence::Invalid {
            log::warn!("invalid error norm, velocity: {:?}, pressure: {:?}", velocity, pressure);
        }
        if self.config.reform_dof_set {
            self.momentum.clear();
            self.continuity.clear();
        }
        StepOutcome {
            termination,
            iterations,
            momentum_converged,
            continuity_converged,
            velocity,
            pressure,
        }
    }

    fn update_state(&mut self, model: &mut Model, process: &mut ProcessInfo) {
        process.fractional_step = FractionalStep::StateUpdate;
        for element in model.mesh.elements() {
            self.state.advance_state(element, model, process);
        }
        update_accelerations(&mut model.fields, process.delta_time);
    }
}

/// Nodal accelerations from the velocity history
/// $$
/// a = \frac{2 (v - v^n)}{\delta t} - a^n
/// $$
pub fn update_accelerations(fields: &mut FieldStore, delta_time: f64) {
    let velocity = fields.field(Variable::Velocity);
    let dv = &velocity.v - &velocity.v_old;
    let acceleration = fields.field_mut(Variable::Acceleration);
    Zip::from(&mut acceleration.v)
        .and(&acceleration.v_old)
        .and(&dv)
        .par_for_each(|a, &a_old, &dv| *a = 2. * dv / delta_time - a_old);
}
