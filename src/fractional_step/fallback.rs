//! Treatment of bad sub-solves
//!
//! A sub-solve is *bad* when its relative error exceeds a
//! minimum tolerance or is not a number. Bad results set the
//! corresponding flag of the [`ProcessInfo`], which an adaptive
//! time stepper may read. Very bad results *freeze* the step:
//! velocity, pressure and acceleration are reset to the previous
//! time level and the iteration stops.
use crate::config::{FallbackMode, FallbackThresholds, StrategyConfig};
use crate::field::{FieldStore, Variable, ROLLBACK_VARIABLES};
use crate::process::ProcessInfo;

/// Decision predicate for a bad sub-solve.
///
/// An error of exactly zero is never bad, an error of exactly
/// one is only bad after the first time step.
#[allow(clippy::neg_cmp_op_on_partial_ord, clippy::nonminimal_bool)]
pub fn is_bad_convergence(error: f64, min_tolerance: f64, time: f64, delta_time: f64) -> bool {
    // unordered comparison, true for no value
    let unordered = error < 0. && error > 0.;
    (error > min_tolerance || unordered || error.is_nan())
        && error != 0.
        && (error != 1. || time > delta_time)
}

/// Thresholds and mode of the fallback
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    mode: FallbackMode,
    thresholds: FallbackThresholds,
    velocity_tolerance: f64,
    pressure_tolerance: f64,
}

impl FallbackPolicy {
    /// Policy from strategy configuration
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            mode: config.fallback,
            thresholds: config.thresholds.clone(),
            velocity_tolerance: config.velocity_tolerance,
            pressure_tolerance: config.pressure_tolerance,
        }
    }

    /// Minimum tolerance, widened during the warm-up
    fn min_tolerance(&self, steady: f64, process: &ProcessInfo) -> f64 {
        if process.is_warm_up(self.thresholds.warm_up_steps) {
            self.thresholds.warm_up_tolerance
        } else {
            steady
        }
    }

    /// Check the relative error of the momentum solve.
    ///
    /// Returns true if the momentum solve converged.
    pub fn check_momentum(
        &self,
        error: f64,
        process: &mut ProcessInfo,
        fields: &mut FieldStore,
        frozen: &mut bool,
    ) -> bool {
        let (time, dt) = (process.time, process.delta_time);
        let bad = match self.mode {
            FallbackMode::FixTimeStep => {
                let min_tolerance = self.min_tolerance(self.thresholds.momentum_tolerance, process);
                is_bad_convergence(error, min_tolerance, time, dt)
            }
            FallbackMode::Iterative => {
                is_bad_convergence(error, self.thresholds.iterative_tolerance, time, dt)
            }
        };
        if bad {
            log::warn!("bad momentum convergence, error = {:e}", error);
            process.bad_velocity_convergence = true;
            let freeze = match self.mode {
                FallbackMode::FixTimeStep => {
                    error > self.thresholds.momentum_freeze || error.is_nan()
                }
                FallbackMode::Iterative => true,
            };
            if freeze {
                Self::freeze(fields, frozen);
            }
            false
        } else {
            process.bad_velocity_convergence = false;
            error < self.velocity_tolerance
        }
    }

    /// Check the relative error of the continuity solve.
    ///
    /// Returns true if the continuity solve converged, which
    /// also releases a freeze.
    pub fn check_continuity(
        &self,
        error: f64,
        process: &mut ProcessInfo,
        fields: &mut FieldStore,
        frozen: &mut bool,
    ) -> bool {
        if self.mode == FallbackMode::FixTimeStep {
            let min_tolerance = self.min_tolerance(self.thresholds.continuity_tolerance, process);
            if is_bad_convergence(error, min_tolerance, process.time, process.delta_time) {
                log::warn!("bad continuity convergence, error = {:e}", error);
                process.bad_pressure_convergence = true;
                if error > self.thresholds.continuity_freeze || error.is_nan() {
                    Self::freeze(fields, frozen);
                }
                return false;
            }
        }
        process.bad_pressure_convergence = false;
        let converged = error < self.pressure_tolerance;
        if converged {
            *frozen = false;
        }
        converged
    }

    /// Roll back to the previous time level. The pressure
    /// increment of the discarded solve is cleared as well.
    fn freeze(fields: &mut FieldStore, frozen: &mut bool) {
        log::warn!("freeze time step, restore previous time level");
        *frozen = true;
        fields.restore_previous(&ROLLBACK_VARIABLES);
        fields.set_to_zero(Variable::PressureIncrement);
    }
}
