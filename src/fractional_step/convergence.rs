//! Relative error of a sub-solve and its classification
use crate::field::{FieldStore, Variable};
use crate::mpi::Communicator;
use crate::types::TimeLevel;
use num_traits::Float;

/// Reference norms below this value are treated as zero
pub const ZERO_TOL: f64 = 1e-12;

/// Increment norm relative to the reference norm.
///
/// Falls back to the absolute increment if the reference
/// is below [`ZERO_TOL`], e.g. for a field at rest.
///
/// # Example
/// ```
/// use fracstep::fractional_step::relative_error;
/// assert_eq!(relative_error(1e-3, 0.), 1e-3);
/// assert_eq!(relative_error(1e-3, 2.), 5e-4);
/// ```
pub fn relative_error<T: Float>(increment_norm: T, reference_norm: T) -> T {
    let zero_tol = T::from(ZERO_TOL).unwrap_or_else(T::min_positive_value);
    if reference_norm < zero_tol {
        increment_norm
    } else {
        increment_norm / reference_norm
    }
}

/// Outcome of a convergence check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    /// Relative error below tolerance
    Converged,
    /// Finite relative error above tolerance
    NotConverged,
    /// Relative error is NaN or infinite
    Invalid,
}

impl Convergence {
    /// Classify a relative error
    pub fn classify<T: Float>(error: T, tolerance: T) -> Self {
        if !error.is_finite() {
            Self::Invalid
        } else if error < tolerance {
            Self::Converged
        } else {
            Self::NotConverged
        }
    }

    /// True for [`Convergence::Converged`]
    pub fn is_converged(self) -> bool {
        self == Self::Converged
    }
}

/// Result of [`ConvergenceCriterion::evaluate`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceReport {
    /// Norm of the sub-solve update
    pub increment_norm: f64,
    /// Global norm of the updated field
    pub reference_norm: f64,
    /// See [`relative_error`]
    pub relative_error: f64,
    /// Classification against the tolerance
    pub convergence: Convergence,
}

/// Convergence check of one sub-problem
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceCriterion {
    /// Field updated by the sub-solve
    pub variable: Variable,
    /// Relative tolerance
    pub tolerance: f64,
}

impl ConvergenceCriterion {
    /// New criterion
    pub fn new(variable: Variable, tolerance: f64) -> Self {
        Self {
            variable,
            tolerance,
        }
    }

    /// Relate an increment norm to the current norm of the field.
    ///
    /// The reference norm is summed over all components and
    /// reduced over all partitions before the square root.
    pub fn evaluate(
        &self,
        increment_norm: f64,
        fields: &FieldStore,
        comm: &dyn Communicator,
    ) -> ConvergenceReport {
        let reference_norm = fields.norm_l2(self.variable, TimeLevel::Current, comm);
        let relative_error = relative_error(increment_norm, reference_norm);
        let convergence = Convergence::classify(relative_error, self.tolerance);
        log::debug!(
            "{}: |dx| = {:e}  |x| = {:e}  error = {:e}",
            self.variable.name(),
            increment_norm,
            reference_norm,
            relative_error
        );
        ConvergenceReport {
            increment_norm,
            reference_norm,
            relative_error,
            convergence,
        }
    }
}
