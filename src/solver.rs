//! # Collection of linear algebra Solver
//!
//! Backends of the reference sub-solvers, all solve the small
//! assembled system `a x = b` of one sub-step.
#![allow(clippy::module_name_repetitions)]
pub mod dense;
pub mod jacobi;
pub mod sdma;
pub use dense::Dense;
pub use jacobi::Jacobi;
use ndarray::{Array1, Array2};
pub use sdma::Sdma;
use serde::{Deserialize, Serialize};

/// Solve linear algebraic systems of the form: a x = b.
#[enum_dispatch]
pub trait LinearSolve {
    /// Solves a x = b. On entry `x` holds the initial guess,
    /// which is used by iterative solvers only.
    ///
    /// # Errors
    /// Singular system, or iterative solver did not converge
    fn solve(&self, a: &Array2<f64>, b: &Array1<f64>, x: &mut Array1<f64>) -> crate::Result<()>;
}

/// Collection of Linalg Solver
#[enum_dispatch(LinearSolve)]
#[derive(Clone, Debug)]
pub enum Solver {
    /// Main diagonal only (lumped systems)
    Sdma(Sdma),
    /// Direct LU factorization
    Dense(Dense),
    /// Jacobi iteration
    Jacobi(Jacobi),
}

/// Backend selection in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// See [`Sdma`]
    Diagonal,
    /// See [`Dense`]
    Dense,
    /// See [`Jacobi`] with its default parameters
    Jacobi,
}

impl Default for SolverKind {
    fn default() -> Self {
        Self::Dense
    }
}

impl From<SolverKind> for Solver {
    fn from(kind: SolverKind) -> Self {
        match kind {
            SolverKind::Diagonal => Sdma.into(),
            SolverKind::Dense => Dense.into(),
            SolverKind::Jacobi => Jacobi::default().into(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    pub(crate) fn approx_eq(result: &Array1<f64>, expected: &Array1<f64>) {
        let dif = 1e-8;
        for (a, b) in expected.iter().zip(result.iter()) {
            if (a - b).abs() > dif {
                panic!("Large difference of values, got {} expected {}.", b, a)
            }
        }
    }

    /// Diagonally dominant test system
    pub(crate) fn system() -> (Array2<f64>, Array1<f64>) {
        let a = array![[4., -1., 0.], [-1., 4., -1.], [0., -1., 4.]];
        let b = array![3., 2., 3.];
        (a, b)
    }

    #[test]
    fn test_dispatch_from_kind() {
        let (a, b) = system();
        for kind in [SolverKind::Dense, SolverKind::Jacobi] {
            let solver = Solver::from(kind);
            let mut x = Array1::zeros(3);
            solver.solve(&a, &b, &mut x).unwrap();
            approx_eq(&x, &array![1., 1., 1.]);
        }
    }
}
