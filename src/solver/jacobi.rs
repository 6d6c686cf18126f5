//! Jacobi iteration
use super::LinearSolve;
use crate::{Error, Result};
use ndarray::{Array1, Array2, Zip};

/// Jacobi iterative solver, converges for diagonally
/// dominant matrices.
#[derive(Debug, Clone, Copy)]
pub struct Jacobi {
    /// Maximum number of sweeps
    pub max_iterations: usize,
    /// Tolerance of the residual norm, relative to `|b|`
    pub tolerance: f64,
}

impl Default for Jacobi {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-12,
        }
    }
}

impl LinearSolve for Jacobi {
    fn solve(&self, a: &Array2<f64>, b: &Array1<f64>, x: &mut Array1<f64>) -> Result<()> {
        let dia = a.diag();
        if let Some(row) = dia.iter().position(|d| *d == 0.) {
            return Err(Error::Singular(row));
        }
        let norm_b = b.dot(b).sqrt().max(f64::MIN_POSITIVE);
        let mut residual = f64::INFINITY;
        for _ in 0..self.max_iterations {
            let r = b - &a.dot(&*x);
            residual = r.dot(&r).sqrt() / norm_b;
            if residual < self.tolerance {
                return Ok(());
            }
            Zip::from(&mut *x)
                .and(&r)
                .and(&dia)
                .par_for_each(|x, &r, &d| *x += r / d);
        }
        Err(Error::NotConverged {
            iterations: self.max_iterations,
            residual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::tests::{approx_eq, system};
    use ndarray::array;

    #[test]
    fn test_jacobi() {
        let (a, b) = system();
        let mut x = Array1::zeros(3);
        Jacobi::default().solve(&a, &b, &mut x).unwrap();
        approx_eq(&x, &array![1., 1., 1.]);
    }

    #[test]
    fn test_jacobi_not_converged() {
        // not diagonally dominant, iteration diverges
        let a = array![[1., 3.], [3., 1.]];
        let mut x = Array1::zeros(2);
        let solver = Jacobi {
            max_iterations: 20,
            tolerance: 1e-12,
        };
        assert!(matches!(
            solver.solve(&a, &array![1., 1.], &mut x),
            Err(Error::NotConverged { iterations: 20, .. })
        ));
    }
}
