//! Direct solver, LU factorization by lapack
use super::LinearSolve;
use crate::Result;
use ndarray::{Array1, Array2};
use ndarray_linalg::Solve;

/// Dense LU solver
#[derive(Debug, Clone, Copy, Default)]
pub struct Dense;

impl LinearSolve for Dense {
    fn solve(&self, a: &Array2<f64>, b: &Array1<f64>, x: &mut Array1<f64>) -> Result<()> {
        if a.is_empty() {
            return Ok(());
        }
        x.assign(&Solve::solve(a, b)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::tests::{approx_eq, system};
    use ndarray::array;

    #[test]
    fn test_dense() {
        let (a, b) = system();
        let mut x = Array1::zeros(3);
        Dense.solve(&a, &b, &mut x).unwrap();
        approx_eq(&x, &array![1., 1., 1.]);
    }

    #[test]
    fn test_dense_singular() {
        let a = array![[1., 2.], [2., 4.]];
        let mut x = Array1::zeros(2);
        assert!(Dense.solve(&a, &array![1., 1.], &mut x).is_err());
    }
}
