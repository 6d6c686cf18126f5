//! Diagonal matrix solver
use super::LinearSolve;
use crate::{Error, Result};
use ndarray::{Array1, Array2, Zip};

/// Solve single diagonal system, off diagonal
/// entries of the matrix are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sdma;

impl LinearSolve for Sdma {
    /// # Example
    ///```
    /// use fracstep::solver::{LinearSolve, Sdma};
    /// use ndarray::prelude::*;
    /// let nx = 6;
    /// let mut matrix = Array2::<f64>::zeros((nx, nx));
    /// for i in 0..nx {
    ///     matrix[[i, i]] = 0.5 * (i + 1) as f64;
    /// }
    /// let data = Array1::from_iter((0..nx).map(|i| i as f64));
    /// let mut result = Array1::<f64>::zeros(nx);
    /// Sdma.solve(&matrix, &data, &mut result).unwrap();
    /// let recover = matrix.dot(&result);
    /// for (a, b) in recover.iter().zip(data.iter()) {
    ///     assert!((a - b).abs() < 1e-10);
    /// }
    ///```
    fn solve(&self, a: &Array2<f64>, b: &Array1<f64>, x: &mut Array1<f64>) -> Result<()> {
        let dia = a.diag();
        if let Some(row) = dia.iter().position(|d| *d == 0.) {
            return Err(Error::Singular(row));
        }
        Zip::from(x).and(b).and(&dia).for_each(|x, &b, &d| *x = b / d);
        Ok(())
    }
}
