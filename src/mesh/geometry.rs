//! Measure and linear shape function gradients of simplex elements
use crate::types::DomainSize;
use crate::Result;
use ndarray::{s, Array2, ArrayBase, Data, Ix2};
use ndarray_linalg::Inverse;

/// Area of a triangle (2-D) or volume of a tetrahedron (3-D).
///
/// `x` holds one row of (x, y, z) coordinates per element node.
pub fn measure<S: Data<Elem = f64>>(domain: DomainSize, x: &ArrayBase<S, Ix2>) -> f64 {
    match domain {
        DomainSize::Two => {
            let e1 = [x[[1, 0]] - x[[0, 0]], x[[1, 1]] - x[[0, 1]], x[[1, 2]] - x[[0, 2]]];
            let e2 = [x[[2, 0]] - x[[0, 0]], x[[2, 1]] - x[[0, 1]], x[[2, 2]] - x[[0, 2]]];
            let c = cross(&e1, &e2);
            0.5 * (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt()
        }
        DomainSize::Three => {
            let e = jacobian(domain, x);
            let det = e[[0, 0]] * (e[[1, 1]] * e[[2, 2]] - e[[1, 2]] * e[[2, 1]])
                - e[[0, 1]] * (e[[1, 0]] * e[[2, 2]] - e[[1, 2]] * e[[2, 0]])
                + e[[0, 2]] * (e[[1, 0]] * e[[2, 1]] - e[[1, 1]] * e[[2, 0]]);
            det.abs() / 6.
        }
    }
}

/// Gradients of the linear shape functions, one row per node.
///
/// # Errors
/// Degenerate element (singular jacobian)
pub fn shape_gradients<S: Data<Elem = f64>>(
    domain: DomainSize,
    x: &ArrayBase<S, Ix2>,
) -> Result<Array2<f64>> {
    let dim = domain.dim();
    // d x_d / d xi_i = jac[[i, d]], thus grad_x N = jac^-1 grad_xi N
    let jac_inv = jacobian(domain, x).inv()?;
    let mut grad = Array2::<f64>::zeros((dim + 1, dim));
    for i in 0..dim {
        grad.slice_mut(s![i + 1, ..]).assign(&jac_inv.column(i));
    }
    let first = -grad.slice(s![1.., ..]).sum_axis(ndarray::Axis(0));
    grad.slice_mut(s![0, ..]).assign(&first);
    Ok(grad)
}

/// Edge vectors from node 0, one row per reference direction
fn jacobian<S: Data<Elem = f64>>(domain: DomainSize, x: &ArrayBase<S, Ix2>) -> Array2<f64> {
    let dim = domain.dim();
    let mut jac = Array2::<f64>::zeros((dim, dim));
    for i in 0..dim {
        for d in 0..dim {
            jac[[i, d]] = x[[i + 1, d]] - x[[0, d]];
        }
    }
    jac
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn approx_eq(result: f64, expected: f64) {
        let dif = 1e-10;
        if (result - expected).abs() > dif {
            panic!("Large difference of values, got {} expected {}.", result, expected)
        }
    }

    #[test]
    fn test_measure_unit_triangle() {
        let x = array![[0., 0., 0.], [1., 0., 0.], [0., 1., 0.]];
        approx_eq(measure(DomainSize::Two, &x), 0.5);
        // orientation does not matter
        let x = array![[0., 0., 0.], [0., 1., 0.], [1., 0., 0.]];
        approx_eq(measure(DomainSize::Two, &x), 0.5);
    }

    #[test]
    fn test_measure_unit_tetrahedron() {
        let x = array![[0., 0., 0.], [1., 0., 0.], [0., 1., 0.], [0., 0., 1.]];
        approx_eq(measure(DomainSize::Three, &x), 1. / 6.);
    }

    #[test]
    fn test_shape_gradients_triangle() {
        let x = array![[0., 0., 0.], [2., 0., 0.], [0., 1., 0.]];
        let grad = shape_gradients(DomainSize::Two, &x).unwrap();
        // N1 = x/2, N2 = y, N0 = 1 - x/2 - y
        approx_eq(grad[[1, 0]], 0.5);
        approx_eq(grad[[1, 1]], 0.);
        approx_eq(grad[[2, 0]], 0.);
        approx_eq(grad[[2, 1]], 1.);
        approx_eq(grad[[0, 0]], -0.5);
        approx_eq(grad[[0, 1]], -1.);
    }

    #[test]
    fn test_shape_gradients_sum_to_zero_tetrahedron() {
        let x = array![[0., 0., 0.], [1., 0., 0.], [0.3, 1., 0.], [0.2, 0.1, 2.]];
        let grad = shape_gradients(DomainSize::Three, &x).unwrap();
        for d in 0..3 {
            approx_eq(grad.column(d).sum(), 0.);
        }
    }

    #[test]
    fn test_shape_gradients_degenerate() {
        let x = array![[0., 0., 0.], [1., 0., 0.], [2., 0., 0.]];
        assert!(shape_gradients(DomainSize::Two, &x).is_err());
    }
}
