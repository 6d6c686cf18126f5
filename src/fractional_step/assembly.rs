//! Linear simplex assembly of the momentum and continuity step
//!
//! Both assemblers are residual based: `rhs` holds the negative
//! residual at the current level and `lhs` its derivative, thus
//! fixed dofs enter through the current values and the solution
//! is the update of the free dofs.
use super::sub_solver::DofSet;
use crate::field::Variable;
use crate::process::{Model, ProcessInfo};
use crate::types::TimeLevel;
use crate::Result;
use ndarray::{Array1, Array2};

/// Assembly of a sub-problem at its free dofs
pub trait Assemble {
    /// Add the elemental contributions to `lhs` and `rhs`,
    /// both are zeroed on entry.
    ///
    /// # Errors
    /// Degenerate element
    fn assemble(
        &self,
        model: &Model,
        process: &ProcessInfo,
        dofs: &DofSet,
        lhs: &mut Array2<f64>,
        rhs: &mut Array1<f64>,
    ) -> Result<()>;
}

/// Implicit momentum equation with lumped mass
/// $$
/// \frac{u - u^n}{\delta t} + (a \cdot \nabla) u - \nu \nabla^2 u
/// + \frac{1}{\rho} \nabla p = 0
/// $$
/// The convective velocity `a` is the element mean of the
/// current velocity, it is updated every iteration.
#[derive(Debug, Clone, Copy)]
pub struct MomentumAssembler {
    /// Kinematic viscosity
    pub viscosity: f64,
    /// Density
    pub density: f64,
}

impl Assemble for MomentumAssembler {
    fn assemble(
        &self,
        model: &Model,
        process: &ProcessInfo,
        dofs: &DofSet,
        lhs: &mut Array2<f64>,
        rhs: &mut Array1<f64>,
    ) -> Result<()> {
        let dim = model.domain_size().dim();
        let share = model.domain_size().nodal_share();
        let dt = process.delta_time;
        let velocity = model.fields.field(Variable::Velocity);
        let (u, u_old) = (&velocity.v, &velocity.v_old);
        let p = model.fields.field(Variable::Pressure).level(TimeLevel::Current);
        for element in model.mesh.elements() {
            let grad = model.mesh.shape_gradients(element)?;
            let measure = model.mesh.measure(element);
            let mass = measure * share;
            let n = element.nodes.len();

            // convective velocity and pressure gradient
            let mut a = [0.; 3];
            let mut grad_p = [0.; 3];
            for (j, &node) in element.nodes.iter().enumerate() {
                for d in 0..dim {
                    a[d] += u[[node, d]] / n as f64;
                    grad_p[d] += grad[[j, d]] * p[[node, 0]];
                }
            }

            for (i, &ni) in element.nodes.iter().enumerate() {
                for d in 0..dim {
                    let row = match dofs.equation_id(ni, d) {
                        Some(row) => row,
                        None => continue,
                    };
                    lhs[[row, row]] += mass / dt;
                    rhs[row] -= mass / dt * (u[[ni, d]] - u_old[[ni, d]]);
                    rhs[row] -= mass * grad_p[d] / self.density;
                    for (j, &nj) in element.nodes.iter().enumerate() {
                        let mut k = 0.;
                        let mut c = 0.;
                        for e in 0..dim {
                            k += grad[[i, e]] * grad[[j, e]];
                            c += a[e] * grad[[j, e]];
                        }
                        let kij = self.viscosity * measure * k + mass * c;
                        rhs[row] -= kij * u[[nj, d]];
                        if let Some(col) = dofs.equation_id(nj, d) {
                            lhs[[row, col]] += kij;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Pressure Poisson equation of the increment
/// $$
/// \frac{\delta t}{\rho} \nabla^2 \delta p = \nabla \cdot u
/// $$
/// with homogeneous Neumann condition at free boundaries. At
/// least one pressure dof must be fixed.
#[derive(Debug, Clone, Copy)]
pub struct PressureAssembler {
    /// Density
    pub density: f64,
}

impl Assemble for PressureAssembler {
    fn assemble(
        &self,
        model: &Model,
        process: &ProcessInfo,
        dofs: &DofSet,
        lhs: &mut Array2<f64>,
        rhs: &mut Array1<f64>,
    ) -> Result<()> {
        let dim = model.domain_size().dim();
        let share = model.domain_size().nodal_share();
        let c = process.delta_time / self.density;
        let u = model.fields.field(Variable::Velocity).level(TimeLevel::Current);
        for element in model.mesh.elements() {
            let grad = model.mesh.shape_gradients(element)?;
            let measure = model.mesh.measure(element);
            let mut div = 0.;
            for (j, &node) in element.nodes.iter().enumerate() {
                for d in 0..dim {
                    div += grad[[j, d]] * u[[node, d]];
                }
            }
            for (i, &ni) in element.nodes.iter().enumerate() {
                let row = match dofs.equation_id(ni, 0) {
                    Some(row) => row,
                    None => continue,
                };
                rhs[row] -= measure * share * div;
                for (j, &nj) in element.nodes.iter().enumerate() {
                    if let Some(col) = dofs.equation_id(nj, 0) {
                        let mut k = 0.;
                        for e in 0..dim {
                            k += grad[[i, e]] * grad[[j, e]];
                        }
                        lhs[[row, col]] += c * measure * k;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    fn approx_eq(result: f64, expected: f64) {
        let dif = 1e-10;
        if (result - expected).abs() > dif {
            panic!("Large difference of values, got {} expected {}.", result, expected)
        }
    }

    #[test]
    fn test_momentum_at_rest_has_zero_residual() {
        let model = Model::new(Mesh::rectangle(2, 2, 1., 1.));
        let process = ProcessInfo::new(0.1);
        let dofs = DofSet::new(&model.fields, Variable::Velocity, 2);
        let n = dofs.len();
        let (mut lhs, mut rhs) = (Array2::zeros((n, n)), Array1::zeros(n));
        let assembler = MomentumAssembler {
            viscosity: 0.1,
            density: 1.,
        };
        assembler
            .assemble(&model, &process, &dofs, &mut lhs, &mut rhs)
            .unwrap();
        assert_eq!(rhs.iter().map(|x| x.abs()).sum::<f64>(), 0.);
        // lumped mass over dt on the diagonal, total area 1 per component
        let mass: f64 = (0..n).map(|i| lhs[[i, i]]).sum();
        assert!(mass > 2. / 0.1);
        // viscous rows sum to zero, only the mass remains
        approx_eq(lhs.sum(), 2. / 0.1);
    }

    #[test]
    fn test_pressure_rhs_is_negative_divergence() {
        // u = (x, 0) has divergence one
        let mut model = Model::new(Mesh::rectangle(2, 2, 1., 1.));
        for node in 0..model.mesh.n_nodes() {
            let x = model.mesh.coordinates()[[node, 0]];
            model
                .fields
                .set(node, Variable::Velocity, 0, TimeLevel::Current, x);
        }
        let process = ProcessInfo::new(0.5);
        let dofs = DofSet::new(&model.fields, Variable::Pressure, 1);
        let n = dofs.len();
        let (mut lhs, mut rhs) = (Array2::zeros((n, n)), Array1::zeros(n));
        PressureAssembler { density: 1. }
            .assemble(&model, &process, &dofs, &mut lhs, &mut rhs)
            .unwrap();
        approx_eq(rhs.sum(), -1.);
        // pure Neumann laplacian, rows sum to zero
        for row in lhs.rows() {
            approx_eq(row.sum(), 0.);
        }
        approx_eq(lhs[[4, 4]], 0.5 * 4.);
    }
}
