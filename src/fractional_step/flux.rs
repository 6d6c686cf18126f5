//! Element collaborators of the iteration controller
//!
//! [`FluxContributor`] supplies the elemental flux of the end of
//! step correction, [`StateAdvancer`] updates element internal
//! state (stress, strain) once per time step. Closures with the
//! matching signature implement both traits.
use crate::field::Variable;
use crate::mesh::Element;
use crate::process::{Model, ProcessInfo};
use crate::types::TimeLevel;
use ndarray::Array2;

/// Elemental flux contribution to a nodal vector field.
///
/// Called concurrently for different elements.
pub trait FluxContributor: Sync {
    /// Write the contribution of `element` to `target` into `out`,
    /// one row (x, y, z) per element node. `out` is zeroed on entry.
    fn calculate_contribution(
        &self,
        element: &Element,
        target: Variable,
        model: &Model,
        process: &ProcessInfo,
        out: &mut Array2<f64>,
    );
}

impl<F> FluxContributor for F
where
    F: Fn(&Element, Variable, &Model, &ProcessInfo, &mut Array2<f64>) + Sync,
{
    fn calculate_contribution(
        &self,
        element: &Element,
        target: Variable,
        model: &Model,
        process: &ProcessInfo,
        out: &mut Array2<f64>,
    ) {
        self(element, target, model, process, out);
    }
}

/// Update of element internal state at the end of a time step
pub trait StateAdvancer {
    /// Advance the state of `element`
    fn advance_state(&mut self, element: &Element, model: &Model, process: &ProcessInfo);
}

impl<F> StateAdvancer for F
where
    F: FnMut(&Element, &Model, &ProcessInfo),
{
    fn advance_state(&mut self, element: &Element, model: &Model, process: &ProcessInfo) {
        self(element, model, process);
    }
}

/// Elements without internal state
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStateUpdate;

impl StateAdvancer for NoStateUpdate {
    fn advance_state(&mut self, _element: &Element, _model: &Model, _process: &ProcessInfo) {}
}

/// Velocity correction by the gradient of the pressure increment
///
/// $$
/// f_i = - \frac{\delta t}{\rho} \int N_i \nabla \delta p
/// $$
///
/// Divided by the nodal volume this is the lumped projection
/// of the velocity onto the divergence free space.
#[derive(Debug, Clone, Copy)]
pub struct PressureGradientFlux {
    /// Density
    pub density: f64,
}

impl FluxContributor for PressureGradientFlux {
    fn calculate_contribution(
        &self,
        element: &Element,
        _target: Variable,
        model: &Model,
        process: &ProcessInfo,
        out: &mut Array2<f64>,
    ) {
        let grad = match model.mesh.shape_gradients(element) {
            Ok(grad) => grad,
            Err(e) => {
                log::error!("element {}: {}", element.id, e);
                return;
            }
        };
        let dim = model.domain_size().dim();
        let share = model.mesh.measure(element) * model.domain_size().nodal_share();
        let dp = model.fields.field(Variable::PressureIncrement).level(TimeLevel::Current);
        let mut grad_dp = [0.; 3];
        for (j, &node) in element.nodes.iter().enumerate() {
            for d in 0..dim {
                grad_dp[d] += grad[[j, d]] * dp[[node, 0]];
            }
        }
        let c = -process.delta_time / self.density * share;
        for mut row in out.rows_mut() {
            for d in 0..dim {
                row[d] = c * grad_dp[d];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    #[test]
    fn test_pressure_gradient_flux() {
        // single triangle, dp = x
        let mesh = Mesh::rectangle(1, 1, 1., 1.);
        let mut model = Model::new(mesh);
        for node in 0..model.mesh.n_nodes() {
            let x = model.mesh.coordinates()[[node, 0]];
            model
                .fields
                .set(node, Variable::PressureIncrement, 0, TimeLevel::Current, x);
        }
        let process = ProcessInfo::new(0.5);
        let flux = PressureGradientFlux { density: 2. };
        let element = &model.mesh.elements()[0];
        let mut out = Array2::zeros((3, 3));
        flux.calculate_contribution(element, Variable::FractionalVelocity, &model, &process, &mut out);
        // -dt/rho * area/3 * grad(x)
        let expected = -0.5 / 2. * 0.5 / 3.;
        for i in 0..3 {
            assert!((out[[i, 0]] - expected).abs() < 1e-12);
            assert!(out[[i, 1]].abs() < 1e-12);
            assert_eq!(out[[i, 2]], 0.);
        }
    }

    #[test]
    fn test_closures() {
        let model = Model::new(Mesh::rectangle(1, 1, 1., 1.));
        let process = ProcessInfo::new(0.1);
        let flux = |_: &Element, _: Variable, _: &Model, _: &ProcessInfo, out: &mut Array2<f64>| {
            out.fill(1.)
        };
        let mut out = Array2::zeros((3, 3));
        flux.calculate_contribution(&model.mesh.elements()[1], Variable::FractionalVelocity, &model, &process, &mut out);
        assert_eq!(out.sum(), 9.);

        let mut count = 0;
        let mut advancer = |_: &Element, _: &Model, _: &ProcessInfo| count += 1;
        for element in model.mesh.elements() {
            advancer.advance_state(element, &model, &process);
        }
        assert_eq!(count, 2);
    }
}
