//! End of step velocity
//!
//! Elemental fluxes are accumulated at the nodes together with
//! the lumped nodal volume, the free velocity components are then
//! corrected by the flux per volume:
//! $$
//! u_i \mathrel{+}= \frac{f_i}{V_i}
//! $$
use super::flux::FluxContributor;
use crate::field::Variable;
use crate::mpi::Communicator;
use crate::process::{Model, ProcessInfo};
use crate::types::TimeLevel;
use ndarray::{Array1, Array2, Zip};
use rayon::prelude::*;

/// Correct the velocity by the elemental fluxes of `flux`.
///
/// Stores the accumulated fluxes in [`Variable::FractionalVelocity`]
/// and the lumped measure in [`Variable::NodalVolume`]. Fixed
/// velocity components are not modified. Nodes without volume
/// must not exist (see [`crate::mesh::Mesh::check`]).
pub fn calculate_end_of_step_velocity(
    model: &mut Model,
    process: &ProcessInfo,
    flux: &dyn FluxContributor,
    comm: &dyn Communicator,
) {
    let norm_before = model
        .fields
        .norm_l2(Variable::Velocity, TimeLevel::Current, comm);
    model.fields.set_to_zero(Variable::FractionalVelocity);
    model.fields.set_to_zero(Variable::NodalVolume);

    let (mut fract_vel, volume) = accumulate(model, process, flux);
    comm.assemble(&mut fract_vel);

    let dim = model.domain_size().dim();
    let velocity = model.fields.field_mut(Variable::Velocity);
    Zip::from(velocity.v.rows_mut())
        .and(velocity.fixed.rows())
        .and(fract_vel.rows())
        .and(&volume)
        .par_for_each(|mut v, fixed, f, &vol| {
            for d in 0..dim {
                if !fixed[d] {
                    v[d] += f[d] / vol;
                }
            }
        });

    model
        .fields
        .field_mut(Variable::FractionalVelocity)
        .v
        .assign(&fract_vel);
    model
        .fields
        .field_mut(Variable::NodalVolume)
        .v
        .column_mut(0)
        .assign(&volume);

    let norm_after = model
        .fields
        .norm_l2(Variable::Velocity, TimeLevel::Current, comm);
    log::debug!(
        "end of step velocity: |u| = {:e} -> {:e}",
        norm_before,
        norm_after
    );
}

/// Elemental contributions summed at the nodes. Every worker
/// scatters into its own partial arrays, which are summed up.
fn accumulate(
    model: &Model,
    process: &ProcessInfo,
    flux: &dyn FluxContributor,
) -> (Array2<f64>, Array1<f64>) {
    let n_nodes = model.mesh.n_nodes();
    let domain = model.domain_size();
    let share = domain.nodal_share();
    let zeros = || (Array2::<f64>::zeros((n_nodes, 3)), Array1::<f64>::zeros(n_nodes));
    model
        .mesh
        .elements()
        .par_iter()
        .fold(zeros, |(mut fract_vel, mut volume), element| {
            let mut out = Array2::<f64>::zeros((element.nodes.len(), 3));
            flux.calculate_contribution(
                element,
                Variable::FractionalVelocity,
                model,
                process,
                &mut out,
            );
            let nodal_measure = model.mesh.measure(element) * share;
            for (i, &node) in element.nodes.iter().enumerate() {
                let mut row = fract_vel.row_mut(node);
                row += &out.row(i);
                volume[node] += nodal_measure;
            }
            (fract_vel, volume)
        })
        .reduce(zeros, |(a, va), (b, vb)| (a + b, va + vb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Element, Mesh};
    use crate::mpi::Serial;
    use crate::types::DomainSize;

    fn approx_eq(result: f64, expected: f64) {
        let dif = 1e-10;
        if (result - expected).abs() > dif {
            panic!("Large difference of values, got {} expected {}.", result, expected)
        }
    }

    fn unit_flux(_: &Element, _: Variable, _: &Model, _: &ProcessInfo, out: &mut Array2<f64>) {
        out.fill(1.);
    }

    #[test]
    fn test_single_triangle() {
        let mut model = Model::new(Mesh::rectangle(1, 1, 1., 1.));
        model.fields.fix(0, Variable::Velocity, 0, 0.25);
        let process = ProcessInfo::new(0.1);
        calculate_end_of_step_velocity(&mut model, &process, &unit_flux, &Serial);

        let fields = &model.fields;
        // node 0 and 3 belong to both triangles
        approx_eq(fields.get(0, Variable::NodalVolume, 0, TimeLevel::Current), 1. / 3.);
        approx_eq(fields.get(1, Variable::NodalVolume, 0, TimeLevel::Current), 1. / 6.);
        approx_eq(fields.get(3, Variable::FractionalVelocity, 1, TimeLevel::Current), 2.);
        // fixed component untouched, free component corrected
        assert_eq!(fields.get(0, Variable::Velocity, 0, TimeLevel::Current), 0.25);
        approx_eq(fields.get(0, Variable::Velocity, 1, TimeLevel::Current), 6.);
        approx_eq(fields.get(1, Variable::Velocity, 0, TimeLevel::Current), 6.);
        // z has no meaning in 2-D
        assert_eq!(fields.get(1, Variable::Velocity, 2, TimeLevel::Current), 0.);
    }

    #[test]
    fn test_tetrahedron_updates_z() {
        let coords = ndarray::array![
            [0., 0., 0.],
            [1., 0., 0.],
            [0., 1., 0.],
            [0., 0., 1.]
        ];
        let mesh = Mesh::new(DomainSize::Three, coords, vec![vec![0, 1, 2, 3]]);
        let mut model = Model::new(mesh);
        let process = ProcessInfo::new(0.1);
        calculate_end_of_step_velocity(&mut model, &process, &unit_flux, &Serial);
        let volume = model.fields.get(2, Variable::NodalVolume, 0, TimeLevel::Current);
        approx_eq(volume, 1. / 24.);
        approx_eq(model.fields.get(2, Variable::Velocity, 2, TimeLevel::Current), 24.);
    }

    #[test]
    fn test_accumulators_are_reset() {
        let mut model = Model::new(Mesh::rectangle(2, 2, 1., 1.));
        let process = ProcessInfo::new(0.1);
        let zero_flux = |_: &Element, _: Variable, _: &Model, _: &ProcessInfo, _: &mut Array2<f64>| {};
        model.fields.par_for_each_node(Variable::FractionalVelocity, |_, mut row| row.fill(7.));
        calculate_end_of_step_velocity(&mut model, &process, &zero_flux, &Serial);
        calculate_end_of_step_velocity(&mut model, &process, &zero_flux, &Serial);
        let fields = &model.fields;
        assert_eq!(fields.field(Variable::FractionalVelocity).v.sum(), 0.);
        approx_eq(fields.field(Variable::NodalVolume).v.sum(), 1.);
        assert_eq!(fields.norm_l2(Variable::Velocity, TimeLevel::Current, &Serial), 0.);
    }
}
