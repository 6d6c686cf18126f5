use criterion::{criterion_group, criterion_main, Criterion};
use fracstep::fractional_step::{calculate_end_of_step_velocity, PressureGradientFlux};
use fracstep::field::Variable;
use fracstep::mesh::Mesh;
use fracstep::mpi::Serial;
use fracstep::process::{Model, ProcessInfo};
use fracstep::types::TimeLevel;

const SIZES: [usize; 3] = [32, 64, 128];

pub fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Projection");
    group.significance_level(0.1).sample_size(10);
    for n in SIZES.iter() {
        let mut model = Model::new(Mesh::rectangle(*n, *n, 1., 1.));
        for node in 0..model.mesh.n_nodes() {
            let x = model.mesh.coordinates()[[node, 0]];
            model
                .fields
                .set(node, Variable::PressureIncrement, 0, TimeLevel::Current, x * x);
        }
        let process = ProcessInfo::new(0.01);
        let flux = PressureGradientFlux { density: 1. };
        let name = format!("Size: {} x {}", *n, *n);
        group.bench_function(&name, |b| {
            b.iter(|| calculate_end_of_step_velocity(&mut model, &process, &flux, &Serial))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);
