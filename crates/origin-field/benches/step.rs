//! Criterion benchmarks for the leapfrog step, with and without the constraint.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use origin_field::{
    Complex64, ComplexField, ConstraintProjector, FieldSet, Grid, InitOptions, Integrator,
    PotentialModel,
};

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Cube of side `n` holding `names`, each seeded with a smooth non-constant profile.
fn make_fields(n: usize, names: &[&str]) -> FieldSet {
    let grid = Grid::new(&[n, n, n]).unwrap();
    let mut fields = FieldSet::new(grid, names).unwrap();

    let profiles: Vec<ComplexField> = (0..names.len())
        .map(|k| {
            ComplexField::from_fn(fields.grid(), |x| {
                let phase = 0.7 * x[0] as f64 + 0.3 * x[1] as f64 - 0.5 * x[2] as f64 + k as f64;
                Complex64::new(1e-3 * phase.cos(), 1e-3 * phase.sin())
            })
        })
        .collect();
    fields
        .set_initial_conditions(
            names.iter().copied().zip(profiles.iter()),
            InitOptions::default(),
        )
        .unwrap();
    fields
}

fn two_field_potential() -> PotentialModel {
    PotentialModel::builder(2)
        .mass(0, 0.5)
        .mass(1, 0.8)
        .self_coupling(0, 0.1)
        .cross_coupling(0, 1, 0.05)
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Benchmark 1: single free field, grid scaling
// ---------------------------------------------------------------------------

fn bench_single_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_field_step");
    group.sample_size(20);

    for &n in &[8, 16, 32] {
        let mut fields = make_fields(n, &["phi"]);
        let mut integrator = Integrator::new(PotentialModel::free(1), &fields).unwrap();

        group.bench_with_input(BenchmarkId::new("unconstrained", n), &n, |b, _| {
            b.iter(|| integrator.step(&mut fields, 0.01).unwrap());
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 2: two coupled fields under the floor
// ---------------------------------------------------------------------------

fn bench_two_field_constrained(c: &mut Criterion) {
    let mut group = c.benchmark_group("two_field_step");
    group.sample_size(20);

    for &n in &[8, 16, 32] {
        let mut fields = make_fields(n, &["phi", "chi"]);
        let combo = fields.combination(&["phi", "chi"]).unwrap();
        let projector = ConstraintProjector::new(0.05, Complex64::new(0.0, 0.0), combo).unwrap();
        let mut integrator = Integrator::new(two_field_potential(), &fields)
            .unwrap()
            .with_constraint(projector, &fields)
            .unwrap();

        group.bench_with_input(BenchmarkId::new("constrained", n), &n, |b, _| {
            b.iter(|| integrator.step(&mut fields, 0.01).unwrap());
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 3: energy read-out
// ---------------------------------------------------------------------------

fn bench_energy(c: &mut Criterion) {
    let fields = make_fields(32, &["phi", "chi"]);
    let integrator = Integrator::new(two_field_potential(), &fields).unwrap();

    c.bench_function("energy_32", |b| {
        b.iter(|| integrator.energy(&fields));
    });
}

criterion_group!(
    benches,
    bench_single_field,
    bench_two_field_constrained,
    bench_energy
);
criterion_main!(benches);
