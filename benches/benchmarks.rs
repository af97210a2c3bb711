use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use liftline::airfoils::{link_sections, AnalyticAirfoil, SectionModel};
use liftline::conditions::{OperatingCondition, DEG_TO_RAD};
use liftline::design::DesignVariableSet;
use liftline::geometry::{PlanformLaw, WingGeometry, WingPlanform};
use liftline::solver::{DirectConfig, DirectSolver, InfluenceMatrix};
use nalgebra::DVector;

fn section_counts() -> Vec<usize> {
    vec![20, 80]
}

fn broken_wing(n_sect: usize) -> (WingPlanform, DesignVariableSet, OperatingCondition) {
    let planform = WingPlanform::new(PlanformLaw::Broken, n_sect).unwrap();
    let mut vars = DesignVariableSet::new();
    planform.register_variables(&mut vars).unwrap();
    for (id, value, bounds) in [
        ("span", 34.1, (0.0, 50.0)),
        ("sweep", 34.0, (0.0, 40.0)),
        ("break_percent", 33.0, (20.0, 40.0)),
        ("root_chord", 6.1, (5.0, 7.0)),
        ("break_chord", 4.6, (3.0, 5.0)),
        ("tip_chord", 1.5, (1.0, 2.0)),
        ("root_height", 1.28, (1.0, 1.5)),
        ("break_height", 0.97, (0.8, 1.2)),
        ("tip_height", 0.33, (0.2, 0.5)),
    ] {
        vars.set_value(id, value).unwrap();
        vars.convert_to_design(id, bounds).unwrap();
    }
    (planform, vars, OperatingCondition::new(0.8, 3.5, 10_000.0))
}

fn airfoils(
    geom: &WingGeometry,
    oc: &OperatingCondition,
    ndv: usize,
) -> Vec<Box<dyn SectionModel>> {
    let reference = AnalyticAirfoil::new(-2.0 * DEG_TO_RAD, -0.1, oc.re_unit(), ndv);
    link_sections(&reference, geom)
}

fn bench_geometry_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry_build");
    for &size in &section_counts() {
        let (planform, vars, _) = broken_wing(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| {
                let geom = planform.build(&vars, None).unwrap();
                std::hint::black_box(geom);
            });
        });
    }
    group.finish();
}

fn bench_influence_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("influence_assembly");
    for &size in &section_counts() {
        let (planform, vars, _) = broken_wing(size);
        let geom = planform.build(&vars, None).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| {
                let k = InfluenceMatrix::assemble(&geom);
                std::hint::black_box(k);
            });
        });
    }
    group.finish();
}

fn bench_jacobian_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("jacobian_assembly");
    for &size in &section_counts() {
        let (planform, vars, oc) = broken_wing(size);
        let geom = planform.build(&vars, None).unwrap();
        let models = airfoils(&geom, &oc, vars.ndv());
        let solver = DirectSolver::new(&geom, &models, &oc, DirectConfig::default());
        let i_aoa = DVector::from_element(size, 0.01);
        let local = solver.comp_local_aoa(&i_aoa);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| {
                let jac = solver.comp_dpr_dpiaoa(&local);
                std::hint::black_box(jac);
            });
        });
    }
    group.finish();
}

fn bench_design_gradient_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("design_gradient_assembly");
    for &size in &section_counts() {
        let (planform, vars, oc) = broken_wing(size);
        let geom = planform.build(&vars, None).unwrap();
        let models = airfoils(&geom, &oc, vars.ndv());
        let solver = DirectSolver::new(&geom, &models, &oc, DirectConfig::default());
        let i_aoa = DVector::from_element(size, 0.01);
        let local = solver.comp_local_aoa(&i_aoa);
        let gamma = solver.comp_gamma(&local);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| {
                let dr = solver.comp_dpr_dpchi(&local, &gamma);
                std::hint::black_box(dr);
            });
        });
    }
    group.finish();
}

fn bench_direct_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_solve");
    for &size in &section_counts() {
        let (planform, vars, oc) = broken_wing(size);
        let geom = planform.build(&vars, None).unwrap();
        let models = airfoils(&geom, &oc, vars.ndv());
        let solver = DirectSolver::new(&geom, &models, &oc, DirectConfig::default());
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| {
                let solution = solver.run(false).unwrap();
                std::hint::black_box(solution);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_geometry_build,
    bench_influence_assembly,
    bench_jacobian_assembly,
    bench_design_gradient_assembly,
    bench_direct_solve
);
criterion_main!(benches);
