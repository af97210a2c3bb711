use liftline::airfoils::AnalyticAirfoil;
use liftline::conditions::{OperatingCondition, DEG_TO_RAD};
use liftline::design::DesignVariableSet;
use liftline::geometry::{PlanformLaw, WingPlanform};
use liftline::processing::csv_writer;
use liftline::processing::summary::RunSummary;
use liftline::solver::{DirectConfig, LiftingLineSolver};
use std::fs;

fn main() {
    fs::create_dir_all("output/main").expect("Failed to create output directory");

    let oc = OperatingCondition::new(0.8, 3.5, 10_000.0);
    println!("{oc}\n");

    let planform = WingPlanform::new(PlanformLaw::Broken, 20).expect("even section count");
    let mut vars = DesignVariableSet::new();
    planform
        .register_variables(&mut vars)
        .expect("variable registration");

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
        vars.set_value(id, value).expect("known planform parameter");
        vars.convert_to_design(id, bounds)
            .expect("valid planform bounds");
    }

    let reference = AnalyticAirfoil::new(-2.0 * DEG_TO_RAD, -0.1, oc.re_unit(), vars.ndv());
    let mut solver = LiftingLineSolver::new(planform, vars, Box::new(reference), oc.clone());
    solver.set_config(DirectConfig {
        gamma_file: Some("output/main/gamma.csv".into()),
        ..DirectConfig::default()
    });

    solver.run_direct(true).expect("direct solve");
    solver.run_post(None).expect("post-processing");
    solver.run_adjoint().expect("adjoint solve");

    let geom = solver.geometry().expect("geometry");
    let direct = solver.direct_solution().expect("direct solution");
    let post = solver.post_results().expect("post results");
    let adjoint = solver.adjoint_results().expect("adjoint results");

    println!("\n{post}");
    println!("{adjoint}");

    println!("*** dLoD/dchi (adjoint totals) ***");
    if let Some(lod) = adjoint.get("LoD") {
        for (id, g) in solver
            .variables()
            .dv_ids()
            .iter()
            .zip(lod.d_dchi_total.iter())
        {
            println!("  d/d{id:<14} = {g:>13.6e}");
        }
    }

    save_geometry(geom);
    csv_writer::write_history("output/main/convergence.csv", &direct.history)
        .expect("convergence history output");

    let mut summary = RunSummary::from_run(geom, &oc);
    summary.add_solver_info(direct);
    summary.add_functions(post);
    summary
        .write_to_file("output/main/summary.txt")
        .expect("summary output");
    summary.print_to_console();
}

fn save_geometry(geom: &liftline::WingGeometry) {
    let n = geom.n_sect;
    let positions: Vec<glam::DVec3> = (0..n).map(|i| geom.position(i)).collect();
    let x: Vec<f64> = positions.iter().map(|p| p.x).collect();
    let y: Vec<f64> = positions.iter().map(|p| p.y).collect();
    let chord: Vec<f64> = (0..n).map(|i| geom.chords[i].val).collect();
    let rel_thick: Vec<f64> = (0..n).map(|i| geom.rel_thicks[i].val).collect();
    let twist: Vec<f64> = (0..n).map(|i| geom.twist[i].val / DEG_TO_RAD).collect();

    csv_writer::write_csv(
        "output/main/geometry.csv",
        &["x", "y", "chord", "rel_thick", "twist_deg"],
        &[x, y, chord, rel_thick, twist],
    )
    .expect("geometry output");
}
