#![allow(dead_code)]

use liftline::airfoils::{link_sections, AnalyticAirfoil, SectionModel};
use liftline::conditions::{OperatingCondition, DEG_TO_RAD};
use liftline::design::DesignVariableSet;
use liftline::geometry::{PlanformLaw, WingGeometry, WingPlanform};
use liftline::solver::LiftingLineSolver;

/// A wing/condition pair the tests can rebuild at perturbed design points.
pub struct Case {
    pub planform: WingPlanform,
    pub vars: DesignVariableSet,
    pub oc: OperatingCondition,
}

impl Case {
    /// The 20-section broken-planform transonic case: all nine planform
    /// parameters free plus the ten symmetric twist variables.
    pub fn broken_wing() -> Self {
        let planform = WingPlanform::new(PlanformLaw::Broken, 20).unwrap();
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
        Self {
            planform,
            vars,
            oc: OperatingCondition::new(0.8, 3.5, 10_000.0),
        }
    }

    /// Untwisted rectangular wing at a mild subsonic condition.
    pub fn rectangular(n_sect: usize) -> Self {
        let planform = WingPlanform::new(PlanformLaw::Rectangular, n_sect).unwrap();
        let mut vars = DesignVariableSet::new();
        planform.register_variables(&mut vars).unwrap();
        vars.set_value("span", 20.0).unwrap();
        vars.set_value("sweep", 0.0).unwrap();
        vars.set_value("root_chord", 2.0).unwrap();
        vars.set_value("root_height", 0.24).unwrap();
        vars.set_value("tip_height", 0.24).unwrap();
        vars.convert_to_design("span", (5.0, 40.0)).unwrap();
        vars.convert_to_design("root_chord", (1.0, 4.0)).unwrap();
        Self {
            planform,
            vars,
            oc: OperatingCondition::new(0.3, 4.0, 0.0),
        }
    }

    pub fn geometry(&self) -> WingGeometry {
        self.planform.build(&self.vars, None).unwrap()
    }

    pub fn airfoils(&self, geom: &WingGeometry) -> Vec<Box<dyn SectionModel>> {
        let reference = self.reference();
        link_sections(&reference, geom)
    }

    pub fn reference(&self) -> AnalyticAirfoil {
        AnalyticAirfoil::new(-2.0 * DEG_TO_RAD, -0.1, self.oc.re_unit(), self.vars.ndv())
    }

    pub fn into_solver(self) -> LiftingLineSolver {
        let reference = Box::new(self.reference());
        LiftingLineSolver::new(self.planform, self.vars, reference, self.oc)
    }

    /// The same case at a perturbed design vector.
    pub fn perturbed(&self, index: usize, delta: f64) -> Self {
        let mut vars = self.vars.clone();
        let mut x: Vec<f64> = vars.dv_vector().iter().copied().collect();
        x[index] += delta;
        vars.set_from_vector(&x).unwrap();
        Self {
            planform: self.planform.clone(),
            vars,
            oc: self.oc.clone(),
        }
    }
}
