pub mod adjoint;
pub mod direct;
pub mod influence;
pub mod post;

pub use adjoint::{solve_adjoints, AdjointResults, AdjointValue};
pub use direct::{DirectConfig, DirectSolution, DirectSolver, SolveStatus};
pub use influence::InfluenceMatrix;
pub use post::{FunctionValue, PostProcessor, PostResults, DEFAULT_FUNCTIONS};

use crate::airfoils::{link_sections, SectionModel};
use crate::conditions::OperatingCondition;
use crate::design::{DesignError, DesignVariableSet};
use crate::geometry::{GeometryError, WingGeometry, WingPlanform};
use nalgebra::DVector;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("linear solve failed")]
    LinearSolveFailed,
    #[error("{0} has not been computed yet")]
    NotComputed(&'static str),
    #[error("{stage} requires {requires}")]
    Sequence {
        stage: &'static str,
        requires: &'static str,
    },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Design(#[from] DesignError),
    #[error("output write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Owns the full engine state and sequences the three stages: direct solve,
/// post-processing, adjoint. Any change to the design vector, structural
/// rotations or operating condition invalidates the dependent stages
/// wholesale; results are always rebuilt from scratch.
pub struct LiftingLineSolver {
    planform: WingPlanform,
    vars: DesignVariableSet,
    reference: Box<dyn SectionModel>,
    oc: OperatingCondition,
    config: DirectConfig,
    theta_y: Option<Vec<f64>>,

    geom: Option<WingGeometry>,
    airfoils: Option<Vec<Box<dyn SectionModel>>>,
    direct: Option<DirectSolution>,
    post: Option<PostResults>,
    adjoint: Option<AdjointResults>,
}

impl LiftingLineSolver {
    /// `vars` must already carry the planform's registered variables.
    pub fn new(
        planform: WingPlanform,
        vars: DesignVariableSet,
        reference: Box<dyn SectionModel>,
        oc: OperatingCondition,
    ) -> Self {
        Self {
            planform,
            vars,
            reference,
            oc,
            config: DirectConfig::default(),
            theta_y: None,
            geom: None,
            airfoils: None,
            direct: None,
            post: None,
            adjoint: None,
        }
    }

    pub fn set_config(&mut self, config: DirectConfig) {
        self.config = config;
        self.invalidate_solution();
    }

    pub fn variables(&self) -> &DesignVariableSet {
        &self.vars
    }

    pub fn operating_condition(&self) -> &OperatingCondition {
        &self.oc
    }

    pub fn set_design_vector(&mut self, x: &[f64]) -> Result<(), SolverError> {
        self.vars.set_from_vector(x)?;
        self.invalidate_geometry();
        Ok(())
    }

    pub fn set_normalized_design_vector(&mut self, x: &[f64]) -> Result<(), SolverError> {
        self.vars.set_from_normalized(x)?;
        self.invalidate_geometry();
        Ok(())
    }

    pub fn set_value(&mut self, id: &str, value: f64) -> Result<(), SolverError> {
        self.vars.set_value(id, value)?;
        self.invalidate_geometry();
        Ok(())
    }

    pub fn set_operating_condition(&mut self, oc: OperatingCondition) {
        self.oc = oc;
        self.invalidate_solution();
    }

    /// Per-section pitch rotation from an external structural solution.
    pub fn set_theta_y(&mut self, theta_y: Option<Vec<f64>>) {
        self.theta_y = theta_y;
        self.invalidate_geometry();
    }

    fn invalidate_geometry(&mut self) {
        self.geom = None;
        self.airfoils = None;
        self.invalidate_solution();
    }

    fn invalidate_solution(&mut self) {
        self.direct = None;
        self.post = None;
        self.adjoint = None;
    }

    fn ensure_geometry(&mut self) -> Result<(), SolverError> {
        if self.geom.is_some() {
            return Ok(());
        }
        let geom = self.planform.build(&self.vars, self.theta_y.as_deref())?;
        let airfoils = link_sections(self.reference.as_ref(), &geom);
        self.geom = Some(geom);
        self.airfoils = Some(airfoils);
        Ok(())
    }

    pub fn run_direct(&mut self, logging: bool) -> Result<&DirectSolution, SolverError> {
        self.ensure_geometry()?;
        let solution = {
            let geom = self.geom.as_ref().ok_or(SolverError::NotComputed("geometry"))?;
            let airfoils = self
                .airfoils
                .as_ref()
                .ok_or(SolverError::NotComputed("section models"))?;
            DirectSolver::new(geom, airfoils, &self.oc, self.config.clone()).run(logging)?
        };
        self.post = None;
        self.adjoint = None;
        Ok(self.direct.insert(solution))
    }

    /// Evaluate the named functions (the default list when `names` is `None`)
    /// over the last direct solution.
    pub fn run_post(&mut self, names: Option<&[&str]>) -> Result<&PostResults, SolverError> {
        let results = {
            let direct = self.direct.as_ref().ok_or(SolverError::Sequence {
                stage: "post-processing",
                requires: "a direct solve",
            })?;
            let geom = self.geom.as_ref().ok_or(SolverError::NotComputed("geometry"))?;
            let airfoils = self
                .airfoils
                .as_ref()
                .ok_or(SolverError::NotComputed("section models"))?;
            PostProcessor::new(geom, airfoils, &self.oc, direct)
                .run(names.unwrap_or(&DEFAULT_FUNCTIONS))
        };
        self.adjoint = None;
        Ok(self.post.insert(results))
    }

    pub fn run_adjoint(&mut self) -> Result<&AdjointResults, SolverError> {
        let direct = self.direct.as_ref().ok_or(SolverError::Sequence {
            stage: "adjoint",
            requires: "a converged direct solve",
        })?;
        if !direct.converged() {
            return Err(SolverError::Sequence {
                stage: "adjoint",
                requires: "a converged direct solve",
            });
        }
        let post = self.post.as_ref().ok_or(SolverError::Sequence {
            stage: "adjoint",
            requires: "a post-processing run",
        })?;
        let results = solve_adjoints(direct, post)?;
        Ok(self.adjoint.insert(results))
    }

    pub fn geometry(&self) -> Result<&WingGeometry, SolverError> {
        self.geom.as_ref().ok_or(SolverError::NotComputed("geometry"))
    }

    pub fn direct_solution(&self) -> Result<&DirectSolution, SolverError> {
        self.direct
            .as_ref()
            .ok_or(SolverError::NotComputed("direct solution"))
    }

    pub fn i_aoa(&self) -> Result<&DVector<f64>, SolverError> {
        Ok(&self.direct_solution()?.i_aoa)
    }

    pub fn post_results(&self) -> Result<&PostResults, SolverError> {
        self.post
            .as_ref()
            .ok_or(SolverError::NotComputed("post-processing results"))
    }

    pub fn adjoint_results(&self) -> Result<&AdjointResults, SolverError> {
        self.adjoint
            .as_ref()
            .ok_or(SolverError::NotComputed("adjoint results"))
    }
}
