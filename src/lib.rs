//! Nonlinear lifting-line engine with exact analytic design sensitivities.
//!
//! The induced angle of attack is solved by relaxed Newton iteration on the
//! horseshoe-vortex residual; every geometric quantity carries its forward
//! gradient row, so the direct Jacobians and the adjoint totals are exact to
//! rounding rather than finite-differenced.

pub mod airfoils;
pub mod conditions;
pub mod design;
pub mod geometry;
pub mod gradient;
pub mod processing;
pub mod solver;

pub use conditions::OperatingCondition;
pub use design::{DesignError, DesignVariableSet};
pub use geometry::{GeometryError, PlanformLaw, WingGeometry, WingPlanform};
pub use gradient::Grad;
pub use solver::{
    DirectConfig, DirectSolution, LiftingLineSolver, SolveStatus, SolverError,
};
