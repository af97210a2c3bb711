use super::direct::DirectSolution;
use super::post::PostResults;
use super::SolverError;
use nalgebra::DVector;
use std::fmt;

/// Total design sensitivities of one aerodynamic function.
#[derive(Debug, Clone)]
pub struct AdjointValue {
    pub lambda: DVector<f64>,
    /// dF/dchi with the implicit iAoA dependence folded in.
    pub d_dchi_total: DVector<f64>,
    pub d_daoa_total: f64,
    /// lambda^T R, zero at exact convergence; reported as a quality measure
    /// of the direct solve.
    pub correction: f64,
}

#[derive(Debug, Clone)]
pub struct AdjointEntry {
    pub name: String,
    pub result: Option<AdjointValue>,
}

#[derive(Debug, Clone, Default)]
pub struct AdjointResults {
    pub entries: Vec<AdjointEntry>,
}

impl AdjointResults {
    pub fn get(&self, name: &str) -> Option<&AdjointValue> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.result.as_ref())
    }
}

impl fmt::Display for AdjointResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*** adjoint corrections ***")?;
        for entry in &self.entries {
            if let Some(v) = &entry.result {
                writeln!(f, "  {:<14} lambda^T R = {:>13.6e}", entry.name, v.correction)?;
            }
        }
        Ok(())
    }
}

/// One adjoint solve per function: factor the transposed direct Jacobian
/// once, back-substitute per function, then assemble the totals
/// dF/dchi = pF/pchi + lambda^T dR/dchi (and the same for the free-stream
/// angle). Never a per-design-variable solve.
pub fn solve_adjoints(
    solution: &DirectSolution,
    post: &PostResults,
) -> Result<AdjointResults, SolverError> {
    let lu = solution.dr_diaoa.transpose().lu();

    let mut entries = Vec::with_capacity(post.entries.len());
    for entry in &post.entries {
        let result = match &entry.result {
            None => None,
            Some(f) => {
                let lambda = lu
                    .solve(&(-&f.d_diaoa))
                    .ok_or(SolverError::LinearSolveFailed)?;
                let d_dchi_total = &f.d_dchi + solution.dr_dchi.transpose() * &lambda;
                let d_daoa_total = f.d_daoa + lambda.dot(&solution.dr_daoa);
                let correction = lambda.dot(&solution.residual);
                Some(AdjointValue {
                    lambda,
                    d_dchi_total,
                    d_daoa_total,
                    correction,
                })
            }
        };
        entries.push(AdjointEntry {
            name: entry.name.clone(),
            result,
        });
    }
    Ok(AdjointResults { entries })
}
