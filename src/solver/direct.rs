use super::influence::InfluenceMatrix;
use super::SolverError;
use crate::airfoils::SectionModel;
use crate::conditions::OperatingCondition;
use crate::geometry::WingGeometry;
use crate::processing::csv_writer::write_xy;
use nalgebra::{DMatrix, DVector};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DirectConfig {
    /// Fixed Newton relaxation factor in (0, 1].
    pub relax_factor: f64,
    /// Stopping tolerance on the residual norm.
    pub residual_tolerance: f64,
    pub max_iterations: u32,
    /// Optional sink for the converged circulation distribution.
    pub gamma_file: Option<PathBuf>,
}

impl Default for DirectConfig {
    fn default() -> Self {
        Self {
            relax_factor: 0.99,
            residual_tolerance: 1e-10,
            max_iterations: 100,
            gamma_file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Converged,
    DidNotConverge,
}

/// Converged (or last-iterate) state of the nonlinear induced-angle solve,
/// with every partial the post-processing and adjoint stages need.
#[derive(Debug, Clone)]
pub struct DirectSolution {
    pub status: SolveStatus,
    pub i_aoa: DVector<f64>,
    pub local_aoa: DVector<f64>,
    pub gamma: DVector<f64>,
    pub residual: DVector<f64>,
    /// dR/diAoA at the final iterate, retained for the adjoint solves.
    pub dr_diaoa: DMatrix<f64>,
    /// N x ndv
    pub dr_dchi: DMatrix<f64>,
    pub dr_daoa: DVector<f64>,
    /// dlocalAoA/diAoA (= -I), kept explicit for the chain rules downstream.
    pub dlocal_diaoa: DMatrix<f64>,
    pub dlocal_daoa: DVector<f64>,
    /// N x ndv, rows are the twist gradient rows.
    pub dlocal_dchi: DMatrix<f64>,
    /// (iteration, residual norm) per Newton step.
    pub history: Vec<(u32, f64)>,
}

impl DirectSolution {
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

/// Relaxed Newton iteration on the induced angle of attack. The residual
/// couples the sections through the influence matrix; the sectional lift
/// model enters through the normalized circulation `gamma = chord cl / 2`.
pub struct DirectSolver<'a> {
    geom: &'a WingGeometry,
    airfoils: &'a [Box<dyn SectionModel>],
    oc: &'a OperatingCondition,
    influence: InfluenceMatrix,
    config: DirectConfig,
}

impl<'a> DirectSolver<'a> {
    pub fn new(
        geom: &'a WingGeometry,
        airfoils: &'a [Box<dyn SectionModel>],
        oc: &'a OperatingCondition,
        config: DirectConfig,
    ) -> Self {
        Self {
            geom,
            airfoils,
            oc,
            influence: InfluenceMatrix::assemble(geom),
            config,
        }
    }

    pub fn influence(&self) -> &InfluenceMatrix {
        &self.influence
    }

    /// localAoA = twist + theta_y + AoA - iAoA
    pub fn comp_local_aoa(&self, i_aoa: &DVector<f64>) -> DVector<f64> {
        let n = self.geom.n_sect;
        DVector::from_fn(n, |i, _| {
            self.geom.twist[i].val + self.geom.theta_y[i] + self.oc.aoa_rad() - i_aoa[i]
        })
    }

    /// Normalized circulation gamma_j = chord_j cl_j / 2.
    pub fn comp_gamma(&self, local_aoa: &DVector<f64>) -> DVector<f64> {
        let mach = self.oc.mach();
        DVector::from_fn(self.geom.n_sect, |j, _| {
            0.5 * self.geom.chords[j].val * self.airfoils[j].cl(local_aoa[j], mach)
        })
    }

    /// R = iAoA - K gamma
    pub fn comp_r(&self, i_aoa: &DVector<f64>) -> DVector<f64> {
        let local = self.comp_local_aoa(i_aoa);
        i_aoa - &self.influence.k * self.comp_gamma(&local)
    }

    /// dR/diAoA = I + K diag(chord cl_alpha / 2)
    pub fn comp_dpr_dpiaoa(&self, local_aoa: &DVector<f64>) -> DMatrix<f64> {
        let n = self.geom.n_sect;
        let mach = self.oc.mach();
        let mut jac = DMatrix::identity(n, n);
        for j in 0..n {
            let dgamma = 0.5
                * self.geom.chords[j].val
                * self.airfoils[j].cl_alpha(local_aoa[j], mach);
            for i in 0..n {
                jac[(i, j)] += self.influence.k[(i, j)] * dgamma;
            }
        }
        jac
    }

    /// dR/dAoA = -K (chord cl_alpha / 2)
    pub fn comp_dpr_dpaoa(&self, local_aoa: &DVector<f64>) -> DVector<f64> {
        let mach = self.oc.mach();
        let dgamma = DVector::from_fn(self.geom.n_sect, |j, _| {
            0.5 * self.geom.chords[j].val * self.airfoils[j].cl_alpha(local_aoa[j], mach)
        });
        -(&self.influence.k * dgamma)
    }

    /// dR/dchi at fixed iAoA: the influence-matrix gradient term plus the
    /// circulation's own design dependence (chord row, twist row through the
    /// local angle, and the airfoil's direct chi row).
    pub fn comp_dpr_dpchi(
        &self,
        local_aoa: &DVector<f64>,
        gamma: &DVector<f64>,
    ) -> DMatrix<f64> {
        let n = self.geom.n_sect;
        let ndv = self.geom.ndv;
        let mach = self.oc.mach();

        let mut dgamma_dchi = DMatrix::zeros(n, ndv);
        for j in 0..n {
            let cl = self.airfoils[j].cl(local_aoa[j], mach);
            let cl_alpha = self.airfoils[j].cl_alpha(local_aoa[j], mach);
            let dcl = self.airfoils[j].dcl_dchi(local_aoa[j], mach);
            let chord = &self.geom.chords[j];
            for m in 0..ndv {
                let dcl_total = cl_alpha * self.geom.twist[j].grad[m] + dcl[m];
                dgamma_dchi[(j, m)] = 0.5 * (chord.grad[m] * cl + chord.val * dcl_total);
            }
        }

        let mut dr = -(&self.influence.k * dgamma_dchi);
        for m in 0..ndv {
            let col = &self.influence.k_grad[m] * gamma;
            for i in 0..n {
                dr[(i, m)] -= col[i];
            }
        }
        dr
    }

    /// Relaxed Newton from iAoA = 0. Non-convergence is reported as a status
    /// with the residual history attached; only a singular Jacobian is an
    /// error.
    pub fn run(&self, logging: bool) -> Result<DirectSolution, SolverError> {
        let n = self.geom.n_sect;
        let mut i_aoa = DVector::zeros(n);
        let mut history = Vec::new();
        let mut initial_residual = None;

        if logging {
            println!("{n} induced-angle unknowns\n");
            println!("    Iter   | Residual  |  Fraction");
        }

        let mut status = SolveStatus::DidNotConverge;
        for iter in 0..self.config.max_iterations {
            let residual = self.comp_r(&i_aoa);
            let res_norm = residual.norm();
            let init = *initial_residual.get_or_insert(res_norm);
            log_iteration(iter, self.config.max_iterations, res_norm, res_norm / init, logging);
            history.push((iter, res_norm));

            if res_norm < self.config.residual_tolerance {
                status = SolveStatus::Converged;
                break;
            }

            let local = self.comp_local_aoa(&i_aoa);
            let jac = self.comp_dpr_dpiaoa(&local);
            let delta = jac
                .lu()
                .solve(&residual)
                .ok_or(SolverError::LinearSolveFailed)?;
            i_aoa -= delta * self.config.relax_factor;
        }

        let local_aoa = self.comp_local_aoa(&i_aoa);
        let gamma = self.comp_gamma(&local_aoa);
        let residual = self.comp_r(&i_aoa);
        let dr_diaoa = self.comp_dpr_dpiaoa(&local_aoa);
        let dr_dchi = self.comp_dpr_dpchi(&local_aoa, &gamma);
        let dr_daoa = self.comp_dpr_dpaoa(&local_aoa);

        let ndv = self.geom.ndv;
        let dlocal_diaoa = -DMatrix::<f64>::identity(n, n);
        let dlocal_daoa = DVector::from_element(n, 1.0);
        let dlocal_dchi =
            DMatrix::from_fn(n, ndv, |i, m| self.geom.twist[i].grad[m]);

        if let Some(path) = &self.config.gamma_file {
            let y: Vec<f64> = (0..n).map(|i| self.geom.y[i].val).collect();
            let g: Vec<f64> = gamma.iter().copied().collect();
            write_xy(path, "y", "gamma", &y, &g).map_err(SolverError::Io)?;
        }

        Ok(DirectSolution {
            status,
            i_aoa,
            local_aoa,
            gamma,
            residual,
            dr_diaoa,
            dr_dchi,
            dr_daoa,
            dlocal_diaoa,
            dlocal_daoa,
            dlocal_dchi,
            history,
        })
    }
}

fn log_iteration(i: u32, max_iter: u32, res_norm: f64, fraction: f64, logging: bool) {
    if !logging {
        return;
    }
    if i == 0 {
        println!("{i:>4} | {res_norm:>9.3e} | {fraction:>9.3e}");
    } else {
        print!("\x1B[1F\x1B[2K");
        println!("{i:>4}/{max_iter} | {res_norm:>9.3e} | {fraction:>9.3e}");
    }
    io::stdout().flush().ok();
}
