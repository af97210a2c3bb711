mod analytic;
mod meta;
mod polar;

pub use analytic::AnalyticAirfoil;
pub use meta::{MetaAirfoil, SurrogateInputs, SurrogateModel, SurrogateOutput};
pub use polar::{PolarAirfoil, PolarError, PolarTable};

use crate::geometry::WingGeometry;
use crate::gradient::Grad;
use nalgebra::DVector;

/// Section-local scaling applied to a reference airfoil: reference area and
/// length with their design gradients, plus the geometric inputs the section
/// model may consume.
#[derive(Debug, Clone)]
pub struct SectionScaling {
    pub sref: Grad,
    pub lref: Grad,
    pub rel_thick: Grad,
    pub sweep: Grad,
}

impl SectionScaling {
    /// Neutral scaling for a reference template (unit area and length, no
    /// design dependence).
    pub fn reference(ndv: usize) -> Self {
        Self {
            sref: Grad::constant(1.0, ndv),
            lref: Grad::constant(1.0, ndv),
            rel_thick: Grad::constant(0.0, ndv),
            sweep: Grad::constant(0.0, ndv),
        }
    }
}

/// Sectional aerodynamic model: lift, pressure-drag and friction-drag
/// coefficients with their derivatives with respect to the local angle of
/// attack and the design vector. Implementations are immutable value objects;
/// a wing section gets its own instance via [`SectionModel::scaled_copy`].
pub trait SectionModel {
    fn cl(&self, alpha: f64, mach: f64) -> f64;
    fn cdp(&self, alpha: f64, mach: f64) -> f64;
    fn cdf(&self, alpha: f64, mach: f64) -> f64;
    fn cm(&self, alpha: f64, mach: f64) -> f64;

    fn cl_alpha(&self, alpha: f64, mach: f64) -> f64;
    fn cdp_alpha(&self, alpha: f64, mach: f64) -> f64;
    fn cdf_alpha(&self, alpha: f64, mach: f64) -> f64;

    fn dcl_dchi(&self, alpha: f64, mach: f64) -> DVector<f64>;
    fn dcdp_dchi(&self, alpha: f64, mach: f64) -> DVector<f64>;
    fn dcdf_dchi(&self, alpha: f64, mach: f64) -> DVector<f64>;

    fn scaling(&self) -> &SectionScaling;

    /// Pure scaling: produce the per-section instance from this template.
    fn scaled_copy(&self, scaling: &SectionScaling) -> Box<dyn SectionModel>;

    fn cd(&self, alpha: f64, mach: f64) -> f64 {
        self.cdp(alpha, mach) + self.cdf(alpha, mach)
    }

    fn cd_alpha(&self, alpha: f64, mach: f64) -> f64 {
        self.cdp_alpha(alpha, mach) + self.cdf_alpha(alpha, mach)
    }

    fn dcd_dchi(&self, alpha: f64, mach: f64) -> DVector<f64> {
        self.dcdp_dchi(alpha, mach) + self.dcdf_dchi(alpha, mach)
    }

    fn sref(&self) -> &Grad {
        &self.scaling().sref
    }

    fn lref(&self) -> &Grad {
        &self.scaling().lref
    }
}

/// One scaled airfoil per wing section, derived from a single reference
/// template. Copies, not aliases, since every section carries different
/// area/length gradients.
pub fn link_sections(
    reference: &dyn SectionModel,
    geom: &WingGeometry,
) -> Vec<Box<dyn SectionModel>> {
    (0..geom.n_sect)
        .map(|i| {
            let scaling = SectionScaling {
                sref: geom.s_loc[i].clone(),
                lref: geom.chords[i].clone(),
                rel_thick: geom.rel_thicks[i].clone(),
                sweep: geom.sweep.clone(),
            };
            reference.scaled_copy(&scaling)
        })
        .collect()
}
