use super::{SectionModel, SectionScaling};
use crate::gradient::Grad;
use nalgebra::DVector;
use std::f64::consts::PI;

/// Compressibility floor for the Prandtl-Glauert factor, keeps the lift
/// slope finite through the transonic range of the sweep-corrected Mach.
const BETA_MIN: f64 = 0.05;

/// Linear sectional model: thin-airfoil lift slope with sweep and
/// Prandtl-Glauert compressibility corrections and a thickness factor,
/// flat-plate turbulent friction with a form factor, and pressure drag
/// quadratic in the lift coefficient.
#[derive(Debug, Clone)]
pub struct AnalyticAirfoil {
    alpha0: f64,
    cm0: f64,
    re_unit: f64,
    scaling: SectionScaling,
}

impl AnalyticAirfoil {
    /// `alpha0` is the zero-lift angle in radians, `re_unit` the free-stream
    /// Reynolds number per unit length.
    pub fn new(alpha0: f64, cm0: f64, re_unit: f64, ndv: usize) -> Self {
        Self {
            alpha0,
            cm0,
            re_unit,
            scaling: SectionScaling::reference(ndv),
        }
    }

    fn ndv(&self) -> usize {
        self.scaling.sref.ndv()
    }

    /// Lift slope 2pi (1 + 0.77 t) cos(sweep) / beta with its design row.
    fn lift_slope(&self, mach: f64) -> Grad {
        let cos_sweep = self.scaling.sweep.cos();
        let m_eff = cos_sweep.scale(mach);
        let beta_sq = &Grad::constant(1.0, self.ndv()) - &(&m_eff * &m_eff);
        let beta = if beta_sq.val <= BETA_MIN * BETA_MIN {
            Grad::constant(BETA_MIN, self.ndv())
        } else {
            beta_sq.sqrt()
        };
        let thickness = &Grad::constant(1.0, self.ndv()) + &self.scaling.rel_thick.scale(0.77);
        (thickness * &cos_sweep).scale(2.0 * PI) / beta
    }

    fn cl_full(&self, alpha: f64, mach: f64) -> Grad {
        self.lift_slope(mach).scale(alpha - self.alpha0)
    }

    /// Flat-plate turbulent skin friction times a thickness form factor.
    fn cdf_full(&self) -> Grad {
        let reynolds = self.scaling.lref.scale(self.re_unit);
        let cf = reynolds.powf(-0.2).scale(0.074);
        let t = &self.scaling.rel_thick;
        let form_factor =
            &(&Grad::constant(1.0, self.ndv()) + &t.scale(2.7)) + &t.powi(4).scale(100.0);
        &cf * &form_factor
    }

    fn pressure_factor(&self) -> Grad {
        &Grad::constant(0.01, self.ndv()) + &self.scaling.rel_thick.powi(2).scale(0.1)
    }

    fn cdp_full(&self, alpha: f64, mach: f64) -> Grad {
        let cl = self.cl_full(alpha, mach);
        &self.pressure_factor() * &cl.powi(2)
    }
}

impl SectionModel for AnalyticAirfoil {
    fn cl(&self, alpha: f64, mach: f64) -> f64 {
        self.cl_full(alpha, mach).val
    }

    fn cdp(&self, alpha: f64, mach: f64) -> f64 {
        self.cdp_full(alpha, mach).val
    }

    fn cdf(&self, _alpha: f64, _mach: f64) -> f64 {
        self.cdf_full().val
    }

    fn cm(&self, _alpha: f64, _mach: f64) -> f64 {
        self.cm0
    }

    fn cl_alpha(&self, _alpha: f64, mach: f64) -> f64 {
        self.lift_slope(mach).val
    }

    fn cdp_alpha(&self, alpha: f64, mach: f64) -> f64 {
        let slope = self.lift_slope(mach).val;
        2.0 * self.pressure_factor().val * self.cl(alpha, mach) * slope
    }

    fn cdf_alpha(&self, _alpha: f64, _mach: f64) -> f64 {
        0.0
    }

    fn dcl_dchi(&self, alpha: f64, mach: f64) -> DVector<f64> {
        self.cl_full(alpha, mach).grad
    }

    fn dcdp_dchi(&self, alpha: f64, mach: f64) -> DVector<f64> {
        self.cdp_full(alpha, mach).grad
    }

    fn dcdf_dchi(&self, _alpha: f64, _mach: f64) -> DVector<f64> {
        self.cdf_full().grad
    }

    fn scaling(&self) -> &SectionScaling {
        &self.scaling
    }

    fn scaled_copy(&self, scaling: &SectionScaling) -> Box<dyn SectionModel> {
        Box::new(Self {
            alpha0: self.alpha0,
            cm0: self.cm0,
            re_unit: self.re_unit,
            scaling: scaling.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::DEG_TO_RAD;
    use approx::assert_relative_eq;

    fn section() -> AnalyticAirfoil {
        // chi = [chord, rel_thick, sweep] for the finite-difference checks
        let scaling = SectionScaling {
            sref: Grad::basis(5.0, 3, 0).scale(2.0),
            lref: Grad::basis(4.6, 3, 0),
            rel_thick: Grad::basis(0.15, 3, 1),
            sweep: Grad::basis(30.0 * DEG_TO_RAD, 3, 2),
        };
        let reference = AnalyticAirfoil::new(-2.0 * DEG_TO_RAD, -0.1, 2.5e6, 3);
        AnalyticAirfoil {
            alpha0: reference.alpha0,
            cm0: reference.cm0,
            re_unit: reference.re_unit,
            scaling,
        }
    }

    #[test]
    fn lift_is_linear_in_alpha() {
        let a = section();
        let slope = a.cl_alpha(0.0, 0.7);
        assert_relative_eq!(a.cl(-2.0 * DEG_TO_RAD, 0.7), 0.0, epsilon = 1e-14);
        assert_relative_eq!(
            a.cl(1.0 * DEG_TO_RAD, 0.7),
            slope * 3.0 * DEG_TO_RAD,
            epsilon = 1e-12
        );
    }

    #[test]
    fn drag_splits_into_pressure_and_friction() {
        let a = section();
        let alpha = 2.0 * DEG_TO_RAD;
        assert_relative_eq!(
            a.cd(alpha, 0.7),
            a.cdp(alpha, 0.7) + a.cdf(alpha, 0.7),
            epsilon = 1e-15
        );
        assert!(a.cdf(alpha, 0.7) > 0.0);
        assert!(a.cdp(alpha, 0.7) > 0.0);
    }

    #[test]
    fn angle_derivatives_match_finite_differences() {
        let a = section();
        let alpha = 2.5 * DEG_TO_RAD;
        let h = 1e-7;
        let fd_cl = (a.cl(alpha + h, 0.7) - a.cl(alpha - h, 0.7)) / (2.0 * h);
        let fd_cdp = (a.cdp(alpha + h, 0.7) - a.cdp(alpha - h, 0.7)) / (2.0 * h);
        assert_relative_eq!(a.cl_alpha(alpha, 0.7), fd_cl, epsilon = 1e-6);
        assert_relative_eq!(a.cdp_alpha(alpha, 0.7), fd_cdp, epsilon = 1e-6);
        assert_relative_eq!(a.cdf_alpha(alpha, 0.7), 0.0);
    }

    #[test]
    fn chi_rows_match_finite_differences() {
        let a = section();
        let alpha = 2.0 * DEG_TO_RAD;
        let mach = 0.7;
        let h = 1e-7;

        let perturbed = |dt: f64, ds: f64, dl: f64| {
            let mut s = a.scaling.clone();
            s.rel_thick = &s.rel_thick + dt;
            s.sweep = &s.sweep + ds;
            s.lref = &s.lref + dl;
            let b = a.scaled_copy(&s);
            (b.cl(alpha, mach), b.cdp(alpha, mach), b.cdf(alpha, mach))
        };

        // column 1: rel_thick
        let (clp, cdpp, cdfp) = perturbed(h, 0.0, 0.0);
        let (clm, cdpm, cdfm) = perturbed(-h, 0.0, 0.0);
        assert_relative_eq!(
            a.dcl_dchi(alpha, mach)[1],
            (clp - clm) / (2.0 * h),
            epsilon = 1e-5
        );
        assert_relative_eq!(
            a.dcdp_dchi(alpha, mach)[1],
            (cdpp - cdpm) / (2.0 * h),
            epsilon = 1e-5
        );
        assert_relative_eq!(
            a.dcdf_dchi(alpha, mach)[1],
            (cdfp - cdfm) / (2.0 * h),
            epsilon = 1e-5
        );

        // column 2: sweep
        let (clp, cdpp, _) = perturbed(0.0, h, 0.0);
        let (clm, cdpm, _) = perturbed(0.0, -h, 0.0);
        assert_relative_eq!(
            a.dcl_dchi(alpha, mach)[2],
            (clp - clm) / (2.0 * h),
            epsilon = 1e-5
        );
        assert_relative_eq!(
            a.dcdp_dchi(alpha, mach)[2],
            (cdpp - cdpm) / (2.0 * h),
            epsilon = 1e-5
        );

        // column 0: chord through the friction Reynolds number
        let (_, _, cdfp) = perturbed(0.0, 0.0, h);
        let (_, _, cdfm) = perturbed(0.0, 0.0, -h);
        assert_relative_eq!(
            a.dcdf_dchi(alpha, mach)[0],
            (cdfp - cdfm) / (2.0 * h),
            epsilon = 1e-5
        );
    }
}
