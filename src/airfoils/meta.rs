use super::{SectionModel, SectionScaling};
use nalgebra::DVector;
use std::sync::Arc;

/// Evaluation point handed to a surrogate: local angle plus the section's
/// geometric state.
#[derive(Debug, Clone, Copy)]
pub struct SurrogateInputs {
    pub alpha: f64,
    pub mach: f64,
    pub rel_thick: f64,
    pub sweep: f64,
}

/// Surrogate prediction: value and partials at the evaluation point.
#[derive(Debug, Clone, Copy)]
pub struct SurrogateOutput {
    pub value: f64,
    pub d_alpha: f64,
    pub d_mach: f64,
    pub d_rel_thick: f64,
    pub d_sweep: f64,
}

/// A trained meta-model supplying sectional coefficients and their partials.
/// The engine treats it as a black box and only chains its partials through
/// the section's geometric gradients.
pub trait SurrogateModel: Send + Sync {
    fn cl(&self, inputs: &SurrogateInputs) -> SurrogateOutput;
    fn cdp(&self, inputs: &SurrogateInputs) -> SurrogateOutput;
    fn cdf(&self, inputs: &SurrogateInputs) -> SurrogateOutput;
    fn cm(&self, inputs: &SurrogateInputs) -> SurrogateOutput;
}

/// Sectional model backed by a shared surrogate. Design sensitivities come
/// from the surrogate's `rel_thick`/`sweep` partials chained through the
/// section's gradient rows; Mach is fixed by the operating condition and
/// carries no design dependence.
#[derive(Clone)]
pub struct MetaAirfoil {
    model: Arc<dyn SurrogateModel>,
    scaling: SectionScaling,
}

impl MetaAirfoil {
    pub fn new(model: Arc<dyn SurrogateModel>, ndv: usize) -> Self {
        Self {
            model,
            scaling: SectionScaling::reference(ndv),
        }
    }

    fn inputs(&self, alpha: f64, mach: f64) -> SurrogateInputs {
        SurrogateInputs {
            alpha,
            mach,
            rel_thick: self.scaling.rel_thick.val,
            sweep: self.scaling.sweep.val,
        }
    }

    fn chi_row(&self, out: &SurrogateOutput) -> DVector<f64> {
        &self.scaling.rel_thick.grad * out.d_rel_thick + &self.scaling.sweep.grad * out.d_sweep
    }
}

impl SectionModel for MetaAirfoil {
    fn cl(&self, alpha: f64, mach: f64) -> f64 {
        self.model.cl(&self.inputs(alpha, mach)).value
    }

    fn cdp(&self, alpha: f64, mach: f64) -> f64 {
        self.model.cdp(&self.inputs(alpha, mach)).value
    }

    fn cdf(&self, alpha: f64, mach: f64) -> f64 {
        self.model.cdf(&self.inputs(alpha, mach)).value
    }

    fn cm(&self, alpha: f64, mach: f64) -> f64 {
        self.model.cm(&self.inputs(alpha, mach)).value
    }

    fn cl_alpha(&self, alpha: f64, mach: f64) -> f64 {
        self.model.cl(&self.inputs(alpha, mach)).d_alpha
    }

    fn cdp_alpha(&self, alpha: f64, mach: f64) -> f64 {
        self.model.cdp(&self.inputs(alpha, mach)).d_alpha
    }

    fn cdf_alpha(&self, alpha: f64, mach: f64) -> f64 {
        self.model.cdf(&self.inputs(alpha, mach)).d_alpha
    }

    fn dcl_dchi(&self, alpha: f64, mach: f64) -> DVector<f64> {
        self.chi_row(&self.model.cl(&self.inputs(alpha, mach)))
    }

    fn dcdp_dchi(&self, alpha: f64, mach: f64) -> DVector<f64> {
        self.chi_row(&self.model.cdp(&self.inputs(alpha, mach)))
    }

    fn dcdf_dchi(&self, alpha: f64, mach: f64) -> DVector<f64> {
        self.chi_row(&self.model.cdf(&self.inputs(alpha, mach)))
    }

    fn scaling(&self) -> &SectionScaling {
        &self.scaling
    }

    fn scaled_copy(&self, scaling: &SectionScaling) -> Box<dyn SectionModel> {
        Box::new(Self {
            model: Arc::clone(&self.model),
            scaling: scaling.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::Grad;
    use approx::assert_relative_eq;

    /// cl = 6 a (1 + t) cos(sweep), drags quadratic/constant, enough structure
    /// to exercise every chained partial.
    struct Quadratic;

    impl SurrogateModel for Quadratic {
        fn cl(&self, x: &SurrogateInputs) -> SurrogateOutput {
            let c = x.sweep.cos();
            SurrogateOutput {
                value: 6.0 * x.alpha * (1.0 + x.rel_thick) * c,
                d_alpha: 6.0 * (1.0 + x.rel_thick) * c,
                d_mach: 0.0,
                d_rel_thick: 6.0 * x.alpha * c,
                d_sweep: -6.0 * x.alpha * (1.0 + x.rel_thick) * x.sweep.sin(),
            }
        }

        fn cdp(&self, x: &SurrogateInputs) -> SurrogateOutput {
            let cl = self.cl(x);
            SurrogateOutput {
                value: 0.02 * cl.value * cl.value,
                d_alpha: 0.04 * cl.value * cl.d_alpha,
                d_mach: 0.0,
                d_rel_thick: 0.04 * cl.value * cl.d_rel_thick,
                d_sweep: 0.04 * cl.value * cl.d_sweep,
            }
        }

        fn cdf(&self, _x: &SurrogateInputs) -> SurrogateOutput {
            SurrogateOutput {
                value: 0.006,
                d_alpha: 0.0,
                d_mach: 0.0,
                d_rel_thick: 0.0,
                d_sweep: 0.0,
            }
        }

        fn cm(&self, _x: &SurrogateInputs) -> SurrogateOutput {
            SurrogateOutput {
                value: -0.1,
                d_alpha: 0.0,
                d_mach: 0.0,
                d_rel_thick: 0.0,
                d_sweep: 0.0,
            }
        }
    }

    fn section() -> Box<dyn SectionModel> {
        let scaling = SectionScaling {
            sref: Grad::constant(2.0, 2),
            lref: Grad::constant(1.5, 2),
            rel_thick: Grad::basis(0.12, 2, 0),
            sweep: Grad::basis(0.5, 2, 1),
        };
        MetaAirfoil::new(Arc::new(Quadratic), 2).scaled_copy(&scaling)
    }

    #[test]
    fn values_and_slopes_come_from_the_surrogate() {
        let a = section();
        let alpha = 0.05;
        assert_relative_eq!(
            a.cl(alpha, 0.7),
            6.0 * alpha * 1.12 * 0.5_f64.cos(),
            epsilon = 1e-12
        );
        let h = 1e-7;
        let fd = (a.cl(alpha + h, 0.7) - a.cl(alpha - h, 0.7)) / (2.0 * h);
        assert_relative_eq!(a.cl_alpha(alpha, 0.7), fd, epsilon = 1e-6);
    }

    #[test]
    fn chi_rows_chain_through_section_gradients() {
        let a = section();
        let alpha = 0.05;
        let row = a.dcl_dchi(alpha, 0.7);
        // column 0 carries the rel_thick partial, column 1 the sweep partial
        assert_relative_eq!(row[0], 6.0 * alpha * 0.5_f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(
            row[1],
            -6.0 * alpha * 1.12 * 0.5_f64.sin(),
            epsilon = 1e-12
        );
        assert_eq!(a.dcdf_dchi(alpha, 0.7).norm(), 0.0);
    }
}
