use super::{SectionModel, SectionScaling};
use nalgebra::DVector;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolarError {
    #[error("a polar table needs at least two angle samples, got {0}")]
    TooFewSamples(usize),
    #[error("polar angle grid must be strictly increasing (index {0})")]
    NonMonotonicAlpha(usize),
    #[error("polar column '{name}' has {got} entries, expected {expected}")]
    ColumnLength {
        name: &'static str,
        got: usize,
        expected: usize,
    },
}

/// Immutable tabulated polar: coefficient columns sampled on a strictly
/// increasing angle grid (radians), evaluated by linear interpolation with
/// constant extrapolation of the end slopes.
#[derive(Debug)]
pub struct PolarTable {
    alpha: Vec<f64>,
    cl: Vec<f64>,
    cdp: Vec<f64>,
    cdf: Vec<f64>,
    cm: Vec<f64>,
}

impl PolarTable {
    pub fn new(
        alpha: Vec<f64>,
        cl: Vec<f64>,
        cdp: Vec<f64>,
        cdf: Vec<f64>,
        cm: Vec<f64>,
    ) -> Result<Self, PolarError> {
        let n = alpha.len();
        if n < 2 {
            return Err(PolarError::TooFewSamples(n));
        }
        for i in 1..n {
            if alpha[i] <= alpha[i - 1] {
                return Err(PolarError::NonMonotonicAlpha(i));
            }
        }
        for (name, col) in [("cl", &cl), ("cdp", &cdp), ("cdf", &cdf), ("cm", &cm)] {
            if col.len() != n {
                return Err(PolarError::ColumnLength {
                    name,
                    got: col.len(),
                    expected: n,
                });
            }
        }
        Ok(Self {
            alpha,
            cl,
            cdp,
            cdf,
            cm,
        })
    }

    /// Bracketing segment for `alpha`, clamped to the end segments.
    fn segment(&self, alpha: f64) -> usize {
        let n = self.alpha.len();
        match self.alpha.partition_point(|&a| a <= alpha) {
            0 => 0,
            k if k >= n => n - 2,
            k => k - 1,
        }
    }

    fn interp(&self, col: &[f64], alpha: f64) -> f64 {
        let k = self.segment(alpha);
        let t = (alpha - self.alpha[k]) / (self.alpha[k + 1] - self.alpha[k]);
        col[k] + t * (col[k + 1] - col[k])
    }

    fn slope(&self, col: &[f64], alpha: f64) -> f64 {
        let k = self.segment(alpha);
        (col[k + 1] - col[k]) / (self.alpha[k + 1] - self.alpha[k])
    }
}

/// Sectional model backed by a shared rigid polar: the table does not depend
/// on the design vector, so the direct chi rows are zero. Area and length
/// gradients still flow through the scaling.
#[derive(Clone)]
pub struct PolarAirfoil {
    table: Arc<PolarTable>,
    scaling: SectionScaling,
}

impl PolarAirfoil {
    pub fn new(table: Arc<PolarTable>, ndv: usize) -> Self {
        Self {
            table,
            scaling: SectionScaling::reference(ndv),
        }
    }

    fn zeros(&self) -> DVector<f64> {
        DVector::zeros(self.scaling.sref.ndv())
    }
}

impl SectionModel for PolarAirfoil {
    fn cl(&self, alpha: f64, _mach: f64) -> f64 {
        self.table.interp(&self.table.cl, alpha)
    }

    fn cdp(&self, alpha: f64, _mach: f64) -> f64 {
        self.table.interp(&self.table.cdp, alpha)
    }

    fn cdf(&self, alpha: f64, _mach: f64) -> f64 {
        self.table.interp(&self.table.cdf, alpha)
    }

    fn cm(&self, alpha: f64, _mach: f64) -> f64 {
        self.table.interp(&self.table.cm, alpha)
    }

    fn cl_alpha(&self, alpha: f64, _mach: f64) -> f64 {
        self.table.slope(&self.table.cl, alpha)
    }

    fn cdp_alpha(&self, alpha: f64, _mach: f64) -> f64 {
        self.table.slope(&self.table.cdp, alpha)
    }

    fn cdf_alpha(&self, alpha: f64, _mach: f64) -> f64 {
        self.table.slope(&self.table.cdf, alpha)
    }

    fn dcl_dchi(&self, _alpha: f64, _mach: f64) -> DVector<f64> {
        self.zeros()
    }

    fn dcdp_dchi(&self, _alpha: f64, _mach: f64) -> DVector<f64> {
        self.zeros()
    }

    fn dcdf_dchi(&self, _alpha: f64, _mach: f64) -> DVector<f64> {
        self.zeros()
    }

    fn scaling(&self) -> &SectionScaling {
        &self.scaling
    }

    fn scaled_copy(&self, scaling: &SectionScaling) -> Box<dyn SectionModel> {
        Box::new(Self {
            table: Arc::clone(&self.table),
            scaling: scaling.clone(),
        })
    }
}
