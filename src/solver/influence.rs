use crate::geometry::WingGeometry;
use nalgebra::DMatrix;
use std::f64::consts::PI;

/// Aerodynamic influence of the trailing horseshoe vortices on the control
/// stations: `k[(i, j)]` maps the normalized circulation of panel `j` to the
/// induced angle at station `i`, and `k_grad[m]` holds the matrix derivative
/// with respect to design variable `m`.
#[derive(Debug, Clone)]
pub struct InfluenceMatrix {
    pub k: DMatrix<f64>,
    pub k_grad: Vec<DMatrix<f64>>,
}

impl InfluenceMatrix {
    /// Downwash of straight semi-infinite trailing legs shed at the panel
    /// boundaries. Control stations sit strictly inside the panels, so no
    /// denominator vanishes.
    pub fn assemble(geom: &WingGeometry) -> Self {
        let n = geom.n_sect;
        let ndv = geom.ndv;
        let quarter_pi = 1.0 / (4.0 * PI);

        let mut k = DMatrix::zeros(n, n);
        let mut k_grad = vec![DMatrix::zeros(n, n); ndv];

        for i in 0..n {
            for j in 0..n {
                let left = (&geom.y[i] - &geom.eta_y[j]).recip();
                let right = (&geom.y[i] - &geom.eta_y[j + 1]).recip();
                let term = (left - right).scale(quarter_pi);
                k[(i, j)] = term.val;
                for m in 0..ndv {
                    k_grad[m][(i, j)] = term.grad[m];
                }
            }
        }

        Self { k, k_grad }
    }
}
