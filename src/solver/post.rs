use super::direct::DirectSolution;
use crate::airfoils::SectionModel;
use crate::conditions::OperatingCondition;
use crate::geometry::WingGeometry;
use nalgebra::DVector;
use std::fmt;

/// Fixed evaluation order of the built-in aerodynamic functions.
pub const DEFAULT_FUNCTIONS: [&str; 9] = [
    "Lift",
    "Drag",
    "Drag_Pressure",
    "Drag_Friction",
    "Cl",
    "Cd",
    "Cdp",
    "Cdf",
    "LoD",
];

/// One aerodynamic function with its three derivative channels.
#[derive(Debug, Clone)]
pub struct FunctionValue {
    pub value: f64,
    /// length N
    pub d_diaoa: DVector<f64>,
    /// length ndv
    pub d_dchi: DVector<f64>,
    pub d_daoa: f64,
}

#[derive(Debug, Clone)]
pub struct FunctionEntry {
    pub name: String,
    /// `None` for unrecognized function names.
    pub result: Option<FunctionValue>,
}

#[derive(Debug, Clone, Default)]
pub struct PostResults {
    pub entries: Vec<FunctionEntry>,
}

impl PostResults {
    pub fn get(&self, name: &str) -> Option<&FunctionValue> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.result.as_ref())
    }
}

impl fmt::Display for PostResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*** aerodynamic functions ***")?;
        for entry in &self.entries {
            match &entry.result {
                Some(v) => writeln!(f, "  {:<14} = {:>13.6e}", entry.name, v.value)?,
                None => writeln!(f, "  {:<14} = (unknown function)", entry.name)?,
            }
        }
        Ok(())
    }
}

/// Which sectional drag contribution feeds an aggregate, and whether the
/// induced rotation of the local lift vector is included.
#[derive(Clone, Copy)]
enum DragChannel {
    Total,
    Pressure,
    Friction,
}

/// Reference-area-weighted aggregation of the sectional coefficients over the
/// converged state, with the full chain rule for each derivative channel.
/// Every run rebuilds the complete function list; nothing is updated in
/// place.
pub struct PostProcessor<'a> {
    geom: &'a WingGeometry,
    airfoils: &'a [Box<dyn SectionModel>],
    oc: &'a OperatingCondition,
    solution: &'a DirectSolution,
}

struct Coeff {
    value: f64,
    d_diaoa: DVector<f64>,
    d_dchi: DVector<f64>,
    d_daoa: f64,
}

impl<'a> PostProcessor<'a> {
    pub fn new(
        geom: &'a WingGeometry,
        airfoils: &'a [Box<dyn SectionModel>],
        oc: &'a OperatingCondition,
        solution: &'a DirectSolution,
    ) -> Self {
        Self {
            geom,
            airfoils,
            oc,
            solution,
        }
    }

    pub fn run_default(&self) -> PostResults {
        self.run(&DEFAULT_FUNCTIONS)
    }

    pub fn run(&self, names: &[&str]) -> PostResults {
        let cl = self.comp_cl();
        let cd = self.comp_cd(DragChannel::Total);
        let cdp = self.comp_cd(DragChannel::Pressure);
        let cdf = self.comp_cd(DragChannel::Friction);

        let entries = names
            .iter()
            .map(|&name| {
                let result = match name {
                    "Cl" => Some(to_value(&cl)),
                    "Cd" => Some(to_value(&cd)),
                    "Cdp" => Some(to_value(&cdp)),
                    "Cdf" => Some(to_value(&cdf)),
                    "Lift" => Some(self.scaled_force(&cl)),
                    "Drag" => Some(self.scaled_force(&cd)),
                    "Drag_Pressure" => Some(self.scaled_force(&cdp)),
                    "Drag_Friction" => Some(self.scaled_force(&cdf)),
                    "LoD" => Some(ratio(&cl, &cd)),
                    _ => None,
                };
                FunctionEntry {
                    name: name.to_string(),
                    result,
                }
            })
            .collect();
        PostResults { entries }
    }

    /// Cl = sum_i cl_i sref_i / sref_total
    fn comp_cl(&self) -> Coeff {
        let n = self.geom.n_sect;
        let ndv = self.geom.ndv;
        let mach = self.oc.mach();
        let local = &self.solution.local_aoa;
        let s_total = self.geom.sref_total.val;

        let mut sum = 0.0;
        let mut dsum_dchi = DVector::zeros(ndv);
        let mut d_diaoa = DVector::zeros(n);
        let mut d_daoa = 0.0;

        for i in 0..n {
            let a = &self.airfoils[i];
            let s = a.sref();
            let cl = a.cl(local[i], mach);
            let cl_alpha = a.cl_alpha(local[i], mach);

            sum += cl * s.val;
            // partial at fixed iAoA: twist row through the local angle plus
            // the airfoil's own chi row, then the area weight's row
            dsum_dchi += (a.dcl_dchi(local[i], mach)
                + &self.solution.dlocal_dchi.row(i).transpose() * cl_alpha)
                * s.val
                + &s.grad * cl;
            d_diaoa[i] = cl_alpha * self.solution.dlocal_diaoa[(i, i)] * s.val / s_total;
            d_daoa += cl_alpha * self.solution.dlocal_daoa[i] * s.val / s_total;
        }

        Coeff {
            value: sum / s_total,
            d_diaoa,
            d_dchi: quotient_rule(sum, &dsum_dchi, &self.geom.sref_total),
            d_daoa,
        }
    }

    /// Drag aggregates: the total and pressure channels include the induced
    /// rotation of the local lift vector, cl_i sin(iAoA_i); friction is pure
    /// profile drag.
    fn comp_cd(&self, channel: DragChannel) -> Coeff {
        let n = self.geom.n_sect;
        let ndv = self.geom.ndv;
        let mach = self.oc.mach();
        let local = &self.solution.local_aoa;
        let i_aoa = &self.solution.i_aoa;
        let s_total = self.geom.sref_total.val;

        let mut sum = 0.0;
        let mut dsum_dchi = DVector::zeros(ndv);
        let mut d_diaoa = DVector::zeros(n);
        let mut d_daoa = 0.0;

        for i in 0..n {
            let a = &self.airfoils[i];
            let s = a.sref();
            let (profile, profile_alpha, dprofile) = match channel {
                DragChannel::Total => (
                    a.cd(local[i], mach),
                    a.cd_alpha(local[i], mach),
                    a.dcd_dchi(local[i], mach),
                ),
                DragChannel::Pressure => (
                    a.cdp(local[i], mach),
                    a.cdp_alpha(local[i], mach),
                    a.dcdp_dchi(local[i], mach),
                ),
                DragChannel::Friction => (
                    a.cdf(local[i], mach),
                    a.cdf_alpha(local[i], mach),
                    a.dcdf_dchi(local[i], mach),
                ),
            };
            let induced = match channel {
                DragChannel::Total | DragChannel::Pressure => true,
                DragChannel::Friction => false,
            };

            let cl = a.cl(local[i], mach);
            let cl_alpha = a.cl_alpha(local[i], mach);
            let (sin_i, cos_i) = i_aoa[i].sin_cos();

            let cd_i = if induced { cl * sin_i + profile } else { profile };
            sum += cd_i * s.val;

            // local-angle sensitivity of the section drag at fixed iAoA
            let cd_i_alpha = if induced {
                cl_alpha * sin_i + profile_alpha
            } else {
                profile_alpha
            };

            let mut dcd_i = dprofile;
            if induced {
                dcd_i += a.dcl_dchi(local[i], mach) * sin_i;
            }
            dsum_dchi += (dcd_i
                + &self.solution.dlocal_dchi.row(i).transpose() * cd_i_alpha)
                * s.val
                + &s.grad * cd_i;

            // iAoA enters both through the local angle and, for the induced
            // term, directly through sin(iAoA_i)
            let mut di = cd_i_alpha * self.solution.dlocal_diaoa[(i, i)];
            if induced {
                di += cl * cos_i;
            }
            d_diaoa[i] = di * s.val / s_total;
            d_daoa += cd_i_alpha * self.solution.dlocal_daoa[i] * s.val / s_total;
        }

        Coeff {
            value: sum / s_total,
            d_diaoa,
            d_dchi: quotient_rule(sum, &dsum_dchi, &self.geom.sref_total),
            d_daoa,
        }
    }

    /// Force = Pdyn sref_total C, product rule over the area's design row.
    fn scaled_force(&self, c: &Coeff) -> FunctionValue {
        let q = self.oc.pdyn();
        let s = &self.geom.sref_total;
        FunctionValue {
            value: q * s.val * c.value,
            d_diaoa: &c.d_diaoa * (q * s.val),
            d_dchi: &c.d_dchi * (q * s.val) + &s.grad * (q * c.value),
            d_daoa: q * s.val * c.d_daoa,
        }
    }
}

fn to_value(c: &Coeff) -> FunctionValue {
    FunctionValue {
        value: c.value,
        d_diaoa: c.d_diaoa.clone(),
        d_dchi: c.d_dchi.clone(),
        d_daoa: c.d_daoa,
    }
}

/// d(sum/S) = (dsum S - sum dS) / S^2
fn quotient_rule(sum: f64, dsum: &DVector<f64>, s_total: &crate::gradient::Grad) -> DVector<f64> {
    (dsum * s_total.val - &s_total.grad * sum) / (s_total.val * s_total.val)
}

/// LoD = Cl / Cd on every channel.
fn ratio(num: &Coeff, den: &Coeff) -> FunctionValue {
    let d2 = den.value * den.value;
    FunctionValue {
        value: num.value / den.value,
        d_diaoa: (&num.d_diaoa * den.value - &den.d_diaoa * num.value) / d2,
        d_dchi: (&num.d_dchi * den.value - &den.d_dchi * num.value) / d2,
        d_daoa: (num.d_daoa * den.value - den.d_daoa * num.value) / d2,
    }
}
