use crate::conditions::DEG_TO_RAD;
use crate::design::{DesignError, DesignVariableSet};
use crate::gradient::Grad;
use glam::DVec3;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("the number of wing sections must be even, got {0}")]
    OddSectionCount(usize),
    #[error("break station must lie strictly inside the half-span, got fraction {0}")]
    InvalidBreakpoint(f64),
    #[error("non-positive chord {value:.6e} at section {section}")]
    NonPositiveChord { section: usize, value: f64 },
    #[error("structural rotation length {got} does not match section count {expected}")]
    DisplacementMismatch { got: usize, expected: usize },
    #[error(transparent)]
    Design(#[from] DesignError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanformLaw {
    Rectangular,
    Elliptic,
    Broken,
}

impl PlanformLaw {
    pub fn name(&self) -> &'static str {
        match self {
            PlanformLaw::Rectangular => "Rectangular",
            PlanformLaw::Elliptic => "Elliptic",
            PlanformLaw::Broken => "Broken",
        }
    }
}

/// Piecewise-linear planform description: declares its parameters on a
/// [`DesignVariableSet`] and discretizes the half-span-symmetric wing into
/// `n_sect` spanwise sections with full forward derivatives.
#[derive(Debug, Clone)]
pub struct WingPlanform {
    law: PlanformLaw,
    n_sect: usize,
}

impl WingPlanform {
    pub fn new(law: PlanformLaw, n_sect: usize) -> Result<Self, GeometryError> {
        if n_sect % 2 != 0 {
            return Err(GeometryError::OddSectionCount(n_sect));
        }
        Ok(Self { law, n_sect })
    }

    pub fn law(&self) -> PlanformLaw {
        self.law
    }

    pub fn n_sect(&self) -> usize {
        self.n_sect
    }

    /// Declare the planform parameters as fixed bindings and the symmetric
    /// twist distribution as bounded design variables. Callers promote
    /// planform parameters to design variables afterwards as needed.
    pub fn register_variables(&self, vars: &mut DesignVariableSet) -> Result<(), DesignError> {
        vars.add_fixed("span", 0.0)?;
        if self.law != PlanformLaw::Elliptic {
            vars.add_fixed("sweep", 0.0)?;
        }
        match self.law {
            PlanformLaw::Rectangular | PlanformLaw::Elliptic => {
                vars.add_fixed("root_chord", 0.0)?;
                vars.add_fixed("root_height", 0.0)?;
                vars.add_fixed("tip_height", 0.0)?;
            }
            PlanformLaw::Broken => {
                vars.add_fixed("break_percent", 33.0)?;
                vars.add_fixed("root_chord", 0.0)?;
                vars.add_fixed("break_chord", 0.0)?;
                vars.add_fixed("tip_chord", 0.0)?;
                vars.add_fixed("root_height", 0.0)?;
                vars.add_fixed("break_height", 0.0)?;
                vars.add_fixed("tip_height", 0.0)?;
            }
        }
        // one twist variable per half-span station, mirrored onto both sides
        for k in 0..self.n_sect / 2 {
            vars.add_design(&format!("rtwist{k}"), 0.0, (-10.0, 10.0))?;
        }
        Ok(())
    }

    /// Discretize the wing for the current design-variable values. `theta_y`
    /// is the per-section pitch rotation coming from an external structural
    /// displacement field; `None` means an undeformed wing.
    pub fn build(
        &self,
        vars: &DesignVariableSet,
        theta_y: Option<&[f64]>,
    ) -> Result<WingGeometry, GeometryError> {
        let n_sect = self.n_sect;
        let half = n_sect / 2;
        let ndv = vars.ndv();

        let theta_y = match theta_y {
            Some(t) if t.len() != n_sect => {
                return Err(GeometryError::DisplacementMismatch {
                    got: t.len(),
                    expected: n_sect,
                })
            }
            Some(t) => t.to_vec(),
            None => vec![0.0; n_sect],
        };

        let span = vars.value("span")?;
        let sweep = if self.law != PlanformLaw::Elliptic {
            vars.value("sweep")?.scale(DEG_TO_RAD)
        } else {
            Grad::constant(0.0, ndv)
        };

        let mut twist = Vec::with_capacity(n_sect);
        for i in 0..n_sect {
            let k = if i < half { half - 1 - i } else { i - half };
            twist.push(vars.value(&format!("rtwist{k}"))?.scale(DEG_TO_RAD));
        }

        let (chords, rel_thicks) = self.build_sections(vars, ndv)?;

        for (i, c) in chords.iter().enumerate() {
            if c.val <= 0.0 {
                return Err(GeometryError::NonPositiveChord {
                    section: i,
                    value: c.val,
                });
            }
        }

        // quarter-chord positions; only the pitch component of the structural
        // displacement enters the angle chain, so positions stay undeformed
        let cos_sweep = sweep.cos();
        let mut x = Vec::with_capacity(n_sect);
        let mut y = Vec::with_capacity(n_sect);
        let mut z = Vec::with_capacity(n_sect);
        for (i, chord) in chords.iter().enumerate() {
            let r = station(i, half);
            x.push(chord.scale(0.25) + (&span * &cos_sweep).scale(r.abs() / 2.0));
            y.push(span.scale(r / 2.0));
            z.push(Grad::constant(0.0, ndv));
        }

        // N+1 panel boundary stations for the induced-velocity integration
        let mut eta_y = Vec::with_capacity(n_sect + 1);
        for j in 0..=n_sect {
            let f = (j as f64 - half as f64) / half as f64;
            eta_y.push(span.scale(f / 2.0));
        }

        let mut s_loc = Vec::with_capacity(n_sect);
        let mut sref_total = Grad::constant(0.0, ndv);
        for chord in &chords {
            let s = (&span * chord).scale(1.0 / n_sect as f64);
            sref_total = sref_total + &s;
            s_loc.push(s);
        }

        Ok(WingGeometry {
            n_sect,
            ndv,
            law: self.law,
            sweep,
            chords,
            rel_thicks,
            twist,
            theta_y,
            x,
            y,
            z,
            eta_y,
            s_loc,
            sref_total,
        })
    }

    fn build_sections(
        &self,
        vars: &DesignVariableSet,
        ndv: usize,
    ) -> Result<(Vec<Grad>, Vec<Grad>), GeometryError> {
        let n_sect = self.n_sect;
        let half = n_sect / 2;
        let mut chords = Vec::with_capacity(n_sect);
        let mut rel_thicks = Vec::with_capacity(n_sect);

        match self.law {
            PlanformLaw::Elliptic => {
                let root_chord = vars.value("root_chord")?;
                let root_height = vars.value("root_height")?;
                let tip_height = vars.value("tip_height")?;
                for i in 0..n_sect {
                    let r = station(i, half);
                    let chord = root_chord.scale((1.0 - r * r).sqrt());
                    let height =
                        (&tip_height - &root_height).scale(r.abs()) + &root_height;
                    rel_thicks.push(&height / &chord);
                    chords.push(chord);
                }
            }
            PlanformLaw::Rectangular => {
                let root_chord = vars.value("root_chord")?;
                let root_height = vars.value("root_height")?;
                let tip_height = vars.value("tip_height")?;
                for i in 0..n_sect {
                    let r = station(i, half);
                    let height =
                        (&tip_height - &root_height).scale(r.abs()) + &root_height;
                    rel_thicks.push(&height / &root_chord);
                    chords.push(root_chord.clone());
                }
            }
            PlanformLaw::Broken => {
                let p = vars.value("break_percent")?.scale(0.01);
                if p.val <= 0.0 || p.val >= 1.0 {
                    return Err(GeometryError::InvalidBreakpoint(p.val));
                }
                let root_chord = vars.value("root_chord")?;
                let break_chord = vars.value("break_chord")?;
                let tip_chord = vars.value("tip_chord")?;
                let root_height = vars.value("root_height")?;
                let break_height = vars.value("break_height")?;
                let tip_height = vars.value("tip_height")?;
                for i in 0..n_sect {
                    let r = station(i, half).abs();
                    let (chord, height) = if r <= p.val {
                        // inboard branch; the interpolation coefficient r/p is
                        // itself design-dependent through p
                        let coeff = p.recip().scale(r);
                        (
                            broken_interp(&root_chord, &break_chord, &coeff),
                            broken_interp(&root_height, &break_height, &coeff),
                        )
                    } else {
                        let num = Grad::constant(r, ndv) - &p;
                        let den = Grad::constant(1.0, ndv) - &p;
                        let coeff = &num / &den;
                        (
                            broken_interp(&break_chord, &tip_chord, &coeff),
                            broken_interp(&break_height, &tip_height, &coeff),
                        )
                    };
                    rel_thicks.push(&height / &chord);
                    chords.push(chord);
                }
            }
        }
        Ok((chords, rel_thicks))
    }
}

/// Normalized spanwise station of section `i`, in (-1, 1).
fn station(i: usize, half: usize) -> f64 {
    (i as f64 + 0.5 - half as f64) / half as f64
}

/// Linear interpolation `(b - a) * coeff + a` with the coefficient's own
/// gradient carried through the product rule.
fn broken_interp(a: &Grad, b: &Grad, coeff: &Grad) -> Grad {
    (b - a) * coeff + a
}

/// Discretized wing: per-section planform scalars, boundary stations and
/// reference areas, every value carrying its ndv-column gradient row.
#[derive(Debug, Clone)]
pub struct WingGeometry {
    pub n_sect: usize,
    pub ndv: usize,
    pub law: PlanformLaw,
    pub sweep: Grad,
    pub chords: Vec<Grad>,
    pub rel_thicks: Vec<Grad>,
    /// geometric twist per section [rad]
    pub twist: Vec<Grad>,
    /// external structural pitch rotation per section [rad]
    pub theta_y: Vec<f64>,
    pub x: Vec<Grad>,
    pub y: Vec<Grad>,
    pub z: Vec<Grad>,
    /// N+1 panel boundary stations along the span
    pub eta_y: Vec<Grad>,
    /// per-section reference area
    pub s_loc: Vec<Grad>,
    pub sref_total: Grad,
}

impl WingGeometry {
    pub fn position(&self, i: usize) -> DVec3 {
        DVec3::new(self.x[i].val, self.y[i].val, self.z[i].val)
    }

    pub fn span(&self) -> f64 {
        self.eta_y[self.n_sect].val - self.eta_y[0].val
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn broken_vars(planform: &WingPlanform) -> DesignVariableSet {
        let mut vars = DesignVariableSet::new();
        planform.register_variables(&mut vars).unwrap();
        for (id, v) in [
            ("span", 34.1),
            ("sweep", 34.0),
            ("break_percent", 33.0),
            ("root_chord", 6.1),
            ("break_chord", 4.6),
            ("tip_chord", 1.5),
            ("root_height", 1.28),
            ("break_height", 0.97),
            ("tip_height", 0.33),
        ] {
            vars.set_value(id, v).unwrap();
        }
        vars.convert_to_design("span", (0.0, 50.0)).unwrap();
        vars.convert_to_design("break_percent", (20.0, 40.0)).unwrap();
        vars.convert_to_design("root_chord", (5.0, 7.0)).unwrap();
        vars
    }

    #[test]
    fn odd_section_count_rejected() {
        assert!(matches!(
            WingPlanform::new(PlanformLaw::Broken, 21),
            Err(GeometryError::OddSectionCount(21))
        ));
    }

    #[test]
    fn invalid_breakpoint_rejected() {
        let planform = WingPlanform::new(PlanformLaw::Broken, 20).unwrap();
        let mut vars = broken_vars(&planform);
        vars.convert_to_fixed("break_percent").unwrap();
        vars.set_value("break_percent", 0.0).unwrap();
        assert!(matches!(
            planform.build(&vars, None),
            Err(GeometryError::InvalidBreakpoint(_))
        ));
    }

    #[test]
    fn non_positive_chord_rejected() {
        let planform = WingPlanform::new(PlanformLaw::Rectangular, 4).unwrap();
        let mut vars = DesignVariableSet::new();
        planform.register_variables(&mut vars).unwrap();
        vars.set_value("span", 10.0).unwrap();
        assert!(matches!(
            planform.build(&vars, None),
            Err(GeometryError::NonPositiveChord { .. })
        ));
    }

    #[test]
    fn twist_distribution_is_mirrored() {
        let planform = WingPlanform::new(PlanformLaw::Broken, 20).unwrap();
        let mut vars = broken_vars(&planform);
        vars.set_value("rtwist3", 5.0).unwrap();
        let geom = planform.build(&vars, None).unwrap();
        let n = geom.n_sect;
        for i in 0..n {
            assert_relative_eq!(geom.twist[i].val, geom.twist[n - 1 - i].val);
        }
        assert_relative_eq!(geom.twist[13].val, 5.0 * DEG_TO_RAD);
    }

    #[test]
    fn both_interpolation_branches_agree_at_breakpoint() {
        // with N = 20 the station grid contains r = 0.35 exactly
        let planform = WingPlanform::new(PlanformLaw::Broken, 20).unwrap();
        let mut vars = broken_vars(&planform);
        vars.convert_to_fixed("break_percent").unwrap();
        vars.set_value("break_percent", 35.0).unwrap();
        let geom = planform.build(&vars, None).unwrap();

        // section 13 sits at r = +0.35 == p; the inboard branch must place it
        // exactly on the break chord, matching the outboard branch limit
        assert_relative_eq!(geom.chords[13].val, 4.6, epsilon = 1e-12);
        assert_relative_eq!(geom.rel_thicks[13].val, 0.97 / 4.6, epsilon = 1e-12);
        assert_relative_eq!(geom.chords[6].val, 4.6, epsilon = 1e-12);
    }

    #[test]
    fn chord_gradient_matches_finite_differences() {
        let planform = WingPlanform::new(PlanformLaw::Broken, 20).unwrap();
        let vars = broken_vars(&planform);
        let geom = planform.build(&vars, None).unwrap();

        let x0: Vec<f64> = vars.dv_vector().iter().copied().collect();
        let h = 1e-6;
        for k in 0..vars.ndv() {
            let mut vp = vars.clone();
            let mut vm = vars.clone();
            let mut xp = x0.clone();
            let mut xm = x0.clone();
            xp[k] += h;
            xm[k] -= h;
            vp.set_from_vector(&xp).unwrap();
            vm.set_from_vector(&xm).unwrap();
            let gp = planform.build(&vp, None).unwrap();
            let gm = planform.build(&vm, None).unwrap();
            for i in 0..geom.n_sect {
                let fd = (gp.chords[i].val - gm.chords[i].val) / (2.0 * h);
                assert_relative_eq!(geom.chords[i].grad[k], fd, epsilon = 1e-6);
                let fd_t = (gp.rel_thicks[i].val - gm.rel_thicks[i].val) / (2.0 * h);
                assert_relative_eq!(geom.rel_thicks[i].grad[k], fd_t, epsilon = 1e-6);
            }
            let fd_s = (gp.sref_total.val - gm.sref_total.val) / (2.0 * h);
            assert_relative_eq!(geom.sref_total.grad[k], fd_s, epsilon = 1e-5);
        }
    }

    #[test]
    fn breakpoint_gradient_cross_term_present() {
        // the interpolation coefficient depends on the break fraction, so the
        // chord gradient must pick up that column even though the chord
        // endpoints do not depend on it
        let planform = WingPlanform::new(PlanformLaw::Broken, 20).unwrap();
        let vars = broken_vars(&planform);
        let geom = planform.build(&vars, None).unwrap();
        let k = vars.dv_index("break_percent").unwrap();
        let nonzero = geom
            .chords
            .iter()
            .any(|c| c.grad[k].abs() > 1e-12);
        assert!(nonzero);
    }
}
