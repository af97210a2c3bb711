use crate::conditions::OperatingCondition;
use crate::geometry::WingGeometry;
use crate::solver::{DirectSolution, PostResults, SolveStatus};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Digest of one complete run: geometry statistics, operating point, solver
/// convergence and the aerodynamic function values.
pub struct RunSummary {
    // Geometry info
    pub planform: &'static str,
    pub n_sect: usize,
    pub ndv: usize,
    pub span: f64,
    pub sref_total: f64,
    pub root_chord: f64,
    pub tip_chord: f64,

    // Operating point
    pub mach: f64,
    pub aoa_deg: f64,
    pub altitude: f64,
    pub pdyn: f64,

    // Solver info
    pub converged: bool,
    pub iterations: Option<u32>,
    pub final_residual: Option<f64>,

    // Function values, in evaluation order
    pub functions: Vec<(String, f64)>,
}

impl RunSummary {
    pub fn from_run(geom: &WingGeometry, oc: &OperatingCondition) -> Self {
        Self {
            planform: geom.law.name(),
            n_sect: geom.n_sect,
            ndv: geom.ndv,
            span: geom.span(),
            sref_total: geom.sref_total.val,
            root_chord: geom.chords[geom.n_sect / 2].val,
            tip_chord: geom.chords[geom.n_sect - 1].val,
            mach: oc.mach(),
            aoa_deg: oc.aoa_deg(),
            altitude: oc.altitude(),
            pdyn: oc.pdyn(),
            converged: false,
            iterations: None,
            final_residual: None,
            functions: Vec::new(),
        }
    }

    pub fn add_solver_info(&mut self, solution: &DirectSolution) {
        self.converged = solution.status == SolveStatus::Converged;
        self.iterations = solution.history.last().map(|(i, _)| *i);
        self.final_residual = solution.history.last().map(|(_, r)| *r);
    }

    pub fn add_functions(&mut self, results: &PostResults) {
        self.functions = results
            .entries
            .iter()
            .filter_map(|e| e.result.as_ref().map(|v| (e.name.clone(), v.value)))
            .collect();
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file, "LIFTING-LINE RUN SUMMARY")?;
        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file)?;

        writeln!(file, "WING GEOMETRY")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Planform:            {}", self.planform)?;
        writeln!(file, "Sections:            {}", self.n_sect)?;
        writeln!(file, "Design variables:    {}", self.ndv)?;
        writeln!(file, "Span:                {:.4} m", self.span)?;
        writeln!(file, "Reference area:      {:.4} m2", self.sref_total)?;
        writeln!(file, "Root chord:          {:.4} m", self.root_chord)?;
        writeln!(file, "Tip chord:           {:.4} m", self.tip_chord)?;
        writeln!(file)?;

        writeln!(file, "OPERATING POINT")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Mach:                {:.4}", self.mach)?;
        writeln!(file, "AoA:                 {:.4} deg", self.aoa_deg)?;
        writeln!(file, "Altitude:            {:.1} m", self.altitude)?;
        writeln!(file, "Dynamic pressure:    {:.1} Pa", self.pdyn)?;
        writeln!(file)?;

        if self.iterations.is_some() {
            writeln!(file, "DIRECT SOLVE")?;
            writeln!(file, "{}", "-".repeat(60))?;
            writeln!(
                file,
                "Status:              {}",
                if self.converged {
                    "converged"
                } else {
                    "did not converge"
                }
            )?;
            if let Some(iter) = self.iterations {
                writeln!(file, "Iterations:          {}", iter)?;
            }
            if let Some(res) = self.final_residual {
                writeln!(file, "Final residual:      {:.6e}", res)?;
            }
            writeln!(file)?;
        }

        if !self.functions.is_empty() {
            writeln!(file, "AERODYNAMIC FUNCTIONS")?;
            writeln!(file, "{}", "-".repeat(60))?;
            for (name, value) in &self.functions {
                writeln!(file, "{:<20} {:>14.6e}", name, value)?;
            }
            writeln!(file)?;
        }

        writeln!(file, "{}", "=".repeat(60))?;

        Ok(())
    }

    pub fn print_to_console(&self) {
        println!("\n{}", "=".repeat(60));
        println!("RUN SUMMARY");
        println!("{}", "=".repeat(60));
        println!(
            "Wing:          {} planform, {} sections, {} design vars",
            self.planform, self.n_sect, self.ndv
        );
        println!(
            "Condition:     M {:.2}, AoA {:.2} deg, h {:.0} m",
            self.mach, self.aoa_deg, self.altitude
        );
        if let (Some(iter), Some(res)) = (self.iterations, self.final_residual) {
            println!(
                "Direct solve:  {} in {} iterations (residual {:.3e})",
                if self.converged {
                    "converged"
                } else {
                    "stalled"
                },
                iter,
                res
            );
        }
        for (name, value) in &self.functions {
            println!("{:<14} {:.6e}", name, value);
        }
        println!("{}\n", "=".repeat(60));
    }
}
