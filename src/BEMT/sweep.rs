//! One-parameter sweeps of a [`Solver`] case.
//!
//! The swept quantity is written into the solver, the case is re-run and one table row
//! is appended per value. Values come from [`linspace`], end points included.

use super::bemt_error::BemtError;
use super::blade_section::Mode;
use super::coefficients::Coefficients;
use super::root_finding::linspace;
use super::rotor::SectionsSummary;
use super::solver::{RunResult, Solver};
use log::{debug, info};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepParameter {
    /// free-stream velocity [m/s]
    VInf,
    Rpm,
    /// rpm of the downstream rotor
    Rpm2,
    /// slipstream velocity coefficient
    Cs,
    /// collective pitch offset [deg] added to the design pitch of every section
    Pitch,
}

impl SweepParameter {
    pub fn name(&self) -> &'static str {
        match self {
            SweepParameter::VInf => "v_inf",
            SweepParameter::Rpm => "rpm",
            SweepParameter::Rpm2 => "rpm2",
            SweepParameter::Cs => "Cs",
            SweepParameter::Pitch => "pitch",
        }
    }

    /// Writes `value` into the solver.
    pub fn apply(&self, solver: &mut Solver, value: f64) -> Result<(), BemtError> {
        match self {
            SweepParameter::VInf => solver.v_inf = value,
            SweepParameter::Rpm => solver.rpm = value,
            SweepParameter::Rpm2 => match solver.coaxial.as_mut() {
                Some(coax) => coax.rpm = value,
                None => {
                    return Err(BemtError::invalid(
                        "rpm2",
                        "cannot sweep rpm2 of a case without a coaxial rotor",
                    ));
                }
            },
            SweepParameter::Cs => solver.Cs = value,
            SweepParameter::Pitch => {
                solver.rotor.set_collective_pitch(value);
                if let Some(coax) = solver.coaxial.as_mut() {
                    coax.rotor.set_collective_pitch(value);
                }
            }
        }
        Ok(())
    }
}

impl FromStr for SweepParameter {
    type Err = BemtError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "v_inf" => Ok(SweepParameter::VInf),
            "rpm" => Ok(SweepParameter::Rpm),
            "rpm2" => Ok(SweepParameter::Rpm2),
            "Cs" | "cs" => Ok(SweepParameter::Cs),
            "pitch" => Ok(SweepParameter::Pitch),
            other => Err(BemtError::UnknownParameter(other.to_string())),
        }
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sweep results, one row per parameter value. The first column is the parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl SweepTable {
    pub fn new(parameter: SweepParameter, mode: Mode, coaxial: bool) -> Self {
        let mut columns: Vec<&str> = vec![parameter.name(), "T", "Q", "P"];
        match (mode, coaxial) {
            (Mode::Turbine, false) => columns.extend(["TSR", "CT", "CP"]),
            (Mode::Turbine, true) => {
                columns.extend(["TSR", "CT", "CP", "T2", "Q2", "P2", "CT2", "CP2"])
            }
            (Mode::Propeller, false) => columns.extend(["J", "CT", "CQ", "CP", "eta"]),
            (Mode::Propeller, true) => columns.extend([
                "J", "CT", "CQ", "CP", "eta", "T2", "Q2", "P2", "CT2", "CQ2", "CP2", "eta2",
            ]),
        }
        Self {
            columns: columns.into_iter().map(String::from).collect(),
            rows: Vec::new(),
        }
    }

    fn push_run(&mut self, p: f64, run: &RunResult) {
        let primary = &run.primary.solution;
        let mut row = vec![p, primary.T, primary.Q, primary.P];
        row.extend(run.primary.coefficients.values());
        if let Some(coax) = &run.secondary {
            let s = &coax.rotor.solution;
            row.extend([s.T, s.Q, s.P]);
            match coax.rotor.coefficients {
                Coefficients::Propeller(c) => row.extend([c.CT, c.CQ, c.CP, c.eta]),
                Coefficients::Turbine(c) => row.extend([c.CT, c.CP]),
            }
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let j = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[j]).collect())
    }

    pub fn to_csv(&self) -> String {
        let mut out = self.columns.join(",");
        out.push('\n');
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub parameter: SweepParameter,
    pub table: SweepTable,
    /// section summary of the upstream rotor, one per sweep value
    pub sections: Vec<SectionsSummary>,
    /// section summary of the downstream rotor, empty without a coaxial rotor
    pub sections2: Vec<SectionsSummary>,
}

impl Solver {
    /// Runs the case `n` times with `param` set to each value of `linspace(low, high, n)`.
    /// The swept value stays in the solver afterwards.
    pub fn sweep(
        &mut self,
        param: SweepParameter,
        n: usize,
        low: f64,
        high: f64,
    ) -> Result<SweepResult, BemtError> {
        if param == SweepParameter::Rpm2 && !self.is_coaxial() {
            return Err(BemtError::invalid(
                "rpm2",
                "cannot sweep rpm2 of a case without a coaxial rotor",
            ));
        }
        let mut table = SweepTable::new(param, self.mode(), self.is_coaxial());
        let mut sections = Vec::with_capacity(n);
        let mut sections2 = Vec::new();
        for (i, p) in linspace(low, high, n).into_iter().enumerate() {
            param.apply(self, p)?;
            let run = self.run();
            debug!(
                "sweep {} [{}/{}]: {} = {}, T = {:.6e}, P = {:.6e}",
                param,
                i + 1,
                n,
                param,
                p,
                run.thrust(),
                run.power()
            );
            table.push_run(p, &run);
            sections.push(run.primary.sections);
            if let Some(coax) = run.secondary {
                sections2.push(coax.rotor.sections);
            }
        }
        info!("sweep of {} finished: {} points", param, table.len());
        Ok(SweepResult {
            parameter: param,
            table,
            sections,
            sections2,
        })
    }

    pub fn sweep_by_name(
        &mut self,
        name: &str,
        n: usize,
        low: f64,
        high: f64,
    ) -> Result<SweepResult, BemtError> {
        let param: SweepParameter = name.parse()?;
        self.sweep(param, n, low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_names_parse() {
        for p in [
            SweepParameter::VInf,
            SweepParameter::Rpm,
            SweepParameter::Rpm2,
            SweepParameter::Cs,
            SweepParameter::Pitch,
        ] {
            assert_eq!(p.name().parse::<SweepParameter>().unwrap(), p);
        }
        assert!(matches!(
            "omega".parse::<SweepParameter>(),
            Err(BemtError::UnknownParameter(_))
        ));
    }

    #[test]
    fn table_columns_follow_mode() {
        let t = SweepTable::new(SweepParameter::Rpm, Mode::Turbine, false);
        assert_eq!(t.columns, ["rpm", "T", "Q", "P", "TSR", "CT", "CP"]);
        let p = SweepTable::new(SweepParameter::VInf, Mode::Propeller, false);
        assert_eq!(p.columns, ["v_inf", "T", "Q", "P", "J", "CT", "CQ", "CP", "eta"]);
        let c = SweepTable::new(SweepParameter::Rpm2, Mode::Propeller, true);
        assert_eq!(c.columns.len(), 16);
        assert_eq!(c.columns[15], "eta2");
    }

    #[test]
    fn csv_has_header_and_rows() {
        let mut t = SweepTable::new(SweepParameter::Cs, Mode::Turbine, false);
        t.rows.push(vec![0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let csv = t.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Cs,T,Q,P,TSR,CT,CP");
        assert_eq!(lines[1], "0.5,1,2,3,4,5,6");
        assert_eq!(t.column("CP"), Some(vec![6.0]));
        assert_eq!(t.column("eta"), None);
    }
}
