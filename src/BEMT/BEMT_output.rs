//! Text tables for run, section, sweep and optimization results.
use super::coefficients::Coefficients;
use super::optimization::{OptimizationResult, PitchOptimization};
use super::rotor::SectionsSummary;
use super::solver::{RotorResult, RunResult};
use super::sweep::{SweepResult, SweepTable};
use prettytable::{Cell, Row, Table, row};

fn number(value: f64) -> String {
    if value == 0.0 || (value.abs() >= 1e-3 && value.abs() < 1e5) {
        format!("{:.4}", value)
    } else {
        format!("{:.4e}", value)
    }
}

fn rotor_rows(table: &mut Table, label: &str, result: &RotorResult) {
    let s = &result.solution;
    table.add_row(row![format!("{} rpm", label), number(s.rpm), "1/min"]);
    table.add_row(row![format!("{} T", label), number(s.T), "N"]);
    table.add_row(row![format!("{} Q", label), number(s.Q), "N·m"]);
    table.add_row(row![format!("{} P", label), number(s.P), "W"]);
    let c = &result.coefficients;
    for (name, value) in c.names().iter().zip(c.values()) {
        table.add_row(row![format!("{} {}", label, name), number(value), "-"]);
    }
    let stats = &s.statistics;
    table.add_row(row![
        format!("{} sections (bisect/brute/failed)", label),
        format!(
            "{}/{}/{}",
            stats.bisection_converged, stats.brute_force, stats.not_converged
        ),
        ""
    ]);
}

impl RunResult {
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["Quantity", "Value", "Units"]);
        rotor_rows(&mut table, "rotor", &self.primary);
        if let Some(coax) = &self.secondary {
            table.add_row(row!["slipstream r_s", number(coax.slipstream.r_s), "m"]);
            table.add_row(row!["slipstream v_s", number(coax.slipstream.v_s), "m/s"]);
            rotor_rows(&mut table, "rotor2", &coax.rotor);
        }
        table
    }

    pub fn pretty_print(&self) {
        self.to_table().printstd();
        println!("\nrotor sections");
        self.primary.sections.to_table().printstd();
        if let Some(coax) = &self.secondary {
            println!("\nrotor2 sections");
            coax.rotor.sections.to_table().printstd();
        }
    }
}

fn numeric_table(columns: &[&str], rows: &[Vec<f64>]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(columns.iter().map(|c| Cell::new(c)).collect()));
    for values in rows {
        table.add_row(Row::new(
            values.iter().map(|v| Cell::new(&number(*v))).collect(),
        ));
    }
    table
}

impl SectionsSummary {
    pub fn to_table(&self) -> Table {
        let rows: Vec<Vec<f64>> = self.rows.iter().map(|r| r.values().to_vec()).collect();
        numeric_table(&SectionsSummary::COLUMNS, &rows)
    }
}

impl SweepTable {
    pub fn to_table(&self) -> Table {
        let columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        numeric_table(&columns, &self.rows)
    }
}

impl SweepResult {
    pub fn pretty_print(&self) {
        println!("sweep of {}", self.parameter);
        self.table.to_table().printstd();
    }
}

impl OptimizationResult {
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["Field", "Value"]);
        table.add_row(row!["success", self.success]);
        table.add_row(row!["message", self.message]);
        table.add_row(row!["fun", number(self.fun)]);
        table.add_row(row!["nit", self.nit]);
        table.add_row(row!["nfev", self.nfev]);
        for (i, x) in self.x.iter().enumerate() {
            table.add_row(row![format!("x[{}]", i), number(*x)]);
        }
        table
    }
}

impl PitchOptimization {
    pub fn pretty_print(&self) {
        println!("pitch optimization [deg]");
        self.result.to_table().printstd();
        self.run.pretty_print();
    }
}

impl Coefficients {
    pub fn to_table(&self) -> Table {
        numeric_table(self.names(), &[self.values()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BEMT::coefficients::TurbineCoefficients;

    #[test]
    fn numbers_switch_to_exponent() {
        assert_eq!(number(0.0), "0.0000");
        assert_eq!(number(12.5), "12.5000");
        assert_eq!(number(1.81e-5), "1.8100e-5");
        assert_eq!(number(2.0e6), "2.0000e6");
    }

    #[test]
    fn coefficient_table_has_header_and_values() {
        let c = Coefficients::Turbine(TurbineCoefficients {
            TSR: 6.0,
            CT: 0.8,
            CP: 0.4,
        });
        let table = c.to_table();
        assert_eq!(table.len(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("TSR"));
        assert!(rendered.contains("0.4000"));
    }
}
