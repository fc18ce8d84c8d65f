//! Case configuration: serde data tree, validation and construction of a [`Solver`].
//!
//! JSON layout (the task-document layout in `task_parser_BEMT` maps onto the same tree):
//! ```json
//! {
//!   "case":   { "v_inf": 10.0, "rpm": 3000.0, "coaxial": false },
//!   "rotor":  { "nblades": 2, "diameter": 1.0, "radius_hub": 0.1,
//!               "section": ["NACA0012"], "radius": [0.3], "chord": [0.05],
//!               "pitch": [10.0], "dr": [0.4] },
//!   "fluid":  { "rho": 1.225, "mu": 1.81e-5 },
//!   "solver": { "solver": "bisect", "Cs": 0.625 },
//!   "mode":   "rotor"
//! }
//! ```
//! `dr` may be omitted when the rotor has at least two sections; every width is then
//! `radius[1] - radius[0]`. Pitch is in degrees.

use super::bemt_error::BemtError;
use super::blade_section::Mode;
use super::fluid::FluidProperties;
use super::rotor::{Rotor, SectionSpec};
use super::solver::{DEFAULT_CS, Solver, SolverMethod};
use crate::Airfoils::airfoil_loader::AirfoilLibrary;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseConfig {
    pub v_inf: f64,
    pub rpm: f64,
    #[serde(default)]
    pub coaxial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm2: Option<f64>,
    /// rotor spacing [m]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dz: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotorConfig {
    pub nblades: usize,
    pub diameter: f64,
    pub radius_hub: f64,
    /// airfoil name of every section
    pub section: Vec<String>,
    pub radius: Vec<f64>,
    pub chord: Vec<f64>,
    /// [deg]
    pub pitch: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dr: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidConfig {
    pub rho: f64,
    pub mu: f64,
}

fn default_cs() -> f64 {
    DEFAULT_CS
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub solver: SolverMethod,
    #[serde(default = "default_cs")]
    pub Cs: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver: SolverMethod::default(),
            Cs: DEFAULT_CS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BemtConfig {
    pub case: CaseConfig,
    pub rotor: RotorConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotor2: Option<RotorConfig>,
    pub fluid: FluidConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub mode: Mode,
}

fn positive(field: &str, value: f64) -> Result<(), BemtError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BemtError::invalid(field, format!("must be > 0, got {}", value)))
    }
}

impl RotorConfig {
    /// Section widths: `dr` when given, otherwise `radius[1] - radius[0]` for every section.
    pub fn widths(&self) -> Result<Vec<f64>, BemtError> {
        match &self.dr {
            Some(dr) => Ok(dr.clone()),
            None if self.radius.len() >= 2 => {
                Ok(vec![self.radius[1] - self.radius[0]; self.radius.len()])
            }
            None => Err(BemtError::invalid(
                "dr",
                "required when the rotor has a single section",
            )),
        }
    }

    pub fn validate(&self) -> Result<(), BemtError> {
        if self.nblades < 1 {
            return Err(BemtError::invalid("nblades", "must be >= 1"));
        }
        positive("diameter", self.diameter)?;
        if !(self.radius_hub >= 0.0 && self.radius_hub < 0.5 * self.diameter) {
            return Err(BemtError::invalid(
                "radius_hub",
                format!("must satisfy 0 <= radius_hub < diameter/2, got {}", self.radius_hub),
            ));
        }
        let n = self.section.len();
        if n == 0 {
            return Err(BemtError::invalid("section", "at least one section is required"));
        }
        let widths = self.widths()?;
        for (field, len) in [
            ("radius", self.radius.len()),
            ("chord", self.chord.len()),
            ("pitch", self.pitch.len()),
            ("dr", widths.len()),
        ] {
            if len != n {
                return Err(BemtError::invalid(
                    field,
                    format!("expected {} values (one per section), got {}", n, len),
                ));
            }
        }
        if self.radius.windows(2).any(|w| w[1] <= w[0]) {
            return Err(BemtError::invalid("radius", "must be strictly increasing"));
        }
        for &r in &self.radius {
            if !(r > 0.0 && r >= self.radius_hub && r <= 0.5 * self.diameter) {
                return Err(BemtError::invalid(
                    "radius",
                    format!("{} lies outside [radius_hub, diameter/2]", r),
                ));
            }
        }
        for &c in &self.chord {
            positive("chord", c)?;
        }
        for &w in &widths {
            positive("dr", w)?;
        }
        Ok(())
    }

    /// Builds the rotor, loading every airfoil through `library`.
    pub fn build(&self, mode: Mode, library: &mut AirfoilLibrary) -> Result<Rotor, BemtError> {
        self.validate()?;
        let widths = self.widths()?;
        let mut specs = Vec::with_capacity(self.section.len());
        for i in 0..self.section.len() {
            specs.push(SectionSpec {
                airfoil: library.load(&self.section[i])?,
                radius: self.radius[i],
                width: widths[i],
                pitch_deg: self.pitch[i],
                chord: self.chord[i],
            });
        }
        Rotor::new(self.nblades, self.diameter, self.radius_hub, mode, specs)
    }
}

impl BemtConfig {
    pub fn validate(&self) -> Result<(), BemtError> {
        if !self.case.v_inf.is_finite() || self.case.v_inf < 0.0 {
            return Err(BemtError::invalid(
                "v_inf",
                format!("must be >= 0, got {}", self.case.v_inf),
            ));
        }
        positive("rpm", self.case.rpm)?;
        positive("rho", self.fluid.rho)?;
        positive("mu", self.fluid.mu)?;
        positive("Cs", self.solver.Cs)?;
        self.rotor.validate()?;
        if self.case.coaxial {
            match self.case.rpm2 {
                Some(rpm2) => positive("rpm2", rpm2)?,
                None => return Err(BemtError::invalid("rpm2", "required for a coaxial case")),
            }
            match &self.rotor2 {
                Some(rotor2) => rotor2.validate()?,
                None => return Err(BemtError::invalid("rotor2", "required for a coaxial case")),
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, BemtError> {
        let config: BemtConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, BemtError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String, BemtError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a case file: `.json` as JSON, anything else as a task document.
    pub fn from_file(path: &Path) -> Result<Self, BemtError> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_file(path)?
        } else {
            Self::from_task_file(path)?
        };
        info!("case loaded from {}", path.display());
        Ok(config)
    }
}

impl Solver {
    /// Validates `config` and builds the solver; airfoils are resolved through `library`.
    pub fn from_config(config: &BemtConfig, library: &mut AirfoilLibrary) -> Result<Self, BemtError> {
        config.validate()?;
        let mode = config.mode;
        let rotor = config.rotor.build(mode, library)?;
        let fluid = FluidProperties::new(config.fluid.rho, config.fluid.mu)?;
        let mut solver = Solver::new(config.case.v_inf, config.case.rpm, rotor, fluid)
            .with_method(config.solver.solver)
            .with_Cs(config.solver.Cs);
        if config.case.coaxial {
            let rotor2_config = config
                .rotor2
                .as_ref()
                .ok_or_else(|| BemtError::invalid("rotor2", "required for a coaxial case"))?;
            let rpm2 = config
                .case
                .rpm2
                .ok_or_else(|| BemtError::invalid("rpm2", "required for a coaxial case"))?;
            let rotor2 = rotor2_config.build(mode, library)?;
            solver = solver.with_coaxial(rotor2, rpm2, config.case.dz.unwrap_or(0.0))?;
        }
        Ok(solver)
    }

    pub fn from_file(path: &Path, library: &mut AirfoilLibrary) -> Result<Self, BemtError> {
        let config = BemtConfig::from_file(path)?;
        Self::from_config(&config, library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Airfoils::polar::ConstantPolar;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const CASE: &str = r#"{
        "case": { "v_inf": 10.0, "rpm": 3000.0 },
        "rotor": {
            "nblades": 2, "diameter": 1.0, "radius_hub": 0.1,
            "section": ["flat", "flat", "flat"],
            "radius": [0.2, 0.3, 0.4],
            "chord": [0.05, 0.05, 0.05],
            "pitch": [10.0, 10.0, 10.0]
        },
        "fluid": { "rho": 1.225, "mu": 1.81e-5 }
    }"#;

    fn library() -> AirfoilLibrary {
        let mut library = AirfoilLibrary::new("airfoils");
        library.insert("flat", ConstantPolar::new(0.5, 0.02));
        library
    }

    #[test]
    fn defaults_are_filled_in() {
        let config = BemtConfig::from_json_str(CASE).unwrap();
        assert_eq!(config.mode, Mode::Propeller);
        assert_eq!(config.solver.solver, SolverMethod::Bisect);
        assert_eq!(config.solver.Cs, 0.625);
        assert!(!config.case.coaxial);
        let widths = config.rotor.widths().unwrap();
        assert!(widths.iter().all(|w| (w - 0.1).abs() < 1e-12));
    }

    #[test]
    fn mismatched_arrays_name_the_field() {
        let mut config = BemtConfig::from_json_str(CASE).unwrap();
        config.rotor.chord.pop();
        match config.validate() {
            Err(BemtError::InvalidConfig { field, .. }) => assert_eq!(field, "chord"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn single_section_needs_dr() {
        let mut config = BemtConfig::from_json_str(CASE).unwrap();
        config.rotor.section.truncate(1);
        config.rotor.radius.truncate(1);
        config.rotor.chord.truncate(1);
        config.rotor.pitch.truncate(1);
        assert!(matches!(
            config.validate(),
            Err(BemtError::InvalidConfig { ref field, .. }) if field == "dr"
        ));
        config.rotor.dr = Some(vec![0.4]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn coaxial_requires_rotor2_and_rpm2() {
        let mut config = BemtConfig::from_json_str(CASE).unwrap();
        config.case.coaxial = true;
        assert!(config.validate().is_err());
        config.case.rpm2 = Some(3000.0);
        assert!(config.validate().is_err());
        config.rotor2 = Some(config.rotor.clone());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_solver_is_rejected() {
        let json = CASE.replace(
            r#""fluid""#,
            r#""solver": { "solver": "newton" }, "fluid""#,
        );
        assert!(matches!(
            BemtConfig::from_json_str(&json),
            Err(BemtError::Json(_))
        ));
    }

    #[test]
    fn solver_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("case.json");
        let mut file = File::create(&path).unwrap();
        file.write_all(CASE.as_bytes()).unwrap();

        let config = BemtConfig::from_file(&path).unwrap();
        let solver = Solver::from_config(&config, &mut library()).unwrap();
        assert_eq!(solver.rotor.n_sections(), 3);
        assert_eq!(solver.rotor.pitch_deg().len(), 3);
        assert!(!solver.is_coaxial());

        let round_trip = BemtConfig::from_json_str(&config.to_json_string().unwrap()).unwrap();
        assert_eq!(round_trip, config);
    }

    #[test]
    fn missing_airfoil_is_reported() {
        let config = BemtConfig::from_json_str(CASE).unwrap();
        let dir = tempdir().unwrap();
        let mut empty = AirfoilLibrary::new(dir.path());
        assert!(matches!(
            Solver::from_config(&config, &mut empty),
            Err(BemtError::AirfoilData { .. })
        ));
    }
}
