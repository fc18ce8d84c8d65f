//! # Task documents for BEMT cases
//!
//! Reads a case from the RustedSciThe task-document format: a section name on its own
//! line followed by `key: value` lines.
//! ```text
//! case
//!   v_inf: 10.0
//!   rpm: 3000.0
//!   coaxial: false
//! rotor
//!   nblades: 2
//!   diameter: 1.0
//!   radius_hub: 0.1
//!   section: NACA0012, NACA0012, NACA0012
//!   radius: [0.2, 0.3, 0.4]
//!   chord: [0.05, 0.05, 0.05]
//!   pitch: [10.0, 10.0, 10.0]
//! fluid
//!   rho: 1.225
//!   mu: 1.81e-5
//! solver
//!   solver: bisect
//!   Cs: 0.625
//! ```
//! A `turbine` section in place of `rotor` selects turbine mode. A coaxial case adds
//! `rpm2` and `dz` to `case` and a `rotor2` section.
//!
//! Numeric fields accept floats, integers and `[..]` vectors alike; list fields accept
//! either a vector or several comma-separated values. Name lists may also be separated
//! by spaces.

use super::bemt_error::BemtError;
use super::blade_section::Mode;
use super::config::{BemtConfig, CaseConfig, FluidConfig, RotorConfig, SolverConfig};
use super::solver::SolverMethod;
use RustedSciThe::Utils::task_parser::{DocumentMap, DocumentParser, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

type Section = HashMap<String, Option<Vec<Value>>>;

fn scalar_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Integer(i) => Some(*i as f64),
        Value::Usize(u) => Some(*u as f64),
        Value::String(s) => s.trim().parse().ok(),
        Value::Optional(Some(inner)) => scalar_f64(inner),
        _ => None,
    }
}

fn section<'a>(doc: &'a DocumentMap, name: &str) -> Result<&'a Section, BemtError> {
    doc.get(name)
        .ok_or_else(|| BemtError::TaskParse(format!("missing section `{}`", name)))
}

fn values<'a>(section: &'a Section, key: &str) -> Option<&'a Vec<Value>> {
    section.get(key).and_then(|v| v.as_ref()).filter(|v| !v.is_empty())
}

fn required<'a>(section: &'a Section, name: &str, key: &str) -> Result<&'a Vec<Value>, BemtError> {
    values(section, key)
        .ok_or_else(|| BemtError::TaskParse(format!("section `{}`: missing field `{}`", name, key)))
}

fn not_a_number(name: &str, key: &str, value: &Value) -> BemtError {
    BemtError::TaskParse(format!(
        "section `{}`: field `{}`: expected a number, got {:?}",
        name, key, value
    ))
}

fn get_f64(section: &Section, name: &str, key: &str) -> Result<f64, BemtError> {
    let vals = required(section, name, key)?;
    scalar_f64(&vals[0]).ok_or_else(|| not_a_number(name, key, &vals[0]))
}

fn get_opt_f64(section: &Section, name: &str, key: &str) -> Result<Option<f64>, BemtError> {
    match values(section, key) {
        Some(vals) => match &vals[0] {
            Value::Optional(None) => Ok(None),
            v => scalar_f64(v).map(Some).ok_or_else(|| not_a_number(name, key, v)),
        },
        None => Ok(None),
    }
}

fn list_f64(vals: &[Value], name: &str, key: &str) -> Result<Vec<f64>, BemtError> {
    let mut out = Vec::new();
    for v in vals {
        match v {
            Value::Vector(vector) => out.extend(vector.iter().copied()),
            Value::String(s) => {
                for token in s.split(|c: char| c == ',' || c.is_whitespace()) {
                    if token.is_empty() {
                        continue;
                    }
                    let parsed = token
                        .trim_matches(|c| c == '[' || c == ']')
                        .parse()
                        .map_err(|_| not_a_number(name, key, v))?;
                    out.push(parsed);
                }
            }
            other => out.push(scalar_f64(other).ok_or_else(|| not_a_number(name, key, other))?),
        }
    }
    Ok(out)
}

fn get_list_f64(section: &Section, name: &str, key: &str) -> Result<Vec<f64>, BemtError> {
    list_f64(required(section, name, key)?, name, key)
}

fn get_names(section: &Section, name: &str, key: &str) -> Result<Vec<String>, BemtError> {
    let mut out = Vec::new();
    for v in required(section, name, key)? {
        match v {
            Value::String(s) => out.extend(
                s.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|t| !t.is_empty())
                    .map(String::from),
            ),
            Value::Usize(u) => out.push(u.to_string()),
            Value::Integer(i) => out.push(i.to_string()),
            other => {
                return Err(BemtError::TaskParse(format!(
                    "section `{}`: field `{}`: expected airfoil names, got {:?}",
                    name, key, other
                )));
            }
        }
    }
    Ok(out)
}

fn get_bool(section: &Section, name: &str, key: &str) -> Result<bool, BemtError> {
    let Some(vals) = values(section, key) else {
        return Ok(false);
    };
    let parsed = match &vals[0] {
        Value::Boolean(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        Value::Usize(0) | Value::Integer(0) => Some(false),
        Value::Usize(1) | Value::Integer(1) => Some(true),
        _ => None,
    };
    parsed.ok_or_else(|| {
        BemtError::TaskParse(format!(
            "section `{}`: field `{}`: expected a boolean, got {:?}",
            name, key, vals[0]
        ))
    })
}

fn rotor_config(doc: &DocumentMap, name: &str) -> Result<RotorConfig, BemtError> {
    let s = section(doc, name)?;
    let nblades = get_f64(s, name, "nblades")?;
    if nblades < 0.0 || nblades.fract() != 0.0 {
        return Err(BemtError::TaskParse(format!(
            "section `{}`: nblades must be a whole number, got {}",
            name, nblades
        )));
    }
    let dr = match values(s, "dr") {
        Some(vals) => Some(list_f64(vals, name, "dr")?),
        None => None,
    };
    Ok(RotorConfig {
        nblades: nblades as usize,
        diameter: get_f64(s, name, "diameter")?,
        radius_hub: get_f64(s, name, "radius_hub")?,
        section: get_names(s, name, "section")?,
        radius: get_list_f64(s, name, "radius")?,
        chord: get_list_f64(s, name, "chord")?,
        pitch: get_list_f64(s, name, "pitch")?,
        dr,
    })
}

impl BemtConfig {
    /// Converts a parsed task document into a validated configuration.
    pub fn from_document_map(doc: &DocumentMap) -> Result<Self, BemtError> {
        let case = section(doc, "case")?;
        let coaxial = get_bool(case, "case", "coaxial")?;
        let case = CaseConfig {
            v_inf: get_f64(case, "case", "v_inf")?,
            rpm: get_f64(case, "case", "rpm")?,
            coaxial,
            rpm2: get_opt_f64(case, "case", "rpm2")?,
            dz: get_opt_f64(case, "case", "dz")?,
        };

        let (mode, rotor_name) = if doc.contains_key("turbine") {
            (Mode::Turbine, "turbine")
        } else {
            (Mode::Propeller, "rotor")
        };
        let rotor = rotor_config(doc, rotor_name)?;
        let rotor2 = if coaxial {
            Some(rotor_config(doc, "rotor2")?)
        } else {
            None
        };

        let fluid = section(doc, "fluid")?;
        let fluid = FluidConfig {
            rho: get_f64(fluid, "fluid", "rho")?,
            mu: get_f64(fluid, "fluid", "mu")?,
        };

        let mut solver = SolverConfig::default();
        if let Some(s) = doc.get("solver") {
            if let Some(vals) = values(s, "solver") {
                solver.solver = match &vals[0] {
                    Value::String(method) => method.parse::<SolverMethod>()?,
                    other => return Err(BemtError::UnknownMethod(format!("{:?}", other))),
                };
            }
            if let Some(cs) = get_opt_f64(s, "solver", "Cs")? {
                solver.Cs = cs;
            } else if let Some(cs) = get_opt_f64(s, "solver", "cs")? {
                solver.Cs = cs;
            }
        }

        let config = BemtConfig {
            case,
            rotor,
            rotor2,
            fluid,
            solver,
            mode,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_task_str(content: &str) -> Result<Self, BemtError> {
        let mut parser = DocumentParser::new(content.to_string());
        let doc: DocumentMap = parser
            .parse_document()
            .map_err(|e| BemtError::TaskParse(format!("{:?}", e)))?
            .clone();
        Self::from_document_map(&doc)
    }

    pub fn from_task_file(path: &Path) -> Result<Self, BemtError> {
        let content = fs::read_to_string(path)?;
        Self::from_task_str(&content)
    }
}
