//! Non-dimensional performance coefficients.
//!
//! Propeller family (n = rpm/60 in rev/s, D diameter):
//! ```text
//! J = V/(n·D)   CT = T/(ρ·n²·D⁴)   CQ = Q/(ρ·n²·D⁵)   CP = 2π·CQ
//! η = CT/CP  if J = 0,  η = J·CT/CP  otherwise
//! ```
//! Turbine family (A swept area, R tip radius):
//! ```text
//! TSR = ω·R/V   CT = T/(½·ρ·A·V²)   CP = P/(½·ρ·A·V³)
//! ```

use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropellerCoefficients {
    pub J: f64,
    pub CT: f64,
    pub CQ: f64,
    pub CP: f64,
    pub eta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbineCoefficients {
    pub TSR: f64,
    pub CT: f64,
    pub CP: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coefficients {
    Propeller(PropellerCoefficients),
    Turbine(TurbineCoefficients),
}

impl Coefficients {
    /// Column names matching [`Coefficients::values`].
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            Coefficients::Propeller(_) => &["J", "CT", "CQ", "CP", "eta"],
            Coefficients::Turbine(_) => &["TSR", "CT", "CP"],
        }
    }

    pub fn values(&self) -> Vec<f64> {
        match self {
            Coefficients::Propeller(c) => vec![c.J, c.CT, c.CQ, c.CP, c.eta],
            Coefficients::Turbine(c) => vec![c.TSR, c.CT, c.CP],
        }
    }
}

pub fn propeller_coefficients(
    T: f64,
    Q: f64,
    v_inf: f64,
    rpm: f64,
    diameter: f64,
    rho: f64,
) -> PropellerCoefficients {
    let D = diameter;
    let n = rpm / 60.0;
    let J = v_inf / (n * D);
    let CT = T / (rho * n.powi(2) * D.powi(4));
    let CQ = Q / (rho * n.powi(2) * D.powi(5));
    let CP = 2.0 * PI * CQ;
    let eta = if J == 0.0 { CT / CP } else { CT / CP * J };
    PropellerCoefficients { J, CT, CQ, CP, eta }
}

pub fn turbine_coefficients(
    T: f64,
    P: f64,
    v_inf: f64,
    rpm: f64,
    blade_radius: f64,
    area: f64,
    rho: f64,
) -> TurbineCoefficients {
    let omega = rpm * 2.0 * PI / 60.0;
    let V = v_inf;
    TurbineCoefficients {
        TSR: omega * blade_radius / V,
        CT: T / (0.5 * rho * area * V.powi(2)),
        CP: P / (0.5 * rho * area * V.powi(3)),
    }
}
