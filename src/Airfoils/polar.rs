use crate::BEMT::bemt_error::BemtError;
use enum_dispatch::enum_dispatch;

/// Lift/drag characteristic of a 2-D airfoil. `alpha` is the angle of attack in radians.
#[enum_dispatch]
pub trait Polar {
    fn cl(&self, alpha: f64) -> f64;
    fn cd(&self, alpha: f64) -> f64;
}

/// Airfoil with angle-independent coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPolar {
    pub cl: f64,
    pub cd: f64,
}

impl ConstantPolar {
    pub fn new(cl: f64, cd: f64) -> Self {
        Self { cl, cd }
    }
}

impl Polar for ConstantPolar {
    fn cl(&self, _alpha: f64) -> f64 {
        self.cl
    }
    fn cd(&self, _alpha: f64) -> f64 {
        self.cd
    }
}

/// Polar given as a table of (alpha [deg], Cl, Cd) points.
/// Between points the coefficients are linearly interpolated, outside the table
/// the end values are held.
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedPolar {
    pub alpha_deg: Vec<f64>,
    pub cl: Vec<f64>,
    pub cd: Vec<f64>,
}

impl TabulatedPolar {
    pub fn new(alpha_deg: Vec<f64>, cl: Vec<f64>, cd: Vec<f64>) -> Result<Self, BemtError> {
        let name = "tabulated polar".to_string();
        if alpha_deg.is_empty() {
            return Err(BemtError::AirfoilData {
                name,
                reason: "polar table is empty".to_string(),
            });
        }
        if alpha_deg.len() != cl.len() || alpha_deg.len() != cd.len() {
            return Err(BemtError::AirfoilData {
                name,
                reason: format!(
                    "column lengths differ: alpha {}, Cl {}, Cd {}",
                    alpha_deg.len(),
                    cl.len(),
                    cd.len()
                ),
            });
        }
        if alpha_deg.iter().chain(&cl).chain(&cd).any(|x| !x.is_finite()) {
            return Err(BemtError::AirfoilData {
                name,
                reason: "polar table contains non-finite values".to_string(),
            });
        }
        if alpha_deg.windows(2).any(|w| w[1] <= w[0]) {
            return Err(BemtError::AirfoilData {
                name,
                reason: "angles of attack must be strictly increasing".to_string(),
            });
        }
        Ok(Self { alpha_deg, cl, cd })
    }

    fn interpolate(&self, values: &[f64], alpha: f64) -> f64 {
        let x = alpha.to_degrees();
        if x.is_nan() {
            return f64::NAN;
        }
        let xs = &self.alpha_deg;
        let n = xs.len();
        if x <= xs[0] {
            return values[0];
        }
        if x >= xs[n - 1] {
            return values[n - 1];
        }
        // first point strictly right of x, always in 1..n
        let i = xs.partition_point(|&xi| xi <= x);
        let t = (x - xs[i - 1]) / (xs[i] - xs[i - 1]);
        values[i - 1] + t * (values[i] - values[i - 1])
    }
}

impl Polar for TabulatedPolar {
    fn cl(&self, alpha: f64) -> f64 {
        self.interpolate(&self.cl, alpha)
    }
    fn cd(&self, alpha: f64) -> f64 {
        self.interpolate(&self.cd, alpha)
    }
}

/// Any airfoil a blade section can carry.
#[enum_dispatch(Polar)]
#[derive(Debug, Clone, PartialEq)]
pub enum Airfoil {
    Constant(ConstantPolar),
    Tabulated(TabulatedPolar),
}
