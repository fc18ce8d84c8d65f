use super::bemt_error::BemtError;
use serde::{Deserialize, Serialize};

/// Working fluid: density `rho` [kg/m³] and dynamic viscosity `mu` [Pa·s].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidProperties {
    pub rho: f64,
    pub mu: f64,
}

impl FluidProperties {
    pub fn new(rho: f64, mu: f64) -> Result<Self, BemtError> {
        if !(rho.is_finite() && rho > 0.0) {
            return Err(BemtError::invalid("fluid.rho", format!("must be > 0, got {}", rho)));
        }
        if !(mu.is_finite() && mu > 0.0) {
            return Err(BemtError::invalid("fluid.mu", format!("must be > 0, got {}", mu)));
        }
        Ok(Self { rho, mu })
    }

    /// Sea-level standard air.
    pub fn air() -> Self {
        Self {
            rho: 1.225,
            mu: 1.81e-5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_properties() {
        assert!(FluidProperties::new(1.225, 1.8e-5).is_ok());
        assert!(FluidProperties::new(0.0, 1.8e-5).is_err());
        assert!(FluidProperties::new(1000.0, -1.0).is_err());
        assert!(FluidProperties::new(f64::NAN, 1.0e-3).is_err());
    }
}
