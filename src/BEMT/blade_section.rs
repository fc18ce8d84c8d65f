//! # Blade element
//!
//! One radial station of a blade: the local balance between blade-element loading
//! and momentum-theory induction, written as a residual in the inflow angle `phi`.
//!
//! ## Nomenclature
//!
//! | Symbol | Description | Units |
//! |--------|-------------|-------|
//! | `phi` | inflow angle, between resultant velocity and rotor plane | rad |
//! | `alpha` | angle of attack, `C·(pitch − phi)` | rad |
//! | `C` | sign convention, +1 propeller, −1 turbine | - |
//! | `sigma` | local solidity `B·c/(2πr)` | - |
//! | `a`, `ap` | axial and tangential induction factors | - |
//! | `F` | combined Prandtl tip/hub loss factor | - |
//!
//! ## Equations
//! ```text
//! CT = Cl·cos(phi) − C·Cd·sin(phi)        CQ = Cl·sin(phi) + C·Cd·cos(phi)
//! kappa  = 4F·sin²(phi)/(sigma·CT)         a  = 1/(kappa − C)
//! kappa' = 4F·sin(phi)cos(phi)/(sigma·CQ)  ap = 1/(kappa' + C)
//! R(phi) = sin(phi)/(1 + C·a) − v·cos(phi)/(omega·r·(1 − C·ap))
//! dT = sigma·π·rho·U²·CT·r·dr              dQ = sigma·π·rho·U²·CQ·r²·dr
//! ```

use super::fluid::FluidProperties;
use super::rotor::RotorGeometry;
use crate::Airfoils::polar::{Airfoil, Polar};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;

/// Exponent beyond which `exp(-f)` is not evaluated in the Prandtl factor.
pub const PRANDTL_EXP_LIMIT: f64 = 500.0;
/// Lower bound of the combined loss factor. Prandtl's factor vanishes exactly at the
/// blade tip and hub, which would make the induction factors singular there.
pub const LOSS_FACTOR_FLOOR: f64 = 1e-12;

/// Operating mode. Every sign-dependent formula takes its sign from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Propeller or rotor: power in, thrust out (`C = +1`).
    #[default]
    #[serde(rename = "rotor", alias = "propeller")]
    Propeller,
    /// Turbine: power extracted from the flow (`C = −1`).
    #[serde(rename = "turbine")]
    Turbine,
}

impl Mode {
    pub fn sign(self) -> f64 {
        match self {
            Mode::Propeller => 1.0,
            Mode::Turbine => -1.0,
        }
    }
}

/// How the inflow angle of a section was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionOutcome {
    /// Forces evaluated at a prescribed angle, no root search.
    #[default]
    Evaluated,
    Bisection,
    BruteForce,
    /// Bisection could not bracket a root, brute force was used instead.
    Fallback,
}

/// Snapshot of one section after a solve. Used for reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SectionState {
    pub phi: f64,
    pub alpha: f64,
    pub a: f64,
    pub ap: f64,
    pub F: f64,
    pub Cl: f64,
    pub Cd: f64,
    pub Re: f64,
    pub dT: f64,
    pub dQ: f64,
    /// false when no finite residual was found for this section
    pub converged: bool,
    pub outcome: SectionOutcome,
}

/// Residual of the inflow equation together with the induction factors it used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InflowResidual {
    pub value: f64,
    pub a: f64,
    pub ap: f64,
}

/// Prandtl loss sub-factor `2·acos(min(1, exp(-f)))/π`, returning 1 when `-f` exceeds
/// [`PRANDTL_EXP_LIMIT`].
pub fn prandtl_factor(f: f64) -> f64 {
    if -f > PRANDTL_EXP_LIMIT {
        1.0
    } else {
        2.0 * (1.0f64).min((-f).exp()).acos() / PI
    }
}

/// A radial blade station. Geometry only; rotor-level data (blade count, tip and hub
/// radius, mode) is passed in as [`RotorGeometry`] by the owning rotor.
#[derive(Debug, Clone)]
pub struct BladeSection {
    pub airfoil: Arc<Airfoil>,
    /// radial position [m]
    pub radius: f64,
    /// radial width [m]
    pub width: f64,
    /// local pitch [rad]
    pub pitch: f64,
    /// chord [m]
    pub chord: f64,
    /// local solidity
    pub sigma: f64,
}

impl BladeSection {
    pub fn new(
        airfoil: Arc<Airfoil>,
        radius: f64,
        width: f64,
        pitch: f64,
        chord: f64,
        geometry: &RotorGeometry,
    ) -> Self {
        let mut section = Self {
            airfoil,
            radius,
            width,
            pitch,
            chord,
            sigma: 0.0,
        };
        section.precalc(geometry);
        section
    }

    pub fn precalc(&mut self, geometry: &RotorGeometry) {
        self.sigma = geometry.n_blades as f64 * self.chord / (2.0 * PI * self.radius);
    }

    pub fn tip_loss(&self, geometry: &RotorGeometry, phi: f64) -> f64 {
        if phi == 0.0 {
            return 1.0;
        }
        let r = self.radius;
        let b = geometry.n_blades as f64;
        let sin_phi = phi.sin();
        let f_tip = b * (geometry.blade_radius - r) / (2.0 * r * sin_phi);
        let f_hub = b * (r - geometry.radius_hub) / (2.0 * r * sin_phi);
        let F = prandtl_factor(f_tip) * prandtl_factor(f_hub);
        F.max(LOSS_FACTOR_FLOOR)
    }

    pub fn angle_of_attack(&self, mode: Mode, phi: f64) -> f64 {
        mode.sign() * (self.pitch - phi)
    }

    /// Normal and tangential force coefficients `(CT, CQ)` at inflow angle `phi`.
    pub fn airfoil_forces(&self, mode: Mode, phi: f64) -> (f64, f64) {
        let C = mode.sign();
        let alpha = self.angle_of_attack(mode, phi);
        let Cl = self.airfoil.cl(alpha);
        let Cd = self.airfoil.cd(alpha);
        let (sin_phi, cos_phi) = phi.sin_cos();
        let CT = Cl * cos_phi - C * Cd * sin_phi;
        let CQ = Cl * sin_phi + C * Cd * cos_phi;
        (CT, CQ)
    }

    /// Induction factors `(a, ap)`. Both NaN when `CT` or `CQ` is exactly zero.
    pub fn induction_factors(&self, geometry: &RotorGeometry, phi: f64) -> (f64, f64) {
        let C = geometry.mode.sign();
        let F = self.tip_loss(geometry, phi);
        let (CT, CQ) = self.airfoil_forces(geometry.mode, phi);
        if CT == 0.0 || CQ == 0.0 {
            return (f64::NAN, f64::NAN);
        }
        let (sin_phi, cos_phi) = phi.sin_cos();
        let kappa = 4.0 * F * sin_phi.powi(2) / (self.sigma * CT);
        let kappap = 4.0 * F * sin_phi * cos_phi / (self.sigma * CQ);
        let a = 1.0 / (kappa - C);
        let ap = 1.0 / (kappap + C);
        (a, ap)
    }

    pub fn inflow_residual(
        &self,
        geometry: &RotorGeometry,
        phi: f64,
        v_inf: f64,
        omega: f64,
    ) -> InflowResidual {
        let C = geometry.mode.sign();
        let (a, ap) = self.induction_factors(geometry, phi);
        let value = phi.sin() / (1.0 + C * a)
            - v_inf * phi.cos() / (omega * self.radius * (1.0 - C * ap));
        InflowResidual { value, a, ap }
    }

    /// Root-finding target: zero where blade-element loading and momentum induction agree.
    pub fn residual(&self, geometry: &RotorGeometry, phi: f64, v_inf: f64, omega: f64) -> f64 {
        self.inflow_residual(geometry, phi, v_inf, omega).value
    }

    /// Sectional thrust and torque at the solved inflow angle, with everything needed
    /// to report the section.
    pub fn forces(
        &self,
        geometry: &RotorGeometry,
        phi: f64,
        v_inf: f64,
        omega: f64,
        fluid: &FluidProperties,
    ) -> SectionState {
        let C = geometry.mode.sign();
        let r = self.radius;
        let rho = fluid.rho;

        let F = self.tip_loss(geometry, phi);
        let (a, ap) = self.induction_factors(geometry, phi);
        let (CT, CQ) = self.airfoil_forces(geometry.mode, phi);
        let alpha = self.angle_of_attack(geometry.mode, phi);

        let v = (1.0 + C * a) * v_inf;
        let vp = (1.0 - C * ap) * omega * r;
        let U = (v.powi(2) + vp.powi(2)).sqrt();

        let dT = self.sigma * PI * rho * U.powi(2) * CT * r * self.width;
        let dQ = self.sigma * PI * rho * U.powi(2) * CQ * r.powi(2) * self.width;

        SectionState {
            phi,
            alpha,
            a,
            ap,
            F,
            Cl: self.airfoil.cl(alpha),
            Cd: self.airfoil.cd(alpha),
            Re: rho * U * self.chord / fluid.mu,
            dT,
            dQ,
            converged: true,
            outcome: SectionOutcome::Evaluated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Airfoils::polar::ConstantPolar;
    use approx::assert_relative_eq;

    fn geometry(mode: Mode) -> RotorGeometry {
        RotorGeometry::new(2, 1.0, 0.1, mode)
    }

    fn section(geometry: &RotorGeometry) -> BladeSection {
        let airfoil = Arc::new(Airfoil::from(ConstantPolar::new(0.5, 0.02)));
        BladeSection::new(airfoil, 0.3, 0.4, 10f64.to_radians(), 0.05, geometry)
    }

    #[test]
    fn solidity_from_rotor_geometry() {
        let g = geometry(Mode::Propeller);
        let s = section(&g);
        assert_relative_eq!(s.sigma, 2.0 * 0.05 / (2.0 * PI * 0.3), epsilon = 1e-15);
    }

    #[test]
    fn tip_loss_is_one_at_zero_inflow() {
        let g = geometry(Mode::Propeller);
        assert_eq!(section(&g).tip_loss(&g, 0.0), 1.0);
    }

    #[test]
    fn prandtl_overflow_guard_returns_exactly_one() {
        assert_eq!(prandtl_factor(-500.5), 1.0);
        assert_eq!(prandtl_factor(-1.0e6), 1.0);
        assert_eq!(prandtl_factor(f64::NEG_INFINITY), 1.0);
        // the unguarded formula tends to 1 for large positive f
        assert_relative_eq!(prandtl_factor(60.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn tip_loss_stays_in_unit_interval() {
        let airfoil = Arc::new(Airfoil::from(ConstantPolar::new(0.5, 0.02)));
        for n_blades in [1, 2, 3, 5, 12] {
            let g = RotorGeometry::new(n_blades, 2.0, 0.2, Mode::Propeller);
            for i in 0..=20 {
                let r = g.radius_hub + (g.blade_radius - g.radius_hub) * i as f64 / 20.0;
                let s = BladeSection::new(airfoil.clone(), r, 0.04, 0.1, 0.08, &g);
                for j in 1..100 {
                    let phi = PI * j as f64 / 100.0;
                    let F = s.tip_loss(&g, phi);
                    assert!(F.is_finite() && F > 0.0 && F <= 1.0, "F = {} at r = {}, phi = {}", F, r, phi);
                }
            }
        }
    }

    #[test]
    fn angle_of_attack_flips_with_mode() {
        let gp = geometry(Mode::Propeller);
        let gt = geometry(Mode::Turbine);
        let s = section(&gp);
        for phi in [-1.0, 0.0, 0.05, 0.4, 2.0] {
            assert_eq!(
                s.angle_of_attack(gp.mode, phi),
                -s.angle_of_attack(gt.mode, phi)
            );
        }
    }

    #[test]
    fn zero_lift_gives_non_finite_induction() {
        let g = geometry(Mode::Propeller);
        let airfoil = Arc::new(Airfoil::from(ConstantPolar::new(0.0, 0.0)));
        let s = BladeSection::new(airfoil, 0.3, 0.4, 0.1, 0.05, &g);
        let (a, ap) = s.induction_factors(&g, 0.2);
        assert!(a.is_nan() && ap.is_nan());
        assert!(!s.residual(&g, 0.2, 10.0, 300.0).is_finite());
    }

    #[test]
    fn forces_report_consistent_state() {
        let g = geometry(Mode::Propeller);
        let s = section(&g);
        let fluid = FluidProperties::new(1.225, 1.8e-5).unwrap();
        let omega = 3000.0 * 2.0 * PI / 60.0;
        let phi = 0.15;
        let state = s.forces(&g, phi, 10.0, omega, &fluid);
        let residual = s.inflow_residual(&g, phi, 10.0, omega);
        assert_eq!(state.a, residual.a);
        assert_eq!(state.ap, residual.ap);
        assert_eq!(state.Cl, 0.5);
        assert_eq!(state.Cd, 0.02);
        assert_eq!(state.F, s.tip_loss(&g, phi));
        let v = (1.0 + state.a) * 10.0;
        let vp = (1.0 - state.ap) * omega * 0.3;
        let U = (v * v + vp * vp).sqrt();
        assert_relative_eq!(state.Re, 1.225 * U * 0.05 / 1.8e-5, max_relative = 1e-12);
        assert!(state.dT > 0.0 && state.dQ > 0.0);
    }
}
