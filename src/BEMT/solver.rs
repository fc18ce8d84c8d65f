//! # BEMT solver
//!
//! Drives the per-section inflow solve over a rotor, integrates sectional thrust and
//! torque, derives coefficients and couples a second, downstream rotor through the
//! slipstream of the first.
//!
//! ## Root-finding policy per section
//! ```text
//! Bisection on [0.01π, 0.9π] ── Converged ──────────────► forces
//!        │
//!        └── NeedsFallback (no sign change / non-finite / iteration limit)
//!                 │
//!                 └──► BruteForce on [-0.9π, 0.9π], 3600 samples ──► forces
//! ```
//! With method `brute` the bisection step is skipped. Fallbacks are logged and counted
//! in [`SolveStatistics`]; they never abort a run.
//!
//! ## Coaxial rotors
//! The downstream rotor sees the contracted slipstream of the upstream rotor:
//! `r_s = R/√2`, `v_s = Cs·√(2T/(ρA))`. Sections with `r < r_s` get inflow `v_s`,
//! the rest get none. The coupling is one-way and not iterated.

use super::bemt_error::BemtError;
use super::blade_section::{BladeSection, Mode, SectionOutcome, SectionState};
use super::coefficients::{
    Coefficients, PropellerCoefficients, TurbineCoefficients, propeller_coefficients,
    turbine_coefficients,
};
use super::fluid::FluidProperties;
use super::root_finding::{
    BISECT_BRACKET, BRUTE_RANGE, BRUTE_SAMPLES, BisectionParams, PhiSolution, bisect,
    brute_force,
};
use super::rotor::{Rotor, RotorGeometry, SectionsSummary};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

/// Default slipstream velocity coefficient.
pub const DEFAULT_CS: f64 = 0.625;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverMethod {
    /// bisection with brute-force fallback
    #[default]
    Bisect,
    /// brute force only
    Brute,
}

impl FromStr for SolverMethod {
    type Err = BemtError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bisect" => Ok(SolverMethod::Bisect),
            "brute" => Ok(SolverMethod::Brute),
            other => Err(BemtError::UnknownMethod(other.to_string())),
        }
    }
}

/// Diagnostic counters of one rotor solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveStatistics {
    pub sections: usize,
    pub bisection_converged: usize,
    /// bisection could not bracket a root and brute force took over
    pub bracket_failures: usize,
    /// sections solved by brute force, fallbacks included
    pub brute_force: usize,
    /// sections without any finite residual; they contribute nothing to the totals
    pub not_converged: usize,
}

/// Totals and per-section records of one rotor solve.
#[derive(Debug, Clone, PartialEq)]
pub struct RotorSolution {
    pub rpm: f64,
    pub omega: f64,
    /// thrust [N]
    pub T: f64,
    /// torque [N·m]
    pub Q: f64,
    /// power [W]
    pub P: f64,
    pub states: Vec<SectionState>,
    pub statistics: SolveStatistics,
}

/// Contracted slipstream of a rotor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slipstream {
    pub r_s: f64,
    pub v_s: f64,
}

/// Downstream rotor of a coaxial pair.
#[derive(Debug, Clone)]
pub struct CoaxialRotor {
    pub rotor: Rotor,
    pub rpm: f64,
    /// rotor spacing over upstream diameter
    pub zD: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotorResult {
    pub solution: RotorSolution,
    pub coefficients: Coefficients,
    pub sections: SectionsSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoaxialResult {
    pub slipstream: Slipstream,
    pub rotor: RotorResult,
}

/// Output of [`Solver::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub primary: RotorResult,
    pub secondary: Option<CoaxialResult>,
}

impl RunResult {
    pub fn thrust(&self) -> f64 {
        self.primary.solution.T
    }
    pub fn torque(&self) -> f64 {
        self.primary.solution.Q
    }
    pub fn power(&self) -> f64 {
        self.primary.solution.P
    }
}

/// A BEMT case: operating point, rotor(s), fluid and solver settings.
#[derive(Debug, Clone)]
pub struct Solver {
    /// free-stream velocity [m/s]
    pub v_inf: f64,
    pub rpm: f64,
    pub rotor: Rotor,
    pub fluid: FluidProperties,
    pub method: SolverMethod,
    /// slipstream velocity coefficient
    pub Cs: f64,
    pub coaxial: Option<CoaxialRotor>,
    pub bisection: BisectionParams,
    pub brute_samples: usize,
}

pub fn rpm_to_omega(rpm: f64) -> f64 {
    rpm * 2.0 * PI / 60.0
}

impl Solver {
    pub fn new(v_inf: f64, rpm: f64, rotor: Rotor, fluid: FluidProperties) -> Self {
        Self {
            v_inf,
            rpm,
            rotor,
            fluid,
            method: SolverMethod::default(),
            Cs: DEFAULT_CS,
            coaxial: None,
            bisection: BisectionParams::default(),
            brute_samples: BRUTE_SAMPLES,
        }
    }

    pub fn with_method(mut self, method: SolverMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_Cs(mut self, Cs: f64) -> Self {
        self.Cs = Cs;
        self
    }

    /// Adds a downstream rotor. Both rotors must share the operating mode.
    pub fn with_coaxial(mut self, rotor2: Rotor, rpm2: f64, dz: f64) -> Result<Self, BemtError> {
        if rotor2.mode() != self.rotor.mode() {
            return Err(BemtError::invalid(
                "rotor2",
                "downstream rotor must have the same mode as the upstream rotor",
            ));
        }
        let zD = dz / self.rotor.diameter();
        self.coaxial = Some(CoaxialRotor {
            rotor: rotor2,
            rpm: rpm2,
            zD,
        });
        Ok(self)
    }

    pub fn mode(&self) -> Mode {
        self.rotor.mode()
    }

    pub fn is_coaxial(&self) -> bool {
        self.coaxial.is_some()
    }

    /// Inflow angle of one section, how it was found, and whether any finite residual exists.
    fn solve_section(
        &self,
        index: usize,
        section: &BladeSection,
        geometry: &RotorGeometry,
        v: f64,
        omega: f64,
    ) -> (f64, SectionOutcome, bool) {
        let residual = |phi: f64| section.residual(geometry, phi, v, omega);
        let brute = || brute_force(residual, BRUTE_RANGE.0, BRUTE_RANGE.1, self.brute_samples);
        match self.method {
            SolverMethod::Brute => {
                let found = brute();
                (found.x, SectionOutcome::BruteForce, found.found_finite)
            }
            SolverMethod::Bisect => {
                match bisect(residual, BISECT_BRACKET.0, BISECT_BRACKET.1, &self.bisection) {
                    PhiSolution::Converged(phi) => (phi, SectionOutcome::Bisection, true),
                    PhiSolution::NeedsFallback(reason) => {
                        warn!(
                            "section {} (r = {:.4} m): bisection failed: {}; switching to brute solver",
                            index, section.radius, reason
                        );
                        let found = brute();
                        (found.x, SectionOutcome::Fallback, found.found_finite)
                    }
                }
            }
        }
    }

    /// Solves every section of `rotor` and integrates thrust, torque and power.
    /// Sections with `radius < r_inflow` see `v_inflow`, the others see no inflow.
    /// Derived geometry (tip radius, area, solidity) is recomputed from the rotor's
    /// current inputs, so direct edits to `rotor.geometry` take effect without `precalc`.
    pub fn solve(&self, rotor: &Rotor, rpm: f64, v_inflow: f64, r_inflow: f64) -> RotorSolution {
        let mut rotor = rotor.clone();
        rotor.precalc();
        let geometry = &rotor.geometry;
        let omega = rpm_to_omega(rpm);
        let mut statistics = SolveStatistics {
            sections: rotor.sections.len(),
            ..Default::default()
        };

        let states: Vec<SectionState> = rotor
            .sections
            .iter()
            .enumerate()
            .map(|(i, section)| {
                let v = if section.radius < r_inflow { v_inflow } else { 0.0 };
                let (phi, outcome, converged) = self.solve_section(i, section, geometry, v, omega);
                match outcome {
                    SectionOutcome::Bisection => statistics.bisection_converged += 1,
                    SectionOutcome::Fallback => {
                        statistics.bracket_failures += 1;
                        statistics.brute_force += 1;
                    }
                    SectionOutcome::BruteForce => statistics.brute_force += 1,
                    SectionOutcome::Evaluated => {}
                }
                let state = section.forces(geometry, phi, v, omega, &self.fluid);
                if converged {
                    SectionState { outcome, ..state }
                } else {
                    statistics.not_converged += 1;
                    warn!(
                        "section {} (r = {:.4} m): no finite residual on the search grid, section excluded from totals",
                        i, section.radius
                    );
                    SectionState {
                        dT: 0.0,
                        dQ: 0.0,
                        converged: false,
                        outcome,
                        ..state
                    }
                }
            })
            .collect();

        let T: f64 = states.iter().map(|s| s.dT).sum();
        let Q: f64 = states.iter().map(|s| s.dQ).sum();
        RotorSolution {
            rpm,
            omega,
            T,
            Q,
            P: Q * omega,
            states,
            statistics,
        }
    }

    /// Slipstream of the upstream rotor producing thrust `T`. Non-positive thrust gives no slipstream velocity.
    pub fn slipstream(&self, T: f64) -> Slipstream {
        let r_s = self.rotor.blade_radius() / 2f64.sqrt();
        if T <= 0.0 {
            warn!("upstream thrust {} N is not positive, slipstream velocity set to 0", T);
        }
        let v_s = self.Cs * (2.0 * T.max(0.0) / (self.fluid.rho * self.rotor.area())).sqrt();
        Slipstream { r_s, v_s }
    }

    pub fn rotor_coeffs(&self, T: f64, Q: f64, _P: f64) -> PropellerCoefficients {
        propeller_coefficients(T, Q, self.v_inf, self.rpm, self.rotor.diameter(), self.fluid.rho)
    }

    pub fn turbine_coeffs(&self, T: f64, _Q: f64, P: f64) -> TurbineCoefficients {
        turbine_coefficients(
            T,
            P,
            self.v_inf,
            self.rpm,
            self.rotor.blade_radius(),
            self.rotor.area(),
            self.fluid.rho,
        )
    }

    /// Mode-appropriate coefficients of a solution obtained on `rotor`.
    pub fn coefficients(&self, rotor: &Rotor, solution: &RotorSolution) -> Coefficients {
        match rotor.mode() {
            Mode::Propeller => Coefficients::Propeller(propeller_coefficients(
                solution.T,
                solution.Q,
                self.v_inf,
                solution.rpm,
                rotor.diameter(),
                self.fluid.rho,
            )),
            Mode::Turbine => Coefficients::Turbine(turbine_coefficients(
                solution.T,
                solution.P,
                self.v_inf,
                solution.rpm,
                rotor.blade_radius(),
                rotor.area(),
                self.fluid.rho,
            )),
        }
    }

    /// Solves the case at the current operating point; with a coaxial pair the
    /// downstream rotor is solved in the slipstream of the upstream one.
    pub fn run(&mut self) -> RunResult {
        self.rotor.precalc();
        let solution = self.solve(&self.rotor, self.rpm, self.v_inf, self.rotor.diameter());
        self.rotor.record_states(&solution.states);
        info!(
            "Thrust (N): {:.6e}, Torque (Nm): {:.6e}, Power (W): {:.6e}",
            solution.T, solution.Q, solution.P
        );
        let primary = RotorResult {
            coefficients: self.coefficients(&self.rotor, &solution),
            sections: self.rotor.sections_summary(),
            solution,
        };

        if let Some(coax) = self.coaxial.as_mut() {
            coax.rotor.precalc();
        }
        let downstream = self.coaxial.as_ref().map(|coax| {
            let slipstream = self.slipstream(primary.solution.T);
            let solution = self.solve(&coax.rotor, coax.rpm, slipstream.v_s, slipstream.r_s);
            info!(
                "Thrust 2 (N): {:.6e}, Torque 2 (Nm): {:.6e}, Power 2 (W): {:.6e}",
                solution.T, solution.Q, solution.P
            );
            let coefficients = self.coefficients(&coax.rotor, &solution);
            (slipstream, solution, coefficients)
        });
        let secondary = downstream.and_then(|(slipstream, solution, coefficients)| {
            let coax = self.coaxial.as_mut()?;
            coax.rotor.record_states(&solution.states);
            Some(CoaxialResult {
                slipstream,
                rotor: RotorResult {
                    coefficients,
                    sections: coax.rotor.sections_summary(),
                    solution,
                },
            })
        });
        RunResult { primary, secondary }
    }
}
