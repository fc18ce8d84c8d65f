//! # Blade Element Momentum Theory
//!
//! Steady, axisymmetric performance of propellers, rotors and wind or water turbines.
//! Every blade is cut into radial sections; at each section the inflow angle `φ` is found
//! where 2-D airfoil loading and 1-D momentum balance agree, and sectional thrust and
//! torque are summed over the blade.
//!
//! ## Nomenclature
//!
//! | Symbol | Description | Units |
//! |--------|-------------|-------|
//! | `B` | number of blades | - |
//! | `R`, `D` | tip radius, diameter | m |
//! | `r`, `dr` | section radius, section width | m |
//! | `c` | chord | m |
//! | `σ` | local solidity `B·c/(2πr)` | - |
//! | `φ` | inflow angle | rad |
//! | `a`, `a'` | axial and tangential induction factors | - |
//! | `F` | Prandtl tip and hub loss factor | - |
//! | `C` | mode sign, +1 propeller, −1 turbine | - |
//! | `T`, `Q`, `P` | thrust, torque, power | N, N·m, W |
//!
//! ## Modules
//! - `blade_section`, `rotor`: geometry, per-section physics and reporting.
//! - `root_finding`, `solver`: inflow-angle solve, integration, coaxial coupling.
//! - `sweep`, `optimization`: parameter sweeps and pitch optimization.
//! - `config`, `task_parser_BEMT`: case files (JSON or task document).
//! - `BEMT_output`: tables.
pub mod bemt_error;
pub mod blade_section;
pub mod coefficients;
pub mod config;
pub mod fluid;
pub mod optimization;
pub mod root_finding;
pub mod rotor;
pub mod solver;
pub mod sweep;
pub mod task_parser_BEMT;
pub mod BEMT_output;
