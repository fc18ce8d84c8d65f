pub const USAGE: &str = "\
usage:
  RotorBEMT run <config> [--airfoils DIR] [--csv FILE] [--verbose]
  RotorBEMT sweep <config> <parameter> <n> <low> <high> [--airfoils DIR] [--csv FILE] [--verbose]
  RotorBEMT optimize <config> [--airfoils DIR] [--verbose]
  RotorBEMT template <file>
  RotorBEMT help

<config> ending in .json is read as JSON, anything else as a task document.
Airfoil polars are read from DIR/<name>.dat (default: <config dir>/airfoils).
Sweep parameters: v_inf, rpm, rpm2, Cs, pitch (collective offset, deg).";

pub const BEMT_ENG_HELPER: &str = "
                                General notes
All quantities are in SI units, angles (pitch, polar alpha) in degrees.
A task document consists of headers (a line with a single word) followed by key: value pairs.
Values may be integers (2), floats (0.625, 1.81e-5), strings, vectors ([0.2, 0.3, 0.4]) or
comma separated lists (NACA0012, NACA0012).

case - required.
    v_inf: free-stream velocity, m/s
    rpm: rotational speed, 1/min
    coaxial: true|false, optional, default false
    rpm2: speed of the downstream rotor, required if coaxial
    dz: rotor spacing, m, optional
rotor (or turbine) - required. A turbine header selects turbine mode.
    nblades: number of blades
    diameter: tip diameter, m
    radius_hub: hub radius, m
    section: airfoil name of every section
    radius: radial position of every section, m, strictly increasing
    chord: chord of every section, m
    pitch: pitch of every section, deg
    dr: width of every section, m, optional, default radius[1] - radius[0]
rotor2 - required if coaxial, same fields as rotor.
fluid - required.
    rho: density, kg/m^3
    mu: dynamic viscosity, Pa s
solver - optional.
    solver: bisect|brute, default bisect
    Cs: slipstream velocity coefficient, default 0.625

Airfoil polar files hold three columns: alpha[deg] Cl Cd. Lines starting with # are ignored.
";

pub const TEMPLATE: &str = "case
v_inf: 10.0
rpm: 3000.0
coaxial: false
rotor
nblades: 2
diameter: 1.0
radius_hub: 0.1
section: NACA0012, NACA0012, NACA0012, NACA0012, NACA0012, NACA0012, NACA0012
radius: [0.15, 0.2, 0.25, 0.3, 0.35, 0.4, 0.45]
chord: [0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05]
pitch: [10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0]
fluid
rho: 1.225
mu: 0.0000181
solver
solver: bisect
Cs: 0.625
";

/// Writes a case template the user can fill in.
pub fn create_template(path: &std::path::Path) -> std::io::Result<()> {
    std::fs::write(path, TEMPLATE)
}
