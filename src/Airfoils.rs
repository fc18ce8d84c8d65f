/// eng
/// Lift and drag polars used by the blade element solver.
/// A polar answers two questions for an angle of attack given in radians: Cl(alpha) and Cd(alpha).
/// Two kinds are provided: a constant polar (handy for verification cases) and a tabulated
/// polar read from a text file with columns `alpha[deg] Cl Cd`, linearly interpolated.
pub mod polar;
/// eng
/// Reading polar files and caching airfoils by name, so that all blade sections
/// sharing an airfoil share one table.
pub mod airfoil_loader;
