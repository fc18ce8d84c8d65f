//! Scalar root finding for the inflow angle.
//!
//! Bisection either converges or tells the caller that it needs a fallback; it never
//! panics and never throws. Brute force samples a fixed grid and always returns the
//! sample with the smallest residual magnitude.

use std::f64::consts::PI;

/// Bisection bracket for the inflow angle.
pub const BISECT_BRACKET: (f64, f64) = (0.01 * PI, 0.9 * PI);
/// Brute-force search interval for the inflow angle.
pub const BRUTE_RANGE: (f64, f64) = (-0.9 * PI, 0.9 * PI);
/// Number of brute-force samples.
pub const BRUTE_SAMPLES: usize = 3600;
/// Residual assigned to non-finite samples so they are never selected.
pub const NON_FINITE_RESIDUAL: f64 = 1e30;

/// Why bisection gave up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BracketFailure {
    /// residual has the same sign at both ends of the bracket
    NoSignChange { f_low: f64, f_high: f64 },
    /// residual is NaN or infinite at a bracket end or at a midpoint
    NonFiniteResidual { x: f64 },
    /// interval did not shrink below tolerance within the iteration budget
    MaxIterations { x: f64 },
}

impl std::fmt::Display for BracketFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketFailure::NoSignChange { f_low, f_high } => write!(
                f,
                "f(a) and f(b) must have different signs (f(a) = {:e}, f(b) = {:e})",
                f_low, f_high
            ),
            BracketFailure::NonFiniteResidual { x } => {
                write!(f, "non-finite residual at x = {}", x)
            }
            BracketFailure::MaxIterations { x } => {
                write!(f, "no convergence within the iteration limit (last x = {})", x)
            }
        }
    }
}

/// Outcome of bisection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhiSolution {
    Converged(f64),
    NeedsFallback(BracketFailure),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BisectionParams {
    pub xtol: f64,
    pub rtol: f64,
    pub max_iter: usize,
}

impl Default for BisectionParams {
    fn default() -> Self {
        Self {
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iter: 100,
        }
    }
}

/// Bisection on `[low, high]`. Requires a sign change of `f` across the bracket.
pub fn bisect<F>(mut f: F, low: f64, high: f64, params: &BisectionParams) -> PhiSolution
where
    F: FnMut(f64) -> f64,
{
    let f_low = f(low);
    if !f_low.is_finite() {
        return PhiSolution::NeedsFallback(BracketFailure::NonFiniteResidual { x: low });
    }
    let f_high = f(high);
    if !f_high.is_finite() {
        return PhiSolution::NeedsFallback(BracketFailure::NonFiniteResidual { x: high });
    }
    if f_low * f_high > 0.0 {
        return PhiSolution::NeedsFallback(BracketFailure::NoSignChange { f_low, f_high });
    }
    if f_low == 0.0 {
        return PhiSolution::Converged(low);
    }
    if f_high == 0.0 {
        return PhiSolution::Converged(high);
    }

    let mut x_low = low;
    let mut dm = high - low;
    let mut xm = x_low;
    for _ in 0..params.max_iter {
        dm *= 0.5;
        xm = x_low + dm;
        let fm = f(xm);
        if !fm.is_finite() {
            return PhiSolution::NeedsFallback(BracketFailure::NonFiniteResidual { x: xm });
        }
        // x_low keeps the sign of f_low
        if fm * f_low >= 0.0 {
            x_low = xm;
        }
        if fm == 0.0 || dm.abs() < params.xtol + params.rtol * xm.abs() {
            return PhiSolution::Converged(xm);
        }
    }
    PhiSolution::NeedsFallback(BracketFailure::MaxIterations { x: xm })
}

/// `n` evenly spaced points from `low` to `high`, both ends included.
pub fn linspace(low: f64, high: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let step = (high - low) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { high } else { low + step * i as f64 })
                .collect()
        }
    }
}

/// Result of the grid search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BruteForceResult {
    pub x: f64,
    /// residual at `x`, [`NON_FINITE_RESIDUAL`] if no sample was finite
    pub residual: f64,
    /// at least one sample had a finite residual
    pub found_finite: bool,
}

/// Evaluates `f` on `n` points of `[low, high]` and returns the point with the smallest
/// `|f|`. Non-finite residuals count as [`NON_FINITE_RESIDUAL`]. Ties keep the first sample.
pub fn brute_force<F>(mut f: F, low: f64, high: f64, n: usize) -> BruteForceResult
where
    F: FnMut(f64) -> f64,
{
    let mut best = BruteForceResult {
        x: low,
        residual: NON_FINITE_RESIDUAL,
        found_finite: false,
    };
    let mut best_abs = f64::INFINITY;
    for x in linspace(low, high, n) {
        let value = f(x);
        let residual = if value.is_finite() {
            best.found_finite = true;
            value
        } else {
            NON_FINITE_RESIDUAL
        };
        if residual.abs() < best_abs {
            best_abs = residual.abs();
            best.x = x;
            best.residual = residual;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bisect_finds_simple_root() {
        let params = BisectionParams::default();
        match bisect(|x| x * x - 2.0, 0.0, 2.0, &params) {
            PhiSolution::Converged(x) => assert_relative_eq!(x, 2f64.sqrt(), epsilon = 1e-11),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bisect_accepts_root_at_bracket_end() {
        let params = BisectionParams::default();
        assert_eq!(bisect(|x| x - 1.0, 1.0, 3.0, &params), PhiSolution::Converged(1.0));
        assert_eq!(bisect(|x| x - 3.0, 1.0, 3.0, &params), PhiSolution::Converged(3.0));
    }

    #[test]
    fn bisect_reports_missing_sign_change() {
        let params = BisectionParams::default();
        match bisect(|x| x * x + 1.0, -1.0, 1.0, &params) {
            PhiSolution::NeedsFallback(BracketFailure::NoSignChange { f_low, f_high }) => {
                assert_eq!(f_low, 2.0);
                assert_eq!(f_high, 2.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bisect_treats_non_finite_as_failure() {
        let params = BisectionParams::default();
        assert!(matches!(
            bisect(|x| 1.0 / x, 0.0, 1.0, &params),
            PhiSolution::NeedsFallback(BracketFailure::NonFiniteResidual { .. })
        ));
        assert!(matches!(
            bisect(|x| if x > 0.4 && x < 0.6 { f64::NAN } else { x - 0.9 }, 0.0, 1.0, &params),
            PhiSolution::NeedsFallback(BracketFailure::NonFiniteResidual { x }) if x == 0.5
        ));
    }

    #[test]
    fn bisect_respects_iteration_budget() {
        let params = BisectionParams {
            max_iter: 3,
            ..Default::default()
        };
        assert!(matches!(
            bisect(|x| x - 0.123, 0.0, 1.0, &params),
            PhiSolution::NeedsFallback(BracketFailure::MaxIterations { .. })
        ));
    }

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(1.0, 5.0, 5), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn brute_force_picks_smallest_magnitude() {
        let f = |x: f64| (x - 0.3).abs() + 0.01;
        let result = brute_force(f, -1.0, 1.0, 201);
        assert_relative_eq!(result.x, 0.3, epsilon = 1e-12);
        assert!(result.found_finite);
        for x in linspace(-1.0, 1.0, 201) {
            assert!(result.residual.abs() <= f(x).abs());
        }
    }

    #[test]
    fn brute_force_never_selects_non_finite() {
        let f = |x: f64| if x.abs() < 0.05 { f64::NAN } else { x };
        let result = brute_force(f, -1.0, 1.0, 101);
        assert!(result.residual.is_finite());
        assert!(result.x.abs() >= 0.05);

        let all_nan = brute_force(|_| f64::NAN, BRUTE_RANGE.0, BRUTE_RANGE.1, BRUTE_SAMPLES);
        assert!(!all_nan.found_finite);
        assert_eq!(all_nan.residual, NON_FINITE_RESIDUAL);
        assert!(all_nan.x >= BRUTE_RANGE.0 && all_nan.x <= BRUTE_RANGE.1);
    }
}
