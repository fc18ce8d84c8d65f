//! Pitch optimization by differential evolution.
//!
//! Strategy best/1/bin on a population normalised to the unit hypercube:
//! ```text
//! b' = x_best + F·(x_r1 − x_r2)          F ~ U[0.5, 1) drawn once per generation
//! trial_j = b'_j  if U[0,1) < CR or j = j_fill,  else x_i,j
//! ```
//! Trial components leaving [0, 1] are redrawn uniformly. A trial replaces its parent when
//! it is not worse. The run stops when `std(E) <= atol + tol·|mean(E)|` over the population
//! energies E, or after `max_iter` generations.

use super::blade_section::Mode;
use super::solver::{RunResult, Solver};
use log::{debug, info, warn};
use nalgebra::DVector;
use rand::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// best parameter vector
    pub x: Vec<f64>,
    /// objective value at `x`
    pub fun: f64,
    /// generations performed
    pub nit: usize,
    /// objective evaluations
    pub nfev: usize,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DifferentialEvolution {
    pub bounds: Vec<(f64, f64)>,
    /// population size is `popsize·dim`
    pub popsize: usize,
    pub mutation: (f64, f64),
    pub recombination: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub atol: f64,
    pub seed: u64,
}

impl DifferentialEvolution {
    pub fn new(bounds: Vec<(f64, f64)>) -> Self {
        Self {
            bounds,
            popsize: 15,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            max_iter: 1000,
            tol: 0.1,
            atol: 0.0,
            seed: 42,
        }
    }

    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    fn scale(&self, unit: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            unit.len(),
            unit.iter()
                .zip(&self.bounds)
                .map(|(u, (low, high))| low + u * (high - low)),
        )
    }

    fn converged(&self, energies: &[f64]) -> bool {
        if energies.iter().any(|e| !e.is_finite()) {
            return false;
        }
        let n = energies.len() as f64;
        let mean = energies.iter().sum::<f64>() / n;
        let var = energies.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
        var.sqrt() <= self.atol + self.tol * mean.abs()
    }

    /// Minimises `objective` inside `bounds`. Non-finite objective values count as `+∞`.
    pub fn minimize<F>(&self, mut objective: F) -> OptimizationResult
    where
        F: FnMut(&DVector<f64>) -> f64,
    {
        let dim = self.dim();
        if dim == 0 {
            return OptimizationResult {
                x: Vec::new(),
                fun: f64::INFINITY,
                nit: 0,
                nfev: 0,
                success: false,
                message: "nothing to optimize: no parameters".to_string(),
            };
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let np = (self.popsize * dim).max(5);
        let mut nfev = 0usize;
        let mut evaluate = |unit: &DVector<f64>, nfev: &mut usize| {
            *nfev += 1;
            let e = objective(&self.scale(unit));
            if e.is_finite() { e } else { f64::INFINITY }
        };

        let mut population: Vec<DVector<f64>> = (0..np)
            .map(|_| DVector::from_fn(dim, |_, _| rng.gen_range(0.0..1.0)))
            .collect();
        let mut energies: Vec<f64> = population
            .iter()
            .map(|member| evaluate(member, &mut nfev))
            .collect();
        promote_best(&mut population, &mut energies);

        let mut nit = 0;
        let mut success = false;
        while nit < self.max_iter {
            nit += 1;
            let f = rng.gen_range(self.mutation.0..self.mutation.1);
            for i in 0..np {
                let (r1, r2) = pick_two(&mut rng, np, i);
                let bprime = &population[0] + (&population[r1] - &population[r2]) * f;
                let fill = rng.gen_range(0..dim);
                let mut trial = population[i].clone();
                for j in 0..dim {
                    if j == fill || rng.gen_range(0.0..1.0) < self.recombination {
                        trial[j] = bprime[j];
                    }
                    if !(0.0..=1.0).contains(&trial[j]) {
                        trial[j] = rng.gen_range(0.0..1.0);
                    }
                }
                let energy = evaluate(&trial, &mut nfev);
                accept_trial(&mut population, &mut energies, i, trial, energy);
            }
            debug!("differential evolution step {}: f(x) = {}", nit, energies[0]);
            if self.converged(&energies) {
                success = true;
                break;
            }
        }

        let message = if success {
            "Optimization terminated successfully.".to_string()
        } else {
            "Maximum number of iterations has been exceeded.".to_string()
        };
        OptimizationResult {
            x: self.scale(&population[0]).iter().copied().collect(),
            fun: energies[0],
            nit,
            nfev,
            success,
            message,
        }
    }
}

/// Replaces member `i` when the trial is no worse. A trial that beats the current best
/// is swapped into slot 0 and the previous best moves to slot `i`.
fn accept_trial(
    population: &mut [DVector<f64>],
    energies: &mut [f64],
    i: usize,
    trial: DVector<f64>,
    energy: f64,
) {
    if energy > energies[i] {
        return;
    }
    population[i] = trial;
    energies[i] = energy;
    if energy < energies[0] {
        population.swap(0, i);
        energies.swap(0, i);
    }
}

fn promote_best(population: &mut [DVector<f64>], energies: &mut [f64]) {
    let best = energies
        .iter()
        .enumerate()
        .fold(0, |best, (i, e)| if *e < energies[best] { i } else { best });
    population.swap(0, best);
    energies.swap(0, best);
}

/// Two distinct indices in `0..n`, both different from `exclude`.
fn pick_two(rng: &mut StdRng, n: usize, exclude: usize) -> (usize, usize) {
    if n < 3 {
        return (0, n - 1);
    }
    let mut draw = |other: Option<usize>| loop {
        let k = rng.gen_range(0..n);
        if k != exclude && Some(k) != other {
            return k;
        }
    };
    let r1 = draw(None);
    let r2 = draw(Some(r1));
    (r1, r2)
}

/// Optimized pitch together with the case re-run at that pitch.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchOptimization {
    pub result: OptimizationResult,
    pub run: RunResult,
}

impl Solver {
    /// Default optimizer for this case: one variable per section, pitch in (0°, 30°).
    pub fn pitch_optimizer(&self) -> DifferentialEvolution {
        DifferentialEvolution::new(vec![(0.0, 30.0); self.rotor.n_sections()])
    }

    /// Maximises thrust (propeller) or power (turbine) over the section pitches.
    pub fn optimize_pitch(&mut self) -> PitchOptimization {
        let de = self.pitch_optimizer();
        self.optimize_pitch_with(&de)
    }

    pub fn optimize_pitch_with(&mut self, de: &DifferentialEvolution) -> PitchOptimization {
        let mode = self.mode();
        let result = de.minimize(|x| {
            debug!("current pitch [deg]: {:?}", x.as_slice());
            self.rotor.set_pitch_deg(x.as_slice());
            let run = self.run();
            match mode {
                Mode::Turbine => -run.power(),
                Mode::Propeller => -run.thrust(),
            }
        });
        if !result.success {
            warn!("pitch optimization: {}", result.message);
        }
        if !result.x.is_empty() {
            self.rotor.set_pitch_deg(&result.x);
        }
        let run = self.run();
        info!(
            "pitch optimization: {} generations, {} evaluations, f(x) = {:.6e}",
            result.nit, result.nfev, result.fun
        );
        PitchOptimization { result, run }
    }
}
