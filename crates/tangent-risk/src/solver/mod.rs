//! Simplex-constrained optimizer
//!
//! Minimizes a scalar function of portfolio weights subject to
//!
//! Σ w_i = 1,  0 ≤ w_i ≤ 1
//!
//! by running [`argmin`]'s executor over a projected-gradient solver.
//! The projection onto the probability simplex enforces both the budget
//! equality and the bounds.

mod projected;

use crate::error::RiskError;
use crate::objective::RatioObjective;
use argmin::core::{Executor, State, TerminationReason};
use ndarray::Array1;
use projected::{ProjectedGradient, SimplexProblem};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Solver configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Iteration cap
    pub max_iterations: usize,
    /// Stop once an accepted step changes the objective by less than this
    pub ftol: f64,
    /// Stop once the projected gradient step is smaller than this (max norm)
    pub gtol: f64,
    /// Finite-difference step for gradient estimates
    pub gradient_step: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            ftol: 1e-6,
            gtol: 1e-8,
            gradient_step: f64::EPSILON.cbrt(),
        }
    }
}

impl SolverConfig {
    /// Check that every tolerance is usable.
    ///
    /// # Errors
    /// Returns `InvalidParameter` naming the first bad field.
    pub fn validate(&self) -> Result<(), RiskError> {
        if self.max_iterations == 0 {
            return Err(RiskError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.ftol.is_finite() && self.ftol >= 0.0) {
            return Err(RiskError::InvalidParameter(format!(
                "ftol must be finite and non-negative, got {}",
                self.ftol
            )));
        }
        if !(self.gtol.is_finite() && self.gtol >= 0.0) {
            return Err(RiskError::InvalidParameter(format!(
                "gtol must be finite and non-negative, got {}",
                self.gtol
            )));
        }
        if !(self.gradient_step.is_finite() && self.gradient_step > 0.0) {
            return Err(RiskError::InvalidParameter(format!(
                "gradient_step must be finite and positive, got {}",
                self.gradient_step
            )));
        }
        Ok(())
    }
}

/// How the search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    /// A stationarity or objective-change criterion was met
    Converged,
    /// The iteration cap was reached first
    MaxIterations,
    /// The search stopped early, usually because no step along the
    /// projection arc decreased the objective
    LineSearchFailed,
    /// The objective was not finite at the starting point
    NonFiniteObjective,
}

impl SolverStatus {
    /// Whether the returned weights satisfy a stopping criterion.
    pub const fn is_converged(self) -> bool {
        matches!(self, Self::Converged)
    }
}

impl SolverStatus {
    const fn from_termination(reason: Option<&TerminationReason>) -> Self {
        match reason {
            Some(TerminationReason::SolverConverged) => Self::Converged,
            Some(TerminationReason::MaxItersReached) => Self::MaxIterations,
            _ => Self::LineSearchFailed,
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Converged => "converged",
            Self::MaxIterations => "max_iterations",
            Self::LineSearchFailed => "line_search_failed",
            Self::NonFiniteObjective => "non_finite_objective",
        };
        f.pad(s)
    }
}

/// Best feasible point found
#[derive(Debug, Clone)]
pub struct Solution {
    /// Weights on the simplex
    pub weights: Array1<f64>,
    /// Objective value at `weights`
    pub objective: f64,
    /// Accepted iterations
    pub iterations: usize,
    /// Termination reason
    pub status: SolverStatus,
}

/// Equal allocation `1/n` over `n` assets.
pub fn equal_weights(n: usize) -> Array1<f64> {
    Array1::from_elem(n, 1.0 / n as f64)
}

/// Euclidean projection onto the probability simplex.
///
/// Sort-based algorithm of Duchi et al. (2008): finds the threshold θ such
/// that `max(v_i - θ, 0)` sums to one.
pub fn project_onto_simplex(v: &Array1<f64>) -> Array1<f64> {
    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumsum = 0.0;
    let mut theta = 0.0;
    for (j, &u) in sorted.iter().enumerate() {
        cumsum += u;
        let candidate = (cumsum - 1.0) / (j + 1) as f64;
        if u - candidate > 0.0 {
            theta = candidate;
        }
    }

    v.mapv(|x| (x - theta).max(0.0))
}

/// Projected-gradient optimizer over the weight simplex.
#[derive(Debug, Clone, Default)]
pub struct ConstrainedOptimizer {
    config: SolverConfig,
}

impl ConstrainedOptimizer {
    /// Create an optimizer with a validated configuration.
    pub fn new(config: SolverConfig) -> Result<Self, RiskError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Maximize a ratio objective starting from equal weights.
    pub fn maximize_ratio<O>(&self, objective: &O) -> Result<Solution, RiskError>
    where
        O: RatioObjective + ?Sized,
    {
        let n = objective.n_assets();
        let solution = self.minimize(|w| objective.cost(w), equal_weights(n))?;

        if !solution.status.is_converged() {
            warn!(
                ratio = %objective.kind(),
                status = %solution.status,
                iterations = solution.iterations,
                "optimizer did not converge"
            );
        }

        Ok(solution)
    }

    /// Minimize `f` over the simplex starting from (the projection of) `x0`.
    ///
    /// The best iterate is returned even when no stopping criterion is met;
    /// inspect [`Solution::status`].
    ///
    /// # Errors
    /// * `InvalidParameter` for an empty starting point
    /// * `Solver` if the executor itself fails
    pub fn minimize<F>(&self, f: F, x0: Array1<f64>) -> Result<Solution, RiskError>
    where
        F: Fn(&Array1<f64>) -> f64,
    {
        let n = x0.len();
        if n == 0 {
            return Err(RiskError::InvalidParameter(
                "cannot optimize over zero assets".to_string(),
            ));
        }

        if n == 1 {
            let weights = Array1::ones(1);
            let objective = f(&weights);
            return Ok(finish(weights, objective, 0, SolverStatus::Converged));
        }

        let start = project_onto_simplex(&x0);
        let f_start = f(&start);
        if !f_start.is_finite() {
            debug!(objective = f_start, "objective not finite at starting point");
            return Ok(finish(start, f_start, 0, SolverStatus::NonFiniteObjective));
        }

        let config = self.config;
        let problem = SimplexProblem::new(f, config.gradient_step);
        let solver = ProjectedGradient::new(config.ftol, config.gtol);

        let result = Executor::new(problem, solver)
            .configure(|state| {
                state
                    .param(start.to_vec())
                    .max_iters(config.max_iterations as u64)
            })
            .run()
            .map_err(|e| RiskError::Solver(e.to_string()))?;

        let state = result.state();
        let status = SolverStatus::from_termination(state.get_termination_reason());
        let iterations = state.get_iter() as usize;

        let Some(best) = state.get_best_param() else {
            return Ok(finish(start, f_start, iterations, status));
        };

        Ok(finish(
            Array1::from(best.clone()),
            state.get_best_cost(),
            iterations,
            status,
        ))
    }
}

fn finish(weights: Array1<f64>, objective: f64, iterations: usize, status: SolverStatus) -> Solution {
    debug!(%status, iterations, objective, "solver finished");
    Solution {
        weights,
        objective,
        iterations,
        status,
    }
}
