//! Projected-gradient solver for argmin
//!
//! Each iteration backtracks along the projection arc `Π(x - α∇f)` from a
//! Barzilai-Borwein trial step until the Armijo condition holds. Π is the
//! Euclidean projection onto the probability simplex, so every iterate is a
//! valid allocation.

use super::project_onto_simplex;
use argmin::core::{
    ArgminError, CostFunction, Error, Gradient, IterState, KV, Problem, Solver, State,
    TerminationReason, TerminationStatus,
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

const MIN_STEP: f64 = 1e-10;
const MAX_STEP: f64 = 1e6;
const ARMIJO_C: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 60;

/// Iteration state used by [`ProjectedGradient`].
pub(crate) type SimplexState = IterState<Vec<f64>, Vec<f64>, (), (), (), f64>;

/// A function of portfolio weights exposed to argmin.
///
/// The gradient is a central difference with step `step`, falling back to a
/// one-sided difference where a shifted point is not finite.
pub(crate) struct SimplexProblem<F> {
    f: F,
    step: f64,
}

impl<F> SimplexProblem<F> {
    pub(crate) const fn new(f: F, step: f64) -> Self {
        Self { f, step }
    }
}

impl<F: Fn(&Array1<f64>) -> f64> SimplexProblem<F> {
    fn value(&self, x: &[f64]) -> f64 {
        (self.f)(&Array1::from(x.to_vec()))
    }
}

impl<F: Fn(&Array1<f64>) -> f64> CostFunction for SimplexProblem<F> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.value(x))
    }
}

impl<F: Fn(&Array1<f64>) -> f64> Gradient for SimplexProblem<F> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, x: &Self::Param) -> Result<Self::Gradient, Error> {
        let h = self.step;
        let fx = self.value(x);
        let mut shifted = x.clone();

        let grad = (0..x.len())
            .map(|i| {
                shifted[i] = x[i] + h;
                let forward = self.value(&shifted);
                shifted[i] = x[i] - h;
                let backward = self.value(&shifted);
                shifted[i] = x[i];

                match (forward.is_finite(), backward.is_finite()) {
                    (true, true) => (forward - backward) / (2.0 * h),
                    (true, false) => (forward - fx) / h,
                    (false, true) => (fx - backward) / h,
                    (false, false) => 0.0,
                }
            })
            .collect();

        Ok(grad)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Stop {
    Converged,
    LineSearchFailed,
}

/// Projected gradient descent over the probability simplex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ProjectedGradient {
    ftol: f64,
    gtol: f64,
    step: f64,
    stop: Option<Stop>,
}

impl ProjectedGradient {
    pub(crate) const fn new(ftol: f64, gtol: f64) -> Self {
        Self {
            ftol,
            gtol,
            step: 1.0,
            stop: None,
        }
    }

    /// Armijo backtracking along the projection arc.
    fn line_search<O>(
        &self,
        problem: &mut Problem<O>,
        x: &Array1<f64>,
        fx: f64,
        g: &Array1<f64>,
    ) -> Result<Option<(f64, Array1<f64>, f64)>, Error>
    where
        O: CostFunction<Param = Vec<f64>, Output = f64>,
    {
        let mut alpha = self.step;
        for _ in 0..MAX_BACKTRACKS {
            let candidate = project_onto_simplex(&(x - &(g * alpha)));
            let f_candidate = problem.cost(&candidate.to_vec())?;
            let decrease = g.dot(&(x - &candidate));

            if f_candidate.is_finite() && f_candidate <= fx - ARMIJO_C * decrease {
                return Ok(Some((alpha, candidate, f_candidate)));
            }
            alpha *= 0.5;
        }
        Ok(None)
    }
}

fn not_initialized() -> Error {
    ArgminError::NotInitialized {
        text: "projected gradient needs a starting point".to_string(),
    }
    .into()
}

impl<O> Solver<O, SimplexState> for ProjectedGradient
where
    O: CostFunction<Param = Vec<f64>, Output = f64>
        + Gradient<Param = Vec<f64>, Gradient = Vec<f64>>,
{
    const NAME: &'static str = "Projected gradient";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: SimplexState,
    ) -> Result<(SimplexState, Option<KV>), Error> {
        let x = state.get_param().cloned().ok_or_else(not_initialized)?;
        let fx = problem.cost(&x)?;
        let g = problem.gradient(&x)?;

        let g_norm = max_abs(&g);
        self.step = if g_norm > 0.0 {
            (1.0 / g_norm).clamp(MIN_STEP, MAX_STEP)
        } else {
            1.0
        };
        self.stop = None;

        Ok((state.cost(fx).gradient(g), None))
    }

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        mut state: SimplexState,
    ) -> Result<(SimplexState, Option<KV>), Error> {
        let x = Array1::from(state.take_param().ok_or_else(not_initialized)?);
        let g = Array1::from(state.take_gradient().ok_or_else(not_initialized)?);
        let fx = state.get_cost();

        let stationarity = max_abs(&(&x - &project_onto_simplex(&(&x - &g))).to_vec());
        if stationarity <= self.gtol {
            self.stop = Some(Stop::Converged);
            return Ok((state.param(x.to_vec()).gradient(g.to_vec()), None));
        }

        let Some((alpha, x_new, f_new)) = self.line_search(problem, &x, fx, &g)? else {
            self.stop = Some(Stop::LineSearchFailed);
            return Ok((state.param(x.to_vec()).gradient(g.to_vec()), None));
        };

        let g_new = Array1::from(problem.gradient(&x_new.to_vec())?);

        let s = &x_new - &x;
        let y = &g_new - &g;
        let sy = s.dot(&y);
        self.step = if sy > 0.0 {
            (s.dot(&s) / sy).clamp(MIN_STEP, MAX_STEP)
        } else {
            (2.0 * alpha).min(MAX_STEP)
        };

        if (fx - f_new).abs() < self.ftol {
            self.stop = Some(Stop::Converged);
        }

        Ok((
            state
                .param(x_new.to_vec())
                .cost(f_new)
                .gradient(g_new.to_vec()),
            None,
        ))
    }

    fn terminate(&mut self, _state: &SimplexState) -> TerminationStatus {
        match self.stop {
            Some(Stop::Converged) => {
                TerminationStatus::Terminated(TerminationReason::SolverConverged)
            }
            Some(Stop::LineSearchFailed) => TerminationStatus::Terminated(
                TerminationReason::SolverExit("line search failed".to_string()),
            ),
            None => TerminationStatus::NotTerminated,
        }
    }
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}
