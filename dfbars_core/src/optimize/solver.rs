//! Solver trait implemented by external constraint-based solver adapters
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::configuration::CONFIGURATION;
use crate::metabolic_model::model::Model;
use crate::optimize::FluxSolution;

/// A flux solver consuming the bound surface of a [`Model`]
///
/// Implementations wrap an external constraint-based modeling library. The
/// simulation always requests a loopless solution: the optimum post-processed
/// into a flux distribution free of thermodynamically impossible internal
/// cycles.
pub trait FluxSolver {
    /// Solve the model to optimality and return the loopless flux distribution
    ///
    /// Infeasibility is an expected outcome, reported as
    /// [`SolverError::Infeasible`]; the caller decides whether to stop or
    /// extrapolate. It is never a retryable condition.
    fn solve_loopless(&mut self, model: &Model) -> Result<FluxSolution, SolverError>;
}

/// Errors a solve can finish with
#[derive(Error, Debug, Clone)]
pub enum SolverError {
    /// The model has no feasible flux distribution under the current bounds
    #[error("Solver status infeasible for model {0}")]
    Infeasible(String),
    /// The objective is unbounded under the current bounds
    #[error("Objective unbounded for model {0}")]
    Unbounded(String),
    /// The solver encountered a numerical error
    #[error("Numerical error while solving model {0}")]
    Numerical(String),
    /// The solve exceeded its wall clock budget
    #[error("Solve of model {model} exceeded the {limit:?} time budget")]
    TimedOut { model: String, limit: Duration },
}

/// Wraps a solver with a wall clock budget per solve
///
/// LP solves can stall on degenerate bound sets; the guard turns a stalled
/// solve into [`SolverError::TimedOut`] so the run terminates with a
/// diagnosable status instead of hanging.
pub struct GuardedSolver<S> {
    inner: S,
    time_limit: Duration,
}

impl<S> GuardedSolver<S> {
    /// Wrap a solver with the configured default time budget
    pub fn new(inner: S) -> Self {
        GuardedSolver {
            time_limit: CONFIGURATION.read().unwrap().solve_time_limit,
            inner,
        }
    }

    /// Wrap a solver with an explicit time budget
    pub fn with_time_limit(inner: S, time_limit: Duration) -> Self {
        GuardedSolver { inner, time_limit }
    }
}

impl<S: FluxSolver> FluxSolver for GuardedSolver<S> {
    fn solve_loopless(&mut self, model: &Model) -> Result<FluxSolution, SolverError> {
        let start = Instant::now();
        let solution = self.inner.solve_loopless(model)?;
        if start.elapsed() > self.time_limit {
            return Err(SolverError::TimedOut {
                model: model.id.clone().unwrap_or_default(),
                limit: self.time_limit,
            });
        }
        Ok(solution)
    }
}
