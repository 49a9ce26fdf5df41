//! MCLP solver dispatch
//!
//! Backends implement [`MclpBackend`] for `0 < P <= J`. [`solve_mclp`] handles
//! the degenerate budgets, pads the selection to exactly P sites and
//! recomputes the objective from the coverage relation so every backend
//! reports the same quantity.

use super::{BranchAndBoundBackend, MclpOutcome, MclpProblem, MclpSolution};
use sitecover_core::{BackendKind, CandidateId, PlanConfig, SiteCoverError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info, warn};

/// MCLP solver configuration
#[derive(Debug, Clone)]
pub struct MclpSolverConfig {
    /// Wall-clock limit; `None` searches to proven optimality
    pub time_limit: Option<Duration>,
    /// Maximum search nodes
    pub node_limit: Option<u64>,
    /// Tighten the root bound with the LP relaxation
    pub use_lp_bound: bool,
    pub backend: BackendKind,
    /// Echo the MIP backend's own log to stdout
    pub verbose: bool,
}

impl Default for MclpSolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Some(Duration::from_secs(60)),
            node_limit: None,
            use_lp_bound: true,
            backend: BackendKind::BranchAndBound,
            verbose: false,
        }
    }
}

impl MclpSolverConfig {
    /// Backend output follows the active log level (debug or finer).
    pub fn from_plan(config: &PlanConfig) -> Self {
        Self {
            time_limit: config.time_limit(),
            node_limit: config.node_limit,
            use_lp_bound: config.lp_bound,
            backend: config.backend,
            verbose: backend_output_enabled(LevelFilter::current()),
        }
    }
}

fn backend_output_enabled(max_level: LevelFilter) -> bool {
    max_level >= LevelFilter::DEBUG
}

/// MCLP solver errors
#[derive(Error, Debug)]
pub enum MclpError {
    #[error("{backend} backend failed: {message}")]
    Backend { backend: String, message: String },

    #[error("backend '{0}' is not available in this build")]
    BackendUnavailable(String),

    #[error("invalid weights: {0}")]
    InvalidWeights(String),
}

impl From<MclpError> for SiteCoverError {
    fn from(err: MclpError) -> Self {
        match err {
            MclpError::InvalidWeights(_) => SiteCoverError::Validation(err.to_string()),
            MclpError::BackendUnavailable(_) => SiteCoverError::Config(err.to_string()),
            MclpError::Backend { .. } => SiteCoverError::Solver(err.to_string()),
        }
    }
}

/// Solves an MCLP instance (how to solve).
///
/// Called only with `0 < P <= J`. The returned selection may hold fewer than
/// P sites when extra sites add nothing; [`solve_mclp`] pads it.
pub trait MclpBackend: Send + Sync {
    /// Unique identifier (e.g., "branch-and-bound", "highs")
    fn id(&self) -> &str;

    /// Whether this backend is compiled in
    fn is_available(&self) -> bool {
        true
    }

    fn solve(
        &self,
        problem: &MclpProblem,
        config: &MclpSolverConfig,
    ) -> Result<MclpOutcome, MclpError>;
}

/// Backend implementing `kind`.
pub fn backend_for(kind: BackendKind) -> Result<Box<dyn MclpBackend>, MclpError> {
    match kind {
        BackendKind::BranchAndBound => Ok(Box::new(BranchAndBoundBackend)),
        #[cfg(feature = "solver-highs")]
        BackendKind::Highs => Ok(Box::new(super::HighsBackend)),
        #[cfg(not(feature = "solver-highs"))]
        BackendKind::Highs => Err(MclpError::BackendUnavailable(kind.to_string())),
    }
}

/// Select exactly P candidates maximising covered demand weight.
pub fn solve_mclp(
    problem: &MclpProblem,
    config: &MclpSolverConfig,
) -> Result<MclpOutcome, MclpError> {
    let p = problem.facility_budget();
    let n = problem.n_candidates();
    let start = Instant::now();

    if p > n {
        warn!(budget = p, candidates = n, "facility budget exceeds candidates");
        return Ok(MclpOutcome::Infeasible {
            reason: format!("facility budget {p} exceeds the {n} available candidates"),
            partial: None,
        });
    }

    if p == 0 {
        let solution = MclpSolution {
            selected: Vec::new(),
            objective: 0.0,
            covered_units: 0,
            baseline_weight: problem.baseline_weight(),
            baseline_units: problem.baseline_units(),
            bound: Some(0.0),
            nodes_explored: 0,
            solve_time: start.elapsed(),
            backend: "trivial".to_string(),
            message: "empty budget".to_string(),
        };
        return Ok(MclpOutcome::Optimal(solution));
    }

    let backend = backend_for(config.backend)?;
    if !backend.is_available() {
        return Err(MclpError::BackendUnavailable(backend.id().to_string()));
    }

    info!(
        backend = backend.id(),
        budget = p,
        candidates = n,
        demand = problem.n_demand(),
        "solving maximal covering problem"
    );

    let outcome = match backend.solve(problem, config)? {
        MclpOutcome::Optimal(s) => MclpOutcome::Optimal(finalize(problem, s, start)),
        MclpOutcome::FeasibleSuboptimal(s) => {
            MclpOutcome::FeasibleSuboptimal(finalize(problem, s, start))
        }
        MclpOutcome::Infeasible { reason, partial } => MclpOutcome::Infeasible {
            reason,
            partial: partial.map(|s| finalize(problem, s, start)),
        },
    };

    if let Some(solution) = outcome.solution() {
        info!(
            status = %outcome.status(),
            objective = solution.objective,
            covered = solution.covered_units,
            nodes = solution.nodes_explored,
            elapsed_ms = solution.solve_time.as_millis() as u64,
            "solve finished"
        );
    }
    Ok(outcome)
}

/// Solve, then re-solve once with `retry_limit` if the first attempt ran out
/// of budget without proving optimality.
pub fn solve_with_retry(
    problem: &MclpProblem,
    config: &MclpSolverConfig,
    retry_limit: Option<Duration>,
) -> Result<MclpOutcome, MclpError> {
    let first = solve_mclp(problem, config)?;
    let retry_limit = match (&first, retry_limit) {
        (MclpOutcome::FeasibleSuboptimal(_), Some(limit)) => limit,
        _ => return Ok(first),
    };
    if config.time_limit.is_some_and(|t| retry_limit <= t) {
        debug!("retry limit not above the first limit; keeping first result");
        return Ok(first);
    }

    warn!(
        retry_limit_s = retry_limit.as_secs_f64(),
        "no optimality proof within the time limit; retrying"
    );
    let retry_config = MclpSolverConfig {
        time_limit: Some(retry_limit),
        ..config.clone()
    };
    let second = solve_mclp(problem, &retry_config)?;

    let first_objective = first.solution().map_or(f64::NEG_INFINITY, |s| s.objective);
    match second.solution() {
        Some(s) if second.is_optimal() || s.objective > first_objective => Ok(second),
        _ => Ok(first),
    }
}

/// Pad to exactly P sites with unused candidates, lowest index first.
pub(crate) fn pad_selection(mut selected: Vec<usize>, p: usize, n: usize) -> Vec<usize> {
    selected.sort_unstable();
    selected.dedup();
    let mut next = 0;
    while selected.len() < p && next < n {
        if selected.binary_search(&next).is_err() {
            selected.push(next);
            selected.sort_unstable();
        }
        next += 1;
    }
    selected
}

fn finalize(problem: &MclpProblem, mut solution: MclpSolution, start: Instant) -> MclpSolution {
    let indices = pad_selection(
        solution.selected_indices(),
        problem.facility_budget(),
        problem.n_candidates(),
    );
    let (objective, covered) = problem.objective_of(&indices);
    solution.selected = indices.into_iter().map(CandidateId::new).collect();
    solution.objective = objective;
    solution.covered_units = covered;
    solution.bound = solution.bound.map(|b| b.max(objective));
    solution.baseline_weight = problem.baseline_weight();
    solution.baseline_units = problem.baseline_units();
    solution.solve_time = start.elapsed();
    solution
}
