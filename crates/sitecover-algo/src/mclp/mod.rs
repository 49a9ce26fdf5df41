//! Maximal Covering Location Problem (MCLP)
//!
//! Selects exactly P candidate sites so that the weight of demand units within
//! the coverage threshold of at least one selected site is maximised.
//!
//! ## Integer Program
//!
//! ```text
//! maximize    Σ_i w_i · y_i
//!
//! subject to:
//!   Σ_j x_j = P                          Facility budget
//!   y_i ≤ Σ_{j ∈ cover(i)} x_j           Unit i covered only by a selected site
//!   y_i = 0           if cover(i) = ∅    Uncoverable units never count
//!   x_j, y_i ∈ {0,1}
//! ```
//!
//! With the `pre-covered` baseline policy, units already within the threshold
//! of existing supply are removed from the program and reported as a constant
//! baseline weight.
//!
//! ## Outcomes
//!
//! Every solve returns an [`MclpOutcome`]: `Optimal`, `FeasibleSuboptimal`
//! (budget exhausted, best incumbent plus an upper bound) or `Infeasible`.
//! Backend failures unrelated to the model are [`MclpError`]s.
//!
//! ## Backends
//!
//! - [`BranchAndBoundBackend`]: exact depth-first search using the
//!   submodularity of coverage for bounds (always available)
//! - [`lp_relaxation_bound`]: continuous relaxation via Clarabel, used as a
//!   root bound (feature `solver-clarabel`)
//! - `HighsBackend`: the integer program above solved by HiGHS (feature
//!   `solver-highs`)
//!
//! ## References
//!
//! - **Church & ReVelle (1974)**: "The maximal covering location problem"
//! - **Nemhauser, Wolsey & Fisher (1978)**: "An analysis of approximations for
//!   maximizing submodular set functions"

mod branch_bound;
#[cfg(feature = "solver-highs")]
mod highs;
#[cfg(feature = "solver-clarabel")]
mod lp_relaxation;
mod problem;
mod solution;
mod solver;

pub use branch_bound::BranchAndBoundBackend;
#[cfg(feature = "solver-highs")]
pub use highs::HighsBackend;
#[cfg(feature = "solver-clarabel")]
pub use lp_relaxation::lp_relaxation_bound;
pub use problem::{MclpProblem, MclpProblemBuilder};
pub use solution::{MclpOutcome, MclpSolution, SolveStatus};
pub use solver::{
    backend_for, solve_mclp, solve_with_retry, MclpBackend, MclpError, MclpSolverConfig,
};
