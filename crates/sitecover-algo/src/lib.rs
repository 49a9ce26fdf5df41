//! # sitecover-algo: Facility Siting Algorithms
//!
//! This crate implements the stages of the site-selection pipeline, from raw
//! coordinates to an audited selection of new sites.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Distance matrix | [`distance`] | [`CostMatrix`] (I×J metres) |
//! | Coverage sets | [`coverage`] | [`CoverageRelation`] at a threshold |
//! | Maximal covering | [`mclp`] | [`MclpOutcome`] with exactly P sites |
//! | Evaluation | [`evaluate`] | [`CoverageMetrics`] before and after |
//!
//! [`workflows`] chains all four behind [`run_plan`].
//!
//! ### Architecture
//!
//! The covering solver uses a Strategy Pattern for extensibility:
//!
//! - **[`MclpProblem`]**: the coverage relation, weights and budget (what to solve)
//! - **[`MclpBackend`]**: the search algorithm (how to solve it)
//!
//! [`BranchAndBoundBackend`] is always available. The LP relaxation
//! (`solver-clarabel`, default) tightens its root bound, and HiGHS
//! (`solver-highs`) solves the integer program directly.
//!
//! ## Example
//!
//! ```ignore
//! use sitecover_algo::{PlanInputs, SitePlanner};
//! use sitecover_core::Meters;
//!
//! let report = SitePlanner::new(&inputs)
//!     .threshold(Meters(1000.0))
//!     .facility_budget(10)
//!     .run()?;
//! println!("{}", report.solution.unwrap().summary());
//! ```

pub mod coverage;
pub mod distance;
pub mod evaluate;
pub mod mclp;
pub mod workflows;

pub use coverage::{build_coverage, pre_covered_mask, CoverageError, CoverageRelation};
pub use distance::{
    build_cost_matrix, nearest_distances, pairwise_distances, CostMatrix, DistanceError,
};
pub use evaluate::{
    baseline_metrics, compare, evaluate_solution, CoverageMetrics, EvaluationError,
    MetricsComparison,
};
pub use mclp::{
    backend_for, solve_mclp, solve_with_retry, BranchAndBoundBackend, MclpBackend, MclpError,
    MclpOutcome, MclpProblem, MclpProblemBuilder, MclpSolution, MclpSolverConfig, SolveStatus,
};
pub use workflows::{run_plan, PlanInputs, PlanReport, SitePlanner};
