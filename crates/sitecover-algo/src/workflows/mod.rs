//! High-level workflow facades for site selection.
//!
//! These facades chain the pipeline stages (distance, coverage, solve,
//! evaluate) behind a single entry point configured by [`PlanConfig`].
//!
//! [`PlanConfig`]: sitecover_core::PlanConfig

pub mod plan;

pub use plan::{run_plan, PlanInputs, PlanReport, SitePlanner};
