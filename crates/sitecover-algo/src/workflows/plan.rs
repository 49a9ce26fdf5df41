//! End-to-end planning facade
//!
//! Provides a simplified, builder-style API for running the whole pipeline.

use crate::coverage::{build_coverage, pre_covered_mask};
use crate::distance::{build_cost_matrix, CostMatrix};
use crate::evaluate::{
    baseline_metrics, compare, evaluate_solution, CoverageMetrics, MetricsComparison,
};
use crate::mclp::{
    solve_with_retry, MclpOutcome, MclpProblem, MclpSolution, MclpSolverConfig, SolveStatus,
};
use serde::Serialize;
use sitecover_core::{
    BackendKind, BaselinePolicy, CandidateSet, DemandSet, Meters, PlanConfig, SiteCoverResult,
    SupplySet,
};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// The three point layers a plan runs over.
#[derive(Debug, Clone)]
pub struct PlanInputs {
    pub demand: DemandSet,
    pub candidates: CandidateSet,
    pub supply: SupplySet,
}

/// Everything a plan run produces.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub threshold_m: f64,
    pub facility_budget: usize,
    pub baseline_policy: BaselinePolicy,
    pub n_demand: usize,
    pub n_candidates: usize,
    pub n_supply: usize,
    /// Demand units no candidate reaches
    pub uncoverable_units: usize,
    pub status: SolveStatus,
    pub solution: Option<MclpSolution>,
    pub infeasible_reason: Option<String>,
    pub before: CoverageMetrics,
    pub after: Option<CoverageMetrics>,
    pub comparison: Option<MetricsComparison>,
    #[serde(skip)]
    pub cost_matrix: CostMatrix,
}

impl PlanReport {
    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}

/// Run distance, coverage, solve and evaluation for one configuration.
pub fn run_plan(inputs: &PlanInputs, config: &PlanConfig) -> SiteCoverResult<PlanReport> {
    let start = Instant::now();
    config.validate()?;
    inputs.supply.validate()?;
    inputs
        .demand
        .crs
        .ensure_same(&inputs.supply.crs, "demand", "supply")?;

    let matrix = build_cost_matrix(&inputs.demand, &inputs.candidates)?;
    config.validate_for(matrix.n_candidates())?;

    let threshold = config.threshold();
    let mut coverage = build_coverage(&matrix, threshold)?;
    if config.baseline == BaselinePolicy::PreCovered {
        let mask = pre_covered_mask(
            &inputs.demand.points(),
            &inputs.supply.locations(),
            threshold,
        );
        coverage = coverage.with_pre_covered(mask)?;
    }
    let uncoverable_units = coverage.uncoverable().len();

    let problem = MclpProblem::new(coverage, config.facility_budget)
        .with_weights(inputs.demand.weights())?;
    let solver_config = MclpSolverConfig::from_plan(config);
    let outcome = solve_with_retry(&problem, &solver_config, config.retry_time_limit())?;
    let status = outcome.status();

    let before = baseline_metrics(&inputs.demand, &inputs.supply, threshold)?;
    let (solution, infeasible_reason) = match outcome {
        MclpOutcome::Infeasible { reason, .. } => {
            warn!(%reason, "plan infeasible");
            (None, Some(reason))
        }
        other => (other.into_solution(), None),
    };
    let after = match &solution {
        Some(s) => Some(evaluate_solution(
            &inputs.demand,
            &inputs.supply,
            &inputs.candidates,
            &s.selected,
            threshold,
        )?),
        None => None,
    };
    let comparison = after.as_ref().map(|a| compare(&before, a));

    info!(
        status = %status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "plan finished"
    );

    Ok(PlanReport {
        threshold_m: threshold.value(),
        facility_budget: config.facility_budget,
        baseline_policy: config.baseline,
        n_demand: inputs.demand.len(),
        n_candidates: inputs.candidates.len(),
        n_supply: inputs.supply.len(),
        uncoverable_units,
        status,
        solution,
        infeasible_reason,
        before,
        after,
        comparison,
        cost_matrix: matrix,
    })
}

/// Fluent builder over [`run_plan`]
pub struct SitePlanner<'a> {
    inputs: &'a PlanInputs,
    config: PlanConfig,
}

impl<'a> SitePlanner<'a> {
    pub fn new(inputs: &'a PlanInputs) -> Self {
        Self {
            inputs,
            config: PlanConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn with_config(mut self, config: PlanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn threshold(mut self, threshold: Meters) -> Self {
        self.config.threshold_m = threshold.value();
        self
    }

    pub fn facility_budget(mut self, p: usize) -> Self {
        self.config.facility_budget = p;
        self
    }

    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit_seconds = Some(limit.as_secs_f64());
        self
    }

    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn baseline(mut self, policy: BaselinePolicy) -> Self {
        self.config.baseline = policy;
        self
    }

    pub fn run(self) -> SiteCoverResult<PlanReport> {
        run_plan(self.inputs, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitecover_core::{Crs, DemandUnit, Point, SiteCoverError};

    fn inputs() -> PlanInputs {
        let crs = Crs::default_planar();
        PlanInputs {
            demand: DemandSet::new(
                crs.clone(),
                vec![
                    DemandUnit::new("E01", Point::new(0.0, 0.0)),
                    DemandUnit::new("E02", Point::new(10.0, 0.0)),
                    DemandUnit::new("E03", Point::new(0.0, 10.0)),
                ],
            ),
            candidates: CandidateSet::from_points(
                crs.clone(),
                [Point::new(0.0, 1.0), Point::new(10.0, 1.0)],
            ),
            supply: SupplySet::new(crs, [Point::new(0.0, 9.5)]),
        }
    }

    #[test]
    fn test_plan_single_site() {
        let inputs = inputs();
        let report = SitePlanner::new(&inputs)
            .threshold(Meters(2.0))
            .facility_budget(1)
            .run()
            .unwrap();
        assert!(report.is_optimal());
        assert_eq!(report.uncoverable_units, 1);
        let solution = report.solution.as_ref().unwrap();
        assert_eq!(solution.objective, 1.0);
        assert_eq!(solution.selected.len(), 1);
        // E03 covered by existing supply only
        assert_eq!(report.before.covered_units, 1);
        assert_eq!(report.after.as_ref().unwrap().covered_units, 2);
        assert_eq!(report.comparison.as_ref().unwrap().newly_covered_units, 1);
    }

    #[test]
    fn test_plan_rejects_budget_above_candidates() {
        let inputs = inputs();
        let err = SitePlanner::new(&inputs)
            .threshold(Meters(2.0))
            .facility_budget(3)
            .run()
            .unwrap_err();
        assert!(matches!(err, SiteCoverError::Config(_)));
    }

    #[test]
    fn test_plan_pre_covered_baseline() {
        let inputs = inputs();
        let report = SitePlanner::new(&inputs)
            .threshold(Meters(2.0))
            .facility_budget(2)
            .baseline(BaselinePolicy::PreCovered)
            .run()
            .unwrap();
        let solution = report.solution.unwrap();
        assert_eq!(solution.objective, 2.0);
        assert_eq!(solution.baseline_units, 1);
        assert_eq!(solution.total_covered_weight(), 3.0);
        assert_eq!(report.after.unwrap().coverage_fraction, 1.0);
    }
}
