//! End-to-end runs of the planning workflow.

use sitecover_algo::{run_plan, PlanInputs, SolveStatus};
use sitecover_core::{
    BaselinePolicy, CandidateSet, Crs, DemandSet, DemandUnit, PlanConfig, Point, SiteCoverError,
    SupplySet,
};

/// Two clusters of demand, an existing site serving the first cluster.
fn inputs() -> PlanInputs {
    let crs = Crs::default_planar();
    let mut units = Vec::new();
    for k in 0..5 {
        let offset = k as f64 * 100.0;
        units.push(
            DemandUnit::new(format!("W{k}"), Point::new(offset, 0.0)).with_weight(1000.0),
        );
        units.push(
            DemandUnit::new(format!("E{k}"), Point::new(5000.0 + offset, 0.0))
                .with_weight(1500.0),
        );
    }
    PlanInputs {
        demand: DemandSet::new(crs.clone(), units),
        candidates: CandidateSet::from_points(
            crs.clone(),
            [
                Point::new(200.0, 300.0),
                Point::new(5200.0, 300.0),
                Point::new(9000.0, 9000.0),
            ],
        ),
        supply: SupplySet::new(crs, [Point::new(200.0, -300.0)]),
    }
}

fn config(toml: &str) -> PlanConfig {
    PlanConfig::from_toml_str(toml).unwrap()
}

#[test]
fn plan_prefers_heavier_cluster() {
    let report = run_plan(
        &inputs(),
        &config("threshold_m = 1000.0\nfacility_budget = 1\n"),
    )
    .unwrap();
    assert_eq!(report.status, SolveStatus::Optimal);
    let solution = report.solution.as_ref().unwrap();
    assert_eq!(solution.selected_indices(), vec![1]);
    assert_eq!(solution.objective, 7500.0);
    assert_eq!(report.before.covered_units, 5);
    let after = report.after.as_ref().unwrap();
    assert_eq!(after.covered_units, 10);
    assert_eq!(after.weighted_coverage_fraction, Some(1.0));
}

#[test]
fn ignore_policy_rewards_recovering_served_units() {
    // with P=2 both clusters are covered by candidates regardless of supply
    let report = run_plan(
        &inputs(),
        &config("threshold_m = 1000.0\nfacility_budget = 2\n"),
    )
    .unwrap();
    let solution = report.solution.unwrap();
    assert_eq!(solution.selected_indices(), vec![0, 1]);
    assert_eq!(solution.objective, 12500.0);
    assert_eq!(solution.baseline_weight, 0.0);
}

#[test]
fn pre_covered_policy_reports_baseline() {
    let mut cfg = config("threshold_m = 1000.0\nfacility_budget = 2\n");
    cfg.baseline = BaselinePolicy::PreCovered;
    let report = run_plan(&inputs(), &cfg).unwrap();
    let solution = report.solution.unwrap();
    assert_eq!(solution.objective, 7500.0);
    assert_eq!(solution.baseline_weight, 5000.0);
    assert_eq!(solution.baseline_units, 5);
    assert_eq!(solution.selected.len(), 2);
}

#[test]
fn invalid_threshold_is_config_error() {
    let err = run_plan(&inputs(), &config("threshold_m = 0.0\n")).unwrap_err();
    assert!(matches!(err, SiteCoverError::Config(_)));
    assert!(err.is_user_error());
}

#[test]
fn geographic_layers_rejected() {
    let mut inputs = inputs();
    inputs.demand.crs = Crs::parse("EPSG:4326").unwrap();
    let err = run_plan(&inputs, &config("facility_budget = 1\n")).unwrap_err();
    assert!(matches!(err, SiteCoverError::Crs(_)));
}

#[test]
fn report_serializes_without_cost_matrix() {
    let report = run_plan(
        &inputs(),
        &config("threshold_m = 1000.0\nfacility_budget = 1\n"),
    )
    .unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["status"], "optimal");
    assert_eq!(value["baseline_policy"], "ignore");
    assert_eq!(value["solution"]["selected"], serde_json::json!([1]));
    assert!(value.get("cost_matrix").is_none());
    assert!(value["comparison"]["coverage_delta"].as_f64().unwrap() > 0.0);
}
