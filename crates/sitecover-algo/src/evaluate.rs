//! Before/after coverage metrics.
//!
//! Metrics are recomputed from coordinates against the union of existing
//! supply and chosen sites, independently of the solver's coverage model.

use crate::distance::nearest_distances;
use serde::{Deserialize, Serialize};
use sitecover_core::{
    CandidateId, CandidateSet, DemandSet, Meters, Point, SiteCoverError, SupplySet,
};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Input(#[from] SiteCoverError),

    #[error("coverage threshold must be positive and finite, got {0}")]
    InvalidThreshold(f64),

    #[error("chosen candidate {id} does not exist (have {available} candidates)")]
    UnknownCandidate { id: CandidateId, available: usize },

    #[error("candidate {0} chosen more than once")]
    DuplicateCandidate(CandidateId),
}

impl From<EvaluationError> for SiteCoverError {
    fn from(err: EvaluationError) -> Self {
        match err {
            EvaluationError::Input(inner) => inner,
            EvaluationError::InvalidThreshold(_) => SiteCoverError::Config(err.to_string()),
            other => SiteCoverError::Validation(other.to_string()),
        }
    }
}

/// Aggregate statistics of demand against a supply set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageMetrics {
    pub n_demand_units: usize,
    pub n_existing_supply: usize,
    pub n_new_sites: usize,
    /// `None` when the supply set is empty
    pub mean_nearest_m: Option<f64>,
    pub median_nearest_m: Option<f64>,
    pub covered_units: usize,
    pub coverage_fraction: f64,
    /// Present for weighted demand only
    pub weighted_coverage_fraction: Option<f64>,
    pub threshold_m: f64,
}

impl CoverageMetrics {
    pub fn n_supply(&self) -> usize {
        self.n_existing_supply + self.n_new_sites
    }
}

/// Change from a baseline to a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsComparison {
    pub before: CoverageMetrics,
    pub after: CoverageMetrics,
    /// Negative when sites got closer
    pub mean_delta_m: Option<f64>,
    pub median_delta_m: Option<f64>,
    pub coverage_delta: f64,
    pub newly_covered_units: usize,
}

impl MetricsComparison {
    /// Format a human-readable summary
    pub fn summary(&self) -> String {
        let fmt_m = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |m| format!("{m:.1} m"));
        let mut s = String::new();
        s.push_str(&format!("Coverage Comparison\n{}\n", "=".repeat(40)));
        s.push_str(&format!(
            "Threshold: {:.1} m, demand units: {}\n",
            self.after.threshold_m, self.after.n_demand_units
        ));
        s.push_str(&format!(
            "Supply: {} existing + {} new\n",
            self.after.n_existing_supply, self.after.n_new_sites
        ));
        s.push_str(&format!(
            "Mean nearest:   {} -> {}\n",
            fmt_m(self.before.mean_nearest_m),
            fmt_m(self.after.mean_nearest_m)
        ));
        s.push_str(&format!(
            "Median nearest: {} -> {}\n",
            fmt_m(self.before.median_nearest_m),
            fmt_m(self.after.median_nearest_m)
        ));
        s.push_str(&format!(
            "Coverage:       {:.2}% -> {:.2}% ({} units newly covered)\n",
            self.before.coverage_fraction * 100.0,
            self.after.coverage_fraction * 100.0,
            self.newly_covered_units
        ));
        s
    }
}

/// Metrics of demand against existing supply only.
pub fn baseline_metrics(
    demand: &DemandSet,
    supply: &SupplySet,
    threshold: Meters,
) -> Result<CoverageMetrics, EvaluationError> {
    check_threshold(threshold)?;
    demand.validate()?;
    supply.validate()?;
    demand.crs.ensure_same(&supply.crs, "demand", "supply")?;
    Ok(metrics_against(
        demand,
        &supply.locations(),
        supply.len(),
        0,
        threshold,
    ))
}

/// Metrics of demand against existing supply plus the chosen candidates.
pub fn evaluate_solution(
    demand: &DemandSet,
    supply: &SupplySet,
    candidates: &CandidateSet,
    chosen: &[CandidateId],
    threshold: Meters,
) -> Result<CoverageMetrics, EvaluationError> {
    check_threshold(threshold)?;
    demand.validate()?;
    supply.validate()?;
    candidates.validate()?;
    demand.crs.ensure_same(&supply.crs, "demand", "supply")?;
    demand.crs.ensure_same(&candidates.crs, "demand", "candidate")?;

    let mut seen = HashSet::with_capacity(chosen.len());
    let mut union = supply.locations();
    for &id in chosen {
        if !seen.insert(id) {
            return Err(EvaluationError::DuplicateCandidate(id));
        }
        let site = candidates
            .get(id)
            .ok_or(EvaluationError::UnknownCandidate {
                id,
                available: candidates.len(),
            })?;
        union.push(site.location);
    }

    Ok(metrics_against(
        demand,
        &union,
        supply.len(),
        chosen.len(),
        threshold,
    ))
}

/// Before/after deltas.
pub fn compare(before: &CoverageMetrics, after: &CoverageMetrics) -> MetricsComparison {
    let delta = |b: Option<f64>, a: Option<f64>| match (b, a) {
        (Some(b), Some(a)) => Some(a - b),
        _ => None,
    };
    MetricsComparison {
        before: before.clone(),
        after: after.clone(),
        mean_delta_m: delta(before.mean_nearest_m, after.mean_nearest_m),
        median_delta_m: delta(before.median_nearest_m, after.median_nearest_m),
        coverage_delta: after.coverage_fraction - before.coverage_fraction,
        newly_covered_units: after.covered_units.saturating_sub(before.covered_units),
    }
}

fn check_threshold(threshold: Meters) -> Result<(), EvaluationError> {
    if threshold.is_finite() && threshold.value() > 0.0 {
        Ok(())
    } else {
        Err(EvaluationError::InvalidThreshold(threshold.value()))
    }
}

fn metrics_against(
    demand: &DemandSet,
    supply: &[Point],
    n_existing: usize,
    n_new: usize,
    threshold: Meters,
) -> CoverageMetrics {
    let n = demand.len();
    let weights = demand.weights();
    let nearest = nearest_distances(&demand.points(), supply);

    let (mean, median, covered, covered_weight) = match &nearest {
        Some(d) => {
            let within: Vec<bool> = d.iter().map(|&x| x <= threshold.value()).collect();
            let covered = within.iter().filter(|&&c| c).count();
            let covered_weight: f64 = within
                .iter()
                .zip(&weights)
                .filter(|(c, _)| **c)
                .map(|(_, w)| w)
                .sum();
            (mean(d), median(d), covered, covered_weight)
        }
        None => (None, None, 0, 0.0),
    };

    let total_weight = demand.total_weight();
    let weighted = if demand.is_unweighted() {
        None
    } else if total_weight > 0.0 {
        Some(covered_weight / total_weight)
    } else {
        Some(0.0)
    };

    debug!(
        demand = n,
        supply = supply.len(),
        covered,
        "metrics computed"
    );

    CoverageMetrics {
        n_demand_units: n,
        n_existing_supply: n_existing,
        n_new_sites: n_new,
        mean_nearest_m: mean,
        median_nearest_m: median,
        covered_units: covered,
        coverage_fraction: if n > 0 { covered as f64 / n as f64 } else { 0.0 },
        weighted_coverage_fraction: weighted,
        threshold_m: threshold.value(),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Middle value; average of the two middle values for even lengths.
fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitecover_core::{Crs, DemandUnit};

    fn demand() -> DemandSet {
        DemandSet::new(
            Crs::default_planar(),
            vec![
                DemandUnit::new("E01", Point::new(0.0, 0.0)),
                DemandUnit::new("E02", Point::new(10.0, 0.0)),
                DemandUnit::new("E03", Point::new(0.0, 10.0)),
            ],
        )
    }

    fn candidates() -> CandidateSet {
        CandidateSet::from_points(
            Crs::default_planar(),
            [Point::new(0.0, 1.0), Point::new(10.0, 1.0)],
        )
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_baseline_without_supply() {
        let supply = SupplySet::empty(Crs::default_planar());
        let metrics = baseline_metrics(&demand(), &supply, Meters(2.0)).unwrap();
        assert_eq!(metrics.mean_nearest_m, None);
        assert_eq!(metrics.median_nearest_m, None);
        assert_eq!(metrics.coverage_fraction, 0.0);
        assert_eq!(metrics.weighted_coverage_fraction, None);
    }

    #[test]
    fn test_union_of_existing_and_chosen() {
        let supply = SupplySet::new(Crs::default_planar(), [Point::new(0.0, 11.0)]);
        let chosen = [CandidateId::new(0)];
        let metrics =
            evaluate_solution(&demand(), &supply, &candidates(), &chosen, Meters(2.0)).unwrap();
        assert_eq!(metrics.n_existing_supply, 1);
        assert_eq!(metrics.n_new_sites, 1);
        // E01 by the new site, E03 by existing supply
        assert_eq!(metrics.covered_units, 2);
        assert!((metrics.coverage_fraction - 2.0 / 3.0).abs() < 1e-12);
        let nearest_e02 = 1.0_f64.hypot(10.0);
        assert!((metrics.mean_nearest_m.unwrap() - (2.0 + nearest_e02) / 3.0).abs() < 1e-9);
        assert_eq!(metrics.median_nearest_m, Some(1.0));
    }

    #[test]
    fn test_rejects_unknown_and_duplicate_ids() {
        let supply = SupplySet::empty(Crs::default_planar());
        let err = evaluate_solution(
            &demand(),
            &supply,
            &candidates(),
            &[CandidateId::new(5)],
            Meters(2.0),
        )
        .unwrap_err();
        assert!(matches!(err, EvaluationError::UnknownCandidate { .. }));

        let err = evaluate_solution(
            &demand(),
            &supply,
            &candidates(),
            &[CandidateId::new(1), CandidateId::new(1)],
            Meters(2.0),
        )
        .unwrap_err();
        assert!(matches!(err, EvaluationError::DuplicateCandidate(_)));
    }

    #[test]
    fn test_rejects_crs_mismatch() {
        let supply = SupplySet::empty(Crs::parse("EPSG:3857").unwrap());
        let err = baseline_metrics(&demand(), &supply, Meters(2.0)).unwrap_err();
        assert!(matches!(
            SiteCoverError::from(err),
            SiteCoverError::Crs(_)
        ));
    }

    #[test]
    fn test_coverage_monotone_in_threshold() {
        let supply = SupplySet::new(Crs::default_planar(), [Point::new(1.0, 1.0)]);
        let mut last = 0.0;
        for t in [0.5, 2.0, 10.0, 15.0, 100.0] {
            let m = baseline_metrics(&demand(), &supply, Meters(t)).unwrap();
            assert!(m.coverage_fraction >= last);
            last = m.coverage_fraction;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn test_weighted_fraction_and_compare() {
        let weighted = DemandSet::new(
            Crs::default_planar(),
            vec![
                DemandUnit::new("E01", Point::new(0.0, 0.0)).with_weight(300.0),
                DemandUnit::new("E02", Point::new(10.0, 0.0)).with_weight(100.0),
            ],
        );
        let supply = SupplySet::empty(Crs::default_planar());
        let before = baseline_metrics(&weighted, &supply, Meters(2.0)).unwrap();
        let after = evaluate_solution(
            &weighted,
            &supply,
            &candidates(),
            &[CandidateId::new(0)],
            Meters(2.0),
        )
        .unwrap();
        assert_eq!(after.weighted_coverage_fraction, Some(0.75));
        let cmp = compare(&before, &after);
        assert_eq!(cmp.newly_covered_units, 1);
        assert!((cmp.coverage_delta - 0.5).abs() < 1e-12);
        assert_eq!(cmp.mean_delta_m, None);
        assert!(cmp.summary().contains("1 units newly covered"));
    }
}
