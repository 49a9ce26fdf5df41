//! `sitecover evaluate`

use anyhow::{Context, Result};
use sitecover_algo::{baseline_metrics, compare, evaluate_solution};
use sitecover_cli::LayerArgs;
use sitecover_algo::CoverageMetrics;
use sitecover_core::{Meters, SiteCoverError, SupplySet};
use sitecover_io::{
    load_candidates, load_demand, load_supply, read_metrics, read_solution, write_json,
    write_metrics,
};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::commands::util::layer_options;

pub struct EvaluateArgs<'a> {
    pub demand: &'a Path,
    pub candidates: &'a Path,
    pub supply: Option<&'a PathBuf>,
    pub solution: &'a Path,
    pub threshold: f64,
    pub out: &'a Path,
    pub compare: Option<&'a PathBuf>,
    pub before: Option<&'a PathBuf>,
    pub layers: &'a LayerArgs,
}

pub fn handle(args: EvaluateArgs<'_>) -> Result<()> {
    let options = layer_options(args.layers)?;
    let demand = load_demand(args.demand, &options)?;
    let candidates = load_candidates(args.candidates, &options.crs_only())?;
    let supply = match args.supply {
        Some(path) => load_supply(path, &options.crs_only())?,
        None => SupplySet::empty(demand.crs.clone()),
    };
    let chosen = read_solution(args.solution)?;
    let threshold = Meters(args.threshold);

    let after = evaluate_solution(&demand, &supply, &candidates, &chosen, threshold)
        .map_err(SiteCoverError::from)?;
    write_metrics(args.out, &after)
        .with_context(|| format!("writing metrics to {}", args.out.display()))?;
    info!(
        covered = after.covered_units,
        new_sites = after.n_new_sites,
        "evaluation metrics written"
    );

    let before = match args.before {
        Some(path) => {
            let stored = read_metrics(path)
                .with_context(|| format!("reading baseline metrics {}", path.display()))?;
            ensure_comparable(&stored, &after)
                .with_context(|| format!("comparing against {}", path.display()))?;
            stored
        }
        None => baseline_metrics(&demand, &supply, threshold).map_err(SiteCoverError::from)?,
    };
    let comparison = compare(&before, &after);
    if let Some(path) = args.compare {
        write_json(path, &comparison)
            .with_context(|| format!("writing comparison to {}", path.display()))?;
    }
    println!("{}", comparison.summary());
    Ok(())
}

/// A stored baseline must describe the same demand layer and threshold.
fn ensure_comparable(
    before: &CoverageMetrics,
    after: &CoverageMetrics,
) -> Result<(), SiteCoverError> {
    if before.n_demand_units != after.n_demand_units {
        return Err(SiteCoverError::Validation(format!(
            "baseline has {} demand units, evaluation has {}",
            before.n_demand_units, after.n_demand_units
        )));
    }
    if (before.threshold_m - after.threshold_m).abs() > 1e-9 {
        return Err(SiteCoverError::Validation(format!(
            "baseline threshold {} m differs from evaluation threshold {} m",
            before.threshold_m, after.threshold_m
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(n_demand_units: usize, threshold_m: f64) -> CoverageMetrics {
        CoverageMetrics {
            n_demand_units,
            n_existing_supply: 1,
            n_new_sites: 0,
            mean_nearest_m: Some(500.0),
            median_nearest_m: Some(400.0),
            covered_units: 2,
            coverage_fraction: 0.5,
            weighted_coverage_fraction: None,
            threshold_m,
        }
    }

    #[test]
    fn test_stored_baseline_must_match() {
        assert!(ensure_comparable(&metrics(4, 1000.0), &metrics(4, 1000.0)).is_ok());

        let err = ensure_comparable(&metrics(3, 1000.0), &metrics(4, 1000.0)).unwrap_err();
        assert!(matches!(err, SiteCoverError::Validation(_)));
        assert!(err.to_string().contains("3 demand units"));

        let err = ensure_comparable(&metrics(4, 800.0), &metrics(4, 1000.0)).unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }
}
