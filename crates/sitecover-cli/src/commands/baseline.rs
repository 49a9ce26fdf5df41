//! `sitecover baseline`

use anyhow::{Context, Result};
use sitecover_algo::baseline_metrics;
use sitecover_cli::LayerArgs;
use sitecover_core::{Meters, SiteCoverError};
use sitecover_io::{load_demand, load_supply, write_metrics};
use std::path::Path;
use tracing::info;

use crate::commands::util::layer_options;

pub fn handle(
    demand: &Path,
    supply: &Path,
    threshold: f64,
    out: &Path,
    layers: &LayerArgs,
) -> Result<()> {
    let options = layer_options(layers)?;
    let demand_set = load_demand(demand, &options)?;
    let supply_set = load_supply(supply, &options.crs_only())?;

    let metrics = baseline_metrics(&demand_set, &supply_set, Meters(threshold))
        .map_err(SiteCoverError::from)?;
    write_metrics(out, &metrics)
        .with_context(|| format!("writing metrics to {}", out.display()))?;

    info!(
        covered = metrics.covered_units,
        n_demand = metrics.n_demand_units,
        "baseline metrics written"
    );
    println!(
        "Coverage within {:.0} m: {:.2}% ({} of {} units), existing supply: {}",
        metrics.threshold_m,
        metrics.coverage_fraction * 100.0,
        metrics.covered_units,
        metrics.n_demand_units,
        metrics.n_supply()
    );
    Ok(())
}
