//! `sitecover cost-matrix`

use anyhow::{Context, Result};
use sitecover_algo::build_cost_matrix;
use sitecover_cli::LayerArgs;
use sitecover_core::{Meters, SiteCoverError};
use sitecover_io::{load_candidates, load_demand, write_cost_matrix};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::commands::util::layer_options;

pub fn handle(demand: &Path, candidates: &Path, out: &Path, layers: &LayerArgs) -> Result<()> {
    let start = Instant::now();
    let options = layer_options(layers)?;
    let demand_set = load_demand(demand, &options)?;
    let candidate_set = load_candidates(candidates, &options.crs_only())?;

    let matrix = build_cost_matrix(&demand_set, &candidate_set).map_err(SiteCoverError::from)?;
    write_cost_matrix(out, &matrix, &demand_set)
        .with_context(|| format!("writing cost matrix to {}", out.display()))?;

    info!(
        n_demand = matrix.n_demand(),
        n_candidates = matrix.n_candidates(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "cost matrix written"
    );
    let farthest = matrix
        .row_minima()
        .into_iter()
        .fold(0.0_f64, f64::max);
    println!(
        "Cost matrix {} x {} written to {} (farthest unit {:.2} km from a candidate)",
        matrix.n_demand(),
        matrix.n_candidates(),
        out.display(),
        Meters(farthest).to_km()
    );
    Ok(())
}
