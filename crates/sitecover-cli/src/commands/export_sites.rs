//! `sitecover export-sites`

use anyhow::{Context, Result};
use sitecover_io::{load_candidates, read_solution, write_new_sites, LayerOptions};
use std::path::Path;
use tracing::info;

use crate::commands::util::parse_crs;

pub fn handle(candidates: &Path, solution: &Path, out: &Path, crs: Option<&str>) -> Result<()> {
    let options = LayerOptions {
        crs: parse_crs(crs)?,
        ..LayerOptions::default()
    };
    let candidate_set = load_candidates(candidates, &options)?;
    let chosen = read_solution(solution)?;
    write_new_sites(out, &candidate_set, &chosen)
        .with_context(|| format!("writing new sites to {}", out.display()))?;
    info!(sites = chosen.len(), crs = %candidate_set.crs, "new sites exported");
    println!("{} new sites written to {}", chosen.len(), out.display());
    Ok(())
}
