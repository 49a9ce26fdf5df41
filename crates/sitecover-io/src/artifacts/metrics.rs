//! Metrics artifact: a flat one-row CSV.

use super::ensure_parent;
use anyhow::{Context, Result};
use sitecover_algo::CoverageMetrics;
use std::path::Path;

pub fn write_metrics(path: &Path, metrics: &CoverageMetrics) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating metrics {}", path.display()))?;
    writer.serialize(metrics)?;
    writer.flush()?;
    Ok(())
}

pub fn read_metrics(path: &Path) -> Result<CoverageMetrics> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening metrics {}", path.display()))?;
    let row = reader
        .deserialize()
        .next()
        .ok_or_else(|| anyhow::anyhow!("metrics file {} has no rows", path.display()))?;
    Ok(row?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_columns_and_missing_values() {
        let metrics = CoverageMetrics {
            n_demand_units: 214,
            n_existing_supply: 0,
            n_new_sites: 0,
            mean_nearest_m: None,
            median_nearest_m: None,
            covered_units: 0,
            coverage_fraction: 0.0,
            weighted_coverage_fraction: None,
            threshold_m: 1000.0,
        };
        let dir = tempdir().unwrap();
        let path = dir.path().join("baseline_metrics.csv");
        write_metrics(&path, &metrics).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "n_demand_units,n_existing_supply,n_new_sites,mean_nearest_m,median_nearest_m,\
             covered_units,coverage_fraction,weighted_coverage_fraction,threshold_m"
        );
        assert_eq!(read_metrics(&path).unwrap(), metrics);
    }
}
