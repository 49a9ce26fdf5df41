//! Long-form cost-matrix CSV.
//!
//! One row per demand × candidate pair, row-major:
//!
//! ```csv
//! i,j,demand_id,candidate_id,cost_m
//! 0,0,W01001690,0,812.4
//! ```

use super::ensure_parent;
use crate::error::ImportError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sitecover_algo::CostMatrix;
use sitecover_core::{DemandSet, SiteCoverError};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct CostRow {
    i: usize,
    j: usize,
    demand_id: String,
    candidate_id: String,
    cost_m: f64,
}

/// A cost matrix read back from disk, with the demand ids of its rows.
#[derive(Debug, Clone)]
pub struct CostMatrixArtifact {
    pub matrix: CostMatrix,
    pub demand_ids: Vec<String>,
}

/// Write `matrix` for `demand` (rows) against candidates indexed by position.
pub fn write_cost_matrix(path: &Path, matrix: &CostMatrix, demand: &DemandSet) -> Result<()> {
    if demand.len() != matrix.n_demand() {
        return Err(SiteCoverError::Validation(format!(
            "cost matrix has {} rows but the demand layer has {} units",
            matrix.n_demand(),
            demand.len()
        ))
        .into());
    }
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating cost matrix {}", path.display()))?;
    for (i, j, cost) in matrix.triples() {
        writer.serialize(CostRow {
            i,
            j,
            demand_id: demand.units[i].id.as_str().to_string(),
            candidate_id: j.to_string(),
            cost_m: cost.value(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a cost matrix, requiring every (i, j) pair exactly once.
pub fn read_cost_matrix(path: &Path) -> Result<CostMatrixArtifact> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening cost matrix {}", path.display()))?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<CostRow>, _>>()
        .with_context(|| format!("parsing cost matrix {}", path.display()))?;
    let artifact = assemble(rows).map_err(SiteCoverError::from)?;
    Ok(artifact)
}

fn assemble(rows: Vec<CostRow>) -> std::result::Result<CostMatrixArtifact, ImportError> {
    // a complete matrix has at most rows.len() demand units and candidates
    if let Some(row) = rows.iter().find(|r| r.i >= rows.len() || r.j >= rows.len()) {
        return Err(ImportError::IncompleteMatrix(format!(
            "pair ({}, {}) is out of range for {} rows",
            row.i,
            row.j,
            rows.len()
        )));
    }
    let n_demand = rows.iter().map(|r| r.i + 1).max().unwrap_or(0);
    let n_candidates = rows.iter().map(|r| r.j + 1).max().unwrap_or(0);
    let expected = n_demand.checked_mul(n_candidates).ok_or_else(|| {
        ImportError::IncompleteMatrix(format!(
            "{n_demand} demand units × {n_candidates} candidates overflows"
        ))
    })?;
    if rows.len() != expected {
        return Err(ImportError::IncompleteMatrix(format!(
            "{} rows for {n_demand} demand units × {n_candidates} candidates (expected {expected})",
            rows.len()
        )));
    }

    let mut data = vec![f64::NAN; expected];
    let mut seen = vec![false; expected];
    let mut demand_ids: Vec<Option<String>> = vec![None; n_demand];
    for row in rows {
        let k = row.i * n_candidates + row.j;
        if seen[k] {
            return Err(ImportError::IncompleteMatrix(format!(
                "pair ({}, {}) appears more than once",
                row.i, row.j
            )));
        }
        seen[k] = true;
        data[k] = row.cost_m;
        match &demand_ids[row.i] {
            Some(id) if *id != row.demand_id => {
                return Err(ImportError::IncompleteMatrix(format!(
                    "demand row {} has ids '{}' and '{}'",
                    row.i, id, row.demand_id
                )))
            }
            Some(_) => {}
            None => demand_ids[row.i] = Some(row.demand_id),
        }
    }

    let matrix = CostMatrix::from_dense(n_demand, n_candidates, data)
        .map_err(|e| ImportError::IncompleteMatrix(e.to_string()))?;
    Ok(CostMatrixArtifact {
        matrix,
        demand_ids: demand_ids.into_iter().flatten().collect(),
    })
}
