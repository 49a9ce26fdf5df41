//! Pipeline artifacts.
//!
//! | Artifact | Format | Module |
//! |----------|--------|--------|
//! | Cost matrix | long-form CSV `i,j,demand_id,candidate_id,cost_m` | [`cost_matrix`] |
//! | Solution | CSV `chosen_candidate_id` | [`solution`] |
//! | Solve report | JSON | [`report`] |
//! | Metrics | one-row CSV | [`metrics`] |
//! | New sites | GeoJSON with `site_id` | [`sites`] |

pub mod cost_matrix;
pub mod metrics;
pub mod report;
pub mod sites;
pub mod solution;

pub use cost_matrix::{read_cost_matrix, write_cost_matrix, CostMatrixArtifact};
pub use metrics::{read_metrics, write_metrics};
pub use report::{write_json, SolutionReport};
pub use sites::{new_sites_geojson, write_new_sites};
pub use solution::{read_solution, write_solution};

use anyhow::{Context, Result};
use std::path::Path;

/// Create the parent directory of `path` if needed.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    Ok(())
}
