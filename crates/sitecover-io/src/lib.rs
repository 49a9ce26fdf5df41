//! # sitecover-io: Point Layers and Pipeline Artifacts
//!
//! Reads the demand, candidate and existing-supply layers and writes every
//! artifact the pipeline produces.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sitecover_io::importers::{load_candidates, load_demand, LayerOptions};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let options = LayerOptions::default();
//!     let demand = load_demand(Path::new("demand_points.geojson"), &options)?;
//!     let candidates = load_candidates(Path::new("candidates.csv"), &options.crs_only())?;
//!     println!("{} demand units, {} candidates", demand.len(), candidates.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Layer | CSV columns | GeoJSON |
//! |-------|-------------|---------|
//! | Demand | `id,x,y[,weight]` | Point features, id from `LSOA21CD` (or `id`), weight from `population` |
//! | Candidates | `x,y[,label]` | Point features, indexed by position |
//! | Supply | `x,y` | Point features |
//!
//! CSV layers default to EPSG:27700. GeoJSON layers take their CRS from the
//! legacy `crs` member.
//!
//! ## Artifacts ([`artifacts`])
//!
//! - cost matrix (long-form CSV, read back with a completeness check)
//! - solution (`chosen_candidate_id` CSV) and JSON solve report
//! - metrics (one-row CSV)
//! - new sites (GeoJSON with `site_id`)

pub mod artifacts;
pub mod error;
pub mod importers;

pub use artifacts::{
    new_sites_geojson, read_cost_matrix, read_metrics, read_solution, write_cost_matrix,
    write_json, write_metrics, write_new_sites, write_solution, CostMatrixArtifact,
    SolutionReport,
};
pub use error::ImportError;
pub use importers::{load_candidates, load_demand, load_supply, Format, LayerOptions};
