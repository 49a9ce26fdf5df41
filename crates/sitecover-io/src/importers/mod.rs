//! Point-layer importers.
//!
//! Demand, candidate and supply layers load from CSV or GeoJSON, chosen by
//! file extension. Every loader validates the layer before returning it, so
//! bad coordinates or duplicate identifiers fail before any distance is
//! computed.

pub mod csv_layer;
pub mod format;
pub mod geojson;

pub use format::Format;

use crate::error::ImportError;
use anyhow::{Context, Result};
use sitecover_core::{
    CandidateSet, Crs, DemandSet, PathsConfig, SiteCoverError, SiteCoverResult, SupplySet,
};
use std::path::Path;

/// Default demand identifier property (2021 LSOA code)
pub const DEFAULT_DEMAND_ID_FIELD: &str = "LSOA21CD";
/// Default demand weight property
pub const DEFAULT_WEIGHT_FIELD: &str = "population";

/// Per-layer reading options.
#[derive(Debug, Clone, Default)]
pub struct LayerOptions {
    /// CRS for layers that do not record one; must agree with a recorded CRS
    pub crs: Option<Crs>,
    /// Identifier column/property (demand id, candidate label)
    pub id_field: Option<String>,
    /// Weight column/property for demand
    pub weight_field: Option<String>,
}

impl LayerOptions {
    pub fn from_paths(paths: &PathsConfig) -> SiteCoverResult<Self> {
        Ok(Self {
            crs: paths.crs.as_deref().map(Crs::parse).transpose()?,
            id_field: paths.demand_id_field.clone(),
            weight_field: paths.weight_field.clone(),
        })
    }

    /// Same CRS override, no field overrides (candidate and supply layers).
    pub fn crs_only(&self) -> Self {
        Self {
            crs: self.crs.clone(),
            ..Self::default()
        }
    }

    /// Resolve the layer CRS from the recorded value and the override.
    pub(crate) fn resolve_crs(&self, recorded: Option<Crs>, fallback: Crs) -> SiteCoverResult<Crs> {
        match (recorded, &self.crs) {
            (Some(recorded), Some(requested)) => {
                recorded.ensure_same(requested, "file", "requested")?;
                Ok(recorded)
            }
            (Some(recorded), None) => Ok(recorded),
            (None, Some(requested)) => Ok(requested.clone()),
            (None, None) => Ok(fallback),
        }
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::detect(path).ok_or_else(|| {
        SiteCoverError::from(ImportError::UnsupportedFormat(path.to_path_buf())).into()
    })
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Load and validate the demand layer.
pub fn load_demand(path: &Path, options: &LayerOptions) -> Result<DemandSet> {
    let text = read_text(path)?;
    let demand = match detect(path)? {
        Format::Csv => csv_layer::read_demand(text.as_bytes(), options),
        Format::GeoJson => geojson::read_demand(&text, options),
    }
    .and_then(|d| d.validate().map(|_| d))
    .with_context(|| format!("loading demand layer {}", path.display()))?;
    Ok(demand)
}

/// Load and validate the candidate layer.
pub fn load_candidates(path: &Path, options: &LayerOptions) -> Result<CandidateSet> {
    let text = read_text(path)?;
    let candidates = match detect(path)? {
        Format::Csv => csv_layer::read_candidates(text.as_bytes(), options),
        Format::GeoJson => geojson::read_candidates(&text, options),
    }
    .and_then(|c| c.validate().map(|_| c))
    .with_context(|| format!("loading candidate layer {}", path.display()))?;
    Ok(candidates)
}

/// Load and validate the existing-supply layer (may be empty).
pub fn load_supply(path: &Path, options: &LayerOptions) -> Result<SupplySet> {
    let text = read_text(path)?;
    let supply = match detect(path)? {
        Format::Csv => csv_layer::read_supply(text.as_bytes(), options),
        Format::GeoJson => geojson::read_supply(&text, options),
    }
    .and_then(|s| s.validate().map(|_| s))
    .with_context(|| format!("loading supply layer {}", path.display()))?;
    Ok(supply)
}
