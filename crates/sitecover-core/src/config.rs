//! Run configuration.
//!
//! A [`PlanConfig`] carries every parameter the pipeline consumes: coverage
//! threshold, facility budget, solver budgets, backend choice, how existing
//! supply enters the model, and optional input/output locations. It is passed
//! explicitly into each stage and can be loaded from TOML:
//!
//! ```toml
//! threshold_m = 1000.0
//! facility_budget = 10
//! time_limit_seconds = 60.0
//! backend = "branch-and-bound"
//! baseline = "ignore"
//!
//! [paths]
//! demand = "data/processed/demand_points.geojson"
//! candidates = "data/processed/candidates.geojson"
//! supply = "data/processed/supply.geojson"
//! output_dir = "outputs"
//! ```

use crate::error::{SiteCoverError, SiteCoverResult};
use crate::units::Meters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_THRESHOLD_M: f64 = 1000.0;
pub const DEFAULT_FACILITY_BUDGET: usize = 10;
pub const DEFAULT_TIME_LIMIT_SECONDS: f64 = 60.0;

/// Which integer-programming backend solves the covering model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Pure-Rust branch and bound (always available)
    #[default]
    BranchAndBound,
    /// HiGHS MIP solver (requires the `solver-highs` feature)
    Highs,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::BranchAndBound => "branch-and-bound",
            BackendKind::Highs => "highs",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "branch-and-bound" | "bnb" => Ok(BackendKind::BranchAndBound),
            "highs" => Ok(BackendKind::Highs),
            other => Err(format!(
                "unknown backend '{other}' (expected branch-and-bound or highs)"
            )),
        }
    }
}

/// How existing supply participates in the covering model.
///
/// The evaluator always measures against existing ∪ chosen supply; this only
/// changes what the optimiser is rewarded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaselinePolicy {
    /// Coverage is built from candidates only
    #[default]
    Ignore,
    /// Units already within threshold of existing supply are fixed covered
    /// and earn nothing for the optimiser
    PreCovered,
}

impl BaselinePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaselinePolicy::Ignore => "ignore",
            BaselinePolicy::PreCovered => "pre-covered",
        }
    }
}

impl fmt::Display for BaselinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaselinePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(BaselinePolicy::Ignore),
            "pre-covered" | "precovered" => Ok(BaselinePolicy::PreCovered),
            other => Err(format!(
                "unknown baseline policy '{other}' (expected ignore or pre-covered)"
            )),
        }
    }
}

/// Input and output locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub demand: Option<PathBuf>,
    pub candidates: Option<PathBuf>,
    pub supply: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// CRS for CSV layers, which carry no CRS metadata of their own
    pub crs: Option<String>,
    /// GeoJSON property holding the demand identifier
    pub demand_id_field: Option<String>,
    /// GeoJSON/CSV property holding the demand weight
    pub weight_field: Option<String>,
}

/// Parameters for one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Coverage threshold in metres (non-strict: cost <= threshold covers)
    pub threshold_m: f64,
    /// Number of new sites to select (P)
    pub facility_budget: usize,
    /// Wall-clock budget for the solve; `None` means unbounded
    pub time_limit_seconds: Option<f64>,
    /// Branch-and-bound node budget; `None` means unbounded
    pub node_limit: Option<u64>,
    /// Relaxed wall-clock budget for a second attempt after a suboptimal solve
    pub retry_time_limit_seconds: Option<f64>,
    pub backend: BackendKind,
    pub baseline: BaselinePolicy,
    /// Tighten the root bound with the LP relaxation
    pub lp_bound: bool,
    pub paths: PathsConfig,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            threshold_m: DEFAULT_THRESHOLD_M,
            facility_budget: DEFAULT_FACILITY_BUDGET,
            time_limit_seconds: Some(DEFAULT_TIME_LIMIT_SECONDS),
            node_limit: None,
            retry_time_limit_seconds: None,
            backend: BackendKind::default(),
            baseline: BaselinePolicy::default(),
            lp_bound: true,
            paths: PathsConfig::default(),
        }
    }
}

impl PlanConfig {
    pub fn from_toml_str(text: &str) -> SiteCoverResult<Self> {
        let config: PlanConfig = toml::from_str(text)?;
        Ok(config)
    }

    /// Load from a TOML file. Relative paths in `[paths]` resolve against the file's directory.
    pub fn from_path(path: &Path) -> SiteCoverResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.paths.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn threshold(&self) -> Meters {
        Meters(self.threshold_m)
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_seconds.map(Duration::from_secs_f64)
    }

    pub fn retry_time_limit(&self) -> Option<Duration> {
        self.retry_time_limit_seconds.map(Duration::from_secs_f64)
    }

    /// Check parameters that do not depend on the inputs.
    pub fn validate(&self) -> SiteCoverResult<()> {
        if !self.threshold_m.is_finite() || self.threshold_m <= 0.0 {
            return Err(SiteCoverError::Config(format!(
                "threshold must be a positive distance in metres, got {}",
                self.threshold_m
            )));
        }
        if self.facility_budget == 0 {
            return Err(SiteCoverError::Config(
                "facility budget must be at least 1".into(),
            ));
        }
        for limit in [self.time_limit_seconds, self.retry_time_limit_seconds]
            .into_iter()
            .flatten()
        {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(SiteCoverError::Config(format!(
                    "time limit must be positive, got {limit}"
                )));
            }
        }
        if self.node_limit == Some(0) {
            return Err(SiteCoverError::Config("node limit must be at least 1".into()));
        }
        Ok(())
    }

    /// Check parameters against the loaded candidate layer.
    pub fn validate_for(&self, candidate_count: usize) -> SiteCoverResult<()> {
        self.validate()?;
        if self.facility_budget > candidate_count {
            return Err(SiteCoverError::Config(format!(
                "facility budget {} exceeds the {} available candidates",
                self.facility_budget, candidate_count
            )));
        }
        Ok(())
    }
}

impl PathsConfig {
    fn resolve_relative_to(&mut self, base: &Path) {
        for slot in [
            &mut self.demand,
            &mut self.candidates,
            &mut self.supply,
            &mut self.output_dir,
        ] {
            if let Some(path) = slot.as_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }
}
