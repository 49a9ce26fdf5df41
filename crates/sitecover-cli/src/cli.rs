use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use sitecover_core::{BackendKind, BaselinePolicy};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Maximal covering site selection", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the demand x candidate distance matrix
    CostMatrix {
        /// Demand layer (CSV or GeoJSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        demand: PathBuf,
        /// Candidate layer (CSV or GeoJSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        candidates: PathBuf,
        /// Output CSV (`i,j,demand_id,candidate_id,cost_m`)
        #[arg(short, long, default_value = "cost_matrix.csv")]
        out: PathBuf,
        #[command(flatten)]
        layers: LayerArgs,
        /// Threads: `auto` or numeric
        #[arg(long, default_value = "auto")]
        threads: String,
    },
    /// Coverage metrics of demand against existing supply only
    Baseline {
        /// Demand layer (CSV or GeoJSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        demand: PathBuf,
        /// Existing supply layer (CSV or GeoJSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        supply: PathBuf,
        /// Coverage threshold in metres
        #[arg(long, default_value_t = 1000.0)]
        threshold: f64,
        /// Output metrics CSV
        #[arg(short, long, default_value = "metrics_before.csv")]
        out: PathBuf,
        #[command(flatten)]
        layers: LayerArgs,
        /// Threads: `auto` or numeric
        #[arg(long, default_value = "auto")]
        threads: String,
    },
    /// Choose exactly P new sites maximising covered demand
    Solve {
        /// Cost matrix CSV written by `cost-matrix`
        #[arg(long, value_hint = ValueHint::FilePath)]
        cost_matrix: PathBuf,
        /// Demand layer supplying weights (and coordinates for `--baseline pre-covered`)
        #[arg(long, value_hint = ValueHint::FilePath)]
        demand: Option<PathBuf>,
        /// Existing supply layer, required by `--baseline pre-covered`
        #[arg(long, value_hint = ValueHint::FilePath)]
        supply: Option<PathBuf>,
        /// Output solution CSV (`chosen_candidate_id`)
        #[arg(short, long, default_value = "solution.csv")]
        out: PathBuf,
        /// Optional JSON solve report
        #[arg(long)]
        report: Option<PathBuf>,
        /// Run configuration (TOML); flags override its values
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        #[command(flatten)]
        solver: SolverArgs,
        #[command(flatten)]
        layers: LayerArgs,
    },
    /// Coverage metrics after adding the chosen sites
    Evaluate {
        /// Demand layer (CSV or GeoJSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        demand: PathBuf,
        /// Candidate layer (CSV or GeoJSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        candidates: PathBuf,
        /// Existing supply layer; omitted means no existing supply
        #[arg(long, value_hint = ValueHint::FilePath)]
        supply: Option<PathBuf>,
        /// Solution CSV written by `solve`
        #[arg(long, value_hint = ValueHint::FilePath)]
        solution: PathBuf,
        /// Coverage threshold in metres
        #[arg(long, default_value_t = 1000.0)]
        threshold: f64,
        /// Output metrics CSV
        #[arg(short, long, default_value = "metrics_after.csv")]
        out: PathBuf,
        /// Optional JSON before/after comparison (requires `--supply` for a meaningful baseline)
        #[arg(long)]
        compare: Option<PathBuf>,
        /// Baseline metrics CSV written by `baseline`; recomputed from `--supply` when omitted
        #[arg(long, value_hint = ValueHint::FilePath)]
        before: Option<PathBuf>,
        #[command(flatten)]
        layers: LayerArgs,
        /// Threads: `auto` or numeric
        #[arg(long, default_value = "auto")]
        threads: String,
    },
    /// Write the chosen sites as a GeoJSON FeatureCollection
    ExportSites {
        /// Candidate layer (CSV or GeoJSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        candidates: PathBuf,
        /// Solution CSV written by `solve`
        #[arg(long, value_hint = ValueHint::FilePath)]
        solution: PathBuf,
        /// Output GeoJSON
        #[arg(short, long, default_value = "new_sites.geojson")]
        out: PathBuf,
        /// CRS for CSV candidate layers (default EPSG:27700)
        #[arg(long)]
        crs: Option<String>,
    },
    /// Run the whole pipeline from a TOML configuration
    Plan {
        /// Run configuration (TOML) with a `[paths]` table
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: PathBuf,
        /// Directory for all artifacts (overrides `paths.output_dir`)
        #[arg(long, value_hint = ValueHint::DirPath)]
        output_dir: Option<PathBuf>,
        /// Print the effective configuration as TOML and exit
        #[arg(long)]
        dump_config: bool,
        #[command(flatten)]
        solver: SolverArgs,
    },
}

/// Field and CRS overrides for the point layers.
#[derive(Args, Debug, Clone, Default)]
pub struct LayerArgs {
    /// CRS for layers that do not record one (default EPSG:27700)
    #[arg(long)]
    pub crs: Option<String>,
    /// Demand identifier column/property (default `id`, then `LSOA21CD`)
    #[arg(long)]
    pub id_field: Option<String>,
    /// Demand weight column/property (default `weight`, then `population`)
    #[arg(long)]
    pub weight_field: Option<String>,
}

/// Solver parameters; each one overrides the configuration file when set.
#[derive(Args, Debug, Clone, Default)]
pub struct SolverArgs {
    /// Coverage threshold in metres [default: 1000]
    #[arg(long)]
    pub threshold: Option<f64>,
    /// Number of new sites to choose (P) [default: 10]
    #[arg(long)]
    pub budget: Option<usize>,
    /// Wall-clock limit in seconds [default: 60]
    #[arg(long)]
    pub time_limit: Option<f64>,
    /// Relaxed limit for one retry after a suboptimal solve
    #[arg(long)]
    pub retry_time_limit: Option<f64>,
    /// Branch-and-bound node limit
    #[arg(long)]
    pub node_limit: Option<u64>,
    /// Solver backend (branch-and-bound, highs)
    #[arg(long)]
    pub backend: Option<BackendKind>,
    /// Existing supply handling (ignore, pre-covered)
    #[arg(long)]
    pub baseline: Option<BaselinePolicy>,
    /// Skip the LP relaxation root bound
    #[arg(long)]
    pub no_lp_bound: bool,
    /// Fail unless the solve is proven optimal
    #[arg(long)]
    pub require_optimal: bool,
    /// Threads: `auto` or numeric
    #[arg(long, default_value = "auto")]
    pub threads: String,
}

/// Build the clap command tree (used by tests).
pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
