//! `sitecover plan`: the whole pipeline from one configuration file.
//!
//! Artifacts written to the output directory:
//!
//! | File | Contents |
//! |------|----------|
//! | `cost_matrix.csv` | long-form distances |
//! | `solution.csv` | chosen candidate indices |
//! | `metrics_before.csv` / `metrics_after.csv` | coverage metrics |
//! | `new_sites.geojson` | chosen sites |
//! | `plan_report.json` | solve status, solution and comparison |

use anyhow::{Context, Result};
use sitecover_algo::{run_plan, PlanInputs};
use sitecover_cli::SolverArgs;
use sitecover_core::{PlanConfig, SiteCoverError, SupplySet};
use sitecover_io::{
    load_candidates, load_demand, load_supply, write_cost_matrix, write_json, write_metrics,
    write_new_sites, write_solution, LayerOptions,
};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::commands::util::{check_status, configure_threads, resolve_config};

const DEFAULT_OUTPUT_DIR: &str = "outputs";

pub fn handle(
    config_path: &Path,
    output_dir: Option<&PathBuf>,
    dump_config: bool,
    solver: &SolverArgs,
) -> Result<()> {
    let mut config = resolve_config(Some(config_path), solver)?;
    if let Some(dir) = output_dir {
        config.paths.output_dir = Some(dir.clone());
    }
    if dump_config {
        let text = toml::to_string_pretty(&config).context("serializing configuration")?;
        print!("{text}");
        return Ok(());
    }
    configure_threads(&solver.threads);

    let inputs = load_inputs(&config)?;
    let report = run_plan(&inputs, &config)?;

    let out_dir = config
        .paths
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    write_cost_matrix(&out_dir.join("cost_matrix.csv"), &report.cost_matrix, &inputs.demand)?;
    write_metrics(&out_dir.join("metrics_before.csv"), &report.before)?;
    if let Some(solution) = &report.solution {
        write_solution(&out_dir.join("solution.csv"), &solution.selected)?;
        write_new_sites(
            &out_dir.join("new_sites.geojson"),
            &inputs.candidates,
            &solution.selected,
        )?;
        println!("{}", solution.summary());
    }
    if let Some(after) = &report.after {
        write_metrics(&out_dir.join("metrics_after.csv"), after)?;
    }
    if let Some(comparison) = &report.comparison {
        println!("{}", comparison.summary());
    }
    write_json(&out_dir.join("plan_report.json"), &report)?;
    info!(output_dir = %out_dir.display(), status = %report.status, "plan artifacts written");

    let message = match (&report.solution, &report.infeasible_reason) {
        (Some(solution), _) => solution.message.clone(),
        (None, Some(reason)) => reason.clone(),
        (None, None) => String::new(),
    };
    check_status(report.status, solver.require_optimal, &message)
}

fn load_inputs(config: &PlanConfig) -> Result<PlanInputs> {
    let paths = &config.paths;
    let options = LayerOptions::from_paths(paths)?;
    let demand_path = paths
        .demand
        .as_ref()
        .ok_or_else(|| SiteCoverError::Config("paths.demand is not set".into()))?;
    let candidates_path = paths
        .candidates
        .as_ref()
        .ok_or_else(|| SiteCoverError::Config("paths.candidates is not set".into()))?;

    let demand = load_demand(demand_path, &options)?;
    let candidates = load_candidates(candidates_path, &options.crs_only())?;
    let supply = match &paths.supply {
        Some(path) => load_supply(path, &options.crs_only())?,
        None => SupplySet::empty(demand.crs.clone()),
    };
    Ok(PlanInputs {
        demand,
        candidates,
        supply,
    })
}
