//! `sitecover solve`

use anyhow::{bail, Context, Result};
use sitecover_algo::{
    build_coverage, pre_covered_mask, solve_with_retry, MclpOutcome, MclpProblem,
    MclpSolverConfig,
};
use sitecover_cli::{LayerArgs, SolverArgs};
use sitecover_core::{BaselinePolicy, DemandSet, SiteCoverError};
use sitecover_io::{
    load_demand, load_supply, read_cost_matrix, write_json, write_solution, SolutionReport,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::commands::util::{check_status, configure_threads, layer_options, resolve_config};

pub struct SolveArgs<'a> {
    pub cost_matrix: &'a Path,
    pub demand: Option<&'a PathBuf>,
    pub supply: Option<&'a PathBuf>,
    pub out: &'a Path,
    pub report: Option<&'a PathBuf>,
    pub config: Option<&'a PathBuf>,
    pub solver: &'a SolverArgs,
    pub layers: &'a LayerArgs,
}

pub fn handle(args: SolveArgs<'_>) -> Result<()> {
    configure_threads(&args.solver.threads);
    let config = resolve_config(args.config.map(PathBuf::as_path), args.solver)?;
    let artifact = read_cost_matrix(args.cost_matrix)?;
    let matrix = artifact.matrix;
    config.validate_for(matrix.n_candidates())?;

    let options = layer_options(args.layers)?;
    let demand = match args.demand {
        Some(path) => {
            let demand = load_demand(path, &options)?;
            ensure_rows_match(&demand, &artifact.demand_ids)
                .with_context(|| format!("matching {} to the cost matrix", path.display()))?;
            Some(demand)
        }
        None => None,
    };

    let threshold = config.threshold();
    let mut coverage = build_coverage(&matrix, threshold).map_err(SiteCoverError::from)?;
    if config.baseline == BaselinePolicy::PreCovered {
        let (Some(demand), Some(supply_path)) = (demand.as_ref(), args.supply) else {
            bail!(SiteCoverError::Config(
                "--baseline pre-covered needs both --demand and --supply".into()
            ));
        };
        let supply = load_supply(supply_path, &options.crs_only())?;
        demand.crs.ensure_same(&supply.crs, "demand", "supply")?;
        let mask = pre_covered_mask(&demand.points(), &supply.locations(), threshold);
        coverage = coverage.with_pre_covered(mask).map_err(SiteCoverError::from)?;
    } else if args.supply.is_some() {
        debug!("supply layer ignored under the ignore baseline policy");
    }

    let mut problem = MclpProblem::new(coverage, config.facility_budget);
    if let Some(demand) = &demand {
        problem = problem
            .with_weights(demand.weights())
            .map_err(SiteCoverError::from)?;
    }

    let solver_config = MclpSolverConfig::from_plan(&config);
    info!(
        backend = %config.backend,
        budget = config.facility_budget,
        threshold_m = config.threshold_m,
        "solving maximal covering problem"
    );
    let outcome = solve_with_retry(&problem, &solver_config, config.retry_time_limit())
        .map_err(SiteCoverError::from)?;

    if let Some(path) = args.report {
        let report =
            SolutionReport::from_outcome(&outcome, config.threshold_m, config.facility_budget);
        write_json(path, &report)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }

    let message = match &outcome {
        MclpOutcome::Optimal(solution) | MclpOutcome::FeasibleSuboptimal(solution) => {
            write_solution(args.out, &solution.selected)
                .with_context(|| format!("writing solution to {}", args.out.display()))?;
            println!("{}", solution.summary());
            if !outcome.is_optimal() {
                warn!(gap = ?solution.gap(), "solution not proven optimal");
            }
            solution.message.clone()
        }
        MclpOutcome::Infeasible { reason, .. } => {
            warn!(%reason, "no feasible selection");
            reason.clone()
        }
    };
    check_status(outcome.status(), args.solver.require_optimal, &message)
}

/// The demand layer must list the cost-matrix rows in the same order.
fn ensure_rows_match(demand: &DemandSet, ids: &[String]) -> Result<(), SiteCoverError> {
    if demand.len() != ids.len() {
        return Err(SiteCoverError::Validation(format!(
            "demand layer has {} units but the cost matrix has {} rows",
            demand.len(),
            ids.len()
        )));
    }
    for (i, (unit, id)) in demand.units.iter().zip(ids).enumerate() {
        if unit.id.as_str() != id {
            return Err(SiteCoverError::Validation(format!(
                "row {i}: demand id '{}' does not match cost matrix id '{id}'",
                unit.id.as_str()
            )));
        }
    }
    Ok(())
}
