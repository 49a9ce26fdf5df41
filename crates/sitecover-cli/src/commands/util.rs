use anyhow::{Context, Result};
use rayon::ThreadPoolBuilder;
use sitecover_algo::SolveStatus;
use sitecover_cli::{LayerArgs, SolverArgs};
use sitecover_core::{Crs, PlanConfig, SiteCoverError};
use sitecover_io::{ImportError, LayerOptions};
use std::fmt;
use std::path::Path;

pub fn configure_threads(spec: &str) {
    let count = if spec.eq_ignore_ascii_case("auto") {
        num_cpus::get()
    } else {
        spec.parse().unwrap_or_else(|_| num_cpus::get())
    };
    let _ = ThreadPoolBuilder::new().num_threads(count).build_global();
}

pub fn layer_options(args: &LayerArgs) -> Result<LayerOptions> {
    Ok(LayerOptions {
        crs: parse_crs(args.crs.as_deref())?,
        id_field: args.id_field.clone(),
        weight_field: args.weight_field.clone(),
    })
}

pub fn parse_crs(spec: Option<&str>) -> Result<Option<Crs>> {
    Ok(spec.map(Crs::parse).transpose()?)
}

/// Start from the TOML file (or defaults) and apply command-line overrides.
pub fn resolve_config(path: Option<&Path>, args: &SolverArgs) -> Result<PlanConfig> {
    let mut config = match path {
        Some(path) => PlanConfig::from_path(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => PlanConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.threshold_m = threshold;
    }
    if let Some(budget) = args.budget {
        config.facility_budget = budget;
    }
    if let Some(limit) = args.time_limit {
        config.time_limit_seconds = Some(limit);
    }
    if let Some(limit) = args.retry_time_limit {
        config.retry_time_limit_seconds = Some(limit);
    }
    if let Some(nodes) = args.node_limit {
        config.node_limit = Some(nodes);
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(policy) = args.baseline {
        config.baseline = policy;
    }
    if args.no_lp_bound {
        config.lp_bound = false;
    }
    config.validate()?;
    Ok(config)
}

/// A solve that finished without a usable or acceptable result.
#[derive(Debug)]
pub struct OutcomeFailure {
    pub status: SolveStatus,
    pub message: String,
}

impl fmt::Display for OutcomeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "solve finished {}: {}", self.status, self.message)
    }
}

impl std::error::Error for OutcomeFailure {}

/// Fail on infeasible outcomes, and on suboptimal ones when optimality is required.
pub fn check_status(status: SolveStatus, require_optimal: bool, message: &str) -> Result<()> {
    let failed = match status {
        SolveStatus::Optimal => false,
        SolveStatus::FeasibleSuboptimal => require_optimal,
        SolveStatus::Infeasible => true,
    };
    if failed {
        return Err(OutcomeFailure {
            status,
            message: message.to_string(),
        }
        .into());
    }
    Ok(())
}

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INPUT: u8 = 2;
pub const EXIT_OUTCOME: u8 = 3;

/// Exit status for an error: 2 for bad inputs or configuration, 3 for an
/// unacceptable solve outcome, 1 otherwise.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if cause.downcast_ref::<OutcomeFailure>().is_some() {
            return EXIT_OUTCOME;
        }
        if let Some(err) = cause.downcast_ref::<SiteCoverError>() {
            return if err.is_user_error() || matches!(err, SiteCoverError::Parse(_)) {
                EXIT_INPUT
            } else {
                EXIT_FAILURE
            };
        }
        if cause.downcast_ref::<ImportError>().is_some() {
            return EXIT_INPUT;
        }
    }
    EXIT_FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_on_defaults() {
        let args = SolverArgs {
            threshold: Some(500.0),
            budget: Some(3),
            no_lp_bound: true,
            ..SolverArgs::default()
        };
        let config = resolve_config(None, &args).unwrap();
        assert_eq!(config.threshold_m, 500.0);
        assert_eq!(config.facility_budget, 3);
        assert!(!config.lp_bound);
        assert_eq!(config.time_limit_seconds, Some(60.0));
    }

    #[test]
    fn test_invalid_override_is_input_error() {
        let args = SolverArgs {
            threshold: Some(-1.0),
            ..SolverArgs::default()
        };
        let err = resolve_config(None, &args).unwrap_err();
        assert_eq!(exit_code(&err), EXIT_INPUT);
    }

    #[test]
    fn test_status_policy() {
        assert!(check_status(SolveStatus::Optimal, true, "").is_ok());
        assert!(check_status(SolveStatus::FeasibleSuboptimal, false, "").is_ok());
        let err = check_status(SolveStatus::FeasibleSuboptimal, true, "node limit").unwrap_err();
        assert_eq!(exit_code(&err), EXIT_OUTCOME);
        let err = check_status(SolveStatus::Infeasible, false, "too few").unwrap_err();
        assert_eq!(exit_code(&err), EXIT_OUTCOME);
    }
}
