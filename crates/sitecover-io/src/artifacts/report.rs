//! JSON solve report.

use super::ensure_parent;
use anyhow::{Context, Result};
use serde::Serialize;
use sitecover_algo::{MclpOutcome, SolveStatus};
use std::path::Path;

/// Flat summary of a solve, written next to the solution CSV.
#[derive(Debug, Clone, Serialize)]
pub struct SolutionReport {
    pub status: SolveStatus,
    pub objective: Option<f64>,
    pub bound: Option<f64>,
    pub gap: Option<f64>,
    pub covered_units: Option<usize>,
    pub baseline_weight: Option<f64>,
    pub selected: Vec<usize>,
    pub solve_time_s: Option<f64>,
    pub nodes_explored: Option<u64>,
    pub backend: Option<String>,
    pub threshold_m: f64,
    pub facility_budget: usize,
    pub message: String,
}

impl SolutionReport {
    pub fn from_outcome(outcome: &MclpOutcome, threshold_m: f64, facility_budget: usize) -> Self {
        let base = Self {
            status: outcome.status(),
            objective: None,
            bound: None,
            gap: None,
            covered_units: None,
            baseline_weight: None,
            selected: Vec::new(),
            solve_time_s: None,
            nodes_explored: None,
            backend: None,
            threshold_m,
            facility_budget,
            message: String::new(),
        };
        match outcome {
            MclpOutcome::Optimal(s) | MclpOutcome::FeasibleSuboptimal(s) => Self {
                objective: Some(s.objective),
                bound: s.bound,
                gap: s.gap(),
                covered_units: Some(s.covered_units),
                baseline_weight: Some(s.baseline_weight),
                selected: s.selected_indices(),
                solve_time_s: Some(s.solve_time.as_secs_f64()),
                nodes_explored: Some(s.nodes_explored),
                backend: Some(s.backend.clone()),
                message: s.message.clone(),
                ..base
            },
            MclpOutcome::Infeasible { reason, .. } => Self {
                message: reason.clone(),
                ..base
            },
        }
    }
}

/// Pretty-printed JSON of any serialisable value.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text + "\n").with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
