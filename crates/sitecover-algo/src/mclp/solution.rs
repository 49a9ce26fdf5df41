//! MCLP solution data structures

use serde::Serialize;
use sitecover_core::CandidateId;
use std::fmt;
use std::time::Duration;

/// Termination status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Selection proven optimal
    Optimal,
    /// Budget exhausted; selection is feasible and `bound` caps the optimum
    FeasibleSuboptimal,
    /// No feasible selection exists
    Infeasible,
}

impl SolveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::FeasibleSuboptimal => "feasible_suboptimal",
            SolveStatus::Infeasible => "infeasible",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selected sites and the coverage they achieve.
#[derive(Debug, Clone, Serialize)]
pub struct MclpSolution {
    /// Exactly P candidate ids, ascending
    pub selected: Vec<CandidateId>,
    /// Objective value: weight of newly covered demand units
    pub objective: f64,
    /// Number of demand units counted in the objective
    pub covered_units: usize,
    /// Weight fixed covered by existing supply (0 unless pre-covered policy)
    pub baseline_weight: f64,
    /// Units fixed covered by existing supply
    pub baseline_units: usize,
    /// Upper bound on the optimum, when known
    pub bound: Option<f64>,
    /// Search nodes visited (0 for backends that do not report it)
    pub nodes_explored: u64,
    #[serde(serialize_with = "serialize_secs")]
    pub solve_time: Duration,
    /// Backend identifier
    pub backend: String,
    pub message: String,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl MclpSolution {
    /// Selected ids as plain indices
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().map(|id| id.value()).collect()
    }

    /// Relative gap between bound and objective
    pub fn gap(&self) -> Option<f64> {
        self.bound.map(|bound| {
            if bound <= 0.0 {
                0.0
            } else {
                ((bound - self.objective) / bound).max(0.0)
            }
        })
    }

    /// Objective plus baseline weight
    pub fn total_covered_weight(&self) -> f64 {
        self.objective + self.baseline_weight
    }

    /// Format a human-readable summary
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("MCLP Solution Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Backend: {}\n", self.backend));
        s.push_str(&format!("Sites Selected: {}\n", self.selected.len()));
        s.push_str(&format!(
            "Objective: {:.2} ({} units)\n",
            self.objective, self.covered_units
        ));
        if self.baseline_units > 0 {
            s.push_str(&format!(
                "Baseline: {:.2} ({} units already covered)\n",
                self.baseline_weight, self.baseline_units
            ));
        }
        if let Some(bound) = self.bound {
            s.push_str(&format!("Bound: {:.2}\n", bound));
        }
        if let Some(gap) = self.gap() {
            s.push_str(&format!("Gap: {:.4}%\n", gap * 100.0));
        }
        s.push_str(&format!("Nodes: {}\n", self.nodes_explored));
        s.push_str(&format!("Solve Time: {:.2?}\n", self.solve_time));
        if !self.message.is_empty() {
            s.push_str(&format!("Message: {}\n", self.message));
        }
        if !self.selected.is_empty() {
            let ids: Vec<String> = self.selected.iter().map(|id| id.to_string()).collect();
            s.push_str(&format!("\nSelected: {}\n", ids.join(", ")));
        }
        s
    }
}

/// Result of a solve.
#[derive(Debug, Clone)]
pub enum MclpOutcome {
    Optimal(MclpSolution),
    FeasibleSuboptimal(MclpSolution),
    Infeasible {
        reason: String,
        partial: Option<MclpSolution>,
    },
}

impl MclpOutcome {
    pub fn status(&self) -> SolveStatus {
        match self {
            MclpOutcome::Optimal(_) => SolveStatus::Optimal,
            MclpOutcome::FeasibleSuboptimal(_) => SolveStatus::FeasibleSuboptimal,
            MclpOutcome::Infeasible { .. } => SolveStatus::Infeasible,
        }
    }

    /// Feasible selection, if one exists
    pub fn solution(&self) -> Option<&MclpSolution> {
        match self {
            MclpOutcome::Optimal(s) | MclpOutcome::FeasibleSuboptimal(s) => Some(s),
            MclpOutcome::Infeasible { .. } => None,
        }
    }

    pub fn into_solution(self) -> Option<MclpSolution> {
        match self {
            MclpOutcome::Optimal(s) | MclpOutcome::FeasibleSuboptimal(s) => Some(s),
            MclpOutcome::Infeasible { .. } => None,
        }
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, MclpOutcome::Optimal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution(objective: f64, bound: Option<f64>) -> MclpSolution {
        MclpSolution {
            selected: vec![CandidateId::new(0), CandidateId::new(2)],
            objective,
            covered_units: 3,
            baseline_weight: 0.0,
            baseline_units: 0,
            bound,
            nodes_explored: 7,
            solve_time: Duration::from_millis(3),
            backend: "branch-and-bound".to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_gap() {
        assert_eq!(solution(3.0, None).gap(), None);
        assert_eq!(solution(3.0, Some(3.0)).gap(), Some(0.0));
        let gap = solution(3.0, Some(4.0)).gap().unwrap();
        assert!((gap - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = MclpOutcome::FeasibleSuboptimal(solution(2.0, Some(3.0)));
        assert_eq!(outcome.status(), SolveStatus::FeasibleSuboptimal);
        assert!(!outcome.is_optimal());
        assert_eq!(outcome.solution().unwrap().selected_indices(), vec![0, 2]);

        let infeasible = MclpOutcome::Infeasible {
            reason: "budget".into(),
            partial: None,
        };
        assert!(infeasible.solution().is_none());
        assert_eq!(infeasible.status().to_string(), "infeasible");
    }

    #[test]
    fn test_summary_lists_selection() {
        let summary = solution(3.0, Some(3.0)).summary();
        assert!(summary.contains("Sites Selected: 2"));
        assert!(summary.contains("Selected: 0, 2"));
    }
}
