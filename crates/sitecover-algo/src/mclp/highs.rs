//! HiGHS MIP backend
//!
//! Builds the covering integer program as a row problem. Uncoverable units
//! are fixed at zero and pre-covered units are left out.

use super::{MclpBackend, MclpError, MclpOutcome, MclpProblem, MclpSolution, MclpSolverConfig};
use highs::{Col, HighsModelStatus, RowProblem, Sense};
use sitecover_core::CandidateId;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct HighsBackend;

impl MclpBackend for HighsBackend {
    fn id(&self) -> &str {
        "highs"
    }

    fn solve(
        &self,
        problem: &MclpProblem,
        config: &MclpSolverConfig,
    ) -> Result<MclpOutcome, MclpError> {
        let start = Instant::now();
        let coverage = problem.coverage();
        let p = problem.facility_budget() as f64;

        let mut pb = RowProblem::new();

        // x[j] = 1 if candidate j is selected
        let x_cols: Vec<Col> = (0..problem.n_candidates())
            .map(|_| pb.add_integer_column(0.0, 0.0..=1.0))
            .collect();

        // y[i] = 1 if unit i is counted as covered
        for i in 0..problem.n_demand() {
            if coverage.is_pre_covered(i) {
                continue;
            }
            if !coverage.is_coverable(i) {
                pb.add_integer_column(0.0, 0.0..=0.0);
                continue;
            }
            let y = pb.add_integer_column(problem.weights()[i], 0.0..=1.0);
            // y[i] - Σ_{j ∈ cover(i)} x[j] <= 0
            let mut terms: Vec<(Col, f64)> = vec![(y, 1.0)];
            terms.extend(coverage.cover(i).iter().map(|&j| (x_cols[j], -1.0)));
            pb.add_row(..=0.0, terms);
        }

        // Σ x[j] = P
        let terms: Vec<(Col, f64)> = x_cols.iter().map(|&c| (c, 1.0)).collect();
        pb.add_row(p..=p, terms);

        let mut model = pb.optimise(Sense::Maximise);
        model.set_option("output_flag", config.verbose);
        if let Some(limit) = config.time_limit {
            model.set_option("time_limit", limit.as_secs_f64());
        }
        if let Some(nodes) = config.node_limit {
            model.set_option("mip_max_nodes", nodes.min(i32::MAX as u64) as i32);
        }

        let solved = model.solve();
        let status = solved.status();
        debug!(?status, "HiGHS finished");

        // x columns were added first, so column j is candidate j
        let n_candidates = x_cols.len();
        let selected_from = |values: &[f64]| -> Vec<usize> {
            (0..n_candidates)
                .filter(|&j| values.get(j).is_some_and(|v| *v > 0.5))
                .collect()
        };

        match status {
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => {
                let sol = solved.get_solution();
                let selected = selected_from(sol.columns());
                let (objective, _) = problem.objective_of(&selected);
                Ok(MclpOutcome::Optimal(solution(
                    self.id(),
                    selected,
                    Some(objective),
                    start,
                    "optimal",
                )))
            }
            HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit => {
                let sol = solved.get_solution();
                let mut selected = selected_from(sol.columns());
                if selected.len() != problem.facility_budget() {
                    warn!("HiGHS stopped without an integer incumbent; using greedy selection");
                    selected = problem.greedy_selection();
                }
                Ok(MclpOutcome::FeasibleSuboptimal(solution(
                    self.id(),
                    selected,
                    Some(problem.standalone_bound()),
                    start,
                    &format!("{:?}", status),
                )))
            }
            HighsModelStatus::Infeasible => Ok(MclpOutcome::Infeasible {
                reason: "HiGHS reported the model infeasible".to_string(),
                partial: None,
            }),
            other => Err(MclpError::Backend {
                backend: self.id().to_string(),
                message: format!("unexpected model status {:?}", other),
            }),
        }
    }
}

fn solution(
    backend: &str,
    selected: Vec<usize>,
    bound: Option<f64>,
    start: Instant,
    message: &str,
) -> MclpSolution {
    MclpSolution {
        selected: selected.into_iter().map(CandidateId::new).collect(),
        objective: 0.0,
        covered_units: 0,
        baseline_weight: 0.0,
        baseline_units: 0,
        bound,
        nodes_explored: 0,
        solve_time: start.elapsed(),
        backend: backend.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::build_coverage;
    use crate::distance::CostMatrix;
    use crate::mclp::solve_mclp;
    use sitecover_core::{BackendKind, Meters};

    fn config() -> MclpSolverConfig {
        MclpSolverConfig {
            backend: BackendKind::Highs,
            use_lp_bound: false,
            ..MclpSolverConfig::default()
        }
    }

    #[test]
    fn test_highs_escapes_greedy_trap() {
        // A reaches {0,1,2,3}; B reaches {0,1,4}; C reaches {2,3,5}
        let data = vec![
            1.0, 1.0, 9.0, //
            1.0, 1.0, 9.0, //
            1.0, 9.0, 1.0, //
            1.0, 9.0, 1.0, //
            9.0, 1.0, 9.0, //
            9.0, 9.0, 1.0,
        ];
        let matrix = CostMatrix::from_dense(6, 3, data).unwrap();
        let problem = MclpProblem::new(build_coverage(&matrix, Meters(2.0)).unwrap(), 2);
        let outcome = solve_mclp(&problem, &config()).unwrap();
        assert!(outcome.is_optimal());
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.backend, "highs");
        assert_eq!(solution.objective, 6.0);
        assert_eq!(solution.selected_indices(), vec![1, 2]);
    }

    #[test]
    fn test_highs_skips_uncoverable_and_pre_covered() {
        // unit 0 pre-covered, unit 2 out of reach of both candidates
        let matrix = CostMatrix::from_dense(3, 2, vec![1.0, 9.0, 9.0, 1.0, 9.0, 9.0]).unwrap();
        let coverage = build_coverage(&matrix, Meters(2.0))
            .unwrap()
            .with_pre_covered(vec![true, false, false])
            .unwrap();
        let problem = MclpProblem::new(coverage, 1)
            .with_weights(vec![5.0, 3.0, 7.0])
            .unwrap();
        let outcome = HighsBackend.solve(&problem, &config()).unwrap();
        let solution = outcome.solution().unwrap();
        assert!(outcome.is_optimal());
        assert_eq!(solution.selected_indices(), vec![1]);
    }
}
