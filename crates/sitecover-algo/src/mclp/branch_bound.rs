//! Exact branch and bound for the maximal covering problem
//!
//! Coverage is monotone submodular, so a candidate's marginal gain never grows
//! as sites are added. At each node the bound is the current value plus the
//! `r` largest marginal gains among the undecided candidates, where `r` is the
//! number of sites still to place. A greedy selection seeds the incumbent.
//!
//! Candidates that reach no open demand are dropped, as are all but the
//! lowest-indexed of any group with identical reach. Branching order is by
//! standalone gain, descending.

use super::{MclpBackend, MclpError, MclpOutcome, MclpProblem, MclpSolution, MclpSolverConfig};
use sitecover_core::CandidateId;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, warn};

const EPS: f64 = 1e-9;

/// Read the clock on the first budget check and every this many after
const DEADLINE_STRIDE: u64 = 64;

/// Pure-Rust exact backend (always available)
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundBackend;

impl MclpBackend for BranchAndBoundBackend {
    fn id(&self) -> &str {
        "branch-and-bound"
    }

    fn solve(
        &self,
        problem: &MclpProblem,
        config: &MclpSolverConfig,
    ) -> Result<MclpOutcome, MclpError> {
        let start = Instant::now();
        let weights: Vec<f64> = (0..problem.n_demand())
            .map(|i| problem.open_weight(i))
            .collect();
        let reach = problem.coverage().reach();
        let order = branching_order(&reach, &weights);
        let p = problem.facility_budget();

        debug!(
            useful = order.len(),
            candidates = problem.n_candidates(),
            "branching order built"
        );

        let greedy = problem.greedy_selection();
        let (greedy_value, _) = problem.objective_of(&greedy);
        let mut search = Search::new(&weights, &reach, order, p, config, start);
        search.best = greedy;
        search.best_value = greedy_value;

        let mut root_bound = (search.value + search.top_gains(0, p)).min(problem.max_attainable());
        if config.use_lp_bound {
            root_bound = root_bound.min(lp_bound(problem));
        }

        if greedy_value + EPS >= root_bound {
            return Ok(MclpOutcome::Optimal(search.into_solution(
                self.id(),
                Some(greedy_value),
                "greedy selection meets the root bound",
            )));
        }

        search.explore(0);

        if search.exhausted {
            let bound = search.best_value.max(search.frontier.min(root_bound));
            let message = format!("search budget exhausted after {} nodes", search.nodes);
            warn!(
                nodes = search.nodes,
                incumbent = search.best_value,
                bound,
                "branch and bound stopped early"
            );
            Ok(MclpOutcome::FeasibleSuboptimal(search.into_solution(
                self.id(),
                Some(bound),
                &message,
            )))
        } else {
            let best = search.best_value;
            Ok(MclpOutcome::Optimal(search.into_solution(
                self.id(),
                Some(best),
                "search complete",
            )))
        }
    }
}

#[cfg(feature = "solver-clarabel")]
fn lp_bound(problem: &MclpProblem) -> f64 {
    match super::lp_relaxation_bound(problem) {
        // interior-point tolerance
        Ok(bound) => bound * (1.0 + 1e-6) + 1e-6,
        Err(e) => {
            warn!(error = %e, "LP relaxation failed; using combinatorial bound");
            f64::INFINITY
        }
    }
}

#[cfg(not(feature = "solver-clarabel"))]
fn lp_bound(_problem: &MclpProblem) -> f64 {
    f64::INFINITY
}

fn branching_order(reach: &[Vec<usize>], weights: &[f64]) -> Vec<usize> {
    let mut seen: HashSet<&[usize]> = HashSet::new();
    let mut scored: Vec<(usize, f64)> = reach
        .iter()
        .enumerate()
        .filter_map(|(j, units)| {
            let gain: f64 = units.iter().map(|&i| weights[i]).sum();
            (gain > EPS && seen.insert(units.as_slice())).then_some((j, gain))
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.into_iter().map(|(j, _)| j).collect()
}

struct Search<'a> {
    weights: &'a [f64],
    reach: &'a [Vec<usize>],
    /// Candidate indices in branching order
    order: Vec<usize>,
    p: usize,
    cover_count: Vec<u32>,
    /// Positions into `order`
    chosen: Vec<usize>,
    value: f64,
    best: Vec<usize>,
    best_value: f64,
    nodes: u64,
    node_limit: Option<u64>,
    deadline: Option<Instant>,
    /// Budget checks made so far
    checks: u64,
    past_deadline: bool,
    exhausted: bool,
    /// Largest bound over subtrees left unexplored
    frontier: f64,
    scratch: Vec<f64>,
    start: Instant,
}

impl<'a> Search<'a> {
    fn new(
        weights: &'a [f64],
        reach: &'a [Vec<usize>],
        order: Vec<usize>,
        p: usize,
        config: &MclpSolverConfig,
        start: Instant,
    ) -> Self {
        Self {
            weights,
            reach,
            scratch: Vec::with_capacity(order.len()),
            order,
            p,
            cover_count: vec![0; weights.len()],
            chosen: Vec::with_capacity(p),
            value: 0.0,
            best: Vec::new(),
            best_value: 0.0,
            nodes: 0,
            node_limit: config.node_limit,
            deadline: config.time_limit.map(|limit| start + limit),
            checks: 0,
            past_deadline: false,
            exhausted: false,
            frontier: f64::NEG_INFINITY,
            start,
        }
    }

    fn gain(&self, pos: usize) -> f64 {
        self.reach[self.order[pos]]
            .iter()
            .filter(|&&i| self.cover_count[i] == 0)
            .map(|&i| self.weights[i])
            .sum()
    }

    fn add(&mut self, pos: usize) {
        let reach = self.reach;
        for &i in &reach[self.order[pos]] {
            if self.cover_count[i] == 0 {
                self.value += self.weights[i];
            }
            self.cover_count[i] += 1;
        }
        self.chosen.push(pos);
    }

    fn remove(&mut self, pos: usize) {
        let reach = self.reach;
        for &i in &reach[self.order[pos]] {
            self.cover_count[i] -= 1;
            if self.cover_count[i] == 0 {
                self.value -= self.weights[i];
            }
        }
        self.chosen.pop();
    }

    /// Sum of the `r` largest marginal gains among positions `from..`
    fn top_gains(&mut self, from: usize, r: usize) -> f64 {
        if r == 0 || from >= self.order.len() {
            return 0.0;
        }
        let mut gains = std::mem::take(&mut self.scratch);
        gains.clear();
        gains.extend((from..self.order.len()).map(|pos| self.gain(pos)));
        if gains.len() > r {
            gains.select_nth_unstable_by(r - 1, |a, b| b.total_cmp(a));
            gains.truncate(r);
        }
        let total = gains.iter().sum();
        self.scratch = gains;
        total
    }

    fn chosen_candidates(&self) -> Vec<usize> {
        self.chosen.iter().map(|&pos| self.order[pos]).collect()
    }

    fn budget_exhausted(&mut self) -> bool {
        if self.node_limit.is_some_and(|limit| self.nodes >= limit) {
            return true;
        }
        self.checks += 1;
        if !self.past_deadline && (self.checks - 1) % DEADLINE_STRIDE == 0 {
            self.past_deadline = self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline);
        }
        self.past_deadline
    }

    fn explore(&mut self, pos: usize) {
        self.nodes += 1;
        if self.value > self.best_value + EPS {
            self.best_value = self.value;
            self.best = self.chosen_candidates();
        }

        let remaining = self.p - self.chosen.len();
        if remaining == 0 || pos == self.order.len() {
            return;
        }

        let bound = self.value + self.top_gains(pos, remaining);
        if bound <= self.best_value + EPS {
            return;
        }
        if self.budget_exhausted() {
            self.exhausted = true;
            self.frontier = self.frontier.max(bound);
            return;
        }

        if self.gain(pos) > EPS {
            self.add(pos);
            self.explore(pos + 1);
            self.remove(pos);
            if self.exhausted {
                // exclude branch left unexplored
                let skipped = self.value + self.top_gains(pos + 1, remaining);
                self.frontier = self.frontier.max(skipped);
                return;
            }
        }
        self.explore(pos + 1);
    }

    fn into_solution(self, backend: &str, bound: Option<f64>, message: &str) -> MclpSolution {
        MclpSolution {
            selected: self.best.iter().map(|&j| CandidateId::new(j)).collect(),
            objective: self.best_value,
            covered_units: 0,
            baseline_weight: 0.0,
            baseline_units: 0,
            bound,
            nodes_explored: self.nodes,
            solve_time: self.start.elapsed(),
            backend: backend.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::build_coverage;
    use crate::distance::CostMatrix;
    use sitecover_core::Meters;
    use std::time::Duration;

    /// A reaches {0,1,2,3}; B reaches {0,1,4}; C reaches {2,3,5}.
    /// Greedy takes A first and stalls at 5 for P=2; B+C covers all 6.
    fn greedy_trap(p: usize) -> MclpProblem {
        let covers = [
            [true, true, false],
            [true, true, false],
            [true, false, true],
            [true, false, true],
            [false, true, false],
            [false, false, true],
        ];
        let data = covers
            .iter()
            .flat_map(|row| row.iter().map(|&c| if c { 1.0 } else { 9.0 }))
            .collect();
        let matrix = CostMatrix::from_dense(6, 3, data).unwrap();
        MclpProblem::new(build_coverage(&matrix, Meters(2.0)).unwrap(), p)
    }

    fn config() -> MclpSolverConfig {
        MclpSolverConfig {
            use_lp_bound: false,
            ..MclpSolverConfig::default()
        }
    }

    #[test]
    fn test_escapes_greedy_trap() {
        let outcome = BranchAndBoundBackend
            .solve(&greedy_trap(2), &config())
            .unwrap();
        assert!(outcome.is_optimal());
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.objective, 6.0);
        let mut selected = solution.selected_indices();
        selected.sort();
        assert_eq!(selected, vec![1, 2]);
        assert!(solution.nodes_explored > 0);
    }

    #[test]
    fn test_node_limit_returns_incumbent_and_bound() {
        let limited = MclpSolverConfig {
            node_limit: Some(1),
            ..config()
        };
        let outcome = BranchAndBoundBackend
            .solve(&greedy_trap(2), &limited)
            .unwrap();
        match outcome {
            MclpOutcome::FeasibleSuboptimal(solution) => {
                assert_eq!(solution.objective, 5.0);
                let bound = solution.bound.unwrap();
                assert!(bound >= 6.0);
                assert!(bound <= 7.0 + 1e-9);
            }
            other => panic!("expected suboptimal outcome, got {:?}", other.status()),
        }
    }

    #[test]
    fn test_expired_deadline_stops_at_root() {
        let expired = MclpSolverConfig {
            time_limit: Some(Duration::ZERO),
            ..config()
        };
        let outcome = BranchAndBoundBackend
            .solve(&greedy_trap(2), &expired)
            .unwrap();
        assert!(!outcome.is_optimal());
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.objective, 5.0);
        assert_eq!(solution.nodes_explored, 1);
        assert!(solution.bound.unwrap() >= 6.0);
    }

    #[test]
    fn test_deadline_read_on_first_check_and_every_stride() {
        let weights = [1.0];
        let reach = vec![vec![0]];
        let mut search = Search::new(
            &weights,
            &reach,
            vec![0],
            1,
            &config(),
            Instant::now(),
        );
        search.deadline = Some(Instant::now() + Duration::from_secs(3600));
        assert!(!search.budget_exhausted());

        // expiry between clock reads is noticed on the next stride boundary
        search.deadline = Some(search.start);
        for _ in 1..DEADLINE_STRIDE {
            assert!(!search.budget_exhausted());
        }
        assert!(search.budget_exhausted());
        assert!(search.budget_exhausted());
        assert_eq!(search.checks, DEADLINE_STRIDE + 2);
    }

    #[test]
    fn test_greedy_optimal_for_single_site() {
        let outcome = BranchAndBoundBackend
            .solve(&greedy_trap(1), &config())
            .unwrap();
        let solution = outcome.solution().unwrap();
        assert!(outcome.is_optimal());
        assert_eq!(solution.selected_indices(), vec![0]);
        assert_eq!(solution.objective, 4.0);
    }

    #[test]
    fn test_identical_reach_deduplicated() {
        let reach = vec![vec![0, 1], vec![0, 1], vec![2], vec![]];
        let order = branching_order(&reach, &[1.0, 1.0, 1.0]);
        assert_eq!(order, vec![0, 2]);
    }

    #[test]
    fn test_order_by_gain_then_index() {
        let reach = vec![vec![0], vec![1, 2], vec![3]];
        let order = branching_order(&reach, &[1.0, 1.0, 1.0, 5.0]);
        assert_eq!(order, vec![2, 1, 0]);
    }
}
