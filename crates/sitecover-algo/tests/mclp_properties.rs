//! Properties of the maximal covering solver on small instances.

use sitecover_algo::{
    build_cost_matrix, build_coverage, solve_mclp, CoverageRelation, MclpOutcome, MclpProblem,
    MclpSolverConfig, SolveStatus,
};
use sitecover_core::{CandidateSet, Crs, DemandSet, DemandUnit, Meters, Point};

fn relation(demand: &[(f64, f64)], candidates: &[(f64, f64)], threshold: f64) -> CoverageRelation {
    let crs = Crs::default_planar();
    let demand = DemandSet::new(
        crs.clone(),
        demand
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| DemandUnit::new(format!("D{i}"), Point::new(x, y)))
            .collect(),
    );
    let candidates =
        CandidateSet::from_points(crs, candidates.iter().map(|&(x, y)| Point::new(x, y)));
    let matrix = build_cost_matrix(&demand, &candidates).unwrap();
    build_coverage(&matrix, Meters(threshold)).unwrap()
}

/// Demand (0,0), (10,0), (0,10); candidates (0,1), (10,1); threshold 2.
fn three_unit_scenario() -> CoverageRelation {
    relation(
        &[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)],
        &[(0.0, 1.0), (10.0, 1.0)],
        2.0,
    )
}

fn solve(problem: &MclpProblem) -> MclpOutcome {
    solve_mclp(problem, &MclpSolverConfig::default()).unwrap()
}

fn optimal_objective(coverage: CoverageRelation, p: usize) -> f64 {
    let outcome = solve(&MclpProblem::new(coverage, p));
    assert_eq!(outcome.status(), SolveStatus::Optimal);
    outcome.solution().unwrap().objective
}

/// Deterministic point cloud (LCG) in a 100×100 square.
fn scatter(n: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) % 10_000) as f64 / 100.0
    };
    (0..n).map(|_| (next(), next())).collect()
}

fn subsets(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if n < k {
        return Vec::new();
    }
    let mut out = subsets(n - 1, k);
    for mut s in subsets(n - 1, k - 1) {
        s.push(n - 1);
        out.push(s);
    }
    out
}

#[test]
fn scenario_objectives_by_budget() {
    assert_eq!(optimal_objective(three_unit_scenario(), 0), 0.0);
    assert_eq!(optimal_objective(three_unit_scenario(), 1), 1.0);
    assert_eq!(optimal_objective(three_unit_scenario(), 2), 2.0);
}

#[test]
fn scenario_uncoverable_unit_never_counted() {
    let coverage = three_unit_scenario();
    assert_eq!(coverage.uncoverable(), &[2]);
    for p in 0..=2 {
        let outcome = solve(&MclpProblem::new(three_unit_scenario(), p));
        let solution = outcome.solution().unwrap();
        let covered = coverage.covered_by(&solution.selected_indices());
        assert!(!covered[2], "unit 2 counted as covered with P={p}");
        assert_eq!(solution.selected.len(), p);
    }
}

#[test]
fn budget_above_candidates_is_infeasible() {
    let outcome = solve(&MclpProblem::new(three_unit_scenario(), 3));
    assert_eq!(outcome.status(), SolveStatus::Infeasible);
    assert!(outcome.solution().is_none());
    match outcome {
        MclpOutcome::Infeasible { reason, .. } => assert!(reason.contains("exceeds")),
        _ => unreachable!(),
    }
}

#[test]
fn objective_non_decreasing_in_budget() {
    let demand = scatter(60, 7);
    let candidates = scatter(12, 99);
    let mut last = 0.0;
    for p in 0..=12 {
        let objective = optimal_objective(relation(&demand, &candidates, 18.0), p);
        assert!(objective + 1e-9 >= last, "P={p}: {objective} < {last}");
        last = objective;
    }
}

#[test]
fn enough_sites_cover_every_coverable_unit() {
    let demand = scatter(40, 3);
    let candidates = scatter(10, 11);
    let coverage = relation(&demand, &candidates, 25.0);
    let coverable = coverage.coverable_count() as f64;
    assert_eq!(optimal_objective(coverage, 10), coverable);
}

#[test]
fn matches_exhaustive_search() {
    for seed in 1..6u64 {
        let demand = scatter(30, seed);
        let candidates = scatter(9, seed + 100);
        for p in 1..=4 {
            let coverage = relation(&demand, &candidates, 20.0);
            let problem = MclpProblem::new(coverage, p);
            let best = subsets(9, p)
                .iter()
                .map(|s| problem.objective_of(s).0)
                .fold(0.0, f64::max);
            let outcome = solve(&problem);
            assert!(outcome.is_optimal());
            assert_eq!(outcome.solution().unwrap().objective, best, "seed {seed}, P={p}");
        }
    }
}

#[test]
fn weighted_objective_prefers_heavier_units() {
    // one candidate near each unit; the heavier unit wins with P=1
    let coverage = relation(&[(0.0, 0.0), (50.0, 0.0)], &[(0.0, 1.0), (50.0, 1.0)], 2.0);
    let problem = MclpProblem::new(coverage, 1)
        .with_weights(vec![10.0, 250.0])
        .unwrap();
    let outcome = solve(&problem);
    let solution = outcome.solution().unwrap();
    assert_eq!(solution.selected_indices(), vec![1]);
    assert_eq!(solution.objective, 250.0);
}

#[test]
fn node_budget_yields_suboptimal_with_bound() {
    // A reaches four units, B and C three each; greedy misses B+C
    let demand = [
        (0.0, 0.0),
        (1.0, 0.0),
        (10.0, 0.0),
        (11.0, 0.0),
        (-3.0, 0.0),
        (14.0, 0.0),
    ];
    let candidates = [(5.5, 0.0), (-1.0, 0.0), (12.0, 0.0)];
    let coverage = relation(&demand, &candidates, 5.5);
    assert_eq!(coverage.cover(0), &[0, 1]);
    assert_eq!(coverage.cover(4), &[1]);

    let config = MclpSolverConfig {
        node_limit: Some(1),
        use_lp_bound: false,
        ..MclpSolverConfig::default()
    };
    let problem = MclpProblem::new(coverage, 2);
    let outcome = solve_mclp(&problem, &config).unwrap();
    assert_eq!(outcome.status(), SolveStatus::FeasibleSuboptimal);
    let solution = outcome.solution().unwrap();
    assert_eq!(solution.selected.len(), 2);
    assert!(solution.objective < 6.0);
    assert!(solution.bound.unwrap() >= 6.0);

    let full = solve_mclp(&problem, &MclpSolverConfig::default()).unwrap();
    assert!(full.is_optimal());
    assert_eq!(full.solution().unwrap().objective, 6.0);
}
