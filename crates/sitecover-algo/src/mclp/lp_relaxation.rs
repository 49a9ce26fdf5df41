//! Continuous relaxation of the covering program
//!
//! x_j, y_i ∈ [0,1] with the same budget and linking rows as the integer
//! program. Its optimum is an upper bound on the integer optimum.

use super::{MclpError, MclpProblem};
use good_lp::solvers::clarabel::clarabel;
use good_lp::{constraint, variable, variables, Expression, Solution, SolverModel, Variable};

/// Optimal value of the LP relaxation.
pub fn lp_relaxation_bound(problem: &MclpProblem) -> Result<f64, MclpError> {
    let coverage = problem.coverage();
    let budget = problem.facility_budget() as f64;

    let mut vars = variables!();
    let x: Vec<Variable> = (0..problem.n_candidates())
        .map(|_| vars.add(variable().min(0.0).max(1.0)))
        .collect();

    // only open units enter the program
    let mut y: Vec<(usize, Variable)> = Vec::new();
    let mut objective = Expression::from(0.0);
    for i in 0..problem.n_demand() {
        let w = problem.open_weight(i);
        if !coverage.is_open(i) || w <= 0.0 {
            continue;
        }
        let yi = vars.add(variable().min(0.0).max(1.0));
        objective += w * yi;
        y.push((i, yi));
    }

    if y.is_empty() {
        return Ok(0.0);
    }

    let mut model = vars.maximise(objective).using(clarabel);

    let total: Expression = x.iter().copied().sum();
    model = model.with(constraint!(total == budget));

    for &(i, yi) in &y {
        let reach: Expression = coverage.cover(i).iter().map(|&j| x[j]).sum();
        model = model.with(constraint!(yi <= reach));
    }

    let solution = model.solve().map_err(|e| MclpError::Backend {
        backend: "clarabel".to_string(),
        message: format!("{:?}", e),
    })?;

    Ok(y.iter()
        .map(|&(i, yi)| problem.open_weight(i) * solution.value(yi))
        .sum())
}
