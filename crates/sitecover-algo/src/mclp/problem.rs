//! MCLP problem data
//!
//! Couples a coverage relation with per-unit weights and the facility budget.

use super::MclpError;
use crate::coverage::CoverageRelation;

/// Maximal covering problem over a fixed coverage relation.
#[derive(Debug, Clone)]
pub struct MclpProblem {
    coverage: CoverageRelation,
    weights: Vec<f64>,
    facility_budget: usize,
}

impl MclpProblem {
    /// Unweighted problem: every demand unit counts 1.
    pub fn new(coverage: CoverageRelation, facility_budget: usize) -> Self {
        let weights = vec![1.0; coverage.n_demand()];
        Self {
            coverage,
            weights,
            facility_budget,
        }
    }

    /// Replace the unit weights; one non-negative finite weight per demand unit.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self, MclpError> {
        if weights.len() != self.coverage.n_demand() {
            return Err(MclpError::InvalidWeights(format!(
                "{} weights for {} demand units",
                weights.len(),
                self.coverage.n_demand()
            )));
        }
        if let Some((i, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(MclpError::InvalidWeights(format!(
                "demand unit {i} has weight {w}"
            )));
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn coverage(&self) -> &CoverageRelation {
        &self.coverage
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn facility_budget(&self) -> usize {
        self.facility_budget
    }

    pub fn n_candidates(&self) -> usize {
        self.coverage.n_candidates()
    }

    pub fn n_demand(&self) -> usize {
        self.coverage.n_demand()
    }

    /// Weight the optimiser can earn for unit `i` (zero when uncoverable or pre-covered).
    pub fn open_weight(&self, i: usize) -> f64 {
        if self.coverage.is_open(i) {
            self.weights[i]
        } else {
            0.0
        }
    }

    /// Weight of units fixed covered by existing supply.
    pub fn baseline_weight(&self) -> f64 {
        (0..self.n_demand())
            .filter(|&i| self.coverage.is_pre_covered(i))
            .map(|i| self.weights[i])
            .sum()
    }

    pub fn baseline_units(&self) -> usize {
        self.coverage.pre_covered_count()
    }

    /// Objective value if every coverable open unit were covered.
    pub fn max_attainable(&self) -> f64 {
        (0..self.n_demand()).map(|i| self.open_weight(i)).sum()
    }

    /// Objective weight and count of open units covered by `selected`.
    pub fn objective_of(&self, selected: &[usize]) -> (f64, usize) {
        self.coverage
            .covered_by(selected)
            .iter()
            .enumerate()
            .filter(|(i, &covered)| covered && self.coverage.is_open(*i))
            .fold((0.0, 0), |(weight, count), (i, _)| {
                (weight + self.weights[i], count + 1)
            })
    }

    /// Weight each candidate reaches on its own, over open units.
    pub fn standalone_gains(&self) -> Vec<f64> {
        self.coverage
            .reach()
            .iter()
            .map(|units| units.iter().map(|&i| self.weights[i]).sum())
            .collect()
    }

    /// Sum of the P largest standalone gains, capped at [`Self::max_attainable`].
    pub fn standalone_bound(&self) -> f64 {
        let mut gains = self.standalone_gains();
        gains.sort_by(|a, b| b.total_cmp(a));
        let top: f64 = gains.iter().take(self.facility_budget).sum();
        top.min(self.max_attainable())
    }

    /// Greedy selection: repeatedly take the largest marginal gain, lowest
    /// index on ties. Stops early once no candidate adds weight.
    pub fn greedy_selection(&self) -> Vec<usize> {
        let reach = self.coverage.reach();
        let mut covered = vec![false; self.n_demand()];
        let mut selected = Vec::with_capacity(self.facility_budget);
        for _ in 0..self.facility_budget {
            let mut best: Option<(usize, f64)> = None;
            for (j, units) in reach.iter().enumerate() {
                let gain: f64 = units
                    .iter()
                    .filter(|&&i| !covered[i])
                    .map(|&i| self.weights[i])
                    .sum();
                if best.map_or(true, |(_, g)| gain > g) {
                    best = Some((j, gain));
                }
            }
            match best {
                Some((j, gain)) if gain > 0.0 => {
                    for &i in &reach[j] {
                        covered[i] = true;
                    }
                    selected.push(j);
                }
                _ => break,
            }
        }
        selected
    }
}

/// Builder for [`MclpProblem`].
pub struct MclpProblemBuilder {
    coverage: CoverageRelation,
    facility_budget: usize,
    weights: Option<Vec<f64>>,
}

impl MclpProblemBuilder {
    pub fn new(coverage: CoverageRelation) -> Self {
        Self {
            coverage,
            facility_budget: 1,
            weights: None,
        }
    }

    /// Number of sites to select (P)
    pub fn facility_budget(mut self, p: usize) -> Self {
        self.facility_budget = p;
        self
    }

    /// Per-unit weights (e.g. population)
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn build(self) -> Result<MclpProblem, MclpError> {
        let problem = MclpProblem::new(self.coverage, self.facility_budget);
        match self.weights {
            Some(weights) => problem.with_weights(weights),
            None => Ok(problem),
        }
    }
}
