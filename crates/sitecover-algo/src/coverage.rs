//! Coverage relations derived from a cost matrix and a threshold.
//!
//! `cover(i) = { j : cost(i, j) <= threshold }`. The relation is rebuilt from
//! scratch for every threshold and is immutable once built, so a relation can
//! never drift out of sync with the threshold it reports.

use crate::distance::{nearest_distances, CostMatrix};
use sitecover_core::{Meters, Point, SiteCoverError};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("coverage threshold must be positive and finite, got {0}")]
    InvalidThreshold(f64),

    #[error("pre-covered mask has {actual} entries but there are {expected} demand units")]
    MaskLength { expected: usize, actual: usize },
}

impl From<CoverageError> for SiteCoverError {
    fn from(err: CoverageError) -> Self {
        match err {
            CoverageError::InvalidThreshold(_) => SiteCoverError::Config(err.to_string()),
            CoverageError::MaskLength { .. } => SiteCoverError::Validation(err.to_string()),
        }
    }
}

/// Which candidates cover each demand unit at a given threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRelation {
    threshold: Meters,
    n_candidates: usize,
    /// Sorted candidate indices per demand unit
    cover: Vec<Vec<usize>>,
    /// Demand units no candidate reaches
    uncoverable: Vec<usize>,
    /// Demand units already served by existing supply
    pre_covered: Vec<bool>,
}

/// Derive the coverage relation for `threshold` (non-strict comparison).
pub fn build_coverage(
    matrix: &CostMatrix,
    threshold: Meters,
) -> Result<CoverageRelation, CoverageError> {
    let limit = threshold.value();
    if !limit.is_finite() || limit <= 0.0 {
        return Err(CoverageError::InvalidThreshold(limit));
    }

    let cover: Vec<Vec<usize>> = matrix
        .rows()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|(_, &cost)| cost <= limit)
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    let uncoverable: Vec<usize> = cover
        .iter()
        .enumerate()
        .filter(|(_, set)| set.is_empty())
        .map(|(i, _)| i)
        .collect();

    if !uncoverable.is_empty() {
        warn!(
            count = uncoverable.len(),
            threshold_m = limit,
            "demand units cannot be covered by any candidate"
        );
    }
    debug!(
        n_demand = cover.len(),
        pairs = cover.iter().map(Vec::len).sum::<usize>(),
        "coverage relation built"
    );

    let n_demand = cover.len();
    Ok(CoverageRelation {
        threshold,
        n_candidates: matrix.n_candidates(),
        cover,
        uncoverable,
        pre_covered: vec![false; n_demand],
    })
}

/// Mark demand units within `threshold` of any existing supply point.
pub fn pre_covered_mask(demand: &[Point], supply: &[Point], threshold: Meters) -> Vec<bool> {
    match nearest_distances(demand, supply) {
        Some(nearest) => nearest.iter().map(|&d| d <= threshold.value()).collect(),
        None => vec![false; demand.len()],
    }
}

impl CoverageRelation {
    pub fn threshold(&self) -> Meters {
        self.threshold
    }

    pub fn n_demand(&self) -> usize {
        self.cover.len()
    }

    pub fn n_candidates(&self) -> usize {
        self.n_candidates
    }

    /// Candidates covering demand unit `demand`.
    pub fn cover(&self, demand: usize) -> &[usize] {
        &self.cover[demand]
    }

    pub fn is_coverable(&self, demand: usize) -> bool {
        !self.cover[demand].is_empty()
    }

    pub fn uncoverable(&self) -> &[usize] {
        &self.uncoverable
    }

    pub fn coverable_count(&self) -> usize {
        self.cover.len() - self.uncoverable.len()
    }

    /// Fix the given demand units as covered before optimisation.
    pub fn with_pre_covered(mut self, mask: Vec<bool>) -> Result<Self, CoverageError> {
        if mask.len() != self.cover.len() {
            return Err(CoverageError::MaskLength {
                expected: self.cover.len(),
                actual: mask.len(),
            });
        }
        self.pre_covered = mask;
        Ok(self)
    }

    pub fn is_pre_covered(&self, demand: usize) -> bool {
        self.pre_covered[demand]
    }

    pub fn pre_covered_count(&self) -> usize {
        self.pre_covered.iter().filter(|&&p| p).count()
    }

    /// Whether the optimiser can still earn credit for this unit.
    pub fn is_open(&self, demand: usize) -> bool {
        self.is_coverable(demand) && !self.pre_covered[demand]
    }

    /// Inverse relation: open demand units reached by each candidate.
    pub fn reach(&self) -> Vec<Vec<usize>> {
        let mut reach = vec![Vec::new(); self.n_candidates];
        for (i, set) in self.cover.iter().enumerate() {
            if self.pre_covered[i] {
                continue;
            }
            for &j in set {
                reach[j].push(i);
            }
        }
        reach
    }

    /// Per demand unit, whether any of `selected` covers it.
    pub fn covered_by(&self, selected: &[usize]) -> Vec<bool> {
        let mut chosen = vec![false; self.n_candidates];
        for &j in selected {
            if j < self.n_candidates {
                chosen[j] = true;
            }
        }
        self.cover
            .iter()
            .map(|set| set.iter().any(|&j| chosen[j]))
            .collect()
    }
}
