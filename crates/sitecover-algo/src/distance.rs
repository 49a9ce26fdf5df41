//! Dense demand × candidate distance matrices.
//!
//! Distances are Euclidean in the shared planar CRS, stored row-major with one
//! row per demand unit. Rows are independent, so with the `parallel` feature
//! they are filled on the rayon pool.

use sitecover_core::{CandidateSet, DemandSet, Meters, Point, SiteCoverError};
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Errors raised while building or loading a cost matrix.
#[derive(Debug, Error)]
pub enum DistanceError {
    /// Inputs failed validation (non-finite coordinate, empty layer, CRS)
    #[error(transparent)]
    Input(#[from] SiteCoverError),

    /// Row or column count does not match the declared shape
    #[error("cost matrix shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A stored cost is negative or not finite
    #[error("invalid cost {value} at demand {row}, candidate {col}")]
    InvalidCost { row: usize, col: usize, value: f64 },
}

impl From<DistanceError> for SiteCoverError {
    fn from(err: DistanceError) -> Self {
        match err {
            DistanceError::Input(inner) => inner,
            other => SiteCoverError::Validation(other.to_string()),
        }
    }
}

/// Dense I×J matrix of non-negative distances in metres.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    n_demand: usize,
    n_candidates: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Wrap row-major data, checking shape and values.
    pub fn from_dense(
        n_demand: usize,
        n_candidates: usize,
        data: Vec<f64>,
    ) -> Result<Self, DistanceError> {
        let expected = n_demand * n_candidates;
        if data.len() != expected {
            return Err(DistanceError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        if n_candidates > 0 {
            for (idx, &value) in data.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(DistanceError::InvalidCost {
                        row: idx / n_candidates,
                        col: idx % n_candidates,
                        value,
                    });
                }
            }
        }
        Ok(Self {
            n_demand,
            n_candidates,
            data,
        })
    }

    pub fn n_demand(&self) -> usize {
        self.n_demand
    }

    pub fn n_candidates(&self) -> usize {
        self.n_candidates
    }

    #[inline]
    pub fn get(&self, demand: usize, candidate: usize) -> Meters {
        Meters(self.data[demand * self.n_candidates + candidate])
    }

    /// Distances from one demand unit to every candidate.
    #[inline]
    pub fn row(&self, demand: usize) -> &[f64] {
        let start = demand * self.n_candidates;
        &self.data[start..start + self.n_candidates]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.n_demand).map(move |i| self.row(i))
    }

    /// Long-form `(demand, candidate, cost)` triples in row-major order.
    pub fn triples(&self) -> impl Iterator<Item = (usize, usize, Meters)> + '_ {
        self.data.iter().enumerate().map(move |(idx, &cost)| {
            (idx / self.n_candidates, idx % self.n_candidates, Meters(cost))
        })
    }

    /// Distance from each demand unit to its closest candidate.
    pub fn row_minima(&self) -> Vec<f64> {
        self.rows()
            .map(|row| row.iter().copied().fold(f64::INFINITY, f64::min))
            .collect()
    }
}

/// Build the I×J matrix between a demand layer and a candidate layer.
///
/// Both layers are validated first (non-empty, finite, planar, same CRS) so a
/// bad coordinate is reported by record rather than surfacing as NaN costs.
pub fn build_cost_matrix(
    demand: &DemandSet,
    candidates: &CandidateSet,
) -> Result<CostMatrix, DistanceError> {
    demand.validate()?;
    candidates.validate()?;
    demand
        .crs
        .ensure_same(&candidates.crs, "demand", "candidate")?;

    let rows = demand.points();
    let cols = candidates.points();
    debug!(
        n_demand = rows.len(),
        n_candidates = cols.len(),
        "building cost matrix"
    );
    let data = pairwise_distances(&rows, &cols);
    CostMatrix::from_dense(rows.len(), cols.len(), data)
}

/// Row-major Euclidean distances between two point lists.
pub fn pairwise_distances(rows: &[Point], cols: &[Point]) -> Vec<f64> {
    if rows.is_empty() || cols.is_empty() {
        return Vec::new();
    }
    let mut data = vec![0.0; rows.len() * cols.len()];

    #[cfg(feature = "parallel")]
    data.par_chunks_mut(cols.len())
        .zip(rows.par_iter())
        .for_each(|(out, origin)| fill_row(out, origin, cols));

    #[cfg(not(feature = "parallel"))]
    data.chunks_mut(cols.len())
        .zip(rows.iter())
        .for_each(|(out, origin)| fill_row(out, origin, cols));

    data
}

/// Distance from every origin to its nearest target; `None` when there are no targets.
pub fn nearest_distances(origins: &[Point], targets: &[Point]) -> Option<Vec<f64>> {
    if targets.is_empty() {
        return None;
    }
    let nearest = |origin: &Point| {
        targets
            .iter()
            .map(|t| origin.distance_to(t).value())
            .fold(f64::INFINITY, f64::min)
    };

    #[cfg(feature = "parallel")]
    let out = origins.par_iter().map(nearest).collect();

    #[cfg(not(feature = "parallel"))]
    let out = origins.iter().map(nearest).collect();

    Some(out)
}

fn fill_row(out: &mut [f64], origin: &Point, cols: &[Point]) {
    for (slot, target) in out.iter_mut().zip(cols) {
        *slot = origin.distance_to(target).value();
    }
}
