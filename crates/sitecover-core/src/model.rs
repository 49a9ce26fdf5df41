//! Demand units, candidate sites and existing supply points.
//!
//! Layers are loaded once and treated as read-only for the whole run. Each
//! layer carries the [`Crs`] its coordinates are expressed in so that stages
//! combining layers can refuse to mix coordinate systems.

use crate::error::{SiteCoverError, SiteCoverResult};
use crate::geometry::{Crs, Point};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Stable identifier of a demand unit (e.g. an LSOA code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandId(String);

impl DemandId {
    pub fn new(value: impl Into<String>) -> Self {
        DemandId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DemandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Candidate identifier: the position of the site in the input ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(usize);

impl CandidateId {
    #[inline]
    pub fn new(value: usize) -> Self {
        CandidateId(value)
    }

    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of demand to be served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandUnit {
    pub id: DemandId,
    pub location: Point,
    /// Relative importance; 1.0 when the input carries no weights
    pub weight: f64,
}

impl DemandUnit {
    pub fn new(id: impl Into<String>, location: Point) -> Self {
        Self {
            id: DemandId::new(id),
            location,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// A location eligible for a new facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSite {
    pub id: CandidateId,
    pub location: Point,
    /// Optional external label (e.g. an OSM feature id)
    pub label: Option<String>,
}

/// An existing facility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplyPoint {
    pub location: Point,
}

/// The demand layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSet {
    pub crs: Crs,
    pub units: Vec<DemandUnit>,
}

impl DemandSet {
    pub fn new(crs: Crs, units: Vec<DemandUnit>) -> Self {
        Self { crs, units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn points(&self) -> Vec<Point> {
        self.units.iter().map(|u| u.location).collect()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.units.iter().map(|u| u.weight).collect()
    }

    pub fn total_weight(&self) -> f64 {
        self.units.iter().map(|u| u.weight).sum()
    }

    /// True when every unit has weight 1 (counting units == weighting them).
    pub fn is_unweighted(&self) -> bool {
        self.units.iter().all(|u| u.weight == 1.0)
    }

    /// Fail fast on empty layers, non-finite coordinates or weights, and duplicate ids.
    pub fn validate(&self) -> SiteCoverResult<()> {
        self.crs.ensure_planar("demand")?;
        if self.units.is_empty() {
            return Err(SiteCoverError::Validation("demand set is empty".into()));
        }
        let mut seen = HashSet::with_capacity(self.units.len());
        for (index, unit) in self.units.iter().enumerate() {
            if !unit.location.is_finite() {
                return Err(SiteCoverError::Validation(format!(
                    "demand unit {} (row {index}) has non-finite coordinate ({}, {})",
                    unit.id, unit.location.x, unit.location.y
                )));
            }
            if !unit.weight.is_finite() || unit.weight < 0.0 {
                return Err(SiteCoverError::Validation(format!(
                    "demand unit {} (row {index}) has invalid weight {}",
                    unit.id, unit.weight
                )));
            }
            if !seen.insert(&unit.id) {
                return Err(SiteCoverError::Validation(format!(
                    "duplicate demand identifier {} (row {index})",
                    unit.id
                )));
            }
        }
        Ok(())
    }
}

/// The candidate layer, indexed `0..J` by input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub crs: Crs,
    pub sites: Vec<CandidateSite>,
}

impl CandidateSet {
    /// Build from coordinates; identifiers follow input order.
    pub fn from_points(crs: Crs, points: impl IntoIterator<Item = Point>) -> Self {
        let sites = points
            .into_iter()
            .enumerate()
            .map(|(index, location)| CandidateSite {
                id: CandidateId::new(index),
                location,
                label: None,
            })
            .collect();
        Self { crs, sites }
    }

    /// Build from coordinates with external labels.
    pub fn from_labelled(crs: Crs, entries: impl IntoIterator<Item = (Point, Option<String>)>) -> Self {
        let sites = entries
            .into_iter()
            .enumerate()
            .map(|(index, (location, label))| CandidateSite {
                id: CandidateId::new(index),
                location,
                label,
            })
            .collect();
        Self { crs, sites }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn points(&self) -> Vec<Point> {
        self.sites.iter().map(|s| s.location).collect()
    }

    pub fn get(&self, id: CandidateId) -> Option<&CandidateSite> {
        self.sites.get(id.value())
    }

    /// Resolve chosen candidate ids to sites, rejecting unknown ids.
    pub fn select(&self, ids: &[CandidateId]) -> SiteCoverResult<Vec<&CandidateSite>> {
        ids.iter()
            .map(|id| {
                self.get(*id).ok_or_else(|| {
                    SiteCoverError::Validation(format!(
                        "candidate index {id} out of range (have {} candidates)",
                        self.sites.len()
                    ))
                })
            })
            .collect()
    }

    pub fn validate(&self) -> SiteCoverResult<()> {
        self.crs.ensure_planar("candidate")?;
        if self.sites.is_empty() {
            return Err(SiteCoverError::Validation("candidate set is empty".into()));
        }
        let mut labels = HashSet::new();
        for (index, site) in self.sites.iter().enumerate() {
            if site.id.value() != index {
                return Err(SiteCoverError::Validation(format!(
                    "candidate at position {index} has identifier {}; identifiers must be unique and follow input order",
                    site.id
                )));
            }
            if !site.location.is_finite() {
                return Err(SiteCoverError::Validation(format!(
                    "candidate {index} has non-finite coordinate ({}, {})",
                    site.location.x, site.location.y
                )));
            }
            if let Some(label) = &site.label {
                if !labels.insert(label.as_str()) {
                    return Err(SiteCoverError::Validation(format!(
                        "duplicate candidate identifier '{label}' (candidate {index})"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The existing-supply layer. May be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplySet {
    pub crs: Crs,
    pub points: Vec<SupplyPoint>,
}

impl SupplySet {
    pub fn new(crs: Crs, points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            crs,
            points: points
                .into_iter()
                .map(|location| SupplyPoint { location })
                .collect(),
        }
    }

    pub fn empty(crs: Crs) -> Self {
        Self {
            crs,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn locations(&self) -> Vec<Point> {
        self.points.iter().map(|p| p.location).collect()
    }

    pub fn validate(&self) -> SiteCoverResult<()> {
        self.crs.ensure_planar("supply")?;
        for (index, point) in self.points.iter().enumerate() {
            if !point.location.is_finite() {
                return Err(SiteCoverError::Validation(format!(
                    "supply point {index} has non-finite coordinate ({}, {})",
                    point.location.x, point.location.y
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demand(units: Vec<DemandUnit>) -> DemandSet {
        DemandSet::new(Crs::default_planar(), units)
    }

    #[test]
    fn test_demand_defaults_to_unit_weight() {
        let set = demand(vec![
            DemandUnit::new("W01", Point::new(0.0, 0.0)),
            DemandUnit::new("W02", Point::new(1.0, 0.0)),
        ]);
        assert!(set.is_unweighted());
        assert_eq!(set.total_weight(), 2.0);
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_demand_rejects_non_finite_with_identifier() {
        let set = demand(vec![
            DemandUnit::new("W01", Point::new(0.0, 0.0)),
            DemandUnit::new("W02", Point::new(f64::NAN, 0.0)),
        ]);
        let err = set.validate().unwrap_err();
        assert!(matches!(err, SiteCoverError::Validation(_)));
        assert!(err.to_string().contains("W02"));
    }

    #[test]
    fn test_demand_rejects_empty_and_duplicates() {
        assert!(demand(vec![]).validate().is_err());

        let dup = demand(vec![
            DemandUnit::new("W01", Point::new(0.0, 0.0)),
            DemandUnit::new("W01", Point::new(5.0, 0.0)),
        ]);
        assert!(dup.validate().unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_demand_rejects_negative_weight() {
        let set = demand(vec![DemandUnit::new("W01", Point::new(0.0, 0.0)).with_weight(-2.0)]);
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_demand_rejects_geographic_crs() {
        let set = DemandSet::new(
            Crs::parse("EPSG:4326").unwrap(),
            vec![DemandUnit::new("W01", Point::new(-3.18, 51.48))],
        );
        assert!(matches!(set.validate(), Err(SiteCoverError::Crs(_))));
    }

    #[test]
    fn test_candidates_indexed_by_position() {
        let set = CandidateSet::from_points(
            Crs::default_planar(),
            vec![Point::new(0.0, 1.0), Point::new(10.0, 1.0)],
        );
        assert_eq!(set.sites[1].id, CandidateId::new(1));
        assert!(set.validate().is_ok());
        let chosen = set.select(&[CandidateId::new(1)]).unwrap();
        assert_eq!(chosen[0].location, Point::new(10.0, 1.0));
        assert!(set.select(&[CandidateId::new(2)]).is_err());
    }

    #[test]
    fn test_candidates_reject_duplicate_labels() {
        let set = CandidateSet::from_labelled(
            Crs::default_planar(),
            vec![
                (Point::new(0.0, 0.0), Some("way/1".to_string())),
                (Point::new(1.0, 0.0), Some("way/1".to_string())),
            ],
        );
        let err = set.validate().unwrap_err();
        assert!(err.to_string().contains("way/1"));
    }

    #[test]
    fn test_candidates_reject_out_of_order_ids() {
        let mut set = CandidateSet::from_points(
            Crs::default_planar(),
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
        );
        set.sites[1].id = CandidateId::new(0);
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_supply_may_be_empty() {
        let set = SupplySet::empty(Crs::default_planar());
        assert!(set.validate().is_ok());
        let bad = SupplySet::new(Crs::default_planar(), vec![Point::new(f64::INFINITY, 0.0)]);
        assert!(bad.validate().is_err());
    }
}
