//! # sitecover-core: Facility Siting Data Model
//!
//! Provides the data structures shared by every stage of the site-selection
//! pipeline.
//!
//! ## Core Data Structures
//!
//! - [`DemandSet`] / [`DemandUnit`] - demand units with stable identifiers and optional weights
//! - [`CandidateSet`] / [`CandidateSite`] - eligible new sites, indexed by input order
//! - [`SupplySet`] / [`SupplyPoint`] - facilities that already exist
//! - [`Point`] and [`Crs`] - planar coordinates tagged with their reference system
//! - [`Meters`] - distance newtype used for costs and thresholds
//!
//! All layers must be in the same projected CRS. Geographic CRSs are rejected
//! since Euclidean distances on degrees are meaningless; reprojection happens
//! upstream.
//!
//! ## Configuration
//!
//! [`PlanConfig`] replaces ambient globals with an explicit structure passed
//! into each stage (threshold, facility budget, solver budgets, backend,
//! baseline policy, paths).
//!
//! ## Errors
//!
//! [`SiteCoverError`] distinguishes validation, configuration, CRS and solver
//! failures so callers can decide policy per category.

pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod units;

pub use config::{BackendKind, BaselinePolicy, PathsConfig, PlanConfig};
pub use error::{SiteCoverError, SiteCoverResult};
pub use geometry::{Crs, Point, DEFAULT_CRS};
pub use model::{
    CandidateId, CandidateSet, CandidateSite, DemandId, DemandSet, DemandUnit, SupplyPoint,
    SupplySet,
};
pub use units::Meters;
