//! Planar points and coordinate reference system tags.

use crate::error::{SiteCoverError, SiteCoverResult};
use crate::units::Meters;
use serde::{Deserialize, Serialize};
use std::fmt;

/// CRS assumed for tabular layers that do not declare one (British National Grid).
pub const DEFAULT_CRS: &str = "EPSG:27700";

/// CRS identifiers whose coordinates are degrees, not metres.
const GEOGRAPHIC_CRS: &[&str] = &["EPSG:4326", "OGC:CRS84", "EPSG:4258", "EPSG:4269", "EPSG:4283"];

/// A point in a projected coordinate system, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(&self, other: &Point) -> Meters {
        Meters((self.x - other.x).hypot(self.y - other.y))
    }
}

/// Coordinate reference system tag, normalised to `AUTHORITY:CODE`.
///
/// Accepts the forms produced by common GIS tooling: `EPSG:27700`,
/// `epsg:27700`, `urn:ogc:def:crs:EPSG::27700` and the OGC CRS84 URN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Crs(String);

impl Crs {
    pub fn parse(raw: &str) -> SiteCoverResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SiteCoverError::Crs("empty CRS identifier".into()));
        }
        let upper = trimmed.to_ascii_uppercase();
        let normalised = if let Some(rest) = upper.strip_prefix("URN:OGC:DEF:CRS:") {
            // URN:OGC:DEF:CRS:{authority}:{version}:{code}; version may be empty
            let parts: Vec<&str> = rest.split(':').collect();
            match parts.as_slice() {
                [authority, _version, code] if !code.is_empty() => format!("{authority}:{code}"),
                _ => {
                    return Err(SiteCoverError::Crs(format!(
                        "unrecognised CRS URN '{trimmed}'"
                    )))
                }
            }
        } else if upper.chars().all(|c| c.is_ascii_digit()) {
            format!("EPSG:{upper}")
        } else {
            upper
        };
        Ok(Crs(normalised))
    }

    /// The default planar CRS for layers that carry no CRS metadata.
    pub fn default_planar() -> Self {
        Crs(DEFAULT_CRS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_geographic(&self) -> bool {
        GEOGRAPHIC_CRS.contains(&self.0.as_str())
    }

    /// Reject CRSs whose units are degrees; distances there are not metres.
    pub fn ensure_planar(&self, layer: &str) -> SiteCoverResult<()> {
        if self.is_geographic() {
            return Err(SiteCoverError::Crs(format!(
                "{layer} layer uses geographic CRS {}; reproject to a planar CRS first",
                self.0
            )));
        }
        Ok(())
    }

    /// Reject combining two layers in different CRSs.
    pub fn ensure_same(&self, other: &Crs, left: &str, right: &str) -> SiteCoverResult<()> {
        if self != other {
            return Err(SiteCoverError::Crs(format!(
                "{left} layer is in {} but {right} layer is in {}",
                self.0, other.0
            )));
        }
        Ok(())
    }
}

impl Default for Crs {
    fn default() -> Self {
        Crs::default_planar()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Crs {
    type Error = SiteCoverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Crs::parse(&value)
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.0
    }
}
