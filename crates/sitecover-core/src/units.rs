//! Unit safety for planar distances.
//!
//! All distances in sitecover are metres in a projected (planar) coordinate
//! system. Wrapping them in [`Meters`] keeps thresholds and costs from being
//! confused with raw coordinates or weights.
//!
//! ```
//! use sitecover_core::units::Meters;
//!
//! let threshold = Meters(1000.0);
//! let cost = Meters(640.0) + Meters(120.0);
//! assert!(cost <= threshold);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Distance in metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Meters(pub f64);

impl Add for Meters {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Meters {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Meters {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Meters {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Div<Meters> for Meters {
    type Output = f64;
    fn div(self, rhs: Meters) -> Self::Output {
        self.0 / rhs.0
    }
}

impl std::fmt::Display for Meters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} m", self.0)
    }
}

impl std::iter::Sum for Meters {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|x| x.0).sum())
    }
}

impl Meters {
    /// Create a new value
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw numeric value
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Check if value is finite
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Convert to kilometres
    #[inline]
    pub fn to_km(self) -> f64 {
        self.0 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_arithmetic() {
        let a = Meters(400.0);
        let b = Meters(600.0);
        assert_eq!((a + b).value(), 1000.0);
        assert_eq!((b - a).value(), 200.0);
        assert_eq!((a * 2.0).value(), 800.0);
        assert_eq!(b / a, 1.5);
    }

    #[test]
    fn test_meters_ordering_and_display() {
        assert!(Meters(999.9) < Meters(1000.0));
        assert_eq!(Meters(1000.0).to_string(), "1000.0 m");
        assert_eq!(Meters(2500.0).to_km(), 2.5);
    }

    #[test]
    fn test_meters_serde_transparent() {
        let json = serde_json::to_string(&Meters(12.5)).unwrap();
        assert_eq!(json, "12.5");
        let back: Meters = serde_json::from_str("7.0").unwrap();
        assert_eq!(back, Meters(7.0));
    }
}
