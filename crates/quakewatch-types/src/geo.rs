//! Geographic primitives.
//!
//! Coordinates are plain `(latitude, longitude)` pairs in decimal degrees.
//! Ranges are not enforced: the upstream feed is trusted and the user
//! location comes from a provider that already reports valid values.

use serde::{Deserialize, Serialize};

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude, positive north.
    pub lat: f64,
    /// Longitude, positive east.
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// An immutable bounding box defining the monitored area.
///
/// All four bounds are inclusive. The box is assumed not to cross the
/// antimeridian (`west <= east`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Northern latitude bound.
    pub north: f64,
    /// Southern latitude bound.
    pub south: f64,
    /// Eastern longitude bound.
    pub east: f64,
    /// Western longitude bound.
    pub west: f64,
}

impl Region {
    /// Geometric centre of the box.
    pub fn centroid(&self) -> Coordinate {
        Coordinate::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_display_rounds_to_four_places() {
        let c = Coordinate::new(9.145, 40.489_673);
        assert_eq!(c.to_string(), "(9.1450, 40.4897)");
    }

    #[test]
    fn region_centroid_is_midpoint() {
        let region = Region {
            north: 10.0,
            south: 0.0,
            east: 40.0,
            west: 30.0,
        };
        let c = region.centroid();
        assert!((c.lat - 5.0).abs() < 1e-12);
        assert!((c.lng - 35.0).abs() < 1e-12);
    }

    #[test]
    fn coordinate_serde_roundtrip_uses_short_keys() {
        let json = serde_json::to_value(Coordinate::new(1.5, 2.5)).unwrap_or_default();
        assert_eq!(json, serde_json::json!({"lat": 1.5, "lng": 2.5}));
    }
}
