//! Bounding-box region filter.

use quakewatch_types::{Coordinate, Region};

/// The monitored area: Ethiopia's bounding box.
pub const ETHIOPIA: Region = Region {
    north: 15.0,
    south: 3.4,
    east: 48.0,
    west: 33.0,
};

/// Whether `point` lies inside `region`. All four bounds are inclusive.
pub fn contains(region: &Region, point: Coordinate) -> bool {
    region.south <= point.lat
        && point.lat <= region.north
        && region.west <= point.lng
        && point.lng <= region.east
}
