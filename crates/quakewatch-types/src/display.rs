//! Payloads handed to the presentation collaborators.
//!
//! The core never queries the map or the lists for state. It produces
//! these values and the runner forwards them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Row of the "all events in region" list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Place label.
    pub place: String,
    /// Magnitude.
    pub magnitude: f64,
    /// Occurrence time.
    pub occurred_at: DateTime<Utc>,
}

/// Row of the "realtime" list (events at or above the alert magnitude).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEntry {
    /// Place label.
    pub place: String,
    /// Magnitude.
    pub magnitude: f64,
    /// ETA annotation, present only when geolocation is usable.
    pub eta_seconds: Option<i64>,
    /// Whether the user sits inside the affected radius.
    pub user_in_radius: bool,
}

/// Both display lists for one snapshot, in feed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayLists {
    /// Every in-region event.
    pub history: Vec<HistoryEntry>,
    /// In-region events at or above the alert magnitude.
    pub realtime: Vec<RealtimeEntry>,
}

/// A point marker drawn at an epicenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointMarker {
    /// Marker position.
    pub at: Coordinate,
    /// Marker radius in screen units.
    pub radius: f64,
    /// Stroke colour.
    pub color: String,
    /// Popup text.
    pub popup: String,
}

/// A filled circle showing an affected area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleOverlay {
    /// Circle centre.
    pub center: Coordinate,
    /// Radius in metres.
    pub radius_m: f64,
    /// Stroke colour.
    pub color: String,
    /// Fill colour.
    pub fill_color: String,
    /// Fill opacity in `0.0..=1.0`.
    pub fill_opacity: f64,
    /// Popup text.
    pub popup: String,
}

/// A draw command for the map collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapCommand {
    /// Remove every marker and overlay.
    ClearOverlays,
    /// Add a point marker.
    Marker(PointMarker),
    /// Add an affected-area circle.
    Circle(CircleOverlay),
}
