//! Seismic events and the values derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::ids::AlertId;

/// One event from a feed snapshot. Immutable once constructed; dropped
/// when the next snapshot replaces the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicEvent {
    /// Surface point of the event.
    pub epicenter: Coordinate,
    /// Reported magnitude.
    pub magnitude: f64,
    /// Human-readable place label from the feed.
    pub place: String,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Per-user impact of one event. Computed per event per snapshot, never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactAssessment {
    /// Great-circle distance from epicenter to the user, in km.
    pub distance_km: f64,
    /// Estimated ground-shaking extent, in km.
    pub affected_radius_km: f64,
    /// Estimated seconds until shaking reaches the user. Zero means the
    /// user is at the epicenter.
    pub eta_seconds: i64,
    /// Whether `distance_km <= affected_radius_km`.
    pub user_in_radius: bool,
}

/// An alert that won the alert state machine and is being presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAlert {
    /// Correlation id for this presentation cycle.
    pub id: AlertId,
    /// Place label of the triggering event.
    pub place: String,
    /// Magnitude of the triggering event.
    pub magnitude: f64,
    /// Estimated seconds until shaking.
    pub eta_seconds: i64,
}
