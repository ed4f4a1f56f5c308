//! Decision pipeline: snapshot in, draw commands, display lists and at
//! most one triggered alert out.
//!
//! For each event, in feed order:
//!
//! 1. Drop it unless its epicenter is inside the monitored region.
//! 2. Add a marker and a history row, whatever the magnitude.
//! 3. At or above the minimum magnitude, assess impact against the user
//!    location current at that moment, add a realtime row and an
//!    affected-area overlay.
//! 4. Classify it alert-worthy when geolocation is usable, the user is in
//!    the radius and `0 < eta <= max_eta`. Alert-worthy events go to the
//!    alert state machine; the winner is returned for dispatch.

use quakewatch_types::{
    CircleOverlay, Coordinate, DisplayLists, HistoryEntry, ImpactAssessment, MapCommand, Permission,
    PointMarker, RealtimeEntry, Region, SeismicEvent, TriggeredAlert,
};
use tracing::debug;

use crate::alert::{Activation, AlertCandidate};
use crate::impact::ImpactModel;
use crate::messages;
use crate::region::{ETHIOPIA, contains};
use crate::session::Session;

/// Default minimum magnitude for realtime listing and alerting.
pub const DEFAULT_MIN_MAGNITUDE: f64 = 4.0;

/// Default alert horizon in seconds.
pub const DEFAULT_MAX_ETA_SECS: i64 = 60;

/// Classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Events below this magnitude are only listed in the history.
    pub min_magnitude: f64,
    /// Alerts are raised only for `0 < eta <= max_eta_secs`.
    pub max_eta_secs: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_magnitude: DEFAULT_MIN_MAGNITUDE,
            max_eta_secs: DEFAULT_MAX_ETA_SECS,
        }
    }
}

/// Whether an assessed event warrants alerting the user.
pub fn is_alert_worthy(
    assessment: &ImpactAssessment,
    geolocation: Permission,
    thresholds: &Thresholds,
) -> bool {
    geolocation.allows_location()
        && assessment.user_in_radius
        && assessment.eta_seconds > 0
        && assessment.eta_seconds <= thresholds.max_eta_secs
}

/// Styling of an affected-area overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStyle {
    /// The event triggered an alert.
    Alert,
    /// The event is listed but not alerting.
    Muted,
}

impl OverlayStyle {
    /// Build the overlay for an event centred at `center`.
    pub fn circle(self, center: Coordinate, radius_km: f64, popup: String) -> CircleOverlay {
        let (color, fill_color, fill_opacity) = match self {
            Self::Alert => ("orange", "#f03", 0.5),
            Self::Muted => ("gray", "gray", 0.2),
        };
        CircleOverlay {
            center,
            radius_m: radius_km * 1000.0,
            color: color.to_owned(),
            fill_color: fill_color.to_owned(),
            fill_opacity,
            popup,
        }
    }
}

/// Everything one snapshot produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotOutcome {
    /// Map commands, starting with [`MapCommand::ClearOverlays`].
    pub commands: Vec<MapCommand>,
    /// The history and realtime lists.
    pub lists: DisplayLists,
    /// The alert that won the state machine, if any.
    pub triggered: Option<TriggeredAlert>,
    /// Alert-worthy events dropped because an alert was already active.
    pub suppressed: usize,
}

/// The per-snapshot decision logic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPipeline {
    region: Region,
    model: ImpactModel,
    thresholds: Thresholds,
}

impl Default for DecisionPipeline {
    fn default() -> Self {
        Self::new(ETHIOPIA, ImpactModel::default(), Thresholds::default())
    }
}

impl DecisionPipeline {
    /// Create a pipeline for `region`.
    pub const fn new(region: Region, model: ImpactModel, thresholds: Thresholds) -> Self {
        Self {
            region,
            model,
            thresholds,
        }
    }

    /// Monitored region.
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Run the pipeline over one snapshot, driving `session`'s alert state.
    pub fn evaluate(&self, events: &[SeismicEvent], session: &Session) -> SnapshotOutcome {
        let language = session.language();
        let mut outcome = SnapshotOutcome {
            commands: vec![MapCommand::ClearOverlays],
            ..SnapshotOutcome::default()
        };

        for event in events.iter().filter(|e| contains(&self.region, e.epicenter)) {
            outcome.commands.push(MapCommand::Marker(PointMarker {
                at: event.epicenter,
                radius: event.magnitude * 2.0,
                color: "red".to_owned(),
                popup: messages::marker_popup(&event.place, event.magnitude, event.occurred_at, language),
            }));
            outcome.lists.history.push(HistoryEntry {
                place: event.place.clone(),
                magnitude: event.magnitude,
                occurred_at: event.occurred_at,
            });

            if event.magnitude < self.thresholds.min_magnitude {
                continue;
            }

            let geolocation = session.permissions().geolocation;
            let assessment = self.model.assess(event, session.user_location());
            outcome.lists.realtime.push(RealtimeEntry {
                place: event.place.clone(),
                magnitude: event.magnitude,
                eta_seconds: geolocation
                    .allows_location()
                    .then_some(assessment.eta_seconds),
                user_in_radius: assessment.user_in_radius,
            });

            let popup = messages::affected_area_popup(assessment.affected_radius_km, language);
            if !is_alert_worthy(&assessment, geolocation, &self.thresholds) {
                debug!(
                    place = %event.place,
                    magnitude = event.magnitude,
                    distance_km = assessment.distance_km,
                    eta_seconds = assessment.eta_seconds,
                    in_radius = assessment.user_in_radius,
                    geolocation = %geolocation,
                    "event not alert-worthy"
                );
                outcome.commands.push(MapCommand::Circle(OverlayStyle::Muted.circle(
                    event.epicenter,
                    assessment.affected_radius_km,
                    popup,
                )));
                continue;
            }

            let candidate = AlertCandidate {
                place: event.place.clone(),
                magnitude: event.magnitude,
                eta_seconds: assessment.eta_seconds,
            };
            match session.alerts().try_activate(candidate) {
                Activation::Triggered(alert) => {
                    outcome.commands.push(MapCommand::Circle(OverlayStyle::Alert.circle(
                        event.epicenter,
                        assessment.affected_radius_km,
                        popup,
                    )));
                    outcome.triggered.get_or_insert(alert);
                }
                Activation::Suppressed { .. } => {
                    outcome.suppressed = outcome.suppressed.saturating_add(1);
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use quakewatch_types::Language;

    use super::*;
    use crate::alert::PresentationTiming;
    use crate::geodesy::EARTH_RADIUS_KM;

    const USER: Coordinate = Coordinate::new(9.0, 40.0);

    fn north_of(origin: Coordinate, km: f64) -> Coordinate {
        Coordinate::new(origin.lat + (km / EARTH_RADIUS_KM).to_degrees(), origin.lng)
    }

    fn event(place: &str, epicenter: Coordinate, magnitude: f64) -> SeismicEvent {
        SeismicEvent {
            epicenter,
            magnitude,
            place: place.to_owned(),
            occurred_at: Utc::now(),
        }
    }

    fn session(geolocation: Permission) -> Session {
        let s = Session::new(USER, Language::En, PresentationTiming::default());
        s.set_geolocation_permission(geolocation);
        s
    }

    fn circles(outcome: &SnapshotOutcome) -> Vec<&CircleOverlay> {
        outcome
            .commands
            .iter()
            .filter_map(|c| match c {
                MapCommand::Circle(circle) => Some(circle),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn classification_example_from_thresholds() {
        let thresholds = Thresholds::default();
        let near = ImpactAssessment {
            distance_km: 20.0,
            affected_radius_km: 50.0,
            eta_seconds: 4,
            user_in_radius: true,
        };
        assert!(is_alert_worthy(&near, Permission::Granted, &thresholds));
        assert!(is_alert_worthy(&near, Permission::Prompt, &thresholds));
        assert!(!is_alert_worthy(&near, Permission::Denied, &thresholds));
        assert!(!is_alert_worthy(&near, Permission::Unsupported, &thresholds));
        assert!(!is_alert_worthy(&near, Permission::Unknown, &thresholds));

        let late = ImpactAssessment {
            eta_seconds: 120,
            ..near
        };
        assert!(!is_alert_worthy(&late, Permission::Granted, &thresholds));
    }

    #[test]
    fn eta_bounds_are_exclusive_zero_inclusive_max() {
        let thresholds = Thresholds::default();
        let base = ImpactAssessment {
            distance_km: 0.0,
            affected_radius_km: 50.0,
            eta_seconds: 0,
            user_in_radius: true,
        };
        for (eta, expected) in [(-1, false), (0, false), (1, true), (60, true), (61, false)] {
            let a = ImpactAssessment {
                eta_seconds: eta,
                ..base
            };
            assert_eq!(is_alert_worthy(&a, Permission::Granted, &thresholds), expected, "eta {eta}");
        }
    }

    #[test]
    fn out_of_region_events_are_dropped_entirely() {
        let s = session(Permission::Granted);
        let events = vec![event("Tokyo", Coordinate::new(35.6, 139.7), 6.0)];
        let outcome = DecisionPipeline::default().evaluate(&events, &s);
        assert_eq!(outcome.commands, vec![MapCommand::ClearOverlays]);
        assert!(outcome.lists.history.is_empty());
        assert!(outcome.lists.realtime.is_empty());
        assert!(outcome.triggered.is_none());
    }

    #[test]
    fn small_events_only_reach_the_history() {
        let s = session(Permission::Granted);
        let events = vec![event("Afar", north_of(USER, 5.0), 3.9)];
        let outcome = DecisionPipeline::default().evaluate(&events, &s);
        assert_eq!(outcome.lists.history.len(), 1);
        assert!(outcome.lists.realtime.is_empty());
        assert!(circles(&outcome).is_empty());
        assert!(outcome.triggered.is_none());
        assert!(!s.alerts().is_active());
    }

    #[test]
    fn nearby_event_triggers_with_alert_overlay() {
        let s = session(Permission::Granted);
        let events = vec![event("Awash", north_of(USER, 10.0), 4.5)];
        let outcome = DecisionPipeline::default().evaluate(&events, &s);

        let alert = outcome.triggered.as_ref().map(|a| (a.place.as_str(), a.eta_seconds));
        assert_eq!(alert, Some(("Awash", 2)));
        assert!(s.alerts().is_active());

        let overlays = circles(&outcome);
        assert_eq!(overlays.len(), 1);
        let circle = overlays.first().copied();
        assert_eq!(circle.map(|c| c.color.as_str()), Some("orange"));
        assert_eq!(circle.map(|c| c.fill_color.as_str()), Some("#f03"));
        assert!(circle.is_some_and(|c| (c.radius_m - 45_000.0).abs() < 1e-6));
        assert_eq!(outcome.lists.realtime.first().and_then(|r| r.eta_seconds), Some(2));
    }

    #[test]
    fn denied_geolocation_lists_without_eta_and_mutes_overlay() {
        let s = session(Permission::Denied);
        let events = vec![event("Awash", north_of(USER, 10.0), 4.5)];
        let outcome = DecisionPipeline::default().evaluate(&events, &s);

        assert!(outcome.triggered.is_none());
        assert!(!s.alerts().is_active());
        let row = outcome.lists.realtime.first();
        assert_eq!(row.map(|r| r.eta_seconds), Some(None));
        assert_eq!(row.map(|r| r.user_in_radius), Some(true));
        let overlays = circles(&outcome);
        assert_eq!(overlays.first().map(|c| c.color.as_str()), Some("gray"));
    }

    #[test]
    fn unqueried_geolocation_never_alerts() {
        let s = Session::new(USER, Language::En, PresentationTiming::default());
        let events = vec![event("Awash", north_of(USER, 10.0), 4.5)];
        let outcome = DecisionPipeline::default().evaluate(&events, &s);

        assert!(outcome.triggered.is_none());
        assert!(!s.alerts().is_active());
        let row = outcome.lists.realtime.first();
        assert_eq!(row.map(|r| r.eta_seconds), Some(None));
        assert_eq!(circles(&outcome).first().map(|c| c.color.as_str()), Some("gray"));
    }

    #[test]
    fn second_alert_worthy_event_is_suppressed_without_overlay() {
        let s = session(Permission::Granted);
        let events = vec![
            event("first", north_of(USER, 10.0), 4.5),
            event("second", north_of(USER, 15.0), 5.0),
        ];
        let outcome = DecisionPipeline::default().evaluate(&events, &s);

        assert_eq!(outcome.triggered.as_ref().map(|a| a.place.as_str()), Some("first"));
        assert_eq!(outcome.suppressed, 1);
        assert_eq!(circles(&outcome).len(), 1);
        assert_eq!(outcome.lists.realtime.len(), 2);
    }

    #[test]
    fn colocated_event_is_not_alert_worthy() {
        let s = session(Permission::Granted);
        let events = vec![event("here", USER, 5.0)];
        let outcome = DecisionPipeline::default().evaluate(&events, &s);
        assert!(outcome.triggered.is_none());
        assert_eq!(circles(&outcome).first().map(|c| c.color.as_str()), Some("gray"));
    }

    #[test]
    fn markers_scale_with_magnitude_and_keep_feed_order() {
        let s = session(Permission::Denied);
        let events = vec![
            event("a", north_of(USER, 100.0), 2.0),
            event("b", north_of(USER, 200.0), 4.0),
        ];
        let outcome = DecisionPipeline::default().evaluate(&events, &s);
        let radii: Vec<f64> = outcome
            .commands
            .iter()
            .filter_map(|c| match c {
                MapCommand::Marker(m) => Some(m.radius),
                _ => None,
            })
            .collect();
        assert_eq!(radii.len(), 2);
        assert!(radii.first().is_some_and(|r| (r - 4.0).abs() < 1e-9));
        assert!(radii.get(1).is_some_and(|r| (r - 8.0).abs() < 1e-9));
        let places: Vec<&str> = outcome.lists.history.iter().map(|h| h.place.as_str()).collect();
        assert_eq!(places, vec!["a", "b"]);
    }

    #[test]
    fn location_update_applies_to_the_next_snapshot() {
        let s = Session::new(
            Coordinate::new(9.145, 40.489_673),
            Language::En,
            PresentationTiming::default(),
        );
        s.set_geolocation_permission(Permission::Granted);
        let events = vec![event("Awash", north_of(USER, 10.0), 4.5)];

        let stale = DecisionPipeline::default().evaluate(&events, &s);
        assert!(stale.triggered.is_none());

        s.set_user_location(USER);
        let fresh = DecisionPipeline::default().evaluate(&events, &s);
        assert!(fresh.triggered.is_some());
    }
}
