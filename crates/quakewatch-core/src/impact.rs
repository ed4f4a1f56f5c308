//! Per-user impact estimation.
//!
//! The model is coarse: the affected radius grows linearly
//! with magnitude and the wave front travels at a fixed speed. Both
//! factors are approximations and are configurable.

use quakewatch_types::{Coordinate, ImpactAssessment, SeismicEvent};

use crate::geodesy::distance_km;

/// Default affected-radius factor, km per unit of magnitude.
pub const DEFAULT_RADIUS_KM_PER_MAGNITUDE: f64 = 10.0;

/// Default seismic wave speed, km/s.
pub const DEFAULT_WAVE_SPEED_KM_S: f64 = 5.0;

/// Linear impact model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactModel {
    /// Affected radius in km per unit of magnitude.
    pub radius_km_per_magnitude: f64,
    /// Wave propagation speed in km/s. Must be positive.
    pub wave_speed_km_s: f64,
}

impl Default for ImpactModel {
    fn default() -> Self {
        Self {
            radius_km_per_magnitude: DEFAULT_RADIUS_KM_PER_MAGNITUDE,
            wave_speed_km_s: DEFAULT_WAVE_SPEED_KM_S,
        }
    }
}

impl ImpactModel {
    /// Estimated shaking radius for a magnitude, in km.
    pub fn affected_radius_km(&self, magnitude: f64) -> f64 {
        magnitude * self.radius_km_per_magnitude
    }

    /// Seconds for the wave front to travel `distance_km`, rounded to the
    /// nearest whole second.
    #[allow(clippy::cast_possible_truncation)]
    pub fn eta_seconds(&self, distance_km: f64) -> i64 {
        (distance_km / self.wave_speed_km_s).round() as i64
    }

    /// Assess `event` against the user's location.
    pub fn assess(&self, event: &SeismicEvent, user: Coordinate) -> ImpactAssessment {
        let affected_radius_km = self.affected_radius_km(event.magnitude);
        let distance_km = distance_km(event.epicenter, user);
        ImpactAssessment {
            distance_km,
            affected_radius_km,
            eta_seconds: self.eta_seconds(distance_km),
            user_in_radius: distance_km <= affected_radius_km,
        }
    }
}

/// Assess `event` with the default model (10 km per magnitude, 5 km/s).
pub fn assess(event: &SeismicEvent, user: Coordinate) -> ImpactAssessment {
    ImpactModel::default().assess(event, user)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn event_at(epicenter: Coordinate, magnitude: f64) -> SeismicEvent {
        SeismicEvent {
            epicenter,
            magnitude,
            place: "test".to_owned(),
            occurred_at: Utc::now(),
        }
    }

    /// A point `km` kilometres due north of `origin`.
    fn north_of(origin: Coordinate, km: f64) -> Coordinate {
        let dlat = (km / crate::geodesy::EARTH_RADIUS_KM).to_degrees();
        Coordinate::new(origin.lat + dlat, origin.lng)
    }

    #[test]
    fn radius_is_ten_km_per_magnitude() {
        let user = Coordinate::new(9.0, 40.0);
        let a = assess(&event_at(user, 4.5), user);
        assert!((a.affected_radius_km - 45.0).abs() < 1e-9);
    }

    #[test]
    fn colocated_user_has_zero_eta_and_is_in_radius() {
        let user = Coordinate::new(9.0, 40.0);
        let a = assess(&event_at(user, 4.0), user);
        assert_eq!(a.eta_seconds, 0);
        assert!(a.user_in_radius);
    }

    #[test]
    fn twenty_km_gives_four_seconds() {
        let user = Coordinate::new(9.0, 40.0);
        let a = assess(&event_at(north_of(user, 20.0), 5.0), user);
        assert!((a.distance_km - 20.0).abs() < 1e-6);
        assert_eq!(a.eta_seconds, 4);
        assert!(a.user_in_radius);
    }

    #[test]
    fn outside_radius_is_flagged() {
        let user = Coordinate::new(9.0, 40.0);
        let a = assess(&event_at(north_of(user, 60.0), 5.0), user);
        assert!(!a.user_in_radius);
        assert_eq!(a.eta_seconds, 12);
    }

    #[test]
    fn radius_strictly_increases_with_magnitude() {
        let user = Coordinate::new(9.0, 40.0);
        let mut previous = f64::NEG_INFINITY;
        for tenth in 0..100 {
            let magnitude = f64::from(tenth) / 10.0;
            let a = assess(&event_at(user, magnitude), user);
            assert!(a.affected_radius_km > previous);
            previous = a.affected_radius_km;
        }
    }

    #[test]
    fn eta_never_decreases_with_distance() {
        let user = Coordinate::new(9.0, 40.0);
        let mut previous = i64::MIN;
        for km in 0..500 {
            let a = assess(&event_at(north_of(user, f64::from(km)), 4.0), user);
            assert!(a.eta_seconds >= previous, "eta dropped at {km} km");
            previous = a.eta_seconds;
        }
    }

    #[test]
    fn custom_wave_speed_is_honoured() {
        let model = ImpactModel {
            radius_km_per_magnitude: 10.0,
            wave_speed_km_s: 2.0,
        };
        assert_eq!(model.eta_seconds(20.0), 10);
        assert_eq!(model.eta_seconds(21.0), 11);
    }
}
