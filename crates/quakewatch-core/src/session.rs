//! Session context: the mutable state of one running monitor.
//!
//! The user location, the display language, the permission pair and the
//! alert state are held here instead of in globals. Every value lives in
//! a [`watch`] channel: writers replace it, readers take whatever value
//! is current at the moment they read. A decision made while geolocation
//! is still resolving therefore uses the default centroid; that stale read
//! is accepted and observable through [`Session::view`].

use quakewatch_types::{Coordinate, Language, Permission, PermissionState};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::alert::{AlertMachine, PresentationTiming};

/// Values the decision pipeline reads for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionView {
    /// User location at the time of the read.
    pub user_location: Coordinate,
    /// Display language at the time of the read.
    pub language: Language,
    /// Permissions at the time of the read.
    pub permissions: PermissionState,
}

/// Shared state of one monitor session.
#[derive(Debug)]
pub struct Session {
    user_location: watch::Sender<Coordinate>,
    language: watch::Sender<Language>,
    permissions: watch::Sender<PermissionState>,
    alerts: AlertMachine,
}

impl Session {
    /// Create a session starting at `default_location` with `language`.
    ///
    /// Both permissions start as [`Permission::Unknown`] until the host has
    /// been queried, so nothing location-dependent is produced before that.
    pub fn new(default_location: Coordinate, language: Language, timing: PresentationTiming) -> Self {
        Self {
            user_location: watch::channel(default_location).0,
            language: watch::channel(language).0,
            permissions: watch::channel(PermissionState::default()).0,
            alerts: AlertMachine::new(timing),
        }
    }

    /// Snapshot of every value the pipeline reads.
    pub fn view(&self) -> SessionView {
        SessionView {
            user_location: self.user_location(),
            language: self.language(),
            permissions: self.permissions(),
        }
    }

    /// Current user location.
    pub fn user_location(&self) -> Coordinate {
        *self.user_location.borrow()
    }

    /// Replace the user location (last write wins).
    pub fn set_user_location(&self, location: Coordinate) {
        self.user_location.send_replace(location);
        info!(location = %location, "user location updated");
    }

    /// Current display language.
    pub fn language(&self) -> Language {
        *self.language.borrow()
    }

    /// Change the display language. Returns `true` if it changed.
    pub fn set_language(&self, language: Language) -> bool {
        let changed = self.language.send_if_modified(|current| {
            if *current == language {
                false
            } else {
                *current = language;
                true
            }
        });
        if changed {
            info!(language = %language, "display language changed");
        }
        changed
    }

    /// Watch language changes.
    pub fn subscribe_language(&self) -> watch::Receiver<Language> {
        self.language.subscribe()
    }

    /// Current permission pair.
    pub fn permissions(&self) -> PermissionState {
        *self.permissions.borrow()
    }

    /// Record the geolocation permission reported by the host.
    pub fn set_geolocation_permission(&self, permission: Permission) {
        self.permissions.send_modify(|p| p.geolocation = permission);
        debug!(permission = %permission, "geolocation permission recorded");
    }

    /// Record the notification permission reported by the host.
    pub fn set_notification_permission(&self, permission: Permission) {
        self.permissions.send_modify(|p| p.notification = permission);
        debug!(permission = %permission, "notification permission recorded");
    }

    /// The alert state machine.
    pub const fn alerts(&self) -> &AlertMachine {
        &self.alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::ETHIOPIA;

    fn session() -> Session {
        Session::new(
            Coordinate::new(9.145, 40.489_673),
            Language::En,
            PresentationTiming::default(),
        )
    }

    #[test]
    fn starts_at_default_location_with_undecided_permissions() {
        let s = session();
        let view = s.view();
        assert_eq!(view.user_location, Coordinate::new(9.145, 40.489_673));
        assert_eq!(view.permissions.geolocation, Permission::Unknown);
        assert_eq!(view.permissions.notification, Permission::Unknown);
        assert!(!s.alerts().is_active());
    }

    #[test]
    fn view_taken_before_update_keeps_stale_location() {
        let s = session();
        let before = s.view();
        s.set_user_location(ETHIOPIA.centroid());
        assert_eq!(before.user_location, Coordinate::new(9.145, 40.489_673));
        assert_eq!(s.view().user_location, ETHIOPIA.centroid());
    }

    #[test]
    fn set_language_reports_change_once() {
        let s = session();
        let mut rx = s.subscribe_language();
        assert!(s.set_language(Language::Am));
        assert!(!s.set_language(Language::Am));
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(*rx.borrow_and_update(), Language::Am);
        assert!(!rx.has_changed().unwrap_or(true));
    }

    #[test]
    fn permissions_are_set_independently() {
        let s = session();
        s.set_geolocation_permission(Permission::Granted);
        s.set_notification_permission(Permission::Denied);
        let p = s.permissions();
        assert_eq!(p.geolocation, Permission::Granted);
        assert_eq!(p.notification, Permission::Denied);
    }
}
