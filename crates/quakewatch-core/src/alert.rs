//! Alert state machine.
//!
//! ```text
//!            try_activate (idle)
//!   Idle ─────────────────────────► Active{Visible}
//!    ▲                                   │  dwell elapsed
//!    │      hide transition elapsed      ▼
//!    └───────────────────────────── Active{Hiding}
//! ```
//!
//! At most one alert is active. An alert-worthy event arriving while one
//! is active is suppressed, not queued. The dwell/hide chain is a fixed
//! sequence of timers that nothing can shorten, extend or cancel.

use std::time::Duration;

use quakewatch_types::{AlertId, TriggeredAlert};
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

/// Default time the banner stays fully visible.
pub const DEFAULT_DWELL: Duration = Duration::from_secs(5);

/// Default hide-transition delay before the machine returns to idle.
pub const DEFAULT_HIDE_TRANSITION: Duration = Duration::from_millis(300);

/// Timers of one presentation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationTiming {
    /// How long the banner stays fully visible.
    pub dwell: Duration,
    /// Delay between hiding the banner and accepting a new alert.
    pub hide_transition: Duration,
}

impl Default for PresentationTiming {
    fn default() -> Self {
        Self {
            dwell: DEFAULT_DWELL,
            hide_transition: DEFAULT_HIDE_TRANSITION,
        }
    }
}

/// Sub-state of an active alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Banner shown, dwell timer running.
    Visible,
    /// Banner hidden, transition timer running.
    Hiding,
}

/// Current phase of the machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertPhase {
    /// No alert is being presented.
    #[default]
    Idle,
    /// An alert is being presented.
    Active {
        /// The alert being presented.
        id: AlertId,
        /// Where in its presentation cycle it is.
        stage: Stage,
    },
}

impl AlertPhase {
    /// Whether an alert is being presented.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

/// An alert-worthy event waiting for the machine's verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCandidate {
    /// Place label.
    pub place: String,
    /// Magnitude.
    pub magnitude: f64,
    /// Estimated seconds until shaking.
    pub eta_seconds: i64,
}

/// Verdict of [`AlertMachine::try_activate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// The machine went `Idle -> Active`; the alert must be dispatched.
    Triggered(TriggeredAlert),
    /// Another alert is active; the candidate was dropped.
    Suppressed {
        /// The alert that is currently presented.
        active: AlertId,
    },
}

/// Single process-wide alert state.
#[derive(Debug)]
pub struct AlertMachine {
    phase: watch::Sender<AlertPhase>,
    timing: PresentationTiming,
}

impl AlertMachine {
    /// Create an idle machine.
    pub fn new(timing: PresentationTiming) -> Self {
        let (phase, _) = watch::channel(AlertPhase::Idle);
        Self { phase, timing }
    }

    /// Current phase.
    pub fn phase(&self) -> AlertPhase {
        *self.phase.borrow()
    }

    /// Whether an alert is being presented.
    pub fn is_active(&self) -> bool {
        self.phase().is_active()
    }

    /// Presentation timers.
    pub const fn timing(&self) -> PresentationTiming {
        self.timing
    }

    /// Watch phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<AlertPhase> {
        self.phase.subscribe()
    }

    /// Attempt the `Idle -> Active` transition for `candidate`.
    ///
    /// The check and the transition happen under one lock, so two
    /// candidates can never both win.
    pub fn try_activate(&self, candidate: AlertCandidate) -> Activation {
        let id = AlertId::new();
        let mut already_active = None;
        self.phase.send_if_modified(|phase| match *phase {
            AlertPhase::Idle => {
                *phase = AlertPhase::Active {
                    id,
                    stage: Stage::Visible,
                };
                true
            }
            AlertPhase::Active { id: active, .. } => {
                already_active = Some(active);
                false
            }
        });

        if let Some(active) = already_active {
            info!(
                place = %candidate.place,
                magnitude = candidate.magnitude,
                active_alert = %active,
                "alert suppressed, another alert is active"
            );
            return Activation::Suppressed { active };
        }

        info!(
            alert_id = %id,
            place = %candidate.place,
            magnitude = candidate.magnitude,
            eta_seconds = candidate.eta_seconds,
            "alert triggered"
        );
        Activation::Triggered(TriggeredAlert {
            id,
            place: candidate.place,
            magnitude: candidate.magnitude,
            eta_seconds: candidate.eta_seconds,
        })
    }

    /// Run the presentation cycle of alert `id` to completion: hold for
    /// the dwell time, call `hide`, wait the transition delay, return to
    /// `Idle`.
    ///
    /// Both deadlines are fixed when the call starts, so a late wake-up
    /// does not push the release back. Callers spawn this and never abort it.
    pub async fn run_presentation<F>(&self, id: AlertId, hide: F)
    where
        F: FnOnce(),
    {
        // Config validation caps both durations at minutes.
        #[allow(clippy::arithmetic_side_effects)]
        let (hide_at, release_at) = {
            let hide_at = Instant::now() + self.timing.dwell;
            (hide_at, hide_at + self.timing.hide_transition)
        };

        sleep_until(hide_at).await;
        self.phase.send_if_modified(|phase| match phase {
            AlertPhase::Active { id: active, stage } if *active == id => {
                *stage = Stage::Hiding;
                true
            }
            _ => false,
        });
        debug!(alert_id = %id, "dwell elapsed, hiding alert");
        hide();

        sleep_until(release_at).await;
        let released = self.phase.send_if_modified(|phase| match phase {
            AlertPhase::Active { id: active, .. } if *active == id => {
                *phase = AlertPhase::Idle;
                true
            }
            _ => false,
        });
        if released {
            info!(alert_id = %id, "alert dismissed");
        }
    }
}

impl Default for AlertMachine {
    fn default() -> Self {
        Self::new(PresentationTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn candidate(place: &str) -> AlertCandidate {
        AlertCandidate {
            place: place.to_owned(),
            magnitude: 5.0,
            eta_seconds: 4,
        }
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn spawn_presentation(
        machine: &Arc<AlertMachine>,
        id: AlertId,
        hides: &Arc<AtomicUsize>,
    ) -> tokio::task::JoinHandle<()> {
        let machine = Arc::clone(machine);
        let hides = Arc::clone(hides);
        tokio::spawn(async move {
            machine
                .run_presentation(id, move || {
                    hides.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        })
    }

    #[test]
    fn starts_idle() {
        let machine = AlertMachine::default();
        assert_eq!(machine.phase(), AlertPhase::Idle);
        assert!(!machine.is_active());
    }

    #[test]
    fn second_candidate_is_suppressed_while_active() {
        let machine = AlertMachine::default();
        let Activation::Triggered(first) = machine.try_activate(candidate("first")) else {
            panic!("first candidate must trigger");
        };
        assert_eq!(first.place, "first");

        let second = machine.try_activate(candidate("second"));
        assert_eq!(second, Activation::Suppressed { active: first.id });
        assert_eq!(
            machine.phase(),
            AlertPhase::Active {
                id: first.id,
                stage: Stage::Visible
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn presentation_cycle_walks_visible_hiding_idle() {
        let machine = Arc::new(AlertMachine::default());
        let hides = Arc::new(AtomicUsize::new(0));
        let Activation::Triggered(alert) = machine.try_activate(candidate("a")) else {
            panic!("must trigger");
        };
        let _task = spawn_presentation(&machine, alert.id, &hides);
        settle().await;

        tokio::time::advance(Duration::from_millis(4_999)).await;
        settle().await;
        assert_eq!(
            machine.phase(),
            AlertPhase::Active {
                id: alert.id,
                stage: Stage::Visible
            }
        );
        assert_eq!(hides.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(
            machine.phase(),
            AlertPhase::Active {
                id: alert.id,
                stage: Stage::Hiding
            }
        );
        assert_eq!(hides.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(299)).await;
        settle().await;
        assert!(machine.is_active());

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(machine.phase(), AlertPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn candidates_during_hide_transition_are_still_dropped() {
        let machine = Arc::new(AlertMachine::default());
        let hides = Arc::new(AtomicUsize::new(0));
        let Activation::Triggered(alert) = machine.try_activate(candidate("a")) else {
            panic!("must trigger");
        };
        let _task = spawn_presentation(&machine, alert.id, &hides);
        settle().await;

        tokio::time::advance(Duration::from_millis(5_100)).await;
        settle().await;
        assert!(matches!(
            machine.try_activate(candidate("late")),
            Activation::Suppressed { .. }
        ));

        tokio::time::advance(Duration::from_millis(200)).await;
        settle().await;
        assert!(matches!(
            machine.try_activate(candidate("after")),
            Activation::Triggered(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn late_wake_up_does_not_delay_release() {
        let machine = Arc::new(AlertMachine::default());
        let hides = Arc::new(AtomicUsize::new(0));
        let Activation::Triggered(alert) = machine.try_activate(candidate("a")) else {
            panic!("must trigger");
        };
        let _task = spawn_presentation(&machine, alert.id, &hides);
        settle().await;

        // One jump past the dwell deadline and most of the transition.
        tokio::time::advance(Duration::from_millis(5_299)).await;
        settle().await;
        assert_eq!(hides.load(Ordering::SeqCst), 1);
        assert!(machine.is_active());

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(machine.phase(), AlertPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_every_transition() {
        let machine = Arc::new(AlertMachine::new(PresentationTiming {
            dwell: Duration::from_secs(1),
            hide_transition: Duration::from_millis(10),
        }));
        let mut rx = machine.subscribe();
        let hides = Arc::new(AtomicUsize::new(0));
        let Activation::Triggered(alert) = machine.try_activate(candidate("a")) else {
            panic!("must trigger");
        };
        assert!(rx.has_changed().unwrap_or(false));
        rx.borrow_and_update();

        let task = spawn_presentation(&machine, alert.id, &hides);
        assert!(rx.changed().await.is_ok());
        assert!(matches!(
            *rx.borrow_and_update(),
            AlertPhase::Active {
                stage: Stage::Hiding,
                ..
            }
        ));
        assert!(rx.changed().await.is_ok());
        assert_eq!(*rx.borrow_and_update(), AlertPhase::Idle);
        assert!(task.await.is_ok());
    }
}
