//! The monitor loop: feed polling, decision pipeline, alert presentation
//! and user commands, wired onto one task.
//!
//! ```text
//! interval tick ─┐
//! language change ├─► refresh ─► DecisionPipeline ─► Presenter
//! console command ┘                   │
//!                                     └─► triggered? ─► NotificationDispatcher
//!                                                      └─► presentation task (detached)
//! ```
//!
//! Geolocation resolves in its own detached task and only writes into the
//! session, so a snapshot may be evaluated against the default location
//! until it lands.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use quakewatch_core::config::MonitorConfig;
use quakewatch_core::messages::StaticLabels;
use quakewatch_core::pipeline::{DecisionPipeline, SnapshotOutcome};
use quakewatch_core::session::Session;
use quakewatch_types::{Permission, TriggeredAlert};
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::console::Command;
use crate::error::MonitorError;
use crate::feed::FeedClient;
use crate::geolocation::{self, Geolocator};
use crate::notify::{AudioChannel, NotificationDispatcher, PushChannel};
use crate::present::{LoadingGuard, Presenter};

/// Owns every collaborator of one monitoring session.
pub struct Monitor {
    session: Arc<Session>,
    pipeline: DecisionPipeline,
    feed: FeedClient,
    geolocator: Geolocator,
    presenter: Arc<dyn Presenter>,
    dispatcher: NotificationDispatcher,
    audio: Arc<AudioChannel>,
    push: Arc<PushChannel>,
    poll_interval: Duration,
}

impl Monitor {
    /// Build a monitor from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::HttpClient`] if an HTTP client cannot be
    /// built.
    pub fn new(config: &MonitorConfig, presenter: Arc<dyn Presenter>) -> Result<Self, MonitorError> {
        let session = Arc::new(Session::new(
            config.location.default,
            config.language,
            config.presentation_timing(),
        ));
        let pipeline = DecisionPipeline::new(
            config.region.region(),
            config.impact_model(),
            config.thresholds(),
        );
        let feed = FeedClient::new(config.feed.url.clone(), config.feed.request_timeout())?;
        let geolocator = Geolocator::from_config(&config.location)?;
        let audio = Arc::new(AudioChannel::new(&config.audio));
        let push = Arc::new(PushChannel::new(&config.notifications)?);
        let dispatcher =
            NotificationDispatcher::new(Arc::clone(&presenter), Arc::clone(&audio), Arc::clone(&push));

        Ok(Self {
            session,
            pipeline,
            feed,
            geolocator,
            presenter,
            dispatcher,
            audio,
            push,
            poll_interval: config.feed.poll_interval(),
        })
    }

    /// Shared session context.
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Audio channel, for inspecting its initialisation state.
    pub const fn audio(&self) -> &Arc<AudioChannel> {
        &self.audio
    }

    /// Run until a `quit` command arrives.
    ///
    /// Polls immediately, then every poll interval, and again whenever the
    /// language changes. When `commands` closes the monitor keeps polling.
    pub async fn run(&self, mut commands: mpsc::Receiver<Command>) {
        self.start();

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut language = self.session.subscribe_language();
        let mut console_open = true;

        info!(
            feed = self.feed.url(),
            poll_interval_secs = self.poll_interval.as_secs(),
            "monitor started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh().await;
                }
                changed = language.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let lang = *language.borrow_and_update();
                    debug!(language = %lang, "language changed, refreshing");
                    self.render_labels();
                    self.refresh().await;
                }
                command = commands.recv(), if console_open => match command {
                    Some(command) => {
                        if self.handle_command(command).is_break() {
                            break;
                        }
                    }
                    None => {
                        console_open = false;
                        debug!("console closed, polling continues");
                    }
                },
            }
        }

        info!("monitor stopped");
    }

    /// Record the startup notification permission, render the static
    /// labels and start resolving the user location in the background.
    pub fn start(&self) {
        self.session
            .set_notification_permission(self.push.query_permission());
        self.render_labels();

        let geolocator = self.geolocator.clone();
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            geolocation::resolve(&geolocator, &session).await;
        });
    }

    /// Resolve the user location in place.
    pub async fn resolve_location(&self) {
        geolocation::resolve(&self.geolocator, &self.session).await;
    }

    /// Poll the feed once and present the snapshot.
    ///
    /// On failure the previous display stays as it is and `None` is
    /// returned. The loading indicator is cleared either way.
    pub async fn refresh(&self) -> Option<SnapshotOutcome> {
        let _loading = LoadingGuard::new(self.presenter.as_ref());

        let events = match self.feed.poll().await {
            Ok(events) => events,
            Err(e) => {
                warn!(feed = self.feed.url(), error = %e, "error fetching earthquake data, keeping previous display");
                return None;
            }
        };

        let outcome = self.pipeline.evaluate(&events, &self.session);
        self.presenter.draw(&outcome.commands);
        self.presenter
            .render_lists(&outcome.lists, self.session.language());
        self.render_labels();

        if let Some(alert) = &outcome.triggered {
            self.present(alert);
        }

        info!(
            events = events.len(),
            in_region = outcome.lists.history.len(),
            realtime = outcome.lists.realtime.len(),
            triggered = outcome.triggered.is_some(),
            suppressed = outcome.suppressed,
            "snapshot processed"
        );
        Some(outcome)
    }

    /// Apply one console command. Every command counts as a user
    /// interaction and initialises audio.
    pub fn handle_command(&self, command: Command) -> ControlFlow<()> {
        self.audio.initialize();
        match command {
            Command::Language(lang) => {
                if !self.session.set_language(lang) {
                    debug!(language = %lang, "language unchanged");
                }
            }
            Command::ToggleNotifications => self.toggle_notifications(),
            Command::Sound => {}
            Command::Status => self
                .presenter
                .show_status(&self.session.view(), self.session.alerts().phase()),
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Disable push when granted, otherwise request permission.
    pub fn toggle_notifications(&self) {
        let next = if self.session.permissions().notification == Permission::Granted {
            self.push.unsubscribe();
            Permission::Prompt
        } else {
            self.push.request_permission()
        };
        self.session.set_notification_permission(next);
        self.render_labels();
    }

    fn render_labels(&self) {
        let view = self.session.view();
        self.presenter.render_labels(&StaticLabels::render(
            view.language,
            view.permissions.notification,
        ));
    }

    /// Dispatch a freshly triggered alert and start its presentation cycle.
    fn present(&self, alert: &TriggeredAlert) {
        let view = self.session.view();
        self.dispatcher
            .dispatch(alert, view.language, view.permissions.notification);

        let session = Arc::clone(&self.session);
        let presenter = Arc::clone(&self.presenter);
        let id = alert.id;
        tokio::spawn(async move {
            session
                .alerts()
                .run_presentation(id, || presenter.hide_banner())
                .await;
        });
    }
}
