//! Notification dispatcher and its delivery channels.
//!
//! A triggered alert fans out to three independently gated channels:
//!
//! | Channel | Gate                                            |
//! |---------|-------------------------------------------------|
//! | banner  | none, always shown                              |
//! | audio   | audio initialised by a user command, sound set  |
//! | push    | notification permission is `granted`            |
//!
//! Audio and push run as detached tasks. Their failures are logged and
//! never reach the caller, so one channel failing cannot hold up another.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use quakewatch_core::config::{AudioConfig, NotificationConfig};
use quakewatch_core::messages;
use quakewatch_types::{Language, Permission, TriggeredAlert};
use tracing::{debug, error, info, warn};

use crate::error::{ChannelError, MonitorError};
use crate::present::Presenter;

/// Timeout for a single push request.
const PUSH_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

/// Plays the alert sound through an external player command.
///
/// Playback stays disabled until [`AudioChannel::initialize`] is called
/// from a user interaction.
#[derive(Debug)]
pub struct AudioChannel {
    player: String,
    sound_path: Option<PathBuf>,
    initialized: AtomicBool,
}

impl AudioChannel {
    /// Create an uninitialised channel.
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            player: config.player.clone(),
            sound_path: config.sound_path.as_ref().map(PathBuf::from),
            initialized: AtomicBool::new(false),
        }
    }

    /// Mark audio as usable. Returns `true` only for the first call.
    pub fn initialize(&self) -> bool {
        let first = !self.initialized.swap(true, Ordering::SeqCst);
        if first {
            info!(player = %self.player, "audio context is set");
        }
        first
    }

    /// Whether a user interaction has initialised audio.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Whether a sound resource is configured.
    pub const fn has_sound(&self) -> bool {
        self.sound_path.is_some()
    }

    /// Play the alert sound once and wait for the player to exit.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Playback`] if no sound is configured, the
    /// player cannot be started, or it exits unsuccessfully.
    pub async fn play(&self) -> Result<(), ChannelError> {
        let Some(path) = &self.sound_path else {
            return Err(ChannelError::Playback("no sound resource configured".to_owned()));
        };
        let status = tokio::process::Command::new(&self.player)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| ChannelError::Playback(format!("failed to start {}: {e}", self.player)))?;
        if !status.success() {
            return Err(ChannelError::Playback(format!("{} exited with {status}", self.player)));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

/// Delivers push notifications as JSON posts to a configured endpoint.
#[derive(Debug, Clone)]
pub struct PushChannel {
    client: reqwest::Client,
    url: Option<String>,
    initial: Permission,
}

impl PushChannel {
    /// Create the channel from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::HttpClient`] if the client cannot be built.
    pub fn new(config: &NotificationConfig) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder()
            .timeout(PUSH_TIMEOUT)
            .build()
            .map_err(|e| MonitorError::HttpClient(format!("push client: {e}")))?;
        Ok(Self {
            client,
            url: config.push_url.clone(),
            initial: config.initial_permission,
        })
    }

    /// Permission state at startup. Without an endpoint push is
    /// unsupported.
    pub const fn query_permission(&self) -> Permission {
        if self.url.is_some() {
            self.initial
        } else {
            Permission::Unsupported
        }
    }

    /// Ask for permission. Granted whenever an endpoint is configured.
    pub fn request_permission(&self) -> Permission {
        if self.url.is_some() {
            info!("notification permission granted");
            Permission::Granted
        } else {
            warn!("notification permission denied, no push endpoint configured");
            Permission::Denied
        }
    }

    /// Stop receiving pushes.
    pub fn unsubscribe(&self) {
        info!(endpoint = ?self.url, "push notification unsubscribed");
    }

    /// Send one notification.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::PermissionUnavailable`] without an endpoint,
    /// or [`ChannelError::Push`] if the request fails or is rejected.
    pub async fn show(&self, title: &str, body: &str) -> Result<(), ChannelError> {
        let Some(url) = &self.url else {
            return Err(ChannelError::PermissionUnavailable(
                "no push endpoint configured".to_owned(),
            ));
        };
        let payload = serde_json::json!({ "title": title, "body": body });
        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError::Push(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Push(format!("endpoint returned {status}")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// What the dispatcher did with one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// Delivery started.
    Dispatched,
    /// The channel's gate was closed.
    Skipped(&'static str),
}

/// Per-channel result of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Audio channel.
    pub audio: ChannelOutcome,
    /// Push channel.
    pub push: ChannelOutcome,
}

/// Fans a triggered alert out to banner, audio and push.
#[derive(Clone)]
pub struct NotificationDispatcher {
    presenter: Arc<dyn Presenter>,
    audio: Arc<AudioChannel>,
    push: Arc<PushChannel>,
}

impl NotificationDispatcher {
    /// Create a dispatcher over the given channels.
    pub const fn new(
        presenter: Arc<dyn Presenter>,
        audio: Arc<AudioChannel>,
        push: Arc<PushChannel>,
    ) -> Self {
        Self {
            presenter,
            audio,
            push,
        }
    }

    /// Present `alert` on every channel whose gate is open.
    ///
    /// Must be called from within a tokio runtime. Returns once the banner
    /// is shown and the other deliveries are started.
    pub fn dispatch(
        &self,
        alert: &TriggeredAlert,
        language: Language,
        notification: Permission,
    ) -> DispatchReport {
        let body = messages::alert_message(alert, language);
        self.presenter.show_banner(&messages::banner_text(alert, language));

        let audio = self.dispatch_audio(alert);
        let push = self.dispatch_push(alert, messages::push_title(language), body, notification);
        debug!(alert_id = %alert.id, ?audio, ?push, "alert dispatched");
        DispatchReport { audio, push }
    }

    fn dispatch_audio(&self, alert: &TriggeredAlert) -> ChannelOutcome {
        if !self.audio.is_initialized() {
            error!(alert_id = %alert.id, "audio context or sound not initialized");
            return ChannelOutcome::Skipped("audio not initialized");
        }
        if !self.audio.has_sound() {
            error!(alert_id = %alert.id, "no sound resource configured");
            return ChannelOutcome::Skipped("no sound resource");
        }
        let audio = Arc::clone(&self.audio);
        let id = alert.id;
        tokio::spawn(async move {
            if let Err(e) = audio.play().await {
                error!(alert_id = %id, error = %e, "audio playback failed");
            }
        });
        ChannelOutcome::Dispatched
    }

    fn dispatch_push(
        &self,
        alert: &TriggeredAlert,
        title: String,
        body: String,
        notification: Permission,
    ) -> ChannelOutcome {
        match notification {
            Permission::Granted => {}
            Permission::Denied => {
                warn!(alert_id = %alert.id, "notification permission denied, cannot send push notification");
                return ChannelOutcome::Skipped("permission denied");
            }
            Permission::Prompt | Permission::Unknown => {
                info!(alert_id = %alert.id, "notification permission not yet granted");
                return ChannelOutcome::Skipped("permission not decided");
            }
            Permission::Unsupported => {
                debug!(alert_id = %alert.id, "push notifications unsupported");
                return ChannelOutcome::Skipped("push unsupported");
            }
        }
        let push = Arc::clone(&self.push);
        let id = alert.id;
        tokio::spawn(async move {
            if let Err(e) = push.show(&title, &body).await {
                warn!(alert_id = %id, error = %e, "push notification failed");
            }
        });
        ChannelOutcome::Dispatched
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use quakewatch_core::alert::AlertPhase;
    use quakewatch_core::messages::StaticLabels;
    use quakewatch_core::session::SessionView;
    use quakewatch_types::{AlertId, DisplayLists, MapCommand};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Default)]
    struct Banners(Mutex<Vec<String>>);

    impl Presenter for Banners {
        fn draw(&self, _: &[MapCommand]) {}
        fn render_lists(&self, _: &DisplayLists, _: Language) {}
        fn render_labels(&self, _: &StaticLabels) {}
        fn set_loading(&self, _: bool) {}
        fn show_banner(&self, text: &str) {
            if let Ok(mut shown) = self.0.lock() {
                shown.push(text.to_owned());
            }
        }
        fn hide_banner(&self) {}
        fn show_status(&self, _: &SessionView, _: AlertPhase) {}
    }

    fn alert() -> TriggeredAlert {
        TriggeredAlert {
            id: AlertId::new(),
            place: "Awash".to_owned(),
            magnitude: 4.5,
            eta_seconds: 2,
        }
    }

    fn push_channel(url: Option<String>) -> Arc<PushChannel> {
        let config = NotificationConfig {
            push_url: url,
            initial_permission: Permission::Granted,
        };
        match PushChannel::new(&config) {
            Ok(push) => Arc::new(push),
            Err(e) => panic!("push: {e}"),
        }
    }

    fn audio(player: &str, sound: Option<&str>) -> Arc<AudioChannel> {
        Arc::new(AudioChannel::new(&AudioConfig {
            sound_path: sound.map(ToOwned::to_owned),
            player: player.to_owned(),
        }))
    }

    #[test]
    fn audio_initializes_once() {
        let channel = audio("true", Some("alert.wav"));
        assert!(!channel.is_initialized());
        assert!(channel.initialize());
        assert!(!channel.initialize());
        assert!(channel.is_initialized());
    }

    #[test]
    fn push_permission_depends_on_endpoint() {
        let without = push_channel(None);
        assert_eq!(without.query_permission(), Permission::Unsupported);
        assert_eq!(without.request_permission(), Permission::Denied);

        let with = push_channel(Some("http://127.0.0.1:1/push".to_owned()));
        assert_eq!(with.query_permission(), Permission::Granted);
        assert_eq!(with.request_permission(), Permission::Granted);
    }

    #[tokio::test]
    async fn playback_failures_surface_as_playback_errors() {
        let missing_sound = audio("true", None);
        assert!(matches!(missing_sound.play().await, Err(ChannelError::Playback(_))));

        let missing_player = audio("quakewatch-no-such-player", Some("alert.wav"));
        assert!(matches!(missing_player.play().await, Err(ChannelError::Playback(_))));
    }

    #[tokio::test]
    async fn push_posts_title_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/push"))
            .and(body_partial_json(serde_json::json!({ "title": "Earthquake Alert!" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let push = push_channel(Some(format!("{}/push", server.uri())));
        assert!(push.show("Earthquake Alert!", "body").await.is_ok());
    }

    #[tokio::test]
    async fn rejected_push_is_push_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let push = push_channel(Some(server.uri()));
        assert!(matches!(push.show("t", "b").await, Err(ChannelError::Push(_))));
    }

    #[tokio::test]
    async fn each_channel_is_gated_independently() {
        let banners = Arc::new(Banners::default());
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&banners) as Arc<dyn Presenter>,
            audio("true", Some("alert.wav")),
            push_channel(None),
        );

        let report = dispatcher.dispatch(&alert(), Language::En, Permission::Denied);
        assert_eq!(report.audio, ChannelOutcome::Skipped("audio not initialized"));
        assert_eq!(report.push, ChannelOutcome::Skipped("permission denied"));

        let report = dispatcher.dispatch(&alert(), Language::En, Permission::Prompt);
        assert_eq!(report.push, ChannelOutcome::Skipped("permission not decided"));

        let report = dispatcher.dispatch(&alert(), Language::En, Permission::Unknown);
        assert_eq!(report.push, ChannelOutcome::Skipped("permission not decided"));

        let shown = banners.0.lock().map(|b| b.len()).unwrap_or_default();
        assert_eq!(shown, 3);
    }

    #[tokio::test]
    async fn initialized_audio_without_sound_is_skipped() {
        let banners = Arc::new(Banners::default());
        let silent = audio("true", None);
        silent.initialize();
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&banners) as Arc<dyn Presenter>,
            silent,
            push_channel(None),
        );

        let report = dispatcher.dispatch(&alert(), Language::En, Permission::Unsupported);
        assert_eq!(report.audio, ChannelOutcome::Skipped("no sound resource"));
        assert_eq!(report.push, ChannelOutcome::Skipped("push unsupported"));

        let shown = banners.0.lock().map(|b| b.len()).unwrap_or_default();
        assert_eq!(shown, 1);
    }

    #[tokio::test]
    async fn failing_push_does_not_block_banner_or_audio() {
        let banners = Arc::new(Banners::default());
        let sound = audio("quakewatch-no-such-player", Some("alert.wav"));
        sound.initialize();
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&banners) as Arc<dyn Presenter>,
            sound,
            push_channel(Some("http://127.0.0.1:1/push".to_owned())),
        );

        let report = dispatcher.dispatch(&alert(), Language::Am, Permission::Granted);
        assert_eq!(report.audio, ChannelOutcome::Dispatched);
        assert_eq!(report.push, ChannelOutcome::Dispatched);

        let banner = banners.0.lock().ok().and_then(|b| b.first().cloned());
        assert!(banner.is_some_and(|text| text.contains("Awash")));
    }
}
