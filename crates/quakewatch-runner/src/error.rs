//! Error types for the monitor runtime.
//!
//! Only [`MonitorError`] ever reaches `main`, and only during startup. Feed
//! and channel failures are logged where they happen and absorbed.

use quakewatch_core::config::ConfigError;

/// Failure to obtain a usable snapshot from the seismic feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The feed was unreachable or answered with a non-success status.
    #[error("feed transport error{}: {message}", status_suffix(.status.as_ref()))]
    Transport {
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// What went wrong.
        message: String,
    },

    /// The body was not a valid feature collection.
    #[error("feed parse error: {0}")]
    Parse(String),
}

fn status_suffix(status: Option<&u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

/// Failure of a single presentation channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The host cannot provide the capability at all.
    #[error("permission unavailable: {0}")]
    PermissionUnavailable(String),

    /// The alert sound could not be played.
    #[error("audio playback failed: {0}")]
    Playback(String),

    /// The push endpoint rejected or never received the notification.
    #[error("push notification failed: {0}")]
    Push(String),
}

/// Errors that stop the monitor before it starts polling.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}
