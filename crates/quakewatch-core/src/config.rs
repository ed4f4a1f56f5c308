//! Configuration loading and typed config structures for the monitor.
//!
//! The configuration lives in `quakewatch.yaml`. Every field has a default,
//! so an empty or missing file yields a working monitor for the Ethiopia
//! region. A handful of environment variables override the YAML after
//! parsing, which lets deployments change endpoints without editing files.

use std::path::Path;
use std::time::Duration;

use quakewatch_types::{Coordinate, Language, Permission, Region};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::alert::PresentationTiming;
use crate::impact::{DEFAULT_RADIUS_KM_PER_MAGNITUDE, DEFAULT_WAVE_SPEED_KM_S, ImpactModel};
use crate::pipeline::{DEFAULT_MAX_ETA_SECS, DEFAULT_MIN_MAGNITUDE, Thresholds};
use crate::region::ETHIOPIA;

/// Env var naming the config file when no CLI argument is given.
pub const CONFIG_PATH_ENV: &str = "QUAKEWATCH_CONFIG";

/// Default config file name.
pub const DEFAULT_CONFIG_PATH: &str = "quakewatch.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The YAML parsed but a value is out of range.
    #[error("invalid configuration: {source}")]
    Invalid {
        /// Every failed rule, keyed by field path.
        #[from]
        source: validator::ValidationErrors,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level monitor configuration, mirroring `quakewatch.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct MonitorConfig {
    /// Seismic feed endpoint and cadence.
    #[serde(default)]
    #[validate(nested)]
    pub feed: FeedConfig,

    /// Monitored bounding box.
    #[serde(default)]
    #[validate(nested)]
    pub region: RegionConfig,

    /// User location source.
    #[serde(default)]
    #[validate(nested)]
    pub location: LocationConfig,

    /// Alert thresholds and presentation timing.
    #[serde(default)]
    #[validate(nested)]
    pub alert: AlertConfig,

    /// Impact model coefficients.
    #[serde(default)]
    #[validate(nested)]
    pub impact: ImpactConfig,

    /// Push notification settings.
    #[serde(default)]
    #[validate(nested)]
    pub notifications: NotificationConfig,

    /// Alert sound settings.
    #[serde(default)]
    #[validate(nested)]
    pub audio: AudioConfig,

    /// Initial display language.
    #[serde(default)]
    pub language: Language,
}

impl MonitorConfig {
    /// Load configuration from a YAML file, applying process env overrides.
    ///
    /// A file that does not exist yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };
        Self::parse_with_env(&contents, |key| std::env::var(key).ok())
    }

    /// Parse configuration from a YAML string without env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Invalid`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse_with_env(yaml, |_| None)
    }

    /// Parse configuration, then apply overrides looked up through `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Invalid`].
    pub fn parse_with_env<F>(yaml: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides(env);
        config.validate()?;
        Ok(config)
    }

    /// Override endpoints and language with environment variables when set:
    /// - `QUAKEWATCH_FEED_URL` overrides `feed.url`
    /// - `QUAKEWATCH_PUSH_URL` overrides `notifications.push_url`
    /// - `QUAKEWATCH_LANGUAGE` overrides `language` (unknown codes ignored)
    pub fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = env("QUAKEWATCH_FEED_URL") {
            self.feed.url = val;
        }
        if let Some(val) = env("QUAKEWATCH_PUSH_URL") {
            self.notifications.push_url = Some(val);
        }
        if let Some(lang) = env("QUAKEWATCH_LANGUAGE").as_deref().and_then(Language::from_code) {
            self.language = lang;
        }
    }

    /// Thresholds for the decision pipeline.
    pub const fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_magnitude: self.alert.min_magnitude,
            max_eta_secs: self.alert.max_eta_secs,
        }
    }

    /// Impact model coefficients.
    pub const fn impact_model(&self) -> ImpactModel {
        ImpactModel {
            radius_km_per_magnitude: self.impact.radius_km_per_magnitude,
            wave_speed_km_s: self.impact.wave_speed_km_s,
        }
    }

    /// Alert presentation timing.
    pub const fn presentation_timing(&self) -> PresentationTiming {
        PresentationTiming {
            dwell: Duration::from_millis(self.alert.dwell_ms),
            hide_transition: Duration::from_millis(self.alert.hide_transition_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Seismic feed settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct FeedConfig {
    /// GeoJSON summary feed URL.
    #[serde(default = "default_feed_url")]
    #[validate(url)]
    pub url: String,

    /// Seconds between polls.
    #[serde(default = "default_poll_interval_secs")]
    #[validate(range(min = 1))]
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
}

impl FeedConfig {
    /// Poll cadence.
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Request timeout.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Bounding box of the monitored area.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "validate_region"))]
pub struct RegionConfig {
    /// Northern latitude bound.
    #[serde(default = "default_north")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub north: f64,

    /// Southern latitude bound.
    #[serde(default = "default_south")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub south: f64,

    /// Eastern longitude bound.
    #[serde(default = "default_east")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub east: f64,

    /// Western longitude bound.
    #[serde(default = "default_west")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub west: f64,
}

impl RegionConfig {
    /// The configured region.
    pub const fn region(&self) -> Region {
        Region {
            north: self.north,
            south: self.south,
            east: self.east,
            west: self.west,
        }
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            north: default_north(),
            south: default_south(),
            east: default_east(),
            west: default_west(),
        }
    }
}

fn validate_region(region: &RegionConfig) -> Result<(), ValidationError> {
    if region.south > region.north || region.west > region.east {
        return Err(ValidationError::new("inverted_bounds"));
    }
    Ok(())
}

/// Where the user location comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvider {
    /// Look the location up from the public IP address.
    #[default]
    Ip,
    /// Use `location.fixed`.
    Fixed,
    /// Never locate the user.
    Disabled,
}

/// User location settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "validate_location"))]
pub struct LocationConfig {
    /// Location used until (or unless) a provider reports one.
    #[serde(default = "default_location")]
    pub default: Coordinate,

    /// Location source.
    #[serde(default)]
    pub provider: LocationProvider,

    /// Coordinate reported by the `fixed` provider.
    #[serde(default)]
    pub fixed: Option<Coordinate>,

    /// JSON endpoint queried by the `ip` provider.
    #[serde(default = "default_lookup_url")]
    #[validate(url)]
    pub lookup_url: String,

    /// Per-request timeout for the lookup, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            default: default_location(),
            provider: LocationProvider::default(),
            fixed: None,
            lookup_url: default_lookup_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn validate_location(location: &LocationConfig) -> Result<(), ValidationError> {
    if location.provider == LocationProvider::Fixed && location.fixed.is_none() {
        return Err(ValidationError::new("fixed_provider_without_coordinate"));
    }
    Ok(())
}

/// Alert thresholds and timing.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct AlertConfig {
    /// Minimum magnitude for realtime listing and alerting.
    #[serde(default = "default_min_magnitude")]
    #[validate(range(min = 0.0))]
    pub min_magnitude: f64,

    /// Alert horizon in seconds.
    #[serde(default = "default_max_eta_secs")]
    #[validate(range(min = 1))]
    pub max_eta_secs: i64,

    /// How long the banner stays fully visible, in milliseconds.
    #[serde(default = "default_dwell_ms")]
    #[validate(range(max = 600_000))]
    pub dwell_ms: u64,

    /// Duration of the hide transition, in milliseconds.
    #[serde(default = "default_hide_transition_ms")]
    #[validate(range(max = 60_000))]
    pub hide_transition_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_magnitude: default_min_magnitude(),
            max_eta_secs: default_max_eta_secs(),
            dwell_ms: default_dwell_ms(),
            hide_transition_ms: default_hide_transition_ms(),
        }
    }
}

/// Impact model coefficients.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct ImpactConfig {
    /// Affected radius per unit of magnitude, in km.
    #[serde(default = "default_radius_km_per_magnitude")]
    #[validate(range(exclusive_min = 0.0))]
    pub radius_km_per_magnitude: f64,

    /// Wave propagation speed in km/s.
    #[serde(default = "default_wave_speed_km_s")]
    #[validate(range(exclusive_min = 0.0))]
    pub wave_speed_km_s: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            radius_km_per_magnitude: default_radius_km_per_magnitude(),
            wave_speed_km_s: default_wave_speed_km_s(),
        }
    }
}

/// Push notification settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct NotificationConfig {
    /// Endpoint that receives alert pushes. Without it push stays denied.
    #[serde(default)]
    #[validate(url)]
    pub push_url: Option<String>,

    /// Notification permission at startup.
    #[serde(default)]
    pub initial_permission: Permission,
}

/// Alert sound settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct AudioConfig {
    /// Sound file played on alert. Without it the audio channel is skipped.
    #[serde(default)]
    pub sound_path: Option<String>,

    /// Command used to play `sound_path`.
    #[serde(default = "default_player")]
    #[validate(length(min = 1))]
    pub player: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sound_path: None,
            player: default_player(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_feed_url() -> String {
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson".to_owned()
}

const fn default_poll_interval_secs() -> u64 {
    30
}

const fn default_request_timeout_secs() -> u64 {
    10
}

const fn default_north() -> f64 {
    ETHIOPIA.north
}

const fn default_south() -> f64 {
    ETHIOPIA.south
}

const fn default_east() -> f64 {
    ETHIOPIA.east
}

const fn default_west() -> f64 {
    ETHIOPIA.west
}

const fn default_location() -> Coordinate {
    Coordinate::new(9.145, 40.489_673)
}

fn default_lookup_url() -> String {
    "https://ipapi.co/json/".to_owned()
}

const fn default_min_magnitude() -> f64 {
    DEFAULT_MIN_MAGNITUDE
}

const fn default_max_eta_secs() -> i64 {
    DEFAULT_MAX_ETA_SECS
}

const fn default_dwell_ms() -> u64 {
    5000
}

const fn default_hide_transition_ms() -> u64 {
    300
}

const fn default_radius_km_per_magnitude() -> f64 {
    DEFAULT_RADIUS_KM_PER_MAGNITUDE
}

const fn default_wave_speed_km_s() -> f64 {
    DEFAULT_WAVE_SPEED_KM_S
}

fn default_player() -> String {
    "paplay".to_owned()
}
