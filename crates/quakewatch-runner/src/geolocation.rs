//! User location providers.
//!
//! Enum dispatch over the configured source, in place of an async trait
//! object. Each provider answers a permission query and, when allowed,
//! a single position request.

use std::time::Duration;

use quakewatch_core::config::{LocationConfig, LocationProvider};
use quakewatch_core::session::Session;
use quakewatch_types::{Coordinate, Permission};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ChannelError, MonitorError};

/// A source of the user's position.
#[derive(Debug, Clone)]
pub enum Geolocator {
    /// A fixed coordinate from configuration. Always granted.
    Fixed(Coordinate),
    /// Position derived from the public IP address. Reports `prompt`.
    Ip(IpLookup),
    /// Location disabled by configuration. Always denied.
    Disabled,
}

impl Geolocator {
    /// Build the configured provider.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::HttpClient`] if the lookup client cannot
    /// be built.
    pub fn from_config(config: &LocationConfig) -> Result<Self, MonitorError> {
        Ok(match (config.provider, config.fixed) {
            (LocationProvider::Fixed, Some(at)) => Self::Fixed(at),
            (LocationProvider::Fixed | LocationProvider::Disabled, _) => Self::Disabled,
            (LocationProvider::Ip, _) => Self::Ip(IpLookup::new(
                &config.lookup_url,
                Duration::from_secs(config.request_timeout_secs),
            )?),
        })
    }

    /// Current permission state of this provider.
    pub const fn query_permission(&self) -> Permission {
        match self {
            Self::Fixed(_) => Permission::Granted,
            Self::Ip(_) => Permission::Prompt,
            Self::Disabled => Permission::Denied,
        }
    }

    /// Request the current position.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::PermissionUnavailable`] for a disabled
    /// provider or a failed lookup.
    pub async fn current_position(&self) -> Result<Coordinate, ChannelError> {
        match self {
            Self::Fixed(at) => Ok(*at),
            Self::Ip(lookup) => lookup.locate().await,
            Self::Disabled => Err(ChannelError::PermissionUnavailable(
                "geolocation disabled".to_owned(),
            )),
        }
    }

    /// Provider name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fixed(_) => "fixed",
            Self::Ip(_) => "ip",
            Self::Disabled => "disabled",
        }
    }
}

/// Resolve the user location once and store it in `session`.
///
/// The permission is recorded first so that snapshots evaluated while the
/// position request is in flight already see it. On any failure the
/// session keeps its default location.
pub async fn resolve(geolocator: &Geolocator, session: &Session) {
    let permission = geolocator.query_permission();
    session.set_geolocation_permission(permission);
    info!(provider = geolocator.name(), permission = %permission, "geolocation permission resolved");

    if !permission.allows_location() {
        return;
    }

    match geolocator.current_position().await {
        Ok(at) => session.set_user_location(at),
        Err(e) => warn!(
            provider = geolocator.name(),
            error = %e,
            fallback = %session.user_location(),
            "unable to get geolocation, using default location"
        ),
    }
}

// ---------------------------------------------------------------------------
// IP lookup
// ---------------------------------------------------------------------------

/// Lookup response. Accepts both `latitude`/`longitude` and `lat`/`lon`.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lon")]
    longitude: f64,
}

/// Looks the user up through a JSON geolocation endpoint.
#[derive(Debug, Clone)]
pub struct IpLookup {
    client: reqwest::Client,
    url: String,
}

impl IpLookup {
    /// Create a lookup against `url`.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::HttpClient`] if the client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::HttpClient(format!("geolocation client: {e}")))?;
        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    async fn locate(&self) -> Result<Coordinate, ChannelError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ChannelError::PermissionUnavailable(format!("lookup failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::PermissionUnavailable(format!(
                "lookup returned {status}"
            )));
        }

        let body: LookupResponse = response.json().await.map_err(|e| {
            ChannelError::PermissionUnavailable(format!("lookup response parse failed: {e}"))
        })?;
        Ok(Coordinate::new(body.latitude, body.longitude))
    }
}
