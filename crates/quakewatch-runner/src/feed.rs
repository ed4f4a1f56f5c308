//! Seismic feed client.
//!
//! Fetches a GeoJSON feature collection and turns each feature into a
//! [`SeismicEvent`]. The expected shape is the public summary feed format:
//!
//! ```text
//! { "features": [ { "geometry":   { "coordinates": [lng, lat, depth] },
//!                   "properties": { "mag": 4.6, "place": "...", "time": <ms> } } ] }
//! ```
//!
//! A feature without a magnitude is skipped. Anything else that does not
//! fit the shape fails the whole snapshot.

use std::time::Duration;

use chrono::{DateTime, Utc};
use quakewatch_types::{Coordinate, SeismicEvent};
use serde::Deserialize;
use tracing::debug;

use crate::error::{FeedError, MonitorError};

/// Place shown for features the feed leaves unnamed.
const UNKNOWN_PLACE: &str = "Unknown location";

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    time: i64,
}

/// Parse a feed body into events, preserving feed order.
///
/// # Errors
///
/// Returns [`FeedError::Parse`] if the body is not a feature collection,
/// a feature has fewer than two coordinates, or a timestamp is out of range.
pub fn parse_feed(body: &str) -> Result<Vec<SeismicEvent>, FeedError> {
    let collection: FeatureCollection =
        serde_json::from_str(body).map_err(|e| FeedError::Parse(format!("invalid GeoJSON: {e}")))?;

    let mut events = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(magnitude) = feature.properties.mag else {
            debug!(place = ?feature.properties.place, "feature without magnitude, skipping");
            continue;
        };
        let [lng, lat, ..] = feature.geometry.coordinates.as_slice() else {
            return Err(FeedError::Parse(format!(
                "expected [lng, lat, depth], got {} coordinates",
                feature.geometry.coordinates.len()
            )));
        };
        let occurred_at = DateTime::<Utc>::from_timestamp_millis(feature.properties.time)
            .ok_or_else(|| {
                FeedError::Parse(format!("timestamp out of range: {}", feature.properties.time))
            })?;

        events.push(SeismicEvent {
            epicenter: Coordinate::new(*lat, *lng),
            magnitude,
            place: feature
                .properties
                .place
                .unwrap_or_else(|| UNKNOWN_PLACE.to_owned()),
            occurred_at,
        });
    }
    Ok(events)
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Polls the seismic feed over HTTP.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    url: String,
}

impl FeedClient {
    /// Create a client for `url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::HttpClient`] if the TLS backend cannot be
    /// initialised.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::HttpClient(format!("feed client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Feed URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Transport`] if the request fails or the status
    /// is not a success, or [`FeedError::Parse`] for a malformed body.
    pub async fn poll(&self) -> Result<Vec<SeismicEvent>, FeedError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedError::Transport {
                status: e.status().map(|s| s.as_u16()),
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Transport {
                status: Some(status.as_u16()),
                message: format!("feed returned {status}"),
            });
        }

        let body = response.text().await.map_err(|e| FeedError::Transport {
            status: Some(status.as_u16()),
            message: format!("failed to read body: {e}"),
        })?;

        let events = parse_feed(&body)?;
        debug!(url = %self.url, events = events.len(), "feed polled");
        Ok(events)
    }
}
