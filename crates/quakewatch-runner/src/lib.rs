//! Runtime side of the Quakewatch monitor.
//!
//! Everything that talks to the outside world lives here: the seismic
//! feed, the geolocation lookup, the push endpoint, the alert sound player
//! and the terminal. The decisions themselves come from `quakewatch_core`.
//!
//! # Modules
//!
//! - [`monitor`] -- The [`Monitor`] loop tying everything together.
//! - [`feed`] -- GeoJSON feed client.
//! - [`geolocation`] -- User location providers.
//! - [`notify`] -- Notification dispatcher with banner, audio and push
//!   channels.
//! - [`present`] -- The [`Presenter`] collaborator and its terminal
//!   implementation.
//! - [`console`] -- Console command parsing.
//! - [`error`] -- Feed, channel and startup errors.
//!
//! [`Monitor`]: monitor::Monitor
//! [`Presenter`]: present::Presenter

pub mod console;
pub mod error;
pub mod feed;
pub mod geolocation;
pub mod monitor;
pub mod notify;
pub mod present;
