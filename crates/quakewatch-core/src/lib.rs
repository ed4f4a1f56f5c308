//! Decision logic for the Quakewatch monitor.
//!
//! Everything here is pure or in-memory: the runner fetches snapshots and
//! drives presentation, this crate decides what to show and when to alert.
//!
//! # Modules
//!
//! - [`geodesy`] -- Great-circle distance.
//! - [`region`] -- The monitored bounding box and containment test.
//! - [`impact`] -- Affected radius and shaking ETA for a user location.
//! - [`pipeline`] -- Per-snapshot filtering, classification and draw
//!   commands, via [`DecisionPipeline`].
//! - [`alert`] -- The single-active-alert state machine, [`AlertMachine`].
//! - [`session`] -- Shared session context (location, language,
//!   permissions) read by the pipeline.
//! - [`i18n`] -- Translation tables with English fallback.
//! - [`messages`] -- Localised alert, popup and list texts.
//! - [`config`] -- Configuration loading from `quakewatch.yaml`.
//!
//! [`DecisionPipeline`]: pipeline::DecisionPipeline
//! [`AlertMachine`]: alert::AlertMachine

pub mod alert;
pub mod config;
pub mod geodesy;
pub mod i18n;
pub mod impact;
pub mod messages;
pub mod pipeline;
pub mod region;
pub mod session;
