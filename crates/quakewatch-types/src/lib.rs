//! Shared type definitions for the Quakewatch monitor.
//!
//! This crate is the single source of truth for the data model used by the
//! decision pipeline and the runner: coordinates and regions, seismic
//! events and their impact assessments, permission and language settings,
//! and the draw/display payloads handed to presentation collaborators.
//!
//! # Modules
//!
//! - [`geo`] -- Coordinates and bounding-box regions
//! - [`event`] -- Seismic events, impact assessments, triggered alerts
//! - [`enums`] -- Permission and language enumerations
//! - [`ids`] -- Type-safe UUID wrappers
//! - [`display`] -- Display-list rows and map draw commands

pub mod display;
pub mod enums;
pub mod event;
pub mod geo;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use display::{CircleOverlay, DisplayLists, HistoryEntry, MapCommand, PointMarker, RealtimeEntry};
pub use enums::{Language, Permission, PermissionState};
pub use event::{ImpactAssessment, SeismicEvent, TriggeredAlert};
pub use geo::{Coordinate, Region};
pub use ids::AlertId;
