//! `arx-spatial-validation` – the gate between AR capture and the building
//! model.
//!
//! # Modules
//!
//! - [`config`] – [`ValidatorConfig`]: distance, confidence and age
//!   thresholds, with `SPATIAL_*` environment overrides.
//! - [`validator`] – [`SpatialValidator`]: structural, geometric, temporal
//!   and confidence checks for anchors, navigation paths, instructions,
//!   overlays and session telemetry.
//! - [`gate`] – [`PersistenceGate`]: validation followed by the movement
//!   significance check, yielding a write/skip decision.

pub mod config;
pub mod gate;
pub mod validator;

pub use config::ValidatorConfig;
pub use gate::{PersistDecision, PersistenceGate, WriteReason};
pub use validator::SpatialValidator;
