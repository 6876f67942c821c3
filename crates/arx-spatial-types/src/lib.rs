//! `arx-spatial-types` – shared value types for the building spatial engine.
//!
//! Plain data only: the transform and validation crates depend on these
//! types, and the service layer persists the [`wire`] shapes.
//!
//! # Modules
//!
//! - [`coords`] – WGS84 / building-local / grid coordinates, [`Quaternion`],
//!   [`BoundingBox`].
//! - [`kinds`] – closed enums ([`Platform`], [`InstructionType`], …) with
//!   canonical wire strings.
//! - [`anchor`] – [`SpatialAnchor`] and [`ConfidenceLevel`].
//! - [`ar`] – navigation paths, instructions, overlays and session metrics.
//! - [`wire`] – [`AnchorRecord`] and its position/rotation/scale shapes.
//! - [`error`] – [`ValidationError`] and its [`FailureClass`].

pub mod anchor;
pub mod ar;
pub mod coords;
pub mod error;
pub mod kinds;
pub mod wire;

pub use anchor::{ConfidenceLevel, SpatialAnchor};
pub use ar::{ArInstruction, ArNavigationPath, ArSessionMetrics, ArVisualization};
pub use coords::{
    BoundingBox, CoordinateSystem, GridCoordinate, LocalCoordinate, Quaternion, Wgs84Coordinate,
};
pub use error::{FailureClass, ValidationError};
pub use kinds::{
    Animation, Difficulty, InstructionType, Platform, Priority, ThermalState, ValidationStatus,
    VisualizationType,
};
pub use wire::{AnchorRecord, SpatialPosition, SpatialRotation, SpatialScale};
