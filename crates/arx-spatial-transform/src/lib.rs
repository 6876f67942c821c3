//! `arx-spatial-transform` – building coordinate frames.
//!
//! Pure, infallible arithmetic that reconciles GPS fixes, building-local
//! millimetres and the coarse display grid for one building.
//!
//! # Modules
//!
//! - [`transform`] – [`CoordinateTransformer`][transform::CoordinateTransformer]:
//!   bidirectional WGS84 ↔ local ↔ grid conversion for a building origin and
//!   rotation.
//! - [`movement`] – [`GridQuantizer`][movement::GridQuantizer] and
//!   [`MovementFilter`][movement::MovementFilter]: decides whether a repeated
//!   position update crossed a grid-cell boundary and is worth persisting.
//! - [`geometry`] – distance, bearing and the nearby-equipment ranking used
//!   by proximity queries.

pub mod geometry;
pub mod movement;
pub mod transform;

pub use geometry::{Nearby, bearing_degrees, equirectangular_distance_m, euclidean_distance, rank_nearby};
pub use movement::{GridQuantizer, MovementFilter};
pub use transform::{CoordinateTransformer, EARTH_RADIUS_M, TransformParams};
