//! Coordinate frames and rotation primitives.
//!
//! | Type | Frame |
//! |------|-------|
//! | [`Wgs84Coordinate`]  | Global GPS, degrees / metres.                  |
//! | [`LocalCoordinate`]  | Building-local Cartesian, millimetres.         |
//! | [`GridCoordinate`]   | Coarse display grid, integer cells and floors. |
//! | [`CoordinateSystem`] | All three for one physical point.              |

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// WGS84
// ────────────────────────────────────────────────────────────────────────────

/// A WGS84 position.  Range checks (lat ∈ [-90, 90], lon ∈ [-180, 180]) are
/// the validator's job, not the constructor's.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Wgs84Coordinate {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
    /// Metres above the reference ellipsoid.
    #[serde(default)]
    pub altitude: f64,
}

impl Wgs84Coordinate {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

impl std::fmt::Display for Wgs84Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.7}, {:.7}, {:.2} m)",
            self.latitude, self.longitude, self.altitude
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Local
// ────────────────────────────────────────────────────────────────────────────

/// A building-local position in millimetres, relative to the building's
/// reference point.  +y points along the building's north axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalCoordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LocalCoordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The building reference point.
    pub fn origin() -> Self {
        Self::default()
    }

    /// Straight-line distance to `other`, in millimetres.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Components paired with their field names, for per-axis checks.
    pub fn components(&self) -> [(&'static str, f64); 3] {
        [("x", self.x), ("y", self.y), ("z", self.z)]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Grid
// ────────────────────────────────────────────────────────────────────────────

/// A quantised grid cell.  Only ever derived from a [`LocalCoordinate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub x: i64,
    pub y: i64,
    pub floor: i64,
}

impl GridCoordinate {
    pub fn new(x: i64, y: i64, floor: i64) -> Self {
        Self { x, y, floor }
    }
}

/// One physical point expressed in all three frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    pub wgs84: Wgs84Coordinate,
    pub local: LocalCoordinate,
    pub grid: GridCoordinate,
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A rotation quaternion (w, x, y, z convention).
///
/// Construction does not normalise; use
/// [`Quaternion::normalized`] or run it through the validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// No rotation.
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `degrees` about the vertical (z) axis.
    pub fn from_yaw_degrees(degrees: f64) -> Self {
        let half = degrees.to_radians() * 0.5;
        Self::new(half.cos(), 0.0, 0.0, half.sin())
    }

    pub fn magnitude(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Scale to unit length.  A zero quaternion maps to [`Quaternion::IDENTITY`].
    pub fn normalized(&self) -> Self {
        let m = self.magnitude();
        if m == 0.0 {
            return Self::IDENTITY;
        }
        Self::new(self.w / m, self.x / m, self.y / m, self.z / m)
    }

    pub fn components(&self) -> [(&'static str, f64); 4] {
        [("w", self.w), ("x", self.x), ("y", self.y), ("z", self.z)]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BoundingBox
// ────────────────────────────────────────────────────────────────────────────

/// An axis-aligned box in building-local millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: LocalCoordinate,
    pub max: LocalCoordinate,
}

impl BoundingBox {
    /// Build a box from two opposite corners; corners are normalised so that
    /// `min ≤ max` on every axis.
    pub fn new(a: LocalCoordinate, b: LocalCoordinate) -> Self {
        Self {
            min: LocalCoordinate::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: LocalCoordinate::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Inclusive on every face.  NaN components are never contained.
    pub fn contains(&self, p: &LocalCoordinate) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}
