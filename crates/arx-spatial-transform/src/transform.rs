//! Coordinate Transform Engine.
//!
//! Converts between WGS84, building-local millimetres and grid cells for one
//! building, parameterised by a WGS84 origin and a rotation from north.
//!
//! The WGS84 ↔ local mapping is an equirectangular approximation:
//!
//! ```text
//! x = Δlon · cos((lat0 + lat) / 2) · R
//! y = Δlat · R                             (angles in radians, R = 6 371 000 m)
//! ```
//!
//! followed by a 2-D rotation of `(x, y)` and a metre → millimetre scale.
//! Accuracy degrades beyond a few kilometres from the origin; that is
//! expected for building-scale use.
//!
//! Nothing here validates input.  NaN or infinite values propagate through
//! the arithmetic; run the validator before persisting results.
//!
//! # Example
//!
//! ```rust
//! use arx_spatial_transform::transform::{CoordinateTransformer, TransformParams};
//! use arx_spatial_types::Wgs84Coordinate;
//!
//! let origin = Wgs84Coordinate::new(40.7484, -73.9857, 0.0);
//! let engine = CoordinateTransformer::new(TransformParams::new(origin, 0.0));
//!
//! let cs = engine.transform(&Wgs84Coordinate::new(40.7485, -73.9857, 0.0));
//! assert!((cs.local.y - 11_119.5).abs() < 1.0); // ≈ 11.1 m north
//! assert!(cs.local.x.abs() < 1e-6);
//! assert_eq!(cs.grid.y, 22);
//! ```

use arx_spatial_types::{CoordinateSystem, GridCoordinate, LocalCoordinate, Wgs84Coordinate};
use rayon::prelude::*;

use crate::movement::{DEFAULT_FLOOR_HEIGHT_M, DEFAULT_GRID_SCALE_M, GridQuantizer, MovementFilter};

/// Mean Earth radius, metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ────────────────────────────────────────────────────────────────────────────
// TransformParams
// ────────────────────────────────────────────────────────────────────────────

/// Survey parameters for one building.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    /// WGS84 position of the building reference point.
    pub origin: Wgs84Coordinate,
    /// Rotation of the building's local axes from true north, degrees.
    pub rotation_deg: f64,
    /// Metres per grid unit.
    pub grid_scale: f64,
    /// Metres per floor.
    pub floor_height: f64,
}

impl TransformParams {
    /// Parameters with the default grid scale and floor height.
    pub fn new(origin: Wgs84Coordinate, rotation_deg: f64) -> Self {
        Self {
            origin,
            rotation_deg,
            grid_scale: DEFAULT_GRID_SCALE_M,
            floor_height: DEFAULT_FLOOR_HEIGHT_M,
        }
    }

    pub fn grid_scale(mut self, metres: f64) -> Self {
        self.grid_scale = metres;
        self
    }

    pub fn floor_height(mut self, metres: f64) -> Self {
        self.floor_height = metres;
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CoordinateTransformer
// ────────────────────────────────────────────────────────────────────────────

/// Immutable, per-building transform engine.
///
/// All methods take `&self` and are pure, so one engine can be shared across
/// threads.  When a building is re-surveyed, build a new engine.
#[derive(Debug, Clone)]
pub struct CoordinateTransformer {
    params: TransformParams,
    cos_r: f64,
    sin_r: f64,
    quantizer: GridQuantizer,
}

impl CoordinateTransformer {
    pub fn new(params: TransformParams) -> Self {
        let (sin_r, cos_r) = params.rotation_deg.to_radians().sin_cos();
        Self {
            params,
            cos_r,
            sin_r,
            quantizer: GridQuantizer::new(params.grid_scale, params.floor_height),
        }
    }

    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    pub fn quantizer(&self) -> &GridQuantizer {
        &self.quantizer
    }

    /// A [`MovementFilter`] using this building's grid.
    pub fn movement_filter(&self) -> MovementFilter {
        MovementFilter::new(self.quantizer)
    }

    /// WGS84 → building-local millimetres.
    pub fn wgs84_to_local(&self, point: &Wgs84Coordinate) -> LocalCoordinate {
        let o = &self.params.origin;
        let mid_lat = ((o.latitude + point.latitude) * 0.5).to_radians();

        let x = (point.longitude - o.longitude).to_radians() * mid_lat.cos() * EARTH_RADIUS_M;
        let y = (point.latitude - o.latitude).to_radians() * EARTH_RADIUS_M;

        let xr = x * self.cos_r - y * self.sin_r;
        let yr = x * self.sin_r + y * self.cos_r;

        LocalCoordinate::new(
            xr * 1000.0,
            yr * 1000.0,
            (point.altitude - o.altitude) * 1000.0,
        )
    }

    /// Building-local millimetres → WGS84.  Exact inverse of
    /// [`wgs84_to_local`](Self::wgs84_to_local).
    pub fn local_to_wgs84(&self, local: &LocalCoordinate) -> Wgs84Coordinate {
        let o = &self.params.origin;
        let xr = local.x / 1000.0;
        let yr = local.y / 1000.0;

        // Transpose of the forward rotation.
        let x = xr * self.cos_r + yr * self.sin_r;
        let y = -xr * self.sin_r + yr * self.cos_r;

        let latitude = o.latitude + (y / EARTH_RADIUS_M).to_degrees();
        let mid_lat = ((o.latitude + latitude) * 0.5).to_radians();
        let longitude = o.longitude + (x / (EARTH_RADIUS_M * mid_lat.cos())).to_degrees();

        Wgs84Coordinate::new(latitude, longitude, o.altitude + local.z / 1000.0)
    }

    /// Quantise to a grid cell (lossy, truncating).
    pub fn local_to_grid(&self, local: &LocalCoordinate) -> GridCoordinate {
        self.quantizer.quantize(local)
    }

    /// The local origin of a grid cell.  Does not round-trip through
    /// [`local_to_grid`](Self::local_to_grid).
    pub fn grid_to_local(&self, grid: &GridCoordinate) -> LocalCoordinate {
        self.quantizer.cell_origin(grid)
    }

    /// All three representations of a WGS84 point.
    pub fn transform(&self, wgs84: &Wgs84Coordinate) -> CoordinateSystem {
        let local = self.wgs84_to_local(wgs84);
        CoordinateSystem {
            wgs84: *wgs84,
            local,
            grid: self.local_to_grid(&local),
        }
    }

    /// All three representations of a local point.
    pub fn transform_from_local(&self, local: &LocalCoordinate) -> CoordinateSystem {
        CoordinateSystem {
            wgs84: self.local_to_wgs84(local),
            local: *local,
            grid: self.local_to_grid(local),
        }
    }

    /// Transform many points in parallel.  Output order matches input order.
    pub fn transform_batch(&self, points: &[Wgs84Coordinate]) -> Vec<CoordinateSystem> {
        points.par_iter().map(|p| self.transform(p)).collect()
    }

    /// `true` iff `old` and `new` fall in different grid cells.
    pub fn is_significant_movement(&self, old: &LocalCoordinate, new: &LocalCoordinate) -> bool {
        self.movement_filter().is_significant(old, new)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
