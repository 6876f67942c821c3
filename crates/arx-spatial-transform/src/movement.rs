//! Grid quantisation and the movement significance gate.
//!
//! AR tracking produces continuous positional jitter.  Only a change that
//! moves a point into a different grid cell (x, y or floor) is worth writing
//! to the durable building model; [`MovementFilter::is_significant`] answers
//! exactly that question.  No velocity, smoothing or outlier rejection is
//! performed.
//!
//! # Example
//!
//! ```rust
//! use arx_spatial_transform::movement::{GridQuantizer, MovementFilter};
//! use arx_spatial_types::LocalCoordinate;
//!
//! let filter = MovementFilter::new(GridQuantizer::default());
//!
//! // 0.2 m of jitter inside one 0.5 m cell.
//! let a = LocalCoordinate::new(1_100.0, 2_100.0, 0.0);
//! let b = LocalCoordinate::new(1_300.0, 2_300.0, 0.0);
//! assert!(!filter.is_significant(&a, &b));
//!
//! // Crossing into the next cell.
//! let c = LocalCoordinate::new(1_600.0, 2_100.0, 0.0);
//! assert!(filter.is_significant(&a, &c));
//! ```

use arx_spatial_types::{GridCoordinate, LocalCoordinate};
use tracing::trace;

/// Default grid cell edge, in metres.
pub const DEFAULT_GRID_SCALE_M: f64 = 0.5;
/// Default storey height, in metres.
pub const DEFAULT_FLOOR_HEIGHT_M: f64 = 3.0;

// ────────────────────────────────────────────────────────────────────────────
// GridQuantizer
// ────────────────────────────────────────────────────────────────────────────

/// The local → grid quantisation rule for one building.
///
/// Each millimetre component is divided by the cell size (or floor height
/// for z) and truncated toward zero.  The cell straddling zero on each axis
/// is therefore twice as wide as the others; this matches how the display
/// grid has always been indexed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridQuantizer {
    grid_scale_m: f64,
    floor_height_m: f64,
}

impl GridQuantizer {
    pub fn new(grid_scale_m: f64, floor_height_m: f64) -> Self {
        Self {
            grid_scale_m,
            floor_height_m,
        }
    }

    pub fn grid_scale_m(&self) -> f64 {
        self.grid_scale_m
    }

    pub fn floor_height_m(&self) -> f64 {
        self.floor_height_m
    }

    fn cell_mm(&self) -> f64 {
        self.grid_scale_m * 1000.0
    }

    fn floor_mm(&self) -> f64 {
        self.floor_height_m * 1000.0
    }

    /// Snap `local` to its grid cell.  NaN components land in cell 0 and
    /// infinities saturate.
    pub fn quantize(&self, local: &LocalCoordinate) -> GridCoordinate {
        GridCoordinate::new(
            (local.x / self.cell_mm()).trunc() as i64,
            (local.y / self.cell_mm()).trunc() as i64,
            (local.z / self.floor_mm()).trunc() as i64,
        )
    }

    /// The local origin of `grid`'s cell.  Sub-cell position is not
    /// recoverable.
    pub fn cell_origin(&self, grid: &GridCoordinate) -> LocalCoordinate {
        LocalCoordinate::new(
            grid.x as f64 * self.cell_mm(),
            grid.y as f64 * self.cell_mm(),
            grid.floor as f64 * self.floor_mm(),
        )
    }
}

impl Default for GridQuantizer {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SCALE_M, DEFAULT_FLOOR_HEIGHT_M)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MovementFilter
// ────────────────────────────────────────────────────────────────────────────

/// Debounce gate for repeated position updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementFilter {
    quantizer: GridQuantizer,
}

impl MovementFilter {
    pub fn new(quantizer: GridQuantizer) -> Self {
        Self { quantizer }
    }

    pub fn quantizer(&self) -> &GridQuantizer {
        &self.quantizer
    }

    /// `true` iff `old` and `new` fall in different cells on any of x, y or
    /// floor.
    pub fn is_significant(&self, old: &LocalCoordinate, new: &LocalCoordinate) -> bool {
        let from = self.quantizer.quantize(old);
        let to = self.quantizer.quantize(new);
        let moved = from != to;
        if moved {
            trace!(?from, ?to, "grid cell changed");
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> MovementFilter {
        MovementFilter::default()
    }

    // ── GridQuantizer ───────────────────────────────────────────────────────

    #[test]
    fn quantize_truncates_toward_zero() {
        let q = GridQuantizer::default();
        assert_eq!(q.quantize(&LocalCoordinate::new(999.0, 1000.0, 2999.0)), GridCoordinate::new(1, 2, 0));
        assert_eq!(q.quantize(&LocalCoordinate::new(-499.0, -501.0, -3001.0)), GridCoordinate::new(0, -1, -1));
    }

    #[test]
    fn quantize_honours_custom_scale() {
        let q = GridQuantizer::new(1.0, 4.0);
        assert_eq!(q.quantize(&LocalCoordinate::new(2500.0, -2500.0, 8000.0)), GridCoordinate::new(2, -2, 2));
    }

    #[test]
    fn quantize_nan_lands_in_cell_zero() {
        let q = GridQuantizer::default();
        assert_eq!(q.quantize(&LocalCoordinate::new(f64::NAN, 0.0, 0.0)).x, 0);
    }

    #[test]
    fn cell_origin_recovers_cell_corner_only() {
        let q = GridQuantizer::default();
        let local = LocalCoordinate::new(1234.0, 5678.0, 4000.0);
        let origin = q.cell_origin(&q.quantize(&local));
        assert_eq!(origin, LocalCoordinate::new(1000.0, 5500.0, 3000.0));
        assert_ne!(origin, local);
    }

    // ── MovementFilter ──────────────────────────────────────────────────────

    #[test]
    fn identical_points_are_never_significant() {
        for p in [
            LocalCoordinate::origin(),
            LocalCoordinate::new(499.9, -12_345.0, 2_999.0),
            LocalCoordinate::new(1e6, -1e6, 1e5),
        ] {
            assert!(!filter().is_significant(&p, &p));
        }
    }

    #[test]
    fn jitter_within_one_cell_is_insignificant() {
        let a = LocalCoordinate::new(2_010.0, 3_020.0, 100.0);
        let b = LocalCoordinate::new(2_490.0, 3_480.0, 2_900.0);
        assert!(!filter().is_significant(&a, &b));
    }

    #[test]
    fn crossing_x_boundary_is_significant() {
        let a = LocalCoordinate::new(1_990.0, 0.0, 0.0);
        let b = LocalCoordinate::new(2_010.0, 0.0, 0.0);
        assert!(filter().is_significant(&a, &b));
    }

    #[test]
    fn moving_more_than_one_cell_is_significant() {
        let a = LocalCoordinate::new(700.0, 700.0, 0.0);
        assert!(filter().is_significant(&a, &LocalCoordinate::new(700.0, 1_201.0, 0.0)));
        assert!(filter().is_significant(&a, &LocalCoordinate::new(1_201.0, 700.0, 0.0)));
    }

    #[test]
    fn zero_cell_spans_both_sides_of_the_axis() {
        // Truncation maps (-500, 500) mm to cell 0, so a 900 mm move across
        // the axis stays in one cell while the same move elsewhere does not.
        let a = LocalCoordinate::new(-450.0, 0.0, 0.0);
        let b = LocalCoordinate::new(450.0, 0.0, 0.0);
        assert_eq!(filter().quantizer().quantize(&a).x, 0);
        assert_eq!(filter().quantizer().quantize(&b).x, 0);
        assert!(!filter().is_significant(&a, &b));

        let c = LocalCoordinate::new(550.0, 0.0, 0.0);
        let d = LocalCoordinate::new(1_450.0, 0.0, 0.0);
        assert!(filter().is_significant(&c, &d));

        let below = LocalCoordinate::new(0.0, 0.0, -2_900.0);
        let above = LocalCoordinate::new(0.0, 0.0, 2_900.0);
        assert!(!filter().is_significant(&below, &above));
    }

    #[test]
    fn changing_floor_is_significant() {
        let a = LocalCoordinate::new(700.0, 700.0, 2_900.0);
        let b = LocalCoordinate::new(700.0, 700.0, 3_100.0);
        assert!(filter().is_significant(&a, &b));
    }
}
