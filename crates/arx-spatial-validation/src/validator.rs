//! [`SpatialValidator`] – gatekeeper for anchors, paths and AR telemetry.
//!
//! Every `validate_*` method returns `Ok(())` or the first
//! [`ValidationError`] encountered, naming the offending field (nested fields
//! use a path such as `waypoints[2].x` or
//! `instructions[0].visualization.opacity`).
//!
//! Closed value domains (platform, instruction type, priority, animation,
//! thermal state, difficulty) are typed enums, so an unknown value is
//! rejected when it is parsed and never reaches these checks.
//!
//! # Example
//!
//! ```
//! use arx_spatial_validation::{SpatialValidator, ValidatorConfig};
//! use arx_spatial_types::{LocalCoordinate, Quaternion};
//!
//! let validator = SpatialValidator::new(ValidatorConfig::default());
//!
//! assert!(validator.validate_quaternion(&Quaternion::IDENTITY).is_ok());
//! assert!(validator.validate_quaternion(&Quaternion::new(1.0, 1.0, 0.0, 0.0)).is_err());
//!
//! let from = LocalCoordinate::origin();
//! let to = LocalCoordinate::new(1_000.0, 0.0, 0.0);
//! assert!(validator.validate_distance(&from, &to, 1_000.0).is_ok());
//! assert!(validator.validate_distance(&from, &to, 800.0).is_err());
//! ```

use std::sync::LazyLock;

use arx_spatial_types::{
    ArInstruction, ArNavigationPath, ArSessionMetrics, ArVisualization, BoundingBox,
    LocalCoordinate, Quaternion, SpatialAnchor, ValidationError, Wgs84Coordinate,
};
use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use regex::Regex;
use tracing::debug;

use crate::config::ValidatorConfig;

/// Largest accepted magnitude of any local component, millimetres (1 km).
pub const MAX_LOCAL_COMPONENT_MM: f64 = 1_000_000.0;
/// Allowed deviation of a rotation quaternion's magnitude from 1.0.
pub const QUATERNION_TOLERANCE: f64 = 0.001;
/// Relative tolerance applied by [`SpatialValidator::validate_distance`].
pub const DISTANCE_TOLERANCE_RATIO: f64 = 0.05;
/// Absolute floor for the distance tolerance, millimetres.
pub const MIN_DISTANCE_TOLERANCE_MM: f64 = 1.0;
/// Allowed gap between a session's reported and computed duration, seconds.
pub const DURATION_TOLERANCE_SECS: f64 = 1.0;
/// Largest accepted visualization size.
pub const MAX_VISUALIZATION_SIZE: f64 = 10.0;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").expect("hex color pattern compiles")
});

// ────────────────────────────────────────────────────────────────────────────
// Field helpers
// ────────────────────────────────────────────────────────────────────────────

fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn require_present(field: String, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(())
}

fn require_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn require_in_range(field: String, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    require_finite(&field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn require_non_negative(field: String, value: f64) -> Result<(), ValidationError> {
    require_in_range(field, value, 0.0, f64::INFINITY)
}

fn require_positive(field: String, value: f64) -> Result<(), ValidationError> {
    require_finite(&field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(())
}

fn check_location(prefix: &str, location: &LocalCoordinate) -> Result<(), ValidationError> {
    for (axis, value) in location.components() {
        require_in_range(
            join(prefix, axis),
            value,
            -MAX_LOCAL_COMPONENT_MM,
            MAX_LOCAL_COMPONENT_MM,
        )?;
    }
    Ok(())
}

fn check_quaternion(prefix: &str, q: &Quaternion) -> Result<(), ValidationError> {
    for (axis, value) in q.components() {
        require_finite(&join(prefix, axis), value)?;
    }
    let magnitude = q.magnitude();
    if (magnitude - 1.0).abs() > QUATERNION_TOLERANCE {
        return Err(ValidationError::NotNormalized {
            field: prefix.to_string(),
            magnitude,
            tolerance: QUATERNION_TOLERANCE,
        });
    }
    Ok(())
}

fn check_visualization(prefix: &str, v: &ArVisualization) -> Result<(), ValidationError> {
    match &v.color {
        Some(color) if !HEX_COLOR.is_match(color) => {
            return Err(ValidationError::InvalidColor {
                field: join(prefix, "color"),
                value: color.clone(),
            });
        }
        _ => {}
    }
    require_positive(join(prefix, "size"), v.size)?;
    require_in_range(join(prefix, "size"), v.size, 0.0, MAX_VISUALIZATION_SIZE)?;
    require_in_range(join(prefix, "opacity"), v.opacity, 0.0, 1.0)?;
    require_in_range(join(prefix, "intensity"), v.intensity, 0.0, 1.0)?;
    Ok(())
}

fn check_instruction(prefix: &str, ins: &ArInstruction) -> Result<(), ValidationError> {
    require_present(join(prefix, "id"), &ins.id)?;
    if let Some(position) = &ins.position {
        check_location(&join(prefix, "position"), position)?;
    }
    require_non_negative(join(prefix, "estimated_duration"), ins.estimated_duration)?;
    check_visualization(&join(prefix, "visualization"), &ins.visualization)
}

// ────────────────────────────────────────────────────────────────────────────
// SpatialValidator
// ────────────────────────────────────────────────────────────────────────────

/// Immutable validator holding one set of thresholds.
///
/// Holds no interior mutability, so a single instance can be shared by
/// reference across threads.
#[derive(Debug, Clone)]
pub struct SpatialValidator {
    config: ValidatorConfig,
    max_age: Duration,
}

impl Default for SpatialValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl SpatialValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            max_age: config.max_age(),
            config,
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Rejects NaN / infinite components and any component beyond ±1 km.
    pub fn validate_spatial_location(&self, location: &LocalCoordinate) -> Result<(), ValidationError> {
        check_location("location", location)
    }

    /// Rejects non-finite components and magnitudes more than
    /// [`QUATERNION_TOLERANCE`] away from 1.0.
    pub fn validate_quaternion(&self, rotation: &Quaternion) -> Result<(), ValidationError> {
        check_quaternion("rotation", rotation)
    }

    /// Latitude in `[-90, 90]`, longitude in `[-180, 180]`, finite altitude.
    pub fn validate_wgs84(&self, point: &Wgs84Coordinate) -> Result<(), ValidationError> {
        require_in_range("latitude".into(), point.latitude, -90.0, 90.0)?;
        require_in_range("longitude".into(), point.longitude, -180.0, 180.0)?;
        require_finite("altitude", point.altitude)
    }

    /// [`validate_spatial_anchor_at`](Self::validate_spatial_anchor_at) with
    /// the current time.
    pub fn validate_spatial_anchor(&self, anchor: &SpatialAnchor) -> Result<(), ValidationError> {
        self.validate_spatial_anchor_at(anchor, Utc::now())
    }

    /// Full anchor check as of `now`.
    ///
    /// Low confidence and excessive age are reported as
    /// [`ValidationError::BelowConfidence`] and [`ValidationError::Expired`]
    /// so callers can prompt for a re-scan instead of rejecting outright.
    /// A timestamp slightly in the future (device clock skew) is accepted.
    pub fn validate_spatial_anchor_at(
        &self,
        anchor: &SpatialAnchor,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let result = self.check_anchor(anchor, now);
        if let Err(e) = &result {
            debug!(anchor_id = %anchor.id, class = ?e.class(), error = %e, "anchor rejected");
        }
        result
    }

    fn check_anchor(&self, anchor: &SpatialAnchor, now: DateTime<Utc>) -> Result<(), ValidationError> {
        require_present("id".into(), &anchor.id)?;
        require_present("building_id".into(), &anchor.building_id)?;
        check_location("position", &anchor.position)?;
        check_quaternion("rotation", &anchor.rotation)?;

        require_in_range("confidence".into(), anchor.confidence, 0.0, 1.0)?;
        if anchor.confidence < self.config.min_confidence {
            return Err(ValidationError::BelowConfidence {
                confidence: anchor.confidence,
                min_confidence: self.config.min_confidence,
            });
        }

        let age = anchor.age_at(now);
        if age > self.max_age {
            return Err(ValidationError::Expired {
                age_secs: age.num_seconds(),
                max_age_secs: self.max_age.num_seconds(),
            });
        }

        require_in_range("stability".into(), anchor.stability, 0.0, 1.0)?;
        require_positive("range".into(), anchor.range)
    }

    /// Validate many anchors in parallel against a single `now`.
    ///
    /// Results are paired with the anchor id; callers needing a stable order
    /// should sort by id.
    pub fn validate_anchors(
        &self,
        anchors: &[SpatialAnchor],
    ) -> Vec<(String, Result<(), ValidationError>)> {
        let now = Utc::now();
        anchors
            .par_iter()
            .map(|a| (a.id.clone(), self.validate_spatial_anchor_at(a, now)))
            .collect()
    }

    pub fn validate_ar_navigation_path(&self, path: &ArNavigationPath) -> Result<(), ValidationError> {
        require_present("id".into(), &path.id)?;
        for (i, waypoint) in path.waypoints.iter().enumerate() {
            check_location(&format!("waypoints[{i}]"), waypoint)?;
        }
        require_in_range("distance".into(), path.distance, 0.0, self.config.max_distance_mm)?;
        require_non_negative("estimated_time".into(), path.estimated_time)?;
        for (i, ins) in path.instructions.iter().enumerate() {
            check_instruction(&format!("instructions[{i}]"), ins)?;
        }
        Ok(())
    }

    pub fn validate_ar_instruction(&self, instruction: &ArInstruction) -> Result<(), ValidationError> {
        check_instruction("", instruction)
    }

    pub fn validate_ar_visualization(&self, visualization: &ArVisualization) -> Result<(), ValidationError> {
        check_visualization("", visualization)
    }

    pub fn validate_ar_session_metrics(&self, m: &ArSessionMetrics) -> Result<(), ValidationError> {
        require_present("session_id".into(), &m.session_id)?;
        if m.end_time < m.start_time {
            return Err(ValidationError::InvalidTimeRange {
                start: m.start_time.to_rfc3339(),
                end: m.end_time.to_rfc3339(),
            });
        }

        require_finite("duration", m.duration)?;
        let computed = m.elapsed_secs();
        if (m.duration - computed).abs() > DURATION_TOLERANCE_SECS {
            return Err(ValidationError::DurationMismatch {
                reported: m.duration,
                computed,
            });
        }

        for (name, value) in m.counters() {
            if value < 0 {
                return Err(ValidationError::OutOfRange {
                    field: name.to_string(),
                    value: value as f64,
                    min: 0.0,
                    max: f64::INFINITY,
                });
            }
        }

        require_non_negative("average_frame_rate".into(), m.average_frame_rate)?;
        require_in_range("average_tracking_quality".into(), m.average_tracking_quality, 0.0, 1.0)?;
        require_in_range("battery_percent".into(), m.battery_percent, 0.0, 100.0)?;
        require_non_negative("memory_usage_mb".into(), m.memory_usage_mb)
    }

    /// Checks that the straight-line distance `from → to` is within
    /// `max(5 % of expected, 1 mm)` of `expected` (millimetres).
    pub fn validate_distance(
        &self,
        from: &LocalCoordinate,
        to: &LocalCoordinate,
        expected: f64,
    ) -> Result<(), ValidationError> {
        require_finite("expected_distance", expected)?;
        let actual = from.distance_to(to);
        let tolerance = (DISTANCE_TOLERANCE_RATIO * expected).max(MIN_DISTANCE_TOLERANCE_MM);
        // Negated so a NaN distance also fails.
        if !((actual - expected).abs() <= tolerance) {
            return Err(ValidationError::DistanceMismatch {
                expected,
                actual,
                tolerance,
            });
        }
        Ok(())
    }

    pub fn validate_within_bounds(
        &self,
        location: &LocalCoordinate,
        bounds: &BoundingBox,
    ) -> Result<(), ValidationError> {
        if !bounds.contains(location) {
            return Err(ValidationError::OutsideBounds {
                x: location.x,
                y: location.y,
                z: location.z,
            });
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
