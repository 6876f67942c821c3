//! AR navigation, overlay and session-telemetry payloads produced by client
//! devices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coords::LocalCoordinate;
use crate::kinds::{Animation, Difficulty, InstructionType, Priority, ThermalState, VisualizationType};

/// How an instruction is drawn in the AR view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArVisualization {
    #[serde(rename = "type")]
    pub kind: VisualizationType,
    /// `#RGB` or `#RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Rendered size, `(0, 10]`.
    pub size: f64,
    pub opacity: f64,
    pub intensity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

impl ArVisualization {
    pub fn new(kind: VisualizationType) -> Self {
        Self {
            kind,
            color: None,
            size: 1.0,
            opacity: 1.0,
            intensity: 1.0,
            animation: None,
        }
    }
}

/// One step of an AR navigation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArInstruction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InstructionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<LocalCoordinate>,
    #[serde(default)]
    pub description: String,
    /// Seconds.
    pub estimated_duration: f64,
    pub priority: Priority,
    pub visualization: ArVisualization,
}

/// A route through the building rendered as AR guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArNavigationPath {
    pub id: String,
    pub from: LocalCoordinate,
    pub to: LocalCoordinate,
    /// Ordered, `from` → `to`.
    #[serde(default)]
    pub waypoints: Vec<LocalCoordinate>,
    /// Millimetres.
    pub distance: f64,
    /// Seconds.
    pub estimated_time: f64,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub accessibility: bool,
    #[serde(default)]
    pub hazardous: bool,
    #[serde(default)]
    pub instructions: Vec<ArInstruction>,
}

impl ArNavigationPath {
    /// Sum of straight segments `from → waypoints… → to`, in millimetres.
    pub fn polyline_length(&self) -> f64 {
        let mut total = 0.0;
        let mut prev = self.from;
        for p in self.waypoints.iter().chain(std::iter::once(&self.to)) {
            total += prev.distance_to(p);
            prev = *p;
        }
        total
    }
}

/// Telemetry summary for one AR capture session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArSessionMetrics {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Seconds, as reported by the device.
    pub duration: f64,
    #[serde(default)]
    pub anchors_detected: i64,
    #[serde(default)]
    pub anchors_created: i64,
    #[serde(default)]
    pub anchors_updated: i64,
    #[serde(default)]
    pub anchors_removed: i64,
    #[serde(default)]
    pub overlays_rendered: i64,
    #[serde(default)]
    pub errors_encountered: i64,
    pub average_frame_rate: f64,
    /// `[0, 1]`.
    pub average_tracking_quality: f64,
    /// `[0, 100]`.
    pub battery_percent: f64,
    pub memory_usage_mb: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal_state: Option<ThermalState>,
}

impl ArSessionMetrics {
    /// `end_time - start_time` in seconds, millisecond resolution.
    pub fn elapsed_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }

    /// Named counter values, in declaration order.
    pub fn counters(&self) -> [(&'static str, i64); 6] {
        [
            ("anchors_detected", self.anchors_detected),
            ("anchors_created", self.anchors_created),
            ("anchors_updated", self.anchors_updated),
            ("anchors_removed", self.anchors_removed),
            ("overlays_rendered", self.overlays_rendered),
            ("errors_encountered", self.errors_encountered),
        ]
    }
}
