//! Spatial anchors: confidence-scored, timestamped reference points captured
//! by an AR session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coords::{LocalCoordinate, Quaternion};
use crate::kinds::{Platform, ValidationStatus};
use crate::wire::SpatialScale;

/// Coarse confidence bucket used when presenting equipment positions.
///
/// Ordered from least to most trustworthy so that comparisons such as
/// `level >= ConfidenceLevel::Medium` read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Estimated,
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Bucket a `[0, 1]` confidence score.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.9 => Self::High,
            s if s >= 0.7 => Self::Medium,
            s if s >= 0.5 => Self::Low,
            _ => Self::Estimated,
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Estimated => "estimated",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

/// A reference point tying a physical location to building-local
/// coordinates.
///
/// `timestamp` is the last time the anchor was observed; an anchor older
/// than the validator's max age is logically expired even if it still
/// exists in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialAnchor {
    pub id: String,
    pub building_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<String>,
    pub position: LocalCoordinate,
    #[serde(default)]
    pub rotation: Quaternion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<SpatialScale>,
    /// Tracking confidence in `[0, 1]`.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Tracking stability in `[0, 1]`.
    pub stability: f64,
    /// Distance in metres over which the anchor is considered reliable.
    pub range: f64,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub validation_status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl SpatialAnchor {
    /// Default reliability range for freshly captured anchors, in metres.
    pub const DEFAULT_RANGE_M: f64 = 5.0;

    /// A freshly captured anchor with a new UUID, identity rotation, full
    /// stability and `Pending` status, observed now.
    pub fn capture(building_id: impl Into<String>, position: LocalCoordinate, confidence: f64) -> Self {
        Self::capture_at(building_id, position, confidence, Utc::now())
    }

    pub fn capture_at(
        building_id: impl Into<String>,
        position: LocalCoordinate,
        confidence: f64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            building_id: building_id.into(),
            equipment_id: None,
            position,
            rotation: Quaternion::IDENTITY,
            scale: None,
            confidence,
            platform: None,
            stability: 1.0,
            range: Self::DEFAULT_RANGE_M,
            timestamp: at,
            created_at: at,
            validation_status: ValidationStatus::Pending,
            metadata: None,
            created_by: None,
        }
    }

    pub fn with_rotation(mut self, rotation: Quaternion) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_equipment(mut self, equipment_id: impl Into<String>) -> Self {
        self.equipment_id = Some(equipment_id.into());
        self
    }

    pub fn with_stability(mut self, stability: f64) -> Self {
        self.stability = stability;
        self
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }

    /// Record a re-scan: new confidence and observation time.  The anchor
    /// goes back to `Pending` until it is validated again.
    pub fn refresh(&mut self, confidence: f64, at: DateTime<Utc>) {
        self.confidence = confidence;
        self.timestamp = at;
        self.validation_status = ValidationStatus::Pending;
    }

    /// Time since the last observation.  Negative when `timestamp` lies in
    /// the future relative to `now`.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age_at(now) > max_age
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }
}
