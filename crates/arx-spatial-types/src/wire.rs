//! Persisted / over-the-wire shapes populated from the engine's values.
//!
//! The service layer stores and serves [`AnchorRecord`]s; these structs carry
//! a JSON Schema so that layer can publish it alongside its API.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::anchor::SpatialAnchor;
use crate::coords::{LocalCoordinate, Quaternion};
use crate::kinds::Platform;

/// Position in building-local millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpatialPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Unit quaternion in (x, y, z, w) order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpatialRotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpatialScale {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for SpatialScale {
    fn default() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        }
    }
}

/// A spatial anchor as the service layer persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnchorRecord {
    pub id: String,
    pub building_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<String>,
    pub position: SpatialPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<SpatialRotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<SpatialScale>,
    pub confidence: f64,
    pub anchor_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl From<LocalCoordinate> for SpatialPosition {
    fn from(c: LocalCoordinate) -> Self {
        Self {
            x: c.x,
            y: c.y,
            z: c.z,
        }
    }
}

impl From<SpatialPosition> for LocalCoordinate {
    fn from(p: SpatialPosition) -> Self {
        LocalCoordinate::new(p.x, p.y, p.z)
    }
}

impl From<Quaternion> for SpatialRotation {
    fn from(q: Quaternion) -> Self {
        Self {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
    }
}

impl From<SpatialRotation> for Quaternion {
    fn from(r: SpatialRotation) -> Self {
        Quaternion::new(r.w, r.x, r.y, r.z)
    }
}

impl From<&SpatialAnchor> for AnchorRecord {
    fn from(a: &SpatialAnchor) -> Self {
        Self {
            id: a.id.clone(),
            building_id: a.building_id.clone(),
            equipment_id: a.equipment_id.clone(),
            position: a.position.into(),
            rotation: Some(a.rotation.into()),
            scale: a.scale,
            confidence: a.confidence,
            anchor_type: a.platform.unwrap_or(Platform::Manual).to_string(),
            metadata: a.metadata.clone(),
            created_at: a.created_at,
            updated_at: a.timestamp,
            created_by: a.created_by.clone(),
        }
    }
}
