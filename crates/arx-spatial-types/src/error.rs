//! Validation failures shared by every spatial crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad category of a [`ValidationError`].
///
/// Callers use this to decide between rejecting the input outright
/// ([`FailureClass::Malformed`]) and asking the device for a fresh scan
/// ([`FailureClass::Stale`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Bad geometry, unknown enum value, bad syntax, inconsistent fields.
    Malformed,
    /// Data that was fine once but is no longer trustworthy.
    Stale,
}

/// A descriptive validation failure naming the offending field and the
/// violated bound.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: String },

    #[error("{field} must be finite, got {value}")]
    NonFinite {
        field: String,
        #[serde(with = "float_repr")]
        value: f64,
    },

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        #[serde(with = "float_repr")]
        value: f64,
        #[serde(with = "float_repr")]
        min: f64,
        #[serde(with = "float_repr")]
        max: f64,
    },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive {
        field: String,
        #[serde(with = "float_repr")]
        value: f64,
    },

    #[error("{field} quaternion magnitude {magnitude} deviates from 1.0 by more than {tolerance}")]
    NotNormalized {
        field: String,
        #[serde(with = "float_repr")]
        magnitude: f64,
        #[serde(with = "float_repr")]
        tolerance: f64,
    },

    #[error("{field}: unknown value {value:?}")]
    UnknownVariant { field: String, value: String },

    #[error("{field}: {value:?} is not a #RGB or #RRGGBB hex color")]
    InvalidColor { field: String, value: String },

    #[error("end time {end} is before start time {start}")]
    InvalidTimeRange { start: String, end: String },

    #[error("reported duration {reported}s does not match end - start = {computed}s")]
    DurationMismatch {
        #[serde(with = "float_repr")]
        reported: f64,
        #[serde(with = "float_repr")]
        computed: f64,
    },

    #[error("distance {actual} mm differs from expected {expected} mm by more than {tolerance} mm")]
    DistanceMismatch {
        #[serde(with = "float_repr")]
        expected: f64,
        #[serde(with = "float_repr")]
        actual: f64,
        #[serde(with = "float_repr")]
        tolerance: f64,
    },

    #[error("point ({x}, {y}, {z}) lies outside the bounding box")]
    OutsideBounds {
        #[serde(with = "float_repr")]
        x: f64,
        #[serde(with = "float_repr")]
        y: f64,
        #[serde(with = "float_repr")]
        z: f64,
    },

    #[error("confidence {confidence} is below the minimum threshold {min_confidence}")]
    BelowConfidence {
        #[serde(with = "float_repr")]
        confidence: f64,
        #[serde(with = "float_repr")]
        min_confidence: f64,
    },

    #[error("anchor expired: observed {age_secs}s ago, max age is {max_age_secs}s")]
    Expired { age_secs: i64, max_age_secs: i64 },
}

/// Serde adapter for bounds and offending values that may be NaN or
/// infinite.  JSON has no literal for those, so they travel as the strings
/// `"NaN"`, `"inf"` and `"-inf"`; finite values stay plain numbers.
mod float_repr {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!(
                    "expected a number, \"NaN\", \"inf\" or \"-inf\", got {other:?}"
                ))),
            },
        }
    }
}

impl ValidationError {
    pub fn class(&self) -> FailureClass {
        match self {
            ValidationError::BelowConfidence { .. } | ValidationError::Expired { .. } => {
                FailureClass::Stale
            }
            _ => FailureClass::Malformed,
        }
    }

    /// Name of the offending field, when the failure is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::NonFinite { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NotPositive { field, .. }
            | ValidationError::NotNormalized { field, .. }
            | ValidationError::UnknownVariant { field, .. }
            | ValidationError::InvalidColor { field, .. } => Some(field),
            ValidationError::BelowConfidence { .. } => Some("confidence"),
            ValidationError::Expired { .. } => Some("timestamp"),
            ValidationError::DurationMismatch { .. } => Some("duration"),
            ValidationError::InvalidTimeRange { .. } => Some("end_time"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_failures_are_classified_separately() {
        let low = ValidationError::BelowConfidence {
            confidence: 0.3,
            min_confidence: 0.5,
        };
        let old = ValidationError::Expired {
            age_secs: 90_000,
            max_age_secs: 86_400,
        };
        assert_eq!(low.class(), FailureClass::Stale);
        assert_eq!(old.class(), FailureClass::Stale);

        let bad = ValidationError::NonFinite {
            field: "position.x".into(),
            value: f64::NAN,
        };
        assert_eq!(bad.class(), FailureClass::Malformed);
    }

    #[test]
    fn display_names_field_and_bound() {
        let err = ValidationError::OutOfRange {
            field: "opacity".into(),
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("opacity"));
        assert!(msg.contains("[0, 1]"));
        assert_eq!(err.field(), Some("opacity"));
    }

    #[test]
    fn stale_and_malformed_messages_differ() {
        let low = ValidationError::BelowConfidence {
            confidence: 0.3,
            min_confidence: 0.5,
        };
        assert!(low.to_string().contains("below the minimum threshold"));
        let old = ValidationError::Expired {
            age_secs: 90_000,
            max_age_secs: 86_400,
        };
        assert!(old.to_string().starts_with("anchor expired"));
    }

    #[test]
    fn error_serialization_roundtrip() {
        let err = ValidationError::UnknownVariant {
            field: "platform".into(),
            value: "HoloLens".into(),
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: ValidationError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }

    #[test]
    fn nan_value_survives_serialization() {
        let err = ValidationError::NonFinite {
            field: "location.x".into(),
            value: f64::NAN,
        };
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"NonFinite":{"field":"location.x","value":"NaN"}}"#);

        match serde_json::from_str::<ValidationError>(&json).unwrap() {
            ValidationError::NonFinite { field, value } => {
                assert_eq!(field, "location.x");
                assert!(value.is_nan());
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn unbounded_range_survives_serialization() {
        let err = ValidationError::OutOfRange {
            field: "memory_usage_mb".into(),
            value: -4.0,
            min: 0.0,
            max: f64::INFINITY,
        };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains(r#""max":"inf""#), "{json}");
        assert!(json.contains(r#""value":-4.0"#), "{json}");

        let back: ValidationError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }

    #[test]
    fn negative_infinity_and_plain_numbers_deserialize() {
        let json = r#"{"OutsideBounds":{"x":"-inf","y":12,"z":0.5}}"#;
        let back: ValidationError = serde_json::from_str(json).unwrap();
        assert_eq!(
            back,
            ValidationError::OutsideBounds {
                x: f64::NEG_INFINITY,
                y: 12.0,
                z: 0.5,
            }
        );
    }

    #[test]
    fn unknown_float_text_is_rejected() {
        let json = r#"{"NotPositive":{"field":"range","value":"lots"}}"#;
        assert!(serde_json::from_str::<ValidationError>(json).is_err());
    }
}
