//! Validator thresholds.
//!
//! A [`ValidatorConfig`] is assembled once (defaults, then file values, then
//! `SPATIAL_*` environment overrides) and handed to
//! [`SpatialValidator::new`][crate::SpatialValidator::new].  The validator
//! copies it; nothing can change the thresholds afterwards.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ValidatorConfig::max_distance_mm`].
pub const ENV_MAX_DISTANCE_MM: &str = "SPATIAL_MAX_DISTANCE_MM";
/// Environment variable overriding [`ValidatorConfig::min_confidence`].
pub const ENV_MIN_CONFIDENCE: &str = "SPATIAL_MIN_CONFIDENCE";
/// Environment variable overriding [`ValidatorConfig::max_age_hours`].
pub const ENV_MAX_AGE_HOURS: &str = "SPATIAL_MAX_AGE_HOURS";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Longest navigation path accepted, millimetres.
    #[serde(default = "default_max_distance_mm")]
    pub max_distance_mm: f64,

    /// Lowest anchor confidence accepted, `[0, 1]`.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Oldest anchor observation accepted, hours.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: f64,
}

fn default_max_distance_mm() -> f64 {
    10_000.0
}
fn default_min_confidence() -> f64 {
    0.5
}
fn default_max_age_hours() -> f64 {
    24.0
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_distance_mm: default_max_distance_mm(),
            min_confidence: default_min_confidence(),
            max_age_hours: default_max_age_hours(),
        }
    }
}

impl ValidatorConfig {
    pub fn with_max_distance(mut self, millimetres: f64) -> Self {
        self.max_distance_mm = millimetres;
        self
    }

    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = confidence;
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age_hours = max_age.num_milliseconds() as f64 / 3_600_000.0;
        self
    }

    /// `max_age_hours` as a [`Duration`].  Negative or NaN values become
    /// zero; values past chrono's range saturate.
    pub fn max_age(&self) -> Duration {
        let ms = (self.max_age_hours.max(0.0) * 3_600_000.0).round() as i64;
        Duration::try_milliseconds(ms).unwrap_or(Duration::MAX)
    }

    /// Apply `SPATIAL_*` environment variable overrides.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `SPATIAL_MAX_DISTANCE_MM` | `max_distance_mm` |
    /// | `SPATIAL_MIN_CONFIDENCE` | `min_confidence` |
    /// | `SPATIAL_MAX_AGE_HOURS` | `max_age_hours` |
    ///
    /// Values that do not parse as a finite number are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        if let Some(v) = read(ENV_MAX_DISTANCE_MM) {
            self.max_distance_mm = v;
        }
        if let Some(v) = read(ENV_MIN_CONFIDENCE) {
            self.min_confidence = v;
        }
        if let Some(v) = read(ENV_MAX_AGE_HOURS) {
            self.max_age_hours = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_thresholds() {
        let cfg = ValidatorConfig::default();
        assert_eq!(cfg.max_distance_mm, 10_000.0);
        assert_eq!(cfg.min_confidence, 0.5);
        assert_eq!(cfg.max_age(), Duration::hours(24));
    }

    #[test]
    fn builder_setters_produce_new_values() {
        let base = ValidatorConfig::default();
        let cfg = base
            .with_max_distance(25_000.0)
            .with_min_confidence(0.8)
            .with_max_age(Duration::minutes(90));
        assert_eq!(cfg.max_distance_mm, 25_000.0);
        assert_eq!(cfg.min_confidence, 0.8);
        assert_eq!(cfg.max_age(), Duration::minutes(90));
        // `base` is a copy and keeps its defaults.
        assert_eq!(base, ValidatorConfig::default());
    }

    #[test]
    fn negative_max_age_clamps_to_zero() {
        let cfg = ValidatorConfig {
            max_age_hours: -3.0,
            ..ValidatorConfig::default()
        };
        assert_eq!(cfg.max_age(), Duration::zero());
    }

    #[test]
    fn huge_max_age_saturates() {
        let cfg = ValidatorConfig {
            max_age_hours: f64::INFINITY,
            ..ValidatorConfig::default()
        };
        assert_eq!(cfg.max_age(), Duration::MAX);
    }

    #[test]
    fn overrides_replace_fields() {
        let mut cfg = ValidatorConfig::default();
        cfg.apply_overrides_from(lookup(&[
            (ENV_MAX_DISTANCE_MM, "15000"),
            (ENV_MIN_CONFIDENCE, " 0.75 "),
            (ENV_MAX_AGE_HOURS, "48"),
        ]));
        assert_eq!(cfg.max_distance_mm, 15_000.0);
        assert_eq!(cfg.min_confidence, 0.75);
        assert_eq!(cfg.max_age(), Duration::hours(48));
    }

    #[test]
    fn overrides_ignore_invalid_values() {
        let mut cfg = ValidatorConfig::default();
        cfg.apply_overrides_from(lookup(&[
            (ENV_MAX_DISTANCE_MM, "ten metres"),
            (ENV_MIN_CONFIDENCE, "NaN"),
        ]));
        assert_eq!(cfg, ValidatorConfig::default());
    }

    #[test]
    fn apply_env_overrides_reads_process_environment() {
        // SAFETY: no other test touches SPATIAL_MAX_AGE_HOURS.
        unsafe { std::env::set_var(ENV_MAX_AGE_HOURS, "6") };
        let mut cfg = ValidatorConfig::default();
        cfg.apply_env_overrides();
        assert_eq!(cfg.max_age(), Duration::hours(6));
        unsafe { std::env::remove_var(ENV_MAX_AGE_HOURS) };
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let cfg: ValidatorConfig = serde_json::from_str(r#"{"min_confidence": 0.6}"#).unwrap();
        assert_eq!(cfg.min_confidence, 0.6);
        assert_eq!(cfg.max_distance_mm, 10_000.0);
        assert_eq!(cfg.max_age_hours, 24.0);
    }
}
