//! Subcommand implementations.
//!
//! Each command returns the text to print so it can be exercised without a
//! terminal; `main` only adds colour and the exit code.

use std::path::Path;

use arx_spatial_transform::{CoordinateTransformer, TransformParams};
use arx_spatial_types::{
    AnchorRecord, ArInstruction, ArNavigationPath, ArSessionMetrics, ArVisualization, FailureClass,
    LocalCoordinate, SpatialAnchor, SpatialPosition, SpatialRotation, SpatialScale, ValidationError,
    Wgs84Coordinate,
};
use arx_spatial_validation::SpatialValidator;
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, ConfigError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    #[error("rejected ({class}): {0}", class = class_label(.0.class()))]
    Rejected(ValidationError),
}

fn class_label(class: FailureClass) -> &'static str {
    match class {
        FailureClass::Malformed => "malformed",
        FailureClass::Stale => "stale, rescan required",
    }
}

/// Entity accepted by `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Anchor,
    Path,
    Instruction,
    Visualization,
    Session,
}

/// Wire shape printed by `schema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaKind {
    AnchorRecord,
    Position,
    Rotation,
    Scale,
}

// ────────────────────────────────────────────────────────────────────────────
// Argument parsers
// ────────────────────────────────────────────────────────────────────────────

fn parse_numbers(s: &str, min: usize, max: usize) -> Result<Vec<f64>, String> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("{:?} is not a number", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() < min || values.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min} to {max}")
        };
        return Err(format!("expected {expected} comma-separated numbers, got {}", values.len()));
    }
    Ok(values)
}

/// `LAT,LON[,ALT]`
pub fn parse_wgs84(s: &str) -> Result<Wgs84Coordinate, String> {
    let v = parse_numbers(s, 2, 3)?;
    Ok(Wgs84Coordinate::new(v[0], v[1], v.get(2).copied().unwrap_or(0.0)))
}

/// `X,Y,Z` in millimetres.
pub fn parse_local(s: &str) -> Result<LocalCoordinate, String> {
    let v = parse_numbers(s, 3, 3)?;
    Ok(LocalCoordinate::new(v[0], v[1], v[2]))
}

// ────────────────────────────────────────────────────────────────────────────
// Commands
// ────────────────────────────────────────────────────────────────────────────

fn transformer(cfg: &Config, origin: Wgs84Coordinate, rotation_deg: f64) -> CoordinateTransformer {
    let params = TransformParams::new(origin, rotation_deg)
        .grid_scale(cfg.grid.grid_scale_m)
        .floor_height(cfg.grid.floor_height_m);
    CoordinateTransformer::new(params)
}

/// WGS84 point → all three frames, as JSON.
pub fn transform(
    cfg: &Config,
    origin: Wgs84Coordinate,
    rotation_deg: f64,
    point: Wgs84Coordinate,
) -> Result<String, CliError> {
    let system = transformer(cfg, origin, rotation_deg).transform(&point);
    debug!(?system, "transformed");
    Ok(serde_json::to_string_pretty(&system)?)
}

/// Local point → WGS84, as JSON.
pub fn to_wgs84(
    cfg: &Config,
    origin: Wgs84Coordinate,
    rotation_deg: f64,
    local: LocalCoordinate,
) -> Result<String, CliError> {
    let wgs84 = transformer(cfg, origin, rotation_deg).local_to_wgs84(&local);
    Ok(serde_json::to_string_pretty(&wgs84)?)
}

/// Whether `from → to` crosses a grid cell.  The origin is irrelevant to
/// quantisation, so a zero origin is used.
pub fn moved(cfg: &Config, from: LocalCoordinate, to: LocalCoordinate) -> bool {
    transformer(cfg, Wgs84Coordinate::default(), 0.0).is_significant_movement(&from, &to)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let display = path.display().to_string();
    let raw = if display == "-" {
        std::io::read_to_string(std::io::stdin())
    } else {
        std::fs::read_to_string(path)
    }
    .map_err(|source| CliError::Read {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Parse {
        path: display,
        source,
    })
}

/// Parse `path` (or stdin for `-`) as `kind` and validate it.
pub fn validate(cfg: &Config, kind: EntityKind, path: &Path) -> Result<(), CliError> {
    let validator = SpatialValidator::new(cfg.validation);
    let result = match kind {
        EntityKind::Anchor => validator.validate_spatial_anchor(&read_json::<SpatialAnchor>(path)?),
        EntityKind::Path => validator.validate_ar_navigation_path(&read_json::<ArNavigationPath>(path)?),
        EntityKind::Instruction => validator.validate_ar_instruction(&read_json::<ArInstruction>(path)?),
        EntityKind::Visualization => {
            validator.validate_ar_visualization(&read_json::<ArVisualization>(path)?)
        }
        EntityKind::Session => validator.validate_ar_session_metrics(&read_json::<ArSessionMetrics>(path)?),
    };
    info!(?kind, ok = result.is_ok(), "validated {}", path.display());
    result.map_err(CliError::Rejected)
}

/// JSON Schema for a wire shape.
pub fn schema(kind: SchemaKind) -> Result<String, CliError> {
    let schema = match kind {
        SchemaKind::AnchorRecord => schemars::schema_for!(AnchorRecord),
        SchemaKind::Position => schemars::schema_for!(SpatialPosition),
        SchemaKind::Rotation => schemars::schema_for!(SpatialRotation),
        SchemaKind::Scale => schemars::schema_for!(SpatialScale),
    };
    Ok(serde_json::to_string_pretty(&schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    const EMPIRE: Wgs84Coordinate = Wgs84Coordinate {
        latitude: 40.7484,
        longitude: -73.9857,
        altitude: 0.0,
    };

    fn write_temp(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("input.json");
        std::fs::write(&path, contents).expect("write");
        (dir, path)
    }

    #[test]
    fn parse_wgs84_with_and_without_altitude() {
        let a = parse_wgs84("40.7484,-73.9857").unwrap();
        assert_eq!(a, Wgs84Coordinate::new(40.7484, -73.9857, 0.0));
        let b = parse_wgs84(" -33.8568, 151.2153 , 12.5").unwrap();
        assert_eq!(b.altitude, 12.5);
        assert!(b.latitude < 0.0);
    }

    #[test]
    fn parse_rejects_wrong_arity_and_garbage() {
        assert!(parse_wgs84("40.7").is_err());
        assert!(parse_wgs84("1,2,3,4").is_err());
        assert!(parse_local("1,2").is_err());
        assert!(parse_local("1,two,3").unwrap_err().contains("two"));
    }

    #[test]
    fn transform_prints_all_frames() {
        let out = transform(&Config::default(), EMPIRE, 0.0, Wgs84Coordinate::new(40.7485, -73.9857, 0.0)).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["grid"]["y"], 22);
        assert!((v["local"]["y"].as_f64().unwrap() - 11_119.49).abs() < 0.01);
    }

    #[test]
    fn to_wgs84_inverts_transform() {
        let out = to_wgs84(&Config::default(), EMPIRE, 15.0, LocalCoordinate::origin()).unwrap();
        let back: Wgs84Coordinate = serde_json::from_str(&out).unwrap();
        assert!((back.latitude - EMPIRE.latitude).abs() < 1e-9);
        assert!((back.longitude - EMPIRE.longitude).abs() < 1e-9);
    }

    #[test]
    fn moved_uses_configured_grid() {
        let from = LocalCoordinate::new(100.0, 100.0, 0.0);
        let to = LocalCoordinate::new(700.0, 100.0, 0.0);
        assert!(moved(&Config::default(), from, to));

        let coarse = Config {
            grid: GridConfig {
                grid_scale_m: 1.0,
                ..GridConfig::default()
            },
            ..Config::default()
        };
        assert!(!moved(&coarse, from, to));
    }

    #[test]
    fn validate_visualization_file() {
        let (_dir, path) = write_temp(r##"{"type":"arrow","color":"#0F0","size":1.0,"opacity":0.5,"intensity":0.5}"##);
        assert!(validate(&Config::default(), EntityKind::Visualization, &path).is_ok());
    }

    #[test]
    fn validate_reports_rejection_with_class() {
        let (_dir, path) = write_temp(r#"{"type":"arrow","color":"00FF00","size":1.0,"opacity":0.5,"intensity":0.5}"#);
        let err = validate(&Config::default(), EntityKind::Visualization, &path).unwrap_err();
        assert!(matches!(err, CliError::Rejected(ValidationError::InvalidColor { .. })));
        assert!(err.to_string().starts_with("rejected (malformed)"));
    }

    #[test]
    fn validate_stale_anchor_is_labelled_for_rescan() {
        let (_dir, path) = write_temp(
            r#"{
                "id": "a1", "building_id": "b1",
                "position": {"x": 0.0, "y": 0.0, "z": 0.0},
                "confidence": 0.9, "platform": "ARKit", "stability": 1.0, "range": 5.0,
                "timestamp": "2020-01-01T00:00:00Z", "created_at": "2020-01-01T00:00:00Z"
            }"#,
        );
        let err = validate(&Config::default(), EntityKind::Anchor, &path).unwrap_err();
        assert!(err.to_string().contains("stale"), "{err}");
    }

    #[test]
    fn validate_unknown_enum_is_a_parse_error() {
        let (_dir, path) = write_temp(r#"{"type":"hologram","size":1.0,"opacity":0.5,"intensity":0.5}"#);
        assert!(matches!(
            validate(&Config::default(), EntityKind::Visualization, &path),
            Err(CliError::Parse { .. })
        ));
    }

    #[test]
    fn validate_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("absent.json");
        assert!(matches!(
            validate(&Config::default(), EntityKind::Session, &path),
            Err(CliError::Read { .. })
        ));
    }

    #[test]
    fn anchor_record_schema_lists_required_fields() {
        let out = schema(SchemaKind::AnchorRecord).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        let required: Vec<&str> = v["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|f| f.as_str())
            .collect();
        assert!(required.contains(&"building_id"));
        assert!(required.contains(&"position"));
    }
}
