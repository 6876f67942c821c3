//! Reads and writes `~/.arxspatial/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use arx_spatial_transform::movement::{DEFAULT_FLOOR_HEIGHT_M, DEFAULT_GRID_SCALE_M};
use arx_spatial_validation::ValidatorConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config already exists at {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

/// Default grid used by `transform`, `to-wgs84` and `moved`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Metres per grid unit.
    #[serde(default = "default_grid_scale")]
    pub grid_scale_m: f64,

    /// Metres per floor.
    #[serde(default = "default_floor_height")]
    pub floor_height_m: f64,
}

fn default_grid_scale() -> f64 {
    DEFAULT_GRID_SCALE_M
}
fn default_floor_height() -> f64 {
    DEFAULT_FLOOR_HEIGHT_M
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_scale_m: default_grid_scale(),
            floor_height_m: default_floor_height(),
        }
    }
}

/// Persisted settings stored in `~/.arxspatial/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub validation: ValidatorConfig,

    #[serde(default)]
    pub grid: GridConfig,
}

/// Return the path to `~/.arxspatial/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".arxspatial").join("config.toml")
}

/// Load the config at `path`.  Returns `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// The configuration a command runs with: the file at `path` when present,
/// otherwise defaults, with environment overrides applied either way.
pub fn load_effective(path: &Path) -> Result<Config, ConfigError> {
    match load_from(path)? {
        Some(cfg) => Ok(cfg),
        None => {
            let mut cfg = Config::default();
            apply_env_overrides(&mut cfg);
            Ok(cfg)
        }
    }
}

/// Apply environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `SPATIAL_MAX_DISTANCE_MM` | `validation.max_distance_mm` |
/// | `SPATIAL_MIN_CONFIDENCE` | `validation.min_confidence` |
/// | `SPATIAL_MAX_AGE_HOURS` | `validation.max_age_hours` |
/// | `ARXSPATIAL_GRID_SCALE_M` | `grid.grid_scale_m` |
/// | `ARXSPATIAL_FLOOR_HEIGHT_M` | `grid.floor_height_m` |
pub fn apply_env_overrides(cfg: &mut Config) {
    cfg.validation.apply_env_overrides();
    apply_grid_overrides(&mut cfg.grid, |key| std::env::var(key).ok());
}

/// Values that are not finite positive numbers are ignored.
fn apply_grid_overrides(grid: &mut GridConfig, lookup: impl Fn(&str) -> Option<String>) {
    let read = |key: &str| {
        lookup(key)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
    };
    if let Some(v) = read("ARXSPATIAL_GRID_SCALE_M") {
        grid.grid_scale_m = v;
    }
    if let Some(v) = read("ARXSPATIAL_FLOOR_HEIGHT_M") {
        grid.floor_height_m = v;
    }
}

/// Save the config to `path`, creating the parent directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(write_err)?;
        }
    }
    let raw = toml::to_string_pretty(cfg)?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(write_err)?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(write_err)?;
    Ok(())
}

/// Write the default config to `path`.  Refuses to replace an existing file
/// unless `force` is set.
pub fn init(path: &Path, force: bool) -> Result<Config, ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    let cfg = Config::default();
    save_to(&cfg, path)?;
    Ok(cfg)
}
