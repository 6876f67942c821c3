//! `arxspatial` – operator front-end for the building spatial engine.
//!
//! Converts GPS fixes into a building's local and grid frames, checks whether
//! a position update is worth persisting, validates AR payloads captured by
//! devices, and prints the JSON Schema of the persisted anchor shapes.
//!
//! Thresholds come from `~/.arxspatial/config.toml` (see `config init`),
//! overridable with `SPATIAL_*` environment variables.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use arx_spatial_types::{LocalCoordinate, Wgs84Coordinate};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::commands::{CliError, EntityKind, SchemaKind, parse_local, parse_wgs84};
use crate::config::ConfigError;

#[derive(Parser, Debug)]
#[command(name = "arxspatial", version, about = "Building coordinate transform and AR validation")]
struct Cli {
    /// Config file path (defaults to ~/.arxspatial/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a WGS84 point into local millimetres and grid cells
    Transform {
        /// Building origin as LAT,LON[,ALT]
        #[arg(long, value_parser = parse_wgs84, allow_hyphen_values = true)]
        origin: Wgs84Coordinate,
        /// Rotation of the building axes from north, degrees
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        rotation: f64,
        /// Point to convert as LAT,LON[,ALT]
        #[arg(long, value_parser = parse_wgs84, allow_hyphen_values = true)]
        point: Wgs84Coordinate,
    },
    /// Convert local millimetres back to WGS84
    ToWgs84 {
        #[arg(long, value_parser = parse_wgs84, allow_hyphen_values = true)]
        origin: Wgs84Coordinate,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        rotation: f64,
        /// Local point as X,Y,Z (mm)
        #[arg(long, value_parser = parse_local, allow_hyphen_values = true)]
        local: LocalCoordinate,
    },
    /// Report whether a move crosses a grid cell
    Moved {
        #[arg(long, value_parser = parse_local, allow_hyphen_values = true)]
        from: LocalCoordinate,
        #[arg(long, value_parser = parse_local, allow_hyphen_values = true)]
        to: LocalCoordinate,
    },
    /// Validate a JSON payload (use - for stdin)
    Validate {
        #[arg(value_enum)]
        kind: EntityKind,
        file: PathBuf,
    },
    /// Print the JSON Schema of a persisted shape
    Schema {
        #[arg(value_enum)]
        kind: SchemaKind,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    // RUST_LOG selects the level (default "info"); logs go to stderr so
    // stdout carries only command output. ARXSPATIAL_LOG_FORMAT=json switches
    // to newline-delimited JSON.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("ARXSPATIAL_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ CliError::Rejected(_)) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let path = cli.config.unwrap_or_else(config::config_path);

    match cli.command {
        Command::Config { action: ConfigAction::Init { force } } => {
            config::init(&path, force)?;
            println!("{} Config written to {}", "✓".green().bold(), path.display().to_string().bold());
        }
        Command::Config { action: ConfigAction::Show } => {
            let cfg = config::load_effective(&path)?;
            let source = if path.exists() { "from" } else { "defaults; no file at" };
            println!("{}", format!("# {source} {}", path.display()).dimmed());
            print!("{}", toml::to_string_pretty(&cfg).map_err(ConfigError::from)?);
        }
        Command::Transform { origin, rotation, point } => {
            let cfg = config::load_effective(&path)?;
            println!("{}", commands::transform(&cfg, origin, rotation, point)?);
        }
        Command::ToWgs84 { origin, rotation, local } => {
            let cfg = config::load_effective(&path)?;
            println!("{}", commands::to_wgs84(&cfg, origin, rotation, local)?);
        }
        Command::Moved { from, to } => {
            let cfg = config::load_effective(&path)?;
            if commands::moved(&cfg, from, to) {
                println!("{}", "significant".yellow().bold());
            } else {
                println!("{}", "insignificant".dimmed());
            }
        }
        Command::Validate { kind, file } => {
            let cfg = config::load_effective(&path)?;
            commands::validate(&cfg, kind, &file)?;
            println!("{} {}", "✓".green().bold(), "valid".green());
        }
        Command::Schema { kind } => {
            println!("{}", commands::schema(kind)?);
        }
    }
    Ok(())
}
