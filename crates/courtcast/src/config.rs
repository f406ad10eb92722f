// Configuration loading and parsing (league.toml, projection.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::feed::Season;
use crate::league::aggregate::{DEFAULT_GAMES_PER_WEEK, DEFAULT_INACTIVE_SLOTS};
use crate::projection::DEFAULT_MIN_MINUTES;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub projection: ProjectionConfig,
    pub snapshot: SnapshotConfig,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub platform: String,
    #[serde(default)]
    pub league_id: Option<String>,
    /// Tracked category keys. Ratio categories need both makes and attempts.
    pub categories: Vec<String>,
    #[serde(default = "default_games_per_week")]
    pub games_per_week: f64,
    #[serde(default = "default_inactive_slots")]
    pub inactive_slots: Vec<String>,
}

fn default_games_per_week() -> f64 {
    DEFAULT_GAMES_PER_WEEK
}

fn default_inactive_slots() -> Vec<String> {
    DEFAULT_INACTIVE_SLOTS.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// projection.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire projection.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ProjectionFile {
    projection: ProjectionSection,
    snapshot: SnapshotConfig,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct ProjectionSection {
    #[serde(default = "default_min_minutes")]
    min_minutes: f64,
    #[serde(default = "default_weight")]
    weight_previous: f64,
    #[serde(default = "default_weight")]
    weight_current: f64,
    #[serde(default = "default_rate_floor_ms")]
    rate_floor_ms: u64,
    /// e.g. "2024-25"; defaults to the season containing today's date.
    #[serde(default)]
    current_season: Option<String>,
}

fn default_min_minutes() -> f64 {
    DEFAULT_MIN_MINUTES
}

fn default_weight() -> f64 {
    0.5
}

fn default_rate_floor_ms() -> u64 {
    600
}

/// The public projection config assembled from `[projection]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    pub min_minutes: f64,
    pub weight_previous: f64,
    pub weight_current: f64,
    pub rate_floor_ms: u64,
    pub current_season: Option<Season>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    pub path: String,
    /// Load projections from `path` when it exists instead of refetching.
    #[serde(default)]
    pub reuse: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// League export consumed by the JSON roster feed.
    pub roster: String,
    /// Stats-provider player list (`id,full_name`).
    pub directory: String,
    /// Root of `<season>/<player_id>.csv` game logs.
    pub game_logs: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/projection.toml`, relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- projection.toml (required) ---
    let projection_path = config_dir.join("projection.toml");
    let projection_text = read_file(&projection_path)?;
    let projection_file: ProjectionFile =
        toml::from_str(&projection_text).map_err(|e| ConfigError::ParseError {
            path: projection_path.clone(),
            source: e,
        })?;

    let section = projection_file.projection;
    let current_season = section
        .current_season
        .as_deref()
        .map(str::parse::<Season>)
        .transpose()
        .map_err(|message| ConfigError::ValidationError {
            field: "projection.current_season".into(),
            message,
        })?;

    let config = Config {
        league: league_file.league,
        projection: ProjectionConfig {
            min_minutes: section.min_minutes,
            weight_previous: section.weight_previous,
            weight_current: section.weight_current,
            rate_floor_ms: section.rate_floor_ms,
            current_season,
        },
        snapshot: projection_file.snapshot,
        data_paths: projection_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// The files `load_config_from` reads from `config/`.
const CONFIG_FILES: [&str; 2] = ["league.toml", "projection.toml"];

/// Seed `config/` with any of league.toml / projection.toml it lacks, taken
/// from the shipped `defaults/`. Existing files are never touched. Returns
/// the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(vec![]);
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "{} has neither config/ nor defaults/; courtcast needs league.toml and \
                 projection.toml in one of them",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("cannot create {}: {e}", config_dir.display()),
    })?;

    let mut seeded = Vec::new();
    for name in CONFIG_FILES {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);
        if !source.is_file() {
            continue;
        }

        // create_new fails on an existing file, so a user's edits survive.
        let mut dest = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(dest) => dest,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("cannot create {}: {e}", target.display()),
                })
            }
        };
        let mut template = std::fs::File::open(&source).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("cannot open default {name}: {e}"),
        })?;
        std::io::copy(&mut template, &mut dest).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("cannot seed {} from defaults: {e}", target.display()),
        })?;
        info!("Seeded {} from defaults", target.display());
        seeded.push(target);
    }

    Ok(seeded)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;
    if league.categories.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.categories".into(),
            message: "must list at least one category".into(),
        });
    }
    for (i, category) in league.categories.iter().enumerate() {
        if league.categories[..i].contains(category) {
            return Err(ConfigError::ValidationError {
                field: "league.categories".into(),
                message: format!("duplicate category `{category}`"),
            });
        }
    }

    let gpw = league.games_per_week;
    if !gpw.is_finite() || gpw <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "league.games_per_week".into(),
            message: format!("must be > 0, got {gpw}"),
        });
    }

    let p = &config.projection;
    if !p.min_minutes.is_finite() || p.min_minutes < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "projection.min_minutes".into(),
            message: format!("must be >= 0, got {}", p.min_minutes),
        });
    }

    let weight_fields: &[(&str, f64)] = &[
        ("projection.weight_previous", p.weight_previous),
        ("projection.weight_current", p.weight_current),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() || *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be a finite value >= 0, got {val}"),
            });
        }
    }
    if p.weight_previous == 0.0 && p.weight_current == 0.0 {
        return Err(ConfigError::ValidationError {
            field: "projection.weight_current".into(),
            message: "season weights cannot both be 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
