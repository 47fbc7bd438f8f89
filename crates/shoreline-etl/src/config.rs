use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use shoreline_core::{LengthUnit, MeasureMethod};
use std::path::PathBuf;

/// Which statute mile lengths are reported in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatuteMile {
    /// US survey mile (1609.3472186944 m).
    #[default]
    UsSurvey,
    /// International mile (1609.344 m).
    International,
}

impl StatuteMile {
    #[must_use]
    pub const fn unit(self) -> LengthUnit {
        match self {
            Self::UsSurvey => LengthUnit::StatuteMiles,
            Self::International => LengthUnit::IntStatuteMiles,
        }
    }
}

/// Logger settings handed to the binary's logger setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_coloured")]
    pub coloured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            coloured: default_coloured(),
        }
    }
}

/// Configuration for shoreline-ruler.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (SHORELINE_* prefix)
/// 3. Config file (~/.config/shoreline-ruler/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Attribute field holding the C-COAST shoreline class.
    ///
    /// Can be set via:
    /// - CLI: --class-field NAME
    /// - ENV: SHORELINE_CLASS_FIELD
    /// - Config: class_field = "CLASS"
    #[serde(default = "default_class_field")]
    pub class_field: String,

    /// Directory that exported results tables are written to.
    ///
    /// Can be set via:
    /// - CLI: --out /path/to/dir
    /// - ENV: SHORELINE_EXPORT_DIR
    /// - Config: export_dir = "/path/to/dir"
    /// - Default: ~/.local/share/shoreline-ruler/scratch
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Statute mile definition used for the `length_sm` column.
    #[serde(default)]
    pub statute_mile: StatuteMile,

    /// How feature lengths are measured.
    #[serde(default)]
    pub method: MeasureMethod,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            class_field: default_class_field(),
            export_dir: default_export_dir(),
            statute_mile: StatuteMile::default(),
            method: MeasureMethod::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/shoreline-ruler/config.toml
    /// Reads environment variables with SHORELINE_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("shoreline");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }
}

fn default_class_field() -> String {
    "CLASS".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_coloured() -> bool {
    true
}

/// Get the default export directory.
///
/// Returns: ~/.local/share/shoreline-ruler/scratch (or platform equivalent)
fn default_export_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shoreline-ruler")
        .join("scratch")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/shoreline-ruler/config.toml
/// - macOS: ~/Library/Application Support/shoreline-ruler/config.toml
/// - Windows: %APPDATA%\shoreline-ruler\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shoreline-ruler")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Shoreline Ruler Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (SHORELINE_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Attribute field holding the C-COAST shoreline class.
# Lengths are broken down by this field when a shapefile has it.
#
# Can also be set via:
# - CLI: shoreline-ruler measure --class-field CLASS ...
# - Environment: SHORELINE_CLASS_FIELD=CLASS
class_field = "CLASS"

# Where exported results tables (.dbf or .json) are written.
#
# Can also be set via:
# - CLI: shoreline-ruler measure --export dbf --out /some/dir ...
# - Environment: SHORELINE_EXPORT_DIR=/some/dir
#
# Default: Platform-specific data directory
#export_dir = "/path/to/scratch"

# Statute mile used for the length_sm column: "us_survey" or "international"
statute_mile = "us_survey"

# Measurement method: "utm" (planar, in the zone picked per shapefile)
# or "geodesic" (on the WGS84 ellipsoid, as a cross-check)
method = "utm"

[logging]
# error, warn, info, debug or trace
level = "info"
coloured = true
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
