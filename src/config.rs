//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.esgdash.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".esgdash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input files.
    #[serde(default)]
    pub data: DataConfig,

    /// Web app settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Chart and aggregation settings.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Indicator list overrides.
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path for one-shot renders.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "esg_dashboard.svg".to_string()
}

/// Input file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Disclosure dataset CSV.
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Alias CSV (`Alias`, `indicator`). Empty disables alias labels.
    #[serde(default = "default_aliases")]
    pub aliases: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            aliases: default_aliases(),
        }
    }
}

fn default_dataset() -> String {
    "database.csv".to_string()
}

fn default_aliases() -> String {
    "esg_indicator_aliases.csv".to_string()
}

/// Web app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the dashboards are served on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8050".to_string()
}

/// Chart and aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Width of line charts in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Height of line charts in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Number of indicators shown by the frequency dashboard.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Companies with fewer distinct reporting years are left out of the
    /// leaders dashboard.
    #[serde(default = "default_min_years")]
    pub min_years_reported: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            top_n: default_top_n(),
            min_years_reported: default_min_years(),
        }
    }
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    600
}

fn default_top_n() -> usize {
    5
}

fn default_min_years() -> usize {
    3
}

/// Per-category replacements for the built-in indicator lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governance: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and their environment variables) take precedence over
    /// config file settings. Only explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.data.dataset = data.display().to_string();
        }
        if let Some(ref aliases) = args.aliases {
            self.data.aliases = aliases.display().to_string();
        }
        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }
        if let Some(top_n) = args.top_n {
            self.chart.top_n = top_n;
        }
        if let Some(min_years) = args.min_years {
            self.chart.min_years_reported = min_years;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
