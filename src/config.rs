//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.epicurve.toml` files. The `[chart]` section is the explicit
//! styling object handed to the chart renderer; there is no global
//! plotting state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Run discovery settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Input file parsing settings.
    #[serde(default)]
    pub parser: ParserConfig,

    /// Chart styling.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory for rendered charts.
    #[serde(default = "default_plots_dir")]
    pub plots_dir: String,

    /// Directory for summary tables.
    #[serde(default = "default_results_dir")]
    pub results_dir: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            plots_dir: default_plots_dir(),
            results_dir: default_results_dir(),
            verbose: false,
        }
    }
}

fn default_plots_dir() -> String {
    "plots".to_string()
}

fn default_results_dir() -> String {
    "results".to_string()
}

/// Run discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Data directory name prefix (`data` matches `data_0`, `data_flu`).
    #[serde(default = "default_data_dir_prefix")]
    pub data_dir_prefix: String,

    /// Maximum run files per batch; 0 means unlimited.
    #[serde(default)]
    pub max_files: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            data_dir_prefix: default_data_dir_prefix(),
            max_files: 0,
        }
    }
}

fn default_data_dir_prefix() -> String {
    "data".to_string()
}

/// Input file parsing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Field delimiter in the trajectory files.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Health value at or above which an agent counts as sick; used
    /// when a file variant lacks the sick-count column.
    #[serde(default = "default_sick_threshold")]
    pub sick_threshold: f64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            sick_threshold: default_sick_threshold(),
        }
    }
}

fn default_delimiter() -> char {
    ';'
}

fn default_sick_threshold() -> f64 {
    50.0
}

/// Chart styling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Chart width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Chart height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Opacity of the per-agent trajectory lines.
    #[serde(default = "default_trajectory_alpha")]
    pub trajectory_alpha: f64,

    /// Stroke width of the per-agent trajectory lines.
    #[serde(default = "default_trajectory_stroke")]
    pub trajectory_stroke: u32,

    /// Color name for the sick-count curve.
    #[serde(default = "default_sick_color")]
    pub sick_color: String,

    /// Stroke width of the sick-count curve.
    #[serde(default = "default_sick_stroke")]
    pub sick_stroke: u32,

    /// Opacity of the grid lines.
    #[serde(default = "default_grid_alpha")]
    pub grid_alpha: f64,

    /// X axis label.
    #[serde(default = "default_x_label")]
    pub x_label: String,

    /// Primary (health) axis label.
    #[serde(default = "default_y_label")]
    pub y_label: String,

    /// Secondary (sick count) axis label.
    #[serde(default = "default_sick_label")]
    pub sick_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            trajectory_alpha: default_trajectory_alpha(),
            trajectory_stroke: default_trajectory_stroke(),
            sick_color: default_sick_color(),
            sick_stroke: default_sick_stroke(),
            grid_alpha: default_grid_alpha(),
            x_label: default_x_label(),
            y_label: default_y_label(),
            sick_label: default_sick_label(),
        }
    }
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_trajectory_alpha() -> f64 {
    0.8
}

fn default_trajectory_stroke() -> u32 {
    1
}

fn default_sick_color() -> String {
    "red".to_string()
}

fn default_sick_stroke() -> u32 {
    2
}

fn default_grid_alpha() -> f64 {
    0.3
}

fn default_x_label() -> String {
    "Time".to_string()
}

fn default_y_label() -> String {
    "Health".to_string()
}

fn default_sick_label() -> String {
    "Sick agents".to_string()
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
        let default_path = Path::new(".epicurve.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref plots_dir) = args.plots_dir {
            self.general.plots_dir = plots_dir.display().to_string();
        }
        if let Some(ref results_dir) = args.results_dir {
            self.general.results_dir = results_dir.display().to_string();
        }
        if let Some(max_files) = args.max_files {
            self.scanner.max_files = max_files;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.plots_dir, "plots");
        assert_eq!(config.general.results_dir, "results");
        assert_eq!(config.scanner.data_dir_prefix, "data");
        assert_eq!(config.parser.delimiter, ';');
        assert_eq!(config.parser.sick_threshold, 50.0);
        assert_eq!(config.chart.sick_color, "red");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
plots_dir = "figures"
verbose = true

[parser]
sick_threshold = 60.0

[chart]
width = 1024
sick_color = "blue"
x_label = "Tiempo"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.plots_dir, "figures");
        assert!(config.general.verbose);
        assert_eq!(config.parser.sick_threshold, 60.0);
        assert_eq!(config.chart.width, 1024);
        assert_eq!(config.chart.sick_color, "blue");
        assert_eq!(config.chart.x_label, "Tiempo");
        // Untouched sections keep their defaults.
        assert_eq!(config.general.results_dir, "results");
        assert_eq!(config.chart.height, 600);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[scanner]"));
        assert!(toml_str.contains("[parser]"));
        assert!(toml_str.contains("[chart]"));
    }
}
