//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Epicurve - batch analyzer for epidemic-simulation trajectories
///
/// Scans a data root for `data_<model>` directories of trajectory CSV
/// files, extracts epidemic statistics from each run, renders one
/// annotated chart per run, and writes a summary table per model.
///
/// Examples:
///   epicurve ./simulations
///   epicurve ./simulations --model 3 --format json
///   epicurve --dry-run
///   epicurve --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Data root containing the `data_<model>` directories
    #[arg(value_name = "DATA_ROOT", default_value = ".", env = "EPICURVE_DATA_ROOT")]
    pub data_root: PathBuf,

    /// Directory for rendered charts (default: `plots`, or config value)
    #[arg(short, long, value_name = "DIR")]
    pub plots_dir: Option<PathBuf>,

    /// Directory for summary tables (default: `results`, or config value)
    #[arg(short, long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Summary output format (csv, json)
    #[arg(long, default_value = "csv", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Only process runs of this model id
    #[arg(short, long, value_name = "ID")]
    pub model: Option<String>,

    /// Maximum number of run files to process
    #[arg(long, value_name = "COUNT")]
    pub max_files: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .epicurve.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dry run: scan and list run files without processing them
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .epicurve.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated table, one per model (default)
    #[default]
    Csv,
    /// JSON report, one per model
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if !self.data_root.exists() {
            return Err(format!(
                "Data root does not exist: {}",
                self.data_root.display()
            ));
        }
        if !self.data_root.is_dir() {
            return Err(format!(
                "Data root is not a directory: {}",
                self.data_root.display()
            ));
        }

        if let Some(max_files) = self.max_files {
            if max_files == 0 {
                return Err("Max files must be at least 1".to_string());
            }
        }

        if let Some(ref model) = self.model {
            if model.is_empty() {
                return Err("Model id must not be empty".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data_root: PathBuf::from("."),
            plots_dir: None,
            results_dir: None,
            format: OutputFormat::Csv,
            model: None,
            max_files: None,
            config: None,
            dry_run: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_missing_data_root() {
        let mut args = make_args();
        args.data_root = PathBuf::from("/no/such/directory");
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_max_files() {
        let mut args = make_args();
        args.max_files = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_skipped_for_init_config() {
        let mut args = make_args();
        args.data_root = PathBuf::from("/no/such/directory");
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
