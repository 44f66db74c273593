//! Configuration management for ismip-hom.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{IsmipError, Result};
use crate::grid::DEFAULT_POINTS_PER_QUARTER;

/// Command-line arguments for ismip-hom
#[derive(Parser, Debug, Default)]
#[command(name = "ismip-hom")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Root directory searched recursively for benchmark result files
    #[arg(short, long, env = "ISMIP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory the comparison tables and run summary are written to
    #[arg(short, long, env = "ISMIP_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Extension of result files (case-insensitive)
    #[arg(short, long, env = "ISMIP_EXTENSION")]
    pub extension: Option<String>,

    /// Grid intervals per quarter of each axis
    #[arg(short = 'k', long, env = "ISMIP_POINTS_PER_QUARTER")]
    pub points_per_quarter: Option<usize>,

    /// Scattered interpolation method (linear, nearest)
    #[arg(short = 'm', long, env = "ISMIP_INTERPOLATION")]
    pub interpolation_method: Option<String>,

    /// Coordinate convention of experiment f files (auto, normalized, physical)
    #[arg(long, env = "ISMIP_COORDINATES")]
    pub coordinate_convention: Option<String>,

    /// Number of worker threads (1 = sequential)
    #[arg(short, long, env = "ISMIP_WORKERS")]
    pub workers: Option<usize>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "ISMIP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ISMIP_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the recursive data file search
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Where tables and the run summary go
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Data file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Gridding and interpolation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// `k`: each query grid axis has `4k + 1` points
    #[serde(default = "default_points_per_quarter")]
    pub points_per_quarter: usize,

    /// Scattered interpolation method
    #[serde(default = "default_interpolation")]
    pub interpolation_method: String,

    /// Coordinate convention detector for experiment f
    #[serde(default = "default_coordinate_convention")]
    pub coordinate_convention: String,

    /// Number of worker threads (None = number of CPU cores)
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Build a configuration from already parsed arguments.
    ///
    /// Environment variables reach this point through `clap`, so they
    /// rank between the config file and explicit flags.
    pub fn from_args(args: Args) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(data_dir) = args.data_dir {
            config.paths.data_dir = data_dir;
        }
        if let Some(output_dir) = args.output_dir {
            config.paths.output_dir = output_dir;
        }
        if let Some(extension) = args.extension {
            config.paths.extension = extension;
        }
        if let Some(k) = args.points_per_quarter {
            config.processing.points_per_quarter = k;
        }
        if let Some(method) = args.interpolation_method {
            config.processing.interpolation_method = method;
        }
        if let Some(convention) = args.coordinate_convention {
            config.processing.coordinate_convention = convention;
        }
        if args.workers.is_some() {
            config.processing.workers = args.workers;
        }
        if let Some(log_level) = args.log_level {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| IsmipError::Config {
            message: format!("Cannot read config file {}: {}", path.display(), e),
        })?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.paths = other.paths;
        let workers = other.processing.workers.or(self.processing.workers);
        self.processing = other.processing;
        self.processing.workers = workers;
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.paths.data_dir.as_os_str().is_empty() {
            return Err(IsmipError::Config {
                message: "Data directory cannot be empty".to_string(),
            });
        }

        if self.paths.output_dir.as_os_str().is_empty() {
            return Err(IsmipError::Config {
                message: "Output directory cannot be empty".to_string(),
            });
        }

        if self.paths.extension.is_empty() {
            return Err(IsmipError::Config {
                message: "Data file extension cannot be empty".to_string(),
            });
        }

        if self.processing.points_per_quarter == 0 {
            return Err(IsmipError::Config {
                message: "points_per_quarter must be at least 1".to_string(),
            });
        }

        if self.processing.workers == Some(0) {
            return Err(IsmipError::Config {
                message: "Worker count cannot be 0".to_string(),
            });
        }

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(IsmipError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        // Validate interpolation method
        match self.processing.interpolation_method.to_lowercase().as_str() {
            "linear" | "nearest" => {}
            _ => {
                return Err(IsmipError::Config {
                    message: format!(
                        "Invalid interpolation method: {}. Must be one of: linear, nearest",
                        self.processing.interpolation_method
                    ),
                });
            }
        }

        match self.processing.coordinate_convention.to_lowercase().as_str() {
            "auto" | "normalized" | "physical" => {}
            _ => {
                return Err(IsmipError::Config {
                    message: format!(
                        "Invalid coordinate convention: {}. \
                         Must be one of: auto, normalized, physical",
                        self.processing.coordinate_convention
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            processing: ProcessingConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            extension: default_extension(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            points_per_quarter: default_points_per_quarter(),
            interpolation_method: default_interpolation(),
            coordinate_convention: default_coordinate_convention(),
            workers: None,
        }
    }
}

// Default value functions for serde
fn default_data_dir() -> PathBuf {
    PathBuf::from("./ismip_all")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_extension() -> String {
    "txt".to_string()
}

fn default_points_per_quarter() -> usize {
    DEFAULT_POINTS_PER_QUARTER
}

fn default_interpolation() -> String {
    "linear".to_string()
}

fn default_coordinate_convention() -> String {
    "auto".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.paths.data_dir, PathBuf::from("./ismip_all"));
        assert_eq!(config.paths.output_dir, PathBuf::from("./output"));
        assert_eq!(config.paths.extension, "txt");
        assert_eq!(config.processing.points_per_quarter, 25);
        assert_eq!(config.processing.interpolation_method, "linear");
        assert_eq!(config.processing.coordinate_convention, "auto");
        assert_eq!(config.processing.workers, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_merge() {
        let mut config1 = Config::default();
        config1.processing.workers = Some(2);
        let mut config2 = Config::default();

        config2.processing.points_per_quarter = 10;
        config2.paths.data_dir = PathBuf::from("/data/ismip");

        config1.merge(config2);

        assert_eq!(config1.processing.points_per_quarter, 10);
        assert_eq!(config1.paths.data_dir, PathBuf::from("/data/ismip"));
        assert_eq!(config1.processing.workers, Some(2));
    }

    #[test]
    fn test_layering_file_then_args() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "paths": {"output_dir": "/tmp/out"},
                "processing": {"interpolation_method": "nearest", "workers": 4}
            }"#,
        )
        .unwrap();

        let args = Args {
            config: Some(path),
            workers: Some(1),
            log_level: Some("debug".to_string()),
            ..Args::default()
        };
        let config = Config::from_args(args).unwrap();

        assert_eq!(config.paths.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.paths.data_dir, PathBuf::from("./ismip_all"));
        assert_eq!(config.processing.interpolation_method, "nearest");
        assert_eq!(config.processing.points_per_quarter, 25);
        assert_eq!(config.processing.workers, Some(1));
        assert_eq!(config.log_level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_config_file() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/ismip.json")),
            ..Args::default()
        };
        assert!(matches!(Config::from_args(args), Err(IsmipError::Config { .. })));
    }

    #[test]
    fn test_config_validation() {
        // Valid config should pass
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.paths.data_dir = PathBuf::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.paths.output_dir = PathBuf::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.processing.points_per_quarter = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.processing.workers = Some(0);
        assert!(config.validate().is_err());

        // Test invalid log level
        let mut config = Config::default();
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());

        // Test invalid interpolation method
        let mut config = Config::default();
        config.processing.interpolation_method = "bicubic".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.processing.coordinate_convention = "polar".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_accepts_any_case() {
        // The registries resolve names case-insensitively, so must validation.
        let mut config = Config::default();
        config.processing.interpolation_method = "Linear".to_string();
        config.processing.coordinate_convention = "PHYSICAL".to_string();
        assert!(config.validate().is_ok());

        crate::interpolation::get_interpolator(&config.processing.interpolation_method).unwrap();
        crate::coordinates::get_detector(&config.processing.coordinate_convention).unwrap();
    }
}
