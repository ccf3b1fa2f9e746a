//! Configuration file support for scanprep
//!
//! Supports TOML configuration files with the following search order:
//! 1. `--config <path>` - explicitly specified path
//! 2. `./scanprep.toml` - current directory
//! 3. `~/.config/scanprep/config.toml` - user config
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [general]
//! threads = 4
//!
//! [binarize]
//! k = 0.3
//! window_size = 41
//! mode = "binary"
//!
//! [wipe]
//! enabled = true
//!
//! [wipe.horizontal]
//! window_size = 5
//! threshold = 0.05
//! min_content_percent = 30
//!
//! [wipe.vertical]
//! window_size = 120
//! threshold = 0.005
//! strategy = "outside-in"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::binarize::{BinarizeMode, SauvolaOptions};
use crate::pipeline::PreprocessOptions;
use crate::wipe::{EdgeOptions, EdgeStrategy};

/// File name looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = "scanprep.toml";

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// File not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// General configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Number of threads for parallel processing
    #[serde(default)]
    pub threads: Option<usize>,

    /// Verbosity level (0-3)
    #[serde(default)]
    pub verbose: Option<u8>,
}

/// Binarization configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BinarizeConfig {
    /// Sauvola k
    #[serde(default)]
    pub k: Option<f64>,

    /// Window size, 0 for automatic
    #[serde(default)]
    pub window_size: Option<u32>,

    /// Output mode
    #[serde(default)]
    pub mode: Option<BinarizeMode>,
}

/// Edge detection configuration for one axis
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EdgeConfig {
    #[serde(default)]
    pub window_size: Option<u32>,

    #[serde(default)]
    pub threshold: Option<f64>,

    #[serde(default)]
    pub min_content_percent: Option<u32>,

    #[serde(default)]
    pub strategy: Option<EdgeStrategy>,
}

impl EdgeConfig {
    /// Apply the set fields on top of `base`; a zero window keeps the base size
    fn apply(&self, base: EdgeOptions) -> EdgeOptions {
        EdgeOptions::builder()
            .window_size(self.window_size.filter(|&w| w > 0).unwrap_or(base.window_size))
            .threshold(self.threshold.unwrap_or(base.threshold))
            .min_content_percent(self.min_content_percent.unwrap_or(base.min_content_percent))
            .strategy(self.strategy.unwrap_or(base.strategy))
            .build()
    }
}

/// Margin wipe configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WipeConfig {
    /// Enable wiping
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Left/right margins
    #[serde(default)]
    pub horizontal: EdgeConfig,

    /// Top/bottom margins
    #[serde(default)]
    pub vertical: EdgeConfig,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Binarization settings
    #[serde(default)]
    pub binarize: BinarizeConfig,

    /// Wipe settings
    #[serde(default)]
    pub wipe: WipeConfig,
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default search path
    ///
    /// Search order:
    /// 1. `./scanprep.toml`
    /// 2. `~/.config/scanprep/config.toml`
    /// 3. Default values (if no file found)
    pub fn load() -> Result<Self> {
        for path in Self::search_paths() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load from `explicit` when given, otherwise from the search path
    ///
    /// An explicit path that does not exist is an error.
    pub fn load_with(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Convert to preprocessing options
    pub fn to_preprocess_options(&self) -> PreprocessOptions {
        let mut binarize = SauvolaOptions::builder();
        if let Some(k) = self.binarize.k {
            binarize = binarize.k(k);
        }
        if let Some(size) = self.binarize.window_size {
            binarize = binarize.window_size(size);
        }
        if let Some(mode) = self.binarize.mode {
            binarize = binarize.mode(mode);
        }

        PreprocessOptions::builder()
            .binarize(binarize.build())
            .wipe(self.wipe.enabled.unwrap_or(true))
            .horizontal(self.wipe.horizontal.apply(EdgeOptions::horizontal()))
            .vertical(self.wipe.vertical.apply(EdgeOptions::vertical()))
            .build()
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> PreprocessOptions {
        let mut options = self.to_preprocess_options();

        let mut binarize = SauvolaOptions::builder()
            .k(cli.k.unwrap_or(options.binarize.k))
            .mode(cli.mode.unwrap_or(options.binarize.mode));
        binarize = match cli.window_size.or(options.binarize.window_size) {
            Some(size) => binarize.window_size(size),
            None => binarize.auto_window_size(),
        };
        options.binarize = binarize.build();

        if let Some(wipe) = cli.wipe {
            options.wipe = wipe;
        }
        options.horizontal = cli.horizontal.apply(options.horizontal);
        options.vertical = cli.vertical.apply(options.vertical);

        options
    }

    /// Worker thread count: CLI, then config file, then available CPUs
    pub fn thread_count(&self, cli: &CliOverrides) -> usize {
        cli.threads
            .or(self.general.threads)
            .filter(|&n| n > 0)
            .unwrap_or_else(num_cpus::get)
    }

    /// Get config file search paths
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("scanprep").join("config.toml"));
        }

        paths
    }
}

/// CLI override values for merging with config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub k: Option<f64>,
    pub window_size: Option<u32>,
    pub mode: Option<BinarizeMode>,
    pub wipe: Option<bool>,
    pub horizontal: EdgeConfig,
    pub vertical: EdgeConfig,
    pub threads: Option<usize>,
}

impl CliOverrides {
    /// Create new empty overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Set k override
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = Some(k);
        self
    }

    /// Set binarization window override
    pub fn with_window_size(mut self, size: u32) -> Self {
        self.window_size = Some(size);
        self
    }

    /// Set mode override
    pub fn with_mode(mut self, mode: BinarizeMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set wipe override
    pub fn with_wipe(mut self, wipe: bool) -> Self {
        self.wipe = Some(wipe);
        self
    }

    /// Set thread count override
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.general.threads, None);
        assert_eq!(config.binarize.k, None);
        assert_eq!(config.wipe.enabled, None);
        assert_eq!(config.wipe.horizontal, EdgeConfig::default());
        assert_eq!(Config::new(), config);
    }

    #[test]
    fn test_default_config_gives_default_options() {
        assert_eq!(Config::default().to_preprocess_options(), PreprocessOptions::default());
    }

    #[test]
    fn test_config_load_from_path_existing() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[binarize]
k = 0.2

[wipe.vertical]
window_size = 80
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(config.binarize.k, Some(0.2));
        assert_eq!(config.wipe.vertical.window_size, Some(80));
    }

    #[test]
    fn test_config_load_from_path_not_found() {
        let result = Config::load_from_path(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));

        let result = Config::load_with(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_search_paths() {
        let paths = Config::search_paths();
        assert!(!paths.is_empty());
        assert_eq!(paths[0], PathBuf::from("scanprep.toml"));
    }

    #[test]
    fn test_config_toml_parse_complete() {
        let config = Config::from_toml(
            r#"
[general]
threads = 4
verbose = 1

[binarize]
k = 0.3
window_size = 40
mode = "zeroinv"

[wipe]
enabled = false

[wipe.horizontal]
window_size = 7
threshold = 0.04
min_content_percent = 25
strategy = "outside-in"

[wipe.vertical]
window_size = 100
threshold = 0.01
min_content_percent = 20
strategy = "middle-out"
"#,
        )
        .unwrap();

        let opts = config.to_preprocess_options();
        assert_eq!(opts.binarize.k, 0.3);
        assert_eq!(opts.binarize.window_size, Some(40));
        assert_eq!(opts.binarize.mode, BinarizeMode::ZeroInverse);
        assert!(!opts.wipe);
        assert_eq!(opts.horizontal.window_size, 7);
        assert_eq!(opts.horizontal.threshold, 0.04);
        assert_eq!(opts.horizontal.min_content_percent, 25);
        assert_eq!(opts.horizontal.strategy, EdgeStrategy::OutsideIn);
        assert_eq!(opts.vertical.window_size, 100);
        assert_eq!(opts.vertical.strategy, EdgeStrategy::MiddleOut);
        assert_eq!(config.general.threads, Some(4));
    }

    #[test]
    fn test_config_toml_parse_partial() {
        let config = Config::from_toml("[wipe.horizontal]\nthreshold = 0.08\n").unwrap();
        let opts = config.to_preprocess_options();

        assert_eq!(opts.horizontal.threshold, 0.08);
        assert_eq!(opts.horizontal.window_size, 5);
        assert_eq!(opts.vertical, EdgeOptions::vertical());
        assert!(opts.wipe);
    }

    #[test]
    fn test_config_toml_parse_empty() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_config_toml_parse_invalid() {
        let result = Config::from_toml("[binarize\nk = ");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));

        let result = Config::from_toml("[binarize]\nmode = \"otsu\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_out_of_range_values_clamped() {
        let config = Config::from_toml(
            "[binarize]\nk = 3.0\n\n[wipe.horizontal]\nthreshold = 2.0\nmin_content_percent = 400\n",
        )
        .unwrap();
        let opts = config.to_preprocess_options();

        assert_eq!(opts.binarize.k, 1.0);
        assert_eq!(opts.horizontal.threshold, 1.0);
        assert_eq!(opts.horizontal.min_content_percent, 100);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config {
            binarize: BinarizeConfig {
                k: Some(0.4),
                ..Default::default()
            },
            ..Default::default()
        };

        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("k = 0.4"));
        assert_eq!(Config::from_toml(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_config_merge_cli_priority() {
        let config = Config::from_toml("[binarize]\nk = 0.2\nwindow_size = 31\n").unwrap();
        let cli = CliOverrides::new()
            .with_k(0.4)
            .with_mode(BinarizeMode::ZeroInverse)
            .with_wipe(false);

        let opts = config.merge_with_cli(&cli);
        assert_eq!(opts.binarize.k, 0.4);
        assert_eq!(opts.binarize.window_size, Some(31));
        assert_eq!(opts.binarize.mode, BinarizeMode::ZeroInverse);
        assert!(!opts.wipe);
    }

    #[test]
    fn test_config_merge_cli_edges() {
        let config = Config::from_toml("[wipe.vertical]\nwindow_size = 90\nthreshold = 0.02\n").unwrap();
        let cli = CliOverrides {
            vertical: EdgeConfig {
                threshold: Some(0.01),
                ..Default::default()
            },
            horizontal: EdgeConfig {
                min_content_percent: Some(50),
                ..Default::default()
            },
            ..Default::default()
        };

        let opts = config.merge_with_cli(&cli);
        assert_eq!(opts.vertical.window_size, 90);
        assert_eq!(opts.vertical.threshold, 0.01);
        assert_eq!(opts.horizontal.min_content_percent, 50);
        assert_eq!(opts.horizontal.threshold, 0.05);
    }

    #[test]
    fn test_config_merge_empty_cli() {
        let config = Config::from_toml("[binarize]\nk = 0.1\n").unwrap();
        assert_eq!(
            config.merge_with_cli(&CliOverrides::new()),
            config.to_preprocess_options()
        );
    }

    #[test]
    fn test_zero_window_means_auto_or_default() {
        let config = Config::from_toml(
            "[binarize]\nwindow_size = 0\n\n[wipe.horizontal]\nwindow_size = 0\n",
        )
        .unwrap();
        let opts = config.to_preprocess_options();

        assert_eq!(opts.binarize.window_size, None);
        assert_eq!(opts.horizontal.window_size, 5);
    }

    #[test]
    fn test_thread_count() {
        let config = Config::from_toml("[general]\nthreads = 3\n").unwrap();
        assert_eq!(config.thread_count(&CliOverrides::new()), 3);
        assert_eq!(config.thread_count(&CliOverrides::new().with_threads(6)), 6);
        assert_eq!(
            Config::default().thread_count(&CliOverrides::new()),
            num_cpus::get()
        );
    }

    #[test]
    fn test_cli_overrides_builder() {
        let overrides = CliOverrides::new()
            .with_k(0.1)
            .with_window_size(25)
            .with_mode(BinarizeMode::Binary)
            .with_wipe(true)
            .with_threads(2);

        assert_eq!(overrides.k, Some(0.1));
        assert_eq!(overrides.window_size, Some(25));
        assert_eq!(overrides.mode, Some(BinarizeMode::Binary));
        assert_eq!(overrides.wipe, Some(true));
        assert_eq!(overrides.threads, Some(2));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound(PathBuf::from("/test/path"));
        assert!(err.to_string().contains("Config file not found"));
    }
}
