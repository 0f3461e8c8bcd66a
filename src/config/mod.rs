//! Configuration management for rolling feature jobs
//!
//! A [`RollingConfig`] describes one `augment_rolling` invocation in a form
//! that can live in a YAML or TOML file or in `ROLLFEAT_*` environment
//! variables. Custom callables cannot be expressed here; configured jobs use
//! built-in aggregation names only.

use crate::augment::{augment_rolling, RollingOptions, RollingSpec, WindowArg};
use crate::core::error::{Error, Result};
use crate::dataframe::{DataFrame, DataFrameGroupBy, GroupByExt};
use crate::series::WindowClosed;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod loader;
pub mod validation;

/// One configured rolling augmentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollingConfig {
    /// Column that orders rows in time
    pub date_column: String,
    /// Columns to roll over
    pub value_columns: Vec<String>,
    /// Grouping columns; empty means one partition
    pub group_columns: Vec<String>,
    /// Auxiliary columns for frame callables
    pub independent_columns: Vec<String>,
    /// Window length, list of lengths or `{from, to}` range
    pub window: WindowArg,
    /// Built-in aggregation names
    pub window_func: Vec<String>,
    /// Center windows on the current row
    pub center: bool,
    /// Observations required for a value (defaults to the window length)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_periods: Option<usize>,
    /// Boundary convention for trailing windows
    pub closed: WindowClosed,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration section
///
/// The crate only emits through the `log` facade and never installs a
/// logger. Whoever installs one reads [`LoggingConfig::level_filter`] and
/// hands it to the logger or to `log::set_max_level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (off, error, warn, info, debug, trace)
    pub level: String,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            date_column: String::new(),
            value_columns: Vec::new(),
            group_columns: Vec::new(),
            independent_columns: Vec::new(),
            window: WindowArg::default(),
            window_func: vec!["mean".to_string()],
            center: false,
            min_periods: None,
            closed: WindowClosed::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parsed level filter for the caller's logger
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level.parse().map_err(|_| {
            Error::ConfigurationError(format!("Unknown log level: {}", self.level))
        })
    }
}

impl RollingConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        loader::load_from_env()
    }

    /// Load configuration from a file (YAML or TOML)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        loader::load_from_file(path.as_ref())
    }

    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        loader::load_from_yaml(yaml)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml: &str) -> Result<Self> {
        loader::load_from_toml(toml)
    }

    /// Load configuration with precedence: defaults -> file -> env
    pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self> {
        loader::load_with_precedence(config_file)
    }

    /// Validate configuration and return errors if invalid
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        loader::save_to_file(self, path.as_ref())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            Error::ConfigurationError(format!("Failed to serialize config to YAML: {}", e))
        })
    }

    /// Convert to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| {
            Error::ConfigurationError(format!("Failed to serialize config to TOML: {}", e))
        })
    }

    /// Build the engine spec this configuration describes
    pub fn to_spec(&self) -> RollingSpec {
        RollingSpec::new(self.date_column.clone(), self.value_columns.clone())
            .independent_columns(self.independent_columns.clone())
            .window(self.window.clone())
            .window_func(self.window_func.clone())
            .center(self.center)
            .options(RollingOptions {
                min_periods: self.min_periods,
                closed: self.closed,
            })
    }

    /// Group `df` by the configured grouping columns
    pub fn group_by(&self, df: &DataFrame) -> Result<DataFrameGroupBy> {
        if self.group_columns.is_empty() {
            return Err(Error::ConfigurationError(
                "no group_columns configured".to_string(),
            ));
        }
        df.group_by(self.group_columns.as_slice())
    }

    /// Validate, then run the configured augmentation over `df`
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        self.validate()?;
        let spec = self.to_spec();
        if self.group_columns.is_empty() {
            augment_rolling(df, &spec)
        } else {
            augment_rolling(&self.group_by(df)?, &spec)
        }
    }
}
