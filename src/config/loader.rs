//! Configuration loading utilities
//!
//! Files are read as YAML or TOML by extension. Environment variables use
//! the `ROLLFEAT_` prefix and override whatever the file set.

use super::*;
use crate::core::error::{Error, Result};
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ROLLFEAT_";

/// Load configuration from environment variables over the defaults
pub fn load_from_env() -> Result<RollingConfig> {
    let mut config = RollingConfig::default();
    apply_env(&mut config, |key| env::var(key).ok())?;
    Ok(config)
}

/// Override `config` with every variable `lookup` resolves
///
/// Recognized keys: `ROLLFEAT_DATE_COLUMN`, `ROLLFEAT_VALUE_COLUMNS`,
/// `ROLLFEAT_GROUP_COLUMNS`, `ROLLFEAT_INDEPENDENT_COLUMNS` and
/// `ROLLFEAT_WINDOW_FUNC` (comma separated), `ROLLFEAT_WINDOW` (`3`, `2,7` or
/// `1..3`), `ROLLFEAT_CENTER`, `ROLLFEAT_MIN_PERIODS`, `ROLLFEAT_CLOSED` and
/// `ROLLFEAT_LOG_LEVEL`. `RUST_LOG` is used as the level only when it is a
/// bare level such as `debug`; filter directives like `rollfeat=debug` are
/// left to the logger.
pub fn apply_env<F>(config: &mut RollingConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

    if let Some(date_column) = var("DATE_COLUMN") {
        config.date_column = date_column;
    }
    if let Some(columns) = var("VALUE_COLUMNS") {
        config.value_columns = split_list(&columns);
    }
    if let Some(columns) = var("GROUP_COLUMNS") {
        config.group_columns = split_list(&columns);
    }
    if let Some(columns) = var("INDEPENDENT_COLUMNS") {
        config.independent_columns = split_list(&columns);
    }
    if let Some(funcs) = var("WINDOW_FUNC") {
        config.window_func = split_list(&funcs);
    }
    if let Some(window) = var("WINDOW") {
        config.window = parse_window(&window)?;
    }
    if let Some(center) = var("CENTER") {
        config.center = center.trim().parse().map_err(|e| {
            Error::ConfigurationError(format!("Invalid {}CENTER: {}", ENV_PREFIX, e))
        })?;
    }
    if let Some(min_periods) = var("MIN_PERIODS") {
        config.min_periods = Some(min_periods.trim().parse().map_err(|e| {
            Error::ConfigurationError(format!("Invalid {}MIN_PERIODS: {}", ENV_PREFIX, e))
        })?);
    }
    if let Some(closed) = var("CLOSED") {
        config.closed = parse_closed(&closed)?;
    }
    if let Some(level) = var("LOG_LEVEL") {
        config.logging.level = level;
    } else if let Some(level) = lookup("RUST_LOG").filter(|l| is_bare_level(l)) {
        config.logging.level = level;
    }

    Ok(())
}

fn is_bare_level(raw: &str) -> bool {
    raw.trim().parse::<log::LevelFilter>().is_ok()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `3`, `2,7` or `1..3`
pub fn parse_window(raw: &str) -> Result<WindowArg> {
    let invalid = |e: std::num::ParseIntError| {
        Error::ConfigurationError(format!("Invalid window '{}': {}", raw, e))
    };
    let raw_trimmed = raw.trim();

    if let Some((from, to)) = raw_trimmed.split_once("..") {
        return Ok(WindowArg::Range {
            from: from.trim().parse().map_err(invalid)?,
            to: to.trim().parse().map_err(invalid)?,
        });
    }
    if raw_trimmed.contains(',') {
        let lengths = raw_trimmed
            .split(',')
            .map(|n| n.trim().parse::<i64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(invalid)?;
        return Ok(WindowArg::List(lengths));
    }
    Ok(WindowArg::Single(raw_trimmed.parse().map_err(invalid)?))
}

fn parse_closed(raw: &str) -> Result<WindowClosed> {
    match raw.trim().to_lowercase().as_str() {
        "right" => Ok(WindowClosed::Right),
        "left" => Ok(WindowClosed::Left),
        "both" => Ok(WindowClosed::Both),
        "neither" => Ok(WindowClosed::Neither),
        other => Err(Error::ConfigurationError(format!(
            "Invalid {}CLOSED: {}",
            ENV_PREFIX, other
        ))),
    }
}

/// Load configuration from a file (YAML or TOML based on extension)
pub fn load_from_file(path: &Path) -> Result<RollingConfig> {
    if !path.exists() {
        return Err(Error::ConfigurationError(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        Error::ConfigurationError(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => load_from_yaml(&contents),
        Some("toml") => load_from_toml(&contents),
        Some(ext) => Err(Error::ConfigurationError(format!(
            "Unsupported config file format: {}",
            ext
        ))),
        None => load_from_yaml(&contents).or_else(|_| load_from_toml(&contents)),
    }
}

/// Load configuration from YAML string
pub fn load_from_yaml(yaml: &str) -> Result<RollingConfig> {
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse YAML config: {}", e)))
}

/// Load configuration from TOML string
pub fn load_from_toml(toml: &str) -> Result<RollingConfig> {
    toml::from_str(toml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse TOML config: {}", e)))
}

/// Load configuration with precedence: defaults -> file -> environment
pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<RollingConfig> {
    let mut config = match config_file {
        Some(file_path) => load_from_file(file_path.as_ref())?,
        None => RollingConfig::default(),
    };

    apply_env(&mut config, |key| env::var(key).ok())?;

    config.validate()?;
    log::debug!("loaded rolling config: {:?}", config);
    Ok(config)
}

/// Save configuration to a file
pub fn save_to_file(config: &RollingConfig, path: &Path) -> Result<()> {
    let contents = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => config.to_yaml()?,
        Some("toml") => config.to_toml()?,
        Some(ext) => {
            return Err(Error::ConfigurationError(format!(
                "Unsupported config file format: {}",
                ext
            )))
        }
        None => config.to_yaml()?,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigurationError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    fs::write(path, contents).map_err(|e| {
        Error::ConfigurationError(format!(
            "Failed to write config file {}: {}",
            path.display(),
            e
        ))
    })
}
