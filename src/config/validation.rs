//! Configuration validation utilities

use super::*;
use crate::core::error::{Error, Result};
use crate::series::default_registry;
use std::collections::HashSet;

/// Validate the entire configuration
pub fn validate_config(config: &RollingConfig) -> Result<()> {
    validate_columns(config)?;
    validate_window(&config.window)?;
    validate_functions(&config.window_func)?;
    validate_logging_config(&config.logging)?;

    Ok(())
}

fn validate_columns(config: &RollingConfig) -> Result<()> {
    if config.date_column.trim().is_empty() {
        return Err(Error::ConfigurationError(
            "date_column must not be empty".to_string(),
        ));
    }

    if config.value_columns.is_empty() {
        return Err(Error::ConfigurationError(
            "at least one value column is required".to_string(),
        ));
    }

    let all = config
        .value_columns
        .iter()
        .chain(&config.group_columns)
        .chain(&config.independent_columns);
    for name in all {
        if name.trim().is_empty() {
            return Err(Error::ConfigurationError(
                "column names must not be empty".to_string(),
            ));
        }
    }

    let groups: HashSet<&String> = config.group_columns.iter().collect();
    if let Some(col) = config
        .value_columns
        .iter()
        .chain(std::iter::once(&config.date_column))
        .find(|c| groups.contains(c))
    {
        return Err(Error::ConfigurationError(format!(
            "column '{}' cannot be both a grouping column and a rolled or time column",
            col
        )));
    }

    Ok(())
}

/// Window argument must resolve to positive lengths
pub fn validate_window(window: &WindowArg) -> Result<()> {
    window
        .resolve()
        .map(|_| ())
        .map_err(|e| Error::ConfigurationError(format!("Invalid window: {}", e)))
}

/// Every configured name must be a registered built-in aggregation
pub fn validate_functions(names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(Error::ConfigurationError(
            "at least one window function is required".to_string(),
        ));
    }

    let registry = default_registry();
    for name in names {
        if !registry.contains(name) {
            return Err(Error::ConfigurationError(format!(
                "Unknown window function '{}', expected one of {:?}",
                name,
                registry.names()
            )));
        }
    }
    Ok(())
}

/// Validate logging configuration
pub fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    config.level_filter().map(|_| ())
}
