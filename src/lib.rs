//! rollfeat: rolling-window feature generation over time-ordered, optionally
//! grouped tables.
//!
//! The entry point is [`augment_rolling`], which takes a [`DataFrame`] (or a
//! grouped view from [`GroupByExt::group_by`]) and a [`RollingSpec`] and
//! returns the frame with one derived column per value column, window length
//! and aggregation.

// Core module with fundamental data structures and traits
pub mod core;

// Tabular substrate
pub mod dataframe;
pub mod na;
pub mod series;

// Rolling feature engine
pub mod augment;

// Configuration loading and validation
pub mod config;

// Re-export core types
pub use core::data_value::Value;
pub use core::error::{BoxError, Error, Result};

pub use dataframe::{DataFrame, DataFrameGroupBy, DataFrameWindowExt, GroupByExt};
pub use na::NA;
pub use series::{
    default_registry, AggregationRegistry, Rolling, Series, WindowClosed, WindowExt, WindowOps,
};

pub use augment::{
    augment_rolling, AugmentRollingExt, FuncArg, RollingInput, RollingOptions, RollingSpec,
    WindowArg, WindowFunc, WindowOutput,
};
pub use config::{LoggingConfig, RollingConfig};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
