//! Core types shared by every part of rollfeat
//!
//! - [`error`]: the crate-wide error enum and `Result` alias
//! - [`data_value`]: the dynamically typed cell value stored in DataFrames

pub mod data_value;
pub mod error;

pub use data_value::Value;
pub use error::{BoxError, Error, Result};
