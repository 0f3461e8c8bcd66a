//! Window operations for DataFrame
//!
//! Builds the series-level rolling primitive from a DataFrame column and
//! offers a one-shot rolling aggregation that appends its result as a new
//! column.

use crate::core::error::Result;
use crate::dataframe::base::DataFrame;
use crate::series::{default_registry, Rolling, Series, WindowExt};

/// Extension trait to add window operations to DataFrame
pub trait DataFrameWindowExt {
    /// Create a rolling window over a numeric column
    fn rolling(&self, column_name: &str, window_size: usize) -> Result<Rolling<Option<f64>>>;

    /// Apply a named rolling aggregation to a column and append the result
    fn rolling_agg(
        &self,
        window_size: usize,
        column_name: &str,
        operation: &str,
        new_column_name: Option<&str>,
    ) -> Result<DataFrame>;
}

impl DataFrameWindowExt for DataFrame {
    fn rolling(&self, column_name: &str, window_size: usize) -> Result<Rolling<Option<f64>>> {
        let values = self.get_column_as_f64(column_name)?;
        Series::new(values, Some(column_name.to_string()))?.rolling(window_size)
    }

    fn rolling_agg(
        &self,
        window_size: usize,
        column_name: &str,
        operation: &str,
        new_column_name: Option<&str>,
    ) -> Result<DataFrame> {
        let func = default_registry().get(operation)?;
        let result_series = self
            .rolling(column_name, window_size)?
            .apply_window_op(|values| func(values))?;

        let mut new_df = self.clone();
        let default_name = format!("{}_{}", column_name, operation);
        let result_column_name = new_column_name.unwrap_or(&default_name);
        new_df.add_column(
            result_column_name.to_string(),
            result_series.to_value_series()?,
        )?;

        Ok(new_df)
    }
}
