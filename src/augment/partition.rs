//! Group partitioner
//!
//! Sorts the input by `(group columns..., time column)` and cuts it into one
//! partition per group key. Without group columns the whole time-sorted table
//! is a single partition with an empty key.

use crate::core::data_value::Value;
use crate::core::error::{Error, Result};
use crate::dataframe::groupby::split_runs;
use crate::dataframe::DataFrame;

/// Rows sharing one group key, in time order
#[derive(Debug, Clone)]
pub struct Partition {
    pub key: Vec<Value>,
    pub frame: DataFrame,
}

/// Split `df` into time-ordered partitions
pub fn partition(
    df: &DataFrame,
    group_columns: &[String],
    time_column: &str,
) -> Result<Vec<Partition>> {
    if !df.contains_column(time_column) {
        return Err(Error::MissingColumn(time_column.to_string()));
    }
    for col in group_columns {
        if !df.contains_column(col) {
            return Err(Error::MissingColumn(col.clone()));
        }
    }

    let keys: Vec<&str> = group_columns.iter().map(String::as_str).collect();
    let mut sort_keys = keys.clone();
    sort_keys.push(time_column);

    let sorted = df.sort_by_columns(&sort_keys)?;
    let partitions: Vec<Partition> = split_runs(&sorted, &keys)?
        .into_iter()
        .map(|(key, frame)| Partition { key, frame })
        .collect();

    log::debug!(
        "partitioned {} rows into {} partition(s) by {:?}",
        df.row_count(),
        partitions.len(),
        keys
    );
    Ok(partitions)
}
