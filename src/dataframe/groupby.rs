//! GroupBy view for DataFrames
//!
//! A [`DataFrameGroupBy`] pairs a frame with its grouping columns. Groups are
//! materialized by stable-sorting on the keys and cutting the result into
//! contiguous runs, so the order of groups is the sorted order of their keys
//! and every row lands in exactly one group. Rows whose key is null form their
//! own group (sorted last) rather than being dropped.

use std::cmp::Ordering;

use crate::core::data_value::Value;
use crate::core::error::{Error, Result};
use crate::dataframe::base::DataFrame;

/// Grouped view over a DataFrame
#[derive(Debug, Clone)]
pub struct DataFrameGroupBy {
    /// Original DataFrame
    df: DataFrame,
    /// Grouping column(s)
    group_by_columns: Vec<String>,
}

impl DataFrameGroupBy {
    /// Create a new DataFrame GroupBy
    pub fn new(df: DataFrame, group_by_columns: Vec<String>) -> Result<Self> {
        if group_by_columns.is_empty() {
            return Err(Error::InvalidInputType(
                "a grouped DataFrame needs at least one grouping column".to_string(),
            ));
        }
        for col in &group_by_columns {
            if !df.contains_column(col) {
                return Err(Error::MissingColumn(col.clone()));
            }
        }

        Ok(Self {
            df,
            group_by_columns,
        })
    }

    /// The ungrouped frame
    pub fn obj(&self) -> &DataFrame {
        &self.df
    }

    /// Grouping column names, in order
    pub fn group_columns(&self) -> &[String] {
        &self.group_by_columns
    }

    /// Materialize `(key, rows)` pairs in sorted key order
    pub fn groups(&self) -> Result<Vec<(Vec<Value>, DataFrame)>> {
        let keys: Vec<&str> = self.group_by_columns.iter().map(String::as_str).collect();
        let sorted = self.df.sort_by_columns(&keys)?;
        split_runs(&sorted, &keys)
    }

    /// Number of distinct group keys
    pub fn ngroups(&self) -> Result<usize> {
        Ok(self.groups()?.len())
    }
}

/// Cut an already sorted frame into maximal runs of equal key values
pub(crate) fn split_runs(
    sorted: &DataFrame,
    key_columns: &[&str],
) -> Result<Vec<(Vec<Value>, DataFrame)>> {
    if key_columns.is_empty() {
        return Ok(vec![(Vec::new(), sorted.clone())]);
    }

    let keys = key_columns
        .iter()
        .map(|name| sorted.get_column(name))
        .collect::<Result<Vec<_>>>()?;
    let key_at = |row: usize| -> Vec<Value> { keys.iter().map(|c| c.values()[row].clone()).collect() };
    let same_key = |a: usize, b: usize| {
        keys.iter()
            .all(|c| c.values()[a].sort_cmp(&c.values()[b]) == Ordering::Equal)
    };

    let mut runs = Vec::new();
    let mut start = 0;
    for row in 1..=sorted.row_count() {
        if row == sorted.row_count() || !same_key(start, row) {
            runs.push((key_at(start), sorted.slice_rows(start, row)?));
            start = row;
        }
    }
    Ok(runs)
}

/// Extension trait for grouping a DataFrame
pub trait GroupByExt {
    /// Group DataFrame by one or more columns
    fn group_by<S: AsRef<str>>(&self, columns: &[S]) -> Result<DataFrameGroupBy>;
}

impl GroupByExt for DataFrame {
    fn group_by<S: AsRef<str>>(&self, columns: &[S]) -> Result<DataFrameGroupBy> {
        let group_columns: Vec<String> = columns.iter().map(|s| s.as_ref().to_string()).collect();
        DataFrameGroupBy::new(self.clone(), group_columns)
    }
}
