use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::core::data_value::Value;
use crate::core::error::{Error, Result};
use crate::series::Series;

/// DataFrame struct: Column-oriented 2D data structure
///
/// Every row carries an original-position identifier (the index). Sorting and
/// slicing move index entries together with their rows, so a frame can always
/// be put back into its input order with [`DataFrame::sort_by_index`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: HashMap<String, Series<Value>>,
    column_order: Vec<String>,
    row_count: usize,
    index: Vec<usize>,
}

impl DataFrame {
    /// Create a new empty DataFrame
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a DataFrame from `(name, values)` pairs, in order
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut df = Self::new();
        for (name, values) in columns {
            let name = name.into();
            df.add_column(name.clone(), Series::new(values, Some(name))?)?;
        }
        Ok(df)
    }

    /// Replace the original index. The index must match the row count.
    pub fn with_index(mut self, index: Vec<usize>) -> Result<Self> {
        if !self.columns.is_empty() && index.len() != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: index.len(),
            });
        }
        self.row_count = index.len();
        self.index = index;
        Ok(self)
    }

    /// Check if the DataFrame contains a column with the given name
    pub fn contains_column(&self, column_name: &str) -> bool {
        self.columns.contains_key(column_name)
    }

    /// Get the number of rows in the DataFrame
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get the number of rows (alias for compatibility)
    pub fn nrows(&self) -> usize {
        self.row_count
    }

    /// Get the number of columns in the DataFrame
    pub fn column_count(&self) -> usize {
        self.column_order.len()
    }

    /// Original-position identifiers, one per row
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Add a column to the DataFrame
    pub fn add_column(&mut self, column_name: String, series: Series<Value>) -> Result<()> {
        if self.contains_column(&column_name) {
            return Err(Error::DuplicateColumnName(column_name));
        }

        let series_len = series.len();
        if self.columns.is_empty() && self.index.is_empty() {
            self.row_count = series_len;
            self.index = (0..series_len).collect();
        } else if series_len != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: series_len,
            });
        }

        self.columns
            .insert(column_name.clone(), series.with_name(column_name.clone()));
        self.column_order.push(column_name);
        Ok(())
    }

    /// Get column names in the DataFrame
    pub fn column_names(&self) -> Vec<String> {
        self.column_order.clone()
    }

    /// Get a column by position
    pub fn column_name(&self, idx: usize) -> Option<&String> {
        self.column_order.get(idx)
    }

    /// Get a column from the DataFrame
    pub fn get_column(&self, column_name: &str) -> Result<&Series<Value>> {
        self.columns
            .get(column_name)
            .ok_or_else(|| Error::MissingColumn(column_name.to_string()))
    }

    /// Get a column as numbers; nulls become `None`
    pub fn get_column_as_f64(&self, column_name: &str) -> Result<Vec<Option<f64>>> {
        self.get_column(column_name)?.as_f64().map_err(|e| match e {
            Error::Type(msg) => Error::Type(format!("column '{}': {}", column_name, msg)),
            other => other,
        })
    }

    /// Get a single cell
    pub fn value(&self, column_name: &str, row: usize) -> Result<&Value> {
        let column = self.get_column(column_name)?;
        column.get(row).ok_or(Error::IndexOutOfBounds {
            index: row,
            size: self.row_count,
        })
    }

    /// Gather rows at the given positions, carrying their index entries along
    pub fn take_rows(&self, positions: &[usize]) -> Result<DataFrame> {
        let mut index = Vec::with_capacity(positions.len());
        for &p in positions {
            let entry = self.index.get(p).ok_or(Error::IndexOutOfBounds {
                index: p,
                size: self.row_count,
            })?;
            index.push(*entry);
        }

        let mut columns = HashMap::with_capacity(self.columns.len());
        for name in &self.column_order {
            columns.insert(name.clone(), self.columns[name].take(positions)?);
        }

        Ok(DataFrame {
            columns,
            column_order: self.column_order.clone(),
            row_count: positions.len(),
            index,
        })
    }

    /// Copy the contiguous rows `[start, end)`
    pub fn slice_rows(&self, start: usize, end: usize) -> Result<DataFrame> {
        if start > end || end > self.row_count {
            return Err(Error::IndexOutOfBounds {
                index: end,
                size: self.row_count,
            });
        }
        let positions: Vec<usize> = (start..end).collect();
        self.take_rows(&positions)
    }

    /// Create a new DataFrame with only the specified columns
    pub fn select_columns(&self, columns: &[&str]) -> Result<DataFrame> {
        let mut selected = HashMap::with_capacity(columns.len());
        let mut order = Vec::with_capacity(columns.len());
        for &name in columns {
            let series = self.get_column(name)?;
            if selected.insert(name.to_string(), series.clone()).is_none() {
                order.push(name.to_string());
            }
        }
        Ok(DataFrame {
            columns: selected,
            column_order: order,
            row_count: self.row_count,
            index: self.index.clone(),
        })
    }

    /// Row positions ordered by the given key columns, ascending. Ties keep
    /// original index order, so the sort is stable with respect to the input.
    pub fn sorted_positions(&self, by: &[&str]) -> Result<Vec<usize>> {
        let keys: Vec<&Series<Value>> = by
            .iter()
            .map(|name| self.get_column(name))
            .collect::<Result<_>>()?;

        let mut positions: Vec<usize> = (0..self.row_count).collect();
        positions.sort_by(|&a, &b| {
            keys.iter()
                .map(|col| col.values()[a].sort_cmp(&col.values()[b]))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or_else(|| self.index[a].cmp(&self.index[b]))
        });
        Ok(positions)
    }

    /// Stable sort by the given key columns
    pub fn sort_by_columns(&self, by: &[&str]) -> Result<DataFrame> {
        let positions = self.sorted_positions(by)?;
        self.take_rows(&positions)
    }

    /// Restore original row order
    pub fn sort_by_index(&self) -> Result<DataFrame> {
        let mut positions: Vec<usize> = (0..self.row_count).collect();
        positions.sort_by_key(|&p| self.index[p]);
        self.take_rows(&positions)
    }

    /// Fail unless every original-index value is unique
    pub fn check_unique_index(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.index.len());
        for &i in &self.index {
            if !seen.insert(i) {
                return Err(Error::InvalidInputType(format!(
                    "DataFrame index contains duplicate entry {}",
                    i
                )));
            }
        }
        Ok(())
    }

    /// Concat rows from another DataFrame, aligning columns by name
    pub fn concat_rows(&self, other: &DataFrame) -> Result<DataFrame> {
        DataFrame::concat(vec![self.clone(), other.clone()], &self.column_order)
    }

    /// Stack frames vertically. Output columns follow `column_order`; every
    /// frame must carry all of them.
    pub fn concat(frames: Vec<DataFrame>, column_order: &[String]) -> Result<DataFrame> {
        let total: usize = frames.iter().map(|f| f.row_count).sum();
        let mut index = Vec::with_capacity(total);
        let mut values: Vec<Vec<Value>> = column_order
            .iter()
            .map(|_| Vec::with_capacity(total))
            .collect();

        for frame in frames {
            let DataFrame {
                mut columns,
                index: frame_index,
                ..
            } = frame;
            for (name, out) in column_order.iter().zip(values.iter_mut()) {
                let series = columns
                    .remove(name)
                    .ok_or_else(|| Error::MissingColumn(name.clone()))?;
                out.extend(series.into_values());
            }
            index.extend(frame_index);
        }

        let mut df = DataFrame::new().with_index(index)?;
        for (name, column) in column_order.iter().zip(values) {
            df.add_column(name.clone(), Series::new(column, Some(name.clone()))?)?;
        }
        Ok(df)
    }
}
