use std::fmt::Debug;

use crate::core::data_value::Value;
use crate::core::error::{Error, Result};
use crate::na::NA;

/// Series struct: 1-dimensional data structure
#[derive(Debug, Clone, PartialEq)]
pub struct Series<T>
where
    T: Debug + Clone,
{
    /// The values in the Series
    values: Vec<T>,
    /// The name of the Series
    name: Option<String>,
}

impl<T> Series<T>
where
    T: Debug + Clone,
{
    /// Create a new Series
    pub fn new(data: Vec<T>, name: Option<String>) -> Result<Self> {
        Ok(Self { values: data, name })
    }

    /// Get the length of the Series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the Series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get an element at a specific index
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    /// Get a reference to the values in the Series
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Consume the Series and return its values
    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    /// Get the name of the Series
    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    /// Return the same values under a new name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Gather values at the given positions, in the given order
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        let mut values = Vec::with_capacity(indices.len());
        for &i in indices {
            let v = self.values.get(i).ok_or(Error::IndexOutOfBounds {
                index: i,
                size: self.values.len(),
            })?;
            values.push(v.clone());
        }
        Series::new(values, self.name.clone())
    }

    /// Copy the half-open range `[start, end)`
    pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
        if start > end || end > self.values.len() {
            return Err(Error::IndexOutOfBounds {
                index: end,
                size: self.values.len(),
            });
        }
        Series::new(self.values[start..end].to_vec(), self.name.clone())
    }
}

impl Series<Value> {
    /// Numeric view of a value column; nulls become `None`
    pub fn as_f64(&self) -> Result<Vec<Option<f64>>> {
        self.values.iter().map(|v| v.as_f64()).collect()
    }
}

impl Series<NA<f64>> {
    /// Convert a window result into a column that can live in a DataFrame
    pub fn to_value_series(&self) -> Result<Series<Value>> {
        let values = self.values.iter().map(|&v| Value::from(v)).collect();
        Series::new(values, self.name.clone())
    }
}
