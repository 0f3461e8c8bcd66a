//! Window operations for Series
//!
//! This module provides the count-based rolling window used by the feature
//! engine. A window ending (or centered) at each position is clipped to the
//! series bounds; the aggregation runs only when the clipped window holds at
//! least `min_periods` non-missing observations.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::na::NA;
use crate::series::base::Series;
use crate::series::functions;

/// Values that can be fed to a rolling window
pub trait WindowValue: Debug + Clone {
    /// Numeric view of the value, `None` when missing
    fn window_value(&self) -> Option<f64>;
}

impl WindowValue for f64 {
    fn window_value(&self) -> Option<f64> {
        if self.is_nan() {
            None
        } else {
            Some(*self)
        }
    }
}

impl WindowValue for i64 {
    fn window_value(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl WindowValue for i32 {
    fn window_value(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl WindowValue for Option<f64> {
    fn window_value(&self) -> Option<f64> {
        self.and_then(|v| v.window_value())
    }
}

/// Rolling window configuration and operations
#[derive(Debug, Clone)]
pub struct Rolling<T>
where
    T: WindowValue,
{
    series: Series<T>,
    window_size: usize,
    min_periods: Option<usize>,
    center: bool,
    closed: WindowClosed,
}

/// How to handle window boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowClosed {
    /// Window includes both endpoints
    Both,
    /// Window includes left endpoint only
    Left,
    /// Window includes right endpoint only
    #[default]
    Right,
    /// Window includes neither endpoint
    Neither,
}

/// Trait for window aggregation operations
pub trait WindowOps {
    /// Calculate the mean of the window
    fn mean(&self) -> Result<Series<NA<f64>>>;

    /// Calculate the sum of the window
    fn sum(&self) -> Result<Series<NA<f64>>>;

    /// Calculate the standard deviation of the window
    fn std(&self, ddof: usize) -> Result<Series<NA<f64>>>;

    /// Calculate the variance of the window
    fn var(&self, ddof: usize) -> Result<Series<NA<f64>>>;

    /// Calculate the minimum value in the window
    fn min(&self) -> Result<Series<NA<f64>>>;

    /// Calculate the maximum value in the window
    fn max(&self) -> Result<Series<NA<f64>>>;

    /// Count non-null values in the window
    fn count(&self) -> Result<Series<NA<f64>>>;

    /// Calculate the median of the window
    fn median(&self) -> Result<Series<NA<f64>>>;

    /// Calculate a quantile of the window
    fn quantile(&self, q: f64) -> Result<Series<NA<f64>>>;

    /// Apply a custom aggregation function
    fn apply<F>(&self, func: F) -> Result<Series<NA<f64>>>
    where
        F: FnMut(&[f64]) -> f64;
}

impl<T> Rolling<T>
where
    T: WindowValue,
{
    /// Create a new rolling window
    pub fn new(series: Series<T>, window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(Error::InvalidValue(
                "Window size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            series,
            window_size,
            min_periods: None,
            center: false,
            closed: WindowClosed::default(),
        })
    }

    /// Set minimum number of observations required to have a value
    pub fn min_periods(mut self, min_periods: usize) -> Self {
        self.min_periods = Some(min_periods);
        self
    }

    /// Set whether to center the window around the current observation
    pub fn center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    /// Set how to handle window boundaries
    pub fn closed(mut self, closed: WindowClosed) -> Self {
        self.closed = closed;
        self
    }

    /// Get the effective minimum periods
    fn effective_min_periods(&self) -> usize {
        self.min_periods.unwrap_or(self.window_size)
    }

    /// Half-open bounds `[start, end)` of the window at position `i`, clipped
    /// to `[0, len)`
    fn window_bounds(&self, i: usize, len: usize) -> (usize, usize) {
        let i = i as isize;
        let w = self.window_size as isize;
        let (start, end) = if self.center {
            (i - w / 2, i + (w + 1) / 2)
        } else {
            match self.closed {
                WindowClosed::Right => (i - w + 1, i + 1),
                WindowClosed::Both => (i - w, i + 1),
                WindowClosed::Left => (i - w, i),
                WindowClosed::Neither => (i - w + 1, i),
            }
        };
        let clip = |x: isize| x.clamp(0, len as isize) as usize;
        (clip(start), clip(end))
    }

    /// Run `func` over every window; `func` may fail, which aborts the pass
    pub fn try_apply<F, R>(&self, mut func: F) -> Result<Series<NA<R>>>
    where
        F: FnMut(&[f64]) -> Result<R>,
        R: Debug + Clone,
    {
        let min_periods = self.effective_min_periods();
        if min_periods > self.window_size {
            return Err(Error::InvalidValue(format!(
                "min_periods {} must be <= window {}",
                min_periods, self.window_size
            )));
        }

        let values: Vec<Option<f64>> = self
            .series
            .values()
            .iter()
            .map(|v| v.window_value())
            .collect();
        let mut result = Vec::with_capacity(values.len());
        let mut window_values = Vec::with_capacity(self.window_size + 1);

        for i in 0..values.len() {
            let (start, end) = self.window_bounds(i, values.len());

            window_values.clear();
            window_values.extend(values[start..end].iter().filter_map(|&v| v));

            // An empty window never produces a value, even with min_periods 0
            if !window_values.is_empty() && window_values.len() >= min_periods {
                result.push(NA::Value(func(&window_values)?));
            } else {
                result.push(NA::NA);
            }
        }

        Series::new(result, self.series.name().cloned())
    }

    /// Apply window operation with generic aggregation function
    pub fn apply_window_op<F, R>(&self, mut func: F) -> Result<Series<NA<R>>>
    where
        F: FnMut(&[f64]) -> R,
        R: Debug + Clone,
    {
        self.try_apply(|values| Ok(func(values)))
    }
}

impl<T> WindowOps for Rolling<T>
where
    T: WindowValue,
{
    fn mean(&self) -> Result<Series<NA<f64>>> {
        self.apply_window_op(functions::mean)
    }

    fn sum(&self) -> Result<Series<NA<f64>>> {
        self.apply_window_op(functions::sum)
    }

    fn std(&self, ddof: usize) -> Result<Series<NA<f64>>> {
        self.apply_window_op(|values| functions::std(values, ddof))
    }

    fn var(&self, ddof: usize) -> Result<Series<NA<f64>>> {
        self.apply_window_op(|values| functions::var(values, ddof))
    }

    fn min(&self) -> Result<Series<NA<f64>>> {
        self.apply_window_op(functions::min)
    }

    fn max(&self) -> Result<Series<NA<f64>>> {
        self.apply_window_op(functions::max)
    }

    fn count(&self) -> Result<Series<NA<f64>>> {
        self.apply_window_op(functions::count)
    }

    fn median(&self) -> Result<Series<NA<f64>>> {
        self.apply_window_op(functions::median)
    }

    fn quantile(&self, q: f64) -> Result<Series<NA<f64>>> {
        if !(0.0..=1.0).contains(&q) {
            return Err(Error::InvalidValue(
                "Quantile must be between 0 and 1".to_string(),
            ));
        }
        self.apply_window_op(|values| functions::quantile(values, q))
    }

    fn apply<F>(&self, func: F) -> Result<Series<NA<f64>>>
    where
        F: FnMut(&[f64]) -> f64,
    {
        self.apply_window_op(func)
    }
}

/// Extension trait to add window operations to Series
pub trait WindowExt<T>
where
    T: WindowValue,
{
    /// Create a rolling window
    fn rolling(&self, window_size: usize) -> Result<Rolling<T>>;
}

impl<T> WindowExt<T> for Series<T>
where
    T: WindowValue,
{
    fn rolling(&self, window_size: usize) -> Result<Rolling<T>> {
        Rolling::new(self.clone(), window_size)
    }
}
