//! Rolling feature augmentation
//!
//! [`augment_rolling`] appends one derived column per (value column, window
//! length, function) to a time-ordered, optionally grouped table:
//!
//! ```
//! use rollfeat::augment::{augment_rolling, RollingSpec};
//! use rollfeat::{DataFrame, Value};
//!
//! let df = DataFrame::from_columns(vec![
//!     ("date", vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
//!     ("sales", vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)]),
//! ])
//! .unwrap();
//!
//! let spec = RollingSpec::new("date", "sales").window(2).window_func("mean");
//! let out = augment_rolling(&df, &spec).unwrap();
//! assert_eq!(
//!     out.get_column("sales_rolling_mean_win_2").unwrap().values(),
//!     &[Value::Null, Value::Float(1.5), Value::Float(2.5)]
//! );
//! ```

pub mod assemble;
pub mod executor;
pub mod partition;
pub mod spec;

use std::sync::Arc;

use crate::core::error::{Error, Result};
use crate::dataframe::{DataFrame, DataFrameGroupBy};
use crate::series::{default_registry, AggregationRegistry, WindowClosed};

pub use executor::{derived_column_name, ExecutionOutput, RollingExecutor};
pub use partition::{partition, Partition};
pub use spec::{
    ColumnList, FrameFn, FuncArg, FunctionSpec, RollingOptions, UnivariateFn, WindowArg,
    WindowFunc, WindowOutput, WindowSpec,
};

/// Everything one rolling augmentation needs besides the table
#[derive(Debug, Clone)]
pub struct RollingSpec {
    pub(crate) date_column: String,
    pub(crate) value_columns: Vec<String>,
    pub(crate) independent_columns: Vec<String>,
    pub(crate) window: WindowArg,
    pub(crate) window_func: FuncArg,
    pub(crate) center: bool,
    pub(crate) options: RollingOptions,
    pub(crate) registry: Option<Arc<AggregationRegistry>>,
}

impl RollingSpec {
    /// Roll `value_columns` over rows ordered by `date_column`. Defaults to a
    /// trailing window of 2 and `"mean"`.
    pub fn new(date_column: impl Into<String>, value_columns: impl Into<ColumnList>) -> Self {
        Self {
            date_column: date_column.into(),
            value_columns: value_columns.into().0,
            independent_columns: Vec::new(),
            window: WindowArg::default(),
            window_func: FuncArg::default(),
            center: false,
            options: RollingOptions::default(),
            registry: None,
        }
    }

    /// Auxiliary columns handed to frame callables
    pub fn independent_columns(mut self, columns: impl Into<ColumnList>) -> Self {
        self.independent_columns = columns.into().0;
        self
    }

    pub fn window(mut self, window: impl Into<WindowArg>) -> Self {
        self.window = window.into();
        self
    }

    pub fn window_func(mut self, func: impl Into<FuncArg>) -> Self {
        self.window_func = func.into();
        self
    }

    pub fn center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    pub fn min_periods(mut self, min_periods: usize) -> Self {
        self.options.min_periods = Some(min_periods);
        self
    }

    pub fn closed(mut self, closed: WindowClosed) -> Self {
        self.options.closed = closed;
        self
    }

    pub fn options(mut self, options: RollingOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve built-in names against `registry` instead of the default one
    pub fn registry(mut self, registry: Arc<AggregationRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }
}

/// Table handed to the engine: a plain frame or a grouped view of one
#[derive(Debug, Clone, Copy)]
pub enum RollingInput<'a> {
    Frame(&'a DataFrame),
    Grouped(&'a DataFrameGroupBy),
}

impl<'a> From<&'a DataFrame> for RollingInput<'a> {
    fn from(df: &'a DataFrame) -> Self {
        RollingInput::Frame(df)
    }
}

impl<'a> From<&'a DataFrameGroupBy> for RollingInput<'a> {
    fn from(grouped: &'a DataFrameGroupBy) -> Self {
        RollingInput::Grouped(grouped)
    }
}

impl<'a> RollingInput<'a> {
    fn parts(&self) -> Result<(&'a DataFrame, &'a [String])> {
        match *self {
            RollingInput::Frame(df) => Ok((df, &[])),
            RollingInput::Grouped(grouped) => {
                if grouped.group_columns().is_empty() {
                    return Err(Error::InvalidInputType(
                        "grouped input has no grouping columns".to_string(),
                    ));
                }
                Ok((grouped.obj(), grouped.group_columns()))
            }
        }
    }
}

/// Append rolling-window columns to `input`.
///
/// Rows are processed per group in time order and returned in their original
/// order. Nothing is returned on error.
pub fn augment_rolling<'a>(
    input: impl Into<RollingInput<'a>>,
    spec: &RollingSpec,
) -> Result<DataFrame> {
    let (df, group_columns) = input.into().parts()?;
    df.check_unique_index()?;

    let windows = spec.window.resolve()?;
    let functions = spec.window_func.resolve()?;

    let registry: &AggregationRegistry = match &spec.registry {
        Some(registry) => registry.as_ref(),
        None => default_registry(),
    };
    for name in functions.builtin_names() {
        if !registry.contains(name) {
            return Err(Error::UnknownAggregation(name.to_string()));
        }
    }

    let executor = RollingExecutor::new(spec, &windows, &functions, registry);
    executor.validate(df)?;
    log::debug!(
        "rolling plan: {} column(s) x windows {:?} x {} function(s) -> {} computation(s)",
        spec.value_columns.len(),
        windows.lengths(),
        functions.functions().len(),
        executor.plan_len()
    );

    let partitions = partition(df, group_columns, &spec.date_column)?;
    let npartitions = partitions.len();
    let ExecutionOutput {
        frames,
        derived_columns,
    } = executor.execute(partitions)?;

    let result = assemble::assemble(frames, &df.column_names(), &derived_columns)?;
    log::info!(
        "augment_rolling added {} column(s) to {} row(s) across {} partition(s)",
        derived_columns.len(),
        result.row_count(),
        npartitions
    );
    Ok(result)
}

/// Method-call sugar for [`augment_rolling`]
pub trait AugmentRollingExt {
    fn augment_rolling(&self, spec: &RollingSpec) -> Result<DataFrame>;
}

impl AugmentRollingExt for DataFrame {
    fn augment_rolling(&self, spec: &RollingSpec) -> Result<DataFrame> {
        augment_rolling(self, spec)
    }
}

impl AugmentRollingExt for DataFrameGroupBy {
    fn augment_rolling(&self, spec: &RollingSpec) -> Result<DataFrame> {
        augment_rolling(self, spec)
    }
}
