//! Window and function specifications
//!
//! [`WindowArg`] and [`FuncArg`] accept the loose shapes callers write (one
//! size, a range, a list; one function or several) and resolve into the
//! ordered [`WindowSpec`] and [`FunctionSpec`] the executor iterates.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::{BoxError, Error, Result};
use crate::dataframe::DataFrame;
use crate::series::WindowClosed;

/// Window argument as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WindowArg {
    /// One window length
    Single(i64),
    /// Explicit lengths, order and duplicates preserved
    List(Vec<i64>),
    /// Every length from `from` to `to`, inclusive
    Range { from: i64, to: i64 },
}

impl Default for WindowArg {
    fn default() -> Self {
        WindowArg::Single(2)
    }
}

impl From<i64> for WindowArg {
    fn from(n: i64) -> Self {
        WindowArg::Single(n)
    }
}

impl From<i32> for WindowArg {
    fn from(n: i32) -> Self {
        WindowArg::Single(n as i64)
    }
}

impl From<usize> for WindowArg {
    fn from(n: usize) -> Self {
        WindowArg::Single(n as i64)
    }
}

impl From<(i64, i64)> for WindowArg {
    fn from((from, to): (i64, i64)) -> Self {
        WindowArg::Range { from, to }
    }
}

impl From<(i32, i32)> for WindowArg {
    fn from((from, to): (i32, i32)) -> Self {
        WindowArg::Range {
            from: from as i64,
            to: to as i64,
        }
    }
}

impl From<Vec<i64>> for WindowArg {
    fn from(lengths: Vec<i64>) -> Self {
        WindowArg::List(lengths)
    }
}

impl From<Vec<i32>> for WindowArg {
    fn from(lengths: Vec<i32>) -> Self {
        WindowArg::List(lengths.into_iter().map(i64::from).collect())
    }
}

impl From<&[i64]> for WindowArg {
    fn from(lengths: &[i64]) -> Self {
        WindowArg::List(lengths.to_vec())
    }
}

/// Ordered, validated window lengths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec(Vec<usize>);

impl WindowSpec {
    pub fn lengths(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl WindowArg {
    /// Normalize into concrete window lengths
    pub fn resolve(&self) -> Result<WindowSpec> {
        let lengths = match self {
            WindowArg::Single(n) => vec![*n],
            WindowArg::Range { from, to } => {
                if from > to {
                    return Err(Error::InvalidWindowSpec(format!(
                        "range start {} is greater than end {}",
                        from, to
                    )));
                }
                (*from..=*to).collect()
            }
            WindowArg::List(lengths) => lengths.clone(),
        };

        if lengths.is_empty() {
            return Err(Error::InvalidWindowSpec(
                "at least one window length is required".to_string(),
            ));
        }
        if let Some(bad) = lengths.iter().find(|&&n| n <= 0) {
            return Err(Error::InvalidWindowSpec(format!(
                "window length must be positive, got {}",
                bad
            )));
        }

        Ok(WindowSpec(lengths.into_iter().map(|n| n as usize).collect()))
    }
}

/// Univariate custom aggregation: window values in, one scalar out
pub type UnivariateFn = Arc<dyn Fn(&[f64]) -> std::result::Result<f64, BoxError> + Send + Sync>;

/// Multivariate custom aggregation: window rows, value column and auxiliary
/// columns in, one scalar or several named scalars out
pub type FrameFn = Arc<
    dyn Fn(&DataFrame, &str, &[String]) -> std::result::Result<WindowOutput, BoxError>
        + Send
        + Sync,
>;

/// Result of one multivariate window evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutput {
    Scalar(f64),
    /// Named outputs, bound as sibling columns `{base}_{name}`
    Named(Vec<(String, f64)>),
}

impl From<f64> for WindowOutput {
    fn from(v: f64) -> Self {
        WindowOutput::Scalar(v)
    }
}

impl WindowOutput {
    /// Output names, `None` for a scalar
    pub fn names(&self) -> Option<Vec<String>> {
        match self {
            WindowOutput::Scalar(_) => None,
            WindowOutput::Named(pairs) => Some(pairs.iter().map(|(n, _)| n.clone()).collect()),
        }
    }
}

/// One aggregation to run over every window
#[derive(Clone)]
pub enum WindowFunc {
    /// Named aggregation from the registry
    Builtin(String),
    /// Caller-supplied aggregation over the value column
    Custom { label: String, func: UnivariateFn },
    /// Caller-supplied aggregation over whole window rows
    Frame { label: String, func: FrameFn },
}

impl fmt::Debug for WindowFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowFunc::Builtin(name) => f.debug_tuple("Builtin").field(name).finish(),
            WindowFunc::Custom { label, .. } => f
                .debug_struct("Custom")
                .field("label", label)
                .field("func", &"<custom_function>")
                .finish(),
            WindowFunc::Frame { label, .. } => f
                .debug_struct("Frame")
                .field("label", label)
                .field("func", &"<custom_function>")
                .finish(),
        }
    }
}

impl WindowFunc {
    /// Named aggregation, e.g. `"mean"`
    pub fn builtin(name: impl Into<String>) -> Self {
        WindowFunc::Builtin(name.into())
    }

    /// Infallible univariate aggregation. The callable receives the
    /// window's non-missing values in time order.
    pub fn custom<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        WindowFunc::Custom {
            label: label.into(),
            func: Arc::new(move |values: &[f64]| Ok::<f64, BoxError>(func(values))),
        }
    }

    /// Univariate aggregation that may fail; receives the same values as
    /// [`WindowFunc::custom`]
    pub fn try_custom<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[f64]) -> std::result::Result<f64, BoxError> + Send + Sync + 'static,
    {
        WindowFunc::Custom {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    /// Multivariate aggregation over the window's rows
    pub fn frame<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&DataFrame, &str, &[String]) -> std::result::Result<WindowOutput, BoxError>
            + Send
            + Sync
            + 'static,
    {
        WindowFunc::Frame {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    /// Name used in derived column names
    pub fn label(&self) -> &str {
        match self {
            WindowFunc::Builtin(name) => name,
            WindowFunc::Custom { label, .. } | WindowFunc::Frame { label, .. } => label,
        }
    }

    /// Same built-in name, or a clone of the same callable
    fn same_function(&self, other: &WindowFunc) -> bool {
        match (self, other) {
            (WindowFunc::Builtin(a), WindowFunc::Builtin(b)) => a == b,
            (WindowFunc::Custom { func: a, .. }, WindowFunc::Custom { func: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            (WindowFunc::Frame { func: a, .. }, WindowFunc::Frame { func: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

/// Function argument as supplied by the caller
#[derive(Debug, Clone)]
pub enum FuncArg {
    One(WindowFunc),
    Many(Vec<WindowFunc>),
}

impl Default for FuncArg {
    fn default() -> Self {
        FuncArg::One(WindowFunc::builtin("mean"))
    }
}

impl From<&str> for FuncArg {
    fn from(name: &str) -> Self {
        FuncArg::One(WindowFunc::builtin(name))
    }
}

impl From<String> for FuncArg {
    fn from(name: String) -> Self {
        FuncArg::One(WindowFunc::Builtin(name))
    }
}

impl From<WindowFunc> for FuncArg {
    fn from(func: WindowFunc) -> Self {
        FuncArg::One(func)
    }
}

impl From<Vec<WindowFunc>> for FuncArg {
    fn from(funcs: Vec<WindowFunc>) -> Self {
        FuncArg::Many(funcs)
    }
}

impl From<Vec<&str>> for FuncArg {
    fn from(names: Vec<&str>) -> Self {
        FuncArg::Many(names.into_iter().map(WindowFunc::builtin).collect())
    }
}

impl From<Vec<String>> for FuncArg {
    fn from(names: Vec<String>) -> Self {
        FuncArg::Many(names.into_iter().map(WindowFunc::Builtin).collect())
    }
}

/// Ordered, validated function descriptors
#[derive(Debug, Clone)]
pub struct FunctionSpec(Vec<WindowFunc>);

impl FunctionSpec {
    pub fn functions(&self) -> &[WindowFunc] {
        &self.0
    }

    /// Names of the built-in aggregations this spec refers to
    pub fn builtin_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|f| match f {
            WindowFunc::Builtin(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl FuncArg {
    /// Normalize into function descriptors. Labels must be non-empty.
    /// Repeating a built-in name or the same callable is allowed and yields
    /// one column; two different callables sharing a label are rejected.
    pub fn resolve(&self) -> Result<FunctionSpec> {
        let funcs = match self {
            FuncArg::One(func) => vec![func.clone()],
            FuncArg::Many(funcs) => funcs.clone(),
        };

        if funcs.is_empty() {
            return Err(Error::InvalidFunctionSpec(
                "at least one window function is required".to_string(),
            ));
        }

        let mut seen: HashMap<&str, &WindowFunc> = HashMap::new();
        for func in &funcs {
            let label = func.label();
            if label.trim().is_empty() {
                return Err(Error::InvalidFunctionSpec(format!(
                    "window function has an empty name: {:?}",
                    func
                )));
            }
            if let Some(previous) = seen.get(label) {
                if !previous.same_function(func) {
                    return Err(Error::InvalidFunctionSpec(format!(
                        "different window functions share the name '{}'",
                        label
                    )));
                }
                continue;
            }
            seen.insert(label, func);
        }

        Ok(FunctionSpec(funcs))
    }
}

/// Options forwarded to the rolling window primitive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingOptions {
    /// Observations required for a value; defaults to the window length.
    /// Values above a window length are capped at that length.
    pub min_periods: Option<usize>,
    /// Window boundary convention for trailing windows
    pub closed: WindowClosed,
}

/// One or more column names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnList(pub Vec<String>);

impl From<&str> for ColumnList {
    fn from(name: &str) -> Self {
        ColumnList(vec![name.to_string()])
    }
}

impl From<String> for ColumnList {
    fn from(name: String) -> Self {
        ColumnList(vec![name])
    }
}

impl From<Vec<&str>> for ColumnList {
    fn from(names: Vec<&str>) -> Self {
        ColumnList(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ColumnList {
    fn from(names: Vec<String>) -> Self {
        ColumnList(names)
    }
}

impl From<&[&str]> for ColumnList {
    fn from(names: &[&str]) -> Self {
        ColumnList(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ColumnList {
    fn from(names: [&str; N]) -> Self {
        ColumnList(names.iter().map(|s| s.to_string()).collect())
    }
}
