//! Rolling executor
//!
//! Runs every (value column, window length, function) combination over every
//! partition and binds the results as new columns on the partition frames.
//! Built-in names and univariate callables go through the series-level
//! [`Rolling`](crate::series::Rolling) primitive; frame callables are handed
//! whole window slices.

use std::collections::{HashMap, HashSet};

use crate::augment::partition::Partition;
use crate::augment::spec::{FrameFn, FunctionSpec, WindowFunc, WindowOutput, WindowSpec};
use crate::augment::RollingSpec;
use crate::core::data_value::{format_key, Value};
use crate::core::error::{BoxError, Error, Result};
use crate::dataframe::{DataFrame, DataFrameWindowExt};
use crate::na::NA;
use crate::series::{AggregationRegistry, Rolling, Series};

/// One derived column (or sibling group) to compute
#[derive(Debug)]
struct PlanEntry<'a> {
    value_column: &'a str,
    window: usize,
    func: &'a WindowFunc,
    base: String,
}

/// Partition frames carrying their derived columns
#[derive(Debug)]
pub struct ExecutionOutput {
    pub frames: Vec<DataFrame>,
    /// Derived column names in plan order
    pub derived_columns: Vec<String>,
}

/// Derived column name for a value column, function label and window length
pub fn derived_column_name(value_column: &str, label: &str, window: usize) -> String {
    format!("{}_rolling_{}_win_{}", value_column, label, window)
}

pub struct RollingExecutor<'a> {
    spec: &'a RollingSpec,
    plan: Vec<PlanEntry<'a>>,
    registry: &'a AggregationRegistry,
    /// Output names fixed by the first evaluated window of each frame
    /// callable; `Some(None)` is a scalar output
    frame_shapes: HashMap<String, Option<Option<Vec<String>>>>,
}

impl<'a> RollingExecutor<'a> {
    /// Build the execution plan. Repeated window lengths and repeated
    /// functions produce the same columns and are planned once.
    pub fn new(
        spec: &'a RollingSpec,
        windows: &'a WindowSpec,
        functions: &'a FunctionSpec,
        registry: &'a AggregationRegistry,
    ) -> Self {
        let mut plan = Vec::new();
        let mut seen = HashSet::new();
        for value_column in &spec.value_columns {
            for &window in windows.lengths() {
                for func in functions.functions() {
                    let base = derived_column_name(value_column, func.label(), window);
                    if !seen.insert(base.clone()) {
                        log::debug!("skipping repeated column '{}'", base);
                        continue;
                    }
                    plan.push(PlanEntry {
                        value_column,
                        window,
                        func,
                        base,
                    });
                }
            }
        }

        Self {
            spec,
            plan,
            registry,
            frame_shapes: HashMap::new(),
        }
    }

    /// Number of planned column computations per partition
    pub fn plan_len(&self) -> usize {
        self.plan.len()
    }

    /// Check that every referenced column exists and that no derived column
    /// would overwrite an input column
    pub fn validate(&self, df: &DataFrame) -> Result<()> {
        for column in self
            .spec
            .value_columns
            .iter()
            .chain(self.spec.independent_columns.iter())
        {
            if !df.contains_column(column) {
                return Err(Error::MissingColumn(column.clone()));
            }
        }
        for entry in &self.plan {
            if df.contains_column(&entry.base) {
                return Err(Error::DuplicateColumnName(entry.base.clone()));
            }
        }
        Ok(())
    }

    /// Compute every planned column on every partition
    pub fn execute(mut self, partitions: Vec<Partition>) -> Result<ExecutionOutput> {
        let mut frames = Vec::with_capacity(partitions.len());
        let mut deferred: Vec<(usize, usize)> = Vec::new();

        for (part_idx, Partition { key, mut frame }) in partitions.into_iter().enumerate() {
            let group = format_key(&key);
            for entry_idx in 0..self.plan.len() {
                let evaluated = self.run_entry(entry_idx, &mut frame, &group)?;
                if !evaluated {
                    deferred.push((part_idx, entry_idx));
                }
            }
            frames.push(frame);
        }

        // Partitions too short for a frame callable get missing columns
        // shaped like everyone else's
        for (part_idx, entry_idx) in deferred {
            let names = self.output_names(&self.plan[entry_idx]);
            let frame = &mut frames[part_idx];
            for name in names {
                let column = Series::new(vec![Value::Null; frame.row_count()], None)?;
                frame.add_column(name, column)?;
            }
        }

        let derived_columns = self
            .plan
            .iter()
            .flat_map(|entry| self.output_names(entry))
            .collect();

        Ok(ExecutionOutput {
            frames,
            derived_columns,
        })
    }

    /// Returns false when a frame callable had no complete window to
    /// evaluate in this partition
    fn run_entry(&mut self, entry_idx: usize, frame: &mut DataFrame, group: &str) -> Result<bool> {
        let entry = &self.plan[entry_idx];
        match entry.func {
            WindowFunc::Builtin(name) => {
                let func = self.registry.get(name)?;
                let result = self.rolling(frame, entry)?.apply_window_op(|v| func(v))?;
                frame.add_column(entry.base.clone(), result.to_value_series()?)?;
                Ok(true)
            }
            WindowFunc::Custom { func, .. } => {
                let result = self.rolling(frame, entry)?.try_apply(|v| {
                    func(v).map_err(|e| {
                        Error::aggregation_failure(entry.value_column, entry.window, group, e)
                    })
                })?;
                frame.add_column(entry.base.clone(), result.to_value_series()?)?;
                Ok(true)
            }
            WindowFunc::Frame { func, .. } => {
                let func = func.clone();
                self.run_frame(entry_idx, &func, frame, group)
            }
        }
    }

    fn rolling(
        &self,
        frame: &DataFrame,
        entry: &PlanEntry<'_>,
    ) -> Result<Rolling<Option<f64>>> {
        let options = &self.spec.options;
        let min_periods = options
            .min_periods
            .unwrap_or(entry.window)
            .min(entry.window);
        Ok(frame
            .rolling(entry.value_column, entry.window)?
            .center(self.spec.center)
            .closed(options.closed)
            .min_periods(min_periods))
    }

    fn run_frame(
        &mut self,
        entry_idx: usize,
        func: &FrameFn,
        frame: &mut DataFrame,
        group: &str,
    ) -> Result<bool> {
        let entry = &self.plan[entry_idx];
        let window = entry.window;
        let rows = frame.row_count();
        if rows < window {
            return Ok(false);
        }

        let fail = |source: BoxError| {
            Error::aggregation_failure(entry.value_column, window, group, source)
        };
        let shape = self.frame_shapes.entry(entry.base.clone()).or_insert(None);

        let mut outputs = Vec::with_capacity(rows + 1 - window);
        for end in window..=rows {
            let slice = frame.slice_rows(end - window, end)?;
            let output = func(&slice, entry.value_column, &self.spec.independent_columns)
                .map_err(fail)?;

            let names = output.names();
            if let Some(names) = &names {
                if names.is_empty() {
                    return Err(fail("window function returned no outputs".into()));
                }
                let mut unique = HashSet::new();
                if let Some(repeated) = names.iter().find(|n| !unique.insert(n.as_str())) {
                    return Err(fail(
                        format!("window function returned output '{}' twice", repeated).into(),
                    ));
                }
            }
            if let Some(expected) = shape.as_ref() {
                if *expected != names {
                    return Err(fail(
                        format!(
                            "window function output changed from {:?} to {:?}",
                            expected, names
                        )
                        .into(),
                    ));
                }
            } else {
                *shape = Some(names);
            }
            outputs.push(output);
        }

        let columns = bind_outputs(&entry.base, window, rows, outputs);
        for (name, values) in columns {
            frame.add_column(name, Series::new(values, None)?)?;
        }
        Ok(true)
    }

    /// Output column names of a plan entry
    fn output_names(&self, entry: &PlanEntry<'_>) -> Vec<String> {
        match entry.func {
            WindowFunc::Frame { .. } => match self.frame_shapes.get(&entry.base) {
                Some(Some(Some(names))) => names
                    .iter()
                    .map(|n| format!("{}_{}", entry.base, n))
                    .collect(),
                _ => vec![entry.base.clone()],
            },
            _ => vec![entry.base.clone()],
        }
    }
}

/// Lay window outputs out as columns; rows before the first full window are
/// missing
fn bind_outputs(
    base: &str,
    window: usize,
    rows: usize,
    outputs: Vec<WindowOutput>,
) -> Vec<(String, Vec<Value>)> {
    let lead = window - 1;
    let mut columns: Vec<(String, Vec<Value>)> = Vec::new();

    for (offset, output) in outputs.into_iter().enumerate() {
        match output {
            WindowOutput::Scalar(v) => {
                if columns.is_empty() {
                    columns.push((base.to_string(), missing_column(rows)));
                }
                columns[0].1[lead + offset] = Value::from(NA::Value(v));
            }
            WindowOutput::Named(pairs) => {
                if columns.is_empty() {
                    columns = pairs
                        .iter()
                        .map(|(name, _)| (format!("{}_{}", base, name), missing_column(rows)))
                        .collect();
                }
                for ((_, column), (_, v)) in columns.iter_mut().zip(pairs) {
                    column[lead + offset] = Value::from(NA::Value(v));
                }
            }
        }
    }
    columns
}

fn missing_column(rows: usize) -> Vec<Value> {
    vec![Value::Null; rows]
}
