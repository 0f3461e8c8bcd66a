//! Aggregation Registry
//!
//! Maps built-in aggregation names ("mean", "std", ...) to the slice functions
//! the rolling window runs. New names are added with
//! [`AggregationRegistry::register`]; lookups of unregistered names fail with
//! [`Error::UnknownAggregation`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::core::error::{Error, Result};
use crate::series::functions;

/// Global registry holding the built-in aggregations
static DEFAULT_REGISTRY: OnceLock<AggregationRegistry> = OnceLock::new();

/// Get the built-in aggregation registry
#[inline]
pub fn default_registry() -> &'static AggregationRegistry {
    DEFAULT_REGISTRY.get_or_init(AggregationRegistry::new)
}

/// Type for named aggregation functions
pub type AggregationFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Name to aggregation lookup table
#[derive(Clone)]
pub struct AggregationRegistry {
    functions: HashMap<String, AggregationFn>,
}

impl Default for AggregationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AggregationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregationRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

impl AggregationRegistry {
    /// Create a registry with all built-in aggregations registered
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register("mean", functions::mean);
        registry.register("sum", functions::sum);
        registry.register("std", |v: &[f64]| functions::std(v, 1));
        registry.register("var", |v: &[f64]| functions::var(v, 1));
        registry.register("min", functions::min);
        registry.register("max", functions::max);
        registry.register("median", functions::median);
        registry.register("count", functions::count);
        registry.register("skew", functions::skew);
        registry.register("kurt", functions::kurt);
        registry.register("sem", functions::sem);
        registry.register("first", functions::first);
        registry.register("last", functions::last);

        registry
    }

    /// Create a registry with nothing registered
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Register (or replace) an aggregation under `name`
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Arc::new(func));
    }

    /// Look up an aggregation by name
    pub fn get(&self, name: &str) -> Result<&AggregationFn> {
        self.functions
            .get(name)
            .ok_or_else(|| Error::UnknownAggregation(name.to_string()))
    }

    /// Check whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}
