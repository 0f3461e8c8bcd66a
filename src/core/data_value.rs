use std::cmp::Ordering;
use std::fmt::{self, Display};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::na::NA;

/// A single dynamically typed cell of a DataFrame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Missing value marker
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Check if the value is missing
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "i64",
            Value::Float(_) => "f64",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }

    /// Numeric view of the value. Missing values (and NaN) map to `None`.
    pub fn as_f64(&self) -> Result<Option<f64>> {
        match self {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
            Value::Int(i) => Ok(Some(*i as f64)),
            Value::Float(f) if f.is_nan() => Ok(None),
            Value::Float(f) => Ok(Some(*f)),
            other => Err(Error::Type(format!(
                "cannot use {} value '{}' as a number",
                other.type_name(),
                other
            ))),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Str(_) => 2,
            Value::Date(_) => 3,
            Value::DateTime(_) => 4,
            Value::Null => 5,
        }
    }

    /// Total order used for sorting: nulls sort last, ints and floats compare
    /// numerically, other mixed types fall back to a fixed type rank.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Date(a), Value::DateTime(b)) => a.and_time(chrono::NaiveTime::MIN).cmp(b),
            (Value::DateTime(a), Value::Date(b)) => a.cmp(&b.and_time(chrono::NaiveTime::MIN)),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NA"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

// NaN results are written as the missing marker
impl From<NA<f64>> for Value {
    fn from(v: NA<f64>) -> Self {
        match v {
            NA::Value(x) if !x.is_nan() => Value::Float(x),
            _ => Value::Null,
        }
    }
}

/// Render a group key for error messages and logs
pub fn format_key(key: &[Value]) -> String {
    if key.is_empty() {
        return "<all>".to_string();
    }
    let parts: Vec<String> = key.iter().map(|v| v.to_string()).collect();
    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_cmp_nulls_last() {
        assert_eq!(Value::Null.sort_cmp(&Value::Int(1)), Ordering::Greater);
        assert_eq!(Value::Int(1).sort_cmp(&Value::Null), Ordering::Less);
        assert_eq!(Value::Null.sort_cmp(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn test_sort_cmp_mixed_numeric() {
        assert_eq!(Value::Int(2).sort_cmp(&Value::Float(1.5)), Ordering::Greater);
        assert_eq!(Value::Float(2.0).sort_cmp(&Value::Int(2)), Ordering::Equal);
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(Value::Int(3).as_f64().unwrap(), Some(3.0));
        assert_eq!(Value::Float(f64::NAN).as_f64().unwrap(), None);
        assert_eq!(Value::Null.as_f64().unwrap(), None);
        assert!(Value::from("x").as_f64().is_err());
    }

    #[test]
    fn test_nan_becomes_null() {
        assert_eq!(Value::from(NA::Value(f64::NAN)), Value::Null);
        assert_eq!(Value::from(NA::<f64>::NA), Value::Null);
        assert_eq!(Value::from(NA::Value(1.5)), Value::Float(1.5));
    }

    #[test]
    fn test_format_key() {
        assert_eq!(format_key(&[]), "<all>");
        assert_eq!(format_key(&[Value::from("a"), Value::Int(1)]), "(a, 1)");
    }
}
