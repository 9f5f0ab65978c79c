//! Dynamic values handled by effect programs.
//!
//! Effect programs are untyped: every attribute read, local variable and
//! literal evaluates to a [`Value`]. Hosts (board, pieces, window, phase
//! memory) store custom attributes in an [`Attributes`] map.
//!
//! ## Value Types
//!
//! - `None`: Absence of a value (unset turn, missing piece)
//! - `Int`: Integers (rows, columns, counters)
//! - `Bool`: Flags
//! - `Text`: Strings (window title, labels)
//! - `Pair`: Two-component vectors (directions, cells)

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A value produced or consumed by an effect program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// No value.
    #[default]
    None,
    /// Integer value.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// Text value.
    Text(String),
    /// Two-component vector, `(row, column)` for board steps.
    Pair(i64, i64),
}

impl Value {
    /// Get as integer if this is an Int value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string reference if this is a Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as pair if this is a Pair value.
    #[must_use]
    pub fn as_pair(&self) -> Option<(i64, i64)> {
        match self {
            Value::Pair(a, b) => Some((*a, *b)),
            _ => None,
        }
    }

    /// Truthiness used by `if`, `and`, `or` and `not`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Int(v) => *v != 0,
            Value::Bool(b) => *b,
            Value::Text(s) => !s.is_empty(),
            Value::Pair(a, b) => *a != 0 || *b != 0,
        }
    }

    /// Short type name for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "None",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Pair(..) => "pair",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Pair(a, b) => write!(f, "({a}, {b})"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<(i64, i64)> for Value {
    fn from((a, b): (i64, i64)) -> Self {
        Value::Pair(a, b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

/// Collection of custom attributes, keyed by name.
pub type Attributes = FxHashMap<String, Value>;
