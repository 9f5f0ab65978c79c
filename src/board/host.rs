//! Symbolic dispatch for effect programs.
//!
//! Effect programs name their targets symbolically (`BOARD.rows`,
//! `PIECE[0].move(UP)`, `WINDOW.title`). Each host type implements
//! [`Scriptable`] as its resolver table: attribute reads, attribute
//! writes and method calls all return a `Result` instead of failing on a
//! missing name.

use crate::core::Value;
use crate::error::{EvalError, EvalResult};

/// An object effect programs can read, write and call.
pub trait Scriptable {
    /// Name used in error messages (`BOARD`, `PIECE[2]`, ...).
    fn label(&self) -> String;

    /// Does a read of `attr` succeed? Used for setup-time resolution.
    fn has_attr(&self, attr: &str) -> bool;

    /// Read an attribute.
    fn get_attr(&self, attr: &str) -> EvalResult<Value>;

    /// Write an attribute.
    fn set_attr(&mut self, attr: &str, value: Value) -> EvalResult<()>;

    /// Call a method.
    fn call_method(&mut self, method: &str, args: &[Value]) -> EvalResult<Value>;
}

pub(crate) fn unknown_attr(host: &dyn Scriptable, attr: &str) -> EvalError {
    EvalError::UnknownAttribute {
        target: host.label(),
        attr: attr.to_string(),
    }
}

pub(crate) fn read_only(host: &dyn Scriptable, attr: &str) -> EvalError {
    EvalError::ReadOnlyAttribute {
        target: host.label(),
        attr: attr.to_string(),
    }
}

pub(crate) fn unknown_method(host: &dyn Scriptable, method: &str) -> EvalError {
    EvalError::UnknownMethod {
        target: host.label(),
        method: method.to_string(),
    }
}

/// Fail unless exactly `expected` arguments were passed.
pub(crate) fn check_arity(name: &str, expected: usize, args: &[Value]) -> EvalResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::Arity {
            name: name.to_string(),
            expected,
            got: args.len(),
        })
    }
}

pub(crate) fn expect_int(value: &Value) -> EvalResult<i64> {
    value.as_int().ok_or(EvalError::TypeMismatch {
        expected: "int",
        got: value.type_name(),
    })
}

pub(crate) fn expect_pair(value: &Value) -> EvalResult<(i64, i64)> {
    value.as_pair().ok_or(EvalError::TypeMismatch {
        expected: "pair",
        got: value.type_name(),
    })
}

pub(crate) fn expect_text(value: Value) -> EvalResult<String> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(EvalError::TypeMismatch {
            expected: "text",
            got: other.type_name(),
        }),
    }
}
