//! Dynamic value model bridging host values and the callee's
//! matrix/cell/struct world, plus the numeric coercion applied to
//! arguments before transmission.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use tracing::debug;

pub mod array;
pub mod compare;
pub mod json;

pub use array::{Dtype, NumericArray};

/// A value that can cross the process boundary in either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Floating-point scalar, the callee's default numeric literal type.
    Num(f64),
    /// Integer-typed scalar, kept distinct so serialization does not widen it.
    Int(i64),
    Bool(bool),
    Str(String),
    /// Heterogeneous ordered container (cell-like).
    List(Vec<Value>),
    /// Shaped numeric array.
    Array(NumericArray),
    /// Field-named record, already flattened to an ordinary mapping.
    Struct(BTreeMap<String, Value>),
}

/// Coarse runtime kind used for soft type checks against declared inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Num,
    Bool,
    Str,
    List,
    Array,
    Struct,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Num => "number",
            ValueKind::Bool => "bool",
            ValueKind::Str => "string",
            ValueKind::List => "list",
            ValueKind::Array => "array",
            ValueKind::Struct => "struct",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "number" | "double" | "float" | "int" => Some(ValueKind::Num),
            "bool" | "logical" => Some(ValueKind::Bool),
            "string" | "char" => Some(ValueKind::Str),
            "list" | "cell" => Some(ValueKind::List),
            "array" | "matrix" => Some(ValueKind::Array),
            "struct" => Some(ValueKind::Struct),
            _ => None,
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Num(_) | Value::Int(_) => ValueKind::Num,
            Value::Bool(_) => ValueKind::Bool,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
            Value::Array(_) => ValueKind::Array,
            Value::Struct(_) => ValueKind::Struct,
        }
    }

    /// Scalar numeric view across the Int/Num divide.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Num(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
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

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Array(NumericArray::vector(v))
    }
}

impl From<NumericArray> for Value {
    fn from(v: NumericArray) -> Self {
        Value::Array(v)
    }
}

/// Promote one argument to the callee's numeric convention: integer scalars
/// become floats, list elements are promoted individually when numeric, and
/// everything else passes through unchanged. Booleans are not numbers here.
///
/// Best-effort and silent on success; it never fails, it only traces.
pub fn coerce_argument(index: usize, value: Value) -> Value {
    match value {
        Value::Int(i) => {
            debug!(argument = index, was = "int", "converting argument to float");
            Value::Num(i as f64)
        }
        Value::List(items) => {
            debug!(argument = index, "found list, converting numeric entries to float");
            Value::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Int(i) => Value::Num(i as f64),
                        other => other,
                    })
                    .collect(),
            )
        }
        other => {
            debug!(argument = index, kind = other.kind().as_str(), "no conversion");
            other
        }
    }
}

/// Normalize a 1-D numeric value to a `1×n` row vector, promoting to float64.
/// 2-D and higher arrays pass through unchanged; the caller owns orientation
/// beyond that.
pub fn to_row_vector(value: &Value) -> Result<NumericArray> {
    ensure_vector(value, false)
}

/// Normalize a 1-D numeric value to an `n×1` column vector, promoting to
/// float64. 2-D and higher arrays pass through unchanged.
pub fn to_column_vector(value: &Value) -> Result<NumericArray> {
    ensure_vector(value, true)
}

fn ensure_vector(value: &Value, column: bool) -> Result<NumericArray> {
    let array = match value {
        Value::Array(a) => a.to_float(),
        Value::List(items) => {
            let mut data = Vec::with_capacity(items.len());
            for item in items {
                match item.as_number() {
                    Some(n) => data.push(n),
                    None => bail!("cannot shape non-numeric list entry into a vector"),
                }
            }
            NumericArray::vector(data)
        }
        other => match other.as_number() {
            Some(n) => NumericArray::vector(vec![n]),
            None => bail!("cannot shape a {} into a vector", other.kind().as_str()),
        },
    };

    if array.ndim() != 1 {
        return Ok(array);
    }
    let n = array.outer_len();
    let shape = if column { vec![n, 1] } else { vec![1, n] };
    array.reshape(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_promote_to_float() {
        assert_eq!(coerce_argument(0, Value::Int(5)), Value::Num(5.0));
        assert_eq!(coerce_argument(0, Value::Num(2.5)), Value::Num(2.5));
    }

    #[test]
    fn booleans_are_not_promoted() {
        assert_eq!(coerce_argument(0, Value::Bool(true)), Value::Bool(true));
    }

    #[test]
    fn mixed_lists_promote_only_numbers() {
        let coerced = coerce_argument(
            1,
            Value::List(vec![Value::Int(1), Value::from("label"), Value::Num(2.5)]),
        );
        assert_eq!(
            coerced,
            Value::List(vec![Value::Num(1.0), Value::from("label"), Value::Num(2.5)])
        );
    }

    #[test]
    fn arrays_pass_through_unchanged() {
        let arr = Value::from(vec![1.0, 2.0]);
        assert_eq!(coerce_argument(0, arr.clone()), arr);
    }

    #[test]
    fn row_and_column_shapes() -> Result<()> {
        let v = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(to_row_vector(&v)?.shape(), &[1, 3]);
        assert_eq!(to_column_vector(&v)?.shape(), &[3, 1]);
        Ok(())
    }

    #[test]
    fn matrices_keep_their_shape() -> Result<()> {
        let m = NumericArray::new(Dtype::Float64, vec![2, 2], vec![1., 2., 3., 4.])?;
        assert_eq!(to_column_vector(&Value::Array(m))?.shape(), &[2, 2]);
        Ok(())
    }

    #[test]
    fn non_numeric_vectors_are_rejected() {
        let v = Value::List(vec![Value::from("a")]);
        assert!(to_row_vector(&v).is_err());
    }
}
