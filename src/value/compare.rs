//! Deep value equality tolerant of lossy serialization.
//!
//! Two deliberate departures from plain `==`: scalar numerics compare across
//! the Int/Num divide (serialization narrows rich scalars to plain numbers),
//! and NaN compares equal to NaN at any depth ("both undefined" equality).
//! Numeric array comparison is exact, zero tolerance.

use std::collections::BTreeMap;

use tracing::debug;

use super::Value;

pub fn values_equal(a: &Value, b: &Value) -> bool {
    // Numeric-narrowing exception: Int(3) vs Num(3.0) is the same scalar.
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return x == y || (x.is_nan() && y.is_nan());
    }

    match (a, b) {
        (Value::Struct(x), Value::Struct(y)) => maps_equal(x, y),
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(i, j)| values_equal(i, j))
        }
        // NumericArray's PartialEq already does dtype + shape + NaN-aware
        // exact elementwise comparison.
        (Value::Array(x), Value::Array(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        _ => {
            debug!(
                left = a.kind().as_str(),
                right = b.kind().as_str(),
                "type mismatch during comparison"
            );
            false
        }
    }
}

pub fn maps_equal(a: &BTreeMap<String, Value>, b: &BTreeMap<String, Value>) -> bool {
    if a.len() != b.len() {
        debug!("different key counts in mappings");
        return false;
    }
    for (key, left) in a {
        match b.get(key) {
            Some(right) if values_equal(left, right) => {}
            Some(_) => {
                debug!(key, "different values for key");
                return false;
            }
            None => {
                debug!(key, "key missing from right-hand mapping");
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NumericArray;

    #[test]
    fn narrowed_int_equals_float() {
        assert!(values_equal(&Value::Int(3), &Value::Num(3.0)));
        assert!(!values_equal(&Value::Int(3), &Value::Num(3.5)));
    }

    #[test]
    fn nan_equals_nan_at_depth() {
        let a = Value::List(vec![Value::Struct(
            [("x".to_string(), Value::Num(f64::NAN))].into_iter().collect(),
        )]);
        let b = a.clone();
        assert!(values_equal(&a, &b));
    }

    #[test]
    fn type_mismatch_is_unequal() {
        assert!(!values_equal(&Value::from("3"), &Value::Num(3.0)));
        assert!(!values_equal(
            &Value::List(vec![Value::Num(1.0)]),
            &Value::Array(NumericArray::vector(vec![1.0]))
        ));
        // Bool is not a number in this model.
        assert!(!values_equal(&Value::Bool(true), &Value::Num(1.0)));
    }

    #[test]
    fn key_sets_must_match() {
        let a: BTreeMap<String, Value> = [("x".to_string(), Value::Int(1))].into_iter().collect();
        let b: BTreeMap<String, Value> = [("y".to_string(), Value::Int(1))].into_iter().collect();
        assert!(!maps_equal(&a, &b));
    }
}
