//! Output reconstruction: names plus a shape-collapsed values field into a
//! name-keyed mapping.
//!
//! The callee reports values in a simplified form that loses arity: one
//! array-valued output is indistinguishable from several scalar outputs
//! packed into one array. The requested output count disambiguates. The
//! whole heuristic lives behind this one function so a protocol with
//! explicit per-output framing could replace it without touching callers.

use std::collections::BTreeMap;

use tracing::warn;

use crate::value::Value;

/// Zip output names with the values field, resolving the arity ambiguity
/// against the requested output count.
pub fn reconstruct_outputs(
    names: &[String],
    values: Value,
    expected: usize,
) -> BTreeMap<String, Value> {
    let produced = split_values(values, expected);

    // Declared output lists can lag behind what an invocation actually
    // returns, so a mismatch is a data-quality signal, not a failure.
    if produced.len() != names.len() && names.len() > 1 {
        warn!(
            names = names.len(),
            values = produced.len(),
            "output name count does not match produced value count"
        );
    }

    names.iter().cloned().zip(produced).collect()
}

// Arity policy, in order:
// - a numeric array whose outer length equals the expected count is a
//   container, one element per name; any other length means one
//   array-valued output;
// - a list iterates directly, one element per name;
// - anything non-iterable (scalar, string, record) is a single output.
fn split_values(values: Value, expected: usize) -> Vec<Value> {
    match values {
        Value::Array(a) => {
            if a.outer_len() == expected {
                a.outer_elements()
            } else {
                vec![Value::Array(a)]
            }
        }
        Value::List(items) => items,
        other => vec![other],
    }
}
