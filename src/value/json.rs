//! Tagged JSON codec for dynamic values.
//!
//! One codec serves the request file, the response file, and persisted
//! execution results. Plain JSON cannot express dtype, shape, or non-finite
//! floats, so arrays travel as `{"__ndarray__": [..], "dtype": .., "shape":
//! [..]}` and non-finite scalars as `{"__float__": "NaN"}`; inside array
//! data the sentinels are bare strings. Records are plain JSON objects and
//! decode depth-first into ordinary mappings, so no opaque record type
//! survives decoding, including records nested inside lists.

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Map, Number};

use super::{Dtype, NumericArray, Value};

const NDARRAY_KEY: &str = "__ndarray__";
const FLOAT_KEY: &str = "__float__";

pub fn encode(value: &Value) -> serde_json::Value {
    match value {
        Value::Num(n) => encode_float(*n),
        Value::Int(i) => json!(i),
        Value::Bool(b) => json!(b),
        Value::Str(s) => json!(s),
        Value::List(items) => serde_json::Value::Array(items.iter().map(encode).collect()),
        Value::Array(a) => json!({
            NDARRAY_KEY: a.data().iter().map(|&x| encode_entry(x)).collect::<Vec<_>>(),
            "dtype": a.dtype().as_str(),
            "shape": a.shape(),
        }),
        Value::Struct(fields) => {
            let map: Map<String, serde_json::Value> =
                fields.iter().map(|(k, v)| (k.clone(), encode(v))).collect();
            serde_json::Value::Object(map)
        }
    }
}

pub fn decode(value: &serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::Number(n) => decode_number(n),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::String(s) => Ok(Value::Str(s.clone())),
        serde_json::Value::Array(items) => Ok(Value::List(
            items.iter().map(decode).collect::<Result<Vec<_>>>()?,
        )),
        serde_json::Value::Object(map) => decode_object(map),
        serde_json::Value::Null => bail!("null is not a transferable value"),
    }
}

fn decode_object(map: &Map<String, serde_json::Value>) -> Result<Value> {
    if let Some(sentinel) = map.get(FLOAT_KEY) {
        let s = sentinel
            .as_str()
            .ok_or_else(|| anyhow!("{} must hold a string sentinel", FLOAT_KEY))?;
        return Ok(Value::Num(parse_sentinel(s)?));
    }
    if map.contains_key(NDARRAY_KEY) {
        return decode_array(map);
    }
    // Anything else is a record; flatten fields depth-first.
    let mut fields = BTreeMap::new();
    for (k, v) in map {
        fields.insert(k.clone(), decode(v)?);
    }
    Ok(Value::Struct(fields))
}

fn decode_array(map: &Map<String, serde_json::Value>) -> Result<Value> {
    let entries = map
        .get(NDARRAY_KEY)
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("{} must hold an array of entries", NDARRAY_KEY))?;
    let dtype = map
        .get("dtype")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("array is missing its dtype tag"))?;
    let dtype = Dtype::parse(dtype)?;
    let shape: Vec<usize> = match map.get("shape") {
        Some(s) => serde_json::from_value(s.clone()).context("parsing array shape")?,
        None => vec![entries.len()],
    };
    let mut data = Vec::with_capacity(entries.len());
    for entry in entries {
        data.push(decode_entry(entry)?);
    }
    Ok(Value::Array(NumericArray::new(dtype, shape, data)?))
}

fn decode_number(n: &Number) -> Result<Value> {
    if let Some(i) = n.as_i64() {
        if !n.is_f64() {
            return Ok(Value::Int(i));
        }
    }
    n.as_f64()
        .map(Value::Num)
        .ok_or_else(|| anyhow!("number {} does not fit a 64-bit float", n))
}

fn encode_float(x: f64) -> serde_json::Value {
    if x.is_finite() {
        json!(x)
    } else {
        json!({ FLOAT_KEY: sentinel_str(x) })
    }
}

// Array entries use the bare sentinel string instead of the tagged object.
fn encode_entry(x: f64) -> serde_json::Value {
    if x.is_finite() {
        json!(x)
    } else {
        json!(sentinel_str(x))
    }
}

fn decode_entry(entry: &serde_json::Value) -> Result<f64> {
    match entry {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| anyhow!("array entry {} does not fit a 64-bit float", n)),
        serde_json::Value::String(s) => parse_sentinel(s),
        other => bail!("array entry must be numeric, got {}", other),
    }
}

fn sentinel_str(x: f64) -> &'static str {
    if x.is_nan() {
        "NaN"
    } else if x > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

fn parse_sentinel(s: &str) -> Result<f64> {
    Ok(match s {
        "NaN" => f64::NAN,
        "Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        other => bail!("unknown float sentinel '{}'", other),
    })
}
