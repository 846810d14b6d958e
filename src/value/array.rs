//! Shaped numeric arrays with an element-type tag.
//!
//! The callee's matrix model is richer than JSON, so arrays carry their
//! dtype and shape explicitly and only flatten to row-major data for
//! storage. Element data is held as f64 regardless of dtype; the tag is
//! what must survive a round trip, not the in-memory width.

use anyhow::{bail, Result};

use super::Value;

/// Element type of a [`NumericArray`], named after the callee's types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    Float64,
    Float32,
    Int64,
    Int32,
    Int16,
    Uint16,
    Uint8,
    Bool,
}

impl Dtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dtype::Float64 => "float64",
            Dtype::Float32 => "float32",
            Dtype::Int64 => "int64",
            Dtype::Int32 => "int32",
            Dtype::Int16 => "int16",
            Dtype::Uint16 => "uint16",
            Dtype::Uint8 => "uint8",
            Dtype::Bool => "bool",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Ok(match s {
            "float64" | "double" => Dtype::Float64,
            "float32" | "single" => Dtype::Float32,
            "int64" => Dtype::Int64,
            "int32" => Dtype::Int32,
            "int16" => Dtype::Int16,
            "uint16" => Dtype::Uint16,
            "uint8" => Dtype::Uint8,
            "bool" | "logical" => Dtype::Bool,
            other => bail!("unknown dtype '{}'", other),
        })
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Dtype::Float64 | Dtype::Float32)
    }
}

/// An n-dimensional numeric array: dtype tag, row-major shape, flat data.
#[derive(Debug, Clone)]
pub struct NumericArray {
    dtype: Dtype,
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NumericArray {
    pub fn new(dtype: Dtype, shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            bail!(
                "shape {:?} implies {} elements, got {}",
                shape,
                expected,
                data.len()
            );
        }
        Ok(Self { dtype, shape, data })
    }

    /// A 1-D float64 array, the callee's default numeric container.
    pub fn vector(data: Vec<f64>) -> Self {
        let shape = vec![data.len()];
        Self {
            dtype: Dtype::Float64,
            shape,
            data,
        }
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Length along the first axis; zero for an empty shape.
    pub fn outer_len(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Element `i` along the first axis: a scalar for 1-D arrays, a
    /// subarray of shape `shape[1..]` otherwise.
    pub fn outer_element(&self, i: usize) -> Result<Value> {
        if i >= self.outer_len() {
            bail!("index {} out of bounds for outer length {}", i, self.outer_len());
        }
        if self.ndim() == 1 {
            return Ok(self.scalar_value(self.data[i]));
        }
        let inner: usize = self.shape[1..].iter().product();
        let chunk = self.data[i * inner..(i + 1) * inner].to_vec();
        let sub = NumericArray::new(self.dtype, self.shape[1..].to_vec(), chunk)?;
        Ok(Value::Array(sub))
    }

    /// Split along the first axis: scalars for a 1-D array, subarrays of
    /// shape `shape[1..]` otherwise.
    pub fn outer_elements(&self) -> Vec<Value> {
        if self.ndim() <= 1 {
            return self.data.iter().map(|&x| self.scalar_value(x)).collect();
        }
        let inner: usize = self.shape[1..].iter().product();
        if inner == 0 {
            let empty = Self {
                dtype: self.dtype,
                shape: self.shape[1..].to_vec(),
                data: Vec::new(),
            };
            return vec![Value::Array(empty); self.outer_len()];
        }
        self.data
            .chunks(inner)
            .map(|chunk| {
                Value::Array(Self {
                    dtype: self.dtype,
                    shape: self.shape[1..].to_vec(),
                    data: chunk.to_vec(),
                })
            })
            .collect()
    }

    fn scalar_value(&self, raw: f64) -> Value {
        match self.dtype {
            d if d.is_float() => Value::Num(raw),
            Dtype::Bool => Value::Bool(raw != 0.0),
            _ => Value::Int(raw as i64),
        }
    }

    /// Same data reinterpreted under a new shape.
    pub fn reshape(self, shape: Vec<usize>) -> Result<Self> {
        NumericArray::new(self.dtype, shape, self.data)
    }

    /// A float64 copy, dtype promotion included.
    pub fn to_float(&self) -> Self {
        Self {
            dtype: Dtype::Float64,
            shape: self.shape.clone(),
            data: self.data.clone(),
        }
    }
}

// Exact elementwise equality, except that NaN entries at corresponding
// positions compare equal. Dtype and shape must match.
impl PartialEq for NumericArray {
    fn eq(&self, other: &Self) -> bool {
        self.dtype == other.dtype
            && self.shape == other.shape
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_must_match_data_length() {
        assert!(NumericArray::new(Dtype::Float64, vec![2, 3], vec![0.0; 5]).is_err());
        assert!(NumericArray::new(Dtype::Float64, vec![2, 3], vec![0.0; 6]).is_ok());
    }

    #[test]
    fn outer_element_splits_rows() -> Result<()> {
        let m = NumericArray::new(Dtype::Float64, vec![2, 3], vec![1., 2., 3., 4., 5., 6.])?;
        let row = m.outer_element(1)?;
        match row {
            Value::Array(r) => {
                assert_eq!(r.shape(), &[3]);
                assert_eq!(r.data(), &[4., 5., 6.]);
            }
            other => panic!("expected subarray, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn outer_element_of_vector_is_scalar() -> Result<()> {
        let v = NumericArray::new(Dtype::Int32, vec![3], vec![7., 8., 9.])?;
        assert_eq!(v.outer_element(0)?, Value::Int(7));
        let f = NumericArray::vector(vec![1.5]);
        assert_eq!(f.outer_element(0)?, Value::Num(1.5));
        Ok(())
    }

    #[test]
    fn nan_entries_compare_equal() {
        let a = NumericArray::vector(vec![1.0, f64::NAN]);
        let b = NumericArray::vector(vec![1.0, f64::NAN]);
        assert_eq!(a, b);
        let c = NumericArray::vector(vec![1.0, 2.0]);
        assert_ne!(a, c);
    }

    #[test]
    fn dtype_is_part_of_equality() {
        let a = NumericArray::vector(vec![1.0, 2.0]);
        let b = NumericArray::new(Dtype::Int64, vec![2], vec![1.0, 2.0]).unwrap();
        assert_ne!(a, b);
    }
}
