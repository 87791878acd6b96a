use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, PropsError};

/// Value carried by a computed property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Value {
    /// Scalar observable (energies, temperature, pressure, time).
    Scalar(f64),
    /// Flat list of numbers (lattice parameters).
    Vector(Vec<f64>),
    /// Rank-two Cartesian tensor (stress, kinetic stress).
    Tensor(Matrix3<f64>),
}

impl Value {
    /// Short label for the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Vector(_) => "vector",
            Value::Tensor(_) => "tensor",
        }
    }

    /// Returns the scalar payload or a `type-mismatch` error.
    pub fn as_scalar(&self) -> Result<f64, PropsError> {
        match self {
            Value::Scalar(value) => Ok(*value),
            other => Err(other.mismatch("scalar")),
        }
    }

    /// Returns the vector payload or a `type-mismatch` error.
    pub fn as_vector(&self) -> Result<&[f64], PropsError> {
        match self {
            Value::Vector(values) => Ok(values),
            other => Err(other.mismatch("vector")),
        }
    }

    /// Returns the tensor payload or a `type-mismatch` error.
    pub fn as_tensor(&self) -> Result<&Matrix3<f64>, PropsError> {
        match self {
            Value::Tensor(tensor) => Ok(tensor),
            other => Err(other.mismatch("tensor")),
        }
    }

    fn mismatch(&self, expected: &str) -> PropsError {
        PropsError::Graph(
            ErrorInfo::new("type-mismatch", "property value has an unexpected shape")
                .with_context("expected", expected)
                .with_context("found", self.kind()),
        )
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::Vector(values)
    }
}

impl From<Matrix3<f64>> for Value {
    fn from(tensor: Matrix3<f64>) -> Self {
        Value::Tensor(tensor)
    }
}
