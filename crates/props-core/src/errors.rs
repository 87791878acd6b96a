//! Errors raised while binding, reading or configuring observables.
//!
//! Every failure carries an [`ErrorInfo`] whose `code` is what callers and
//! tests match on; the family ([`PropsError`] variant) says which layer
//! rejected the request.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload shared by all [`PropsError`] families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case identifier such as `zero-volume` or `undeclared-read`.
    pub code: String,
    /// One-line description of what went wrong.
    pub message: String,
    /// Observable or source names, replica counts and the offending values,
    /// rendered as text.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Which setting or input to change, when there is an obvious one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with no context and no hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records `key = value`; a repeated key keeps the last value.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Attaches a remedy, typically a configuration key to adjust.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        let mut pairs = self.context.iter();
        if let Some((key, value)) = pairs.next() {
            write!(f, " | context: [{key}={value}")?;
            for (key, value) in pairs {
                write!(f, ", {key}={value}")?;
            }
            f.write_str("]")?;
        }
        match &self.hint {
            Some(hint) => write!(f, " | hint: {hint}"),
            None => Ok(()),
        }
    }
}

/// Every fallible operation in the property crates returns this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum PropsError {
    /// A property name that the registry does not expose.
    #[error("lookup error: {0}")]
    Lookup(ErrorInfo),
    /// Degenerate physical state (zero volume, empty replica set, NaN input).
    #[error("domain error: {0}")]
    Domain(ErrorInfo),
    /// Dependency graph wiring and read-set violations.
    #[error("graph error: {0}")]
    Graph(ErrorInfo),
    /// Invalid configuration values or unparsable configuration documents.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Failures raised by a force model.
    #[error("model error: {0}")]
    Model(ErrorInfo),
}

impl PropsError {
    /// Payload regardless of family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            PropsError::Lookup(info)
            | PropsError::Domain(info)
            | PropsError::Graph(info)
            | PropsError::Config(info)
            | PropsError::Model(info) => info,
        }
    }

    /// Shorthand for `self.info().code`.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Lookup failure for a property name the registry does not know.
    pub fn unknown_property(name: &str) -> Self {
        PropsError::Lookup(
            ErrorInfo::new("unknown-property", "no property is registered under this name")
                .with_context("name", name),
        )
    }

    /// Degenerate-state failure with the given code.
    pub fn domain(code: &str, message: impl Into<String>) -> Self {
        PropsError::Domain(ErrorInfo::new(code, message))
    }
}

/// Fails with a `zero-volume` domain error unless `volume` is finite and positive.
pub fn ensure_positive_volume(volume: f64) -> Result<f64, PropsError> {
    if volume.is_finite() && volume > 0.0 {
        Ok(volume)
    } else {
        Err(PropsError::Domain(
            ErrorInfo::new("zero-volume", "cell volume must be finite and positive")
                .with_context("volume", volume),
        ))
    }
}

/// Fails with a `no-replicas` domain error when the replica count is zero.
pub fn ensure_replicas(nbeads: usize) -> Result<f64, PropsError> {
    if nbeads == 0 {
        Err(PropsError::domain(
            "no-replicas",
            "replica ensemble must contain at least one bead",
        ))
    } else {
        Ok(nbeads as f64)
    }
}

/// Fails with a `non-finite` domain error when `value` is NaN or infinite.
pub fn ensure_finite(label: &str, value: f64) -> Result<f64, PropsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PropsError::Domain(
            ErrorInfo::new("non-finite", "quantity is not a finite number")
                .with_context("quantity", label)
                .with_context("value", value),
        ))
    }
}
