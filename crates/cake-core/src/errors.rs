//! Structured error types shared across the cake crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`CakeError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (agent indices, positions, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the division pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CakeError {
    /// Query bounds outside the normalized cake.
    #[error("invalid range: {0}")]
    InvalidRange(ErrorInfo),
    /// Cut positions that are not non-decreasing inside the cake.
    #[error("invalid division: {0}")]
    InvalidDivision(ErrorInfo),
    /// Internal certification guarantee violated.
    #[error("invariant violation: {0}")]
    Invariant(ErrorInfo),
    /// Malformed division request.
    #[error("input error: {0}")]
    Input(ErrorInfo),
    /// Invalid solver configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl CakeError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CakeError::InvalidRange(info)
            | CakeError::InvalidDivision(info)
            | CakeError::Invariant(info)
            | CakeError::Input(info)
            | CakeError::Config(info)
            | CakeError::Serde(info) => info,
        }
    }

    /// Shorthand for an [`CakeError::Input`] error.
    pub fn input(code: &str, message: impl Into<String>) -> Self {
        CakeError::Input(ErrorInfo::new(code, message))
    }

    /// Shorthand for an [`CakeError::Config`] error.
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        CakeError::Config(ErrorInfo::new(code, message))
    }

    /// Shorthand for an [`CakeError::Serde`] error.
    pub fn serde(code: &str, err: impl ToString) -> Self {
        CakeError::Serde(ErrorInfo::new(code, err.to_string()))
    }
}
