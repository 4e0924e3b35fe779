//! Tool definition types shared by every fixture tool
//!
//! A tool is described by a [`Tool`] (name, description, JSON input schema) and
//! executed through a [`ToolExecutorFn`] that takes the JSON-encoded arguments and
//! resolves to a JSON-encoded response.
//!
//! ## Error kinds
//!
//! Generated tools historically failed in several ways (value errors, key errors,
//! runtime errors). [`ToolErrorKind`] keeps that distinction so a harness can assert
//! on the kind of failure without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Tool definition, in the shape tool-calling APIs expect
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// Tool name (used to identify which tool to call)
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON schema for the tool's input parameters
    pub input_schema: serde_json::Value,
}

/// Result from tool execution (JSON-encoded response on success)
pub type ToolResult = Result<String, ToolError>;

/// Boxed future returned by tool executors
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// Tool executor: JSON input string in, [`ToolResult`] out
pub type ToolExecutorFn = Arc<dyn Fn(String) -> ToolFuture + Send + Sync>;

/// Category of a tool failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Argument missing, of the wrong type, or out of range
    InvalidInput,
    /// Mock record lacked a key the response schema needs
    MissingField,
    /// Unexpected failure while building the response
    Internal,
    /// No tool registered under the requested name
    NotFound,
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid_input"),
            Self::MissingField => write!(f, "missing_field"),
            Self::Internal => write!(f, "internal"),
            Self::NotFound => write!(f, "not_found"),
        }
    }
}

/// Tool execution errors
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolError {
    /// Failure category
    pub kind: ToolErrorKind,
    /// Error message
    pub message: String,
}

impl ToolError {
    /// Invalid or missing argument
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: ToolErrorKind::InvalidInput,
            message: message.into(),
        }
    }

    /// Response could not be built because a field was absent
    #[must_use]
    pub fn missing_field(message: impl Into<String>) -> Self {
        Self {
            kind: ToolErrorKind::MissingField,
            message: message.into(),
        }
    }

    /// Unexpected internal failure
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ToolErrorKind::Internal,
            message: message.into(),
        }
    }

    /// Unknown tool name
    #[must_use]
    pub fn not_found(name: &str) -> Self {
        Self {
            kind: ToolErrorKind::NotFound,
            message: format!("Tool not found: {name}"),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ToolError {}

impl From<crate::flat::ReshapeError> for ToolError {
    fn from(err: crate::flat::ReshapeError) -> Self {
        match err {
            crate::flat::ReshapeError::MissingField { .. } => Self::missing_field(err.to_string()),
            crate::flat::ReshapeError::TypeMismatch { .. } => Self::internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("Failed to encode response: {err}"))
    }
}
