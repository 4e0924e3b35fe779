//! Typed access to a tool call's JSON arguments

use crate::tool::ToolError;
use serde_json::{Map, Value};

/// Keyword arguments of one tool call
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    values: Map<String, Value>,
}

impl Args {
    /// Create an empty argument set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON input handed to a tool executor
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the input is not valid JSON or not an object
    pub fn parse(input: &str) -> Result<Self, ToolError> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| ToolError::invalid_input(format!("Invalid input JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Wrap an already decoded JSON value
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the value is not an object
    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::new()),
            other => Err(ToolError::invalid_input(format!(
                "Tool arguments must be a JSON object, got {other}"
            ))),
        }
    }

    /// Builder: set an argument
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Raw argument value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// All arguments
    #[must_use]
    pub const fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Non-empty string argument, `None` for anything else
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// First non-empty string among `keys`
    #[must_use]
    pub fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.text(key))
    }

    /// Required string argument
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the argument is absent or not a string
    pub fn require_str(&self, key: &str) -> Result<&str, ToolError> {
        self.opt_str(key)?
            .ok_or_else(|| ToolError::invalid_input(format!("Missing '{key}' field")))
    }

    /// Optional string argument (`null` counts as absent)
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the argument is present but not a string
    pub fn opt_str(&self, key: &str) -> Result<Option<&str>, ToolError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(ToolError::invalid_input(format!("'{key}' must be a string"))),
        }
    }

    /// Required integer argument
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the argument is absent or not an integer
    pub fn require_i64(&self, key: &str) -> Result<i64, ToolError> {
        self.opt_i64(key)?
            .ok_or_else(|| ToolError::invalid_input(format!("Missing '{key}' field")))
    }

    /// Optional integer argument
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the argument is present but not an integer
    pub fn opt_i64(&self, key: &str) -> Result<Option<i64>, ToolError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| ToolError::invalid_input(format!("'{key}' must be an integer"))),
        }
    }

    /// Required list of strings
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the argument is absent, not an array, or holds
    /// non-string elements
    pub fn require_str_list(&self, key: &str) -> Result<Vec<String>, ToolError> {
        let items = self
            .values
            .get(key)
            .and_then(Value::as_array)
            .ok_or_else(|| ToolError::invalid_input(format!("'{key}' must be a list of strings")))?;

        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ToolError::invalid_input(format!("'{key}' must only contain strings")))
            })
            .collect()
    }
}
