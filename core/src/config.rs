//! Configuration for fixture sessions
//!
//! Provides environment-based configuration with validation and an optional TOML
//! overlay file.
//!
//! # Example
//!
//! ```no_run
//! use tool_fixtures_core::config::{Environment, FixtureConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads FIXTURE_ENV (defaults to development) and FIXTURE_CONFIG (optional TOML file)
//! let config = FixtureConfig::from_env()?;
//!
//! // Or load explicitly
//! let config = FixtureConfig::load(Environment::Production)?;
//! println!("Effects enabled: {}", config.state.effects_enabled);
//! # Ok(())
//! # }
//! ```

use crate::context::ToolContext;
use crate::state::{StateLimits, StateStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::{Table, Value};

/// Environment variable selecting the deployment environment
pub const ENV_VAR: &str = "FIXTURE_ENV";

/// Environment variable pointing at an optional TOML overlay
pub const CONFIG_PATH_VAR: &str = "FIXTURE_CONFIG";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid environment value
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// Overlay file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Overlay file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration could not be turned into TOML for merging
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Shared evaluation runs
    Staging,
    /// Production harness
    Production,
}

impl Environment {
    /// Get environment from string
    ///
    /// # Errors
    ///
    /// Returns error if environment string is invalid
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }

    /// Check if this is development environment
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl ObservabilityConfig {
    /// Validate observability configuration
    ///
    /// # Errors
    ///
    /// Returns error if the log level is unknown
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "invalid log_level: {}. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// State store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Apply state effects at all
    pub effects_enabled: bool,
    /// Feed capacity
    pub max_feed_items: usize,
    /// Inventory capacity
    pub max_inventory_items: usize,
    /// Memory log capacity
    pub max_memories: usize,
}

impl StateConfig {
    /// Validate state configuration
    ///
    /// # Errors
    ///
    /// Returns error if a capacity is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_feed_items == 0 {
            return Err(ConfigError::ValidationError("max_feed_items must be > 0".to_string()));
        }
        if self.max_inventory_items == 0 {
            return Err(ConfigError::ValidationError(
                "max_inventory_items must be > 0".to_string(),
            ));
        }
        if self.max_memories == 0 {
            return Err(ConfigError::ValidationError("max_memories must be > 0".to_string()));
        }
        Ok(())
    }

    /// Store limits
    #[must_use]
    pub const fn limits(&self) -> StateLimits {
        StateLimits {
            max_feed_items: self.max_feed_items,
            max_inventory_items: self.max_inventory_items,
            max_memories: self.max_memories,
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        let limits = StateLimits::default();
        Self {
            effects_enabled: true,
            max_feed_items: limits.max_feed_items,
            max_inventory_items: limits.max_inventory_items,
            max_memories: limits.max_memories,
        }
    }
}

/// Mock responder configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Seed for randomized responders (unseeded when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
}

/// Fixture session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,
    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// State store configuration
    #[serde(default)]
    pub state: StateConfig,
    /// Responder configuration
    #[serde(default)]
    pub responder: ResponderConfig,
}

impl FixtureConfig {
    /// Load configuration from the environment
    ///
    /// Reads `FIXTURE_ENV` (defaults to "development"), then overlays the TOML
    /// file named by `FIXTURE_CONFIG` if set.
    ///
    /// # Errors
    ///
    /// Returns error if configuration cannot be loaded or is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = std::env::var(ENV_VAR).ok();
        let overlay = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
        Self::from_sources(environment.as_deref(), overlay.as_deref())
    }

    /// Environment defaults for `environment` (development when absent) with the
    /// TOML file at `overlay` applied on top
    ///
    /// # Errors
    ///
    /// Returns error if the environment is unknown, or the overlay cannot be read,
    /// parsed or validated
    pub fn from_sources(environment: Option<&str>, overlay: Option<&Path>) -> Result<Self, ConfigError> {
        let environment = environment.map_or(Ok(Environment::Development), Environment::parse)?;
        let config = Self::load(environment)?;
        match overlay {
            Some(path) => config.overlay(&read_document(path)?),
            None => Ok(config),
        }
    }

    /// Load configuration for specific environment
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let mut config = Self {
            environment,
            ..Self::default()
        };

        // Environment-specific overrides
        match environment {
            Environment::Development => {
                config.observability.log_level = "debug".to_string();
            }
            Environment::Staging => {
                config.observability.log_level = "info".to_string();
            }
            Environment::Production => {
                config.observability.log_level = "warn".to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document
    ///
    /// The document only needs the keys it changes. Everything else comes from
    /// the defaults of its `environment` (development when absent).
    ///
    /// # Errors
    ///
    /// Returns error if the document is malformed or invalid
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        let patch: Table = toml::from_str(document)?;
        let selected: EnvironmentOnly = Value::Table(patch.clone()).try_into()?;
        Self::load(selected.environment)?.apply(patch)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml(&read_document(path.as_ref())?)
    }

    /// Apply a TOML document on top of this configuration
    ///
    /// Tables merge key by key; keys the document leaves out keep their values.
    ///
    /// # Errors
    ///
    /// Returns error if the document is malformed or the result is invalid
    pub fn overlay(self, document: &str) -> Result<Self, ConfigError> {
        let patch: Table = toml::from_str(document)?;
        self.apply(patch)
    }

    fn apply(self, patch: Table) -> Result<Self, ConfigError> {
        let mut merged = match Value::try_from(&self)? {
            Value::Table(table) => table,
            _ => Table::new(),
        };
        merge_tables(&mut merged, patch);
        let config: Self = Value::Table(merged).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate entire configuration
    ///
    /// # Errors
    ///
    /// Returns error if any configuration section is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.observability.validate()?;
        self.state.validate()?;
        Ok(())
    }

    /// Fresh store sized by this configuration
    #[must_use]
    pub fn build_store(&self) -> StateStore {
        StateStore::with_limits(self.state.limits())
    }

    /// Context wired to `store` according to this configuration
    #[must_use]
    pub fn build_context(&self, store: StateStore) -> ToolContext {
        let ctx = ToolContext::new()
            .with_store(store)
            .with_effects(self.state.effects_enabled);
        match self.responder.random_seed {
            Some(seed) => ctx.with_seed(seed),
            None => ctx,
        }
    }
}

#[derive(Deserialize)]
struct EnvironmentOnly {
    #[serde(default)]
    environment: Environment,
}

fn read_document(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn merge_tables(base: &mut Table, patch: Table) {
    for (key, value) in patch {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(existing)), Value::Table(nested)) => merge_tables(existing, nested),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            observability: ObservabilityConfig::default(),
            state: StateConfig::default(),
            responder: ResponderConfig::default(),
        }
    }
}
