//! # Tool Fixtures Testing
//!
//! Testing utilities for fixture tools.
//!
//! This crate provides:
//! - A fixed clock and deterministic tool contexts
//! - State backends that fail on purpose
//! - Assertion helpers for response schemas
//!
//! ## Example
//!
//! ```ignore
//! use tool_fixtures_testing::{assert_keys, test_context};
//!
//! let (ctx, store) = test_context();
//! let response = get_player_heroes(&ctx, 76_561_198, Some(1))?;
//! let value = serde_json::to_value(response)?;
//! assert_keys(&value, &["heroes"]);
//! ```

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tool_fixtures_core::{Clock, StateStore, ToolContext};

/// Seed used by [`test_context`]
pub const TEST_SEED: u64 = 42;

/// Mock implementations of collaborator traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use tool_fixtures_core::state::{MemoryEntry, Result, StateError, StateManager};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use tool_fixtures_testing::mocks::FixedClock;
    /// use tool_fixtures_core::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }

    /// State backend whose every operation fails
    ///
    /// Used to check that state effects never break the primary response.
    #[derive(Debug, Clone, Default)]
    pub struct FailingState;

    fn unavailable<T>() -> Result<T> {
        Err(StateError::Unavailable("failing test backend".to_string()))
    }

    impl StateManager for FailingState {
        fn read_file(&self, _path: &str) -> Result<Option<String>> {
            unavailable()
        }

        fn write_file(&self, _path: &str, _content: &str) -> Result<()> {
            unavailable()
        }

        fn delete_file(&self, _path: &str) -> Result<bool> {
            unavailable()
        }

        fn list_files(&self, _prefix: &str) -> Result<Vec<String>> {
            unavailable()
        }

        fn get_feed(&self) -> Result<Vec<String>> {
            unavailable()
        }

        fn post_content(&self, _content: &str) -> Result<()> {
            unavailable()
        }

        fn get_inventory(&self) -> Result<Vec<String>> {
            unavailable()
        }

        fn add_item(&self, _item: &str) -> Result<()> {
            unavailable()
        }

        fn add_memory(&self, _entry: MemoryEntry) -> Result<()> {
            unavailable()
        }

        fn search_memories(&self, _query: &str) -> Result<Vec<MemoryEntry>> {
            unavailable()
        }

        fn reset(&self) -> Result<()> {
            unavailable()
        }
    }
}

/// Deterministic context (fixed clock, seeded RNG) with a fresh store
///
/// The store handle is returned so tests can inspect it directly.
#[must_use]
pub fn test_context() -> (ToolContext, StateStore) {
    let store = StateStore::new();
    let ctx = stateless_context().with_store(store.clone());
    (ctx, store)
}

/// Deterministic context without any state backend
#[must_use]
pub fn stateless_context() -> ToolContext {
    ToolContext::new()
        .with_clock(Arc::new(mocks::test_clock()))
        .with_seed(TEST_SEED)
}

/// Deterministic context whose state backend always fails
#[must_use]
pub fn failing_context() -> ToolContext {
    stateless_context().with_state(Arc::new(mocks::FailingState))
}

/// Assertion helpers for JSON responses
pub mod helpers {
    use serde_json::Value;
    use tool_fixtures_core::ToolResult;

    /// Sorted top-level keys of a JSON object (empty for non-objects)
    #[must_use]
    pub fn keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Assert that `value` is an object with exactly `expected` top-level keys
    ///
    /// # Panics
    ///
    /// Panics if the key sets differ
    #[allow(clippy::panic)]
    pub fn assert_keys(value: &Value, expected: &[&str]) {
        let mut expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
        expected.sort();
        let actual = keys(value);
        if actual != expected {
            panic!("schema mismatch: expected keys {expected:?}, got {actual:?}");
        }
    }

    /// Decode a successful executor result
    ///
    /// # Panics
    ///
    /// Panics if the result is an error or not valid JSON
    #[allow(clippy::panic)]
    #[must_use]
    pub fn parse_output(result: ToolResult) -> Value {
        match result {
            Ok(output) => match serde_json::from_str(&output) {
                Ok(value) => value,
                Err(e) => panic!("tool output is not JSON: {e}"),
            },
            Err(e) => panic!("tool failed: {e}"),
        }
    }
}

// Re-export commonly used items
pub use helpers::{assert_keys, keys, parse_output};
pub use mocks::{FailingState, FixedClock, test_clock};
