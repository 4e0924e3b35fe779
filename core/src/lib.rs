//! # Tool Fixtures Core
//!
//! Core types for mock tool fixtures used by tool-calling test harnesses.
//!
//! A fixture tool mimics one external API call: it validates its arguments, asks
//! a mock responder for a flat record of scalars, optionally applies state
//! effects against a shared store, and reshapes the flat record into the nested
//! response the real API would return.
//!
//! ## Modules
//!
//! - `tool`: tool definitions, executor type, errors
//! - `args`: typed access to JSON call arguments
//! - `flat`: flat records and reshaping helpers
//! - `state`: state backend trait and the in-memory store
//! - `intent`: state effects and keyword classification
//! - `context`: clock, random source and state handed to tools
//! - `config`: environment-based configuration

pub mod args;
pub mod config;
pub mod context;
pub mod flat;
pub mod intent;
pub mod state;
pub mod tool;

// Re-export commonly used types
pub use args::Args;
pub use context::{Clock, SystemClock, ToolContext};
pub use flat::{FlatRecord, ReshapeError, Scalar, Scope};
pub use intent::{Domain, Intent, IntentPlan, Intents, Outcome};
pub use state::{MemoryEntry, StateError, StateManager, StateSnapshot, StateStore};
pub use tool::{Tool, ToolError, ToolErrorKind, ToolExecutorFn, ToolFuture, ToolResult};
