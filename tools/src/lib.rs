//! Mock tool fixtures for tool-calling harnesses
//!
//! This crate provides stand-ins for third-party tool servers. Each fixture
//! answers with the shape the real API returns, and the stateful ones also read
//! and write a shared [`StateStore`](tool_fixtures_core::StateStore) so a
//! multi-step session stays consistent (a file written by one tool can be read
//! back by another, a purchase shows up in the inventory, and so on).
//!
//! ## Modules
//!
//! - `stateful`: wrapper that runs a mock responder and applies state effects
//! - `executor`: adapts typed tool functions to [`ToolExecutorFn`]
//! - `registry`: tool registry for dynamic tool management
//! - `catalog`: the fixture tools themselves
//!
//! ## Example
//!
//! ```no_run
//! use tool_fixtures::{register_catalog, ToolRegistry};
//! use tool_fixtures_core::{StateStore, ToolContext};
//!
//! # async fn run() -> Result<(), tool_fixtures_core::ToolError> {
//! let ctx = ToolContext::new().with_store(StateStore::new());
//! let registry = ToolRegistry::new();
//! register_catalog(&registry, &ctx);
//!
//! registry
//!     .execute("game_shop_buy_item", r#"{"item": "Iron Shield"}"#.to_string())
//!     .await?;
//! let inventory = registry
//!     .execute("game_shop_get_inventory", "{}".to_string())
//!     .await?;
//! assert!(inventory.contains("Iron Shield"));
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod executor;
pub mod registry;
pub mod stateful;

pub use tool_fixtures_core::{Tool, ToolExecutorFn, ToolResult};

// Re-export commonly used types
pub use catalog::{register_catalog, CATALOG};
pub use registry::ToolRegistry;
pub use stateful::{call_external_api, ApiResponse};
