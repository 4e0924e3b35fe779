//! Tool registry for dynamic tool management
//!
//! The registry provides:
//! - Dynamic tool registration
//! - Thread-safe tool storage
//! - Tool execution by name
//! - Tool listing and introspection

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tool_fixtures_core::{Tool, ToolError, ToolExecutorFn, ToolResult};

type Entries = HashMap<String, (Tool, ToolExecutorFn)>;

/// Thread-safe tool registry
///
/// The registry stores tools and their executors, allowing dynamic
/// registration and execution by name.
///
/// ## Example
///
/// ```ignore
/// use tool_fixtures::registry::ToolRegistry;
/// use tool_fixtures::catalog::gaming::get_player_heroes_tool;
///
/// let registry = ToolRegistry::new();
/// let (tool, executor) = get_player_heroes_tool(&ctx);
/// registry.register(tool, executor);
///
/// // Execute tool by name
/// let result = registry
///     .execute("opendota_api_server_get_player_heroes", r#"{"account_id": 76561198}"#.to_string())
///     .await;
/// ```
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<Entries>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_tools())
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty tool registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // Entries are only ever replaced whole, so a poisoned map is still consistent
    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.tools.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.tools.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a tool with its executor
    ///
    /// If a tool with the same name already exists, it will be replaced
    /// and this method returns `true`. Otherwise, returns `false`.
    pub fn register(&self, tool: Tool, executor: ToolExecutorFn) -> bool {
        self.write()
            .insert(tool.name.clone(), (tool, executor))
            .is_some()
    }

    /// Execute a tool by name
    ///
    /// # Errors
    ///
    /// Returns `ToolError` with kind `NotFound` if no tool has that name, or
    /// whatever error the tool itself reports
    pub async fn execute(&self, name: &str, input: String) -> ToolResult {
        // Get executor (release lock quickly)
        let executor = self.read().get(name).map(|(_, executor)| executor.clone());

        match executor {
            Some(executor) => executor(input).await,
            None => Err(ToolError::not_found(name)),
        }
    }

    /// Registered tool names, sorted alphabetically
    #[must_use]
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// All tool definitions, sorted by name
    #[must_use]
    pub fn get_tools(&self) -> Vec<Tool> {
        let mut tool_list: Vec<Tool> = self.read().values().map(|(tool, _)| tool.clone()).collect();
        tool_list.sort_by(|a, b| a.name.cmp(&b.name));
        tool_list
    }

    /// Get a specific tool by name
    ///
    /// Returns `None` if the tool is not registered.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<Tool> {
        self.read().get(name).map(|(tool, _)| tool.clone())
    }

    /// Remove a tool from the registry
    ///
    /// Returns `true` if the tool was removed, `false` if it didn't exist.
    pub fn unregister(&self, name: &str) -> bool {
        self.write().remove(name).is_some()
    }

    /// Clear all tools from the registry
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Get the number of registered tools
    #[must_use]
    pub fn count(&self) -> usize {
        self.read().len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::gaming::{get_player_heroes_tool, steam_player_stats_tool};
    use serde_json::json;
    use tool_fixtures_core::ToolErrorKind;
    use tool_fixtures_testing::{parse_output, stateless_context};

    #[test]
    fn test_registry_new() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_registry_register_replace() {
        let ctx = stateless_context();
        let registry = ToolRegistry::new();
        let (tool1, executor1) = get_player_heroes_tool(&ctx);
        let (tool2, executor2) = get_player_heroes_tool(&ctx);

        assert!(!registry.register(tool1, executor1)); // First registration
        assert!(registry.register(tool2, executor2)); // Second registration replaces
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_registry_listing_is_sorted() {
        let ctx = stateless_context();
        let registry = ToolRegistry::new();
        let (tool1, executor1) = steam_player_stats_tool(&ctx);
        let (tool2, executor2) = get_player_heroes_tool(&ctx);

        registry.register(tool1, executor1);
        registry.register(tool2, executor2);

        let names = registry.list_tools();
        assert_eq!(
            names,
            vec!["opendota_api_server_get_player_heroes", "steam_statistics_get_player_stats"]
        );

        let tools = registry.get_tools();
        assert_eq!(tools[0].name, names[0]);
        assert_eq!(tools[1].name, names[1]);
    }

    #[test]
    fn test_registry_get_tool() {
        let registry = ToolRegistry::new();
        let (tool, executor) = get_player_heroes_tool(&stateless_context());
        registry.register(tool, executor);

        let retrieved = registry.get_tool("opendota_api_server_get_player_heroes");
        assert!(retrieved.is_some_and(|tool| tool.input_schema["required"] == json!(["account_id"])));
        assert!(registry.get_tool("nonexistent").is_none());
    }

    #[tokio::test]
    async fn test_registry_execute() {
        let registry = ToolRegistry::new();
        let (tool, executor) = get_player_heroes_tool(&stateless_context());
        registry.register(tool, executor);

        let result = registry
            .execute(
                "opendota_api_server_get_player_heroes",
                json!({"account_id": 76_561_198, "limit": 1}).to_string(),
            )
            .await;

        let output = parse_output(result);
        assert_eq!(output["heroes"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_registry_execute_not_found() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute("nonexistent", json!({"query": "test"}).to_string())
            .await
            .expect_err("should fail");

        assert_eq!(err.kind, ToolErrorKind::NotFound);
        assert!(err.message.contains("Tool not found"));
    }

    #[test]
    fn test_registry_unregister_and_clear() {
        let ctx = stateless_context();
        let registry = ToolRegistry::new();
        let (tool1, executor1) = get_player_heroes_tool(&ctx);
        let (tool2, executor2) = steam_player_stats_tool(&ctx);
        registry.register(tool1, executor1);
        registry.register(tool2, executor2);

        assert!(registry.unregister("opendota_api_server_get_player_heroes"));
        assert!(!registry.unregister("nonexistent"));
        assert_eq!(registry.count(), 1);

        registry.clear();
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_registry_survives_poisoned_lock() {
        let registry = ToolRegistry::new();
        let clone = registry.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.tools.write().expect("lock");
            #[allow(clippy::panic)]
            {
                panic!("poison the registry");
            }
        })
        .join();

        let (tool, executor) = get_player_heroes_tool(&stateless_context());
        registry.register(tool, executor);
        assert_eq!(registry.count(), 1);
    }
}
