//! Fixture tool catalog
//!
//! Every tool follows the same three steps: validate the arguments, fetch a flat
//! mock record (through [`call_external_api`](crate::stateful::call_external_api)
//! when the tool touches state), and reshape the record into the nested response
//! the real API returns.
//!
//! Each tool exposes a typed function plus an `*_tool(ctx)` constructor returning
//! the `(Tool, ToolExecutorFn)` pair used by the registry.
//!
//! ## Modules
//!
//! - `files`: text editor, Kroki diagram download, Japanese character counter
//! - `social`: `TabNews` post and content listing
//! - `gaming`: game shop, `OpenDota` and Steam statistics
//! - `memory`: memory add / search
//! - `packages`: npm latest-version lookup
//! - `weather`: US current weather
//! - `network`: download speed measurement

pub mod files;
pub mod gaming;
pub mod memory;
pub mod network;
pub mod packages;
pub mod social;
pub mod weather;

use crate::registry::ToolRegistry;
use rand::Rng;
use tool_fixtures_core::{Tool, ToolContext, ToolExecutorFn};
use tracing::debug;

/// Random lowercase hex identifier drawn from the context RNG
pub(crate) fn random_hex(ctx: &ToolContext, len: usize) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    ctx.with_rng(|rng| {
        (0..len)
            .map(|_| char::from(DIGITS[rng.gen_range(0..DIGITS.len())]))
            .collect()
    })
}

/// Constructor shape shared by every catalog tool
pub type ToolConstructor = fn(&ToolContext) -> (Tool, ToolExecutorFn);

/// Every catalog tool constructor
pub const CATALOG: [ToolConstructor; 15] = [
    files::text_editor_tool,
    files::download_diagram_tool,
    files::count_chars_tool,
    social::post_content_tool,
    social::get_contents_tool,
    gaming::buy_item_tool,
    gaming::get_inventory_tool,
    gaming::get_player_heroes_tool,
    gaming::get_player_recent_matches_tool,
    gaming::steam_player_stats_tool,
    memory::memory_add_tool,
    memory::memory_search_tool,
    packages::npm_latest_tool,
    weather::current_weather_tool,
    network::download_speed_tool,
];

/// Register every catalog tool against one shared context
///
/// Returns the number of tools that replaced an existing registration.
pub fn register_catalog(registry: &ToolRegistry, ctx: &ToolContext) -> usize {
    let replaced = CATALOG
        .iter()
        .map(|constructor| {
            let (tool, executor) = constructor(ctx);
            registry.register(tool, executor)
        })
        .filter(|replaced| *replaced)
        .count();
    debug!(tools = CATALOG.len(), replaced, "Registered fixture catalog");
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tool_fixtures_testing::stateless_context;

    #[test]
    fn test_catalog_names_are_unique() {
        let ctx = stateless_context();
        let names: BTreeSet<String> = CATALOG.iter().map(|c| c(&ctx).0.name).collect();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn test_register_catalog() {
        let ctx = stateless_context();
        let registry = ToolRegistry::new();
        assert_eq!(register_catalog(&registry, &ctx), 0);
        assert_eq!(registry.count(), CATALOG.len());

        // Registering again replaces every entry
        assert_eq!(register_catalog(&registry, &ctx), CATALOG.len());
    }

    #[test]
    fn test_every_schema_is_an_object() {
        let ctx = stateless_context();
        for constructor in CATALOG {
            let (tool, _) = constructor(&ctx);
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(!tool.description.is_empty());
        }
    }
}
