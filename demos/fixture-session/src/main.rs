//! Fixture session demo
//!
//! Registers the whole fixture catalog against one shared state store and runs a
//! short scripted session through the registry:
//! - an editor write read back by the character counter
//! - a diagram download viewed through the editor, then a scratch file deleted
//! - a purchase followed by an inventory check
//! - a post followed by a feed listing
//! - a remembered note found by search
//!
//! Configuration comes from `FIXTURE_ENV` / `FIXTURE_CONFIG`; `RUST_LOG` overrides
//! the configured log level.

use anyhow::Context as _;
use serde_json::{json, Value};
use tool_fixtures::catalog::{files, gaming, memory, social};
use tool_fixtures::{register_catalog, ToolRegistry};
use tool_fixtures_core::config::FixtureConfig;
use tool_fixtures_core::StateManager;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn pretty_json(output: &str) -> String {
    serde_json::from_str::<Value>(output)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| output.to_string())
}

async fn call(registry: &ToolRegistry, name: &str, args: Value) -> anyhow::Result<String> {
    let output = registry
        .execute(name, args.to_string())
        .await
        .with_context(|| format!("{name} failed"))?;
    println!("→ {name}\n{}\n", pretty_json(&output));
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = FixtureConfig::from_env().context("loading fixture configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.observability.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Fixture Session ({}) ===\n", config.environment);

    let store = config.build_store();
    let ctx = config.build_context(store.clone());
    let registry = ToolRegistry::new();
    register_catalog(&registry, &ctx);
    info!(tools = registry.count(), "Catalog registered");

    println!("=== Files ===");
    call(
        &registry,
        files::TEXT_EDITOR,
        json!({"command": "create", "path": "/notes/greeting.txt", "file_text": "こんにちは世界"}),
    )
    .await?;
    call(&registry, files::COUNT_CHARS, json!({"filePath": "/notes/greeting.txt"})).await?;
    call(
        &registry,
        files::DOWNLOAD_DIAGRAM,
        json!({"type": "mermaid", "content": "graph TD;A-->B;", "outputPath": "/diagrams/flow.svg"}),
    )
    .await?;
    call(&registry, files::TEXT_EDITOR, json!({"command": "view", "path": "/diagrams/flow.svg"})).await?;
    call(
        &registry,
        files::TEXT_EDITOR,
        json!({"command": "create", "path": "/notes/scratch.txt", "content": "temporary"}),
    )
    .await?;
    call(&registry, files::TEXT_EDITOR, json!({"command": "delete", "path": "/notes/scratch.txt"})).await?;
    let notes = store.list_files("/notes/").context("listing notes")?;
    println!("Files under /notes/: {notes:?}\n");

    println!("=== Game shop ===");
    call(&registry, gaming::BUY_ITEM, json!({"item": "Iron Shield", "quantity": 2})).await?;
    call(&registry, gaming::GET_INVENTORY, json!({})).await?;

    println!("=== Social ===");
    call(
        &registry,
        social::POST_CONTENT,
        json!({"title": "Session notes", "body": "Bought two shields today", "tags": ["log"]}),
    )
    .await?;
    call(&registry, social::GET_CONTENTS, json!({"per_page": 2})).await?;

    println!("=== Memory ===");
    call(&registry, memory::MEMORY_ADD, json!({"text": "Shields cost 150 gold each"})).await?;
    call(&registry, memory::MEMORY_SEARCH, json!({"query": "shields"})).await?;

    println!("=== Rejected call ===");
    match registry
        .execute(gaming::GET_PLAYER_HEROES, json!({"account_id": 1, "limit": 0}).to_string())
        .await
    {
        Ok(output) => println!("Unexpected success: {output}\n"),
        Err(e) => println!("Error: {e}\n"),
    }

    let snapshot = store.snapshot().context("reading final state")?;
    println!("=== Final state ===\n{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
