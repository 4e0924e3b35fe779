//! Memory tools backed by the memory log
//!
//! Without a state backend `memory_search` answers from canned memories keyed on
//! the query topic.

use super::random_hex;
use crate::executor::executor;
use crate::stateful::call_external_api;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tool_fixtures_core::intent::STORED_AT_KEY;
use tool_fixtures_core::{
    Args, FlatRecord, Intent, IntentPlan, Intents, MemoryEntry, Tool, ToolContext, ToolError,
    ToolExecutorFn,
};

/// Name of the add tool
pub const MEMORY_ADD: &str = "memory_add";

/// Name of the search tool
pub const MEMORY_SEARCH: &str = "memory_search";

/// Stored note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryAddResponse {
    /// Whether the note was stored
    pub success: bool,
    /// Memory ID
    pub memory_id: String,
    /// Stored text
    pub text: String,
    /// Storage time (RFC 3339)
    pub stored_at: String,
}

fn remember(args: &Args) -> Intents {
    args.text("text")
        .map(|text| Intent::Remember {
            text: text.to_string(),
            stored_at: args.text(STORED_AT_KEY).map(ToString::to_string),
        })
        .into_iter()
        .collect()
}

/// Store a note in the memory log
///
/// # Errors
///
/// Returns `InvalidInput` if `text` is blank
pub fn memory_add(ctx: &ToolContext, text: &str) -> Result<MemoryAddResponse, ToolError> {
    if text.trim().is_empty() {
        return Err(ToolError::invalid_input("Memory text cannot be empty"));
    }

    let stored_at = ctx.now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let args = Args::new()
        .with("text", text)
        .with(STORED_AT_KEY, stored_at.as_str());
    let response = call_external_api(ctx, MEMORY_ADD, &args, IntentPlan::Explicit(remember), |ctx| {
        FlatRecord::new()
            .with("success", true)
            .with("memory_id", format!("mem_{}", random_hex(ctx, 8)))
            .with("text", text)
            .with("stored_at", stored_at.as_str())
    });

    let root = response.record.root();
    Ok(MemoryAddResponse {
        success: root.boolean("success")?,
        memory_id: root.string("memory_id")?,
        text: root.string("text")?,
        stored_at: root.string("stored_at")?,
    })
}

fn run_memory_add(ctx: &ToolContext, args: &Args) -> Result<MemoryAddResponse, ToolError> {
    memory_add(ctx, args.require_str("text")?)
}

/// Create the `memory_add` tool
#[must_use]
pub fn memory_add_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: MEMORY_ADD.to_string(),
        description: "Remember a piece of information for later".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Information to remember"
                }
            },
            "required": ["text"]
        }),
    };

    (tool, executor(MEMORY_ADD, ctx, run_memory_add))
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryHit {
    /// Match score between 0 and 1
    pub relevance: f64,
    /// Remembered text
    pub text: String,
    /// When the memory was recorded, if known
    pub timestamp: Option<String>,
}

/// Search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySearchResponse {
    /// Query as given
    pub query: String,
    /// Hits, best first
    pub results: Vec<MemoryHit>,
}

fn recall(args: &Args) -> Intents {
    args.text("query")
        .map(|query| Intent::Recall { query: query.to_string() })
        .into_iter()
        .collect()
}

fn canned_memories(query: &str) -> FlatRecord {
    let topic = query.to_lowercase();
    let record = FlatRecord::new().with("query", query);
    if topic.contains("weather") {
        record
            .with("result_0_relevance", 0.95)
            .with("result_0_text", "User asked about weather in San Francisco earlier.")
            .with("result_0_timestamp", "2025-01-15T10:00:00Z")
            .with("result_1_relevance", 0.82)
            .with("result_1_text", "Discussion about weather patterns and climate change.")
            .with("result_1_timestamp", "2025-01-14T15:30:00Z")
    } else if topic.contains("code") {
        record
            .with("result_0_relevance", 0.88)
            .with("result_0_text", "User requested help with Rust async code.")
            .with("result_0_timestamp", "2025-01-15T09:15:00Z")
            .with("result_1_relevance", 0.75)
            .with("result_1_text", "Discussion about code architecture patterns.")
            .with("result_1_timestamp", "2025-01-13T14:20:00Z")
    } else {
        record
            .with("result_0_relevance", 0.50)
            .with("result_0_text", format!("No specific memories found for query: {query}"))
            .with("result_0_timestamp", "2025-01-15T12:00:00Z")
    }
}

/// Share of the note covered by the query
#[allow(clippy::cast_precision_loss)]
fn relevance(query: &str, text: &str) -> f64 {
    let covered = query.chars().count() as f64 / text.chars().count().max(1) as f64;
    (covered.min(1.0) * 100.0).round() / 100.0
}

fn session_hits(query: &str, memories: &[MemoryEntry]) -> Vec<MemoryHit> {
    let mut hits: Vec<MemoryHit> = memories
        .iter()
        .map(|memory| MemoryHit {
            relevance: relevance(query, &memory.text),
            text: memory.text.clone(),
            timestamp: memory.stored_at.clone(),
        })
        .collect();
    // Stable, so equally relevant notes keep their storage order
    hits.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    hits
}

/// Search the memory log (case-insensitive substring match)
///
/// Session memories replace the canned results whenever a state backend is
/// attached, so an empty result list means nothing matched. Session hits are
/// scored by how much of the note the query covers.
///
/// # Errors
///
/// Returns `InvalidInput` if `query` is blank
pub fn memory_search(ctx: &ToolContext, query: &str) -> Result<MemorySearchResponse, ToolError> {
    if query.trim().is_empty() {
        return Err(ToolError::invalid_input("Query cannot be empty"));
    }

    let args = Args::new().with("query", query);
    let response = call_external_api(ctx, MEMORY_SEARCH, &args, IntentPlan::Explicit(recall), |_| {
        canned_memories(query)
    });

    let root = response.record.root();
    let results: Vec<MemoryHit> = match response.memories {
        Some(ref memories) => session_hits(query, memories),
        None => root
            .indices("result")
            .into_iter()
            .map(|index| -> Result<MemoryHit, ToolError> {
                let hit = root.item("result", index);
                Ok(MemoryHit {
                    relevance: hit.float("relevance")?,
                    text: hit.string("text")?,
                    timestamp: hit.opt_string("timestamp")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(MemorySearchResponse {
        query: root.string("query")?,
        results,
    })
}

fn run_memory_search(ctx: &ToolContext, args: &Args) -> Result<MemorySearchResponse, ToolError> {
    memory_search(ctx, args.require_str("query")?)
}

/// Create the `memory_search` tool
///
/// Returns JSON:
/// ```json
/// {
///   "query": "user search query",
///   "results": [
///     {"relevance": 0.95, "text": "matching memory...", "timestamp": "2025-01-15T10:00:00Z"}
///   ]
/// }
/// ```
#[must_use]
pub fn memory_search_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: MEMORY_SEARCH.to_string(),
        description: "Search remembered information".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                }
            },
            "required": ["query"]
        }),
    };

    (tool, executor(MEMORY_SEARCH, ctx, run_memory_search))
}
