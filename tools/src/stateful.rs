//! Stateful wrapper around mock responders
//!
//! [`call_external_api`] runs a tool's mock responder and then applies the
//! state effects selected for the call. Effects are advisory: a missing or failing
//! state backend is logged and the plain mock response is returned.

use tool_fixtures_core::{Args, FlatRecord, IntentPlan, MemoryEntry, Outcome, Scalar, ToolContext};
use tracing::{debug, warn};

/// Key that read effects inject into the flat record
pub const CONTENT_KEY: &str = "content";

/// Mock record plus whatever the state effects injected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    /// Flat record, possibly with an overridden `content` field
    pub record: FlatRecord,
    /// Feed entries, when the call read the feed
    pub feed: Option<Vec<String>>,
    /// Inventory items, when the call read the inventory
    pub inventory: Option<Vec<String>>,
    /// Memory entries, when the call searched memories
    pub memories: Option<Vec<MemoryEntry>>,
}

impl ApiResponse {
    /// Wrap a plain mock record
    #[must_use]
    pub fn new(record: FlatRecord) -> Self {
        Self {
            record,
            ..Self::default()
        }
    }

    /// Overlay an effect outcome
    ///
    /// File reads override `content`. Inventory reads also store the rendered
    /// inventory under `content`.
    pub fn merge(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Content(content) => {
                self.record.insert(CONTENT_KEY, content);
            }
            Outcome::Feed(posts) => self.feed = Some(posts),
            Outcome::Inventory(items) => {
                self.record.insert(CONTENT_KEY, render_items(&items));
                self.inventory = Some(items);
            }
            Outcome::Memories(memories) => self.memories = Some(memories),
        }
    }

    /// `content` field as text, if it is a string
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self.record.get(CONTENT_KEY) {
            Some(Scalar::Str(content)) => Some(content),
            _ => None,
        }
    }
}

/// String form of an item list
#[must_use]
pub fn render_items(items: &[String]) -> String {
    items.join(", ")
}

/// Run `responder`, then apply the call's state effects
///
/// Effects run in the order the plan returns them. The first failing effect
/// stops the remaining ones; whatever was merged before it is kept.
pub fn call_external_api<F>(
    ctx: &ToolContext,
    tool_name: &str,
    args: &Args,
    plan: IntentPlan,
    responder: F,
) -> ApiResponse
where
    F: FnOnce(&ToolContext) -> FlatRecord,
{
    let mut response = ApiResponse::new(responder(ctx));
    apply_effects(ctx, tool_name, args, plan, &mut response);
    response
}

fn apply_effects(
    ctx: &ToolContext,
    tool_name: &str,
    args: &Args,
    plan: IntentPlan,
    response: &mut ApiResponse,
) {
    if !ctx.effects_enabled() {
        return;
    }

    let intents = plan.resolve(tool_name, args);
    if intents.is_empty() {
        return;
    }

    let Some(state) = ctx.state() else {
        debug!(tool = tool_name, "No state backend attached, skipping state effects");
        return;
    };

    for intent in &intents {
        match intent.apply(state) {
            Ok(Some(outcome)) => {
                debug!(tool = tool_name, intent = intent.label(), "State effect injected data");
                response.merge(outcome);
            }
            Ok(None) => {
                debug!(tool = tool_name, intent = intent.label(), "State effect applied");
            }
            Err(e) => {
                warn!(
                    tool = tool_name,
                    intent = intent.label(),
                    error = %e,
                    "State effect failed, returning mock response"
                );
                break;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use tool_fixtures_core::{Domain, Intent, Intents, StateManager};
    use tool_fixtures_testing::{failing_context, stateless_context, test_context};

    fn mock() -> FlatRecord {
        FlatRecord::new()
            .with("status", "ok")
            .with("content", "mock content")
    }

    fn read_path(args: &Args) -> Intents {
        args.text("path")
            .map(|path| Intent::Read { path: path.to_string() })
            .into_iter()
            .collect()
    }

    #[test]
    fn test_read_overrides_mock_content() {
        let (ctx, store) = test_context();
        store.write_file("a.txt", "real").expect("write");

        let args = Args::new().with("path", "a.txt");
        let response = call_external_api(&ctx, "reader", &args, IntentPlan::Explicit(read_path), |_| mock());
        assert_eq!(response.content(), Some("real"));
        assert_eq!(response.record.get("status"), Some(&Scalar::from("ok")));
    }

    #[test]
    fn test_missing_file_keeps_mock_content() {
        let (ctx, _store) = test_context();
        let args = Args::new().with("path", "absent.txt");
        let response = call_external_api(&ctx, "reader", &args, IntentPlan::Explicit(read_path), |_| mock());
        assert_eq!(response.content(), Some("mock content"));
    }

    #[test]
    fn test_no_state_backend_returns_mock() {
        let ctx = stateless_context();
        let args = Args::new().with("path", "a.txt");
        let response = call_external_api(&ctx, "reader", &args, IntentPlan::Explicit(read_path), |_| mock());
        assert_eq!(response, ApiResponse::new(mock()));
    }

    #[test]
    fn test_failing_backend_returns_mock() {
        let ctx = failing_context();
        let args = Args::new()
            .with("command", "create")
            .with("path", "a.txt")
            .with("content", "x");
        let response = call_external_api(&ctx, "editor", &args, IntentPlan::Heuristic(Domain::Files), |_| mock());
        assert_eq!(response, ApiResponse::new(mock()));
    }

    #[test]
    fn test_disabled_effects_do_not_touch_store() {
        let (ctx, store) = test_context();
        let ctx = ctx.with_effects(false);
        let args = Args::new().with("item", "sword");
        let _ = call_external_api(&ctx, "shop_buy", &args, IntentPlan::Heuristic(Domain::Gaming), |_| mock());
        assert!(store.get_inventory().expect("inventory").is_empty());
    }

    #[test]
    fn test_inventory_overlay_sets_content() {
        let (ctx, store) = test_context();
        store.add_item("sword").expect("add");
        store.add_item("shield").expect("add");

        let response = call_external_api(
            &ctx,
            "get_inventory",
            &Args::new(),
            IntentPlan::Heuristic(Domain::Gaming),
            |_| mock(),
        );
        assert_eq!(response.inventory, Some(vec!["sword".to_string(), "shield".to_string()]));
        assert_eq!(response.content(), Some("sword, shield"));
    }

    #[test]
    fn test_responder_sees_context() {
        let (ctx, _store) = test_context();
        let response = call_external_api(&ctx, "clock", &Args::new(), IntentPlan::None, |ctx| {
            FlatRecord::new().with("now", ctx.now().timestamp())
        });
        assert_eq!(response.record.get("now"), Some(&Scalar::Int(1_735_689_600)));
    }
}
