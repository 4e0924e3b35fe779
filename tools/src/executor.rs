//! Glue between typed tool functions and registry executors
//!
//! Every catalog tool is a plain synchronous function. [`executor`] wraps one in
//! the boxed-future form the registry stores: it parses the JSON input, runs the
//! handler against the shared context and serializes the typed response.

use serde::Serialize;
use std::sync::Arc;
use tool_fixtures_core::{Args, ToolContext, ToolError, ToolExecutorFn, ToolFuture};
use tracing::debug;

/// Handler signature shared by every catalog tool
pub type Handler<T> = fn(&ToolContext, &Args) -> Result<T, ToolError>;

/// Build an executor for `handler`
///
/// The context is cloned into the executor, so every call made through the
/// registry shares its state backend and random source.
#[must_use]
pub fn executor<T>(name: &'static str, ctx: &ToolContext, handler: Handler<T>) -> ToolExecutorFn
where
    T: Serialize + 'static,
{
    let ctx = ctx.clone();
    Arc::new(move |input: String| {
        let ctx = ctx.clone();
        Box::pin(async move {
            debug!(tool = name, "Executing tool");
            let args = Args::parse(&input)?;
            let response = handler(&ctx, &args).inspect_err(|e| {
                debug!(tool = name, kind = %e.kind, error = %e.message, "Tool rejected call");
            })?;
            Ok(serde_json::to_string(&response)?)
        }) as ToolFuture
    })
}
