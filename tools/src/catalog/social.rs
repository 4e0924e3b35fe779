//! `TabNews` tools backed by the content feed

use super::random_hex;
use crate::executor::executor;
use crate::stateful::call_external_api;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tool_fixtures_core::{
    Args, FlatRecord, Intent, IntentPlan, Intents, Tool, ToolContext, ToolError, ToolExecutorFn,
};

/// Name of the post tool
pub const POST_CONTENT: &str = "tabnews_integration_post_content";

/// Name of the listing tool
pub const GET_CONTENTS: &str = "tabnews_integration_get_contents";

/// Sort strategies accepted by the listing
pub const STRATEGIES: [&str; 3] = ["relevant", "new", "old"];

const MAX_TITLE_CHARS: usize = 255;
const SESSION_TITLE_CHARS: usize = 60;
const MAX_PER_PAGE: i64 = 100;

/// Lowercase, dash-separated slug of a title
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// tabnews_integration_post_content
// ---------------------------------------------------------------------------

/// Published post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContentResponse {
    /// Content ID
    pub id: String,
    /// URL slug
    pub slug: String,
    /// Post title
    pub title: String,
    /// Post body
    pub body: String,
    /// Author username
    pub author: String,
    /// Publication status
    pub status: String,
    /// Publication time (RFC 3339)
    pub published_at: String,
    /// Tags
    pub tags: Vec<String>,
}

fn post_body(args: &Args) -> Intents {
    args.text("body")
        .map(|body| Intent::Post { content: body.to_string() })
        .into_iter()
        .collect()
}

/// Publish a post; its body is appended to the feed
///
/// # Errors
///
/// Returns `InvalidInput` if the title or body is blank, or the title is too long
pub fn post_content(
    ctx: &ToolContext,
    title: &str,
    body: &str,
    tags: &[String],
) -> Result<PostContentResponse, ToolError> {
    if title.trim().is_empty() {
        return Err(ToolError::invalid_input("Title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ToolError::invalid_input(format!(
            "Title must not exceed {MAX_TITLE_CHARS} characters"
        )));
    }
    if body.trim().is_empty() {
        return Err(ToolError::invalid_input("Body cannot be empty"));
    }

    let args = Args::new().with("title", title).with("body", body);
    let response = call_external_api(ctx, POST_CONTENT, &args, IntentPlan::Explicit(post_body), |ctx| {
        let mut record = FlatRecord::new()
            .with("id", random_hex(ctx, 12))
            .with("slug", slugify(title))
            .with("title", title)
            .with("body", body)
            .with("author", "fixture_user")
            .with("status", "published")
            .with("published_at", ctx.now().to_rfc3339_opts(SecondsFormat::Secs, true));
        for (index, tag) in tags.iter().enumerate() {
            record.insert(format!("tags_{index}"), tag.as_str());
        }
        record
    });

    let root = response.record.root();
    Ok(PostContentResponse {
        id: root.string("id")?,
        slug: root.string("slug")?,
        title: root.string("title")?,
        body: root.string("body")?,
        author: root.string("author")?,
        status: root.string("status")?,
        published_at: root.string("published_at")?,
        tags: root.strings("tags")?,
    })
}

fn run_post_content(ctx: &ToolContext, args: &Args) -> Result<PostContentResponse, ToolError> {
    let tags = match args.get("tags") {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(_) => args.require_str_list("tags")?,
    };
    post_content(ctx, args.require_str("title")?, args.require_str("body")?, &tags)
}

/// Create the `tabnews_integration_post_content` tool
#[must_use]
pub fn post_content_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: POST_CONTENT.to_string(),
        description: "Publish a new post on TabNews".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Post title"
                },
                "body": {
                    "type": "string",
                    "description": "Post body (markdown)"
                },
                "tags": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Optional tags"
                }
            },
            "required": ["title", "body"]
        }),
    };

    (tool, executor(POST_CONTENT, ctx, run_post_content))
}

// ---------------------------------------------------------------------------
// tabnews_integration_get_contents
// ---------------------------------------------------------------------------

/// One content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Content ID
    pub id: String,
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Author username
    pub author: String,
    /// Publication time
    pub published_at: String,
    /// Upvote count
    pub upvotes: i64,
    /// Tags
    pub tags: Vec<String>,
    /// Topic
    pub topic: String,
}

/// Listing metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentsMetadata {
    /// Cache status of the response
    pub cache_status: String,
    /// Remaining rate limit
    pub rate_limit_remaining: i64,
    /// Server processing time
    pub processing_time_ms: i64,
}

/// Page of content items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetContentsResponse {
    /// Content items
    pub contents: Vec<ContentItem>,
    /// Total matching items
    pub total_count: i64,
    /// Page returned
    pub page: i64,
    /// Items per page
    pub per_page: i64,
    /// Whether more pages exist
    pub has_more: bool,
    /// Sort strategy used
    pub strategy: String,
    /// Response metadata
    pub metadata: ContentsMetadata,
}

fn list_feed(_args: &Args) -> Intents {
    std::iter::once(Intent::ListFeed).collect()
}

fn contents_record(page: i64, per_page: i64, strategy: &str) -> FlatRecord {
    FlatRecord::new()
        .with("content_0_id", "c1a2b3d4e5f6")
        .with("content_0_title", "Introduction to Machine Learning")
        .with("content_0_body", "Machine learning is a subset of artificial intelligence...")
        .with("content_0_author", "ml_expert")
        .with("content_0_published_at", "2023-10-05T08:30:00Z")
        .with("content_0_upvotes", 125)
        .with("content_0_tags_0", "machine-learning")
        .with("content_0_tags_1", "ai")
        .with("content_0_topic", "technology")
        .with("content_1_id", "f6e5d4c3b2a1")
        .with("content_1_title", "Building REST APIs with FastAPI")
        .with("content_1_body", "FastAPI is a modern, fast web framework for building APIs...")
        .with("content_1_author", "api_developer")
        .with("content_1_published_at", "2023-10-04T14:20:00Z")
        .with("content_1_upvotes", 89)
        .with("content_1_tags_0", "fastapi")
        .with("content_1_tags_1", "python")
        .with("content_1_topic", "programming")
        .with("total_count", 1573)
        .with("page", page)
        .with("per_page", per_page)
        .with("has_more", true)
        .with("strategy", strategy)
        .with("metadata_cache_status", "HIT")
        .with("metadata_rate_limit_remaining", 98)
        .with("metadata_processing_time_ms", 45)
}

/// Listing entry for a post published in this session
fn session_item(ctx: &ToolContext, position: usize, body: &str) -> ContentItem {
    let first_line = body.lines().next().unwrap_or_default().trim();
    ContentItem {
        id: format!("session-{position}"),
        title: first_line.chars().take(SESSION_TITLE_CHARS).collect(),
        body: body.to_string(),
        author: "fixture_user".to_string(),
        published_at: ctx.now().to_rfc3339_opts(SecondsFormat::Secs, true),
        upvotes: 0,
        tags: Vec::new(),
        topic: "session".to_string(),
    }
}

/// List content items
///
/// Posts published in this session lead the listing, newest first, ahead of
/// the catalog items.
///
/// # Errors
///
/// Returns `InvalidInput` if `page` is below 1, `per_page` is outside 1..=100,
/// or `strategy` is not one of [`STRATEGIES`]
pub fn get_contents(
    ctx: &ToolContext,
    page: Option<i64>,
    per_page: Option<i64>,
    strategy: Option<&str>,
) -> Result<GetContentsResponse, ToolError> {
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(ToolError::invalid_input("Page must be a positive integer"));
    }
    let per_page = per_page.unwrap_or(20);
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return Err(ToolError::invalid_input(format!(
            "Per page must be a positive integer and not exceed {MAX_PER_PAGE}"
        )));
    }
    let strategy = strategy.unwrap_or("relevant");
    if !STRATEGIES.contains(&strategy) {
        return Err(ToolError::invalid_input(format!(
            "Strategy must be one of {STRATEGIES:?}"
        )));
    }

    let response = call_external_api(ctx, GET_CONTENTS, &Args::new(), IntentPlan::Explicit(list_feed), |_| {
        contents_record(page, per_page, strategy)
    });

    let root = response.record.root();
    let feed = response.feed.unwrap_or_default();
    let mut contents: Vec<ContentItem> = feed
        .iter()
        .enumerate()
        .rev()
        .map(|(index, body)| session_item(ctx, index + 1, body))
        .collect();
    let catalog = root
        .indices("content")
        .into_iter()
        .map(|index| -> Result<ContentItem, ToolError> {
            let item = root.item("content", index);
            Ok(ContentItem {
                id: item.string("id")?,
                title: item.string("title")?,
                body: item.string("body")?,
                author: item.string("author")?,
                published_at: item.string("published_at")?,
                upvotes: item.int("upvotes")?,
                tags: item.strings("tags")?,
                topic: item.string("topic")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    contents.extend(catalog);

    let metadata = root.scope("metadata");
    Ok(GetContentsResponse {
        contents,
        total_count: root.int("total_count")? + i64::try_from(feed.len()).unwrap_or(0),
        page: root.int("page")?,
        per_page: root.int("per_page")?,
        has_more: root.boolean("has_more")?,
        strategy: root.string("strategy")?,
        metadata: ContentsMetadata {
            cache_status: metadata.string("cache_status")?,
            rate_limit_remaining: metadata.int("rate_limit_remaining")?,
            processing_time_ms: metadata.int("processing_time_ms")?,
        },
    })
}

fn run_get_contents(ctx: &ToolContext, args: &Args) -> Result<GetContentsResponse, ToolError> {
    get_contents(
        ctx,
        args.opt_i64("page")?,
        args.opt_i64("per_page")?,
        args.opt_str("strategy")?,
    )
}

/// Create the `tabnews_integration_get_contents` tool
#[must_use]
pub fn get_contents_tool(ctx: &ToolContext) -> (Tool, ToolExecutorFn) {
    let tool = Tool {
        name: GET_CONTENTS.to_string(),
        description: "Retrieve content items from TabNews".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "page": {
                    "type": "integer",
                    "description": "Page number (default 1)"
                },
                "per_page": {
                    "type": "integer",
                    "description": "Items per page (default 20, max 100)"
                },
                "strategy": {
                    "type": "string",
                    "enum": STRATEGIES,
                    "description": "Sort strategy (default relevant)"
                }
            }
        }),
    };

    (tool, executor(GET_CONTENTS, ctx, run_get_contents))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use tool_fixtures_core::{StateManager, ToolErrorKind};
    use tool_fixtures_testing::{assert_keys, parse_output, stateless_context, test_context};

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust 2024 --- edition "), "rust-2024-edition");
    }

    #[test]
    fn test_post_then_list_feed() {
        let (ctx, store) = test_context();
        let tags = vec!["rust".to_string()];
        let post = post_content(&ctx, "Fixtures", "State survives calls", &tags).expect("post");
        assert_eq!(post.slug, "fixtures");
        assert_eq!(post.tags, tags);
        assert_eq!(post.published_at, "2025-01-01T00:00:00Z");
        assert_eq!(store.get_feed().expect("feed"), vec!["State survives calls"]);

        let listing = get_contents(&ctx, None, None, None).expect("list");
        assert_eq!(listing.contents.len(), 3);
        assert_eq!(listing.contents[0].body, "State survives calls");
        assert_eq!(listing.contents[0].author, "fixture_user");
        assert_eq!(listing.contents[1].id, "c1a2b3d4e5f6");
        assert_eq!(listing.total_count, 1574);
    }

    #[tokio::test]
    async fn test_session_posts_stay_inside_the_listing_shape() {
        let (ctx, _store) = test_context();
        post_content(&ctx, "One", "First body", &[]).expect("post");
        post_content(&ctx, "Two", "Second body\nwith more lines", &[]).expect("post");

        let (_, list) = get_contents_tool(&ctx);
        let output = parse_output(list("{}".to_string()).await);
        assert_keys(
            &output,
            &["contents", "total_count", "page", "per_page", "has_more", "strategy", "metadata"],
        );
        assert_keys(
            &output["contents"][0],
            &["id", "title", "body", "author", "published_at", "upvotes", "tags", "topic"],
        );
        assert_eq!(output["contents"][0]["title"], "Second body");
        assert_eq!(output["contents"][1]["body"], "First body");
        assert_eq!(output["contents"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn test_post_validation() {
        let ctx = stateless_context();
        let err = post_content(&ctx, "", "body", &[]).expect_err("blank title");
        assert_eq!(err.kind, ToolErrorKind::InvalidInput);
        assert!(post_content(&ctx, "title", "  ", &[]).is_err());
        assert!(post_content(&ctx, &"x".repeat(256), "body", &[]).is_err());
    }

    #[test]
    fn test_get_contents_defaults_and_validation() {
        let ctx = stateless_context();
        let listing = get_contents(&ctx, None, None, None).expect("list");
        assert_eq!((listing.page, listing.per_page), (1, 20));
        assert_eq!(listing.strategy, "relevant");
        assert_eq!(listing.contents.len(), 2);
        assert_eq!(listing.contents[1].tags, vec!["fastapi", "python"]);

        assert!(get_contents(&ctx, Some(0), None, None).is_err());
        assert!(get_contents(&ctx, None, Some(101), None).is_err());
        assert!(get_contents(&ctx, None, None, Some("hot")).is_err());
        assert_eq!(get_contents(&ctx, Some(3), Some(5), Some("new")).expect("list").page, 3);
    }

    #[test]
    fn test_get_contents_is_idempotent() {
        let ctx = stateless_context();
        assert_eq!(
            get_contents(&ctx, None, None, None).expect("first"),
            get_contents(&ctx, None, None, None).expect("second")
        );
    }

    #[tokio::test]
    async fn test_executor_schemas() {
        let ctx = stateless_context();
        let (_, list) = get_contents_tool(&ctx);
        let output = parse_output(list("{}".to_string()).await);
        assert_keys(
            &output,
            &["contents", "total_count", "page", "per_page", "has_more", "strategy", "metadata"],
        );
        assert_keys(
            &output["contents"][0],
            &["id", "title", "body", "author", "published_at", "upvotes", "tags", "topic"],
        );

        let (_, post) = post_content_tool(&ctx);
        let output = parse_output(post(json!({"title": "t", "body": "b", "tags": ["x"]}).to_string()).await);
        assert_keys(
            &output,
            &["id", "slug", "title", "body", "author", "status", "published_at", "tags"],
        );
    }
}
