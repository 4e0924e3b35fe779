//! State effects a tool call may have
//!
//! Each stateful tool declares which [`Intent`]s a call carries. The stateful
//! wrapper applies them against the state backend after the mock responder ran.
//!
//! [`Intent::infer`] keeps the loose keyword classification used by generated
//! tools that never declared their effects: it looks for substrings such as
//! `write` or `view` in the `command` argument (or the tool name). It is only
//! used by tools registered with [`IntentPlan::Heuristic`].

use crate::args::Args;
use crate::state::{MemoryEntry, StateError, StateManager};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Argument keys that may carry file content, in priority order
pub const CONTENT_KEYS: [&str; 3] = ["content", "file_text", "text"];

/// Argument keys that may carry a post body, in priority order
pub const POST_KEYS: [&str; 3] = ["content", "text", "message"];

/// Argument key carrying the storage time of a note
pub const STORED_AT_KEY: &str = "stored_at";

const WRITE_WORDS: [&str; 4] = ["write", "create", "save", "update"];
const DELETE_WORDS: [&str; 2] = ["delete", "remove"];
const READ_WORDS: [&str; 5] = ["read", "view", "cat", "search", "list"];
const POST_WORDS: [&str; 2] = ["post", "send"];
const FEED_WORDS: [&str; 3] = ["get", "feed", "timeline"];
const ADD_ITEM_WORDS: [&str; 2] = ["add", "buy"];
const REMEMBER_WORDS: [&str; 3] = ["add", "remember", "save"];
const RECALL_WORDS: [&str; 2] = ["search", "recall"];

/// Intents selected for one call (rarely more than two)
pub type Intents = SmallVec<[Intent; 2]>;

/// State domain a tool family belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// File management, operating system and developer tools
    Files,
    /// Social media and communication tools
    Social,
    /// Game data tools
    Gaming,
    /// Memory management tools
    Memory,
}

/// One side effect against the state backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Inject stored file content
    Read {
        /// Virtual file path
        path: String,
    },
    /// Store file content
    Write {
        /// Virtual file path
        path: String,
        /// Content to store
        content: String,
    },
    /// Remove a stored file
    Delete {
        /// Virtual file path
        path: String,
    },
    /// Append to the content feed
    Post {
        /// Post body
        content: String,
    },
    /// Inject the content feed
    ListFeed,
    /// Inject the inventory
    Inventory,
    /// Append to the inventory
    AddItem {
        /// Item name
        item: String,
    },
    /// Append to the memory log
    Remember {
        /// Note text
        text: String,
        /// Storage time (RFC 3339)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stored_at: Option<String>,
    },
    /// Inject matching memory entries
    Recall {
        /// Search text
        query: String,
    },
}

/// Data an applied intent hands back to the wrapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Stored file content
    Content(String),
    /// Current feed, oldest first
    Feed(Vec<String>),
    /// Current inventory
    Inventory(Vec<String>),
    /// Matching memory entries
    Memories(Vec<MemoryEntry>),
}

/// How a tool definition selects the intents of a call
#[derive(Clone, Copy)]
pub enum IntentPlan {
    /// Tool has no state effects
    None,
    /// Tool computes its intents from the call arguments
    Explicit(fn(&Args) -> Intents),
    /// Keyword classification over `command` / tool name
    Heuristic(Domain),
}

impl std::fmt::Debug for IntentPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "IntentPlan::None"),
            Self::Explicit(_) => write!(f, "IntentPlan::Explicit(..)"),
            Self::Heuristic(domain) => write!(f, "IntentPlan::Heuristic({domain:?})"),
        }
    }
}

impl IntentPlan {
    /// Intents for one call
    #[must_use]
    pub fn resolve(&self, tool_name: &str, args: &Args) -> Intents {
        match self {
            Self::None => Intents::new(),
            Self::Explicit(select) => select(args),
            Self::Heuristic(domain) => Intent::infer(*domain, tool_name, args),
        }
    }
}

fn mentions(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|word| haystack.contains(word))
}

impl Intent {
    /// Short label for logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::Write { .. } => "write",
            Self::Delete { .. } => "delete",
            Self::Post { .. } => "post",
            Self::ListFeed => "list_feed",
            Self::Inventory => "inventory",
            Self::AddItem { .. } => "add_item",
            Self::Remember { .. } => "remember",
            Self::Recall { .. } => "recall",
        }
    }

    /// Whether applying the intent mutates the backend
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Write { .. }
                | Self::Delete { .. }
                | Self::Post { .. }
                | Self::AddItem { .. }
                | Self::Remember { .. }
        )
    }

    /// Classify a call by keywords
    ///
    /// File tools look at `command`, falling back to the tool name; the other
    /// domains look at the tool name only. Mutations are returned before reads so
    /// a call that both writes and reads observes its own write. Arguments that a
    /// branch needs (`path`, `item`, ...) must be non-empty strings, otherwise the
    /// branch selects nothing.
    #[must_use]
    pub fn infer(domain: Domain, tool_name: &str, args: &Args) -> Intents {
        let mut intents = Intents::new();
        match domain {
            Domain::Files => {
                let command = args.text("command").unwrap_or(tool_name);
                let path = args.text("path");
                if mentions(command, &WRITE_WORDS) {
                    if let (Some(path), Some(content)) = (path, args.first_text(&CONTENT_KEYS)) {
                        intents.push(Self::Write {
                            path: path.to_string(),
                            content: content.to_string(),
                        });
                    }
                }
                if mentions(command, &DELETE_WORDS) {
                    if let Some(path) = path {
                        intents.push(Self::Delete {
                            path: path.to_string(),
                        });
                    }
                }
                if mentions(command, &READ_WORDS) {
                    if let Some(path) = path {
                        intents.push(Self::Read {
                            path: path.to_string(),
                        });
                    }
                }
            }
            Domain::Social => {
                if mentions(tool_name, &POST_WORDS) {
                    if let Some(content) = args.first_text(&POST_KEYS) {
                        intents.push(Self::Post {
                            content: content.to_string(),
                        });
                    }
                }
                if mentions(tool_name, &FEED_WORDS) {
                    intents.push(Self::ListFeed);
                }
            }
            Domain::Gaming => {
                if mentions(tool_name, &ADD_ITEM_WORDS) {
                    if let Some(item) = args.text("item") {
                        intents.push(Self::AddItem {
                            item: item.to_string(),
                        });
                    }
                }
                if tool_name.contains("inventory") {
                    intents.push(Self::Inventory);
                }
            }
            Domain::Memory => {
                if mentions(tool_name, &REMEMBER_WORDS) {
                    if let Some(text) = args.first_text(&["content", "text"]) {
                        intents.push(Self::Remember {
                            text: text.to_string(),
                            stored_at: args.text(STORED_AT_KEY).map(ToString::to_string),
                        });
                    }
                }
                if mentions(tool_name, &RECALL_WORDS) {
                    if let Some(query) = args.text("query") {
                        intents.push(Self::Recall {
                            query: query.to_string(),
                        });
                    }
                }
            }
        }
        intents
    }

    /// Apply the intent
    ///
    /// Reads that find nothing (missing file, empty feed) yield `Ok(None)` so the
    /// mock value stays in place.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the backend fails
    pub fn apply(&self, state: &dyn StateManager) -> Result<Option<Outcome>, StateError> {
        match self {
            Self::Read { path } => Ok(state.read_file(path)?.map(Outcome::Content)),
            Self::Write { path, content } => {
                state.write_file(path, content)?;
                Ok(None)
            }
            Self::Post { content } => {
                state.post_content(content)?;
                Ok(None)
            }
            Self::ListFeed => {
                let feed = state.get_feed()?;
                Ok((!feed.is_empty()).then_some(Outcome::Feed(feed)))
            }
            Self::Inventory => Ok(Some(Outcome::Inventory(state.get_inventory()?))),
            Self::AddItem { item } => {
                state.add_item(item)?;
                Ok(None)
            }
            Self::Delete { path } => {
                state.delete_file(path)?;
                Ok(None)
            }
            Self::Remember { text, stored_at } => {
                state.add_memory(MemoryEntry {
                    text: text.clone(),
                    stored_at: stored_at.clone(),
                })?;
                Ok(None)
            }
            Self::Recall { query } => Ok(Some(Outcome::Memories(state.search_memories(query)?))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::state::StateStore;

    #[test]
    fn test_files_write_from_command() {
        let args = Args::new()
            .with("command", "create")
            .with("path", "/tmp/a.txt")
            .with("file_text", "hello");
        let intents = Intent::infer(Domain::Files, "text_editor", &args);
        assert_eq!(
            intents.as_slice(),
            [Intent::Write {
                path: "/tmp/a.txt".to_string(),
                content: "hello".to_string()
            }]
        );
    }

    #[test]
    fn test_files_command_overrides_tool_name() {
        let args = Args::new().with("command", "view").with("path", "a.txt");
        let intents = Intent::infer(Domain::Files, "file_writer", &args);
        assert_eq!(intents.as_slice(), [Intent::Read { path: "a.txt".to_string() }]);
    }

    #[test]
    fn test_files_list_without_path_selects_nothing() {
        let intents = Intent::infer(Domain::Files, "github_list_repos", &Args::new());
        assert!(intents.is_empty());
    }

    #[test]
    fn test_files_write_requires_content() {
        let args = Args::new().with("command", "save").with("path", "a.txt").with("content", "");
        assert!(Intent::infer(Domain::Files, "editor", &args).is_empty());
    }

    #[test]
    fn test_files_update_and_list_orders_write_first() {
        let args = Args::new().with("path", "a.txt").with("text", "body");
        let intents = Intent::infer(Domain::Files, "update_and_list", &args);
        assert_eq!(intents.len(), 2);
        assert!(intents[0].is_mutation());
        assert_eq!(intents[1].label(), "read");
    }

    #[test]
    fn test_files_delete_from_command() {
        let store = StateStore::new();
        store.write_file("old.txt", "stale").expect("write");

        let args = Args::new().with("command", "delete").with("path", "old.txt");
        let intents = Intent::infer(Domain::Files, "text_editor", &args);
        assert_eq!(intents.as_slice(), [Intent::Delete { path: "old.txt".to_string() }]);
        assert!(intents[0].is_mutation());

        assert_eq!(intents[0].apply(&store).expect("delete"), None);
        assert_eq!(store.read_file("old.txt").expect("read"), None);
    }

    #[test]
    fn test_remember_keeps_storage_time() {
        let store = StateStore::new();
        let args = Args::new()
            .with("text", "likes tea")
            .with(STORED_AT_KEY, "2025-01-01T00:00:00Z");
        for intent in Intent::infer(Domain::Memory, "memory_add", &args) {
            intent.apply(&store).expect("remember");
        }

        let recall = Intent::Recall { query: "TEA".to_string() };
        assert_eq!(
            recall.apply(&store).expect("recall"),
            Some(Outcome::Memories(vec![
                MemoryEntry::new("likes tea").stored_at("2025-01-01T00:00:00Z")
            ]))
        );
    }

    #[test]
    fn test_social_post_and_feed() {
        let args = Args::new().with("message", "gm");
        let post = Intent::infer(Domain::Social, "chat_send_message", &args);
        assert_eq!(post.as_slice(), [Intent::Post { content: "gm".to_string() }]);

        let feed = Intent::infer(Domain::Social, "social_get_timeline", &Args::new());
        assert_eq!(feed.as_slice(), [Intent::ListFeed]);
    }

    #[test]
    fn test_gaming_buy_then_inventory() {
        let args = Args::new().with("item", "sword");
        let intents = Intent::infer(Domain::Gaming, "shop_buy_and_show_inventory", &args);
        assert_eq!(
            intents.as_slice(),
            [Intent::AddItem { item: "sword".to_string() }, Intent::Inventory]
        );
    }

    #[test]
    fn test_memory_remember_and_recall() {
        let args = Args::new().with("text", "likes tea").with("query", "tea");
        let remember = Intent::infer(Domain::Memory, "memory_add", &args);
        assert_eq!(
            remember.as_slice(),
            [Intent::Remember {
                text: "likes tea".to_string(),
                stored_at: None
            }]
        );

        let recall = Intent::infer(Domain::Memory, "memory_search", &args);
        assert_eq!(recall.as_slice(), [Intent::Recall { query: "tea".to_string() }]);
    }

    #[test]
    fn test_apply_round_trip() {
        let store = StateStore::new();
        let write = Intent::Write {
            path: "out.svg".to_string(),
            content: "<svg/>".to_string(),
        };
        assert_eq!(write.apply(&store).expect("write"), None);

        let read = Intent::Read { path: "out.svg".to_string() };
        assert_eq!(
            read.apply(&store).expect("read"),
            Some(Outcome::Content("<svg/>".to_string()))
        );

        let missing = Intent::Read { path: "nope".to_string() };
        assert_eq!(missing.apply(&store).expect("read"), None);
    }

    #[test]
    fn test_empty_feed_yields_nothing() {
        let store = StateStore::new();
        assert_eq!(Intent::ListFeed.apply(&store).expect("feed"), None);
        Intent::Post { content: "hi".to_string() }.apply(&store).expect("post");
        assert_eq!(
            Intent::ListFeed.apply(&store).expect("feed"),
            Some(Outcome::Feed(vec!["hi".to_string()]))
        );
    }

    #[test]
    fn test_plan_resolution() {
        fn select(args: &Args) -> Intents {
            args.text("item")
                .map(|item| Intent::AddItem { item: item.to_string() })
                .into_iter()
                .collect()
        }

        let args = Args::new().with("item", "potion");
        assert!(IntentPlan::None.resolve("anything", &args).is_empty());
        assert_eq!(IntentPlan::Explicit(select).resolve("anything", &args).len(), 1);
        assert_eq!(
            IntentPlan::Heuristic(Domain::Gaming).resolve("get_inventory", &args).as_slice(),
            [Intent::Inventory]
        );
    }
}
