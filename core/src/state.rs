//! Shared state store backing the stateful tools
//!
//! The store simulates the side effects a real service would have: files written
//! by one tool can be read by another, posted content shows up in feeds, bought
//! items land in an inventory, remembered notes can be searched.
//!
//! Tools never reach the store through a global. A [`StateStore`] handle is
//! created by whoever owns the session and handed to tools through the call
//! context (see [`crate::context::ToolContext`]). Cloning the handle shares the
//! same underlying regions; separate handles are fully isolated.
//!
//! Every operation returns a `Result`. The in-memory store only fails when a
//! region lock was poisoned by a panicking writer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Logical region of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Virtual file table
    Files,
    /// Posted content feed
    Feed,
    /// Game inventory
    Inventory,
    /// Memory log
    Memories,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Files => write!(f, "files"),
            Self::Feed => write!(f, "feed"),
            Self::Inventory => write!(f, "inventory"),
            Self::Memories => write!(f, "memories"),
        }
    }
}

/// State store errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    /// A writer panicked while holding the region lock
    #[error("State region '{0}' is poisoned")]
    Poisoned(Region),

    /// Backend refused the operation
    #[error("State backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// One remembered note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Note text
    pub text: String,
    /// When the note was stored (RFC 3339), if the caller recorded it
    pub stored_at: Option<String>,
}

impl MemoryEntry {
    /// Note without a timestamp
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            stored_at: None,
        }
    }

    /// Builder: record the storage time
    #[must_use]
    pub fn stored_at(mut self, stored_at: impl Into<String>) -> Self {
        self.stored_at = Some(stored_at.into());
        self
    }
}

/// Operations a state backend offers to the stateful wrapper
///
/// [`StateStore`] is the in-memory implementation. Harnesses can provide their
/// own backend (for instance one that records calls or always fails).
pub trait StateManager: Send + Sync + fmt::Debug {
    /// Content stored at `path`, if any
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the backend cannot be read
    fn read_file(&self, path: &str) -> Result<Option<String>>;

    /// Store `content` at `path`, replacing previous content
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the backend cannot be written
    fn write_file(&self, path: &str, content: &str) -> Result<()>;

    /// Remove `path`, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the backend cannot be written
    fn delete_file(&self, path: &str) -> Result<bool>;

    /// Stored paths starting with `prefix`, sorted
    ///
    /// No intent lists files; harnesses call this directly to inspect a session.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the backend cannot be read
    fn list_files(&self, prefix: &str) -> Result<Vec<String>>;

    /// Posted content, oldest first
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the backend cannot be read
    fn get_feed(&self) -> Result<Vec<String>>;

    /// Append content to the feed
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the backend cannot be written
    fn post_content(&self, content: &str) -> Result<()>;

    /// Inventory items in acquisition order
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the backend cannot be read
    fn get_inventory(&self) -> Result<Vec<String>>;

    /// Append an item to the inventory
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the backend cannot be written
    fn add_item(&self, item: &str) -> Result<()>;

    /// Append a note to the memory log
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the backend cannot be written
    fn add_memory(&self, entry: MemoryEntry) -> Result<()>;

    /// Notes whose text contains `query` (case-insensitive), oldest first
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the backend cannot be read
    fn search_memories(&self, query: &str) -> Result<Vec<MemoryEntry>>;

    /// Clear every region
    ///
    /// # Errors
    ///
    /// Returns `StateError` if a region cannot be written
    fn reset(&self) -> Result<()>;
}

/// Capacity limits for the append-only regions
///
/// When a region is full the oldest entry is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLimits {
    /// Maximum feed entries
    pub max_feed_items: usize,
    /// Maximum inventory entries
    pub max_inventory_items: usize,
    /// Maximum memory entries
    pub max_memories: usize,
}

impl Default for StateLimits {
    fn default() -> Self {
        Self {
            max_feed_items: 1000,
            max_inventory_items: 1000,
            max_memories: 1000,
        }
    }
}

/// Serializable copy of every region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Virtual files
    pub files: BTreeMap<String, String>,
    /// Feed entries, oldest first
    pub feed: Vec<String>,
    /// Inventory items
    pub inventory: Vec<String>,
    /// Memory entries
    pub memories: Vec<MemoryEntry>,
}

#[derive(Debug, Default)]
struct Regions {
    files: RwLock<BTreeMap<String, String>>,
    feed: RwLock<VecDeque<String>>,
    inventory: RwLock<VecDeque<String>>,
    memories: RwLock<VecDeque<MemoryEntry>>,
}

/// In-memory state store (shared across tool calls through cloned handles)
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    regions: Arc<Regions>,
    limits: StateLimits,
}

fn read_region<T>(lock: &RwLock<T>, region: Region) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| StateError::Poisoned(region))
}

fn write_region<T>(lock: &RwLock<T>, region: Region) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| StateError::Poisoned(region))
}

fn push_bounded<T>(entries: &mut VecDeque<T>, value: T, cap: usize) {
    entries.push_back(value);
    while entries.len() > cap {
        entries.pop_front();
    }
}

impl StateStore {
    /// Create an empty store with default limits
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with explicit limits
    #[must_use]
    pub fn with_limits(limits: StateLimits) -> Self {
        Self {
            regions: Arc::new(Regions::default()),
            limits,
        }
    }

    /// Configured limits
    #[must_use]
    pub const fn limits(&self) -> StateLimits {
        self.limits
    }

    /// Copy every region
    ///
    /// # Errors
    ///
    /// Returns `StateError::Poisoned` if any region is poisoned
    pub fn snapshot(&self) -> Result<StateSnapshot> {
        Ok(StateSnapshot {
            files: read_region(&self.regions.files, Region::Files)?.clone(),
            feed: read_region(&self.regions.feed, Region::Feed)?.iter().cloned().collect(),
            inventory: read_region(&self.regions.inventory, Region::Inventory)?
                .iter()
                .cloned()
                .collect(),
            memories: read_region(&self.regions.memories, Region::Memories)?
                .iter()
                .cloned()
                .collect(),
        })
    }
}

impl StateManager for StateStore {
    fn read_file(&self, path: &str) -> Result<Option<String>> {
        Ok(read_region(&self.regions.files, Region::Files)?.get(path).cloned())
    }

    fn write_file(&self, path: &str, content: &str) -> Result<()> {
        write_region(&self.regions.files, Region::Files)?
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    fn delete_file(&self, path: &str) -> Result<bool> {
        Ok(write_region(&self.regions.files, Region::Files)?
            .remove(path)
            .is_some())
    }

    fn list_files(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(read_region(&self.regions.files, Region::Files)?
            .keys()
            .filter(|path| path.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn get_feed(&self) -> Result<Vec<String>> {
        Ok(read_region(&self.regions.feed, Region::Feed)?.iter().cloned().collect())
    }

    fn post_content(&self, content: &str) -> Result<()> {
        let mut feed = write_region(&self.regions.feed, Region::Feed)?;
        push_bounded(&mut feed, content.to_string(), self.limits.max_feed_items);
        Ok(())
    }

    fn get_inventory(&self) -> Result<Vec<String>> {
        Ok(read_region(&self.regions.inventory, Region::Inventory)?
            .iter()
            .cloned()
            .collect())
    }

    fn add_item(&self, item: &str) -> Result<()> {
        let mut inventory = write_region(&self.regions.inventory, Region::Inventory)?;
        push_bounded(&mut inventory, item.to_string(), self.limits.max_inventory_items);
        Ok(())
    }

    fn add_memory(&self, entry: MemoryEntry) -> Result<()> {
        let mut memories = write_region(&self.regions.memories, Region::Memories)?;
        push_bounded(&mut memories, entry, self.limits.max_memories);
        Ok(())
    }

    fn search_memories(&self, query: &str) -> Result<Vec<MemoryEntry>> {
        let needle = query.to_lowercase();
        Ok(read_region(&self.regions.memories, Region::Memories)?
            .iter()
            .filter(|memory| memory.text.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn reset(&self) -> Result<()> {
        write_region(&self.regions.files, Region::Files)?.clear();
        write_region(&self.regions.feed, Region::Feed)?.clear();
        write_region(&self.regions.inventory, Region::Inventory)?.clear();
        write_region(&self.regions.memories, Region::Memories)?.clear();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_file_round_trip() {
        let store = StateStore::new();
        assert_eq!(store.read_file("notes.txt").expect("read"), None);

        store.write_file("notes.txt", "first").expect("write");
        store.write_file("notes.txt", "second").expect("overwrite");
        assert_eq!(store.read_file("notes.txt").expect("read"), Some("second".to_string()));

        assert!(store.delete_file("notes.txt").expect("delete"));
        assert!(!store.delete_file("notes.txt").expect("delete twice"));
    }

    #[test]
    fn test_list_files_by_prefix() {
        let store = StateStore::new();
        store.write_file("docs/b.md", "b").expect("write");
        store.write_file("docs/a.md", "a").expect("write");
        store.write_file("src/main.rs", "fn main() {}").expect("write");

        assert_eq!(store.list_files("docs/").expect("list"), vec!["docs/a.md", "docs/b.md"]);
        assert_eq!(store.list_files("").expect("list").len(), 3);
    }

    #[test]
    fn test_cloned_handles_share_regions() {
        let store = StateStore::new();
        let other = store.clone();
        other.post_content("hello").expect("post");
        assert_eq!(store.get_feed().expect("feed"), vec!["hello"]);

        let isolated = StateStore::new();
        assert!(isolated.get_feed().expect("feed").is_empty());
    }

    #[test]
    fn test_bounded_regions_drop_oldest() {
        let store = StateStore::with_limits(StateLimits {
            max_feed_items: 2,
            max_inventory_items: 1,
            max_memories: 2,
        });
        for post in ["a", "b", "c"] {
            store.post_content(post).expect("post");
        }
        store.add_item("sword").expect("add");
        store.add_item("shield").expect("add");

        assert_eq!(store.get_feed().expect("feed"), vec!["b", "c"]);
        assert_eq!(store.get_inventory().expect("inventory"), vec!["shield"]);
    }

    #[test]
    fn test_memory_search_is_case_insensitive() {
        let store = StateStore::new();
        store
            .add_memory(MemoryEntry::new("User prefers Rust").stored_at("2025-01-01T00:00:00Z"))
            .expect("add");
        store.add_memory(MemoryEntry::new("Weather in Lisbon was sunny")).expect("add");

        let found = store.search_memories("rust").expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "User prefers Rust");
        assert_eq!(found[0].stored_at.as_deref(), Some("2025-01-01T00:00:00Z"));
        assert!(store.search_memories("python").expect("search").is_empty());
    }

    #[test]
    fn test_reset_and_snapshot() {
        let store = StateStore::new();
        store.write_file("a.txt", "x").expect("write");
        store.post_content("post").expect("post");
        store.add_item("potion").expect("add");
        store.add_memory(MemoryEntry::new("note")).expect("add");

        let snapshot = store.snapshot().expect("snapshot");
        assert_eq!(snapshot.files.len(), 1);
        assert_eq!(snapshot.inventory, vec!["potion"]);

        store.reset().expect("reset");
        assert_eq!(store.snapshot().expect("snapshot"), StateSnapshot::default());
    }

    #[test]
    fn test_poisoned_region_is_reported() {
        let store = StateStore::new();
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.regions.feed.write();
            panic!("poison the feed");
        })
        .join();

        assert_eq!(store.post_content("x"), Err(StateError::Poisoned(Region::Feed)));
        // Other regions are unaffected
        store.add_item("still works").expect("inventory usable");
    }
}
