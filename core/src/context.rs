//! Call context handed to every tool
//!
//! The context carries the collaborators a tool may need: the clock and random
//! source used by mock responders, and the optional state backend used by the
//! stateful wrapper. Contexts are cheap to clone; clones share the backend and the
//! random source.

use crate::state::{StateManager, StateStore};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```ignore
/// // Production - uses system clock
/// let ctx = ToolContext::new();
///
/// // Test - fixed time for deterministic responses
/// let ctx = ToolContext::new().with_clock(Arc::new(FixedClock::new(time)));
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Collaborators available to a tool call
#[derive(Clone)]
pub struct ToolContext {
    clock: Arc<dyn Clock>,
    rng: Arc<Mutex<StdRng>>,
    state: Option<Arc<dyn StateManager>>,
    effects_enabled: bool,
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("state", &self.state)
            .field("effects_enabled", &self.effects_enabled)
            .finish_non_exhaustive()
    }
}

impl Default for ToolContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolContext {
    /// Context with the system clock, an entropy-seeded RNG and no state backend
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
            state: None,
            effects_enabled: true,
        }
    }

    /// Builder: attach an in-memory store
    #[must_use]
    pub fn with_store(self, store: StateStore) -> Self {
        self.with_state(Arc::new(store))
    }

    /// Builder: attach any state backend
    #[must_use]
    pub fn with_state(mut self, state: Arc<dyn StateManager>) -> Self {
        self.state = Some(state);
        self
    }

    /// Builder: replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builder: seed the random source for reproducible responses
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    /// Builder: enable or disable state effects
    #[must_use]
    pub const fn with_effects(mut self, enabled: bool) -> Self {
        self.effects_enabled = enabled;
        self
    }

    /// Current time according to the context clock
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Run `f` with exclusive access to the random source
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A panic inside another caller's closure leaves the RNG usable
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Attached state backend, if any
    #[must_use]
    pub fn state(&self) -> Option<&dyn StateManager> {
        self.state.as_deref()
    }

    /// Whether state effects should be applied
    #[must_use]
    pub const fn effects_enabled(&self) -> bool {
        self.effects_enabled
    }
}
