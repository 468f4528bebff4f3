//! In-memory conversation store
//!
//! Keys live in an `RwLock`ed map that is only held for map operations.
//! Each conversation sits behind its own async mutex, which callers hold for
//! the whole of a mutating operation, outbound model call included.

use crate::state_machine::ConvState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

pub type SlotHandle = Arc<Mutex<Slot>>;

/// One user's conversation plus bookkeeping
#[derive(Debug)]
pub struct Slot {
    /// `None` while the opening question is being generated and once the
    /// slot has been reset or evicted
    pub state: Option<ConvState>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    last_touched: Instant,
}

impl Slot {
    fn reserved() -> Self {
        let now = Utc::now();
        Self {
            state: None,
            started_at: now,
            updated_at: now,
            last_touched: Instant::now(),
        }
    }

    /// Replace the state and bump timestamps
    pub fn commit(&mut self, state: ConvState) {
        self.state = Some(state);
        self.updated_at = Utc::now();
        self.touch();
    }

    /// Record a read for idle tracking
    pub fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_touched)
    }
}

/// Decides which idle conversations `sweep` removes
pub trait EvictionPolicy: Send + Sync {
    fn should_evict(&self, idle: Duration) -> bool;
}

/// Keep every conversation for the life of the process
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    fn should_evict(&self, _idle: Duration) -> bool {
        false
    }
}

/// Evict conversations untouched for longer than `ttl`
#[derive(Debug, Clone, Copy)]
pub struct IdleTimeout {
    pub ttl: Duration,
}

impl EvictionPolicy for IdleTimeout {
    fn should_evict(&self, idle: Duration) -> bool {
        idle > self.ttl
    }
}

pub struct ConversationStore {
    slots: RwLock<HashMap<String, SlotHandle>>,
    eviction: Arc<dyn EvictionPolicy>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(Arc::new(NeverEvict))
    }
}

impl ConversationStore {
    pub fn new(eviction: Arc<dyn EvictionPolicy>) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            eviction,
        }
    }

    /// Atomically claim `user_id`, returning the new slot already locked.
    /// `None` if the key is taken, including by a `start` still in flight.
    pub async fn reserve(&self, user_id: &str) -> Option<(SlotHandle, OwnedMutexGuard<Slot>)> {
        let mut slots = self.slots.write().await;
        if slots.contains_key(user_id) {
            return None;
        }

        let slot = Arc::new(Mutex::new(Slot::reserved()));
        // Nobody else can see this mutex yet
        let guard = Arc::clone(&slot).try_lock_owned().ok()?;
        slots.insert(user_id.to_string(), Arc::clone(&slot));
        Some((slot, guard))
    }

    pub async fn get(&self, user_id: &str) -> Option<SlotHandle> {
        self.slots.read().await.get(user_id).cloned()
    }

    /// Remove `user_id` only if it still maps to `slot`. A slot removed and
    /// re-reserved in the meantime is left alone.
    pub async fn remove(&self, user_id: &str, slot: &SlotHandle) -> bool {
        let mut slots = self.slots.write().await;
        match slots.get(user_id) {
            Some(current) if Arc::ptr_eq(current, slot) => {
                slots.remove(user_id);
                true
            }
            _ => false,
        }
    }

    pub async fn count(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Drop conversations the eviction policy selects. Busy slots are
    /// skipped. Returns the number removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.slots.write().await;
        let before = slots.len();

        slots.retain(|_, slot| match slot.try_lock() {
            Ok(mut slot) => {
                if self.eviction.should_evict(slot.idle_for(now)) {
                    // Handles fetched before the sweep must not see the old state
                    slot.state = None;
                    false
                } else {
                    true
                }
            }
            Err(_) => true,
        });

        before - slots.len()
    }
}
