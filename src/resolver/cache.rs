//! Time-bounded resolution cache with an injectable clock.
//!
//! Entries expire a fixed TTL after insertion; reads never extend an entry's
//! life. Expired entries are dropped lazily on read, by [`TtlCache::purge_expired`],
//! or by the optional background sweeper. [`TtlCache::flush`] empties the cache.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Default lifetime of a cached resolution.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Source of the current time for expiry decisions.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Runtime time: follows tokio's clock, so paused-time tests see expiry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_ms: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    /// Moves the clock forward.
    #[allow(clippy::cast_possible_truncation)]
    pub fn advance(&self, by: Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Concurrent key/value cache whose entries expire after a fixed TTL.
///
/// Wrap in `Arc` to share between resolvers and the sweeper task.
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("len", &self.entries.len())
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .finish()
    }
}

impl<V: Clone> TtlCache<V> {
    /// Creates a cache using wall-clock time.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache driven by the given clock.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Returns the configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a live entry, dropping it if it has expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, entry| now >= entry.expires_at);
            trace!(key, "evicted expired entry on read");
        }
        None
    }

    /// Stores a value; it expires one TTL from now.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Removes every entry. Returns how many were removed.
    pub fn flush(&self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        debug!(removed, "cache flushed");
        removed
    }

    /// Removes expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    /// Spawns a task that purges expired entries every `interval`.
    ///
    /// The task holds only a weak reference and ends once the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        let interval = interval.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    debug!("cache dropped; sweeper exiting");
                    break;
                };
                let purged = cache.purge_expired();
                if purged > 0 {
                    debug!(purged, remaining = cache.len(), "swept expired entries");
                }
            }
        })
    }
}
