//! Reusable-object pool.
//!
//! A [`Pool`] is a free list of `T` values. `acquire` hands out a recycled
//! value (or constructs one with `Default`), `release` puts one back. The
//! caller is responsible for clearing a value before releasing it.
//!
//! Idle pools shrink opportunistically: every `trim_interval` releases, an
//! oversized free list is cut to a survivor fraction, never below the
//! configured floor.
//!
//! [`Pool::shared`] returns the process-wide pool for a type, keyed by
//! `TypeId`.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

/// Pool sizing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Free-list capacity reserved on first release.
    pub initial_capacity: usize,
    /// Trimming never shrinks the free list below this many instances.
    pub min_retained: usize,
    /// Number of releases between opportunistic trims.
    pub trim_interval: u64,
    /// Percentage of idle instances that survive a trim.
    pub survivor_percent: u8,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 4,
            min_retained: 4,
            trim_interval: 256,
            survivor_percent: 50,
        }
    }
}

/// Counters describing pool activity since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances constructed because the free list was empty.
    pub created: u64,
    /// Instances handed out from the free list.
    pub reused: u64,
    /// Instances put back.
    pub released: u64,
    /// Instances dropped by trims.
    pub trimmed: u64,
    /// Instances currently idle in the free list.
    pub idle: usize,
}

struct PoolInner<T> {
    free: Vec<T>,
    stats: PoolStats,
    releases_since_trim: u64,
}

/// Thread-safe free list of reusable `T` values.
///
/// The free list sits behind a `Mutex` rather than a lock-free atomic
/// swap of the whole array. Every critical section is one push, pop or
/// split, so contention costs a short wait instead of a retry loop.
pub struct Pool<T> {
    inner: Mutex<PoolInner<T>>,
    config: PoolConfig,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave the free list torn:
    // every critical section is a single push/pop/split.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Default> Pool<T> {
    /// Create an empty pool with the default [`PoolConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create an empty pool with an explicit sizing policy.
    #[must_use]
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            inner: Mutex::new(PoolInner {
                free: Vec::new(),
                stats: PoolStats::default(),
                releases_since_trim: 0,
            }),
            config,
        }
    }

    /// Take a recycled instance, or construct a fresh one.
    pub fn acquire(&self) -> T {
        let recycled = {
            let mut inner = lock(&self.inner);
            let item = inner.free.pop();
            if item.is_some() {
                inner.stats.reused += 1;
            } else {
                inner.stats.created += 1;
            }
            inner.stats.idle = inner.free.len();
            item
        };
        recycled.unwrap_or_default()
    }

    /// Put an instance back.
    pub fn release(&self, item: T) {
        let trim_due = {
            let mut inner = lock(&self.inner);
            if inner.free.len() == inner.free.capacity() {
                let grow = inner.free.capacity().max(self.config.initial_capacity);
                inner.free.reserve_exact(grow);
            }
            inner.free.push(item);
            inner.stats.released += 1;
            inner.stats.idle = inner.free.len();
            inner.releases_since_trim += 1;
            inner.releases_since_trim >= self.config.trim_interval
                && inner.free.len() > self.config.min_retained.saturating_mul(2)
        };
        if trim_due {
            self.trim();
        }
    }

    /// Acquire an instance wrapped in a guard that releases it on drop.
    pub fn lease(&self) -> Lease<'_, T> {
        Lease {
            pool: self,
            item: Some(self.acquire()),
        }
    }

    /// Shrink the free list to its survivor fraction.
    ///
    /// Keeps `max(min_retained, idle * survivor_percent / 100)` instances.
    /// Returns the number of instances dropped.
    pub fn trim(&self) -> usize {
        let dropped = {
            let mut inner = lock(&self.inner);
            inner.releases_since_trim = 0;
            let idle = inner.free.len();
            let survivors = (idle * usize::from(self.config.survivor_percent) / 100)
                .max(self.config.min_retained);
            if idle <= survivors {
                return 0;
            }
            let dropped = inner.free.split_off(survivors);
            inner.free.shrink_to(survivors.max(self.config.initial_capacity));
            inner.stats.trimmed += dropped.len() as u64;
            inner.stats.idle = inner.free.len();
            dropped
        };
        // Dropped outside the lock.
        dropped.len()
    }

    /// Number of idle instances.
    #[must_use]
    pub fn idle(&self) -> usize {
        lock(&self.inner).free.len()
    }

    /// Snapshot of the pool counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        lock(&self.inner).stats
    }

    /// The sizing policy this pool was built with.
    #[must_use]
    pub fn config(&self) -> PoolConfig {
        self.config
    }
}

impl<T: Default> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

type Registry = Mutex<HashMap<TypeId, &'static (dyn Any + Send + Sync)>>;

static SHARED: OnceLock<Registry> = OnceLock::new();

impl<T: Default + Send + 'static> Pool<T> {
    /// The process-wide pool for `T`.
    ///
    /// Pools are created on first use and live for the rest of the process.
    pub fn shared() -> &'static Self {
        let registry = SHARED.get_or_init(Registry::default);
        let entry: &'static (dyn Any + Send + Sync) = *lock(registry)
            .entry(TypeId::of::<Self>())
            .or_insert_with(|| {
                let pool: &'static (dyn Any + Send + Sync) = Box::leak(Box::new(Self::new()));
                pool
            });
        entry
            .downcast_ref::<Self>()
            .unwrap_or_else(|| unreachable!("shared pool registry is keyed by TypeId"))
    }
}

/// Scoped acquisition: the leased value goes back to its pool on drop,
/// including during unwinding.
pub struct Lease<'p, T: Default> {
    pool: &'p Pool<T>,
    item: Option<T>,
}

impl<T: Default> Deref for Lease<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.item {
            Some(item) => item,
            None => unreachable!("lease is only emptied by drop"),
        }
    }
}

impl<T: Default> DerefMut for Lease<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.item {
            Some(item) => item,
            None => unreachable!("lease is only emptied by drop"),
        }
    }
}

impl<T: Default> Drop for Lease<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}
