//! Cooperative cancellation and suspension policies.
//!
//! The engine polls its watchdog exactly once per frontier pop, with the
//! cost of the entry about to be popped, before popping it. That poll is
//! the only cancellation/suspension point of a planning call, so
//! cancellation latency is bounded by one node expansion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What the engine should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Pop and expand the next frontier entry.
    Continue,
    /// Stop searching; abandon the frontier.
    Cancel,
    /// Return control to the driver without popping; resume later.
    Suspend,
}

impl Verdict {
    /// Combine two verdicts: `Cancel` dominates `Suspend`, which dominates
    /// `Continue`.
    #[must_use]
    pub fn strongest(self, other: Self) -> Self {
        match (self, other) {
            (Self::Cancel, _) | (_, Self::Cancel) => Self::Cancel,
            (Self::Suspend, _) | (_, Self::Suspend) => Self::Suspend,
            _ => Self::Continue,
        }
    }
}

/// A cooperative cancellation/suspension policy.
pub trait Watchdog {
    /// Decide whether the engine may pop an entry of cost `current_cost`.
    fn poll(&mut self, current_cost: f64) -> Verdict;

    /// Poll both `self` and `other` every time; the stronger verdict wins.
    fn or<W: Watchdog>(self, other: W) -> Either<Self, W>
    where
        Self: Sized,
    {
        Either {
            first: self,
            second: other,
        }
    }
}

impl<D: Watchdog + ?Sized> Watchdog for &mut D {
    fn poll(&mut self, current_cost: f64) -> Verdict {
        (**self).poll(current_cost)
    }
}

impl<D: Watchdog + ?Sized> Watchdog for Box<D> {
    fn poll(&mut self, current_cost: f64) -> Verdict {
        (**self).poll(current_cost)
    }
}

/// Never cancels, never suspends.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysContinue;

impl Watchdog for AlwaysContinue {
    fn poll(&mut self, _current_cost: f64) -> Verdict {
        Verdict::Continue
    }
}

/// A cloneable cancellation flag, safe to trip from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// A watchdog that cancels once this token is tripped.
    #[must_use]
    pub fn watchdog(&self) -> Cancellation {
        Cancellation {
            token: self.clone(),
        }
    }
}

/// Cancels once its [`CancelToken`] is tripped.
#[derive(Debug, Clone)]
pub struct Cancellation {
    token: CancelToken,
}

impl Watchdog for Cancellation {
    fn poll(&mut self, _current_cost: f64) -> Verdict {
        if self.token.is_cancelled() {
            Verdict::Cancel
        } else {
            Verdict::Continue
        }
    }
}

/// Cancels once the cheapest remaining entry costs at least `limit`.
#[derive(Debug, Clone, Copy)]
pub struct CostCeiling {
    limit: f64,
}

impl CostCeiling {
    #[must_use]
    pub fn new(limit: f64) -> Self {
        Self { limit }
    }

    #[must_use]
    pub fn limit(&self) -> f64 {
        self.limit
    }
}

impl Watchdog for CostCeiling {
    fn poll(&mut self, current_cost: f64) -> Verdict {
        if current_cost >= self.limit {
            Verdict::Cancel
        } else {
            Verdict::Continue
        }
    }
}

/// Cancels past an absolute point in time.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    #[must_use]
    pub fn at(at: Instant) -> Self {
        Self { at }
    }

    /// A deadline `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self::at(Instant::now() + budget)
    }
}

impl Watchdog for Deadline {
    fn poll(&mut self, _current_cost: f64) -> Verdict {
        if Instant::now() >= self.at {
            Verdict::Cancel
        } else {
            Verdict::Continue
        }
    }
}

/// Suspends once per `slice` of wall-clock time.
///
/// The first poll after construction (or after a suspension) arms a
/// deadline `slice` in the future and continues. A poll past the armed
/// deadline disarms it and suspends, so the next poll re-arms and
/// continues. This lets a driver yield without an external scheduler.
#[derive(Debug, Clone)]
pub struct TimeSlice {
    slice: Duration,
    armed_until: Option<Instant>,
    suspensions: u64,
}

impl TimeSlice {
    #[must_use]
    pub fn new(slice: Duration) -> Self {
        Self {
            slice,
            armed_until: None,
            suspensions: 0,
        }
    }

    /// Number of suspensions issued so far.
    #[must_use]
    pub fn suspensions(&self) -> u64 {
        self.suspensions
    }
}

impl Watchdog for TimeSlice {
    fn poll(&mut self, _current_cost: f64) -> Verdict {
        let now = Instant::now();
        match self.armed_until {
            None => {
                self.armed_until = Some(now + self.slice);
                Verdict::Continue
            }
            Some(until) if now >= until => {
                self.armed_until = None;
                self.suspensions += 1;
                Verdict::Suspend
            }
            Some(_) => Verdict::Continue,
        }
    }
}

/// Adapts a closure into a watchdog.
#[derive(Debug, Clone)]
pub struct PollFn<F> {
    f: F,
}

/// Build a watchdog from a `FnMut(f64) -> Verdict` closure.
pub fn poll_fn<F: FnMut(f64) -> Verdict>(f: F) -> PollFn<F> {
    PollFn { f }
}

impl<F: FnMut(f64) -> Verdict> Watchdog for PollFn<F> {
    fn poll(&mut self, current_cost: f64) -> Verdict {
        (self.f)(current_cost)
    }
}

/// Two watchdogs polled together. See [`Watchdog::or`].
#[derive(Debug, Clone)]
pub struct Either<A, B> {
    first: A,
    second: B,
}

impl<A: Watchdog, B: Watchdog> Watchdog for Either<A, B> {
    fn poll(&mut self, current_cost: f64) -> Verdict {
        let first = self.first.poll(current_cost);
        let second = self.second.poll(current_cost);
        first.strongest(second)
    }
}
