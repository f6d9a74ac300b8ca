//! Millisecond tick counter shared between the tick interrupt and foreground code.
//!
//! The counter is a single `u32` word, so reads and writes are atomic on every target that has
//! native 32-bit atomics. Targets without CAS (e.g. `thumbv6m`) can route through
//! `portable-atomic` via the crate features.
//!
//! One tick is one millisecond; the counter wraps after roughly 49.7 days. Deadlines are compared
//! wrap-aware: a deadline counts as reached when it lies at most [`MAX_SPAN`] ticks behind `now`,
//! so every delay, offset, and period must stay within `MAX_SPAN` (about 24.8 days).

#[cfg(not(feature = "portable-atomic"))]
use core::sync::atomic::{AtomicU32, Ordering};
#[cfg(feature = "portable-atomic")]
use portable_atomic::{AtomicU32, Ordering};

/// Longest distance between two ticks that still orders them correctly across a wrap.
pub const MAX_SPAN: u32 = i32::MAX as u32;

/// True once `now` has reached `deadline`, treating the clock as a wrapping counter.
#[inline]
pub const fn is_due(deadline: u32, now: u32) -> bool {
    now.wrapping_sub(deadline) <= MAX_SPAN
}

/// Monotonic tick counter advanced once per tick interrupt.
#[derive(Debug)]
pub struct Clock {
    millis: AtomicU32,
}

impl Clock {
    pub const fn new() -> Self {
        Self {
            millis: AtomicU32::new(0),
        }
    }

    /// Current tick value.
    #[inline]
    pub fn now(&self) -> u32 {
        self.millis.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, millis: u32) {
        self.millis.store(millis, Ordering::Release);
    }

    /// Advance by one tick and return the new value.
    #[inline]
    pub fn advance(&self) -> u32 {
        self.millis.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
