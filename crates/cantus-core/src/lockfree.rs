//! Lock-free primitives.

use std::sync::atomic::{AtomicBool, Ordering};

/// Cache-line aligned, set-once readiness flag.
///
/// Transitions `false -> true` at most once and never back. `set` publishes
/// with release ordering and `is_set` reads with acquire ordering, so anything
/// written before `set` (e.g. a registry insert) is visible to a thread that
/// observes `true`.
#[derive(Debug, Default)]
#[repr(align(64))]
pub struct ReadyFlag {
    value: AtomicBool,
}

impl ReadyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    /// Raise the flag. Returns `true` only for the call that performed the transition.
    #[inline]
    pub fn set(&self) -> bool {
        self.value
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
