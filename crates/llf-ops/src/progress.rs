//! Progress reporting and cancellation.
//!
//! The remapping loop reports one step per reference level. Steps arrive
//! from rayon workers in no particular order; [`Serialized`] guarantees
//! that the underlying reporter is never entered concurrently.
//!
//! ```rust
//! use llf_ops::progress::{CancelToken, Progress};
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! let seen = AtomicU32::new(0);
//! let report = |_step: u32| {
//!     seen.fetch_add(1, Ordering::Relaxed);
//! };
//! report.report(3);
//! assert_eq!(seen.load(Ordering::Relaxed), 1);
//!
//! let token = CancelToken::new();
//! let guarded = token.guard(&report);
//! assert!(!guarded.is_cancelled());
//! token.cancel();
//! assert!(guarded.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Receives step numbers as work completes.
pub trait Progress: Sync {
    /// Called once per completed step.
    fn report(&self, step: u32);

    /// Polled before each step; `true` stops scheduling further work.
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F: Fn(u32) + Sync> Progress for F {
    fn report(&self, step: u32) {
        self(step);
    }
}

/// Reporter that ignores every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&self, _step: u32) {}
}

/// Adds a fixed offset to every reported step.
///
/// Used to number the steps of a second pass after those of the first.
#[derive(Debug)]
pub struct StepOffset<'a, P: ?Sized> {
    inner: &'a P,
    offset: u32,
}

impl<'a, P: Progress + ?Sized> StepOffset<'a, P> {
    /// Wraps `inner`, shifting steps by `offset`.
    pub fn new(inner: &'a P, offset: u32) -> Self {
        Self { inner, offset }
    }
}

impl<P: Progress + ?Sized> Progress for StepOffset<'_, P> {
    fn report(&self, step: u32) {
        self.inner.report(self.offset + step);
    }

    fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

/// Serializes calls into a non-reentrant reporter.
#[derive(Debug)]
pub struct Serialized<'a, P: ?Sized> {
    inner: &'a P,
    lock: Mutex<()>,
}

impl<'a, P: Progress + ?Sized> Serialized<'a, P> {
    /// Wraps `inner`.
    pub fn new(inner: &'a P) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }
}

impl<P: Progress + ?Sized> Progress for Serialized<'_, P> {
    fn report(&self, step: u32) {
        // A reporter that panicked leaves the lock poisoned; keep reporting.
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.report(step);
    }

    fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

/// Shared abort flag.
///
/// Clones share the flag, so a token can be handed to another thread and
/// cancelled from there.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Wraps `inner` so that it reports this token's state.
    pub fn guard<'a, P: Progress + ?Sized>(&self, inner: &'a P) -> Cancellable<'a, P> {
        Cancellable {
            inner,
            token: self.clone(),
        }
    }
}

/// Reporter paired with a [`CancelToken`].
#[derive(Debug)]
pub struct Cancellable<'a, P: ?Sized> {
    inner: &'a P,
    token: CancelToken,
}

impl<P: Progress + ?Sized> Progress for Cancellable<'_, P> {
    fn report(&self, step: u32) {
        self.inner.report(step);
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.inner.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_offset() {
        let last = Mutex::new(0);
        let report = |s: u32| *last.lock().unwrap() = s;
        StepOffset::new(&report, 256).report(5);
        assert_eq!(*last.lock().unwrap(), 261);
    }

    #[test]
    fn test_serialized_forwards() {
        let steps = Mutex::new(Vec::new());
        let report = |s: u32| steps.lock().unwrap().push(s);
        let serialized = Serialized::new(&report);
        serialized.report(1);
        serialized.report(2);
        assert_eq!(*steps.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        let guarded = token.guard(&NoProgress);
        assert!(!guarded.is_cancelled());
        other.cancel();
        assert!(guarded.is_cancelled());
        assert!(StepOffset::new(&guarded, 10).is_cancelled());
    }
}
