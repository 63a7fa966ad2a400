//! Timer abstraction for debounced work.
//!
//! The store never sleeps or spawns anything itself. It asks a [`TimerHost`]
//! to schedule a one-shot timer and is told, through the handle, when that
//! timer fires. The browser bridge backs this with `setTimeout`; tests use
//! [`ManualTimers`], a virtual clock advanced by hand.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Opaque identifier of one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Something that can run a one-shot timer and cancel it.
///
/// Implementations report expiry by calling back into the owner with the
/// handle returned from [`TimerHost::schedule`]. Cancelling an unknown or
/// already-fired handle is a no-op.
pub trait TimerHost {
    fn schedule(&mut self, delay_ms: u32) -> TimerHandle;

    fn cancel(&mut self, handle: TimerHandle);
}

/// Virtual-clock timer host. Clones share the same clock.
#[derive(Debug, Clone, Default)]
pub struct ManualTimers {
    inner: Rc<RefCell<ManualInner>>,
}

#[derive(Debug, Default)]
struct ManualInner {
    now_ms: u64,
    next_id: u64,
    /// handle → due time
    pending: BTreeMap<TimerHandle, u64>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    /// Number of timers scheduled and not yet fired or cancelled.
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Move the clock forward and return every timer that came due, earliest
    /// first. Returned timers are no longer pending.
    pub fn advance(&self, ms: u64) -> Vec<TimerHandle> {
        let mut inner = self.inner.borrow_mut();
        inner.now_ms += ms;
        let now = inner.now_ms;
        let mut due: Vec<(u64, TimerHandle)> = inner
            .pending
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(h, at)| (*at, *h))
            .collect();
        due.sort();
        for (_, h) in &due {
            inner.pending.remove(h);
        }
        due.into_iter().map(|(_, h)| h).collect()
    }
}

impl TimerHost for ManualTimers {
    fn schedule(&mut self, delay_ms: u32) -> TimerHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let handle = TimerHandle(inner.next_id);
        let due = inner.now_ms + u64::from(delay_ms);
        inner.pending.insert(handle, due);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.inner.borrow_mut().pending.remove(&handle);
    }
}
