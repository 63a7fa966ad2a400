//! Browser timer host for the position store.
//!
//! Each scheduled save becomes a `gloo_timers` [`Timeout`]. Fired timeouts are
//! not dropped from inside their own callback; they are marked and purged on
//! the next `schedule`/`cancel`.

use fp_core::{TimerHandle, TimerHost};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

type FireFn = Rc<dyn Fn(TimerHandle)>;

#[derive(Default)]
struct Inner {
    next_id: u64,
    live: BTreeMap<TimerHandle, Timeout>,
    fired: Vec<TimerHandle>,
    on_fire: Option<FireFn>,
}

impl Inner {
    fn purge_fired(&mut self) {
        for handle in self.fired.drain(..) {
            self.live.remove(&handle);
        }
    }
}

/// Cloneable handle; clones share the same set of timeouts.
#[derive(Clone, Default)]
pub struct BrowserTimers {
    inner: Rc<RefCell<Inner>>,
}

impl BrowserTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the function called with the handle of every timeout that fires.
    pub fn on_fire(&self, f: impl Fn(TimerHandle) + 'static) {
        self.inner.borrow_mut().on_fire = Some(Rc::new(f));
    }

    pub fn pending_count(&self) -> usize {
        let inner = self.inner.borrow();
        inner.live.len().saturating_sub(inner.fired.len())
    }
}

impl TimerHost for BrowserTimers {
    fn schedule(&mut self, delay_ms: u32) -> TimerHandle {
        let mut inner = self.inner.borrow_mut();
        inner.purge_fired();
        inner.next_id += 1;
        let handle = TimerHandle::from_raw(inner.next_id);

        let weak = Rc::downgrade(&self.inner);
        let timeout = Timeout::new(delay_ms, move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let on_fire = {
                let mut inner = shared.borrow_mut();
                inner.fired.push(handle);
                inner.on_fire.clone()
            };
            if let Some(f) = on_fire {
                f(handle);
            }
        });
        inner.live.insert(handle, timeout);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let mut inner = self.inner.borrow_mut();
        inner.purge_fired();
        if let Some(timeout) = inner.live.remove(&handle) {
            timeout.cancel();
        }
    }
}

impl std::fmt::Debug for BrowserTimers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserTimers")
            .field("pending", &self.pending_count())
            .finish()
    }
}
