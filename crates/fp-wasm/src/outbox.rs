//! Save delivery to the host.
//!
//! The store calls its save callback while it is mutably borrowed. The bridge
//! only queues the serialized snapshot here and hands the queue to the host
//! once the engine's own borrows are released, so a save handler may read the
//! engine back.

use fp_core::{FloorPlanId, PositionEntry};
use std::cell::RefCell;
use std::collections::VecDeque;

type SinkFn = Box<dyn FnMut(&FloorPlanId, &str)>;

pub struct SaveOutbox {
    queue: RefCell<VecDeque<(FloorPlanId, String)>>,
    sink: RefCell<SinkFn>,
}

impl SaveOutbox {
    /// `sink` receives `(plan, entries_json)` for every delivered save.
    pub fn new(sink: impl FnMut(&FloorPlanId, &str) + 'static) -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            sink: RefCell::new(Box::new(sink)),
        }
    }

    pub fn push(&self, plan: &FloorPlanId, entries: &[PositionEntry]) {
        match serde_json::to_string(entries) {
            Ok(json) => self.queue.borrow_mut().push_back((plan.clone(), json)),
            Err(e) => log::error!("plan {plan}: positions not serializable: {e}"),
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Hand every queued save to the sink, oldest first. A call made from
    /// inside the sink returns at once; the outer call drains what it queued.
    pub fn deliver(&self) {
        let Ok(mut sink) = self.sink.try_borrow_mut() else {
            return;
        };
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some((plan, json)) = next else {
                break;
            };
            (*sink)(&plan, &json);
        }
    }
}

impl std::fmt::Debug for SaveOutbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveOutbox")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}
