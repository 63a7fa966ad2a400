//! Per-plan position store with debounced, whole-snapshot persistence.
//!
//! Every mutation cancels the pending save timer and schedules a new one, so a
//! burst of drags produces a single save once the user pauses. A save never
//! sends a delta: it reads the complete map of each plan touched since the
//! last save at the moment the timer fires, which makes the persisted state
//! independent of how many intermediate saves were skipped or reordered.
//!
//! The store is single-writer. It is mutated synchronously from UI event
//! handlers and the timer callback, never from another thread.

use crate::error::Result;
use crate::geometry::NormalizedPosition;
use crate::id::{FloorPlanId, ObjectId};
use crate::timer::{TimerHandle, TimerHost};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One persisted position. Serializes as
/// `{"entity_id": "...", "position": {"x": 0.5, "y": 0.5}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub entity_id: ObjectId,
    pub position: NormalizedPosition,
}

impl PositionEntry {
    pub fn new(entity_id: impl Into<ObjectId>, x: f64, y: f64) -> Self {
        Self {
            entity_id: entity_id.into(),
            position: NormalizedPosition::new(x, y),
        }
    }
}

/// Receives `(plan, complete snapshot of that plan)` whenever the store saves.
pub type SaveCallback = Box<dyn FnMut(&FloorPlanId, &[PositionEntry])>;

type PlanPositions = BTreeMap<ObjectId, NormalizedPosition>;

pub struct PositionStore {
    plans: BTreeMap<FloorPlanId, PlanPositions>,
    current: Option<FloorPlanId>,
    /// Plans mutated since their last save.
    dirty: BTreeSet<FloorPlanId>,
    /// The one outstanding debounce timer, if any.
    pending: Option<TimerHandle>,
    debounce_ms: u32,
    timers: Box<dyn TimerHost>,
    on_save: SaveCallback,
}

impl PositionStore {
    pub fn new(timers: Box<dyn TimerHost>, debounce_ms: u32, on_save: SaveCallback) -> Self {
        Self {
            plans: BTreeMap::new(),
            current: None,
            dirty: BTreeSet::new(),
            pending: None,
            debounce_ms,
            timers,
            on_save,
        }
    }

    // ─── Plan context ────────────────────────────────────────────────────

    /// Select the plan that single-plan operations act on. Unseen plans get an
    /// empty map.
    pub fn set_current_plan(&mut self, plan: impl Into<FloorPlanId>) {
        let plan = plan.into();
        self.plans.entry(plan.clone()).or_default();
        log::debug!("position store: current plan = {plan}");
        self.current = Some(plan);
    }

    pub fn current_plan(&self) -> Option<&FloorPlanId> {
        self.current.as_ref()
    }

    /// Every plan the store holds a map for, in id order.
    pub fn plan_ids(&self) -> Vec<FloorPlanId> {
        self.plans.keys().cloned().collect()
    }

    // ─── Current-plan operations ─────────────────────────────────────────

    /// Store or overwrite a position on the current plan. Unless `skip_save`
    /// is set, a debounced save is scheduled.
    pub fn update_position(
        &mut self,
        object_id: impl Into<ObjectId>,
        x: f64,
        y: f64,
        skip_save: bool,
    ) {
        let Some(plan) = self.current.clone() else {
            log::warn!("update_position without a current plan ignored");
            return;
        };
        self.update_position_in(&plan, object_id, NormalizedPosition::new(x, y), skip_save);
    }

    /// Delete a position from the current plan. Returns whether it existed.
    pub fn remove_position(&mut self, object_id: &ObjectId) -> bool {
        let Some(plan) = self.current.clone() else {
            log::warn!("remove_position without a current plan ignored");
            return false;
        };
        self.remove_position_in(&plan, object_id)
    }

    pub fn get_position(&self, object_id: &ObjectId) -> Option<NormalizedPosition> {
        self.current
            .as_ref()
            .and_then(|plan| self.get_position_in(plan, object_id))
    }

    /// Snapshot of the current plan.
    pub fn get_all_positions(&self) -> Vec<PositionEntry> {
        self.current
            .as_ref()
            .map(|plan| self.positions_for(plan))
            .unwrap_or_default()
    }

    // ─── Plan-explicit operations ────────────────────────────────────────

    pub fn update_position_in(
        &mut self,
        plan: &FloorPlanId,
        object_id: impl Into<ObjectId>,
        position: NormalizedPosition,
        skip_save: bool,
    ) {
        let object_id = object_id.into();
        log::trace!("position {plan}/{object_id} = ({}, {})", position.x, position.y);
        self.plans
            .entry(plan.clone())
            .or_default()
            .insert(object_id, position);
        if !skip_save {
            self.mark_dirty(plan);
        }
    }

    pub fn remove_position_in(&mut self, plan: &FloorPlanId, object_id: &ObjectId) -> bool {
        let removed = self
            .plans
            .entry(plan.clone())
            .or_default()
            .remove(object_id)
            .is_some();
        if removed {
            log::debug!("position {plan}/{object_id} removed");
            self.mark_dirty(plan);
        }
        removed
    }

    pub fn get_position_in(
        &self,
        plan: &FloorPlanId,
        object_id: &ObjectId,
    ) -> Option<NormalizedPosition> {
        self.plans.get(plan)?.get(object_id).copied()
    }

    /// Snapshot of one plan, ordered by object id.
    pub fn positions_for(&self, plan: &FloorPlanId) -> Vec<PositionEntry> {
        self.plans
            .get(plan)
            .map(|positions| {
                positions
                    .iter()
                    .map(|(id, position)| PositionEntry {
                        entity_id: id.clone(),
                        position: *position,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Bulk hydration. Never triggers a save.
    pub fn load_positions(&mut self, plan: &FloorPlanId, entries: &[PositionEntry]) {
        let positions = self.plans.entry(plan.clone()).or_default();
        for entry in entries {
            let p = entry.position;
            positions.insert(entry.entity_id.clone(), NormalizedPosition::new(p.x, p.y));
        }
        log::debug!("loaded {} positions for plan {plan}", entries.len());
    }

    /// Bulk hydration from the persisted JSON shape. Returns the entry count.
    pub fn load_positions_json(&mut self, plan: &FloorPlanId, json: &str) -> Result<usize> {
        let entries: Vec<PositionEntry> = serde_json::from_str(json)?;
        self.load_positions(plan, &entries);
        Ok(entries.len())
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn has_pending_save(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancel the pending timer and save right now. Plans mutated since their
    /// last save are flushed; with nothing dirty, the current plan is.
    pub fn force_save(&mut self) {
        self.cancel_pending();
        if self.dirty.is_empty()
            && let Some(plan) = self.current.clone()
        {
            self.dirty.insert(plan);
        }
        self.flush();
    }

    /// Timer callback. Handles other than the outstanding one are stale
    /// (already cancelled or superseded) and ignored.
    pub fn timer_fired(&mut self, handle: TimerHandle) {
        if self.pending != Some(handle) {
            log::trace!("stale save timer {handle:?} ignored");
            return;
        }
        self.pending = None;
        log::debug!("save debounce elapsed");
        self.flush();
    }

    /// Cancel any pending timer and drop all in-memory state. Nothing is saved.
    pub fn cleanup(&mut self) {
        self.cancel_pending();
        self.plans.clear();
        self.dirty.clear();
        self.current = None;
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn mark_dirty(&mut self, plan: &FloorPlanId) {
        self.dirty.insert(plan.clone());
        self.schedule_save();
    }

    fn schedule_save(&mut self) {
        self.cancel_pending();
        self.pending = Some(self.timers.schedule(self.debounce_ms));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.timers.cancel(handle);
        }
    }

    fn flush(&mut self) {
        let dirty = std::mem::take(&mut self.dirty);
        for plan in dirty {
            let snapshot = self.positions_for(&plan);
            log::info!("saving {} positions for plan {plan}", snapshot.len());
            (self.on_save)(&plan, &snapshot);
        }
    }
}

impl std::fmt::Debug for PositionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionStore")
            .field("plans", &self.plans)
            .field("current", &self.current)
            .field("dirty", &self.dirty)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
