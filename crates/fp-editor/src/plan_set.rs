//! Multi-plan navigation model.
//!
//! Tracks the known plan ids in order, which ones already have a canvas, which
//! one is shown, and the settings every canvas must share. The bridge turns the
//! returned instructions into DOM work.

use fp_core::{EngineError, FloorPlanId, PositionStore};
use std::collections::BTreeSet;

/// What the bridge must do to show a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowPlan {
    pub plan: FloorPlanId,
    /// No canvas exists yet for this plan.
    pub create: bool,
    /// Canvases to hide, in id order.
    pub hide: Vec<FloorPlanId>,
}

#[derive(Debug, Clone)]
pub struct PlanSet {
    ids: Vec<FloorPlanId>,
    created: BTreeSet<FloorPlanId>,
    shown: Option<FloorPlanId>,
    edit_mode: bool,
    object_scale: f64,
    swipe_threshold: f64,
    touch_start_x: Option<f64>,
}

impl PlanSet {
    pub fn new(swipe_threshold: f64) -> Self {
        Self {
            ids: Vec::new(),
            created: BTreeSet::new(),
            shown: None,
            edit_mode: false,
            object_scale: 1.0,
            swipe_threshold,
            touch_start_x: None,
        }
    }

    /// Replace the known plans. Returns the canvases that must be torn down.
    /// Duplicate ids keep their first occurrence.
    pub fn reset(&mut self, ids: impl IntoIterator<Item = FloorPlanId>) -> Vec<FloorPlanId> {
        let torn_down = std::mem::take(&mut self.created).into_iter().collect();
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
        self.shown = None;
        self.touch_start_x = None;
        torn_down
    }

    /// Register a canvas for `id` without showing it, so objects can be added
    /// to a plan before it is first displayed. Returns true if it is new.
    pub fn create(&mut self, id: &FloorPlanId) -> Result<bool, EngineError> {
        if !self.ids.contains(id) {
            return Err(EngineError::UnknownPlan(id.to_string()));
        }
        Ok(self.created.insert(id.clone()))
    }

    pub fn show(&mut self, id: &FloorPlanId) -> Result<ShowPlan, EngineError> {
        let create = self.create(id)?;
        let hide = self.created.iter().filter(|c| *c != id).cloned().collect();
        self.shown = Some(id.clone());
        Ok(ShowPlan {
            plan: id.clone(),
            create,
            hide,
        })
    }

    /// Plan to show at startup: the remembered one if still known, else the first.
    pub fn restore(&self, stored: Option<&str>) -> Option<FloorPlanId> {
        stored
            .map(FloorPlanId::new)
            .filter(|id| self.ids.contains(id))
            .or_else(|| self.ids.first().cloned())
    }

    pub fn shown(&self) -> Option<&FloorPlanId> {
        self.shown.as_ref()
    }

    pub fn plan_ids(&self) -> &[FloorPlanId] {
        &self.ids
    }

    pub fn is_created(&self, id: &FloorPlanId) -> bool {
        self.created.contains(id)
    }

    /// Forget everything. Returns the canvases that must be torn down.
    pub fn clear(&mut self) -> Vec<FloorPlanId> {
        self.reset(Vec::new())
    }

    // ─── Shared settings ─────────────────────────────────────────────────

    /// Returns true when edit mode was just left, which is when the store
    /// must be flushed.
    pub fn set_edit_mode(&mut self, on: bool) -> bool {
        let leaving = self.edit_mode && !on;
        self.edit_mode = on;
        if on {
            self.touch_start_x = None;
        }
        leaving
    }

    /// [`PlanSet::set_edit_mode`] plus the flush that leaving edit mode
    /// requires.
    pub fn apply_edit_mode(&mut self, on: bool, store: &mut PositionStore) -> bool {
        let leaving = self.set_edit_mode(on);
        if leaving {
            log::debug!("edit mode left, flushing positions");
            store.force_save();
        }
        leaving
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn set_object_scale(&mut self, scale: f64) {
        if scale > 0.0 && scale.is_finite() {
            self.object_scale = scale;
        }
    }

    pub fn object_scale(&self) -> f64 {
        self.object_scale
    }

    // ─── Swipe ───────────────────────────────────────────────────────────

    pub fn touch_start(&mut self, x: f64) {
        if !self.edit_mode {
            self.touch_start_x = Some(x);
        }
    }

    /// Finish a swipe. Returns the plan to show, if the gesture changes plan.
    pub fn touch_end(&mut self, x: f64) -> Option<FloorPlanId> {
        let start = self.touch_start_x.take()?;
        if self.edit_mode {
            return None;
        }
        let diff = start - x;
        let step: isize = if diff > self.swipe_threshold {
            1
        } else if diff < -self.swipe_threshold {
            -1
        } else {
            return None;
        };
        let current = self.shown.as_ref()?;
        let index = self.ids.iter().position(|id| id == current)?;
        let target = index.checked_add_signed(step)?;
        self.ids.get(target).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<FloorPlanId> {
        names.iter().map(|n| FloorPlanId::new(*n)).collect()
    }

    #[test]
    fn show_creates_lazily_and_hides_others() {
        let mut set = PlanSet::new(50.0);
        set.reset(ids(&["a", "b"]));
        let first = set.show(&"a".into()).unwrap();
        assert!(first.create);
        assert!(first.hide.is_empty());

        let second = set.show(&"b".into()).unwrap();
        assert!(second.create);
        assert_eq!(second.hide, ids(&["a"]));

        let again = set.show(&"a".into()).unwrap();
        assert!(!again.create);
        assert_eq!(again.hide, ids(&["b"]));
    }

    #[test]
    fn create_ahead_of_show() {
        let mut set = PlanSet::new(50.0);
        set.reset(ids(&["a", "b"]));
        assert_eq!(set.create(&"b".into()), Ok(true));
        assert_eq!(set.create(&"b".into()), Ok(false));
        assert!(set.is_created(&"b".into()));
        assert_eq!(set.shown(), None);
        assert!(!set.show(&"b".into()).unwrap().create);
        assert!(set.create(&"c".into()).is_err());
    }

    #[test]
    fn unknown_plan_leaves_view_unchanged() {
        let mut set = PlanSet::new(50.0);
        set.reset(ids(&["a"]));
        set.show(&"a".into()).unwrap();
        assert_eq!(
            set.show(&"zzz".into()),
            Err(EngineError::UnknownPlan("zzz".into()))
        );
        assert_eq!(set.shown(), Some(&FloorPlanId::new("a")));
    }

    #[test]
    fn reset_returns_created_canvases() {
        let mut set = PlanSet::new(50.0);
        set.reset(ids(&["a", "b", "c"]));
        set.show(&"c".into()).unwrap();
        set.show(&"a".into()).unwrap();
        assert_eq!(set.reset(ids(&["x"])), ids(&["a", "c"]));
        assert_eq!(set.shown(), None);
        assert_eq!(set.plan_ids(), ids(&["x"]).as_slice());
    }

    #[test]
    fn leaving_edit_mode_is_reported_once() {
        let mut set = PlanSet::new(50.0);
        assert!(!set.set_edit_mode(false));
        assert!(!set.set_edit_mode(true));
        assert!(set.set_edit_mode(false));
        assert!(!set.set_edit_mode(false));
    }

    #[test]
    fn restore_falls_back_to_first_plan() {
        let mut set = PlanSet::new(50.0);
        set.reset(ids(&["a", "b"]));
        assert_eq!(set.restore(Some("b")), Some(FloorPlanId::new("b")));
        assert_eq!(set.restore(Some("gone")), Some(FloorPlanId::new("a")));
        assert_eq!(set.restore(None), Some(FloorPlanId::new("a")));
        set.clear();
        assert_eq!(set.restore(Some("b")), None);
    }
}
