//! Multi-plan view: one lazily created canvas per plan, one shown at a time.

use crate::dom::{self, js_err};
use crate::plan_canvas::PlanCanvas;
use crate::session::Session;
use crate::storage;
use fp_core::{EngineError, FloorPlanId};
use fp_editor::PlanSet;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, TouchEvent};

type TouchHandler = Closure<dyn FnMut(TouchEvent)>;

/// A plan as announced by the host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDescriptor {
    pub id: FloorPlanId,
    #[serde(default)]
    pub image_url: Option<String>,
}

pub struct PlanSetManager {
    root: HtmlElement,
    model: PlanSet,
    canvases: BTreeMap<FloorPlanId, PlanCanvas>,
    images: BTreeMap<FloorPlanId, String>,
    session: Rc<Session>,
    swipe: Option<(TouchHandler, TouchHandler)>,
}

impl PlanSetManager {
    /// Build the manager and listen for swipes on `root`.
    pub fn install(
        root: HtmlElement,
        session: Rc<Session>,
    ) -> Result<Rc<RefCell<Self>>, EngineError> {
        let this = Rc::new(RefCell::new(Self {
            root,
            model: PlanSet::new(session.config.swipe_threshold_px),
            canvases: BTreeMap::new(),
            images: BTreeMap::new(),
            session,
            swipe: None,
        }));
        listen_for_swipes(&this)?;
        Ok(this)
    }

    /// Tear down every canvas and record the new plan list. Canvases are
    /// created on first show.
    pub fn initialize_all_floorplans(&mut self, plans: Vec<PlanDescriptor>) {
        let ids: Vec<FloorPlanId> = plans.iter().map(|p| p.id.clone()).collect();
        for id in self.model.reset(ids) {
            if let Some(canvas) = self.canvases.remove(&id) {
                canvas.cleanup();
                canvas.container().remove();
            }
        }
        self.images = plans
            .into_iter()
            .filter_map(|p| Some((p.id, p.image_url?)))
            .collect();
        log::info!("{} floor plans registered", self.model.plan_ids().len());
    }

    /// Canvas for `id`, created hidden if needed.
    pub fn canvas(&mut self, id: &FloorPlanId) -> Result<PlanCanvas, EngineError> {
        if self.model.create(id)? || !self.canvases.contains_key(id) {
            self.create_canvas(id)?;
        }
        self.canvases
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownPlan(id.to_string()))
    }

    /// Show one plan and hide the others. Unknown ids leave the view as is.
    pub fn show_floorplan(&mut self, id: &FloorPlanId) -> Result<(), EngineError> {
        let step = self.model.show(id).inspect_err(|e| log::warn!("{e}"))?;
        for hidden in &step.hide {
            if let Some(canvas) = self.canvases.get(hidden) {
                canvas.set_visible(false);
            }
        }
        if step.create || !self.canvases.contains_key(id) {
            self.create_canvas(id)?;
        }
        let Some(canvas) = self.canvases.get(id).cloned() else {
            return Err(EngineError::UnknownPlan(id.to_string()));
        };
        canvas.set_visible(true);

        self.session.store.borrow_mut().set_current_plan(id.clone());
        storage::save_string(&self.session.config.storage_key, id.as_str());

        canvas.set_edit_mode(self.model.is_edit_mode());
        canvas.set_objects_draggable(self.model.is_edit_mode());
        canvas.set_object_scale(self.model.object_scale());
        // `display: block` must be laid out before measuring.
        dom::next_frame(move || canvas.force_resize());
        log::info!("showing plan {id}");
        Ok(())
    }

    /// Show the plan remembered in `localStorage`, else the first one.
    pub fn restore_last_shown(&mut self) -> Option<FloorPlanId> {
        let stored = storage::load_string(&self.session.config.storage_key);
        let target = self.model.restore(stored.as_deref())?;
        self.show_floorplan(&target).ok()?;
        Some(target)
    }

    /// Applies to the shown canvas, widget drags included. Leaving edit mode
    /// flushes the store.
    pub fn set_edit_mode(&mut self, on: bool) {
        if let Some(canvas) = self.shown_canvas() {
            canvas.set_edit_mode(on);
            canvas.set_objects_draggable(on);
        }
        let mut store = self.session.store.borrow_mut();
        self.model.apply_edit_mode(on, &mut store);
    }

    pub fn is_edit_mode(&self) -> bool {
        self.model.is_edit_mode()
    }

    /// Applies to every canvas, and to those created later.
    pub fn set_object_scale(&mut self, scale: f64) {
        self.model.set_object_scale(scale);
        for canvas in self.canvases.values() {
            canvas.set_object_scale(self.model.object_scale());
        }
    }

    pub fn current_plan_id(&self) -> Option<&FloorPlanId> {
        self.model.shown()
    }

    pub fn plan_ids(&self) -> &[FloorPlanId] {
        self.model.plan_ids()
    }

    /// Canvas for `id` if one was already built. Never creates one.
    pub fn existing_canvas(&self, id: &FloorPlanId) -> Option<PlanCanvas> {
        self.canvases.get(id).cloned()
    }

    pub fn shown_canvas(&self) -> Option<PlanCanvas> {
        self.model.shown().and_then(|id| self.canvases.get(id).cloned())
    }

    /// Remove every canvas and forget the plan list.
    pub fn clear(&mut self) {
        self.initialize_all_floorplans(Vec::new());
    }

    /// `clear` plus detaching the swipe listeners.
    pub fn destroy(&mut self) {
        self.clear();
        if let Some((start, end)) = self.swipe.take() {
            let _ = self
                .root
                .remove_event_listener_with_callback("touchstart", start.as_ref().unchecked_ref());
            let _ = self
                .root
                .remove_event_listener_with_callback("touchend", end.as_ref().unchecked_ref());
        }
    }

    // ─── Private helpers ─────────────────────────────────────────────────

    fn create_canvas(&mut self, id: &FloorPlanId) -> Result<(), EngineError> {
        let container = dom::create_div(&self.session.document, "floorplan-container")?;
        container.set_id(&format!("floorplan-{}", slug(id.as_str())));
        dom::set_style(&container, "display", "none");
        self.root.append_child(&container).map_err(js_err)?;

        let canvas = PlanCanvas::new(container, id.clone(), Rc::clone(&self.session))?;
        canvas.set_object_scale(self.model.object_scale());
        if let Some(url) = self.images.get(id) {
            canvas.load_plan(url)?;
        }
        self.canvases.insert(id.clone(), canvas);
        Ok(())
    }
}

fn slug(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

fn screen_x(e: &TouchEvent) -> Option<f64> {
    e.changed_touches().get(0).map(|t| f64::from(t.screen_x()))
}

fn listen_for_swipes(this: &Rc<RefCell<PlanSetManager>>) -> Result<(), EngineError> {
    let weak: Weak<RefCell<PlanSetManager>> = Rc::downgrade(this);
    let start = Closure::<dyn FnMut(TouchEvent)>::wrap(Box::new(move |e: TouchEvent| {
        if let (Some(this), Some(x)) = (weak.upgrade(), screen_x(&e)) {
            this.borrow_mut().model.touch_start(x);
        }
    }));

    let weak: Weak<RefCell<PlanSetManager>> = Rc::downgrade(this);
    let end = Closure::<dyn FnMut(TouchEvent)>::wrap(Box::new(move |e: TouchEvent| {
        let (Some(this), Some(x)) = (weak.upgrade(), screen_x(&e)) else {
            return;
        };
        let mut manager = this.borrow_mut();
        if let Some(target) = manager.model.touch_end(x) {
            log::debug!("swipe to plan {target}");
            let _ = manager.show_floorplan(&target);
        }
    }));

    let mut manager = this.borrow_mut();
    manager
        .root
        .add_event_listener_with_callback("touchstart", start.as_ref().unchecked_ref())
        .map_err(js_err)?;
    manager
        .root
        .add_event_listener_with_callback("touchend", end.as_ref().unchecked_ref())
        .map_err(js_err)?;
    manager.swipe = Some((start, end));
    Ok(())
}
