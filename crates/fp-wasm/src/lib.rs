//! WASM bridge for the floor-plan engine.
//!
//! Compiled via `wasm-pack build --target web`. The host page creates one
//! [`FloorplanEngine`] per dashboard, hands it a root element and a save
//! callback, and drives it through plain strings and JSON.

mod anchor;
mod dom;
mod drag;
mod outbox;
mod plan_canvas;
mod plan_set;
mod session;
mod storage;
mod timers;
mod widget;

pub use drag::DragController;
pub use outbox::SaveOutbox;
pub use plan_canvas::PlanCanvas;
pub use plan_set::{PlanDescriptor, PlanSetManager};
pub use session::Session;
pub use timers::BrowserTimers;
pub use widget::{DefaultWidgetFactory, DomWidget, Widget, WidgetFactory};

use fp_core::{
    EngineConfig, EngineError, FloorPlanId, ObjectConfig, ObjectId, OverlayContext, PositionEntry,
    PositionStore,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

/// The JS-facing engine.
///
/// Owns the session-wide position store and the plan set. Every call that can
/// fail returns a `Result` whose error is the `EngineError` message.
///
/// The save callback runs after the engine has released its own state, so it
/// may read the engine back (`positions_json`, `has_pending_save`, ...).
#[wasm_bindgen]
pub struct FloorplanEngine {
    session: Rc<Session>,
    plans: Rc<RefCell<PlanSetManager>>,
    outbox: Rc<SaveOutbox>,
}

#[wasm_bindgen]
impl FloorplanEngine {
    /// `config_json` may be empty. `on_save` is called as
    /// `on_save(planId, entriesJson)` once per changed plan.
    #[wasm_bindgen(constructor)]
    pub fn new(
        root: HtmlElement,
        config_json: &str,
        on_save: js_sys::Function,
    ) -> Result<FloorplanEngine, JsValue> {
        console_error_panic_hook_setup();
        init_logging();

        let config = EngineConfig::from_json(config_json).map_err(to_js)?;
        let outbox = Rc::new(SaveOutbox::new(move |plan: &FloorPlanId, json: &str| {
            let plan = JsValue::from_str(plan.as_str());
            if let Err(e) = on_save.call2(&JsValue::NULL, &plan, &JsValue::from_str(json)) {
                log::error!("save callback failed: {e:?}");
            }
        }));

        let timers = BrowserTimers::new();
        let queue = Rc::clone(&outbox);
        let store = Rc::new(RefCell::new(PositionStore::new(
            Box::new(timers.clone()),
            config.save_debounce_ms,
            Box::new(move |plan: &FloorPlanId, entries: &[PositionEntry]| {
                queue.push(plan, entries);
            }),
        )));

        let weak = Rc::downgrade(&store);
        let fired = Rc::clone(&outbox);
        timers.on_fire(move |handle| {
            let Some(store) = weak.upgrade() else {
                return;
            };
            match store.try_borrow_mut() {
                Ok(mut store) => store.timer_fired(handle),
                Err(_) => log::warn!("store busy, save timer {handle:?} skipped"),
            }
            fired.deliver();
        });

        let session = Rc::new(Session {
            config,
            document: dom::document().map_err(to_js)?,
            store,
            overlay: Rc::new(RefCell::new(OverlayContext::new())),
            factory: Box::new(DefaultWidgetFactory),
        });
        let plans = PlanSetManager::install(root, Rc::clone(&session)).map_err(to_js)?;
        log::info!("floorplan engine ready");
        Ok(Self {
            session,
            plans,
            outbox,
        })
    }

    // ─── Plans ───────────────────────────────────────────────────────────

    /// Register plans from `[{"id": "...", "imageUrl": "..."}]`, tearing down
    /// any existing canvases.
    pub fn init_plans(&self, json: &str) -> Result<(), JsValue> {
        let plans: Vec<PlanDescriptor> = serde_json::from_str(json)
            .map_err(EngineError::from)
            .map_err(to_js)?;
        self.plans.borrow_mut().initialize_all_floorplans(plans);
        Ok(())
    }

    /// Show a plan. Returns `false` for an unknown id.
    pub fn show(&self, plan_id: &str) -> bool {
        self.plans
            .borrow_mut()
            .show_floorplan(&FloorPlanId::new(plan_id))
            .is_ok()
    }

    /// Show the last shown plan (or the first). Returns its id.
    pub fn restore_last_shown(&self) -> Option<String> {
        self.plans
            .borrow_mut()
            .restore_last_shown()
            .map(|id| id.as_str().to_string())
    }

    pub fn current_plan_id(&self) -> Option<String> {
        self.plans
            .borrow()
            .current_plan_id()
            .map(|id| id.as_str().to_string())
    }

    /// JSON array of plan ids, in display order.
    pub fn plan_ids(&self) -> String {
        serde_json::to_string(self.plans.borrow().plan_ids()).unwrap_or_else(|_| "[]".into())
    }

    pub fn clear(&self) {
        self.plans.borrow_mut().clear();
    }

    // ─── Modes ───────────────────────────────────────────────────────────

    pub fn set_edit_mode(&self, on: bool) {
        self.plans.borrow_mut().set_edit_mode(on);
        self.outbox.deliver();
    }

    pub fn is_edit_mode(&self) -> bool {
        self.plans.borrow().is_edit_mode()
    }

    pub fn set_object_scale(&self, scale: f64) {
        self.plans.borrow_mut().set_object_scale(scale);
    }

    /// Re-fit the shown plan, e.g. after the host changed its layout.
    pub fn force_resize(&self) {
        if let Some(canvas) = self.plans.borrow().shown_canvas() {
            canvas.force_resize();
        }
    }

    // ─── Positions ───────────────────────────────────────────────────────

    /// Hydrate a plan from its persisted JSON. Never triggers a save. A canvas
    /// already built for the plan picks the positions up.
    /// Returns the number of entries read.
    pub fn load_positions(&self, plan_id: &str, json: &str) -> Result<u32, JsValue> {
        let plan = FloorPlanId::new(plan_id);
        let count = self
            .session
            .store
            .borrow_mut()
            .load_positions_json(&plan, json)
            .map_err(to_js)?;
        let canvas = self.plans.borrow().existing_canvas(&plan);
        if let Some(canvas) = canvas {
            canvas.sync_positions();
        }
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Current snapshot of a plan in the persisted JSON shape.
    pub fn positions_json(&self, plan_id: &str) -> String {
        let entries = self
            .session
            .store
            .borrow()
            .positions_for(&FloorPlanId::new(plan_id));
        serde_json::to_string(&entries).unwrap_or_else(|_| "[]".into())
    }

    /// Save every pending change now.
    pub fn force_save(&self) {
        self.session.store.borrow_mut().force_save();
        self.outbox.deliver();
    }

    pub fn has_pending_save(&self) -> bool {
        self.session.store.borrow().has_pending_save()
    }

    // ─── Objects ─────────────────────────────────────────────────────────

    /// Add a widget from `{"entity_id": ..., "position"?: {...}, "state"?: {...}}`.
    pub fn create_object(&self, plan_id: &str, config_json: &str) -> Result<(), JsValue> {
        let config: ObjectConfig = serde_json::from_str(config_json)
            .map_err(EngineError::from)
            .map_err(to_js)?;
        let canvas = self
            .plans
            .borrow_mut()
            .canvas(&FloorPlanId::new(plan_id))
            .map_err(to_js)?;
        canvas.create_object(config).map_err(to_js)
    }

    /// Remove a widget and its stored position.
    pub fn delete_object(&self, plan_id: &str, object_id: &str) -> bool {
        let canvas = self.plans.borrow_mut().canvas(&FloorPlanId::new(plan_id));
        match canvas {
            Ok(canvas) => canvas.delete_object(&ObjectId::new(object_id)),
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    /// Forward a raw state payload to a widget. Returns `false` if absent.
    pub fn update_object_state(
        &self,
        plan_id: &str,
        object_id: &str,
        state_json: &str,
    ) -> Result<bool, JsValue> {
        let state: serde_json::Value = serde_json::from_str(state_json)
            .map_err(EngineError::from)
            .map_err(to_js)?;
        let canvas = self
            .plans
            .borrow_mut()
            .canvas(&FloorPlanId::new(plan_id))
            .map_err(to_js)?;
        Ok(canvas.update_object_state(&ObjectId::new(object_id), state))
    }

    /// JSON array of the object ids on a plan.
    pub fn object_ids(&self, plan_id: &str) -> String {
        let ids = self
            .plans
            .borrow_mut()
            .canvas(&FloorPlanId::new(plan_id))
            .map(|c| c.object_ids())
            .unwrap_or_default();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".into())
    }

    // ─── Overlays ────────────────────────────────────────────────────────

    /// Mark an overlay as open; drags will not start until it closes.
    /// Returns the id of the overlay it replaced, if any.
    pub fn open_overlay(&self, id: &str) -> Option<String> {
        self.session.overlay.borrow_mut().open(id)
    }

    pub fn close_overlay(&self, id: &str) -> bool {
        self.session.overlay.borrow_mut().close(id)
    }

    pub fn has_open_overlay(&self) -> bool {
        self.session.overlay.borrow().has_open()
    }

    // ─── Teardown ────────────────────────────────────────────────────────

    /// Flush pending saves, remove every canvas and listener, and drop all
    /// positions.
    pub fn destroy(&self) {
        let mut store = self.session.store.borrow_mut();
        if store.has_pending_save() {
            store.force_save();
        }
        store.cleanup();
        drop(store);
        self.plans.borrow_mut().destroy();
        self.session.overlay.borrow_mut().close_all();
        self.outbox.deliver();
    }
}

// ─── Private helpers ─────────────────────────────────────────────────────

fn to_js(e: EngineError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            if console_log::init_with_level(log::Level::Debug).is_err() {
                web_sys::console::warn_1(&"floorplan: logger already installed".into());
            }
        });
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("floorplan WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
