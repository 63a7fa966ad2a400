//! One plan's visual surface.
//!
//! DOM layout inside the plan's container:
//!
//! ```text
//! container (.floorplan-container, relative)
//! ├── measurement div   always laid out, used when the container is hidden
//! ├── img.floorplan-image
//! └── drag surface (.floorplan-drag-container), sized to the scaled image
//!     ├── .trash-icon
//!     └── widgets…
//! ```
//!
//! Geometry and bookkeeping live in [`CanvasModel`]; this module only applies
//! it to elements and listens for resize, image load and drops.

use crate::anchor;
use crate::dom::{self, js_err};
use crate::drag::DragController;
use crate::session::Session;
use crate::widget::Widget;
use fp_core::{EngineError, FloorPlanId, ObjectConfig, ObjectId, PixelPoint, Size, WidgetRecord};
use fp_editor::{AnchorPoll, CanvasModel, ConstraintMode, DropOutcome};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, HtmlImageElement};

const SURFACE_BORDER: &str = "1px solid #CCCCCC";
const SURFACE_BORDER_EDIT: &str = "3px solid #4CAF50";
const SURFACE_OUTLINE_EDIT: &str = "2px dashed #2E7D32";
const CENTERED: &str = "translate(-50%, -50%)";

struct CanvasInner {
    model: CanvasModel,
    session: Rc<Session>,
    container: HtmlElement,
    measure: HtmlElement,
    surface: HtmlElement,
    trash: HtmlElement,
    image: Option<HtmlImageElement>,
    widgets: BTreeMap<ObjectId, Box<dyn Widget>>,
    drags: BTreeMap<ObjectId, DragController>,
    trash_drag: Option<DragController>,
    resize_timer: Option<Timeout>,
    on_resize: Option<Closure<dyn FnMut()>>,
    on_image_load: Option<Closure<dyn FnMut()>>,
}

/// Cheap to clone; clones share the same canvas.
#[derive(Clone)]
pub struct PlanCanvas {
    inner: Rc<RefCell<CanvasInner>>,
}

impl PlanCanvas {
    /// Build the canvas DOM inside `container`. The trash takes its stored
    /// position, if any.
    pub fn new(
        container: HtmlElement,
        plan: FloorPlanId,
        session: Rc<Session>,
    ) -> Result<Self, EngineError> {
        let doc = &session.document;
        let prefix = if container.id().is_empty() {
            "floorplan".to_string()
        } else {
            container.id()
        };

        container.class_list().add_1("floorplan-container").map_err(js_err)?;
        dom::set_styles(&container, &[("position", "relative"), ("overflow", "hidden")]);

        let measure = dom::create_div(doc, "floorplan-measure")?;
        dom::set_styles(
            &measure,
            &[
                ("position", "absolute"),
                ("top", "0"),
                ("left", "0"),
                ("width", "100%"),
                ("height", "100%"),
                ("pointer-events", "none"),
                ("visibility", "hidden"),
                ("z-index", "-1"),
            ],
        );

        let surface = dom::create_div(doc, "floorplan-drag-container")?;
        surface.set_id(&format!("{prefix}-drag-container"));
        dom::set_styles(
            &surface,
            &[
                ("position", "absolute"),
                ("top", "50%"),
                ("left", "50%"),
                ("width", "100%"),
                ("height", "100%"),
                ("transform", CENTERED),
                ("border", SURFACE_BORDER),
                ("pointer-events", "auto"),
            ],
        );

        let trash = dom::create_div(doc, "trash-icon")?;
        trash.set_id(&format!("{prefix}-trash-icon"));
        trash.set_inner_html(r#"<i class="fas fa-trash-alt"></i>"#);
        let trash_px = format!("{}px", session.config.trash_size_px);
        dom::set_styles(
            &trash,
            &[
                ("display", "none"),
                ("position", "absolute"),
                ("width", trash_px.as_str()),
                ("height", trash_px.as_str()),
                ("background", "#f44336"),
                ("border-radius", "50%"),
                ("align-items", "center"),
                ("justify-content", "center"),
                ("color", "white"),
                ("font-size", "20px"),
                ("cursor", "move"),
                ("z-index", "99"),
            ],
        );

        container.append_child(&measure).map_err(js_err)?;
        container.append_child(&surface).map_err(js_err)?;
        surface.append_child(&trash).map_err(js_err)?;

        let mut model = CanvasModel::new(plan.clone(), &session.config);
        if let Some(stored) = session
            .store
            .borrow()
            .get_position_in(&plan, &ObjectId::trash())
        {
            model.set_trash_position(stored);
        }
        dom::place(&trash, model.trash_position(), CENTERED);

        let canvas = Self {
            inner: Rc::new(RefCell::new(CanvasInner {
                model,
                session,
                container,
                measure,
                surface,
                trash,
                image: None,
                widgets: BTreeMap::new(),
                drags: BTreeMap::new(),
                trash_drag: None,
                resize_timer: None,
                on_resize: None,
                on_image_load: None,
            })),
        };
        canvas.listen_for_resize()?;
        log::debug!("plan {plan}: canvas created");
        Ok(canvas)
    }

    pub fn plan(&self) -> FloorPlanId {
        self.inner.borrow().model.plan().clone()
    }

    pub fn container(&self) -> HtmlElement {
        self.inner.borrow().container.clone()
    }

    // ─── Image ───────────────────────────────────────────────────────────

    /// Load the plan image from `url`. Fit and placement run once it loads.
    pub fn load_plan(&self, url: &str) -> Result<(), EngineError> {
        let img = self
            .inner
            .borrow()
            .session
            .document
            .create_element("img")
            .map_err(js_err)?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| EngineError::Dom("img is not an HtmlImageElement".into()))?;
        self.install_image(img.clone());
        img.set_src(url);
        Ok(())
    }

    /// Use a copy of an already loaded image.
    pub fn load_plan_from_image(&self, source: &HtmlImageElement) -> Result<(), EngineError> {
        let img = source
            .clone_node_with_deep(true)
            .map_err(js_err)?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| EngineError::Dom("clone is not an HtmlImageElement".into()))?;
        self.install_image(img.clone());
        if img.complete() && img.natural_width() > 0 {
            let weak = Rc::downgrade(&self.inner);
            dom::next_frame(move || image_ready(&weak));
        }
        Ok(())
    }

    fn install_image(&self, img: HtmlImageElement) {
        let mut inner = self.inner.borrow_mut();
        if let Some(old) = inner.image.take() {
            old.set_onload(None);
            old.remove();
        }
        img.set_class_name("floorplan-image");
        dom::set_styles(&img, &[("max-width", "100%"), ("max-height", "100%")]);

        let weak = Rc::downgrade(&self.inner);
        let onload = Closure::<dyn FnMut()>::wrap(Box::new(move || image_ready(&weak)));
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        inner.on_image_load = Some(onload);
        inner.image = Some(img);
    }

    /// Rerun the fit and placement, e.g. after the container was unhidden.
    pub fn force_resize(&self) {
        refit(&mut self.inner.borrow_mut());
    }

    pub fn set_visible(&self, visible: bool) {
        let inner = self.inner.borrow();
        dom::set_style(
            &inner.container,
            "display",
            if visible { "block" } else { "none" },
        );
    }

    // ─── Objects ─────────────────────────────────────────────────────────

    /// Attach an already built widget at its own position.
    pub fn add_object(&self, widget: Box<dyn Widget>) -> Result<(), EngineError> {
        let id = widget.object_id().clone();
        let draggable = {
            let mut inner = self.inner.borrow_mut();
            let inner = &mut *inner;
            if let Some(mut old) = inner.widgets.remove(&id) {
                inner.drags.remove(&id);
                old.destroy();
            }
            let mut widget = widget;
            inner.surface.append_child(widget.element()).map_err(js_err)?;
            let position = widget.position();
            widget.set_position(position, &inner.model.widget_transform());
            inner.model.attach(id.clone(), position);
            inner.widgets.insert(id.clone(), widget);
            inner.model.objects_draggable()
        };
        if draggable {
            enable_widget_drag(&self.inner, id);
        }
        Ok(())
    }

    /// Destroy a widget without touching the store.
    pub fn remove_object(&self, id: &ObjectId) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.drags.remove(id);
        inner.model.detach(id);
        match inner.widgets.remove(id) {
            Some(mut widget) => {
                widget.destroy();
                true
            }
            None => false,
        }
    }

    /// Create a widget from a host request. Position priority: stored, then
    /// requested, then the surface center. New positions are recorded without
    /// triggering a save. An existing object only gets its state refreshed.
    pub fn create_object(&self, config: ObjectConfig) -> Result<(), EngineError> {
        let ObjectConfig {
            entity_id,
            position,
            state,
        } = config;
        if self.update_object_state(&entity_id, state.clone()) {
            return Ok(());
        }

        let (plan, session) = {
            let inner = self.inner.borrow();
            (inner.model.plan().clone(), Rc::clone(&inner.session))
        };
        let stored = session.store.borrow().get_position_in(&plan, &entity_id);
        let position = CanvasModel::initial_position(stored, position);
        if stored.is_none() {
            session
                .store
                .borrow_mut()
                .update_position_in(&plan, entity_id.clone(), position, true);
        }

        let record = WidgetRecord::new(entity_id, position, state);
        let widget = session.factory.create(&session.document, record)?;
        self.add_object(widget)
    }

    /// Remove a widget and its stored position.
    pub fn delete_object(&self, id: &ObjectId) -> bool {
        let removed = self.remove_object(id);
        let (plan, store) = {
            let inner = self.inner.borrow();
            (inner.model.plan().clone(), Rc::clone(&inner.session.store))
        };
        let forgotten = store.borrow_mut().remove_position_in(&plan, id);
        if removed || forgotten {
            log::info!("plan {plan}: deleted {id}");
        }
        removed
    }

    pub fn update_object_state(&self, id: &ObjectId, state: serde_json::Value) -> bool {
        match self.inner.borrow_mut().widgets.get_mut(id) {
            Some(widget) => {
                widget.update_state(state);
                true
            }
            None => false,
        }
    }

    /// Re-read the trash and attached objects from the store, e.g. after the
    /// host hydrated positions for a plan that is already on screen.
    pub fn sync_positions(&self) {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        let changed = inner.model.sync_from_store(&inner.session.store.borrow());
        if changed {
            log::debug!("plan {}: positions refreshed from store", inner.model.plan());
            place_all(inner);
        }
    }

    pub fn has_object(&self, id: &ObjectId) -> bool {
        self.inner.borrow().widgets.contains_key(id)
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.inner.borrow().widgets.keys().cloned().collect()
    }

    // ─── Modes ───────────────────────────────────────────────────────────

    pub fn set_edit_mode(&self, on: bool) {
        if on {
            self.enable_edit_mode();
        } else {
            self.disable_edit_mode();
        }
    }

    /// Decorate the canvas and arm the trash. Widget drags are left to
    /// [`PlanCanvas::set_objects_draggable`].
    pub fn enable_edit_mode(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.model.is_edit_mode() {
            return;
        }
        inner.model.set_edit_mode(true);
        let _ = inner.container.class_list().add_2("edit-mode", "trash-active");
        dom::set_style(&inner.trash, "display", "flex");
        dom::set_styles(
            &inner.surface,
            &[
                ("border", SURFACE_BORDER_EDIT),
                ("outline", SURFACE_OUTLINE_EDIT),
                ("outline-offset", "2px"),
            ],
        );

        let weak = Rc::downgrade(&self.inner);
        let on_drop: Box<dyn FnMut(PixelPoint)> = Box::new(move |p| on_trash_drop(&weak, p));
        match DragController::new(
            inner.trash.clone(),
            ConstraintMode::Center,
            Rc::clone(&inner.session.overlay),
            Some(on_drop),
        ) {
            Ok(drag) => inner.trash_drag = Some(drag),
            Err(e) => log::warn!("trash drag unavailable: {e}"),
        }
    }

    pub fn disable_edit_mode(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.model.set_edit_mode(false);
        inner.trash_drag = None;
        let _ = inner.container.class_list().remove_2("edit-mode", "trash-active");
        dom::set_style(&inner.trash, "display", "none");
        dom::set_styles(&inner.surface, &[("border", SURFACE_BORDER), ("outline", "none")]);
    }

    pub fn is_edit_mode(&self) -> bool {
        self.inner.borrow().model.is_edit_mode()
    }

    /// Turn per-widget dragging on or off. Drags only start in edit mode.
    pub fn set_objects_draggable(&self, on: bool) {
        let ids = {
            let mut inner = self.inner.borrow_mut();
            inner.model.set_objects_draggable(on);
            if !inner.model.objects_draggable() {
                inner.drags.clear();
                return;
            }
            inner.widgets.keys().cloned().collect::<Vec<_>>()
        };
        for id in ids {
            enable_widget_drag(&self.inner, id);
        }
    }

    pub fn set_object_scale(&self, scale: f64) {
        let mut inner = self.inner.borrow_mut();
        if inner.model.set_object_scale(scale) {
            place_all(&mut inner);
        }
    }

    // ─── Teardown ────────────────────────────────────────────────────────

    /// Destroy widgets and drags, cancel timers, detach listeners and empty
    /// the container. The store is left alone.
    pub fn cleanup(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.drags.clear();
        inner.trash_drag = None;
        for widget in inner.widgets.values_mut() {
            widget.destroy();
        }
        inner.widgets.clear();
        inner.model.clear_objects();
        inner.resize_timer = None;
        if let Some(cb) = inner.on_resize.take()
            && let Some(window) = web_sys::window()
        {
            let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
        }
        if let Some(img) = inner.image.take() {
            img.set_onload(None);
        }
        inner.on_image_load = None;
        inner.container.set_inner_html("");
        log::debug!("plan {}: canvas cleaned up", inner.model.plan());
    }

    // ─── Private helpers ─────────────────────────────────────────────────

    fn listen_for_resize(&self) -> Result<(), EngineError> {
        let weak = Rc::downgrade(&self.inner);
        let cb = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let delay = inner.borrow().session.config.resize_debounce_ms;
            let weak = Rc::downgrade(&inner);
            // Replacing the previous timeout cancels it.
            inner.borrow_mut().resize_timer = Some(Timeout::new(delay, move || {
                if let Some(inner) = weak.upgrade() {
                    refit(&mut inner.borrow_mut());
                }
            }));
        }));
        dom::window()?
            .add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
            .map_err(js_err)?;
        self.inner.borrow_mut().on_resize = Some(cb);
        Ok(())
    }
}

// ─── Fit & placement ─────────────────────────────────────────────────────

fn image_ready(weak: &Weak<RefCell<CanvasInner>>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let mut inner = inner.borrow_mut();
    let Some(img) = inner.image.clone() else {
        return;
    };
    let natural = Size::new(f64::from(img.natural_width()), f64::from(img.natural_height()));
    inner.model.set_image(natural);
    let surface: &web_sys::Node = inner.surface.as_ref();
    if img.parent_element().is_none()
        && let Err(e) = inner.container.insert_before(&img, Some(surface))
    {
        log::warn!("plan {}: image not attached: {}", inner.model.plan(), js_err(e));
    }
    refit(&mut inner);
}

fn refit(inner: &mut CanvasInner) {
    let measured = CanvasModel::measure(
        dom::client_size(&inner.container),
        dom::client_size(&inner.measure),
    );
    let fit = match inner.model.refit(measured) {
        Ok(fit) => fit,
        Err(e) => {
            log::warn!("plan {}: fit skipped ({e})", inner.model.plan());
            return;
        }
    };
    let width = format!("{}px", fit.surface.width);
    let height = format!("{}px", fit.surface.height);
    if let Some(img) = &inner.image {
        dom::set_styles(
            img,
            &[
                ("width", width.as_str()),
                ("height", height.as_str()),
                ("max-width", "none"),
                ("max-height", "none"),
                ("position", "absolute"),
                ("left", "50%"),
                ("top", "50%"),
                ("transform", CENTERED),
            ],
        );
    }
    dom::set_styles(&inner.surface, &[("width", width.as_str()), ("height", height.as_str())]);
    place_all(inner);
}

fn place_all(inner: &mut CanvasInner) {
    let transform = inner.model.widget_transform();
    for (id, widget) in inner.widgets.iter_mut() {
        if let Some(position) = inner.model.position_of(id) {
            widget.set_position(position, &transform);
        }
    }
    dom::place(&inner.trash, inner.model.trash_position(), CENTERED);
}

// ─── Drag wiring ─────────────────────────────────────────────────────────

/// Make a widget draggable once it sits on a live surface.
fn enable_widget_drag(canvas: &Rc<RefCell<CanvasInner>>, id: ObjectId) {
    let (element, poll) = {
        let inner = canvas.borrow();
        let Some(widget) = inner.widgets.get(&id) else {
            return;
        };
        (
            widget.element().clone(),
            AnchorPoll::from_config(&inner.session.config),
        )
    };
    let weak = Rc::downgrade(canvas);
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = anchor::wait_for_parent(&element, poll).await {
            log::warn!("drag for {id} not enabled: {e}");
            return;
        }
        let Some(canvas) = weak.upgrade() else {
            return;
        };
        let mut inner = canvas.borrow_mut();
        if !inner.model.objects_draggable()
            || !inner.widgets.contains_key(&id)
            || inner.drags.contains_key(&id)
        {
            return;
        }
        let on_drop: Box<dyn FnMut(PixelPoint)> = {
            let weak = Rc::downgrade(&canvas);
            let id = id.clone();
            Box::new(move |p| on_widget_drop(&weak, &id, p))
        };
        match DragController::new(
            element,
            ConstraintMode::Center,
            Rc::clone(&inner.session.overlay),
            Some(on_drop),
        ) {
            Ok(drag) => {
                inner.drags.insert(id, drag);
            }
            Err(e) => log::warn!("drag for {id} not enabled: {e}"),
        }
    });
}

fn on_widget_drop(weak: &Weak<RefCell<CanvasInner>>, id: &ObjectId, local: PixelPoint) {
    let Some(canvas) = weak.upgrade() else {
        return;
    };
    let mut inner = canvas.borrow_mut();
    let inner = &mut *inner;
    let surface = dom::padding_rect(&inner.surface);
    let trash = inner
        .model
        .is_edit_mode()
        .then(|| dom::client_rect(&inner.trash));

    let outcome = {
        let mut store = inner.session.store.borrow_mut();
        inner.model.apply_drop(id, local, surface, trash, &mut store)
    };
    if outcome == DropOutcome::Trashed {
        // The widget's own drag controller is still on the stack.
        let canvas = PlanCanvas {
            inner: Rc::clone(&canvas),
        };
        let id = id.clone();
        wasm_bindgen_futures::spawn_local(async move {
            canvas.remove_object(&id);
        });
        return;
    }
    // Moved or not, the inline pixel offsets from the drag are replaced by
    // the recorded percentages.
    let transform = inner.model.widget_transform();
    if let Some(position) = inner.model.position_of(id)
        && let Some(widget) = inner.widgets.get_mut(id)
    {
        widget.set_position(position, &transform);
    }
}

fn on_trash_drop(weak: &Weak<RefCell<CanvasInner>>, local: PixelPoint) {
    let Some(canvas) = weak.upgrade() else {
        return;
    };
    let mut inner = canvas.borrow_mut();
    let inner = &mut *inner;
    let surface = dom::padding_rect(&inner.surface).size();
    let placed = {
        let mut store = inner.session.store.borrow_mut();
        inner.model.apply_trash_drop(local, surface, &mut store)
    };
    if placed.is_none() {
        log::debug!("plan {}: trash dropped on an empty surface", inner.model.plan());
    }
    dom::place(&inner.trash, inner.model.trash_position(), CENTERED);
}
