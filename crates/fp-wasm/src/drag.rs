//! DOM side of the constrained drag.
//!
//! A [`DragController`] wires one element to a [`ConstrainedDrag`]: `mousedown`
//! on the element, then `mousemove`/`mouseup` on the document for the duration
//! of the drag only. The element's direct parent is the container.

use crate::dom::{self, js_err};
use fp_core::{EngineError, OverlayContext, PixelPoint};
use fp_editor::{ConstrainedDrag, ConstraintMode, DragEffect, DragFrame, PointerInput};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MouseEvent};

/// Presses landing inside one of these never start a drag.
const OVERLAY_PANEL_SELECTOR: &str = ".context-window";

type MouseHandler = Closure<dyn FnMut(MouseEvent)>;
type DragEndFn = Box<dyn FnMut(PixelPoint)>;

struct Handlers {
    down: MouseHandler,
    moved: MouseHandler,
    up: MouseHandler,
}

struct Shared {
    element: HtmlElement,
    container: HtmlElement,
    document: Document,
    machine: RefCell<ConstrainedDrag>,
    overlay: Rc<RefCell<OverlayContext>>,
    on_drag_end: RefCell<Option<DragEndFn>>,
    handlers: RefCell<Option<Handlers>>,
}

/// Makes one element draggable inside its parent. Dropping the controller
/// detaches every listener.
pub struct DragController {
    shared: Rc<Shared>,
}

impl DragController {
    /// Attach to `element`. Fails if it has no parent element.
    pub fn new(
        element: HtmlElement,
        mode: ConstraintMode,
        overlay: Rc<RefCell<OverlayContext>>,
        on_drag_end: Option<DragEndFn>,
    ) -> Result<Self, EngineError> {
        let container = element
            .parent_element()
            .and_then(|p| p.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| EngineError::MissingContainer(describe(&element)))?;
        let document = dom::document()?;

        dom::set_styles(
            &element,
            &[
                ("position", "absolute"),
                ("cursor", "move"),
                ("user-select", "none"),
            ],
        );

        let shared = Rc::new(Shared {
            element,
            container,
            document,
            machine: RefCell::new(ConstrainedDrag::new(mode)),
            overlay,
            on_drag_end: RefCell::new(on_drag_end),
            handlers: RefCell::new(None),
        });

        let handlers = Handlers {
            down: handler(&shared, on_mouse_down),
            moved: handler(&shared, on_mouse_move),
            up: handler(&shared, on_mouse_up),
        };
        shared
            .element
            .add_event_listener_with_callback("mousedown", handlers.down.as_ref().unchecked_ref())
            .map_err(js_err)?;
        *shared.handlers.borrow_mut() = Some(handlers);

        log::debug!("drag enabled on {} ({mode:?})", describe(&shared.element));
        Ok(Self { shared })
    }

    /// Look the element up by CSS selector first.
    pub fn from_selector(
        selector: &str,
        mode: ConstraintMode,
        overlay: Rc<RefCell<OverlayContext>>,
        on_drag_end: Option<DragEndFn>,
    ) -> Result<Self, EngineError> {
        let element = dom::document()?
            .query_selector(selector)
            .map_err(js_err)?
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| EngineError::MissingElement(selector.to_string()))?;
        Self::new(element, mode, overlay, on_drag_end)
    }

    pub fn is_dragging(&self) -> bool {
        self.shared.machine.borrow().is_dragging()
    }

    /// Remove all listeners. Safe to call more than once.
    pub fn destroy(&self) {
        let Some(handlers) = self.shared.handlers.borrow_mut().take() else {
            return;
        };
        let s = &self.shared;
        let _ = s
            .element
            .remove_event_listener_with_callback("mousedown", handlers.down.as_ref().unchecked_ref());
        let _ = s
            .document
            .remove_event_listener_with_callback("mousemove", handlers.moved.as_ref().unchecked_ref());
        let _ = s
            .document
            .remove_event_listener_with_callback("mouseup", handlers.up.as_ref().unchecked_ref());
        s.machine.borrow_mut().cancel();
        s.on_drag_end.borrow_mut().take();
    }
}

impl Drop for DragController {
    fn drop(&mut self) {
        self.destroy();
    }
}

// ─── Event handlers ──────────────────────────────────────────────────────

fn handler(shared: &Rc<Shared>, f: fn(&Shared, &MouseEvent)) -> MouseHandler {
    let weak: Weak<Shared> = Rc::downgrade(shared);
    Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
        if let Some(shared) = weak.upgrade() {
            f(&shared, &e);
        }
    }))
}

fn on_mouse_down(s: &Shared, e: &MouseEvent) {
    let blocked = s.overlay.borrow().has_open() || lands_in_overlay_panel(e);
    let input = PointerInput::from_pointer_down(
        f64::from(e.client_x()),
        f64::from(e.client_y()),
        e.button(),
    );
    let effect = s.machine.borrow_mut().handle(&input, &frame(s), blocked);
    if effect != DragEffect::Started {
        if blocked {
            log::trace!("drag suppressed by open overlay");
        }
        return;
    }
    e.prevent_default();
    let handlers = s.handlers.borrow();
    let Some(h) = handlers.as_ref() else {
        return;
    };
    for (kind, cb) in [("mousemove", &h.moved), ("mouseup", &h.up)] {
        if let Err(err) = s
            .document
            .add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref())
        {
            log::warn!("{kind} listener: {}", js_err(err));
        }
    }
}

fn on_mouse_move(s: &Shared, e: &MouseEvent) {
    let input = PointerInput::from_pointer_move(f64::from(e.client_x()), f64::from(e.client_y()));
    if let DragEffect::MoveTo(p) = s.machine.borrow_mut().handle(&input, &frame(s), false) {
        dom::set_styles(
            &s.element,
            &[
                ("left", format!("{}px", p.x).as_str()),
                ("top", format!("{}px", p.y).as_str()),
            ],
        );
    }
}

fn on_mouse_up(s: &Shared, e: &MouseEvent) {
    let input = PointerInput::from_pointer_up(f64::from(e.client_x()), f64::from(e.client_y()));
    let effect = s.machine.borrow_mut().handle(&input, &frame(s), false);
    let DragEffect::Dropped(final_pos) = effect else {
        return;
    };
    if let Some(h) = s.handlers.borrow().as_ref() {
        let _ = s
            .document
            .remove_event_listener_with_callback("mousemove", h.moved.as_ref().unchecked_ref());
        let _ = s
            .document
            .remove_event_listener_with_callback("mouseup", h.up.as_ref().unchecked_ref());
    }
    if let Some(cb) = s.on_drag_end.borrow_mut().as_mut() {
        cb(final_pos);
    }
}

// ─── Private helpers ─────────────────────────────────────────────────────

fn frame(s: &Shared) -> DragFrame {
    DragFrame {
        element: dom::client_rect(&s.element),
        container: dom::padding_rect(&s.container),
    }
}

fn lands_in_overlay_panel(e: &MouseEvent) -> bool {
    e.target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(OVERLAY_PANEL_SELECTOR).ok().flatten())
        .is_some()
}

fn describe(el: &HtmlElement) -> String {
    let id = el.id();
    if id.is_empty() {
        format!("<{}>", el.tag_name().to_lowercase())
    } else {
        format!("#{id}")
    }
}
