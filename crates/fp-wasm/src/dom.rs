//! Small `web-sys` helpers shared by the bridge modules.

use fp_core::{EngineError, NormalizedPosition, Rect, Size};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, Window};

pub fn js_err(value: JsValue) -> EngineError {
    EngineError::Dom(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}

pub fn window() -> Result<Window, EngineError> {
    web_sys::window().ok_or_else(|| EngineError::Dom("no window".into()))
}

pub fn document() -> Result<Document, EngineError> {
    window()?
        .document()
        .ok_or_else(|| EngineError::Dom("no document".into()))
}

/// Create a `<div>` with the given class.
pub fn create_div(document: &Document, class: &str) -> Result<HtmlElement, EngineError> {
    let el = document
        .create_element("div")
        .map_err(js_err)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| EngineError::Dom("div is not an HtmlElement".into()))?;
    el.set_class_name(class);
    Ok(el)
}

pub fn set_styles(el: &HtmlElement, props: &[(&str, &str)]) {
    let style = el.style();
    for (name, value) in props {
        if let Err(e) = style.set_property(name, value) {
            log::warn!("style {name}: {}", js_err(e));
        }
    }
}

pub fn set_style(el: &HtmlElement, name: &str, value: &str) {
    set_styles(el, &[(name, value)]);
}

pub fn client_rect(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

pub fn client_size(el: &Element) -> Size {
    client_rect(el).size()
}

/// Client-space padding box: what percentage `left/top` of children and
/// `left/top` pixel offsets are measured against.
pub fn padding_rect(el: &Element) -> Rect {
    client_rect(el).padding_box(
        f64::from(el.client_left()),
        f64::from(el.client_top()),
        f64::from(el.client_width()),
        f64::from(el.client_height()),
    )
}

/// Place an element on its surface: percentage `left/top`, centered on the
/// coordinate via `transform`.
pub fn place(el: &HtmlElement, position: NormalizedPosition, transform: &str) {
    set_styles(
        el,
        &[
            ("position", "absolute"),
            ("left", position.css_left().as_str()),
            ("top", position.css_top().as_str()),
            ("transform", transform),
        ],
    );
}

/// Run `f` on the next animation frame, or right away without a window.
pub fn next_frame(f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        f();
        return;
    };
    // `once_into_js` frees the closure after its single call.
    let cb = Closure::once_into_js(f);
    if let Err(e) = window.request_animation_frame(cb.unchecked_ref()) {
        log::warn!("requestAnimationFrame failed: {}", js_err(e));
    }
}
