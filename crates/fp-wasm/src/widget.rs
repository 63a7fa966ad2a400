//! Widgets as DOM elements.
//!
//! The engine only needs a handful of things from a widget: its element, its
//! identity, and where it sits. Everything else about how it looks is up to
//! the [`WidgetFactory`] the host installs; [`DefaultWidgetFactory`] renders a
//! plain labelled badge.

use crate::dom::{self, js_err};
use fp_core::{EngineError, NormalizedPosition, ObjectId, WidgetRecord};
use web_sys::{Document, HtmlElement};

pub trait Widget {
    fn element(&self) -> &HtmlElement;

    fn object_id(&self) -> &ObjectId;

    fn position(&self) -> NormalizedPosition;

    /// Move the widget. `transform` carries the centering and object scale.
    fn set_position(&mut self, position: NormalizedPosition, transform: &str);

    fn update_state(&mut self, state: serde_json::Value);

    /// Detach from the DOM. Called once, before the widget is dropped.
    fn destroy(&mut self);
}

pub trait WidgetFactory {
    fn create(
        &self,
        document: &Document,
        record: WidgetRecord,
    ) -> Result<Box<dyn Widget>, EngineError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultWidgetFactory;

impl WidgetFactory for DefaultWidgetFactory {
    fn create(
        &self,
        document: &Document,
        record: WidgetRecord,
    ) -> Result<Box<dyn Widget>, EngineError> {
        Ok(Box::new(DomWidget::render(document, record)?))
    }
}

/// Minimal widget: a badge with a label line and a state line.
pub struct DomWidget {
    record: WidgetRecord,
    element: HtmlElement,
    label: HtmlElement,
    state: HtmlElement,
}

impl DomWidget {
    pub fn render(document: &Document, record: WidgetRecord) -> Result<Self, EngineError> {
        let element = dom::create_div(
            document,
            &format!("floorplan-object {}", record.kind.css_class()),
        )?;
        element.set_id(&record.object_id.dom_id());
        element
            .set_attribute("data-entity-id", record.object_id.as_str())
            .map_err(js_err)?;
        element.set_title(record.kind.default_label());

        let label = dom::create_div(document, "object-label")?;
        let state = dom::create_div(document, "object-state")?;
        element.append_child(&label).map_err(js_err)?;
        element.append_child(&state).map_err(js_err)?;

        let mut widget = Self {
            record,
            element,
            label,
            state,
        };
        widget.refresh();
        Ok(widget)
    }

    fn refresh(&mut self) {
        self.label.set_text_content(Some(&self.record.label()));
        self.state.set_text_content(Some(&self.record.state_text()));
        self.element
            .set_class_name(&format!("floorplan-object {}", self.record.kind.css_class()));
    }
}

impl Widget for DomWidget {
    fn element(&self) -> &HtmlElement {
        &self.element
    }

    fn object_id(&self) -> &ObjectId {
        &self.record.object_id
    }

    fn position(&self) -> NormalizedPosition {
        self.record.position
    }

    fn set_position(&mut self, position: NormalizedPosition, transform: &str) {
        self.record.position = position;
        dom::place(&self.element, position, transform);
    }

    fn update_state(&mut self, state: serde_json::Value) {
        self.record.update_state(state);
        self.refresh();
    }

    fn destroy(&mut self) {
        self.element.remove();
    }
}
