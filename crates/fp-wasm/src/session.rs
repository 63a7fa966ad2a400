//! State shared by every canvas of one engine instance.

use crate::widget::WidgetFactory;
use fp_core::{EngineConfig, OverlayContext, PositionStore};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::Document;

pub struct Session {
    pub config: EngineConfig,
    pub document: Document,
    /// One store for the whole session. It outlives every canvas.
    pub store: Rc<RefCell<PositionStore>>,
    pub overlay: Rc<RefCell<OverlayContext>>,
    pub factory: Box<dyn WidgetFactory>,
}
