pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod overlay;
pub mod store;
pub mod timer;
pub mod widget;

pub use config::EngineConfig;
pub use error::EngineError;
pub use geometry::{Fit, NormalizedPosition, PixelPoint, Rect, Size, fit_contain};
pub use id::{FloorPlanId, ObjectId};
pub use overlay::OverlayContext;
pub use store::{PositionEntry, PositionStore, SaveCallback};
pub use timer::{ManualTimers, TimerHandle, TimerHost};
pub use widget::{ObjectConfig, WidgetKind, WidgetRecord};
