pub mod anchor;
pub mod canvas;
pub mod drag;
pub mod input;
pub mod plan_set;

pub use anchor::{AnchorPoll, PollStep};
pub use canvas::{CanvasModel, DropOutcome};
pub use drag::{ConstrainedDrag, ConstraintMode, DragEffect, DragFrame};
pub use input::PointerInput;
pub use plan_set::{PlanSet, ShowPlan};
