//! Constrained drag state machine.
//!
//! Moves one element inside its container. The machine is DOM-free: the
//! bridge feeds it pointer events plus the element/container rectangles
//! measured at that moment, and applies the `left/top` it returns.
//!
//! ## Constraint modes
//!
//! | Mode | Tracked point | Allowed range (container-relative) |
//! |------|---------------|------------------------------------|
//! | `Full` | top-left | `[0, W - w] × [0, H - h]` |
//! | `Center` | center | `[0, W] × [0, H]` |
//!
//! In `Center` mode the element carries a `translate(-50%, -50%)` transform,
//! so its `left/top` style is its center.

use crate::input::PointerInput;
use fp_core::{PixelPoint, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstraintMode {
    /// The whole element stays inside the container.
    Full,
    /// Only the element's center stays inside the container.
    #[default]
    Center,
}

impl ConstraintMode {
    pub fn from_name(name: &str) -> Self {
        match name {
            "full" => ConstraintMode::Full,
            _ => ConstraintMode::Center,
        }
    }

    /// The point of `element` this mode tracks, in the rect's own space.
    fn anchor_of(self, element: Rect) -> PixelPoint {
        match self {
            ConstraintMode::Full => element.origin(),
            ConstraintMode::Center => element.center(),
        }
    }
}

/// Clamp a tracked point (container-relative) according to `mode`.
///
/// `min` is applied last so an element larger than its container pins to the
/// top-left edge instead of panicking like `f64::clamp` would.
pub fn clamp(mode: ConstraintMode, p: PixelPoint, element: Size, container: Size) -> PixelPoint {
    let (max_x, max_y) = match mode {
        ConstraintMode::Full => (
            container.width - element.width,
            container.height - element.height,
        ),
        ConstraintMode::Center => (container.width, container.height),
    };
    PixelPoint::new(p.x.min(max_x).max(0.0), p.y.min(max_y).max(0.0))
}

/// Geometry measured at the time of an event, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragFrame {
    pub element: Rect,
    pub container: Rect,
}

/// What the caller should do after feeding an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEffect {
    /// Event not consumed.
    None,
    /// A drag started; the caller should start listening to document moves.
    Started,
    /// Write this container-relative `left/top` to the element's style.
    MoveTo(PixelPoint),
    /// The drag ended. Carries the final container-relative position
    /// (top-left in `Full` mode, center in `Center` mode). Emitted once per drag.
    Dropped(PixelPoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Dragging,
}

/// `Idle → Dragging → Idle` for one element.
#[derive(Debug, Clone, Default)]
pub struct ConstrainedDrag {
    mode: ConstraintMode,
    phase: Phase,
    /// Pointer position minus the tracked point at press time.
    grab_offset: PixelPoint,
    /// Last position written to the element's style during this drag.
    last: Option<PixelPoint>,
}

impl ConstrainedDrag {
    pub fn new(mode: ConstraintMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ConstraintMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == Phase::Dragging
    }

    /// Feed one pointer event. `input_blocked` is true while an overlay owns
    /// input; a press is then ignored.
    pub fn handle(
        &mut self,
        event: &PointerInput,
        frame: &DragFrame,
        input_blocked: bool,
    ) -> DragEffect {
        match event {
            PointerInput::Down { .. } => {
                if self.is_dragging() || !event.is_primary() || input_blocked {
                    return DragEffect::None;
                }
                let anchor = self.mode.anchor_of(frame.element);
                let p = event.position();
                self.grab_offset = PixelPoint::new(p.x - anchor.x, p.y - anchor.y);
                self.last = None;
                self.phase = Phase::Dragging;
                DragEffect::Started
            }
            PointerInput::Move { .. } => {
                if !self.is_dragging() {
                    return DragEffect::None;
                }
                let p = event.position();
                let tracked = PixelPoint::new(p.x - self.grab_offset.x, p.y - self.grab_offset.y);
                let local = frame.container.to_local(tracked);
                let clamped = clamp(
                    self.mode,
                    local,
                    frame.element.size(),
                    frame.container.size(),
                );
                self.last = Some(clamped);
                DragEffect::MoveTo(clamped)
            }
            PointerInput::Up { .. } => {
                if !self.is_dragging() {
                    return DragEffect::None;
                }
                self.phase = Phase::Idle;
                let final_pos = self.last.take().unwrap_or_else(|| {
                    frame
                        .container
                        .to_local(self.mode.anchor_of(frame.element))
                });
                DragEffect::Dropped(final_pos)
            }
        }
    }

    /// Abort an in-flight drag without reporting a drop.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        self.last = None;
    }
}
