//! Input abstraction layer.
//!
//! Normalizes mouse and pen pointer events into a `PointerInput` enum
//! consumed by the drag state machine. Coordinates are client pixels.

use fp_core::PixelPoint;

/// Button id of the primary (usually left) mouse button.
pub const PRIMARY_BUTTON: i16 = 0;

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    /// Pointer pressed on the draggable element.
    Down { x: f64, y: f64, button: i16 },

    /// Pointer moved anywhere in the document.
    Move { x: f64, y: f64 },

    /// Pointer released anywhere in the document.
    Up { x: f64, y: f64 },
}

impl PointerInput {
    pub fn from_pointer_down(x: f64, y: f64, button: i16) -> Self {
        Self::Down { x, y, button }
    }

    pub fn from_pointer_move(x: f64, y: f64) -> Self {
        Self::Move { x, y }
    }

    pub fn from_pointer_up(x: f64, y: f64) -> Self {
        Self::Up { x, y }
    }

    pub fn position(&self) -> PixelPoint {
        match *self {
            Self::Down { x, y, .. } | Self::Move { x, y } | Self::Up { x, y } => {
                PixelPoint::new(x, y)
            }
        }
    }

    pub fn is_primary(&self) -> bool {
        match self {
            Self::Down { button, .. } => *button == PRIMARY_BUTTON,
            _ => true,
        }
    }
}
