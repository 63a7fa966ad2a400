//! Coordinate spaces and scale-to-fit math.
//!
//! Three spaces are in play:
//!
//! - **Client** pixels: absolute viewport coordinates, as reported by
//!   `getBoundingClientRect()` and pointer events.
//! - **Surface** pixels: relative to the drag surface's top-left corner.
//! - **Normalized**: `[0,1]²`, surface pixels divided by surface size.
//!
//! Only normalized positions are ever stored. Pixel placement is recomputed
//! from them on every resize.

use serde::{Deserialize, Serialize};

/// Width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A size with a zero (or negative) side cannot define a coordinate space.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

/// A point in pixels. Whether it is client- or surface-relative depends on
/// the caller; conversions are explicit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: PixelPoint, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn origin(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive on every edge.
    pub fn contains(&self, p: PixelPoint) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Convert a client-space point into coordinates relative to this rect's
    /// top-left corner.
    pub fn to_local(&self, p: PixelPoint) -> PixelPoint {
        PixelPoint::new(p.x - self.x, p.y - self.y)
    }

    /// Inverse of [`Rect::to_local`].
    pub fn to_client(&self, local: PixelPoint) -> PixelPoint {
        PixelPoint::new(local.x + self.x, local.y + self.y)
    }

    /// The padding box inside this border box, given the element's
    /// `clientLeft/Top/Width/Height`. Percentage `left/top` on absolutely
    /// positioned children resolve against this box, not the border box.
    pub fn padding_box(&self, border_left: f64, border_top: f64, width: f64, height: f64) -> Rect {
        Rect::new(self.x + border_left, self.y + border_top, width, height)
    }
}

/// Resolution-independent position relative to a drag surface.
///
/// Both axes are kept in `[0,1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPosition {
    pub x: f64,
    pub y: f64,
}

impl Default for NormalizedPosition {
    fn default() -> Self {
        Self::CENTER
    }
}

impl NormalizedPosition {
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };

    /// Build a position, clamping both axes into `[0,1]`. NaN collapses to 0.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// Normalize a surface-relative pixel point against the surface size.
    ///
    /// Returns `None` when the surface has no area.
    pub fn from_surface_pixels(p: PixelPoint, surface: Size) -> Option<Self> {
        if surface.is_empty() {
            return None;
        }
        Some(Self::new(p.x / surface.width, p.y / surface.height))
    }

    /// Pixel placement of this position on a surface of the given size.
    pub fn to_surface_pixels(&self, surface: Size) -> PixelPoint {
        PixelPoint::new(self.x * surface.width, self.y * surface.height)
    }

    /// CSS `left` value as a percentage of the drag surface.
    pub fn css_left(&self) -> String {
        format!("{}%", self.x * 100.0)
    }

    /// CSS `top` value as a percentage of the drag surface.
    pub fn css_top(&self) -> String {
        format!("{}%", self.y * 100.0)
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Result of fitting an image into a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    /// Uniform scale factor applied to the image's natural size.
    pub scale: f64,
    /// The scaled image box, container-relative. The drag surface matches it.
    pub surface: Rect,
}

/// Uniform scale-to-fit: `s = min(Wc/Wi, Hc/Hi)`, centered in the container.
///
/// Returns `None` if either size is empty; callers skip the cycle and retry on
/// the next resize.
pub fn fit_contain(container: Size, image: Size) -> Option<Fit> {
    if container.is_empty() || image.is_empty() {
        return None;
    }
    let scale = (container.width / image.width).min(container.height / image.height);
    let scaled = image.scaled(scale);
    let x = (container.width - scaled.width) / 2.0;
    let y = (container.height - scaled.height) / 2.0;
    Some(Fit {
        scale,
        surface: Rect::new(x, y, scaled.width, scaled.height),
    })
}
