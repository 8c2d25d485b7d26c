//! Camera module for pan/zoom of the SVG viewBox.

use crate::shapes::format_number;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height of the logical drawing canvas, in SVG user units.
pub const CANVAS_SIZE: f64 = 1000.0;

/// Scale change applied by one zoom step (one wheel notch).
pub const ZOOM_STEP: f64 = 0.1;

/// Direction of a zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Map a wheel delta to a zoom direction (scrolling down zooms out).
    pub fn from_wheel_delta(delta_y: f64) -> Self {
        if delta_y > 0.0 {
            ZoomDirection::Out
        } else {
            ZoomDirection::In
        }
    }

    fn sign(self) -> f64 {
        match self {
            ZoomDirection::In => 1.0,
            ZoomDirection::Out => -1.0,
        }
    }
}

/// The rectangle of canvas space currently mapped onto the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl fmt::Display for ViewBox {
    /// Formats as the value of an SVG `viewBox` attribute.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            format_number(self.x),
            format_number(self.y),
            format_number(self.width),
            format_number(self.height)
        )
    }
}

/// Camera holds the pan offset and zoom scale of the canvas view.
///
/// The pan offset is expressed in device units: dragging the pointer by
/// `(dx, dy)` moves the offset by the same amount, and the visible viewBox
/// origin moves by `-(dx, dy) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current pan offset.
    pub offset: Vec2,
    /// Current zoom scale (1.0 shows the whole canvas).
    pub scale: f64,
    /// Minimum allowed scale.
    pub min_scale: f64,
    /// Maximum allowed scale.
    pub max_scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: 0.1,
            max_scale: 4.0,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the visible viewBox from the pan offset and scale.
    pub fn view_box(&self) -> ViewBox {
        ViewBox {
            x: -self.offset.x / self.scale,
            y: -self.offset.y / self.scale,
            width: CANVAS_SIZE / self.scale,
            height: CANVAS_SIZE / self.scale,
        }
    }

    /// Step the scale by `amount` in the given direction, clamped to the
    /// allowed range. Returns true if the scale changed.
    pub fn zoom(&mut self, direction: ZoomDirection, amount: f64) -> bool {
        let new_scale =
            (self.scale + direction.sign() * amount).clamp(self.min_scale, self.max_scale);
        let changed = (new_scale - self.scale).abs() >= f64::EPSILON;
        self.scale = new_scale;
        changed
    }

    /// Anchor for a pan gesture: the pointer position relative to the current offset.
    pub fn pan_anchor(&self, pointer: Point) -> Vec2 {
        pointer.to_vec2() - self.offset
    }

    /// Move the offset so that `anchor` stays under the pointer.
    pub fn drag_pan(&mut self, pointer: Point, anchor: Vec2) {
        self.offset = pointer.to_vec2() - anchor;
    }

    /// Reset camera to default position and scale.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }
}
