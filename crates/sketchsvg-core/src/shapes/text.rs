//! Text annotation shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use uuid::Uuid;

/// A text annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Anchor position (x, baseline y) in canvas coordinates.
    pub position: Point,
    /// The text content.
    pub content: String,
    /// Font size in canvas units.
    font_size: f64,
    /// Style properties.
    pub style: ShapeStyle,
    /// Bounding box measured by the rendering surface after the last layout.
    /// Uses a Cell so the renderer can record it while holding a shared borrow.
    #[serde(skip)]
    measured_bounds: Cell<Option<Rect>>,
}

impl Text {
    /// Font size of newly created annotations.
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;

    /// Smallest font size a resize gesture can produce.
    pub const MIN_FONT_SIZE: f64 = 5.0;

    /// Create a new text annotation.
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            style: ShapeStyle::text(),
            measured_bounds: Cell::new(None),
        }
    }

    /// Set the initial font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.set_font_size(size);
        self
    }

    /// Get the font size.
    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Set the font size, never going below [`Text::MIN_FONT_SIZE`].
    ///
    /// Clears the measured bounds, which no longer match the layout.
    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = size.max(Self::MIN_FONT_SIZE);
        self.measured_bounds.set(None);
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Record the bounding box reported by the rendering surface.
    pub fn set_measured_bounds(&self, bounds: Rect) {
        self.measured_bounds.set(Some(bounds));
    }

    /// Font size for a corner-handle drag: grows by a quarter of the Euclidean
    /// drag distance.
    pub fn handle_resize_size(original: f64, drag: Vec2) -> f64 {
        (original + drag.hypot() / 4.0).max(Self::MIN_FONT_SIZE)
    }

    /// Font size for a drag on the text body: follows half the horizontal delta.
    pub fn body_resize_size(original: f64, dx: f64) -> f64 {
        (original + dx / 2.0).max(Self::MIN_FONT_SIZE)
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    /// Measured bounding box, or a zero-size box if the text has not been laid out.
    fn bounds(&self) -> Rect {
        self.measured_bounds.get().unwrap_or(Rect::ZERO)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }
}
