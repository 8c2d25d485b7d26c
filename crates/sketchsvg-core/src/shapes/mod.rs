//! Shape definitions for the drawing canvas.

mod freehand;
mod text;

pub use freehand::Freehand;
pub use text::Text;

use kurbo::Rect;
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a shape.
pub type ShapeId = Uuid;

/// Format a number the way it appears in SVG attributes: shortest round-trip
/// representation, no trailing `.0`, and no negative zero.
pub fn format_number(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}")
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn blue() -> Self {
        Self::new(0, 0, 255, 255)
    }

    /// CSS color string for SVG paint attributes.
    ///
    /// Opaque colors use the short hex form when possible (`#000`).
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            let short = [self.r, self.g, self.b].iter().all(|c| c % 17 == 0);
            if short {
                format!("#{:x}{:x}{:x}", self.r / 17, self.g / 17, self.b / 17)
            } else {
                format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
            }
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                format_number(f64::from(self.a) / 255.0)
            )
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color (None = no stroke).
    pub stroke_color: Option<SerializableColor>,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
}

impl ShapeStyle {
    /// Default style for freehand strokes: 2-unit black line, no fill.
    pub fn stroke() -> Self {
        Self {
            stroke_color: Some(SerializableColor::black()),
            stroke_width: 2.0,
            fill_color: None,
        }
    }

    /// Default style for text: black fill, no stroke.
    pub fn text() -> Self {
        Self {
            stroke_color: None,
            stroke_width: 0.0,
            fill_color: Some(SerializableColor::black()),
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::stroke()
    }
}

/// Common interface for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;
}

/// A shape on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Freehand(Freehand),
    Text(Text),
}

impl Shape {
    /// Get the text annotation, if this shape is one.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(text) => Some(text),
            Shape::Freehand(_) => None,
        }
    }

    /// Get the text annotation mutably, if this shape is one.
    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(text) => Some(text),
            Shape::Freehand(_) => None,
        }
    }
}

impl ShapeTrait for Shape {
    fn id(&self) -> ShapeId {
        match self {
            Shape::Freehand(s) => s.id(),
            Shape::Text(s) => s.id(),
        }
    }

    fn bounds(&self) -> Rect {
        match self {
            Shape::Freehand(s) => s.bounds(),
            Shape::Text(s) => s.bounds(),
        }
    }

    fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Freehand(s) => s.style(),
            Shape::Text(s) => s.style(),
        }
    }
}
