//! Retained element surface the renderer draws into.

use kurbo::Rect;
use sketchsvg_core::camera::ViewBox;
use sketchsvg_core::shapes::ShapeId;
use sketchsvg_core::widget::{Corner, Cursor};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Surface errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("Element not found: {0}")]
    NotFound(NodeKey),
    #[error("Invalid element key: {0}")]
    InvalidKey(String),
    #[error("Surface backend error: {0}")]
    Backend(String),
}

/// Identifies one element on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// The element showing a shape.
    Shape(ShapeId),
    /// A resize handle of the selected text.
    Handle(Corner),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Shape(id) => write!(f, "shape:{id}"),
            NodeKey::Handle(corner) => write!(f, "handle:{}", corner.tag()),
        }
    }
}

impl FromStr for NodeKey {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SurfaceError::InvalidKey(s.to_string());
        match s.split_once(':') {
            Some(("shape", id)) => id.parse().map(NodeKey::Shape).map_err(|_| invalid()),
            Some(("handle", tag)) => Corner::from_tag(tag).map(NodeKey::Handle).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

/// Element types the renderer creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Path,
    Text,
    Rect,
}

impl ElementKind {
    /// SVG tag name.
    pub fn tag_name(&self) -> &'static str {
        match self {
            ElementKind::Path => "path",
            ElementKind::Text => "text",
            ElementKind::Rect => "rect",
        }
    }
}

/// A retained-mode drawing surface.
///
/// Elements are created on first use and appended on top of existing ones.
pub trait Surface {
    /// Create the element for `key` if it does not exist yet.
    fn ensure_element(&mut self, key: NodeKey, kind: ElementKind) -> Result<(), SurfaceError>;

    /// Set an attribute on an existing element.
    fn set_attribute(&mut self, key: NodeKey, name: &str, value: &str) -> Result<(), SurfaceError>;

    /// Set an inline style property on an existing element.
    fn set_style(&mut self, key: NodeKey, property: &str, value: &str) -> Result<(), SurfaceError>;

    /// Replace the text content of an existing element.
    fn set_text_content(&mut self, key: NodeKey, text: &str) -> Result<(), SurfaceError>;

    /// Remove an element. Removing a missing element is not an error.
    fn remove_element(&mut self, key: NodeKey) -> Result<(), SurfaceError>;

    /// Set the `viewBox` of the root element.
    fn set_view_box(&mut self, view_box: &ViewBox) -> Result<(), SurfaceError>;

    /// Set the cursor shown over the root element.
    fn set_cursor(&mut self, cursor: Cursor) -> Result<(), SurfaceError>;

    /// Bounding box of an element in canvas coordinates, or `Rect::ZERO` when
    /// it is unknown.
    fn bbox(&self, key: NodeKey) -> Rect;

    /// Keys of all elements currently on the surface.
    fn keys(&self) -> Vec<NodeKey>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_node_key_parse() {
        let id = Uuid::new_v4();
        let key = NodeKey::Shape(id);
        assert_eq!(key.to_string().parse::<NodeKey>(), Ok(key));
        assert_eq!("handle:se".parse::<NodeKey>(), Ok(NodeKey::Handle(Corner::SouthEast)));
        assert!("handle:up".parse::<NodeKey>().is_err());
        assert!("shape:nope".parse::<NodeKey>().is_err());
        assert!("background".parse::<NodeKey>().is_err());
    }
}
