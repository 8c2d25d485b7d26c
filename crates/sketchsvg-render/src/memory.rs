//! Headless surface for tests and non-browser hosts.

use crate::surface::{ElementKind, NodeKey, Surface, SurfaceError};
use kurbo::{Point, Rect};
use sketchsvg_core::camera::ViewBox;
use sketchsvg_core::input::Target;
use sketchsvg_core::widget::Cursor;
use std::collections::BTreeMap;

/// Average glyph advance as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.55;
/// Line height as a fraction of the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// Distance from the top of the line box to the baseline.
const ASCENT_FACTOR: f64 = 0.8;

/// An element stored by [`MemorySurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: NodeKey,
    pub kind: ElementKind,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub text: String,
}

impl Element {
    fn new(key: NodeKey, kind: ElementKind) -> Self {
        Self {
            key,
            kind,
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: String::new(),
        }
    }

    /// Get an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Get an inline style value.
    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    fn number(&self, name: &str) -> Option<f64> {
        self.attribute(name)?.parse().ok()
    }

    /// Approximate bounding box, mirroring what a browser reports for the
    /// same attributes. Text is laid out on one line per `\n`.
    fn bounds(&self) -> Option<Rect> {
        match self.kind {
            ElementKind::Rect => Some(Rect::from_origin_size(
                (self.number("x")?, self.number("y")?),
                (self.number("width")?, self.number("height")?),
            )),
            ElementKind::Text => {
                let x = self.number("x")?;
                let y = self.number("y")?;
                let size = self.number("font-size")?;
                let lines = self.text.split('\n');
                let line_count = lines.clone().count();
                let widest = lines.map(|line| line.chars().count()).max().unwrap_or(0);
                let top = y - size * ASCENT_FACTOR;
                Some(Rect::new(
                    x,
                    top,
                    x + widest as f64 * size * CHAR_WIDTH_FACTOR,
                    top + line_count as f64 * size * LINE_HEIGHT_FACTOR,
                ))
            }
            ElementKind::Path => path_bounds(self.attribute("d")?),
        }
    }
}

/// Bounds of a path made of `M`/`L` commands with `x,y` pairs.
fn path_bounds(data: &str) -> Option<Rect> {
    data.split_whitespace()
        .filter_map(|command| {
            let (x, y) = command.trim_start_matches(char::is_alphabetic).split_once(',')?;
            Some(Point::new(x.parse().ok()?, y.parse().ok()?))
        })
        .fold(None, |acc: Option<Rect>, point| match acc {
            Some(rect) => Some(rect.union_pt(point)),
            None => Some(Rect::from_points(point, point)),
        })
}

/// In-memory element tree with approximate text metrics.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    elements: Vec<Element>,
    view_box: Option<String>,
    cursor: Option<Cursor>,
}

impl MemorySurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an element.
    pub fn element(&self, key: NodeKey) -> Option<&Element> {
        self.elements.iter().find(|e| e.key == key)
    }

    /// Elements in paint order (back to front).
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The root `viewBox` attribute.
    pub fn view_box(&self) -> Option<&str> {
        self.view_box.as_deref()
    }

    /// The root cursor as a CSS value.
    pub fn cursor(&self) -> Option<&'static str> {
        self.cursor.map(|c| c.as_css())
    }

    /// Resolve the event target under a canvas point, topmost first.
    ///
    /// Paths are not targets: a press on a stroke lands on the canvas.
    pub fn hit_test(&self, point: Point) -> Target {
        self.elements
            .iter()
            .rev()
            .filter(|e| e.kind != ElementKind::Path)
            .find(|e| e.bounds().is_some_and(|b| b.contains(point)))
            .map_or(Target::Canvas, |e| match e.key {
                NodeKey::Shape(id) => Target::Shape(id),
                NodeKey::Handle(corner) => Target::Handle(corner),
            })
    }

    fn element_mut(&mut self, key: NodeKey) -> Result<&mut Element, SurfaceError> {
        self.elements
            .iter_mut()
            .find(|e| e.key == key)
            .ok_or(SurfaceError::NotFound(key))
    }
}

impl Surface for MemorySurface {
    fn ensure_element(&mut self, key: NodeKey, kind: ElementKind) -> Result<(), SurfaceError> {
        if self.element(key).is_none() {
            self.elements.push(Element::new(key, kind));
        }
        Ok(())
    }

    fn set_attribute(&mut self, key: NodeKey, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.element_mut(key)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_style(&mut self, key: NodeKey, property: &str, value: &str) -> Result<(), SurfaceError> {
        self.element_mut(key)?
            .styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn set_text_content(&mut self, key: NodeKey, text: &str) -> Result<(), SurfaceError> {
        self.element_mut(key)?.text = text.to_string();
        Ok(())
    }

    fn remove_element(&mut self, key: NodeKey) -> Result<(), SurfaceError> {
        self.elements.retain(|e| e.key != key);
        Ok(())
    }

    fn set_view_box(&mut self, view_box: &ViewBox) -> Result<(), SurfaceError> {
        self.view_box = Some(view_box.to_string());
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Cursor) -> Result<(), SurfaceError> {
        self.cursor = Some(cursor);
        Ok(())
    }

    fn bbox(&self, key: NodeKey) -> Rect {
        self.element(key)
            .and_then(Element::bounds)
            .unwrap_or(Rect::ZERO)
    }

    fn keys(&self) -> Vec<NodeKey> {
        self.elements.iter().map(|e| e.key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchsvg_core::widget::Corner;
    use uuid::Uuid;

    fn text_element(surface: &mut MemorySurface, content: &str) -> NodeKey {
        let key = NodeKey::Shape(Uuid::new_v4());
        surface.ensure_element(key, ElementKind::Text).unwrap();
        surface.set_attribute(key, "x", "100").unwrap();
        surface.set_attribute(key, "y", "100").unwrap();
        surface.set_attribute(key, "font-size", "20").unwrap();
        surface.set_text_content(key, content).unwrap();
        key
    }

    #[test]
    fn test_text_metrics() {
        let mut surface = MemorySurface::new();
        let key = text_element(&mut surface, "abcd");
        let bbox = surface.bbox(key);
        assert!((bbox.x0 - 100.0).abs() < 1e-9);
        assert!((bbox.y0 - 84.0).abs() < 1e-9);
        assert!((bbox.width() - 44.0).abs() < 1e-9);
        assert!((bbox.height() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_bbox_is_zero() {
        let mut surface = MemorySurface::new();
        assert_eq!(surface.bbox(NodeKey::Handle(Corner::NorthWest)), Rect::ZERO);

        let key = NodeKey::Shape(Uuid::new_v4());
        surface.ensure_element(key, ElementKind::Text).unwrap();
        assert_eq!(surface.bbox(key), Rect::ZERO);
    }

    #[test]
    fn test_path_bounds() {
        let mut surface = MemorySurface::new();
        let key = NodeKey::Shape(Uuid::new_v4());
        surface.ensure_element(key, ElementKind::Path).unwrap();
        surface.set_attribute(key, "d", "M10,10 L20,5 L15,30").unwrap();
        assert_eq!(surface.bbox(key), Rect::new(10.0, 5.0, 20.0, 30.0));
    }

    #[test]
    fn test_missing_element_errors() {
        let mut surface = MemorySurface::new();
        let key = NodeKey::Shape(Uuid::new_v4());
        assert_eq!(
            surface.set_attribute(key, "x", "1"),
            Err(SurfaceError::NotFound(key))
        );
        assert!(surface.remove_element(key).is_ok());
    }

    #[test]
    fn test_ensure_element_keeps_order() {
        let mut surface = MemorySurface::new();
        let first = text_element(&mut surface, "a");
        let second = text_element(&mut surface, "b");
        surface.ensure_element(first, ElementKind::Text).unwrap();
        assert_eq!(surface.keys(), vec![first, second]);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut surface = MemorySurface::new();
        let key = text_element(&mut surface, "abcd");
        let handle = NodeKey::Handle(Corner::NorthWest);
        surface.ensure_element(handle, ElementKind::Rect).unwrap();
        for (name, value) in [("x", "96"), ("y", "80"), ("width", "8"), ("height", "8")] {
            surface.set_attribute(handle, name, value).unwrap();
        }

        assert_eq!(surface.hit_test(Point::new(101.0, 86.0)), Target::Handle(Corner::NorthWest));
        let NodeKey::Shape(id) = key else { unreachable!() };
        assert_eq!(surface.hit_test(Point::new(130.0, 95.0)), Target::Shape(id));
        assert_eq!(surface.hit_test(Point::new(0.0, 0.0)), Target::Canvas);
    }
}
