//! Renderer trait abstraction and the SVG scene synchroniser.

use crate::surface::{ElementKind, NodeKey, Surface, SurfaceError};
use peniko::Color;
use sketchsvg_core::canvas::Canvas;
use sketchsvg_core::shapes::{
    format_number, Freehand, SerializableColor, Shape, ShapeStyle, ShapeTrait, Text,
};
use sketchsvg_core::widget::Handle;
use std::collections::HashSet;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render pass.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Fill colour of the resize handles.
    pub handle_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(canvas: &'a Canvas) -> Self {
        Self {
            canvas,
            handle_color: SerializableColor::blue().into(),
        }
    }

    /// Set the handle colour.
    pub fn with_handle_color(mut self, color: Color) -> Self {
        self.handle_color = color;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Bring the surface in line with the canvas.
    fn render(&mut self, ctx: &RenderContext, surface: &mut dyn Surface) -> RenderResult<()>;
}

/// Syncs canvas state into an SVG element tree.
///
/// Every pass writes the viewBox, upserts one element per shape in z-order,
/// measures text and caches the measured bounds on the shape, places the
/// selection handles on those bounds, and removes elements whose shape or
/// handle no longer exists.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    frames: u64,
}

impl SvgRenderer {
    /// Create a new renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed render passes.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn render_freehand(
        &self,
        path: &Freehand,
        surface: &mut dyn Surface,
    ) -> Result<(), SurfaceError> {
        let key = NodeKey::Shape(path.id());
        surface.ensure_element(key, ElementKind::Path)?;
        surface.set_attribute(key, "d", &path.path_data())?;
        apply_style(surface, key, &path.style)
    }

    fn render_text(
        &self,
        text: &Text,
        ctx: &RenderContext,
        surface: &mut dyn Surface,
    ) -> Result<(), SurfaceError> {
        let key = NodeKey::Shape(text.id());
        surface.ensure_element(key, ElementKind::Text)?;
        surface.set_attribute(key, "x", &format_number(text.position.x))?;
        surface.set_attribute(key, "y", &format_number(text.position.y))?;
        surface.set_attribute(key, "font-size", &format_number(text.font_size()))?;
        apply_style(surface, key, &text.style)?;
        surface.set_text_content(key, text.content())?;

        let cursor = ctx.canvas.widgets.state(text.id()).cursor();
        surface.set_style(key, "cursor", cursor.as_css())?;

        text.set_measured_bounds(surface.bbox(key));
        Ok(())
    }

    fn render_handle(
        &self,
        handle: &Handle,
        fill: &str,
        surface: &mut dyn Surface,
    ) -> Result<NodeKey, SurfaceError> {
        let key = NodeKey::Handle(handle.corner);
        surface.ensure_element(key, ElementKind::Rect)?;
        surface.set_attribute(key, "x", &format_number(handle.position.x))?;
        surface.set_attribute(key, "y", &format_number(handle.position.y))?;
        surface.set_attribute(key, "width", &format_number(handle.size.width))?;
        surface.set_attribute(key, "height", &format_number(handle.size.height))?;
        surface.set_attribute(key, "fill", fill)?;
        Ok(key)
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, ctx: &RenderContext, surface: &mut dyn Surface) -> RenderResult<()> {
        let canvas = ctx.canvas;
        surface.set_view_box(&canvas.view_box())?;
        surface.set_cursor(canvas.canvas_cursor())?;

        let mut live = HashSet::new();
        for shape in canvas.document.shapes_ordered() {
            match shape {
                Shape::Freehand(path) => self.render_freehand(path, surface)?,
                Shape::Text(text) => self.render_text(text, ctx, surface)?,
            }
            live.insert(NodeKey::Shape(shape.id()));
        }

        // Handles read the bounds measured above.
        let fill = SerializableColor::from(ctx.handle_color).to_css();
        for handle in canvas.selection_handles() {
            live.insert(self.render_handle(&handle, &fill, surface)?);
        }

        for key in surface.keys() {
            if !live.contains(&key) {
                surface.remove_element(key)?;
            }
        }

        self.frames += 1;
        log::trace!("Rendered frame {} with {} elements", self.frames, live.len());
        Ok(())
    }
}

/// Write paint attributes for a shape style.
fn apply_style(
    surface: &mut dyn Surface,
    key: NodeKey,
    style: &ShapeStyle,
) -> Result<(), SurfaceError> {
    let fill = style.fill_color.map_or_else(|| "none".to_string(), |c| c.to_css());
    surface.set_attribute(key, "fill", &fill)?;
    if let Some(stroke) = style.stroke_color {
        surface.set_attribute(key, "stroke", &stroke.to_css())?;
        surface.set_attribute(key, "stroke-width", &format_number(style.stroke_width))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;
    use kurbo::{Point, Rect};
    use sketchsvg_core::prompt::TextResponse;
    use sketchsvg_core::shapes::ShapeId;
    use sketchsvg_core::tools::Mode;
    use sketchsvg_core::widget::Corner;

    fn render(canvas: &Canvas, surface: &mut MemorySurface) {
        SvgRenderer::new()
            .render(&RenderContext::new(canvas), surface)
            .unwrap();
    }

    fn add_text(canvas: &mut Canvas, content: &str) -> ShapeId {
        canvas.set_mode(Mode::Text);
        let request = canvas.request_text(Point::new(100.0, 100.0)).unwrap();
        canvas
            .submit_text(request.id, TextResponse::Submitted(content.to_string()))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_render_empty_canvas() {
        let canvas = Canvas::new();
        let mut surface = MemorySurface::new();
        render(&canvas, &mut surface);
        assert_eq!(surface.view_box(), Some("0 0 1000 1000"));
        assert_eq!(surface.cursor(), Some("grab"));
        assert!(surface.keys().is_empty());
    }

    #[test]
    fn test_render_freehand_attributes() {
        let mut canvas = Canvas::new();
        let path = Freehand::from_points(vec![
            Point::new(10.0, 10.0),
            Point::new(20.0, 10.0),
            Point::new(20.0, 20.0),
        ]);
        let id = canvas.document.add_shape(Shape::Freehand(path));

        let mut surface = MemorySurface::new();
        render(&canvas, &mut surface);

        let element = surface.element(NodeKey::Shape(id)).unwrap();
        assert_eq!(element.kind, ElementKind::Path);
        assert_eq!(element.attribute("d"), Some("M10,10 L20,10 L20,20"));
        assert_eq!(element.attribute("fill"), Some("none"));
        assert_eq!(element.attribute("stroke"), Some("#000"));
        assert_eq!(element.attribute("stroke-width"), Some("2"));
    }

    #[test]
    fn test_render_text_measures_bounds() {
        let mut canvas = Canvas::new();
        let id = add_text(&mut canvas, "Hello");

        let mut surface = MemorySurface::new();
        render(&canvas, &mut surface);

        let element = surface.element(NodeKey::Shape(id)).unwrap();
        assert_eq!(element.kind, ElementKind::Text);
        assert_eq!(element.text, "Hello");
        assert_eq!(element.attribute("font-size"), Some("16"));
        assert_eq!(element.attribute("fill"), Some("#000"));
        assert_eq!(element.style("cursor"), Some("text"));

        let text = canvas.document.text(id).unwrap();
        assert_ne!(text.bounds(), Rect::ZERO);
        assert_eq!(text.bounds(), surface.bbox(NodeKey::Shape(id)));
    }

    #[test]
    fn test_selection_handles_follow_bbox() {
        let mut canvas = Canvas::new();
        let id = add_text(&mut canvas, "Hello");
        let mut surface = MemorySurface::new();
        render(&canvas, &mut surface);

        canvas.select_text(id).unwrap();
        render(&canvas, &mut surface);

        let bbox = surface.bbox(NodeKey::Shape(id));
        assert_eq!(surface.element(NodeKey::Shape(id)).unwrap().style("cursor"), Some("move"));
        let se = surface.element(NodeKey::Handle(Corner::SouthEast)).unwrap();
        assert_eq!(se.kind, ElementKind::Rect);
        assert_eq!(se.attribute("x"), Some(format_number(bbox.x1 - 4.0).as_str()));
        assert_eq!(se.attribute("y"), Some(format_number(bbox.y1 - 4.0).as_str()));
        assert_eq!(se.attribute("width"), Some("8"));
        assert_eq!(se.attribute("fill"), Some("#00f"));
        assert_eq!(surface.keys().len(), 5);

        canvas.deselect_text();
        render(&canvas, &mut surface);
        assert_eq!(surface.keys(), vec![NodeKey::Shape(id)]);
    }

    #[test]
    fn test_resize_repositions_handles() {
        let mut canvas = Canvas::new();
        let id = add_text(&mut canvas, "Hello");
        canvas.select_text(id).unwrap();
        let mut surface = MemorySurface::new();
        render(&canvas, &mut surface);
        let before = surface.bbox(NodeKey::Shape(id));

        canvas.begin_handle_resize(Point::ZERO, Corner::SouthEast).unwrap();
        assert!(canvas.update_resize(Point::new(8.0, 0.0)));
        render(&canvas, &mut surface);

        let element = surface.element(NodeKey::Shape(id)).unwrap();
        assert_eq!(element.attribute("font-size"), Some("18"));
        let after = surface.bbox(NodeKey::Shape(id));
        assert!(after.width() > before.width());
        let se = surface.element(NodeKey::Handle(Corner::SouthEast)).unwrap();
        assert_eq!(se.attribute("x"), Some(format_number(after.x1 - 4.0).as_str()));
    }

    #[test]
    fn test_removed_shapes_are_removed_from_surface() {
        let mut canvas = Canvas::new();
        let id = canvas.document.add_shape(Shape::Freehand(Freehand::new()));
        let mut surface = MemorySurface::new();
        render(&canvas, &mut surface);
        assert_eq!(surface.keys().len(), 1);

        canvas.document.remove_shape(id);
        render(&canvas, &mut surface);
        assert!(surface.keys().is_empty());
    }

    #[test]
    fn test_view_box_and_cursor_follow_canvas() {
        let mut canvas = Canvas::new();
        canvas.camera.scale = 2.0;
        canvas.toggle_draw_mode();
        let mut surface = MemorySurface::new();
        let mut renderer = SvgRenderer::new();
        renderer.render(&RenderContext::new(&canvas), &mut surface).unwrap();
        assert_eq!(surface.view_box(), Some("0 0 500 500"));
        assert_eq!(surface.cursor(), Some("crosshair"));
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn test_custom_handle_color() {
        let mut canvas = Canvas::new();
        let id = add_text(&mut canvas, "x");
        canvas.select_text(id).unwrap();
        let mut surface = MemorySurface::new();
        let ctx = RenderContext::new(&canvas).with_handle_color(Color::from_rgba8(255, 0, 0, 255));
        SvgRenderer::new().render(&ctx, &mut surface).unwrap();
        let nw = surface.element(NodeKey::Handle(Corner::NorthWest)).unwrap();
        assert_eq!(nw.attribute("fill"), Some("#f00"));
    }
}
