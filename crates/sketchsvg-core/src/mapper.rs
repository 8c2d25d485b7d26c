//! Mapping between device pointer coordinates and canvas coordinates.

use crate::camera::ViewBox;
use kurbo::{Affine, Point, Rect, Vec2};

/// Converts device-space pointer positions into canvas coordinates.
///
/// The rendering surface fits the current viewBox into its on-screen viewport
/// the way SVG does by default (`preserveAspectRatio="xMidYMid meet"`): a
/// uniform scale chosen so the whole viewBox is visible, centred along the
/// axis with spare room. Pan and zoom enter through the viewBox itself.
#[derive(Debug, Clone, Default)]
pub struct CoordinateMapper {
    /// On-screen rectangle of the surface, in device coordinates.
    viewport: Option<Rect>,
}

impl CoordinateMapper {
    /// Create a mapper for a surface that is not attached yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the on-screen rectangle of the attached surface.
    pub fn attach(&mut self, viewport: Rect) {
        self.viewport = Some(viewport);
    }

    /// Get the current viewport, if attached.
    pub fn viewport(&self) -> Option<Rect> {
        self.viewport
    }

    /// Transform from canvas coordinates to device coordinates.
    ///
    /// Returns `None` when the surface is not attached or has no area.
    pub fn screen_transform(&self, view_box: &ViewBox) -> Option<Affine> {
        let viewport = self.viewport?;
        if viewport.width() <= 0.0
            || viewport.height() <= 0.0
            || view_box.width <= 0.0
            || view_box.height <= 0.0
        {
            return None;
        }

        let scale = (viewport.width() / view_box.width).min(viewport.height() / view_box.height);
        let content = Vec2::new(view_box.width * scale, view_box.height * scale);
        let origin = Vec2::new(
            viewport.x0 + (viewport.width() - content.x) / 2.0,
            viewport.y0 + (viewport.height() - content.y) / 2.0,
        );

        Some(
            Affine::translate(origin)
                * Affine::scale(scale)
                * Affine::translate(Vec2::new(-view_box.x, -view_box.y)),
        )
    }

    /// Convert a device point to canvas coordinates.
    ///
    /// Falls back to the raw device coordinates when no transform is available.
    pub fn screen_to_canvas(&self, point: Point, view_box: &ViewBox) -> Point {
        match self.screen_transform(view_box) {
            Some(transform) if transform.determinant().abs() > f64::EPSILON => {
                transform.inverse() * point
            }
            _ => point,
        }
    }

    /// Convert a canvas point to device coordinates.
    pub fn canvas_to_screen(&self, point: Point, view_box: &ViewBox) -> Point {
        match self.screen_transform(view_box) {
            Some(transform) => transform * point,
            None => point,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    fn assert_point(actual: Point, x: f64, y: f64) {
        assert!((actual.x - x).abs() < 1e-9, "x: {} != {}", actual.x, x);
        assert!((actual.y - y).abs() < 1e-9, "y: {} != {}", actual.y, y);
    }

    #[test]
    fn test_unattached_returns_raw_coordinates() {
        let mapper = CoordinateMapper::new();
        let view_box = Camera::new().view_box();
        assert_point(mapper.screen_to_canvas(Point::new(12.0, 34.0), &view_box), 12.0, 34.0);
    }

    #[test]
    fn test_degenerate_viewport_returns_raw_coordinates() {
        let mut mapper = CoordinateMapper::new();
        mapper.attach(Rect::new(10.0, 10.0, 10.0, 300.0));
        let view_box = Camera::new().view_box();
        assert_point(mapper.screen_to_canvas(Point::new(5.0, 6.0), &view_box), 5.0, 6.0);
    }

    #[test]
    fn test_viewport_scaling() {
        let mut mapper = CoordinateMapper::new();
        mapper.attach(Rect::new(0.0, 0.0, 500.0, 500.0));
        let view_box = Camera::new().view_box();
        assert_point(mapper.screen_to_canvas(Point::new(250.0, 100.0), &view_box), 500.0, 200.0);
    }

    #[test]
    fn test_letterboxed_viewport_is_centred() {
        let mut mapper = CoordinateMapper::new();
        // 1000 wide, 500 tall: content is 500x500 centred horizontally.
        mapper.attach(Rect::new(0.0, 0.0, 1000.0, 500.0));
        let view_box = Camera::new().view_box();
        assert_point(mapper.screen_to_canvas(Point::new(250.0, 0.0), &view_box), 0.0, 0.0);
        assert_point(mapper.screen_to_canvas(Point::new(500.0, 250.0), &view_box), 500.0, 500.0);
    }

    #[test]
    fn test_pan_and_zoom_are_inverted() {
        let mut mapper = CoordinateMapper::new();
        mapper.attach(Rect::new(20.0, 40.0, 1020.0, 1040.0));

        let mut camera = Camera::new();
        camera.offset = Vec2::new(100.0, 50.0);
        camera.scale = 2.0;
        let view_box = camera.view_box();

        // viewBox origin (-50, -25) sits at the viewport origin.
        assert_point(mapper.screen_to_canvas(Point::new(20.0, 40.0), &view_box), -50.0, -25.0);
        // One device pixel is half a canvas unit at scale 2.
        assert_point(mapper.screen_to_canvas(Point::new(120.0, 140.0), &view_box), 0.0, 25.0);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut mapper = CoordinateMapper::new();
        mapper.attach(Rect::new(8.0, 16.0, 808.0, 616.0));

        let mut camera = Camera::new();
        camera.offset = Vec2::new(-30.0, 75.0);
        camera.scale = 1.5;
        let view_box = camera.view_box();

        let original = Point::new(123.0, 456.0);
        let canvas = mapper.screen_to_canvas(original, &view_box);
        let back = mapper.canvas_to_screen(canvas, &view_box);
        assert_point(back, original.x, original.y);
    }
}
