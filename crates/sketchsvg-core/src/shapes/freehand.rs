//! Freehand drawing shape.

use super::{format_number, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, PathEl, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand drawing: the pointer samples of one drag, joined by straight lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    /// Points in arrival order.
    pub points: Vec<Point>,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Freehand {
    /// Create a new empty freehand shape.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            points: Vec::new(),
            style: ShapeStyle::stroke(),
        }
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            ..Self::new()
        }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Build the path geometry: a move to the first point, then a line to each
    /// following point.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            path.move_to(*first);
            for point in points {
                path.line_to(*point);
            }
        }

        path
    }

    /// SVG path description (`d` attribute), e.g. `M10,10 L20,10 L20,20`.
    pub fn path_data(&self) -> String {
        self.to_path()
            .elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::MoveTo(p) => Some(('M', p)),
                PathEl::LineTo(p) => Some(('L', p)),
                _ => None,
            })
            .map(|(command, p)| format!("{command}{},{}", format_number(p.x), format_number(p.y)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Freehand {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeTrait for Freehand {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(*first, *first), |bounds, point| {
            bounds.union_pt(*point)
        })
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }
}
