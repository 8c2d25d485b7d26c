//! Corner resize handles for the selected text.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Side length of a handle square, in canvas units.
const HANDLE_SIZE: f64 = 8.0;

/// Offset from the bounding-box corner to the handle's top-left corner.
const HANDLE_INSET: f64 = 4.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    /// All corners, in the order handles are created.
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthWest,
        Corner::SouthEast,
    ];

    /// Short tag used in element keys (`nw`, `ne`, `sw`, `se`).
    pub fn tag(&self) -> &'static str {
        match self {
            Corner::NorthWest => "nw",
            Corner::NorthEast => "ne",
            Corner::SouthWest => "sw",
            Corner::SouthEast => "se",
        }
    }

    /// Parse a short tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Corner::ALL.into_iter().find(|c| c.tag() == tag)
    }

    /// The corner of `bounds` this handle sits on.
    pub fn anchor(&self, bounds: Rect) -> Point {
        match self {
            Corner::NorthWest => Point::new(bounds.x0, bounds.y0),
            Corner::NorthEast => Point::new(bounds.x1, bounds.y0),
            Corner::SouthWest => Point::new(bounds.x0, bounds.y1),
            Corner::SouthEast => Point::new(bounds.x1, bounds.y1),
        }
    }
}

/// A resize handle: a small square near one corner of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Which corner the handle belongs to.
    pub corner: Corner,
    /// Top-left of the handle square, in canvas coordinates.
    pub position: Point,
    /// Size of the handle square.
    pub size: Size,
}

impl Handle {
    /// Create the handle for `corner` of `bounds`.
    pub fn for_corner(corner: Corner, bounds: Rect) -> Self {
        let anchor = corner.anchor(bounds);
        Self {
            corner,
            position: Point::new(anchor.x - HANDLE_INSET, anchor.y - HANDLE_INSET),
            size: Size::new(HANDLE_SIZE, HANDLE_SIZE),
        }
    }
}

/// Get the four resize handles for a bounding box.
pub fn resize_handles(bounds: Rect) -> Vec<Handle> {
    Corner::ALL
        .into_iter()
        .map(|corner| Handle::for_corner(corner, bounds))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_positions() {
        let bounds = Rect::new(100.0, 50.0, 160.0, 70.0);
        let handles = resize_handles(bounds);
        assert_eq!(handles.len(), 4);

        let positions: Vec<(Corner, Point)> =
            handles.iter().map(|h| (h.corner, h.position)).collect();
        assert_eq!(
            positions,
            vec![
                (Corner::NorthWest, Point::new(96.0, 46.0)),
                (Corner::NorthEast, Point::new(156.0, 46.0)),
                (Corner::SouthWest, Point::new(96.0, 66.0)),
                (Corner::SouthEast, Point::new(156.0, 66.0)),
            ]
        );
    }

    #[test]
    fn test_zero_bounds_do_not_panic() {
        let handles = resize_handles(Rect::ZERO);
        assert!(handles.iter().all(|h| h.position == Point::new(-4.0, -4.0)));
    }

    #[test]
    fn test_tags() {
        for corner in Corner::ALL {
            assert_eq!(Corner::from_tag(corner.tag()), Some(corner));
        }
        assert_eq!(Corner::from_tag("n"), None);
    }
}
