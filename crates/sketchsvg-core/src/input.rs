//! Pointer events and the targets they land on.

use crate::shapes::ShapeId;
use crate::widget::Corner;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether a command modifier (ctrl/meta/alt) is held.
    pub fn has_command(&self) -> bool {
        self.ctrl || self.meta || self.alt
    }
}

/// The element a pointer event landed on, as resolved by the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Target {
    /// Empty canvas (or an element the canvas does not own).
    #[default]
    Canvas,
    /// A shape in the document.
    Shape(ShapeId),
    /// One of the resize handles of the selected text.
    Handle(Corner),
}

/// Pointer event in device coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        target: Target,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    /// The pointer left the surface.
    Leave,
    Wheel {
        position: Point,
        delta: Vec2,
    },
    /// A press and release on the same element.
    Click {
        position: Point,
        target: Target,
    },
}
