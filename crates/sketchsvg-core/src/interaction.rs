//! Gesture state machine.
//!
//! Each gesture carries its own inputs (target, start position, original
//! size) from pointer-down until it ends, so no handler needs ambient state.

use crate::shapes::ShapeId;
use crate::widget::Corner;
use kurbo::{Point, Vec2};

/// The gesture currently driven by the primary button.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging the view.
    Panning {
        /// Pointer position relative to the pan offset at press time.
        anchor: Vec2,
    },
    /// Drawing a freehand path.
    Drawing {
        /// The one path that is still mutable.
        path: ShapeId,
    },
    /// Dragging a corner handle of the selected text.
    HandleResize {
        target: ShapeId,
        corner: Corner,
        /// Device position of the press.
        start: Point,
        original_font_size: f64,
    },
    /// Dragging the body of the selected text.
    BodyResize {
        target: ShapeId,
        /// Device x of the press.
        start_x: f64,
        original_font_size: f64,
    },
}

impl Interaction {
    /// Check if no gesture is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Check if the view is being dragged.
    pub fn is_panning(&self) -> bool {
        matches!(self, Interaction::Panning { .. })
    }

    /// Check if a freehand path is being drawn.
    pub fn is_drawing(&self) -> bool {
        matches!(self, Interaction::Drawing { .. })
    }

    /// Check if a text resize (either kind) is in progress.
    pub fn is_resizing(&self) -> bool {
        matches!(
            self,
            Interaction::HandleResize { .. } | Interaction::BodyResize { .. }
        )
    }

    /// Whether the pointer leaving the surface ends this gesture.
    ///
    /// Resizes keep tracking the pointer until the button is released.
    pub fn ends_on_leave(&self) -> bool {
        self.is_panning() || self.is_drawing()
    }

    /// The shape this gesture mutates, if any.
    pub fn target(&self) -> Option<ShapeId> {
        match self {
            Interaction::Idle | Interaction::Panning { .. } => None,
            Interaction::Drawing { path } => Some(*path),
            Interaction::HandleResize { target, .. } | Interaction::BodyResize { target, .. } => {
                Some(*target)
            }
        }
    }

    /// Font size the target had when a resize started.
    pub fn original_font_size(&self) -> Option<f64> {
        match self {
            Interaction::HandleResize {
                original_font_size, ..
            }
            | Interaction::BodyResize {
                original_font_size, ..
            } => Some(*original_font_size),
            _ => None,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Panning { .. } => "pan",
            Interaction::Drawing { .. } => "draw",
            Interaction::HandleResize { .. } => "handle-resize",
            Interaction::BodyResize { .. } => "body-resize",
        }
    }
}
