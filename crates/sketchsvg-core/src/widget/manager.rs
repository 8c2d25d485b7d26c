//! Widget manager for tracking selection of text annotations.

use super::state::WidgetState;
use crate::shapes::ShapeId;

/// Tracks which text annotation is selected.
///
/// At most one annotation is selected at a time: selecting a new one
/// deselects the previous one first.
#[derive(Debug, Clone, Default)]
pub struct WidgetManager {
    selected: Option<ShapeId>,
}

impl WidgetManager {
    /// Create a new widget manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the state of a shape.
    pub fn state(&self, id: ShapeId) -> WidgetState {
        if self.selected == Some(id) {
            WidgetState::Selected
        } else {
            WidgetState::Normal
        }
    }

    /// Check if a shape is selected.
    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selected == Some(id)
    }

    /// Get the selected shape ID (if any).
    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    /// Select a shape. Returns the shape that was deselected to make room,
    /// if it differs from the new one.
    pub fn select(&mut self, id: ShapeId) -> Option<ShapeId> {
        let previous = self.deselect();
        self.selected = Some(id);
        previous.filter(|&prev| prev != id)
    }

    /// Clear the selection. Returns the shape that was selected.
    pub fn deselect(&mut self) -> Option<ShapeId> {
        self.selected.take()
    }
}
