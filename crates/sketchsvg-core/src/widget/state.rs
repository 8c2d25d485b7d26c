//! Widget state definitions.

/// The UI state of a text annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    /// Normal display state - no interaction.
    #[default]
    Normal,
    /// Selected: shows resize handles and can be resized.
    Selected,
}

impl WidgetState {
    /// Pointer affordance shown over the widget.
    pub fn cursor(&self) -> Cursor {
        match self {
            Self::Normal => Cursor::Text,
            Self::Selected => Cursor::Move,
        }
    }
}

/// Pointer cursor affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Text,
    Move,
    Crosshair,
    Grab,
    Grabbing,
}

impl Cursor {
    /// CSS `cursor` property value.
    pub fn as_css(&self) -> &'static str {
        match self {
            Cursor::Text => "text",
            Cursor::Move => "move",
            Cursor::Crosshair => "crosshair",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
        }
    }
}
