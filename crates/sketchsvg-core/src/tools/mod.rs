//! Mode selection for the canvas.

use serde::{Deserialize, Serialize};

/// Which gesture family owns the primary button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// No tool: dragging the canvas pans the view.
    #[default]
    None,
    /// Dragging draws a freehand path.
    Draw,
    /// Clicking empty canvas adds a text annotation.
    Text,
}

impl Mode {
    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::None => "Pan",
            Mode::Draw => "Draw",
            Mode::Text => "Text",
        }
    }
}

/// Mutually exclusive mode switch.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: Mode,
}

impl ModeController {
    /// Create a controller in [`Mode::None`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Set the current mode.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Toggle freehand drawing; always leaves text mode off.
    pub fn toggle_draw(&mut self) -> Mode {
        self.toggle(Mode::Draw)
    }

    /// Toggle text mode; always leaves drawing mode off.
    pub fn toggle_text(&mut self) -> Mode {
        self.toggle(Mode::Text)
    }

    fn toggle(&mut self, mode: Mode) -> Mode {
        self.mode = if self.mode == mode { Mode::None } else { mode };
        self.mode
    }

    /// Check if freehand drawing is enabled.
    pub fn is_draw_enabled(&self) -> bool {
        self.mode == Mode::Draw
    }

    /// Check if text mode is enabled.
    pub fn is_text_enabled(&self) -> bool {
        self.mode == Mode::Text
    }

    /// Panning is only available when no tool is active.
    pub fn allows_pan(&self) -> bool {
        self.mode == Mode::None
    }
}
