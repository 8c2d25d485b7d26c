//! Keyboard shortcut registry and documentation.

use sketchsvg_core::canvas::CanvasAction;
use sketchsvg_core::input::Modifiers;

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// `KeyboardEvent.key` value (letters match case-insensitively).
    pub key: &'static str,
    pub action: CanvasAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, action: CanvasAction, description: &'static str) -> Self {
        Self {
            key,
            action,
            description,
        }
    }

    /// Check if a key press triggers this shortcut.
    pub fn matches(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }

    /// Format the shortcut for display.
    pub fn format(&self) -> String {
        if self.key.len() == 1 {
            self.key.to_ascii_uppercase()
        } else {
            self.key.to_string()
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("d", CanvasAction::ToggleDraw, "Toggle freehand drawing"),
            Shortcut::new("t", CanvasAction::ToggleText, "Toggle text mode"),
            Shortcut::new(
                "Escape",
                CanvasAction::Cancel,
                "Cancel resize, text entry, or selection",
            ),
            Shortcut::new("+", CanvasAction::ZoomIn, "Zoom in"),
            Shortcut::new("=", CanvasAction::ZoomIn, "Zoom in"),
            Shortcut::new("-", CanvasAction::ZoomOut, "Zoom out"),
            Shortcut::new("0", CanvasAction::ResetView, "Reset pan and zoom"),
        ]
    }

    /// Find the action bound to a key press.
    ///
    /// Presses with ctrl, meta or alt held are left to the browser.
    pub fn lookup(key: &str, modifiers: Modifiers) -> Option<CanvasAction> {
        if modifiers.has_command() {
            return None;
        }
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(key))
            .map(|shortcut| shortcut.action)
    }

    /// Shortcut help, one line per shortcut.
    pub fn help_text() -> String {
        Self::all()
            .iter()
            .map(|shortcut| format!("{:8} {}", shortcut.format(), shortcut.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let none = Modifiers::default();
        assert_eq!(ShortcutRegistry::lookup("d", none), Some(CanvasAction::ToggleDraw));
        assert_eq!(ShortcutRegistry::lookup("D", none), Some(CanvasAction::ToggleDraw));
        assert_eq!(ShortcutRegistry::lookup("t", none), Some(CanvasAction::ToggleText));
        assert_eq!(ShortcutRegistry::lookup("Escape", none), Some(CanvasAction::Cancel));
        assert_eq!(ShortcutRegistry::lookup("=", none), Some(CanvasAction::ZoomIn));
        assert_eq!(ShortcutRegistry::lookup("0", none), Some(CanvasAction::ResetView));
        assert_eq!(ShortcutRegistry::lookup("x", none), None);
    }

    #[test]
    fn test_command_modifiers_pass_through() {
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        assert_eq!(ShortcutRegistry::lookup("d", ctrl), None);

        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        assert_eq!(ShortcutRegistry::lookup("+", shift), Some(CanvasAction::ZoomIn));
    }

    #[test]
    fn test_help_text() {
        let help = ShortcutRegistry::help_text();
        assert_eq!(help.lines().count(), ShortcutRegistry::all().len());
        assert!(help.starts_with("D "));
    }
}
