//! Ownership of the host widget answering the outstanding text request.
//!
//! The widget usually holds event callbacks that point back at the
//! application, so it must be released as soon as its request settles.
//! Values handed back by the slot should be dropped by the caller once it
//! no longer borrows the application state.

/// Holds at most one widget, tagged with the text request it answers.
#[derive(Debug)]
pub struct OverlaySlot<W> {
    current: Option<(u64, W)>,
}

impl<W> Default for OverlaySlot<W> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<W> OverlaySlot<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the widget for `request_id`. Returns the widget it replaces.
    pub fn open(&mut self, request_id: u64, widget: W) -> Option<W> {
        self.current
            .replace((request_id, widget))
            .map(|(_, previous)| previous)
    }

    /// Release the widget if it still answers `request_id`.
    ///
    /// A superseded request leaves the newer widget in place.
    pub fn close(&mut self, request_id: u64) -> Option<W> {
        self.current
            .take_if(|(id, _)| *id == request_id)
            .map(|(_, widget)| widget)
    }
}
