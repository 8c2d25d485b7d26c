//! Widget system for the selection state of text annotations.
//!
//! Shapes remain pure data. The widget layer records which annotation is
//! selected, the cursor affordance that follows from it, and the resize
//! handles drawn around the selection.

mod handles;
mod manager;
mod state;

pub use handles::{resize_handles, Corner, Handle};
pub use manager::WidgetManager;
pub use state::{Cursor, WidgetState};
