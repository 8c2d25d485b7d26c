//! sketchsvg Core Library
//!
//! Platform-agnostic state and interaction logic for the sketchsvg drawing canvas:
//! the pan/zoom view transform, pointer coordinate mapping, freehand paths, text
//! annotations with corner resize handles, and the mode/gesture state machine that
//! routes pointer events between them.

pub mod camera;
pub mod canvas;
pub mod input;
pub mod interaction;
pub mod mapper;
pub mod prompt;
pub mod shapes;
pub mod tools;
pub mod widget;

pub use camera::{Camera, ViewBox, ZoomDirection, CANVAS_SIZE};
pub use canvas::{Canvas, CanvasAction, CanvasDocument, CanvasError, CanvasSettings, Outcome};
pub use input::{Modifiers, MouseButton, PointerEvent, Target};
pub use interaction::Interaction;
pub use mapper::CoordinateMapper;
pub use prompt::{TextPrompt, TextRequest, TextResponse};
pub use tools::{Mode, ModeController};
pub use widget::{Corner, Cursor, Handle, WidgetManager, WidgetState};
