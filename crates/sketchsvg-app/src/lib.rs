//! sketchsvg Application
//!
//! The application shell: configuration, keyboard shortcuts, and the
//! controller that feeds input to the canvas and re-renders the surface.
//! On wasm32 it also provides the browser entry point.

mod app;
mod overlay;
mod shortcuts;

pub use app::{App, AppConfig, ConfigError};
pub use overlay::OverlaySlot;
pub use shortcuts::{Shortcut, ShortcutRegistry};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
