//! sketchsvg Render Library
//!
//! Rendering-surface abstraction for sketchsvg. The [`SvgRenderer`] keeps a
//! retained element tree (the browser's SVG DOM, or the headless
//! [`MemorySurface`]) in sync with the canvas state after every event.

mod memory;
mod renderer;
mod surface;

pub use memory::{Element, MemorySurface};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, SvgRenderer};
pub use surface::{ElementKind, NodeKey, Surface, SurfaceError};
