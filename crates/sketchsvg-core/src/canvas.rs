//! Canvas document and state management.

use crate::camera::{Camera, ViewBox, ZoomDirection, ZOOM_STEP};
use crate::input::{MouseButton, PointerEvent, Target};
use crate::interaction::Interaction;
use crate::mapper::CoordinateMapper;
use crate::prompt::{TextPrompt, TextRequest, TextResponse};
use crate::shapes::{Freehand, Shape, ShapeId, ShapeStyle, ShapeTrait, Text};
use crate::tools::{Mode, ModeController};
use crate::widget::{resize_handles, Corner, Cursor, Handle, WidgetManager};
use kurbo::Point;
use std::collections::HashMap;
use thiserror::Error;

/// Reasons a canvas operation was refused.
///
/// None of these are fatal: the event dispatcher logs them and treats the
/// event as a no-op.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanvasError {
    #[error("Shape not found: {0}")]
    UnknownShape(ShapeId),
    #[error("Shape is not a text annotation: {0}")]
    NotText(ShapeId),
    #[error("No text annotation is selected")]
    NoSelection,
    #[error("Text annotation is not selected: {0}")]
    NotSelected(ShapeId),
    #[error("{action} is not available in {mode:?} mode")]
    ModeMismatch { action: &'static str, mode: Mode },
    #[error("A {0} gesture is already in progress")]
    GestureInProgress(&'static str),
    #[error("Text request {0} is not pending")]
    StaleTextRequest(u64),
}

/// What the host must do after the canvas handled an event.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing visible changed.
    Unchanged,
    /// State changed; re-render now.
    Redraw,
    /// Ask the user for annotation text and answer with [`Canvas::submit_text`].
    RequestText(TextRequest),
}

impl Outcome {
    /// Check if the surface must be updated.
    pub fn needs_redraw(&self) -> bool {
        matches!(self, Outcome::Redraw)
    }

    fn from_changed(changed: bool) -> Self {
        if changed {
            Outcome::Redraw
        } else {
            Outcome::Unchanged
        }
    }
}

/// Discrete commands, typically bound to keyboard shortcuts or toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanvasAction {
    ToggleDraw,
    ToggleText,
    /// Abort the current gesture, pending text entry, or selection (first that applies).
    Cancel,
    ZoomIn,
    ZoomOut,
    ResetView,
}

/// Style and sizing applied to newly created shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSettings {
    /// Scale change per zoom step.
    pub zoom_step: f64,
    /// Style of new freehand paths.
    pub freehand_style: ShapeStyle,
    /// Style of new text annotations.
    pub text_style: ShapeStyle,
    /// Font size of new text annotations.
    pub default_font_size: f64,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            zoom_step: ZOOM_STEP,
            freehand_style: ShapeStyle::stroke(),
            text_style: ShapeStyle::text(),
            default_font_size: Text::DEFAULT_FONT_SIZE,
        }
    }
}

/// The shapes on the canvas.
#[derive(Debug, Clone, Default)]
pub struct CanvasDocument {
    /// All shapes in the document, keyed by ID.
    pub shapes: HashMap<ShapeId, Shape>,
    /// Z-order of shapes (back to front).
    pub z_order: Vec<ShapeId>,
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape on top of the others.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.z_order.push(id);
        self.shapes.insert(id, shape);
        id
    }

    /// Remove a shape from the document.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        self.z_order.retain(|&shape_id| shape_id != id);
        self.shapes.remove(&id)
    }

    /// Get a shape by ID.
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Get a mutable reference to a shape by ID.
    pub fn get_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    /// Get a text annotation by ID.
    pub fn text(&self, id: ShapeId) -> Result<&Text, CanvasError> {
        self.get_shape(id)
            .ok_or(CanvasError::UnknownShape(id))?
            .as_text()
            .ok_or(CanvasError::NotText(id))
    }

    /// Get a text annotation mutably by ID.
    pub fn text_mut(&mut self, id: ShapeId) -> Result<&mut Text, CanvasError> {
        self.get_shape_mut(id)
            .ok_or(CanvasError::UnknownShape(id))?
            .as_text_mut()
            .ok_or(CanvasError::NotText(id))
    }

    /// Get shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}

/// Runtime canvas state: the document plus everything the event handlers mutate.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    /// The shapes being edited.
    pub document: CanvasDocument,
    /// Pan/zoom state.
    pub camera: Camera,
    /// Device-to-canvas coordinate mapping.
    pub mapper: CoordinateMapper,
    /// Draw/text/none switch.
    pub modes: ModeController,
    /// Text selection.
    pub widgets: WidgetManager,
    /// Defaults for new shapes.
    pub settings: CanvasSettings,
    /// Gesture in progress.
    interaction: Interaction,
    /// Outstanding text entry.
    prompt: TextPrompt,
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a canvas with custom settings.
    pub fn with_settings(settings: CanvasSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Get the gesture in progress.
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Get the outstanding text request, if any.
    pub fn pending_text_request(&self) -> Option<&TextRequest> {
        self.prompt.pending()
    }

    /// Current visible viewBox.
    pub fn view_box(&self) -> ViewBox {
        self.camera.view_box()
    }

    /// Convert a device point to canvas coordinates under the current view.
    pub fn to_canvas(&self, point: Point) -> Point {
        self.mapper.screen_to_canvas(point, &self.view_box())
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    // --- Mode controller -------------------------------------------------

    /// Toggle freehand drawing (clears text mode).
    pub fn toggle_draw_mode(&mut self) -> Mode {
        let _ = self.finish_gesture();
        let mode = self.modes.toggle_draw();
        log::debug!("Mode: {}", mode.display_name());
        mode
    }

    /// Toggle text mode (clears drawing mode).
    pub fn toggle_text_mode(&mut self) -> Mode {
        let _ = self.finish_gesture();
        let mode = self.modes.toggle_text();
        log::debug!("Mode: {}", mode.display_name());
        mode
    }

    /// Set the mode directly.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.modes.mode() != mode {
            let _ = self.finish_gesture();
            self.modes.set_mode(mode);
        }
    }

    // --- View transform --------------------------------------------------

    /// Zoom one step in `direction` using the configured step.
    pub fn zoom(&mut self, direction: ZoomDirection) -> bool {
        self.zoom_by(direction, self.settings.zoom_step)
    }

    /// Zoom by an explicit amount.
    pub fn zoom_by(&mut self, direction: ZoomDirection, amount: f64) -> bool {
        self.camera.zoom(direction, amount)
    }

    /// Start dragging the view. Only allowed when no tool is active.
    pub fn begin_pan(&mut self, pointer: Point) -> Result<(), CanvasError> {
        if !self.modes.allows_pan() {
            return Err(CanvasError::ModeMismatch {
                action: "Panning",
                mode: self.modes.mode(),
            });
        }
        self.ensure_idle()?;
        self.interaction = Interaction::Panning {
            anchor: self.camera.pan_anchor(pointer),
        };
        log::debug!("Pan started at {:?}", pointer);
        Ok(())
    }

    /// Follow the pointer while panning. Returns true if the view moved.
    ///
    /// Both axes follow their own pointer delta.
    pub fn update_pan(&mut self, pointer: Point) -> bool {
        let Interaction::Panning { anchor } = self.interaction else {
            return false;
        };
        let before = self.camera.offset;
        self.camera.drag_pan(pointer, anchor);
        self.camera.offset != before
    }

    /// Stop panning. Idempotent.
    pub fn end_pan(&mut self) {
        if self.interaction.is_panning() {
            self.interaction = Interaction::Idle;
            log::debug!("Pan ended at offset {:?}", self.camera.offset);
        }
    }

    /// Reset pan and zoom.
    pub fn reset_view(&mut self) -> bool {
        let changed = self.camera.offset != kurbo::Vec2::ZERO || self.camera.scale != 1.0;
        self.camera.reset();
        changed
    }

    // --- Freehand path builder -------------------------------------------

    /// Start a freehand path at a device position.
    pub fn begin_path(&mut self, pointer: Point) -> Result<ShapeId, CanvasError> {
        if !self.modes.is_draw_enabled() {
            return Err(CanvasError::ModeMismatch {
                action: "Drawing",
                mode: self.modes.mode(),
            });
        }
        self.ensure_idle()?;

        let mut path = Freehand::new();
        path.style = self.settings.freehand_style.clone();
        path.add_point(self.to_canvas(pointer));
        let id = self.document.add_shape(Shape::Freehand(path));
        self.interaction = Interaction::Drawing { path: id };
        log::debug!("Path {} started", id);
        Ok(id)
    }

    /// Append a sample to the path being drawn. Returns true if a point was added.
    pub fn extend_path(&mut self, pointer: Point) -> bool {
        let Interaction::Drawing { path } = self.interaction else {
            return false;
        };
        let point = self.to_canvas(pointer);
        match self.document.get_shape_mut(path) {
            Some(Shape::Freehand(freehand)) => {
                freehand.add_point(point);
                true
            }
            _ => {
                log::warn!("Path {} vanished while drawing", path);
                self.interaction = Interaction::Idle;
                false
            }
        }
    }

    /// Finalize the path being drawn.
    pub fn end_path(&mut self) -> Option<ShapeId> {
        let Interaction::Drawing { path } = self.interaction else {
            return None;
        };
        self.interaction = Interaction::Idle;
        if let Some(Shape::Freehand(freehand)) = self.document.get_shape(path) {
            log::debug!("Path {} finished with {} points", path, freehand.len());
        }
        Some(path)
    }

    // --- Text annotations --------------------------------------------------

    /// Ask for text to place at a device position. Only allowed in text mode.
    pub fn request_text(&mut self, pointer: Point) -> Result<TextRequest, CanvasError> {
        if !self.modes.is_text_enabled() {
            return Err(CanvasError::ModeMismatch {
                action: "Adding text",
                mode: self.modes.mode(),
            });
        }
        let position = self.to_canvas(pointer);
        Ok(self.prompt.open(position))
    }

    /// Answer a text request. Creates the annotation unless the response is
    /// empty or cancelled.
    pub fn submit_text(
        &mut self,
        request_id: u64,
        response: TextResponse,
    ) -> Result<Option<ShapeId>, CanvasError> {
        let request = self
            .prompt
            .take(request_id)
            .ok_or(CanvasError::StaleTextRequest(request_id))?;

        let Some(content) = response.text() else {
            log::debug!("Text request {} produced no text", request_id);
            return Ok(None);
        };

        let mut text = Text::new(request.position, content.to_string())
            .with_font_size(self.settings.default_font_size);
        text.style = self.settings.text_style.clone();
        let id = self.document.add_shape(Shape::Text(text));
        log::info!("Added text {} at {:?}", id, request.position);
        Ok(Some(id))
    }

    /// Drop the outstanding text request.
    pub fn cancel_text_request(&mut self) -> bool {
        self.prompt.cancel()
    }

    /// Select a text annotation, deselecting any other first.
    /// Returns the annotation that was deselected.
    pub fn select_text(&mut self, id: ShapeId) -> Result<Option<ShapeId>, CanvasError> {
        self.document.text(id)?;
        let previous = match self.widgets.selected() {
            Some(selected) if selected != id => self.deselect_text(),
            _ => None,
        };
        self.widgets.select(id);
        log::debug!("Selected text {}", id);
        Ok(previous)
    }

    /// Clear the selection. No-op when nothing is selected.
    pub fn deselect_text(&mut self) -> Option<ShapeId> {
        let id = self.widgets.deselect()?;
        if self.interaction.target() == Some(id) {
            self.interaction = Interaction::Idle;
        }
        log::debug!("Deselected text {}", id);
        Some(id)
    }

    /// The selected text annotation, if any.
    pub fn selected_text(&self) -> Option<&Text> {
        self.widgets
            .selected()
            .and_then(|id| self.document.text(id).ok())
    }

    /// Resize handles of the selected text, placed on its last measured bounds.
    pub fn selection_handles(&self) -> Vec<Handle> {
        self.selected_text()
            .map(|text| resize_handles(text.bounds()))
            .unwrap_or_default()
    }

    /// Start a corner-handle resize of the selected text.
    pub fn begin_handle_resize(
        &mut self,
        pointer: Point,
        corner: Corner,
    ) -> Result<(), CanvasError> {
        let target = self.widgets.selected().ok_or(CanvasError::NoSelection)?;
        self.ensure_idle()?;
        let original_font_size = self.document.text(target)?.font_size();
        self.interaction = Interaction::HandleResize {
            target,
            corner,
            start: pointer,
            original_font_size,
        };
        log::debug!("Handle resize ({}) of {} started", corner.tag(), target);
        Ok(())
    }

    /// Start a body-drag resize of a selected text.
    pub fn begin_body_resize(
        &mut self,
        pointer: Point,
        target: ShapeId,
    ) -> Result<(), CanvasError> {
        if !self.widgets.is_selected(target) {
            return Err(CanvasError::NotSelected(target));
        }
        self.ensure_idle()?;
        let original_font_size = self.document.text(target)?.font_size();
        self.interaction = Interaction::BodyResize {
            target,
            start_x: pointer.x,
            original_font_size,
        };
        log::debug!("Body resize of {} started", target);
        Ok(())
    }

    /// Follow the pointer during a resize. Returns true if the font size changed.
    pub fn update_resize(&mut self, pointer: Point) -> bool {
        let (target, new_size) = match self.interaction {
            Interaction::HandleResize {
                target,
                start,
                original_font_size,
                ..
            } => (target, Text::handle_resize_size(original_font_size, pointer - start)),
            Interaction::BodyResize {
                target,
                start_x,
                original_font_size,
            } => (target, Text::body_resize_size(original_font_size, pointer.x - start_x)),
            _ => return false,
        };

        match self.document.text_mut(target) {
            Ok(text) => {
                if (text.font_size() - new_size).abs() < f64::EPSILON {
                    return false;
                }
                text.set_font_size(new_size);
                true
            }
            Err(err) => {
                log::warn!("Resize target lost: {}", err);
                self.interaction = Interaction::Idle;
                false
            }
        }
    }

    /// Finish a resize gesture.
    pub fn end_resize(&mut self) {
        if self.interaction.is_resizing() {
            log::debug!("{} finished", self.interaction.name());
            self.interaction = Interaction::Idle;
        }
    }

    /// Abort a resize, restoring the original font size. Returns true if a
    /// resize was in progress.
    pub fn cancel_resize(&mut self) -> bool {
        let (Some(target), Some(original)) =
            (self.interaction.target(), self.interaction.original_font_size())
        else {
            return false;
        };
        if let Ok(text) = self.document.text_mut(target) {
            text.set_font_size(original);
        }
        self.interaction = Interaction::Idle;
        true
    }

    /// Cursor for the canvas background.
    pub fn canvas_cursor(&self) -> Cursor {
        match self.modes.mode() {
            Mode::Draw => Cursor::Crosshair,
            Mode::Text => Cursor::Text,
            Mode::None if self.interaction.is_panning() => Cursor::Grabbing,
            Mode::None => Cursor::Grab,
        }
    }

    // --- Event dispatch ----------------------------------------------------

    /// Route a pointer event to the handler that owns it.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Outcome {
        match event {
            PointerEvent::Down {
                position,
                button,
                target,
            } => {
                if button != MouseButton::Left {
                    return Outcome::Unchanged;
                }
                self.on_pointer_down(position, target)
            }
            PointerEvent::Move { position } => self.on_pointer_move(position),
            PointerEvent::Up { .. } => self.finish_gesture(),
            PointerEvent::Leave => {
                if self.interaction.ends_on_leave() {
                    self.finish_gesture()
                } else {
                    Outcome::Unchanged
                }
            }
            PointerEvent::Wheel { delta, .. } => {
                Outcome::from_changed(self.zoom(ZoomDirection::from_wheel_delta(delta.y)))
            }
            PointerEvent::Click { position, target } => self.on_click(position, target),
        }
    }

    /// Apply a discrete command.
    pub fn apply(&mut self, action: CanvasAction) -> Outcome {
        match action {
            CanvasAction::ToggleDraw => {
                self.toggle_draw_mode();
                Outcome::Redraw
            }
            CanvasAction::ToggleText => {
                self.toggle_text_mode();
                Outcome::Redraw
            }
            CanvasAction::Cancel => {
                if self.cancel_resize() {
                    Outcome::Redraw
                } else if !self.interaction.is_idle() {
                    self.finish_gesture()
                } else if self.cancel_text_request() {
                    Outcome::Unchanged
                } else {
                    Outcome::from_changed(self.deselect_text().is_some())
                }
            }
            CanvasAction::ZoomIn => Outcome::from_changed(self.zoom(ZoomDirection::In)),
            CanvasAction::ZoomOut => Outcome::from_changed(self.zoom(ZoomDirection::Out)),
            CanvasAction::ResetView => Outcome::from_changed(self.reset_view()),
        }
    }

    fn on_pointer_down(&mut self, position: Point, target: Target) -> Outcome {
        let result = match target {
            Target::Handle(corner) => self
                .begin_handle_resize(position, corner)
                .map(|()| Outcome::Redraw),
            Target::Shape(id) if !self.modes.is_draw_enabled() && self.widgets.is_selected(id) => {
                self.begin_body_resize(position, id).map(|()| Outcome::Unchanged)
            }
            _ => match self.modes.mode() {
                Mode::Draw => self.begin_path(position).map(|_| Outcome::Redraw),
                Mode::None => self.begin_pan(position).map(|()| Outcome::Redraw),
                Mode::Text => Ok(Outcome::Unchanged),
            },
        };

        result.unwrap_or_else(|err| {
            log::debug!("Pointer down ignored: {}", err);
            Outcome::Unchanged
        })
    }

    fn on_pointer_move(&mut self, position: Point) -> Outcome {
        let changed = match self.interaction {
            Interaction::Idle => false,
            Interaction::Panning { .. } => self.update_pan(position),
            Interaction::Drawing { .. } => self.extend_path(position),
            Interaction::HandleResize { .. } | Interaction::BodyResize { .. } => {
                self.update_resize(position)
            }
        };
        Outcome::from_changed(changed)
    }

    fn on_click(&mut self, position: Point, target: Target) -> Outcome {
        match target {
            Target::Shape(id) if self.document.text(id).is_ok() => match self.select_text(id) {
                Ok(_) => Outcome::Redraw,
                Err(err) => {
                    log::debug!("Click ignored: {}", err);
                    Outcome::Unchanged
                }
            },
            Target::Handle(_) => Outcome::Unchanged,
            _ if self.modes.is_text_enabled() => match self.request_text(position) {
                Ok(request) => Outcome::RequestText(request),
                Err(err) => {
                    log::debug!("Click ignored: {}", err);
                    Outcome::Unchanged
                }
            },
            _ => Outcome::Unchanged,
        }
    }

    /// End whatever gesture is in progress.
    fn finish_gesture(&mut self) -> Outcome {
        match self.interaction {
            Interaction::Idle => Outcome::Unchanged,
            Interaction::Panning { .. } => {
                self.end_pan();
                Outcome::Redraw
            }
            Interaction::Drawing { .. } => {
                self.end_path();
                Outcome::Unchanged
            }
            Interaction::HandleResize { .. } | Interaction::BodyResize { .. } => {
                self.end_resize();
                Outcome::Unchanged
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), CanvasError> {
        if self.interaction.is_idle() {
            Ok(())
        } else {
            Err(CanvasError::GestureInProgress(self.interaction.name()))
        }
    }
}
