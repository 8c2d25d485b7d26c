//! Core application state and lifecycle.

use kurbo::Rect;
use peniko::Color;
use serde::{Deserialize, Serialize};
use sketchsvg_core::canvas::{Canvas, CanvasAction, CanvasSettings, Outcome};
use sketchsvg_core::input::{Modifiers, PointerEvent};
use sketchsvg_core::prompt::{TextRequest, TextResponse};
use sketchsvg_core::shapes::{SerializableColor, ShapeId, ShapeStyle, Text};
use sketchsvg_core::tools::Mode;
use sketchsvg_render::{RenderContext, RenderResult, Renderer, Surface, SvgRenderer};
use thiserror::Error;

use crate::shortcuts::ShortcutRegistry;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Parse a CSS hex color like "#000" or "#0000ff".
fn parse_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        3 => {
            let mut short = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some(Color::from_rgba8(short.next()??, short.next()??, short.next()??, 255))
        }
        6 => Some(Color::from_rgba8(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
            255,
        )),
        _ => None,
    }
}

/// Application configuration.
///
/// Loaded from JSON; every field is optional and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scale change per zoom step.
    pub zoom_step: f64,
    /// Stroke colour of freehand paths.
    pub stroke_color: String,
    /// Stroke width of freehand paths.
    pub stroke_width: f64,
    /// Fill colour of text annotations.
    pub text_color: String,
    /// Font size of new text annotations.
    pub font_size: f64,
    /// Fill colour of resize handles.
    pub handle_color: String,
    /// Log level name (`error` .. `trace`).
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            zoom_step: 0.1,
            stroke_color: "#000".to_string(),
            stroke_width: 2.0,
            text_color: "#000".to_string(),
            font_size: Text::DEFAULT_FONT_SIZE,
            handle_color: "#00f".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            return Err(invalid("zoom_step", "must be a positive number"));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width >= 0.0) {
            return Err(invalid("stroke_width", "must not be negative"));
        }
        if !(self.font_size.is_finite() && self.font_size >= Text::MIN_FONT_SIZE) {
            return Err(invalid(
                "font_size",
                format!("must be at least {}", Text::MIN_FONT_SIZE),
            ));
        }
        self.stroke()?;
        self.text_fill()?;
        self.handle_fill()?;
        self.log_level()?;
        Ok(())
    }

    /// Log level to initialise the logger with.
    pub fn log_level(&self) -> Result<log::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| invalid("log_level", format!("unknown level {:?}", self.log_level)))
    }

    /// Handle fill colour.
    pub fn handle_fill(&self) -> Result<Color, ConfigError> {
        color_field("handle_color", &self.handle_color)
    }

    fn stroke(&self) -> Result<Color, ConfigError> {
        color_field("stroke_color", &self.stroke_color)
    }

    fn text_fill(&self) -> Result<Color, ConfigError> {
        color_field("text_color", &self.text_color)
    }

    /// Canvas settings derived from this config.
    pub fn canvas_settings(&self) -> Result<CanvasSettings, ConfigError> {
        let freehand_style = ShapeStyle {
            stroke_color: Some(SerializableColor::from(self.stroke()?)),
            stroke_width: self.stroke_width,
            ..ShapeStyle::stroke()
        };
        let text_style = ShapeStyle {
            fill_color: Some(SerializableColor::from(self.text_fill()?)),
            ..ShapeStyle::text()
        };
        Ok(CanvasSettings {
            zoom_step: self.zoom_step,
            freehand_style,
            text_style,
            default_font_size: self.font_size,
        })
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn color_field(field: &'static str, value: &str) -> Result<Color, ConfigError> {
    parse_color(value).ok_or_else(|| invalid(field, format!("{value:?} is not a hex colour")))
}

/// Glues the canvas, the renderer and a surface together.
///
/// Every entry point feeds one input to the canvas and re-renders before
/// returning whenever the canvas reports a visible change.
pub struct App<S: Surface> {
    canvas: Canvas,
    renderer: SvgRenderer,
    surface: S,
    handle_color: Color,
}

impl<S: Surface> App<S> {
    /// Create the application and draw the initial (empty) frame.
    pub fn new(surface: S, config: &AppConfig) -> Result<Self, ConfigError> {
        let mut app = Self {
            canvas: Canvas::with_settings(config.canvas_settings()?),
            renderer: SvgRenderer::new(),
            surface,
            handle_color: config.handle_fill()?,
        };
        app.redraw();
        log::info!("Canvas ready ({} mode)", app.mode().display_name());
        Ok(app)
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.canvas.mode()
    }

    /// Update the on-screen rectangle of the surface.
    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.canvas.mapper.viewport() != Some(viewport) {
            self.canvas.mapper.attach(viewport);
        }
    }

    /// Feed a pointer event. Returns a text request the host must answer.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Option<TextRequest> {
        let outcome = self.canvas.handle_pointer_event(event);
        self.settle(outcome)
    }

    /// Feed a key press. Returns true if it was bound to an action.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        match ShortcutRegistry::lookup(key, modifiers) {
            Some(action) => {
                log::debug!("Shortcut {:?} -> {:?}", key, action);
                self.apply(action);
                true
            }
            None => false,
        }
    }

    /// Apply a discrete command.
    pub fn apply(&mut self, action: CanvasAction) {
        let outcome = self.canvas.apply(action);
        // Commands never ask for text.
        let _ = self.settle(outcome);
    }

    /// Answer a text request. Returns the created annotation.
    pub fn submit_text(&mut self, request_id: u64, response: TextResponse) -> Option<ShapeId> {
        match self.canvas.submit_text(request_id, response) {
            Ok(Some(id)) => {
                self.redraw();
                Some(id)
            }
            Ok(None) => None,
            Err(err) => {
                log::debug!("Text submission ignored: {}", err);
                None
            }
        }
    }

    /// Sync the surface with the canvas.
    pub fn render(&mut self) -> RenderResult<()> {
        let ctx = RenderContext::new(&self.canvas).with_handle_color(self.handle_color);
        self.renderer.render(&ctx, &mut self.surface)
    }

    fn redraw(&mut self) {
        if let Err(err) = self.render() {
            log::error!("Render failed: {}", err);
        }
    }

    fn settle(&mut self, outcome: Outcome) -> Option<TextRequest> {
        match outcome {
            Outcome::Unchanged => None,
            Outcome::Redraw => {
                self.redraw();
                None
            }
            Outcome::RequestText(request) => Some(request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Vec2};
    use sketchsvg_core::input::MouseButton;
    use sketchsvg_core::widget::Corner;
    use sketchsvg_render::{MemorySurface, NodeKey};

    fn new_app() -> App<MemorySurface> {
        App::new(MemorySurface::new(), &AppConfig::default()).unwrap()
    }

    /// Press, drag through `path`, and release, resolving the target the way
    /// the browser would.
    fn drag(app: &mut App<MemorySurface>, path: &[(f64, f64)]) {
        let (x, y) = path[0];
        let position = Point::new(x, y);
        let target = app.surface().hit_test(app.canvas().to_canvas(position));
        let _ = app.handle_pointer_event(PointerEvent::Down {
            position,
            button: MouseButton::Left,
            target,
        });
        for &(x, y) in &path[1..] {
            let _ = app.handle_pointer_event(PointerEvent::Move {
                position: Point::new(x, y),
            });
        }
        let (x, y) = path[path.len() - 1];
        let _ = app.handle_pointer_event(PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        });
    }

    fn click(app: &mut App<MemorySurface>, x: f64, y: f64) -> Option<TextRequest> {
        let position = Point::new(x, y);
        let target = app.surface().hit_test(app.canvas().to_canvas(position));
        app.handle_pointer_event(PointerEvent::Click { position, target })
    }

    fn add_text(app: &mut App<MemorySurface>, x: f64, y: f64, content: &str) -> ShapeId {
        let request = click(app, x, y).unwrap();
        app.submit_text(request.id, TextResponse::Submitted(content.to_string()))
            .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.log_level().unwrap(), log::Level::Info);
        let settings = config.canvas_settings().unwrap();
        assert_eq!(settings, CanvasSettings::default());
    }

    #[test]
    fn test_config_overrides() {
        let json = r##"{
            "stroke_color": "#ff0000",
            "stroke_width": 4,
            "font_size": 24,
            "log_level": "debug"
        }"##;
        let config = AppConfig::from_json(json).unwrap();
        let settings = config.canvas_settings().unwrap();
        assert_eq!(
            settings.freehand_style.stroke_color,
            Some(SerializableColor::new(255, 0, 0, 255))
        );
        assert!((settings.freehand_style.stroke_width - 4.0).abs() < f64::EPSILON);
        assert!((settings.default_font_size - 24.0).abs() < f64::EPSILON);
        assert_eq!(config.log_level().unwrap(), log::Level::Debug);
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        assert!(matches!(AppConfig::from_json("not json"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            AppConfig::from_json(r#"{"stroke_color": "red"}"#),
            Err(ConfigError::Invalid { field: "stroke_color", .. })
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{"zoom_step": 0}"#),
            Err(ConfigError::Invalid { field: "zoom_step", .. })
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{"font_size": 2}"#),
            Err(ConfigError::Invalid { field: "font_size", .. })
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{"log_level": "loud"}"#),
            Err(ConfigError::Invalid { field: "log_level", .. })
        ));
    }

    #[test]
    fn test_parse_color() {
        let rgba = |s: &str| parse_color(s).map(SerializableColor::from);
        assert_eq!(rgba("#000"), Some(SerializableColor::new(0, 0, 0, 255)));
        assert_eq!(rgba("#00f"), Some(SerializableColor::new(0, 0, 255, 255)));
        assert_eq!(rgba(" #3b82f6 "), Some(SerializableColor::new(59, 130, 246, 255)));
        assert_eq!(rgba("#12"), None);
        assert_eq!(rgba("#ggg"), None);
        assert_eq!(rgba("blue"), None);
    }

    #[test]
    fn test_initial_frame() {
        let app = new_app();
        assert_eq!(app.surface().view_box(), Some("0 0 1000 1000"));
        assert_eq!(app.surface().cursor(), Some("grab"));
    }

    #[test]
    fn test_draw_path_end_to_end() {
        let mut app = new_app();
        assert!(app.handle_key("d", Modifiers::default()));
        assert_eq!(app.mode(), Mode::Draw);

        drag(&mut app, &[(10.0, 10.0), (20.0, 10.0), (20.0, 20.0)]);

        let element = &app.surface().elements()[0];
        assert_eq!(element.attribute("d"), Some("M10,10 L20,10 L20,20"));
        assert_eq!(element.attribute("stroke"), Some("#000"));
        assert_eq!(element.attribute("stroke-width"), Some("2"));
    }

    #[test]
    fn test_pan_and_zoom_update_view_box() {
        let mut app = new_app();
        drag(&mut app, &[(100.0, 100.0), (150.0, 80.0)]);
        assert_eq!(app.surface().view_box(), Some("-50 20 1000 1000"));

        app.apply(CanvasAction::ResetView);
        let _ = app.handle_pointer_event(PointerEvent::Wheel {
            position: Point::ZERO,
            delta: Vec2::new(0.0, 120.0),
        });
        let view_box = app.canvas().view_box();
        assert!((view_box.width - 1000.0 / 0.9).abs() < 1e-9);
        assert_eq!(app.surface().view_box(), Some(view_box.to_string().as_str()));
    }

    #[test]
    fn test_text_annotation_end_to_end() {
        let mut app = new_app();
        assert!(click(&mut app, 100.0, 100.0).is_none());

        app.handle_key("t", Modifiers::default());
        let id = add_text(&mut app, 100.0, 100.0, "Hello");
        let element = app.surface().element(NodeKey::Shape(id)).unwrap();
        assert_eq!(element.text, "Hello");
        assert_eq!(element.attribute("font-size"), Some("16"));
        assert_eq!(element.attribute("fill"), Some("#000"));

        // Clicking the annotation selects it and shows four handles.
        assert!(click(&mut app, 110.0, 95.0).is_none());
        assert!(app.canvas().widgets.is_selected(id));
        assert_eq!(app.surface().keys().len(), 5);
        assert_eq!(
            app.surface().element(NodeKey::Shape(id)).unwrap().style("cursor"),
            Some("move")
        );

        // Drag the south-east handle 8 units right: 16 -> 18.
        let bbox = app.surface().bbox(NodeKey::Shape(id));
        let se = Point::new(bbox.x1, bbox.y1);
        drag(&mut app, &[(se.x, se.y), (se.x + 8.0, se.y)]);
        let element = app.surface().element(NodeKey::Shape(id)).unwrap();
        assert_eq!(element.attribute("font-size"), Some("18"));
        assert_eq!(app.canvas().camera.offset, Vec2::ZERO);

        // Handles moved to the grown box.
        let bbox = app.surface().bbox(NodeKey::Shape(id));
        let handle = app.surface().element(NodeKey::Handle(Corner::SouthEast)).unwrap();
        assert_eq!(handle.attribute("x"), Some((bbox.x1 - 4.0).to_string().as_str()));

        // Escape deselects and removes the handles.
        assert!(app.handle_key("Escape", Modifiers::default()));
        assert_eq!(app.surface().keys(), vec![NodeKey::Shape(id)]);
        assert_eq!(
            app.surface().element(NodeKey::Shape(id)).unwrap().style("cursor"),
            Some("text")
        );
    }

    #[test]
    fn test_single_selection_end_to_end() {
        let mut app = new_app();
        app.apply(CanvasAction::ToggleText);
        let first = add_text(&mut app, 100.0, 100.0, "first");
        let second = add_text(&mut app, 100.0, 300.0, "second");

        click(&mut app, 105.0, 95.0);
        click(&mut app, 105.0, 295.0);
        assert!(!app.canvas().widgets.is_selected(first));
        assert!(app.canvas().widgets.is_selected(second));
        let handles = app
            .surface()
            .keys()
            .into_iter()
            .filter(|key| matches!(key, NodeKey::Handle(_)))
            .count();
        assert_eq!(handles, 4);
    }

    #[test]
    fn test_cancelled_text_request_adds_nothing() {
        let mut app = new_app();
        app.apply(CanvasAction::ToggleText);
        let request = click(&mut app, 50.0, 50.0).unwrap();
        assert_eq!(app.submit_text(request.id, TextResponse::Cancelled), None);
        assert!(app.surface().keys().is_empty());
        assert_eq!(app.submit_text(request.id, TextResponse::Submitted("late".into())), None);
    }

    #[test]
    fn test_shortcuts_ignore_command_modifiers() {
        let mut app = new_app();
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        assert!(!app.handle_key("d", ctrl));
        assert_eq!(app.mode(), Mode::None);
    }

    #[test]
    fn test_custom_colors_reach_surface() {
        let config = AppConfig {
            handle_color: "#f00".to_string(),
            text_color: "#123456".to_string(),
            ..AppConfig::default()
        };
        let mut app = App::new(MemorySurface::new(), &config).unwrap();
        app.apply(CanvasAction::ToggleText);
        let id = add_text(&mut app, 10.0, 50.0, "x");
        click(&mut app, 12.0, 45.0);
        assert!(app.canvas().widgets.is_selected(id));

        let text = app.surface().element(NodeKey::Shape(id)).unwrap();
        assert_eq!(text.attribute("fill"), Some("#123456"));
        let handle = app.surface().element(NodeKey::Handle(Corner::NorthWest)).unwrap();
        assert_eq!(handle.attribute("fill"), Some("#f00"));
    }
}
