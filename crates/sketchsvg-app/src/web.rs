//! WebAssembly entry point and platform-specific code.

use crate::app::{App, AppConfig};
use crate::overlay::OverlaySlot;
use crate::shortcuts::ShortcutRegistry;
use kurbo::{Point, Rect, Vec2};
use sketchsvg_core::camera::ViewBox;
use sketchsvg_core::canvas::CanvasAction;
use sketchsvg_core::input::{Modifiers, MouseButton, PointerEvent, Target};
use sketchsvg_core::prompt::{TextRequest, TextResponse};
use sketchsvg_core::tools::Mode;
use sketchsvg_core::widget::Cursor;
use sketchsvg_render::{ElementKind, NodeKey, Surface, SurfaceError};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, EventTarget, FocusEvent, HtmlInputElement, KeyboardEvent, MouseEvent,
    SvgElement, SvgGraphicsElement, WheelEvent, Window,
};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// Id of the `<svg>` element the canvas mounts on.
const MOUNT_ID: &str = "sketch-canvas";
const KEY_ATTRIBUTE: &str = "data-key";
const CONFIG_ATTRIBUTE: &str = "data-config";
const DRAW_TOGGLE_ID: &str = "draw-toggle";
const TEXT_TOGGLE_ID: &str = "text-toggle";

fn js_error(err: JsValue) -> SurfaceError {
    SurfaceError::Backend(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// Surface backed by the browser's SVG DOM.
pub struct DomSurface {
    document: Document,
    root: SvgElement,
    elements: HashMap<NodeKey, Element>,
    order: Vec<NodeKey>,
}

impl DomSurface {
    pub fn new(document: Document, root: SvgElement) -> Self {
        Self {
            document,
            root,
            elements: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn element(&self, key: NodeKey) -> Result<&Element, SurfaceError> {
        self.elements.get(&key).ok_or(SurfaceError::NotFound(key))
    }

    /// On-screen rectangle of the root element.
    pub fn viewport(&self) -> Rect {
        let rect = self.root.get_bounding_client_rect();
        Rect::new(rect.left(), rect.top(), rect.right(), rect.bottom())
    }
}

impl Surface for DomSurface {
    fn ensure_element(&mut self, key: NodeKey, kind: ElementKind) -> Result<(), SurfaceError> {
        if self.elements.contains_key(&key) {
            return Ok(());
        }
        let element = self
            .document
            .create_element_ns(Some(SVG_NS), kind.tag_name())
            .map_err(js_error)?;
        element
            .set_attribute(KEY_ATTRIBUTE, &key.to_string())
            .map_err(js_error)?;
        self.root.append_child(&element).map_err(js_error)?;
        self.elements.insert(key, element);
        self.order.push(key);
        Ok(())
    }

    fn set_attribute(&mut self, key: NodeKey, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.element(key)?.set_attribute(name, value).map_err(js_error)
    }

    fn set_style(&mut self, key: NodeKey, property: &str, value: &str) -> Result<(), SurfaceError> {
        let element = self
            .element(key)?
            .dyn_ref::<SvgElement>()
            .ok_or_else(|| SurfaceError::Backend(format!("{key} is not an SVG element")))?;
        element.style().set_property(property, value).map_err(js_error)
    }

    fn set_text_content(&mut self, key: NodeKey, text: &str) -> Result<(), SurfaceError> {
        self.element(key)?.set_text_content(Some(text));
        Ok(())
    }

    fn remove_element(&mut self, key: NodeKey) -> Result<(), SurfaceError> {
        if let Some(element) = self.elements.remove(&key) {
            element.remove();
            self.order.retain(|k| *k != key);
        }
        Ok(())
    }

    fn set_view_box(&mut self, view_box: &ViewBox) -> Result<(), SurfaceError> {
        self.root
            .set_attribute("viewBox", &view_box.to_string())
            .map_err(js_error)
    }

    fn set_cursor(&mut self, cursor: Cursor) -> Result<(), SurfaceError> {
        self.root
            .style()
            .set_property("cursor", cursor.as_css())
            .map_err(js_error)
    }

    fn bbox(&self, key: NodeKey) -> Rect {
        self.elements
            .get(&key)
            .and_then(|element| element.dyn_ref::<SvgGraphicsElement>())
            .and_then(|element| element.get_b_box().ok())
            .map_or(Rect::ZERO, |rect| {
                Rect::from_origin_size(
                    (f64::from(rect.x()), f64::from(rect.y())),
                    (f64::from(rect.width()), f64::from(rect.height())),
                )
            })
    }

    fn keys(&self) -> Vec<NodeKey> {
        self.order.clone()
    }
}

/// Resolve the canvas target of a DOM event from the `data-key` attribute.
///
/// Freehand paths are not targets: a press on a stroke lands on the canvas.
fn resolve_target(target: Option<EventTarget>) -> Target {
    let Some(element) = target.and_then(|t| t.dyn_into::<Element>().ok()) else {
        return Target::Canvas;
    };
    let key = element
        .get_attribute(KEY_ATTRIBUTE)
        .and_then(|value| value.parse::<NodeKey>().ok());
    match key {
        Some(NodeKey::Handle(corner)) => Target::Handle(corner),
        Some(NodeKey::Shape(id)) if element.tag_name() == ElementKind::Text.tag_name() => {
            Target::Shape(id)
        }
        _ => Target::Canvas,
    }
}

fn client_point(event: &MouseEvent) -> Point {
    Point::new(f64::from(event.client_x()), f64::from(event.client_y()))
}

fn mouse_button(button: i16) -> MouseButton {
    match button {
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        _ => MouseButton::Left,
    }
}

fn key_modifiers(event: &KeyboardEvent) -> Modifiers {
    Modifiers {
        shift: event.shift_key(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        meta: event.meta_key(),
    }
}

/// Parse one parameter from a query string or hash.
/// Supports formats like `?log=debug`.
fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .trim_start_matches(['?', '#'])
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .and_then(|(_, value)| js_sys::decode_uri_component(value).ok())
        .map(String::from)
}

type EventClosure = Closure<dyn FnMut(web_sys::Event)>;

fn event_closure<E, F>(mut callback: F) -> EventClosure
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    Closure::wrap(Box::new(move |event: web_sys::Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            callback(event);
        }
    }) as Box<dyn FnMut(web_sys::Event)>)
}

/// Attach a listener for events of type `E`. The closure lives for the page.
fn listen<E, F>(target: &EventTarget, event_type: &str, callback: F) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let closure = event_closure(callback);
    target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// An event listener that is detached when dropped.
struct Listener {
    target: EventTarget,
    event_type: &'static str,
    closure: EventClosure,
}

impl Listener {
    fn new<E, F>(
        target: &EventTarget,
        event_type: &'static str,
        callback: F,
    ) -> Result<Self, JsValue>
    where
        E: JsCast + 'static,
        F: FnMut(E) + 'static,
    {
        let closure = event_closure(callback);
        target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event_type,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let callback = self.closure.as_ref().unchecked_ref();
        if self
            .target
            .remove_event_listener_with_callback(self.event_type, callback)
            .is_err()
        {
            log::warn!("Failed to detach {} listener", self.event_type);
        }
    }
}

/// Text entry box and its listeners. Dropping it detaches the listeners
/// and removes the box from the page.
struct TextOverlay {
    input: HtmlInputElement,
    listeners: Vec<Listener>,
}

impl Drop for TextOverlay {
    fn drop(&mut self) {
        self.listeners.clear();
        self.input.remove();
    }
}

/// Browser-side state shared by all listeners.
struct WebApp {
    app: App<DomSurface>,
    /// Text entry box answering the pending text request.
    overlay: OverlaySlot<TextOverlay>,
}

type Shared = Rc<RefCell<WebApp>>;

/// Feed a pointer event and open a text box if the canvas asks for text.
fn dispatch(shared: &Shared, document: &Document, event: PointerEvent) {
    let request = {
        let Ok(mut state) = shared.try_borrow_mut() else {
            log::warn!("Dropped re-entrant pointer event");
            return;
        };
        let viewport = state.app.surface().viewport();
        state.app.set_viewport(viewport);
        state.app.handle_pointer_event(event)
    };
    if let Some(request) = request {
        if let Err(err) = open_text_input(shared, document, request) {
            log::error!("Failed to open text input: {:?}", err);
        }
    }
}

/// Show a text box at the request position. Enter submits; Escape or
/// losing focus cancels.
fn open_text_input(
    shared: &Shared,
    document: &Document,
    request: TextRequest,
) -> Result<(), JsValue> {
    let screen = {
        let state = shared.borrow();
        let canvas = state.app.canvas();
        canvas.mapper.canvas_to_screen(request.position, &canvas.view_box())
    };

    let input = document.create_element("input")?.dyn_into::<HtmlInputElement>()?;
    input.set_type("text");
    input.set_class_name("sketch-text-input");
    let style = input.style();
    style.set_property("position", "fixed")?;
    style.set_property("left", &format!("{}px", screen.x))?;
    style.set_property("top", &format!("{}px", screen.y))?;
    document
        .body()
        .ok_or("document has no body")?
        .append_child(&input)?;

    let request_id = request.id;
    let done = Rc::new(Cell::new(false));
    let finish = {
        let shared = shared.clone();
        let field = input.clone();
        Rc::new(move |response: TextResponse| {
            if done.replace(true) {
                return;
            }
            let overlay = match shared.try_borrow_mut() {
                Ok(mut state) => {
                    if state.app.submit_text(request_id, response).is_some() {
                        log::debug!("Text request {} answered", request_id);
                    }
                    state.overlay.close(request_id)
                }
                Err(_) => {
                    log::debug!("Text request {} dropped", request_id);
                    field.remove();
                    None
                }
            };
            // Dropped outside the borrow: removing the box can fire events.
            drop(overlay);
        })
    };

    let keydown = {
        let finish = finish.clone();
        let field = input.clone();
        Listener::new(&input, "keydown", move |event: KeyboardEvent| {
            event.stop_propagation();
            match event.key().as_str() {
                "Enter" => finish(TextResponse::Submitted(field.value())),
                "Escape" => finish(TextResponse::Cancelled),
                _ => {}
            }
        })?
    };
    let blur = Listener::new(&input, "blur", move |_: FocusEvent| {
        finish(TextResponse::Cancelled)
    })?;

    let overlay = TextOverlay {
        input: input.clone(),
        listeners: vec![keydown, blur],
    };
    let previous = shared.borrow_mut().overlay.open(request_id, overlay);
    drop(previous);

    input.focus()?;
    Ok(())
}

/// Reflect the mode on the toolbar buttons.
fn sync_toolbar(document: &Document, mode: Mode) {
    let buttons = [
        (DRAW_TOGGLE_ID, mode == Mode::Draw),
        (TEXT_TOGGLE_ID, mode == Mode::Text),
    ];
    for (id, active) in buttons {
        if let Some(button) = document.get_element_by_id(id) {
            let pressed = if active { "true" } else { "false" };
            if button.set_attribute("aria-pressed", pressed).is_err() {
                log::warn!("Failed to update #{}", id);
            }
        }
    }
}

fn install_listeners(
    shared: &Shared,
    window: &Window,
    document: &Document,
    root: &SvgElement,
) -> Result<(), JsValue> {
    {
        let (shared, document) = (shared.clone(), document.clone());
        listen(root, "mousedown", move |event: MouseEvent| {
            event.prevent_default();
            let pointer = PointerEvent::Down {
                position: client_point(&event),
                button: mouse_button(event.button()),
                target: resolve_target(event.target()),
            };
            dispatch(&shared, &document, pointer);
        })?;
    }
    // Move and release are tracked on the window so resizes follow the
    // pointer outside the canvas.
    {
        let (shared, document) = (shared.clone(), document.clone());
        listen(window, "mousemove", move |event: MouseEvent| {
            let pointer = PointerEvent::Move {
                position: client_point(&event),
            };
            dispatch(&shared, &document, pointer);
        })?;
    }
    {
        let (shared, document) = (shared.clone(), document.clone());
        listen(window, "mouseup", move |event: MouseEvent| {
            let pointer = PointerEvent::Up {
                position: client_point(&event),
                button: mouse_button(event.button()),
            };
            dispatch(&shared, &document, pointer);
        })?;
    }
    {
        let (shared, document) = (shared.clone(), document.clone());
        listen(root, "mouseleave", move |_: MouseEvent| {
            dispatch(&shared, &document, PointerEvent::Leave);
        })?;
    }
    {
        let (shared, document) = (shared.clone(), document.clone());
        listen(root, "wheel", move |event: WheelEvent| {
            event.prevent_default();
            let pointer = PointerEvent::Wheel {
                position: client_point(&event),
                delta: Vec2::new(event.delta_x(), event.delta_y()),
            };
            dispatch(&shared, &document, pointer);
        })?;
    }
    {
        let (shared, document) = (shared.clone(), document.clone());
        listen(root, "click", move |event: MouseEvent| {
            let pointer = PointerEvent::Click {
                position: client_point(&event),
                target: resolve_target(event.target()),
            };
            dispatch(&shared, &document, pointer);
        })?;
    }
    {
        let (shared, document) = (shared.clone(), document.clone());
        listen(window, "keydown", move |event: KeyboardEvent| {
            let in_text_field = event
                .target()
                .is_some_and(|target| target.has_type::<HtmlInputElement>());
            if in_text_field {
                return;
            }
            let Ok(mut state) = shared.try_borrow_mut() else {
                return;
            };
            if state.app.handle_key(&event.key(), key_modifiers(&event)) {
                event.prevent_default();
                sync_toolbar(&document, state.app.mode());
            }
        })?;
    }

    for (id, action) in [
        (DRAW_TOGGLE_ID, CanvasAction::ToggleDraw),
        (TEXT_TOGGLE_ID, CanvasAction::ToggleText),
    ] {
        let Some(button) = document.get_element_by_id(id) else {
            log::debug!("No #{} button", id);
            continue;
        };
        let (shared, document) = (shared.clone(), document.clone());
        listen(&button, "click", move |_: MouseEvent| {
            let Ok(mut state) = shared.try_borrow_mut() else {
                return;
            };
            state.app.apply(action);
            sync_toolbar(&document, state.app.mode());
        })?;
    }

    Ok(())
}

/// Initialize and run the WASM application.
#[wasm_bindgen(start)]
pub fn run_wasm() -> Result<(), JsValue> {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let root = document
        .get_element_by_id(MOUNT_ID)
        .ok_or_else(|| format!("#{MOUNT_ID} not found"))?
        .dyn_into::<SvgElement>()?;

    let (mut config, config_error) = match root.get_attribute(CONFIG_ATTRIBUTE) {
        Some(json) => match AppConfig::from_json(&json) {
            Ok(config) => (config, None),
            Err(err) => (AppConfig::default(), Some(err)),
        },
        None => (AppConfig::default(), None),
    };
    if let Some(level) = window
        .location()
        .search()
        .ok()
        .and_then(|query| query_param(&query, "log"))
    {
        config.log_level = level;
    }

    // Initialize logging
    let level = config.log_level().unwrap_or(log::Level::Info);
    if console_log::init_with_level(level).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    if let Some(err) = config_error {
        log::warn!("Ignoring invalid {}: {}", CONFIG_ATTRIBUTE, err);
    }

    log::info!("Starting sketchsvg (WASM)");

    let surface = DomSurface::new(document.clone(), root.clone());
    let app = App::new(surface, &config).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let shared = Rc::new(RefCell::new(WebApp {
        app,
        overlay: OverlaySlot::new(),
    }));

    install_listeners(&shared, &window, &document, &root)?;
    sync_toolbar(&document, Mode::None);
    log::debug!("Shortcuts:\n{}", ShortcutRegistry::help_text());
    Ok(())
}
