use console_error_panic_hook::set_once;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

use editor::{EditorConfig, EditorSession, MapEvent, Mode, Pointer};
use foundation::math::Vec2;
use scene::GeometryType;

mod bridge;
mod download;
mod file_source;

use file_source::BrowserFile;

thread_local! {
    static SESSION: RefCell<Option<EditorSession>> = const { RefCell::new(None) };
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Logs `msg` and shows it in an alert.
fn report(msg: &str) {
    log(msg);
    if let Some(window) = web_sys::window()
        && let Err(err) = window.alert_with_message(msg)
    {
        web_sys::console::log_2(&JsValue::from_str("alert failed:"), &err);
    }
}

fn with_session<R>(f: impl FnOnce(&mut EditorSession) -> R) -> Result<R, JsValue> {
    SESSION.with(|cell| {
        let mut slot = cell.borrow_mut();
        let session = slot
            .as_mut()
            .ok_or_else(|| JsValue::from_str("editor not initialized"))?;
        Ok(f(session))
    })
}

fn install(config: EditorConfig) -> Result<(), JsValue> {
    let session = EditorSession::new(config).map_err(js_err)?;
    SESSION.with(|cell| *cell.borrow_mut() = Some(session));
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    install(EditorConfig::default())
}

/// Replaces the session with one built from a JSON config. Drops all features.
#[wasm_bindgen]
pub fn configure(config_json: &str) -> Result<(), JsValue> {
    install(EditorConfig::from_json_str(config_json).map_err(js_err)?)
}

/// Initial view, style and drawable types as JSON.
#[wasm_bindgen]
pub fn view_config() -> Result<String, JsValue> {
    with_session(|s| bridge::view_json(s.config()).to_string())
}

#[wasm_bindgen]
pub fn set_mode(mode: &str) -> Result<bool, JsValue> {
    let mode: Mode = mode.parse().map_err(js_err)?;
    with_session(|s| s.set_mode(mode))
}

#[wasm_bindgen]
pub fn current_mode() -> Result<String, JsValue> {
    with_session(|s| s.mode().to_string())
}

/// Handler for the geometry-type `<select>`.
#[wasm_bindgen]
pub fn set_geometry_type(ty: &str) -> Result<(), JsValue> {
    let ty: GeometryType = ty.parse().map_err(js_err)?;
    with_session(|s| s.set_geometry_type(ty))?.map_err(js_err)
}

/// Runs `event` and returns its outcome with the store changes it caused.
fn dispatch(event: MapEvent) -> Result<String, JsValue> {
    with_session(|s| {
        let outcome = s.handle_event(event);
        bridge::outcome_json(&outcome, &s.drain_changes()).to_string()
    })
}

fn pointer(x: f64, y: f64, resolution: f64) -> Pointer {
    Pointer::new(Vec2::new(x, y), resolution)
}

#[wasm_bindgen]
pub fn map_click(x: f64, y: f64, resolution: f64) -> Result<String, JsValue> {
    dispatch(MapEvent::SingleClick(pointer(x, y, resolution)))
}

#[wasm_bindgen]
pub fn map_double_click(x: f64, y: f64, resolution: f64) -> Result<String, JsValue> {
    dispatch(MapEvent::DoubleClick(pointer(x, y, resolution)))
}

#[wasm_bindgen]
pub fn pointer_down(x: f64, y: f64, resolution: f64) -> Result<String, JsValue> {
    dispatch(MapEvent::PointerDown(pointer(x, y, resolution)))
}

#[wasm_bindgen]
pub fn pointer_drag(x: f64, y: f64, resolution: f64) -> Result<String, JsValue> {
    dispatch(MapEvent::PointerDrag(pointer(x, y, resolution)))
}

#[wasm_bindgen]
pub fn pointer_up(x: f64, y: f64, resolution: f64) -> Result<String, JsValue> {
    dispatch(MapEvent::PointerUp(pointer(x, y, resolution)))
}

#[wasm_bindgen]
pub fn finish_drawing() -> Result<String, JsValue> {
    with_session(|s| {
        let outcome = s.finish_drawing();
        bridge::outcome_json(&outcome, &s.drain_changes()).to_string()
    })
}

#[wasm_bindgen]
pub fn abort_drawing() -> Result<bool, JsValue> {
    with_session(|s| s.abort_drawing())
}

/// Current popup as JSON, or `null`.
#[wasm_bindgen]
pub fn popup() -> Result<String, JsValue> {
    with_session(|s| bridge::popup_json(s.popup()).to_string())
}

/// `change` handler of the popup's name input. Returns the store changes.
#[wasm_bindgen]
pub fn popup_input(value: &str) -> Result<String, JsValue> {
    with_session(|s| {
        let committed = s.input_name(value);
        let changes = bridge::changes_json(&s.drain_changes()).to_string();
        committed.map(|()| changes)
    })?
    .map_err(js_err)
}

#[wasm_bindgen]
pub fn close_popup() -> Result<bool, JsValue> {
    with_session(|s| s.close_popup())
}

#[wasm_bindgen]
pub fn feature_count() -> Result<usize, JsValue> {
    with_session(|s| s.store().len())
}

/// Serializes every feature and starts a download of it.
#[wasm_bindgen]
pub fn export_download() -> Result<(), JsValue> {
    let doc = with_session(|s| s.export())?.map_err(js_err)?;
    download::offer_download(&doc)
}

/// Reads a picked file and appends its features. Resolves to
/// `{"added": n, "changes": [...]}`.
#[wasm_bindgen]
pub async fn import_file(file: web_sys::File) -> Result<String, JsValue> {
    let source = BrowserFile::new(file);
    // The session is not borrowed while the read is pending.
    let imported = match editor::gateway::read_document(&source).await {
        Ok(text) => with_session(|s| {
            s.import_text(&text)
                .map(|added| bridge::import_json(added.len(), &s.drain_changes()).to_string())
        })?,
        Err(err) => Err(err),
    };
    imported.map_err(|err| {
        report(&bridge::import_failure_message(&err));
        js_err(err)
    })
}
