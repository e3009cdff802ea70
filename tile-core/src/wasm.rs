//! WebAssembly bindings for tile-core.
//!
//! Everything crosses the boundary as JSON strings in the same camelCase
//! shape the host already stores.

use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use crate::action::Action;
use crate::error::EditorError;
use crate::event::InputEvent;
use crate::payload::{DesignJson, ProjectExport};
use crate::session::EditorSession;
use crate::template::Template;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Parse host JSON, reporting failures as invalid input.
fn parse<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json)
        .map_err(|e| EditorError::InvalidInput(format!("{what} JSON: {e}")).to_string())
}

/// Editor session handle for JavaScript hosts.
#[wasm_bindgen]
pub struct WasmEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Start an empty design from template JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the template JSON is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(template_json: &str) -> Result<WasmEditor, String> {
        let template: Template = parse("template", template_json)?;
        Ok(Self {
            session: EditorSession::new(template),
        })
    }

    /// Reopen a saved `design_json` payload.
    ///
    /// # Errors
    ///
    /// Returns an error string if the design JSON is invalid.
    #[wasm_bindgen(js_name = fromDesignJson)]
    pub fn from_design_json(design_json: &str) -> Result<WasmEditor, String> {
        let design: DesignJson = parse("design", design_json)?;
        Ok(Self {
            session: EditorSession::from_design(design),
        })
    }

    /// Dispatch an action given as `{"type": ..., "payload": ...}`.
    ///
    /// # Errors
    ///
    /// Returns an error string for invalid JSON or a locked design.
    pub fn dispatch(&mut self, action_json: &str) -> Result<(), String> {
        let action: Action = parse("action", action_json)?;
        self.session.dispatch(action).map_err(|e| e.to_string())
    }

    /// Feed a raw input event given as `{"type": ..., "data": ...}`.
    ///
    /// # Errors
    ///
    /// Returns an error string for invalid JSON, non-finite numbers or a
    /// locked design.
    #[wasm_bindgen(js_name = handleInput)]
    pub fn handle_input(&mut self, event_json: &str) -> Result<(), String> {
        let event: InputEvent = parse("input event", event_json)?;
        self.session.handle_input(&event).map_err(|e| e.to_string())
    }

    /// The committed document as JSON.
    #[wasm_bindgen(js_name = getDocumentJson)]
    #[must_use]
    pub fn get_document_json(&self) -> String {
        serde_json::to_string(self.session.document()).unwrap_or_default()
    }

    /// The effective elements for the active variant as JSON.
    #[wasm_bindgen(js_name = getEffectiveElementsJson)]
    #[must_use]
    pub fn get_effective_elements_json(&self) -> String {
        serde_json::to_string(&self.session.effective_elements()).unwrap_or_default()
    }

    /// The save payload `{title, design_json}` as JSON.
    #[wasm_bindgen(js_name = getSavedDesignJson)]
    #[must_use]
    pub fn get_saved_design_json(&self) -> String {
        serde_json::to_string(&self.session.saved_design()).unwrap_or_default()
    }

    /// Project export JSON stamped with `export_millis` since the epoch.
    ///
    /// # Errors
    ///
    /// Returns an error string for an out-of-range timestamp.
    #[wasm_bindgen(js_name = exportProjectJson)]
    #[allow(clippy::cast_possible_truncation)]
    pub fn export_project_json(&self, export_millis: f64) -> Result<String, String> {
        let now = chrono::DateTime::from_timestamp_millis(export_millis as i64).ok_or_else(|| {
            EditorError::InvalidInput(format!("timestamp out of range: {export_millis}"))
                .to_string()
        })?;
        ProjectExport::new(self.session.document(), now)
            .to_json()
            .map_err(|e| e.to_string())
    }

    /// Whether the design is locked.
    #[wasm_bindgen(js_name = isReadOnly)]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.session.is_read_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"{"id":"t","name":"Tile","width":100,"height":200,"backgroundImage":null,"orientation":"vertical"}"#;

    #[test]
    fn test_new_rejects_invalid_template() {
        let err = WasmEditor::new("{ nope }").err().expect("invalid");
        assert!(err.starts_with("Invalid input: template JSON"), "{err}");
    }

    #[test]
    fn test_handle_input_rejects_bad_event() {
        let mut editor = WasmEditor::new(TEMPLATE).expect("editor");
        let err = editor
            .handle_input(r#"{"type":"wheel","data":{"x":1}}"#)
            .expect_err("missing fields");
        assert!(err.starts_with("Invalid input: input event JSON"), "{err}");
    }

    #[test]
    fn test_dispatch_json_action() {
        let mut editor = WasmEditor::new(TEMPLATE).expect("editor");
        editor
            .dispatch(r#"{"type":"SET_CANVAS_SCALE","payload":2.0}"#)
            .expect("dispatch");
        let doc: serde_json::Value =
            serde_json::from_str(&editor.get_document_json()).expect("json");
        assert_eq!(doc["canvas"]["scale"], 2.0);
        assert!(!editor.is_read_only());
    }

    #[test]
    fn test_dispatch_rejects_unknown_action() {
        let mut editor = WasmEditor::new(TEMPLATE).expect("editor");
        assert!(editor.dispatch(r#"{"type":"NOPE"}"#).is_err());
    }

    #[test]
    fn test_export_project_json() {
        let editor = WasmEditor::new(TEMPLATE).expect("editor");
        let json = editor.export_project_json(0.0).expect("export");
        assert!(json.contains("\"exportDate\""));
    }
}
