use editor::{DocumentSource, GatewayError};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::File;

/// A file picked through an `<input type="file">`.
pub struct BrowserFile {
    file: File,
    name: String,
}

impl BrowserFile {
    pub fn new(file: File) -> Self {
        let name = file.name();
        Self { file, name }
    }
}

impl DocumentSource for BrowserFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_to_string(&self) -> Result<String, GatewayError> {
        let read_error = |reason: String| GatewayError::Read {
            name: self.name.clone(),
            reason,
        };
        let text = JsFuture::from(self.file.text())
            .await
            .map_err(|e| read_error(js_error_text(&e)))?;
        text.as_string()
            .ok_or_else(|| read_error("file text was not a string".to_string()))
    }
}

fn js_error_text(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
