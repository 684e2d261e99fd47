/// Errors surfaced by scene setup and content construction.
///
/// Only the canvas/WebGL variants abort startup. Everything else is logged by the
/// caller and the dependent content is left out of the scene.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no global window")]
    NoWindow,
    #[error("no document on window")]
    NoDocument,
    #[error("canvas not found: #{0}")]
    CanvasNotFound(String),
    #[error("element #{0} is not a canvas")]
    NotACanvas(String),
    #[error("WebGL2 not supported")]
    WebGlUnavailable,
    #[error("shader compile error: {0}")]
    Shader(String),
    #[error("program link error: {0}")]
    Program(String),
    #[error("font error: {0}")]
    Font(String),
    #[error("tessellation failed: {0}")]
    Tessellation(String),
    #[error("scene content has already been built")]
    ContentAlreadyBuilt,
    #[error("JS error: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Font(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<Error> for wasm_bindgen::JsValue {
    fn from(e: Error) -> Self {
        wasm_bindgen::JsValue::from(js_sys::Error::new(&e.to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for Error {
    fn from(v: wasm_bindgen::JsValue) -> Self {
        Error::Js(v.as_string().unwrap_or_else(|| format!("{v:?}")))
    }
}
