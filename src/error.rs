/// Failures the effects can run into.
///
/// Only `Config` is ever surfaced to the page; the others are absorbed by the
/// lifecycle controller and logged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FxError {
    #[error("rendering context unavailable: {0}")]
    ResourceUnavailable(String),
    #[error("image '{0}' failed to load")]
    ImageLoad(String),
    #[error("invalid effect configuration: {0}")]
    Config(String),
    #[error("shader program failed to build: {0}")]
    Shader(String),
    #[error("host call failed: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, FxError>;

impl From<serde_json::Error> for FxError {
    fn from(err: serde_json::Error) -> Self {
        FxError::Config(err.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<FxError> for wasm_bindgen::JsValue {
    fn from(err: FxError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for FxError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        FxError::Js(format!("{:?}", value))
    }
}
