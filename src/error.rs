//! Crate error type. Gameplay itself never fails; these cover the browser
//! plumbing around it (storage, config, JS-provided names).

use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum PetTapError {
    #[error("browser storage is not available")]
    StorageUnavailable,

    #[error("failed to write storage key '{key}'")]
    StorageWrite { key: &'static str },

    #[error("invalid game config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("unknown character '{0}'")]
    UnknownCharacter(String),

    #[error("element '{0}' not found")]
    MissingElement(String),

    #[error("game is not mounted; call mount() first")]
    NotMounted,
}

impl From<PetTapError> for JsValue {
    fn from(err: PetTapError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
