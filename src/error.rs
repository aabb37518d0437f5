/// Error types for host calls and sort runs
use thiserror::Error;
use wasm_bindgen::JsValue;

/// A host (browser API) call that rejected or returned something unusable
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> HostError {
        HostError(message.into())
    }
}

impl From<JsValue> for HostError {
    fn from(value: JsValue) -> Self {
        match value.as_string() {
            Some(message) => HostError(message),
            None => HostError(format!("{:?}", value)),
        }
    }
}

impl From<serde_wasm_bindgen::Error> for HostError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        HostError(format!("Failed to parse host value: {}", err))
    }
}

/// Failures that end a sort run
#[derive(Debug, Error)]
pub enum SortError {
    #[error("Failed to get tabs: {0}")]
    Enumerate(#[source] HostError),

    #[error("Failed to move tab {tab_id} to index {index}: {source}")]
    Move {
        tab_id: i32,
        index: i32,
        #[source]
        source: HostError,
    },
}

/// Options passed from JS that don't fit `SorterConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid sorter options: {0}")]
    Invalid(String),
}
