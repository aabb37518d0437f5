/// Run options for the sorter
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

/// Default time a single tab probe may take before the tab counts as unknown
pub const DEFAULT_PROBE_TIMEOUT_MS: u32 = 5_000;

/// Options for one sort run. Every field has a default, so the JS side
/// can pass a partial object (or nothing at all).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SorterConfig {
    /// Hostnames that serve watch pages
    pub watch_hosts: Vec<String>,
    /// Path of the watch page
    pub watch_path: String,
    /// Query parameter carrying the video id
    pub video_param: String,
    /// Per-tab probe timeout; 0 waits forever
    pub probe_timeout_ms: u32,
}

impl Default for SorterConfig {
    fn default() -> Self {
        SorterConfig {
            watch_hosts: vec!["www.youtube.com".to_string(), "youtube.com".to_string()],
            watch_path: "/watch".to_string(),
            video_param: "v".to_string(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

impl SorterConfig {
    /// Read options handed over from JS. `undefined`/`null` mean defaults.
    pub fn from_js(value: JsValue) -> Result<SorterConfig, ConfigError> {
        if value.is_null() || value.is_undefined() {
            return Ok(SorterConfig::default());
        }

        serde_wasm_bindgen::from_value(value).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
