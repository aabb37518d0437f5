/// Browser host operations used by the sorter
use crate::error::HostError;
use crate::tab_data::{HostTab, TabInfo, addressable_tabs};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryCurrentWindowTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn injectDurationProbe(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn moveTab(tab_id: i32, index: i32) -> Result<(), JsValue>;

    fn delay(ms: u32) -> js_sys::Promise;
}

/// The three host calls a sort run needs, plus a timer for probe timeouts.
///
/// Runs are single-threaded (one wasm instance per service worker), so the
/// futures are not required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait TabHost {
    /// All tabs of the current window, in window order
    async fn query_tabs(&self) -> Result<Vec<TabInfo>, HostError>;

    /// Run the duration probe inside a tab and return whatever it produced
    async fn probe_tab(&self, tab_id: i32) -> Result<serde_json::Value, HostError>;

    async fn move_tab(&self, tab_id: i32, index: i32) -> Result<(), HostError>;

    async fn sleep(&self, ms: u32);
}

/// `TabHost` over the `chrome.*` extension APIs
pub struct ChromeHost;

impl TabHost for ChromeHost {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>, HostError> {
        let tabs_js = queryCurrentWindowTabs().await?;
        let raw: Vec<HostTab> = serde_wasm_bindgen::from_value(tabs_js)?;
        Ok(addressable_tabs(raw))
    }

    async fn probe_tab(&self, tab_id: i32) -> Result<serde_json::Value, HostError> {
        let result = injectDurationProbe(tab_id).await?;
        if result.is_null() || result.is_undefined() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_wasm_bindgen::from_value(result)?)
    }

    async fn move_tab(&self, tab_id: i32, index: i32) -> Result<(), HostError> {
        moveTab(tab_id, index).await?;
        Ok(())
    }

    async fn sleep(&self, ms: u32) {
        // setTimeout never rejects
        let _ = JsFuture::from(delay(ms)).await;
    }
}
