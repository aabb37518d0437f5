/// YT Tab Sorter - Chrome Extension that orders YouTube tabs by video length
/// Built with Rust + WASM

pub mod config;
pub mod duration;
pub mod error;
pub mod host;
pub mod operations;
pub mod probe;
pub mod tab_data;
pub mod watch_url;

use config::SorterConfig;
use host::ChromeHost;
use probe::{DomPage, ProbePath, probe_duration};
use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export URL classification for JavaScript access
#[wasm_bindgen]
pub fn is_watch_url(url: &str) -> bool {
    watch_url::is_watch_url(Some(url), &SorterConfig::default())
}

// Toolbar click: sort the current window with default options
#[wasm_bindgen]
pub async fn sort_tabs() {
    operations::run(&ChromeHost, &SorterConfig::default()).await;
}

// Same as `sort_tabs`, with options from the JS side
#[wasm_bindgen]
pub async fn sort_tabs_with_config(options: JsValue) {
    match SorterConfig::from_js(options) {
        Ok(config) => {
            operations::run(&ChromeHost, &config).await;
        }
        Err(e) => log::error!("Error sorting tabs: {}", e),
    }
}

// Probe entry for `chrome.scripting.executeScript`
#[wasm_bindgen]
pub fn probe_injected() -> f64 {
    probe_duration(&DomPage::current(), ProbePath::Injected)
}

// Probe entry for the content script that runs on page load (`content.js`)
#[wasm_bindgen]
pub fn probe_page() -> f64 {
    let duration = probe_duration(&DomPage::current(), ProbePath::AutoRun);
    log::info!("Video duration: {}", duration);
    duration
}
