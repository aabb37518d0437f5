/// `PageSource` backed by the live document
use super::PageSource;
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlMediaElement};

const MEDIA_SELECTOR: &str = "video";
const DURATION_LABEL_SELECTOR: &str = ".ytp-time-duration";
const DURATION_META_SELECTOR: &str = "meta[itemprop=\"duration\"]";
const PLAYER_RESPONSE_GLOBAL: &str = "ytInitialPlayerResponse";

pub struct DomPage {
    document: Option<Document>,
}

impl DomPage {
    /// Wrap the current window's document (absent in worker contexts)
    pub fn current() -> DomPage {
        DomPage {
            document: web_sys::window().and_then(|w| w.document()),
        }
    }

    fn text_of(&self, selector: &str) -> Option<String> {
        let element = self.document.as_ref()?.query_selector(selector).ok()??;
        element.text_content()
    }
}

impl PageSource for DomPage {
    fn media_duration(&self) -> Option<f64> {
        let element = self
            .document
            .as_ref()?
            .query_selector(MEDIA_SELECTOR)
            .ok()??;
        let media = element.dyn_into::<HtmlMediaElement>().ok()?;
        Some(media.duration())
    }

    fn duration_label(&self) -> Option<String> {
        self.text_of(DURATION_LABEL_SELECTOR)
    }

    fn duration_meta(&self) -> Option<String> {
        let element = self
            .document
            .as_ref()?
            .query_selector(DURATION_META_SELECTOR)
            .ok()??;
        element.get_attribute("content")
    }

    fn script_payloads(&self) -> Vec<String> {
        let Some(scripts) = self
            .document
            .as_ref()
            .and_then(|doc| doc.query_selector_all("script").ok())
        else {
            return Vec::new();
        };

        (0..scripts.length())
            .filter_map(|i| scripts.get(i))
            .filter_map(|node| node.text_content())
            .collect()
    }

    fn player_length_seconds(&self) -> Option<String> {
        let global = js_sys::global();
        let response = get_object(&global, PLAYER_RESPONSE_GLOBAL)?;
        let details = get_object(&response, "videoDetails")?;
        let length = Reflect::get(&details, &JsValue::from_str("lengthSeconds")).ok()?;

        // Usually a string, occasionally a bare number
        length
            .as_string()
            .or_else(|| length.as_f64().map(|n| format!("{}", n.trunc())))
    }
}

fn get_object(target: &JsValue, key: &str) -> Option<JsValue> {
    let value = Reflect::get(target, &JsValue::from_str(key)).ok()?;
    if value.is_object() { Some(value) } else { None }
}
