/// Content-script side: reads manga details from the page DOM
use crate::browser::to_js;
use crate::strategy::{PageReader, StrategySelectors, scrape_manga};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

pub struct DomPageReader {
    document: Document,
}

impl DomPageReader {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Reader over the current window's document, if there is one
    pub fn current() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    fn element(&self, selector: &str) -> Option<Element> {
        // an invalid selector throws; treat it as no match
        self.document.query_selector(selector).ok().flatten()
    }
}

impl PageReader for DomPageReader {
    fn text(&self, selector: &str) -> Option<String> {
        self.element(selector)?.text_content()
    }

    fn attribute(&self, selector: &str, name: &str) -> Option<String> {
        self.element(selector)?.get_attribute(name)
    }
}

/// Scrape `{name, cover, coverSmall}` using the selectors of an
/// auto-add strategy; rejects with a readable message.
#[wasm_bindgen(js_name = scrapeMangaInfo)]
pub fn scrape_manga_info(strategy: JsValue) -> Result<JsValue, JsValue> {
    let selectors: StrategySelectors = serde_wasm_bindgen::from_value(strategy)
        .map_err(|e| JsValue::from_str(&format!("Invalid strategy: {}", e)))?;
    let reader = DomPageReader::current().ok_or_else(|| JsValue::from_str("No document available"))?;

    let manga = scrape_manga(&selectors, &reader).map_err(|e| {
        log::warn!("Manga Sync: {}", e);
        JsValue::from_str(&e.to_string())
    })?;
    to_js(&manga).map_err(|e| JsValue::from_str(&e))
}
