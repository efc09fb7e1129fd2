/// Manga Sync - Web Extension core
/// Built with Rust + WASM

pub mod api;
pub mod browser;
pub mod chapter;
pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod dedup;
pub mod dispatcher;
pub mod matcher;
pub mod menu;
pub mod messages;
pub mod models;
pub mod service;
pub mod strategy;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;

pub use browser::BackgroundService;
pub use client::MangaClient;
pub use content::scrape_manga_info;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export the matcher for the popup's "is this page tracked" badge
#[wasm_bindgen(js_name = isPathTracked)]
pub fn is_path_tracked(url: &str, storage: JsValue) -> bool {
    let Ok(storage) = serde_wasm_bindgen::from_value::<config::StorageData>(storage) else {
        return false;
    };
    matcher::match_url(url, &storage.websites, &storage.sources).is_some_and(|site| site.is_path_tracked())
}
