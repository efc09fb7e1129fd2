/// Bridge to the WebExtension APIs and the object the background script drives
use crate::api::ApiClient;
use crate::config::{
    ALL_KEYS, ConfigStore, Credentials, KEY_API_URL, KEY_BEARER_TOKEN, KEY_SOURCES, KEY_WEBSITES,
    StorageData, StoreError,
};
use crate::menu::{BrowserShell, MenuItem, ShellError, TabId};
use crate::messages::ExtensionMessage;
use crate::models::{Source, Website};
use crate::service::{Background, BrowserEvent};
use js_sys::{Array, Object, Promise, Reflect};
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(items: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeStorage(keys: JsValue) -> Result<(), JsValue>;

    fn hasContextMenus() -> bool;

    #[wasm_bindgen(catch)]
    async fn createContextMenu(id: &str, title: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateContextMenu(id: &str, visible: bool) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryActiveTabUrl() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn injectContentScript(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> Result<(), JsValue>;
}

/// Plain-object serialization; `storage.local` does not accept `Map`s
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, String> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("Failed to serialize: {:?}", e))
}

fn keys_array(keys: &[&str]) -> JsValue {
    keys.iter()
        .map(|key| JsValue::from_str(key))
        .collect::<Array>()
        .into()
}

/// `browser.storage.local`
pub struct BrowserStore;

impl BrowserStore {
    async fn set(&self, entries: &[(&str, JsValue)]) -> Result<(), StoreError> {
        let items = Object::new();
        for (key, value) in entries {
            Reflect::set(&items, &JsValue::from_str(key), value)
                .map_err(|e| StoreError(format!("{:?}", e)))?;
        }

        setStorage(items.into())
            .await
            .map_err(|e| StoreError(format!("Failed to save storage: {:?}", e)))
    }
}

impl ConfigStore for BrowserStore {
    async fn load(&self) -> Result<StorageData, StoreError> {
        let storage_js = getStorage(keys_array(&ALL_KEYS))
            .await
            .map_err(|e| StoreError(format!("Failed to get storage: {:?}", e)))?;

        if storage_js.is_null() || storage_js.is_undefined() {
            return Ok(StorageData::default());
        }

        serde_wasm_bindgen::from_value(storage_js)
            .map_err(|e| StoreError(format!("Failed to parse storage: {:?}", e)))
    }

    async fn save_websites(&self, websites: &[Website]) -> Result<(), StoreError> {
        let value = to_js(websites).map_err(StoreError)?;
        self.set(&[(KEY_WEBSITES, value)]).await
    }

    async fn save_sources(&self, sources: &[Source]) -> Result<(), StoreError> {
        let value = to_js(sources).map_err(StoreError)?;
        self.set(&[(KEY_SOURCES, value)]).await
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
        self.set(&[
            (KEY_API_URL, JsValue::from_str(&credentials.api_url)),
            (KEY_BEARER_TOKEN, JsValue::from_str(&credentials.bearer_token)),
        ])
        .await
    }

    async fn clear_credentials(&self) -> Result<(), StoreError> {
        removeStorage(keys_array(&[KEY_API_URL, KEY_BEARER_TOKEN]))
            .await
            .map_err(|e| StoreError(format!("Failed to clear storage: {:?}", e)))
    }
}

/// `browser.tabs`, `browser.scripting` and `browser.contextMenus`
pub struct BrowserTabs;

impl BrowserShell for BrowserTabs {
    fn has_context_menus(&self) -> bool {
        hasContextMenus()
    }

    async fn create_menu(&self, item: MenuItem) -> Result<(), ShellError> {
        createContextMenu(item.id(), item.title())
            .await
            .map_err(|e| ShellError(format!("{:?}", e)))
    }

    async fn set_menu_visible(&self, item: MenuItem, visible: bool) -> Result<(), ShellError> {
        updateContextMenu(item.id(), visible)
            .await
            .map_err(|e| ShellError(format!("{:?}", e)))
    }

    async fn active_tab_url(&self) -> Result<Option<String>, ShellError> {
        let url = queryActiveTabUrl()
            .await
            .map_err(|e| ShellError(format!("Failed to query tabs: {:?}", e)))?;
        Ok(url.as_string())
    }

    async fn inject_content_script(&self, tab_id: TabId) -> Result<(), ShellError> {
        injectContentScript(tab_id)
            .await
            .map_err(|e| ShellError(format!("Failed to inject: {:?}", e)))
    }

    async fn send_to_tab(&self, tab_id: TabId, message: &ExtensionMessage) -> Result<(), ShellError> {
        let message_js = to_js(message).map_err(ShellError)?;
        sendTabMessage(tab_id, message_js)
            .await
            .map_err(|e| ShellError(format!("Failed to send message: {:?}", e)))
    }
}

type BrowserBackground = Background<BrowserStore, ApiClient, BrowserTabs>;

/// Created once by the background script; every listener forwards to it
#[wasm_bindgen]
pub struct BackgroundService {
    inner: Rc<BrowserBackground>,
}

#[wasm_bindgen]
impl BackgroundService {
    #[wasm_bindgen(constructor)]
    pub fn new() -> BackgroundService {
        BackgroundService {
            inner: Rc::new(Background::new(
                Rc::new(BrowserStore),
                Rc::new(ApiClient::new()),
                Rc::new(BrowserTabs),
            )),
        }
    }

    #[wasm_bindgen(js_name = onInstalled)]
    pub fn on_installed(&self) -> Promise {
        self.dispatch(BrowserEvent::Installed)
    }

    #[wasm_bindgen(js_name = onNavigationCompleted)]
    pub fn on_navigation_completed(&self, tab_id: i32, url: String) -> Promise {
        self.dispatch(BrowserEvent::NavigationCompleted { tab_id, url })
    }

    #[wasm_bindgen(js_name = onTabActivated)]
    pub fn on_tab_activated(&self) -> Promise {
        self.dispatch(BrowserEvent::TabActivated)
    }

    #[wasm_bindgen(js_name = onTabRemoved)]
    pub fn on_tab_removed(&self, tab_id: i32) -> Promise {
        self.dispatch(BrowserEvent::TabRemoved { tab_id })
    }

    #[wasm_bindgen(js_name = onMenuClicked)]
    pub fn on_menu_clicked(&self, menu_item_id: String, tab_id: i32, url: String) -> Promise {
        self.dispatch(BrowserEvent::MenuClicked {
            menu_item_id,
            tab_id,
            url,
        })
    }

    /// Resolves to the reply for `MANGA_SYNC_CREATE_MANGA`, `undefined` otherwise
    #[wasm_bindgen(js_name = onMessage)]
    pub fn on_message(&self, message: JsValue) -> Promise {
        match serde_wasm_bindgen::from_value::<ExtensionMessage>(message) {
            Ok(message) => self.dispatch(BrowserEvent::Message(message)),
            Err(e) => {
                log::debug!("Ignoring unrecognised message: {:?}", e);
                Promise::resolve(&JsValue::UNDEFINED)
            }
        }
    }

    #[wasm_bindgen(js_name = saveSettings)]
    pub fn save_settings(&self, api_url: String, bearer_token: String) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            inner
                .commands()
                .save_settings(&api_url, &bearer_token)
                .await
                .map(|_| JsValue::UNDEFINED)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    #[wasm_bindgen(js_name = clearSettings)]
    pub fn clear_settings(&self) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            inner
                .commands()
                .clear_settings()
                .await
                .map(|_| JsValue::UNDEFINED)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    /// Re-fetch websites and sources, e.g. after a website was added in the UI
    #[wasm_bindgen(js_name = refreshCollections)]
    pub fn refresh_collections(&self) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            inner
                .commands()
                .refresh_collections()
                .await
                .map(|_| JsValue::UNDEFINED)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }
}

impl BackgroundService {
    fn dispatch(&self, event: BrowserEvent) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            match inner.handle(event).await {
                Some(response) => to_js(&response).map_err(|e| JsValue::from_str(&e)),
                None => Ok(JsValue::UNDEFINED),
            }
        })
    }
}

impl Default for BackgroundService {
    fn default() -> Self {
        Self::new()
    }
}
