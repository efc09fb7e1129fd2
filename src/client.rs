/// API access for the popup and options pages
use crate::api::{ApiClient, ApiError};
use crate::browser::{BrowserStore, to_js};
use crate::config::{ConfigStore, Credentials};
use crate::models::CreateSourcePayload;
use js_sys::Promise;
use serde::Serialize;
use std::future::Future;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// Ids cross the boundary as JS numbers and are widened here
#[wasm_bindgen]
pub struct MangaClient {
    api: Rc<ApiClient>,
}

async fn stored_credentials() -> Result<Credentials, JsValue> {
    let storage = BrowserStore
        .load()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    storage
        .credentials()
        .ok_or_else(|| JsValue::from_str("API not configured"))
}

/// Run `call` with the stored credentials and resolve to its serialized result
fn with_credentials<T, F, Fut>(api: Rc<ApiClient>, call: F) -> Promise
where
    T: Serialize + 'static,
    F: FnOnce(Rc<ApiClient>, Credentials) -> Fut + 'static,
    Fut: Future<Output = Result<T, ApiError>> + 'static,
{
    future_to_promise(async move {
        let credentials = stored_credentials().await?;
        let value = call(api, credentials)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&value).map_err(|e| JsValue::from_str(&e))
    })
}

#[wasm_bindgen]
impl MangaClient {
    #[wasm_bindgen(constructor)]
    pub fn new() -> MangaClient {
        MangaClient {
            api: Rc::new(ApiClient::new()),
        }
    }

    #[wasm_bindgen(js_name = listManga)]
    pub fn list_manga(&self) -> Promise {
        with_credentials(self.api.clone(), |api, c| async move { api.list_manga(&c).await })
    }

    #[wasm_bindgen(js_name = getManga)]
    pub fn get_manga(&self, manga_id: i32) -> Promise {
        with_credentials(self.api.clone(), move |api, c| async move { api.get_manga(&c, manga_id.into()).await })
    }

    #[wasm_bindgen(js_name = deleteManga)]
    pub fn delete_manga(&self, manga_id: i32) -> Promise {
        with_credentials(self.api.clone(), move |api, c| async move { api.delete_manga(&c, manga_id.into()).await })
    }

    #[wasm_bindgen(js_name = mangaSources)]
    pub fn manga_sources(&self, manga_id: i32) -> Promise {
        with_credentials(self.api.clone(), move |api, c| async move { api.manga_sources(&c, manga_id.into()).await })
    }

    #[wasm_bindgen(js_name = mangaHistory)]
    pub fn manga_history(&self, manga_id: i32) -> Promise {
        with_credentials(self.api.clone(), move |api, c| async move { api.manga_history(&c, manga_id.into()).await })
    }

    /// Resolves to `{total, success, errors, results}`
    #[wasm_bindgen(js_name = refreshUnread)]
    pub fn refresh_unread(&self) -> Promise {
        with_credentials(self.api.clone(), |api, c| async move { api.refresh_unread(&c).await })
    }

    #[wasm_bindgen(js_name = createSource)]
    pub fn create_source(&self, manga_id: i32, website_id: i32, path: String) -> Promise {
        let payload = CreateSourcePayload {
            manga_id: manga_id.into(),
            website_id: website_id.into(),
            path,
        };
        with_credentials(self.api.clone(), move |api, c| async move {
            api.create_source(&c, &payload).await
        })
    }

    #[wasm_bindgen(js_name = deleteSource)]
    pub fn delete_source(&self, source_id: i32) -> Promise {
        with_credentials(self.api.clone(), move |api, c| async move { api.delete_source(&c, source_id.into()).await })
    }

    /// Resolves to `[{key, value}]` sorted by key
    #[wasm_bindgen(js_name = listSettings)]
    pub fn list_settings(&self) -> Promise {
        with_credentials(self.api.clone(), |api, c| async move { api.list_settings(&c).await })
    }

    #[wasm_bindgen(js_name = updateSetting)]
    pub fn update_setting(&self, key: String, value: String) -> Promise {
        with_credentials(self.api.clone(), move |api, c| async move {
            api.update_setting(&c, &key, &value).await
        })
    }
}

impl Default for MangaClient {
    fn default() -> Self {
        Self::new()
    }
}
