/// In-memory stand-ins for the browser and the API, used by unit tests
use crate::api::{ApiError, ApiResult, MangaApi};
use crate::config::{ConfigStore, Credentials, StorageData, StoreError};
use crate::menu::{BrowserShell, MenuItem, ShellError, TabId};
use crate::messages::ExtensionMessage;
use crate::models::{CreateMangaPayload, Source, UpdateMangaPayload, Website};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub const API_URL: &str = "http://api.test";
pub const TOKEN: &str = "secret";

pub fn website(id: i64, domain: &str) -> Website {
    Website {
        id,
        domain: domain.to_string(),
    }
}

pub fn source(id: i64, manga_id: i64, website_id: i64, path: &str) -> Source {
    Source {
        id,
        manga_id,
        website_id,
        path: path.to_string(),
        number_unread_chapter: None,
    }
}

/// Configured storage holding the given collections
pub fn storage(websites: Vec<Website>, sources: Vec<Source>) -> StorageData {
    StorageData {
        api_url: API_URL.to_string(),
        bearer_token: TOKEN.to_string(),
        websites,
        sources,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    data: RefCell<StorageData>,
    pub fail_load: Cell<bool>,
    loads: Cell<usize>,
}

impl MemoryStore {
    pub fn new(data: StorageData) -> Self {
        Self {
            data: RefCell::new(data),
            fail_load: Cell::new(false),
            loads: Cell::new(0),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.get()
    }

    pub fn snapshot(&self) -> StorageData {
        self.data.borrow().clone()
    }
}

impl ConfigStore for MemoryStore {
    async fn load(&self) -> Result<StorageData, StoreError> {
        self.loads.set(self.loads.get() + 1);
        if self.fail_load.get() {
            return Err(StoreError("storage unavailable".to_string()));
        }
        Ok(self.snapshot())
    }

    async fn save_websites(&self, websites: &[Website]) -> Result<(), StoreError> {
        self.data.borrow_mut().websites = websites.to_vec();
        Ok(())
    }

    async fn save_sources(&self, sources: &[Source]) -> Result<(), StoreError> {
        self.data.borrow_mut().sources = sources.to_vec();
        Ok(())
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let mut data = self.data.borrow_mut();
        data.api_url = credentials.api_url.clone();
        data.bearer_token = credentials.bearer_token.clone();
        Ok(())
    }

    async fn clear_credentials(&self) -> Result<(), StoreError> {
        let mut data = self.data.borrow_mut();
        data.api_url.clear();
        data.bearer_token.clear();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    UpdateManga { manga_id: i64, payload: UpdateMangaPayload },
    CreateManga(CreateMangaPayload),
    CreateWebsite(String),
    ListWebsites,
    ListSources,
}

/// Backend holding websites and sources in memory and recording every call
#[derive(Default)]
pub struct FakeApi {
    calls: RefCell<Vec<ApiCall>>,
    websites: RefCell<Vec<Website>>,
    sources: RefCell<Vec<Source>>,
    next_id: Cell<i64>,
    pub fail_with: RefCell<Option<ApiError>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(websites: Vec<Website>, sources: Vec<Source>) -> Self {
        let api = Self::new();
        *api.websites.borrow_mut() = websites;
        *api.sources.borrow_mut() = sources;
        api
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().clone()
    }

    pub fn update_calls(&self) -> Vec<(i64, UpdateMangaPayload)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::UpdateManga { manga_id, payload } => Some((manga_id, payload)),
                _ => None,
            })
            .collect()
    }

    pub fn fail(&self, error: ApiError) {
        *self.fail_with.borrow_mut() = Some(error);
    }

    pub fn recover(&self) {
        *self.fail_with.borrow_mut() = None;
    }

    fn record(&self, call: ApiCall, credentials: &Credentials) -> ApiResult<()> {
        assert_eq!(credentials.api_url, API_URL);
        assert_eq!(credentials.bearer_token, TOKEN);
        self.calls.borrow_mut().push(call);

        match self.fail_with.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> i64 {
        let id = self.next_id.get() + 100;
        self.next_id.set(self.next_id.get() + 1);
        id
    }
}

impl MangaApi for FakeApi {
    async fn update_manga(
        &self,
        credentials: &Credentials,
        manga_id: i64,
        payload: &UpdateMangaPayload,
    ) -> ApiResult<()> {
        self.record(
            ApiCall::UpdateManga {
                manga_id,
                payload: payload.clone(),
            },
            credentials,
        )
    }

    /// Replies like the server: nothing but a success envelope
    async fn create_manga(&self, credentials: &Credentials, payload: &CreateMangaPayload) -> ApiResult<()> {
        self.record(ApiCall::CreateManga(payload.clone()), credentials)?;
        let manga_id = self.next_id();

        if let (Some(domain), Some(path)) = (&payload.website_domain, &payload.source_path) {
            let website_id = self
                .websites
                .borrow()
                .iter()
                .find(|w| &w.domain == domain)
                .map(|w| w.id)
                .ok_or_else(|| ApiError::Backend("Website domain does not exist".to_string()))?;
            let id = self.next_id();
            self.sources
                .borrow_mut()
                .push(source(id, manga_id, website_id, path.trim_end_matches('/')));
        }

        Ok(())
    }

    async fn create_website(&self, credentials: &Credentials, domain: &str) -> ApiResult<()> {
        self.record(ApiCall::CreateWebsite(domain.to_string()), credentials)?;

        if self.websites.borrow().iter().any(|w| w.domain == domain) {
            return Err(ApiError::Backend("Website already exists".to_string()));
        }
        let created = website(self.next_id(), domain);
        self.websites.borrow_mut().push(created);
        Ok(())
    }

    async fn list_websites(&self, credentials: &Credentials) -> ApiResult<Vec<Website>> {
        self.record(ApiCall::ListWebsites, credentials)?;
        Ok(self.websites.borrow().clone())
    }

    async fn list_sources(&self, credentials: &Credentials) -> ApiResult<Vec<Source>> {
        self.record(ApiCall::ListSources, credentials)?;
        Ok(self.sources.borrow().clone())
    }
}

pub struct FakeShell {
    pub context_menus: bool,
    pub active_url: RefCell<Option<String>>,
    pub fail_injection: Cell<bool>,
    created: RefCell<Vec<MenuItem>>,
    visibility: RefCell<HashMap<MenuItem, bool>>,
    injected: RefCell<Vec<TabId>>,
    sent: RefCell<Vec<(TabId, ExtensionMessage)>>,
}

impl Default for FakeShell {
    fn default() -> Self {
        Self {
            context_menus: true,
            active_url: RefCell::new(None),
            fail_injection: Cell::new(false),
            created: RefCell::new(Vec::new()),
            visibility: RefCell::new(HashMap::new()),
            injected: RefCell::new(Vec::new()),
            sent: RefCell::new(Vec::new()),
        }
    }
}

impl FakeShell {
    pub fn with_active_url(url: &str) -> Self {
        let shell = Self::default();
        *shell.active_url.borrow_mut() = Some(url.to_string());
        shell
    }

    pub fn created_menus(&self) -> Vec<MenuItem> {
        self.created.borrow().clone()
    }

    pub fn menu_visible(&self, item: MenuItem) -> Option<bool> {
        self.visibility.borrow().get(&item).copied()
    }

    pub fn injected_tabs(&self) -> Vec<TabId> {
        self.injected.borrow().clone()
    }

    pub fn sent_messages(&self) -> Vec<(TabId, ExtensionMessage)> {
        self.sent.borrow().clone()
    }
}

impl BrowserShell for FakeShell {
    fn has_context_menus(&self) -> bool {
        self.context_menus
    }

    async fn create_menu(&self, item: MenuItem) -> Result<(), ShellError> {
        self.created.borrow_mut().push(item);
        Ok(())
    }

    async fn set_menu_visible(&self, item: MenuItem, visible: bool) -> Result<(), ShellError> {
        self.visibility.borrow_mut().insert(item, visible);
        Ok(())
    }

    async fn active_tab_url(&self) -> Result<Option<String>, ShellError> {
        Ok(self.active_url.borrow().clone())
    }

    async fn inject_content_script(&self, tab_id: TabId) -> Result<(), ShellError> {
        if self.fail_injection.get() {
            return Err(ShellError("Missing host permission".to_string()));
        }
        self.injected.borrow_mut().push(tab_id);
        Ok(())
    }

    async fn send_to_tab(&self, tab_id: TabId, message: &ExtensionMessage) -> Result<(), ShellError> {
        self.sent.borrow_mut().push((tab_id, message.clone()));
        Ok(())
    }
}
