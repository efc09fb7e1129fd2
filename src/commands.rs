/// Actions the user triggers explicitly (context menus, add-manga form)
use crate::api::{ApiError, MangaApi};
use crate::config::{ConfigStore, Credentials, StoreError};
use crate::menu::{BrowserShell, ShellError, TabId};
use crate::messages::{CreateMangaRequest, CreateMangaResponse, ExtensionMessage, FormData};
use log::{error, info, warn};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    NotConfigured,
    MissingFields,
    Api(ApiError),
    Store(StoreError),
    Shell(ShellError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NotConfigured => write!(f, "API not configured"),
            CommandError::MissingFields => write!(f, "Please fill in all required fields"),
            CommandError::Api(e) => write!(f, "{}", e),
            CommandError::Store(e) => write!(f, "{}", e),
            CommandError::Shell(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ApiError> for CommandError {
    fn from(e: ApiError) -> Self {
        CommandError::Api(e)
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        CommandError::Store(e)
    }
}

impl From<ShellError> for CommandError {
    fn from(e: ShellError) -> Self {
        CommandError::Shell(e)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

pub struct Commands<S, A, B> {
    store: Rc<S>,
    api: Rc<A>,
    shell: Rc<B>,
}

impl<S: ConfigStore, A: MangaApi, B: BrowserShell> Commands<S, A, B> {
    pub fn new(store: Rc<S>, api: Rc<A>, shell: Rc<B>) -> Self {
        Self { store, api, shell }
    }

    async fn credentials(&self) -> CommandResult<Credentials> {
        let storage = self.store.load().await?;
        storage.credentials().ok_or(CommandError::NotConfigured)
    }

    /// Register `domain`, then replace the cached list with the server's.
    ///
    /// The server does not echo the new website, so the refreshed list is
    /// the only way it reaches the cache; a failed refresh is logged.
    pub async fn add_website(&self, domain: &str) -> CommandResult<()> {
        let credentials = self.credentials().await?;

        self.api.create_website(&credentials, domain).await?;
        info!("Website {} added", domain);

        match self.api.list_websites(&credentials).await {
            Ok(websites) => self.store.save_websites(&websites).await?,
            Err(e) => error!("Manga Sync: Failed to refresh websites list: {}", e),
        }

        Ok(())
    }

    /// Show the add-manga form in a tab, pre-filled with the page location
    pub async fn open_add_manga_form(&self, tab_id: TabId, domain: &str, path: &str) -> CommandResult<()> {
        let storage = self.store.load().await?;

        self.shell.inject_content_script(tab_id).await?;
        let message = ExtensionMessage::ShowForm(FormData {
            domain: domain.to_string(),
            path: path.to_string(),
            websites: storage.websites,
        });
        self.shell.send_to_tab(tab_id, &message).await?;

        Ok(())
    }

    /// Handle a submitted add-manga form; the error is shown in the form
    pub async fn create_manga(&self, request: &CreateMangaRequest) -> CreateMangaResponse {
        match self.try_create_manga(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Manga Sync: Failed to create manga: {}", e);
                CreateMangaResponse::failed(e.to_string())
            }
        }
    }

    async fn try_create_manga(&self, request: &CreateMangaRequest) -> CommandResult<CreateMangaResponse> {
        let credentials = self.credentials().await?;
        if !request.has_required_fields() {
            return Err(CommandError::MissingFields);
        }

        self.api.create_manga(&credentials, &request.to_payload()).await?;
        info!("Manga {} created", request.name.trim());

        // the backend created the source as well
        if request.has_source() {
            match self.api.list_sources(&credentials).await {
                Ok(sources) => self.store.save_sources(&sources).await?,
                Err(e) => error!("Manga Sync: Failed to refresh sources: {}", e),
            }
        }

        Ok(CreateMangaResponse::created())
    }

    /// Store new API settings and pull the collections they give access to.
    /// A failed refresh is logged; the settings stay saved.
    pub async fn save_settings(&self, api_url: &str, bearer_token: &str) -> CommandResult<()> {
        let credentials = Credentials::new(api_url, bearer_token);
        self.store.save_credentials(&credentials).await?;

        if let Err(e) = self.refresh_collections().await {
            warn!("Settings saved but refresh failed: {}", e);
        }
        Ok(())
    }

    pub async fn clear_settings(&self) -> CommandResult<()> {
        self.store.clear_credentials().await?;
        Ok(())
    }

    /// Re-fetch websites and sources into storage
    pub async fn refresh_collections(&self) -> CommandResult<()> {
        let credentials = self.credentials().await?;

        let websites = self.api.list_websites(&credentials).await?;
        let sources = self.api.list_sources(&credentials).await?;
        self.store.save_websites(&websites).await?;
        self.store.save_sources(&sources).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageData;
    use crate::testing::{ApiCall, FakeApi, FakeShell, MemoryStore, source, storage, website};
    use futures::executor::block_on;

    struct Fixture {
        commands: Commands<MemoryStore, FakeApi, FakeShell>,
        store: Rc<MemoryStore>,
        api: Rc<FakeApi>,
        shell: Rc<FakeShell>,
    }

    fn fixture(data: StorageData, api: FakeApi) -> Fixture {
        let store = Rc::new(MemoryStore::new(data));
        let api = Rc::new(api);
        let shell = Rc::new(FakeShell::default());
        Fixture {
            commands: Commands::new(store.clone(), api.clone(), shell.clone()),
            store,
            api,
            shell,
        }
    }

    fn request(domain: &str, path: &str) -> CreateMangaRequest {
        CreateMangaRequest {
            name: "Foo".to_string(),
            cover: "https://img/foo.jpg".to_string(),
            cover_small: "https://img/foo-small.jpg".to_string(),
            domain: domain.to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn test_add_website_refreshes_cache() {
        let api = FakeApi::with_data(vec![website(1, "other.org")], vec![]);
        let f = fixture(storage(vec![], vec![]), api);

        block_on(f.commands.add_website("example.com")).unwrap();

        let domains: Vec<String> = f.store.snapshot().websites.into_iter().map(|w| w.domain).collect();
        assert_eq!(domains, vec!["other.org", "example.com"]);
        assert_eq!(
            f.api.calls(),
            vec![ApiCall::CreateWebsite("example.com".to_string()), ApiCall::ListWebsites]
        );
    }

    #[test]
    fn test_add_website_requires_configuration() {
        let f = fixture(StorageData::default(), FakeApi::new());

        let result = block_on(f.commands.add_website("example.com"));

        assert_eq!(result, Err(CommandError::NotConfigured));
        assert!(f.api.calls().is_empty());
    }

    #[test]
    fn test_add_website_backend_error() {
        let api = FakeApi::with_data(vec![website(1, "example.com")], vec![]);
        let f = fixture(storage(vec![], vec![]), api);

        let result = block_on(f.commands.add_website("example.com"));

        assert_eq!(result.unwrap_err().to_string(), "Website already exists");
        assert!(f.store.snapshot().websites.is_empty());
        assert_eq!(f.api.calls(), vec![ApiCall::CreateWebsite("example.com".to_string())]);
    }

    #[test]
    fn test_add_website_cache_comes_from_refresh() {
        let api = FakeApi::with_data(vec![website(1, "other.org")], vec![]);
        let f = fixture(storage(vec![website(9, "stale.net")], vec![]), api);

        block_on(f.commands.add_website("example.com")).unwrap();

        // the stale entry is replaced by the server's list, which holds the new site
        let domains: Vec<String> = f.store.snapshot().websites.into_iter().map(|w| w.domain).collect();
        assert_eq!(domains, vec!["other.org", "example.com"]);
    }

    #[test]
    fn test_open_form_sends_page_location() {
        let f = fixture(storage(vec![website(1, "example.com")], vec![]), FakeApi::new());

        block_on(f.commands.open_add_manga_form(3, "www.example.com", "/manga/foo")).unwrap();

        assert_eq!(f.shell.injected_tabs(), vec![3]);
        assert_eq!(
            f.shell.sent_messages(),
            vec![(
                3,
                ExtensionMessage::ShowForm(FormData {
                    domain: "www.example.com".to_string(),
                    path: "/manga/foo".to_string(),
                    websites: vec![website(1, "example.com")],
                })
            )]
        );
    }

    #[test]
    fn test_create_manga_with_source_refreshes_sources() {
        let api = FakeApi::with_data(vec![website(1, "example.com")], vec![]);
        let f = fixture(storage(vec![website(1, "example.com")], vec![]), api);

        let response = block_on(f.commands.create_manga(&request("example.com", "/manga/foo")));

        assert_eq!(response, CreateMangaResponse::created());
        let sources = f.store.snapshot().sources;
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].path, "/manga/foo");
        assert_eq!(f.api.calls().last(), Some(&ApiCall::ListSources));
    }

    #[test]
    fn test_create_manga_for_unknown_website() {
        let f = fixture(storage(vec![], vec![]), FakeApi::new());

        let response = block_on(f.commands.create_manga(&request("example.com", "/manga/foo")));

        assert_eq!(response, CreateMangaResponse::failed("Website domain does not exist"));
        assert!(f.store.snapshot().sources.is_empty());
    }

    #[test]
    fn test_create_manga_without_source() {
        let f = fixture(storage(vec![], vec![source(1, 2, 3, "/x")]), FakeApi::new());

        let response = block_on(f.commands.create_manga(&request("", "")));

        assert!(response.success);
        assert_eq!(f.api.calls().len(), 1);
        assert_eq!(f.store.snapshot().sources.len(), 1);
    }

    #[test]
    fn test_create_manga_errors_are_reported() {
        let f = fixture(StorageData::default(), FakeApi::new());
        let response = block_on(f.commands.create_manga(&request("", "")));
        assert_eq!(response, CreateMangaResponse::failed("API not configured"));

        let f = fixture(storage(vec![], vec![]), FakeApi::new());
        let mut incomplete = request("", "");
        incomplete.cover_small.clear();
        let response = block_on(f.commands.create_manga(&incomplete));
        assert_eq!(response, CreateMangaResponse::failed("Please fill in all required fields"));

        f.api.fail(ApiError::Status(500));
        let response = block_on(f.commands.create_manga(&request("", "")));
        assert_eq!(response, CreateMangaResponse::failed("HTTP error: 500"));
    }

    #[test]
    fn test_save_settings_pulls_collections() {
        let api = FakeApi::with_data(vec![website(1, "example.com")], vec![]);
        let f = fixture(StorageData::default(), api);

        block_on(f.commands.save_settings("http://api.test/", " secret ")).unwrap();

        let data = f.store.snapshot();
        assert!(data.credentials().is_some());
        assert_eq!(data.api_url, "http://api.test");
        assert_eq!(data.websites, vec![website(1, "example.com")]);
    }

    #[test]
    fn test_clear_settings() {
        let f = fixture(storage(vec![], vec![]), FakeApi::new());

        block_on(f.commands.clear_settings()).unwrap();

        assert_eq!(f.store.snapshot().credentials(), None);
        assert_eq!(
            block_on(f.commands.add_website("example.com")),
            Err(CommandError::NotConfigured)
        );
    }

    #[test]
    fn test_refresh_collections() {
        let api = FakeApi::with_data(vec![website(1, "example.com")], vec![source(1, 5, 1, "/manga/foo")]);
        let f = fixture(storage(vec![], vec![]), api);

        block_on(f.commands.refresh_collections()).unwrap();

        let data = f.store.snapshot();
        assert_eq!(data.websites, vec![website(1, "example.com")]);
        assert_eq!(data.sources, vec![source(1, 5, 1, "/manga/foo")]);
    }
}
