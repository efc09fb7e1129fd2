/// Context menus and the auto-add button, derived from the tracked state of a page
use crate::config::{ConfigStore, StorageData};
use crate::matcher::{PageLocation, match_site};
use crate::messages::{AutoButtonData, ExtensionMessage};
use crate::models::{Source, Website};
use crate::strategy::StrategyRegistry;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub type TabId = i32;

pub const MENU_ADD_WEBSITE: &str = "manga-sync-add-website";
pub const MENU_ADD_MANGA: &str = "manga-sync-add-manga";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItem {
    AddWebsite,
    AddManga,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::AddWebsite, MenuItem::AddManga];

    pub fn id(self) -> &'static str {
        match self {
            MenuItem::AddWebsite => MENU_ADD_WEBSITE,
            MenuItem::AddManga => MENU_ADD_MANGA,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MenuItem::AddWebsite => "Add this website to Manga Sync",
            MenuItem::AddManga => "Add this page as a manga",
        }
    }

    pub fn from_id(id: &str) -> Option<MenuItem> {
        MenuItem::ALL.into_iter().find(|item| item.id() == id)
    }
}

/// How far a page is known to the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    UnregisteredWebsite,
    UntrackedPath,
    TrackedPath,
}

impl PageState {
    pub fn resolve(location: &PageLocation, websites: &[Website], sources: &[Source]) -> PageState {
        match match_site(location, websites, sources) {
            None => PageState::UnregisteredWebsite,
            Some(site) if site.is_path_tracked() => PageState::TrackedPath,
            Some(_) => PageState::UntrackedPath,
        }
    }

    /// Whether `item` is a valid action on a page in this state
    pub fn offers(self, item: MenuItem) -> bool {
        match item {
            MenuItem::AddWebsite => self == PageState::UnregisteredWebsite,
            MenuItem::AddManga => self == PageState::UntrackedPath,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShellError(pub String);

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Browser error: {}", self.0)
    }
}

impl std::error::Error for ShellError {}

/// Tab and context-menu APIs of the browser
#[allow(async_fn_in_trait)]
pub trait BrowserShell {
    /// Some browsers (Firefox for Android) have no context menus
    fn has_context_menus(&self) -> bool;

    async fn create_menu(&self, item: MenuItem) -> Result<(), ShellError>;

    async fn set_menu_visible(&self, item: MenuItem, visible: bool) -> Result<(), ShellError>;

    async fn active_tab_url(&self) -> Result<Option<String>, ShellError>;

    /// Load the add-manga content script and stylesheet into a tab
    async fn inject_content_script(&self, tab_id: TabId) -> Result<(), ShellError>;

    async fn send_to_tab(&self, tab_id: TabId, message: &ExtensionMessage) -> Result<(), ShellError>;
}

pub struct MenuController<S, B> {
    store: Rc<S>,
    shell: Rc<B>,
    strategies: StrategyRegistry,
    /// URL each tab last received the auto-add button for
    injected: RefCell<HashMap<TabId, String>>,
}

impl<S: ConfigStore, B: BrowserShell> MenuController<S, B> {
    pub fn new(store: Rc<S>, shell: Rc<B>, strategies: StrategyRegistry) -> Self {
        Self {
            store,
            shell,
            strategies,
            injected: RefCell::new(HashMap::new()),
        }
    }

    pub async fn install(&self) {
        if !self.shell.has_context_menus() {
            return;
        }

        for item in MenuItem::ALL {
            if let Err(e) = self.shell.create_menu(item).await {
                debug!("Could not create menu {}: {}", item.id(), e);
            }
        }
    }

    /// Show only the menu items valid for the active tab.
    ///
    /// Returns the state applied, or `None` when nothing was updated
    /// (no menus, no active http(s) tab, storage unavailable).
    pub async fn refresh_menus(&self) -> Option<PageState> {
        let storage = self.store.load().await.ok()?;
        self.apply_menus(&storage).await
    }

    async fn apply_menus(&self, storage: &StorageData) -> Option<PageState> {
        if !self.shell.has_context_menus() {
            return None;
        }

        let url = self.shell.active_tab_url().await.ok().flatten()?;
        let location = PageLocation::parse(&url)?;
        let state = PageState::resolve(&location, &storage.websites, &storage.sources);

        for item in MenuItem::ALL {
            if let Err(e) = self.shell.set_menu_visible(item, state.offers(item)).await {
                debug!("Could not update menu {}: {}", item.id(), e);
            }
        }

        Some(state)
    }

    /// Add the auto-add button when the site has a strategy, is registered,
    /// and the page is not tracked yet. Returns whether it was injected.
    pub async fn offer_auto_button(&self, tab_id: TabId, url: &str, storage: &StorageData) -> bool {
        let Some(location) = PageLocation::parse(url) else {
            return false;
        };
        let Some(strategy) = self.strategies.get(&location.hostname) else {
            return false;
        };

        let state = PageState::resolve(&location, &storage.websites, &storage.sources);
        if state != PageState::UntrackedPath {
            self.forget_tab(tab_id);
            return false;
        }

        if self.injected.borrow().get(&tab_id).is_some_and(|last| last == url) {
            return false;
        }

        let message = ExtensionMessage::InjectAutoButton(AutoButtonData {
            domain: location.hostname.clone(),
            path: location.path.clone(),
            websites: storage.websites.clone(),
            strategy: strategy.clone(),
        });

        let injected = async {
            self.shell.inject_content_script(tab_id).await?;
            self.shell.send_to_tab(tab_id, &message).await
        };

        match injected.await {
            Ok(()) => {
                self.injected.borrow_mut().insert(tab_id, url.to_string());
                true
            }
            Err(e) => {
                debug!("Could not inject auto-add button into tab {}: {}", tab_id, e);
                false
            }
        }
    }

    pub async fn on_navigation_completed(&self, tab_id: TabId, url: &str) {
        let storage = match self.store.load().await {
            Ok(storage) => storage,
            Err(e) => {
                debug!("Skipping menus and auto-add button: {}", e);
                return;
            }
        };

        self.apply_menus(&storage).await;
        self.offer_auto_button(tab_id, url, &storage).await;
    }

    pub fn forget_tab(&self, tab_id: TabId) {
        self.injected.borrow_mut().remove(&tab_id);
    }
}
