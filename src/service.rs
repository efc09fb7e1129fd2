/// The background process: owns every component and routes browser events
use crate::api::MangaApi;
use crate::commands::Commands;
use crate::config::ConfigStore;
use crate::dedup::DedupCache;
use crate::dispatcher::{DispatchOutcome, UpdateDispatcher};
use crate::matcher::PageLocation;
use crate::menu::{BrowserShell, MenuController, MenuItem, TabId};
use crate::messages::{CreateMangaResponse, ExtensionMessage};
use crate::strategy::StrategyRegistry;
use log::{debug, error, warn};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    Installed,
    NavigationCompleted { tab_id: TabId, url: String },
    TabActivated,
    TabRemoved { tab_id: TabId },
    MenuClicked { menu_item_id: String, tab_id: TabId, url: String },
    Message(ExtensionMessage),
}

pub struct Background<S, A, B> {
    dispatcher: UpdateDispatcher<S, A>,
    controller: MenuController<S, B>,
    commands: Commands<S, A, B>,
}

impl<S: ConfigStore, A: MangaApi, B: BrowserShell> Background<S, A, B> {
    /// Wire up the components; the dedup cache lives as long as this value
    pub fn new(store: Rc<S>, api: Rc<A>, shell: Rc<B>) -> Self {
        let cache = Rc::new(RefCell::new(DedupCache::new()));

        Self {
            dispatcher: UpdateDispatcher::new(store.clone(), api.clone(), cache),
            controller: MenuController::new(store.clone(), shell.clone(), StrategyRegistry::new()),
            commands: Commands::new(store, api, shell),
        }
    }

    pub fn commands(&self) -> &Commands<S, A, B> {
        &self.commands
    }

    /// Handle one event; only `MANGA_SYNC_CREATE_MANGA` produces a reply
    pub async fn handle(&self, event: BrowserEvent) -> Option<CreateMangaResponse> {
        match event {
            BrowserEvent::Installed => {
                self.controller.install().await;
                None
            }
            BrowserEvent::NavigationCompleted { tab_id, url } => {
                self.on_navigation_completed(tab_id, &url).await;
                None
            }
            BrowserEvent::TabActivated => {
                self.controller.refresh_menus().await;
                None
            }
            BrowserEvent::TabRemoved { tab_id } => {
                self.controller.forget_tab(tab_id);
                None
            }
            BrowserEvent::MenuClicked {
                menu_item_id,
                tab_id,
                url,
            } => {
                self.on_menu_clicked(&menu_item_id, tab_id, &url).await;
                None
            }
            BrowserEvent::Message(message) => self.on_message(message).await,
        }
    }

    pub async fn on_navigation_completed(&self, tab_id: TabId, url: &str) -> DispatchOutcome {
        self.controller.on_navigation_completed(tab_id, url).await;
        self.dispatcher.on_navigation_completed(url).await
    }

    async fn on_menu_clicked(&self, menu_item_id: &str, tab_id: TabId, url: &str) {
        let Some(location) = PageLocation::parse(url) else {
            return;
        };
        let Some(item) = MenuItem::from_id(menu_item_id) else {
            debug!("Ignoring unknown menu item {}", menu_item_id);
            return;
        };

        match item {
            MenuItem::AddWebsite => {
                if let Err(e) = self.commands.add_website(&location.hostname).await {
                    error!("Manga Sync: Failed to add website: {}", e);
                }
                self.controller.refresh_menus().await;
            }
            MenuItem::AddManga => {
                if let Err(e) = self
                    .commands
                    .open_add_manga_form(tab_id, &location.hostname, &location.path)
                    .await
                {
                    error!("Manga Sync: Failed to inject form: {}", e);
                }
            }
        }
    }

    async fn on_message(&self, message: ExtensionMessage) -> Option<CreateMangaResponse> {
        match message {
            ExtensionMessage::CreateManga(request) => {
                let response = self.commands.create_manga(&request).await;
                if response.success {
                    self.controller.refresh_menus().await;
                }
                Some(response)
            }
            ExtensionMessage::ShowForm(_) | ExtensionMessage::InjectAutoButton(_) => {
                warn!("Ignoring content-script message sent to the background");
                None
            }
        }
    }
}
