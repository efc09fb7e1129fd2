/// Pushes the chapter being read to the API after each completed navigation
use crate::api::{ApiError, MangaApi};
use crate::chapter::extract_chapter;
use crate::config::{ConfigStore, StoreError};
use crate::dedup::DedupCache;
use crate::matcher::{PageLocation, match_site};
use crate::models::UpdateMangaPayload;
use log::{debug, error, info};
use std::cell::RefCell;
use std::rc::Rc;

/// What a navigation led to
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// No API URL or token stored
    NotConfigured,
    /// Storage could not be read
    StoreFailed(StoreError),
    /// Not an http(s) page, or a website that is not registered
    UnknownWebsite,
    /// Registered website, but no source path prefixes the page
    UntrackedPath,
    /// The page is the source itself, not a chapter below it
    NoChapter,
    /// Same chapter already pushed for this manga
    Duplicate { manga_id: i64, chapter: String },
    Updated { manga_id: i64, chapter: String },
    PushFailed {
        manga_id: i64,
        chapter: String,
        error: ApiError,
    },
}

pub struct UpdateDispatcher<S, A> {
    store: Rc<S>,
    api: Rc<A>,
    cache: Rc<RefCell<DedupCache>>,
}

impl<S: ConfigStore, A: MangaApi> UpdateDispatcher<S, A> {
    pub fn new(store: Rc<S>, api: Rc<A>, cache: Rc<RefCell<DedupCache>>) -> Self {
        Self { store, api, cache }
    }

    /// Never fails: every problem ends up in the outcome and the log
    pub async fn on_navigation_completed(&self, url: &str) -> DispatchOutcome {
        let outcome = self.dispatch(url).await;

        match &outcome {
            DispatchOutcome::Updated { manga_id, chapter } => {
                info!("Manga {} moved to chapter {}", manga_id, chapter);
            }
            DispatchOutcome::PushFailed {
                manga_id,
                chapter,
                error,
            } => {
                error!("Manga Sync: Auto-update of manga {} to {} failed: {}", manga_id, chapter, error);
            }
            DispatchOutcome::StoreFailed(e) => error!("Manga Sync: Auto-update failed: {}", e),
            other => debug!("No chapter update for {}: {:?}", url, other),
        }

        outcome
    }

    async fn dispatch(&self, url: &str) -> DispatchOutcome {
        let storage = match self.store.load().await {
            Ok(storage) => storage,
            Err(e) => return DispatchOutcome::StoreFailed(e),
        };
        let Some(credentials) = storage.credentials() else {
            return DispatchOutcome::NotConfigured;
        };

        let Some(location) = PageLocation::parse(url) else {
            return DispatchOutcome::UnknownWebsite;
        };
        let Some(site) = match_site(&location, &storage.websites, &storage.sources) else {
            return DispatchOutcome::UnknownWebsite;
        };
        let Some(source) = site.source else {
            return DispatchOutcome::UntrackedPath;
        };
        let Some(chapter) = extract_chapter(&location.path, &source.path) else {
            return DispatchOutcome::NoChapter;
        };

        let manga_id = source.manga_id;
        if !self.cache.borrow().should_send(manga_id, &chapter) {
            return DispatchOutcome::Duplicate { manga_id, chapter };
        }

        let payload = UpdateMangaPayload::chapter(&chapter, &site.website.domain);
        match self.api.update_manga(&credentials, manga_id, &payload).await {
            Ok(()) => {
                self.cache.borrow_mut().record(manga_id, &chapter);
                DispatchOutcome::Updated { manga_id, chapter }
            }
            Err(error) => DispatchOutcome::PushFailed {
                manga_id,
                chapter,
                error,
            },
        }
    }
}
