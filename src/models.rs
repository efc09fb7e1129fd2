/// Data structures shared with the Manga Sync API
use serde::{Deserialize, Serialize};

/// A registered website, e.g. `mangaread.org`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Website {
    pub id: i64,
    pub domain: String,
}

/// A manga read at a path prefix on a website
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub id: i64,
    pub manga_id: i64,
    pub website_id: i64,
    pub path: String,
    #[serde(default)]
    pub number_unread_chapter: Option<i64>,
}

/// A manga as listed or fetched by id.
///
/// `GET /manga` puts the small cover in `cover`; neither listing sends
/// `cover_small`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manga {
    pub id: i64,
    pub name: String,
    pub cover: String,
    #[serde(default)]
    pub cover_small: Option<String>,
    #[serde(default)]
    pub current_chapter: Option<String>,
    #[serde(default)]
    pub last_read_at: Option<String>,
    #[serde(default)]
    pub number_unread_chapter: Option<i64>,
}

/// One entry of a manga's reading history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryItem {
    pub number: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateMangaPayload {
    pub name: String,
    pub cover: String,
    pub cover_small: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateSourcePayload {
    pub manga_id: i64,
    pub website_id: i64,
    pub path: String,
}

/// Partial update; only the fields that are set are sent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateMangaPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_small: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<String>,
}

impl UpdateMangaPayload {
    /// Body of the auto-update PATCH: `{chapter_number, website_domain}`
    pub fn chapter(chapter_number: &str, website_domain: &str) -> Self {
        UpdateMangaPayload {
            chapter_number: Some(chapter_number.to_string()),
            website_domain: Some(website_domain.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshUnreadResult {
    pub manga_id: i64,
    pub manga_name: String,
    pub domain: String,
    pub unread_count: Option<i64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshUnreadData {
    pub total: usize,
    pub success: usize,
    pub errors: usize,
    pub results: Vec<RefreshUnreadResult>,
}

/// Envelope every API response is wrapped in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
