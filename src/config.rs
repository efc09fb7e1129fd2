/// Persisted extension configuration (browser.storage.local)
use crate::models::{Source, Website};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const KEY_API_URL: &str = "apiUrl";
pub const KEY_BEARER_TOKEN: &str = "bearerToken";
pub const KEY_WEBSITES: &str = "websites";
pub const KEY_SOURCES: &str = "sources";

pub const ALL_KEYS: [&str; 4] = [KEY_API_URL, KEY_BEARER_TOKEN, KEY_WEBSITES, KEY_SOURCES];

/// Everything the background core reads from storage
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageData {
    pub api_url: String,
    pub bearer_token: String,
    pub websites: Vec<Website>,
    pub sources: Vec<Source>,
}

/// Base URL and token of a configured API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_url: String,
    pub bearer_token: String,
}

impl Credentials {
    pub fn new(api_url: &str, bearer_token: &str) -> Self {
        Credentials {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.trim().to_string(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

impl StorageData {
    /// `None` when either the API URL or the token is missing
    pub fn credentials(&self) -> Option<Credentials> {
        let credentials = Credentials::new(&self.api_url, &self.bearer_token);
        if credentials.api_url.is_empty() || credentials.bearer_token.is_empty() {
            None
        } else {
            Some(credentials)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Storage error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Key-value store backing the configuration
#[allow(async_fn_in_trait)]
pub trait ConfigStore {
    async fn load(&self) -> Result<StorageData, StoreError>;

    async fn save_websites(&self, websites: &[Website]) -> Result<(), StoreError>;

    async fn save_sources(&self, sources: &[Source]) -> Result<(), StoreError>;

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError>;

    async fn clear_credentials(&self) -> Result<(), StoreError>;
}
