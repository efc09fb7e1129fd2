/// Client for the Manga Sync REST API
use crate::config::Credentials;
use crate::models::{
    ApiResponse, CreateMangaPayload, CreateSourcePayload, HistoryItem, Manga, RefreshUnreadData,
    Setting, Source, UpdateMangaPayload, Website,
};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never got a response
    Network(String),
    /// Non-2xx response without a readable envelope
    Status(u16),
    /// Envelope with `status: "error"`
    Backend(String),
    Decode(String),
    MissingData,
    InvalidUrl(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Status(code) => write!(f, "HTTP error: {}", code),
            ApiError::Backend(msg) => write!(f, "{}", msg),
            ApiError::Decode(msg) => write!(f, "Invalid response: {}", msg),
            ApiError::MissingData => write!(f, "Response contained no data"),
            ApiError::InvalidUrl(msg) => write!(f, "Invalid API URL: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

/// The calls the background core makes against the API
#[allow(async_fn_in_trait)]
pub trait MangaApi {
    /// `PATCH /manga/{id}`
    async fn update_manga(
        &self,
        credentials: &Credentials,
        manga_id: i64,
        payload: &UpdateMangaPayload,
    ) -> ApiResult<()>;

    /// `POST /manga`; the backend answers with `data: null`
    async fn create_manga(&self, credentials: &Credentials, payload: &CreateMangaPayload) -> ApiResult<()>;

    /// `POST /website/{domain}`; the backend answers with `data: null`
    async fn create_website(&self, credentials: &Credentials, domain: &str) -> ApiResult<()>;

    /// `GET /website`
    async fn list_websites(&self, credentials: &Credentials) -> ApiResult<Vec<Website>>;

    /// `GET /source`
    async fn list_sources(&self, credentials: &Credentials) -> ApiResult<Vec<Source>>;
}

/// Interpret a response body. Success means a 2xx status *and* a
/// `"success"` envelope.
pub(crate) fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<Option<T>> {
    let ok = (200..300).contains(&status);
    if ok && body.trim().is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<ApiResponse<T>>(body) {
        Ok(envelope) if ok && envelope.is_success() => Ok(envelope.data),
        Ok(envelope) if envelope.message.is_empty() => Err(ApiError::Status(status)),
        Ok(envelope) => Err(ApiError::Backend(envelope.message)),
        Err(e) if ok => Err(ApiError::Decode(e.to_string())),
        Err(_) => Err(ApiError::Status(status)),
    }
}

fn require<T>(data: Option<T>) -> ApiResult<T> {
    data.ok_or(ApiError::MissingData)
}

/// `{api_url}/{prefix}/{segment}` with `segment` percent-encoded
fn segment_url(credentials: &Credentials, prefix: &str, segment: &str) -> ApiResult<Url> {
    let mut url = Url::parse(&credentials.endpoint(prefix))
        .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl(credentials.api_url.clone()))?
        .push(segment);
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    fn builder(&self, credentials: &Credentials, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&credentials.bearer_token)
            .header(ACCEPT, "application/json")
    }

    async fn execute<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<Option<T>> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        decode_envelope(status, &body)
    }

    async fn get<T: DeserializeOwned>(&self, credentials: &Credentials, path: &str) -> ApiResult<T> {
        let builder = self.builder(credentials, Method::GET, &credentials.endpoint(path));
        require(Self::execute(builder).await?)
    }

    /// Send and accept any success envelope, whatever its `data`
    async fn send(builder: RequestBuilder) -> ApiResult<()> {
        Self::execute::<serde_json::Value>(builder).await.map(|_| ())
    }

    async fn delete(&self, credentials: &Credentials, path: &str) -> ApiResult<()> {
        Self::send(self.builder(credentials, Method::DELETE, &credentials.endpoint(path))).await
    }

    pub async fn list_manga(&self, credentials: &Credentials) -> ApiResult<Vec<Manga>> {
        self.get(credentials, "/manga").await
    }

    pub async fn get_manga(&self, credentials: &Credentials, manga_id: i64) -> ApiResult<Manga> {
        self.get(credentials, &format!("/manga/{}", manga_id)).await
    }

    pub async fn delete_manga(&self, credentials: &Credentials, manga_id: i64) -> ApiResult<()> {
        self.delete(credentials, &format!("/manga/{}", manga_id)).await
    }

    pub async fn manga_sources(&self, credentials: &Credentials, manga_id: i64) -> ApiResult<Vec<Source>> {
        self.get(credentials, &format!("/manga/{}/source", manga_id)).await
    }

    pub async fn manga_history(&self, credentials: &Credentials, manga_id: i64) -> ApiResult<Vec<HistoryItem>> {
        self.get(credentials, &format!("/manga/{}/history", manga_id)).await
    }

    /// `POST /manga/refresh-unread`
    pub async fn refresh_unread(&self, credentials: &Credentials) -> ApiResult<RefreshUnreadData> {
        let builder = self.builder(credentials, Method::POST, &credentials.endpoint("/manga/refresh-unread"));
        require(Self::execute(builder).await?)
    }

    /// `POST /source`; resolves to the created source when the server echoes it
    pub async fn create_source(
        &self,
        credentials: &Credentials,
        payload: &CreateSourcePayload,
    ) -> ApiResult<Option<Source>> {
        let builder = self
            .builder(credentials, Method::POST, &credentials.endpoint("/source"))
            .json(payload);
        Self::execute(builder).await
    }

    pub async fn delete_source(&self, credentials: &Credentials, source_id: i64) -> ApiResult<()> {
        self.delete(credentials, &format!("/source/{}", source_id)).await
    }

    /// `GET /setting` returns a key/value object; sorted by key here
    pub async fn list_settings(&self, credentials: &Credentials) -> ApiResult<Vec<Setting>> {
        let settings: BTreeMap<String, String> = self.get(credentials, "/setting").await?;
        Ok(settings
            .into_iter()
            .map(|(key, value)| Setting { key, value })
            .collect())
    }

    /// `POST /setting/{key}` with the raw value as body
    pub async fn update_setting(&self, credentials: &Credentials, key: &str, value: &str) -> ApiResult<()> {
        let url = segment_url(credentials, "/setting", key)?;
        let builder = self
            .builder(credentials, Method::POST, url.as_str())
            .body(value.to_string());
        Self::send(builder).await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MangaApi for ApiClient {
    async fn update_manga(
        &self,
        credentials: &Credentials,
        manga_id: i64,
        payload: &UpdateMangaPayload,
    ) -> ApiResult<()> {
        let url = credentials.endpoint(&format!("/manga/{}", manga_id));
        Self::send(self.builder(credentials, Method::PATCH, &url).json(payload)).await
    }

    async fn create_manga(&self, credentials: &Credentials, payload: &CreateMangaPayload) -> ApiResult<()> {
        let builder = self
            .builder(credentials, Method::POST, &credentials.endpoint("/manga"))
            .json(payload);
        Self::send(builder).await
    }

    async fn create_website(&self, credentials: &Credentials, domain: &str) -> ApiResult<()> {
        let url = segment_url(credentials, "/website", domain)?;
        Self::send(self.builder(credentials, Method::POST, url.as_str())).await
    }

    async fn list_websites(&self, credentials: &Credentials) -> ApiResult<Vec<Website>> {
        self.get(credentials, "/website").await
    }

    async fn list_sources(&self, credentials: &Credentials) -> ApiResult<Vec<Source>> {
        self.get(credentials, "/source").await
    }
}
