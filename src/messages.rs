/// Runtime messages exchanged between the background and content scripts
use crate::models::{CreateMangaPayload, Website};
use crate::strategy::StrategySelectors;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum ExtensionMessage {
    /// Content script -> background: submit the add-manga form
    #[serde(rename = "MANGA_SYNC_CREATE_MANGA")]
    CreateManga(CreateMangaRequest),
    /// Background -> content script: open the add-manga form
    #[serde(rename = "MANGA_SYNC_SHOW_FORM")]
    ShowForm(FormData),
    /// Background -> content script: add the auto-add button to the page
    #[serde(rename = "MANGA_SYNC_INJECT_AUTO_BUTTON")]
    InjectAutoButton(AutoButtonData),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateMangaRequest {
    pub name: String,
    pub cover: String,
    pub cover_small: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub path: String,
}

impl CreateMangaRequest {
    pub fn has_required_fields(&self) -> bool {
        [&self.name, &self.cover, &self.cover_small]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Both domain and path given: the backend also creates the source
    pub fn has_source(&self) -> bool {
        !self.domain.trim().is_empty() && !self.path.trim().is_empty()
    }

    pub fn to_payload(&self) -> CreateMangaPayload {
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        CreateMangaPayload {
            name: self.name.trim().to_string(),
            cover: self.cover.trim().to_string(),
            cover_small: self.cover_small.trim().to_string(),
            website_domain: optional(&self.domain),
            source_path: optional(&self.path),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormData {
    pub domain: String,
    pub path: String,
    pub websites: Vec<Website>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoButtonData {
    pub domain: String,
    pub path: String,
    pub websites: Vec<Website>,
    pub strategy: StrategySelectors,
}

/// Reply to [`ExtensionMessage::CreateManga`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateMangaResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreateMangaResponse {
    pub fn created() -> Self {
        CreateMangaResponse {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        CreateMangaResponse {
            success: false,
            error: Some(error.into()),
        }
    }
}
