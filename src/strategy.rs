/// Per-site selectors for the auto-add button, and the scraping built on them
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Where to put the button and where to read the manga's name and cover
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StrategySelectors {
    pub button_container_selector: String,
    pub name_selector: String,
    pub cover_selector: String,
}

impl StrategySelectors {
    pub fn new(button_container_selector: &str, name_selector: &str, cover_selector: &str) -> Self {
        StrategySelectors {
            button_container_selector: button_container_selector.to_string(),
            name_selector: name_selector.to_string(),
            cover_selector: cover_selector.to_string(),
        }
    }
}

/// Supported sites, keyed by exact hostname
pub struct StrategyRegistry {
    strategies: HashMap<&'static str, StrategySelectors>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        let mut strategies = HashMap::new();

        strategies.insert(
            "www.mangaread.org",
            StrategySelectors::new(".summary_content", ".post-title > h1", ".summary_image img"),
        );

        Self { strategies }
    }

    pub fn get(&self, hostname: &str) -> Option<&StrategySelectors> {
        self.strategies.get(hostname)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the page the content script runs in
pub trait PageReader {
    /// Text content of the first element matching `selector`
    fn text(&self, selector: &str) -> Option<String>;

    /// Attribute `name` of the first element matching `selector`
    fn attribute(&self, selector: &str, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    MissingName,
    MissingCover,
    Pattern(String),
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeError::MissingName => write!(f, "Manga name not found on page"),
            ScrapeError::MissingCover => write!(f, "Cover image not found on page"),
            ScrapeError::Pattern(msg) => write!(f, "Invalid pattern: {}", msg),
        }
    }
}

impl std::error::Error for ScrapeError {}

/// Values used to pre-fill the add-manga form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedManga {
    pub name: String,
    pub cover: String,
    pub cover_small: String,
}

/// One `url <width>w` entry of a srcset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcCandidate {
    pub url: String,
    pub width: u32,
}

static SRCSET_ENTRY: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn srcset_entry() -> Result<&'static Regex, ScrapeError> {
    SRCSET_ENTRY
        .get_or_init(|| Regex::new(r"^\s*(\S+)\s+(\d+)w\s*$"))
        .as_ref()
        .map_err(|e| ScrapeError::Pattern(e.to_string()))
}

/// Width-described candidates of a srcset, widest first.
///
/// Entries without a `w` descriptor (`1x`, bare URLs) are skipped.
pub fn parse_srcset(srcset: &str) -> Result<Vec<SrcCandidate>, ScrapeError> {
    let re = srcset_entry()?;

    let mut candidates: Vec<SrcCandidate> = srcset
        .split(',')
        .filter_map(|entry| {
            let captures = re.captures(entry)?;
            let width = captures.get(2)?.as_str().parse().ok()?;
            Some(SrcCandidate {
                url: captures.get(1)?.as_str().to_string(),
                width,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.width.cmp(&a.width));
    Ok(candidates)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Scrape name and covers: `cover` is the widest srcset candidate and
/// `cover_small` the narrowest, falling back to `src` for both.
pub fn scrape_manga(selectors: &StrategySelectors, reader: &impl PageReader) -> Result<ScrapedManga, ScrapeError> {
    let name = reader
        .text(&selectors.name_selector)
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .ok_or(ScrapeError::MissingName)?;

    let cover_selector = selectors.cover_selector.as_str();
    let srcset = non_empty(reader.attribute(cover_selector, "srcset"))
        .or_else(|| non_empty(reader.attribute(cover_selector, "data-srcset")));

    let candidates = match srcset {
        Some(srcset) => parse_srcset(&srcset)?,
        None => Vec::new(),
    };

    let (cover, cover_small) = match (candidates.first(), candidates.last()) {
        (Some(widest), Some(narrowest)) => (widest.url.clone(), narrowest.url.clone()),
        _ => {
            let src = non_empty(reader.attribute(cover_selector, "src"))
                .or_else(|| non_empty(reader.attribute(cover_selector, "data-src")))
                .ok_or(ScrapeError::MissingCover)?;
            (src.clone(), src)
        }
    };

    Ok(ScrapedManga {
        name,
        cover,
        cover_small,
    })
}
