/// Matching of visited URLs against registered websites and sources
use crate::models::{Source, Website};
use url::Url;

/// Hostname and path of a visited page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub hostname: String,
    pub path: String,
}

impl PageLocation {
    /// Parse a tab URL. Pages without a host (about:blank, file://) yield `None`.
    pub fn parse(url: &str) -> Option<PageLocation> {
        let parsed = Url::parse(url.trim()).ok()?;
        let hostname = parsed.host_str()?.to_string();
        if hostname.is_empty() {
            return None;
        }

        Some(PageLocation {
            hostname,
            path: parsed.path().to_string(),
        })
    }
}

/// A website the page belongs to, and the tracked source if the path is one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteMatch<'a> {
    pub website: &'a Website,
    pub source: Option<&'a Source>,
}

impl SiteMatch<'_> {
    pub fn is_path_tracked(&self) -> bool {
        self.source.is_some()
    }
}

/// Exact domain or any subdomain of it: `www.example.com` matches `example.com`,
/// `notexample.com` does not.
pub fn domain_matches(hostname: &str, domain: &str) -> bool {
    if domain.is_empty() {
        return false;
    }

    hostname == domain
        || hostname
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

pub fn find_website<'a>(hostname: &str, websites: &'a [Website]) -> Option<&'a Website> {
    websites.iter().find(|w| domain_matches(hostname, &w.domain))
}

/// First source of `website` (in list order) whose path prefixes `path`.
///
/// Not the most specific prefix: with `/manga/foo` listed before
/// `/manga/foo/special`, the former wins for both.
pub fn find_source<'a>(website: &Website, path: &str, sources: &'a [Source]) -> Option<&'a Source> {
    sources
        .iter()
        .filter(|s| s.website_id == website.id)
        .find(|s| path.starts_with(s.path.as_str()))
}

/// Resolve a location to its website and source
pub fn match_site<'a>(
    location: &PageLocation,
    websites: &'a [Website],
    sources: &'a [Source],
) -> Option<SiteMatch<'a>> {
    let website = find_website(&location.hostname, websites)?;
    let source = find_source(website, &location.path, sources);

    Some(SiteMatch { website, source })
}

/// Same as [`match_site`] but starting from a raw URL
pub fn match_url<'a>(
    url: &str,
    websites: &'a [Website],
    sources: &'a [Source],
) -> Option<SiteMatch<'a>> {
    let location = PageLocation::parse(url)?;
    match_site(&location, websites, sources)
}
