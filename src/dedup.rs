use std::collections::HashMap;

/// Last chapter pushed per manga, for the lifetime of the background process.
///
/// Unbounded: one entry per tracked manga at most.
#[derive(Debug, Default)]
pub struct DedupCache {
    last_sent: HashMap<i64, String>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self {
            last_sent: HashMap::new(),
        }
    }

    /// False only when `chapter` is exactly what was last pushed for `manga_id`
    pub fn should_send(&self, manga_id: i64, chapter: &str) -> bool {
        self.last_sent.get(&manga_id).map(String::as_str) != Some(chapter)
    }

    pub fn record(&mut self, manga_id: i64, chapter: &str) {
        self.last_sent.insert(manga_id, chapter.to_string());
    }
}
