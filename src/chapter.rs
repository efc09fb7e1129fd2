/// Chapter token extraction from a tracked path

/// Derive the chapter token from the part of `path` after `source_path`.
///
/// One leading and one trailing `/` are removed; the rest is passed through
/// untouched (`chapter-12`, `12`, `vol-1/ch-3`). An empty remainder, or a
/// `path` that does not start with `source_path`, gives `None`.
pub fn extract_chapter(path: &str, source_path: &str) -> Option<String> {
    let remaining = path.strip_prefix(source_path)?;
    let remaining = remaining.strip_prefix('/').unwrap_or(remaining);
    let chapter = remaining.strip_suffix('/').unwrap_or(remaining);

    if chapter.is_empty() {
        None
    } else {
        Some(chapter.to_string())
    }
}
