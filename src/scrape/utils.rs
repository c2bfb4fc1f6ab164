//! Shared helpers for scraping: URL normalization, content identifiers, text cleanup.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;
use url::Url;

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Compiles a CSS selector at static init; panics on invalid selector.
pub fn compile_static_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid static selector '{css}': {e}"))
}

/// Matches the hash segment of a book-detail path such as `/md5/0123abcd`.
static CONTENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"/md5/([0-9A-Fa-f]+)"));

/// Extracts the content identifier (dedup key) from a detail-page href.
///
/// The identifier is lowercased so `ABC` and `abc` collapse to one result.
#[must_use]
pub fn content_identifier(href: &str) -> Option<String> {
    CONTENT_ID_RE
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Resolves a possibly relative URL string against a base URL.
///
/// Returns the value as-is if it already starts with `http://` or `https://`;
/// normalizes `//...` to `https:...`; otherwise joins with `base_url`.
#[must_use]
pub fn absolutize_url(value: &str, base_url: &Url) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if value.starts_with("//") {
        return Some(format!("https:{value}"));
    }
    base_url.join(value).ok().map(|url| url.to_string())
}

/// Collapses runs of whitespace into single spaces and trims the ends.
#[must_use]
pub fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates to at most `max_chars` characters (not bytes).
#[must_use]
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Returns true if the href's path (query and fragment ignored) ends with `extension`.
#[must_use]
pub fn href_has_extension(href: &str, extension: &str) -> bool {
    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    path.ends_with(extension)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_identifier_extracts_hash_segment() {
        assert_eq!(
            content_identifier("/md5/0a1b2c3d4e5f").as_deref(),
            Some("0a1b2c3d4e5f")
        );
        assert_eq!(
            content_identifier("https://fr.annas-archive.org/md5/ABCDEF?ref=search").as_deref(),
            Some("abcdef")
        );
    }

    #[test]
    fn test_content_identifier_none_without_md5_segment() {
        assert_eq!(content_identifier("/search?q=1984"), None);
        assert_eq!(content_identifier("/md5/"), None);
    }

    #[test]
    fn test_absolutize_url_variants() {
        let base = Url::parse("https://fr.annas-archive.org/search?q=x").unwrap();
        assert_eq!(
            absolutize_url("/md5/abc", &base).as_deref(),
            Some("https://fr.annas-archive.org/md5/abc")
        );
        assert_eq!(
            absolutize_url("https://cdn.example.com/c.jpg", &base).as_deref(),
            Some("https://cdn.example.com/c.jpg")
        );
        assert_eq!(
            absolutize_url("//cdn.example.com/c.jpg", &base).as_deref(),
            Some("https://cdn.example.com/c.jpg")
        );
        assert_eq!(absolutize_url("   ", &base), None);
    }

    #[test]
    fn test_normalize_whitespace_collapses_runs() {
        assert_eq!(normalize_whitespace("  Nineteen \n\t Eighty-Four "), "Nineteen Eighty-Four");
    }

    #[test]
    fn test_truncate_chars_counts_characters_not_bytes() {
        let title = "é".repeat(250);
        let truncated = truncate_chars(&title, 200);
        assert_eq!(truncated.chars().count(), 200);
    }

    #[test]
    fn test_href_has_extension_ignores_query_and_case() {
        assert!(href_has_extension("/get/book.EPUB?token=1", ".epub"));
        assert!(href_has_extension("https://x.org/a/b.epub#frag", ".epub"));
        assert!(!href_has_extension("https://x.org/a/b.epub.html", ".epub"));
    }
}
