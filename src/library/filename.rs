//! Storage filename derivation for shelved books.
//!
//! Pattern: `<slug>-<unix millis>.epub`, where the slug is the lowercased title
//! with every run of non `[a-z0-9]` characters collapsed to one `-`, capped at
//! 50 characters. The timestamp suffix keeps re-uploads of a title distinct.

/// Maximum slug length, in characters.
pub const MAX_SLUG_CHARS: usize = 50;

/// Slug used when the title is missing or has no usable characters.
pub const DEFAULT_SLUG: &str = "book";

/// Extension appended to every stored book.
pub const BOOK_FILE_EXTENSION: &str = ".epub";

/// Builds a filesystem- and URL-safe slug from a title.
#[must_use]
pub fn slugify_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut prev_sep = false;
    for ch in title.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
            prev_sep = false;
        } else if !prev_sep {
            out.push('-');
            prev_sep = true;
        }
    }

    let truncated: String = out.chars().take(MAX_SLUG_CHARS).collect();
    let trimmed = truncated.trim_matches('-');
    if trimmed.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Builds the object key for a new upload.
#[must_use]
pub fn storage_filename(title: Option<&str>, timestamp_millis: i64) -> String {
    let slug = title.map_or_else(|| DEFAULT_SLUG.to_string(), slugify_title);
    format!("{slug}-{timestamp_millis}{BOOK_FILE_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separator_runs() {
        assert_eq!(slugify_title("Le Petit Prince — Édition 1943!"), "le-petit-prince-dition-1943");
        assert_eq!(slugify_title("1984"), "1984");
    }

    #[test]
    fn test_slugify_truncates_to_fifty_chars() {
        let slug = slugify_title(&"abcdefghij ".repeat(10));
        assert!(slug.chars().count() <= MAX_SLUG_CHARS, "slug too long: {slug}");
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_slugify_falls_back_when_nothing_usable() {
        assert_eq!(slugify_title("!!! ???"), DEFAULT_SLUG);
        assert_eq!(slugify_title(""), DEFAULT_SLUG);
    }

    #[test]
    fn test_storage_filename_pattern() {
        assert_eq!(
            storage_filename(Some("Animal Farm"), 1_700_000_000_000),
            "animal-farm-1700000000000.epub"
        );
        assert_eq!(storage_filename(None, 42), "book-42.epub");
    }

    #[test]
    fn test_storage_filename_has_no_path_separators() {
        let name = storage_filename(Some("../../etc/passwd"), 1);
        assert!(!name.contains('/') && !name.contains('\\') && !name.contains(".."));
    }
}
