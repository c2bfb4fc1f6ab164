//! Search-result extraction from the book site's result page markup.
//!
//! Candidate anchors are every `a[href*="/md5/"]` in document order. Each field is
//! resolved by an ordered, data-driven list of strategies so fixtures can exercise
//! one strategy at a time and the site's markup drift only touches the tables.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::utils::{
    absolutize_url, compile_static_selector, content_identifier, normalize_whitespace,
    truncate_chars,
};
use super::{
    DEFAULT_AUTHOR, DEFAULT_LANGUAGE, MAX_RESULTS, MAX_TITLE_CHARS, SOURCE_NAME, SearchResult,
};

static CANDIDATE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"a[href*="/md5/"]"#));

/// One way of deriving a title from a candidate anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStrategy {
    /// Text of the first descendant matching the selector.
    Descendant(&'static str),
    /// The anchor's own text, first non-empty line.
    OwnText,
    /// Text of the first element under the anchor's parent matching the selector,
    /// excluding anything inside the anchor itself.
    SiblingHeading(&'static str),
    /// Value of the first non-empty attribute on the anchor.
    Attribute(&'static [&'static str]),
}

/// Title strategies, tried in order until one yields a non-empty string.
pub const TITLE_STRATEGIES: [TitleStrategy; 4] = [
    TitleStrategy::Descendant("h3, .title"),
    TitleStrategy::OwnText,
    TitleStrategy::SiblingHeading("h1, h2, h3, h4, h5, h6, .title"),
    TitleStrategy::Attribute(&["title", "aria-label", "data-title"]),
];

impl TitleStrategy {
    /// Applies this strategy to `anchor`.
    #[must_use]
    pub fn resolve(self, anchor: ElementRef<'_>) -> Option<String> {
        let value = match self {
            Self::Descendant(css) => {
                let selector = Selector::parse(css).ok()?;
                anchor.select(&selector).next().map(element_text)
            }
            Self::OwnText => anchor
                .text()
                .collect::<String>()
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(normalize_whitespace),
            Self::SiblingHeading(css) => {
                let selector = Selector::parse(css).ok()?;
                let parent = owned_scopes(anchor).nth(1)?;
                parent
                    .select(&selector)
                    .filter(|el| el.id() != anchor.id())
                    .find(|el| !el.ancestors().any(|node| node.id() == anchor.id()))
                    .map(element_text)
            }
            Self::Attribute(names) => names
                .iter()
                .filter_map(|name| anchor.value().attr(name))
                .map(normalize_whitespace)
                .find(|value| !value.is_empty()),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// A field looked up near the anchor: self first, then parent, then grandparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// CSS selector evaluated inside each scope.
    pub selector: &'static str,
    /// Attribute to read instead of the element's text.
    pub attribute: Option<&'static str>,
}

impl FieldRule {
    const fn text(selector: &'static str) -> Self {
        Self {
            selector,
            attribute: None,
        }
    }

    const fn attr(selector: &'static str, attribute: &'static str) -> Self {
        Self {
            selector,
            attribute: Some(attribute),
        }
    }

    /// Returns the first non-empty match, searching outward from `anchor`.
    ///
    /// The search stops at the first ancestor that also holds a link to a
    /// different book, so one result never borrows a neighbour's fields.
    #[must_use]
    pub fn resolve(self, anchor: ElementRef<'_>) -> Option<String> {
        let selector = Selector::parse(self.selector).ok()?;
        owned_scopes(anchor).find_map(|scope| {
            scope.select(&selector).find_map(|el| {
                let value = match self.attribute {
                    Some(name) => el.value().attr(name).map(normalize_whitespace),
                    None => Some(element_text(el)),
                };
                value.filter(|v| !v.is_empty())
            })
        })
    }
}

/// The anchor, its parent and its grandparent, cut off at the first scope
/// containing a candidate link with another content identifier.
fn owned_scopes(anchor: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    let own_id = anchor.value().attr("href").and_then(content_identifier);
    std::iter::successors(Some(anchor), |el| el.parent().and_then(ElementRef::wrap))
        .take(3)
        .take_while(move |scope| {
            scope
                .select(&CANDIDATE_SELECTOR)
                .filter_map(|link| link.value().attr("href").and_then(content_identifier))
                .all(|id| own_id.as_deref() == Some(id.as_str()))
        })
}

/// Author lookup (defaults to `"unknown"`).
pub const AUTHOR_RULE: FieldRule = FieldRule::text(".author, .italic");
/// Publication year lookup.
pub const YEAR_RULE: FieldRule = FieldRule::text(".year");
/// Language lookup (defaults to `"fr"`).
pub const LANGUAGE_RULE: FieldRule = FieldRule::text(".language");
/// Human-readable file size lookup.
pub const FILE_SIZE_RULE: FieldRule = FieldRule::text(".size");
/// Cover image lookup.
pub const COVER_RULE: FieldRule = FieldRule::attr("img[src]", "src");

/// Turns search-page markup into [`SearchResult`]s.
#[derive(Debug, Clone)]
pub struct ResultExtractor {
    base_url: Url,
}

impl ResultExtractor {
    /// Creates an extractor that absolutizes links against `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Extracts up to 20 results in document order, one per content identifier.
    ///
    /// Anchors without a usable title are dropped before deduplication, so a
    /// title-less cover link does not shadow the titled link to the same book.
    #[must_use]
    pub fn extract(&self, html: &str) -> Vec<SearchResult> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();

        document
            .select(&CANDIDATE_SELECTOR)
            .filter_map(|anchor| self.candidate(anchor))
            .filter(|result| seen.insert(result.content_id.clone()))
            .take(MAX_RESULTS)
            .collect()
    }

    fn candidate(&self, anchor: ElementRef<'_>) -> Option<SearchResult> {
        let href = anchor.value().attr("href")?;
        let content_id = content_identifier(href)?;
        let title = TITLE_STRATEGIES
            .iter()
            .find_map(|strategy| strategy.resolve(anchor))?;
        let book_url = absolutize_url(href, &self.base_url)?;

        Some(SearchResult {
            title: truncate_chars(&title, MAX_TITLE_CHARS),
            author: AUTHOR_RULE
                .resolve(anchor)
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            year: YEAR_RULE.resolve(anchor),
            language: LANGUAGE_RULE
                .resolve(anchor)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            file_size: FILE_SIZE_RULE.resolve(anchor),
            cover_url: COVER_RULE
                .resolve(anchor)
                .and_then(|src| absolutize_url(&src, &self.base_url)),
            book_url,
            source: SOURCE_NAME.to_string(),
            content_id,
        })
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://fr.annas-archive.org").unwrap()
    }

    fn first_anchor(document: &Html) -> ElementRef<'_> {
        document.select(&CANDIDATE_SELECTOR).next().unwrap()
    }

    #[test]
    fn test_title_descendant_strategy() {
        let doc = Html::parse_fragment(r#"<a href="/md5/aa"><h3> 1984 </h3><span>other</span></a>"#);
        let title = TitleStrategy::Descendant("h3, .title").resolve(first_anchor(&doc));
        assert_eq!(title.as_deref(), Some("1984"));
    }

    #[test]
    fn test_title_own_text_strategy_takes_first_line() {
        let doc = Html::parse_fragment("<a href=\"/md5/aa\">\n  Animal Farm  \n  George Orwell\n</a>");
        let title = TitleStrategy::OwnText.resolve(first_anchor(&doc));
        assert_eq!(title.as_deref(), Some("Animal Farm"));
    }

    #[test]
    fn test_title_sibling_heading_strategy() {
        let doc = Html::parse_fragment(
            r#"<div><a href="/md5/aa"><img src="/c.jpg"></a><h4>Brave New World</h4></div>"#,
        );
        let anchor = first_anchor(&doc);
        assert_eq!(TitleStrategy::OwnText.resolve(anchor), None);
        assert_eq!(
            TitleStrategy::SiblingHeading("h1, h2, h3, h4, h5, h6, .title")
                .resolve(anchor)
                .as_deref(),
            Some("Brave New World")
        );
    }

    #[test]
    fn test_title_attribute_strategy() {
        let doc = Html::parse_fragment(r#"<a href="/md5/aa" aria-label="Dune"><img src="/c.jpg"></a>"#);
        let title = TitleStrategy::Attribute(&["title", "aria-label"]).resolve(first_anchor(&doc));
        assert_eq!(title.as_deref(), Some("Dune"));
    }

    #[test]
    fn test_field_rule_searches_parent_and_grandparent() {
        let doc = Html::parse_fragment(
            r#"<section><span class="year">1949</span>
                 <div><span class="author">George Orwell</span><a href="/md5/aa">1984</a></div>
               </section>"#,
        );
        let anchor = first_anchor(&doc);
        assert_eq!(AUTHOR_RULE.resolve(anchor).as_deref(), Some("George Orwell"));
        assert_eq!(YEAR_RULE.resolve(anchor).as_deref(), Some("1949"));
        assert_eq!(LANGUAGE_RULE.resolve(anchor), None);
    }

    #[test]
    fn test_field_rule_stops_at_scope_shared_with_other_books() {
        let doc = Html::parse_fragment(
            r#"<ul>
                 <li><a href="/md5/aa"><h3>1984</h3></a><span class="author">George Orwell</span>
                     <span class="year">1949</span><img src="/covers/aa.jpg"></li>
                 <li><a href="/md5/bb"><h3>Animal Farm</h3></a></li>
               </ul>"#,
        );
        let second = doc.select(&CANDIDATE_SELECTOR).nth(1).unwrap();
        assert_eq!(AUTHOR_RULE.resolve(second), None);
        assert_eq!(YEAR_RULE.resolve(second), None);
        assert_eq!(COVER_RULE.resolve(second), None);

        let first = first_anchor(&doc);
        assert_eq!(AUTHOR_RULE.resolve(first).as_deref(), Some("George Orwell"));
    }

    #[test]
    fn test_sibling_heading_ignores_other_books_headings() {
        let doc = Html::parse_fragment(
            r#"<div><a href="/md5/aa"><img src="/c.jpg"></a><a href="/md5/bb"><h4>Dune</h4></a></div>"#,
        );
        let anchor = first_anchor(&doc);
        assert_eq!(
            TitleStrategy::SiblingHeading("h1, h2, h3, h4, h5, h6, .title").resolve(anchor),
            None
        );
    }

    #[test]
    fn test_extract_applies_defaults_and_absolute_urls() {
        let extractor = ResultExtractor::new(base());
        let results = extractor
            .extract(r#"<html><body><a href="/md5/abc123"><img src="/covers/1.jpg"><h3>1984</h3></a></body></html>"#);

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.title, "1984");
        assert_eq!(result.author, "unknown");
        assert_eq!(result.language, "fr");
        assert_eq!(result.year, None);
        assert_eq!(result.book_url, "https://fr.annas-archive.org/md5/abc123");
        assert_eq!(
            result.cover_url.as_deref(),
            Some("https://fr.annas-archive.org/covers/1.jpg")
        );
        assert_eq!(result.content_id, "abc123");
        assert_eq!(result.source, "annas-archive");
    }

    #[test]
    fn test_extract_deduplicates_by_content_identifier() {
        let html = r#"
            <a href="/md5/111"><h3>1984</h3></a>
            <a href="/md5/111"><h3>1984 (duplicate link)</h3></a>
            <a href="/md5/222"><h3>1984: Graphic Novel</h3></a>
        "#;
        let results = ResultExtractor::new(base()).extract(html);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "1984");
        assert_eq!(results[1].content_id, "222");
    }

    #[test]
    fn test_extract_drops_titleless_anchor_without_shadowing() {
        let html = r#"
            <div><a href="/md5/111"><img src="/c.jpg"></a></div>
            <div><a href="/md5/111"><h3>Dune</h3></a></div>
        "#;
        let results = ResultExtractor::new(base()).extract(html);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Dune");
    }

    #[test]
    fn test_extract_caps_results_and_title_length() {
        let long_title = "x".repeat(500);
        let html: String = (0..40)
            .map(|i| format!(r#"<a href="/md5/{i:04x}"><h3>{long_title}</h3></a>"#))
            .collect();

        let results = ResultExtractor::new(base()).extract(&html);
        assert_eq!(results.len(), 20);
        assert!(results.iter().all(|r| r.title.chars().count() <= 200));
    }

    #[test]
    fn test_extract_empty_page_yields_no_results() {
        let results = ResultExtractor::new(base()).extract("<html><body><p>Aucun résultat</p></body></html>");
        assert!(results.is_empty());
    }
}
