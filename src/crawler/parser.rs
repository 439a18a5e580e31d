//! HTML parser for extracting page content, title and links
//!
//! This module handles parsing HTML content to extract:
//! - The page title (from the `<title>` tag)
//! - Readable text from the node matching the content selector
//! - Links to follow, from the nodes matching the link selector

use crate::config::CrawlConfig;
use crate::ConfigError;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Paragraphs this short or shorter are dropped from extracted content
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Subtrees whose text is never visible
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Readable text of the content node
    pub content: String,

    /// Outbound links: absolute, fragment-free, de-duplicated, document order
    pub links: Vec<String>,
}

/// Compiled selectors for one session
///
/// Selectors are compiled once per session and shared by every fetch task.
#[derive(Debug)]
pub struct PageExtractor {
    link_selector: Selector,
    content_selector: Selector,
    title_selector: Selector,
    paragraph_selector: Selector,
    body_selector: Selector,
}

impl PageExtractor {
    /// Compiles the link and content selectors of a session config
    pub fn new(link_selector: &str, content_selector: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            link_selector: compile_selector(link_selector)?,
            content_selector: compile_selector(content_selector)?,
            title_selector: compile_selector("title")?,
            paragraph_selector: compile_selector("p")?,
            body_selector: compile_selector("body")?,
        })
    }

    pub fn from_config(config: &CrawlConfig) -> Result<Self, ConfigError> {
        Self::new(&config.link_selector, &config.content_selector)
    }

    /// Parses HTML content and extracts title, content and links
    ///
    /// # Content Rules
    ///
    /// - The first node matching the content selector is used.
    /// - If it contains `<p>` descendants, content is each paragraph's trimmed
    ///   text longer than 20 characters, joined by a blank line.
    /// - Otherwise content is the node's visible text.
    /// - With no matching node, the `<body>` visible text is used.
    ///
    /// # Link Rules
    ///
    /// - `href` of each node matching the link selector; nodes without `href`
    ///   are skipped
    /// - Resolved against `base_url` (the page URL after redirects)
    /// - `javascript:`, `mailto:`, `tel:`, `data:` and fragment-only hrefs are
    ///   dropped, as is anything that is not http(s) after resolution
    /// - Fragments are stripped and duplicates removed, keeping first position
    ///
    /// # Example
    ///
    /// ```
    /// use skein::crawler::PageExtractor;
    /// use url::Url;
    ///
    /// let extractor = PageExtractor::new("a", "body").unwrap();
    /// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
    /// let base_url = Url::parse("https://example.com/").unwrap();
    /// let parsed = extractor.parse(html, &base_url);
    /// assert_eq!(parsed.title, Some("Test".to_string()));
    /// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
    /// ```
    pub fn parse(&self, html: &str, base_url: &Url) -> ParsedPage {
        let document = Html::parse_document(html);

        ParsedPage {
            title: self.extract_title(&document),
            content: self.extract_content(&document),
            links: self.extract_links(&document, base_url),
        }
    }

    /// Extracts the page title from the HTML document
    fn extract_title(&self, document: &Html) -> Option<String> {
        document
            .select(&self.title_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn extract_content(&self, document: &Html) -> String {
        let Some(node) = document.select(&self.content_selector).next() else {
            return document
                .select(&self.body_selector)
                .next()
                .map(visible_text)
                .unwrap_or_default();
        };

        let mut paragraphs = node.select(&self.paragraph_selector).peekable();
        if paragraphs.peek().is_none() {
            return visible_text(node);
        }

        paragraphs
            .map(visible_text)
            .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn extract_links(&self, document: &Html, base_url: &Url) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&self.link_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if let Some(absolute_url) = resolve_link(href, base_url) {
                if seen.insert(absolute_url.clone()) {
                    links.push(absolute_url);
                }
            }
        }

        links
    }
}

fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

/// Collects the visible text under an element, collapsing whitespace
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if INVISIBLE_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links (same page anchors)
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);

    Some(absolute_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/dir/page").unwrap()
    }

    fn parse(html: &str) -> ParsedPage {
        PageExtractor::new("a", "body").unwrap().parse(html, &base_url())
    }

    #[test]
    fn test_extract_title() {
        let parsed = parse(r#"<html><head><title>Test Page</title></head><body></body></html>"#);
        assert_eq!(parsed.title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let parsed = parse(r#"<html><head><title>  Test Page  </title></head><body></body></html>"#);
        assert_eq!(parsed.title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let parsed = parse(r#"<html><head></head><body></body></html>"#);
        assert_eq!(parsed.title, None);

        let parsed = parse(r#"<html><head><title>   </title></head><body></body></html>"#);
        assert_eq!(parsed.title, None);
    }

    #[test]
    fn test_content_from_paragraphs() {
        let html = r#"<body>
            <p>This paragraph is long enough to be kept.</p>
            <p>Too short.</p>
            <p>  Another paragraph that clears the bar.  </p>
        </body>"#;
        assert_eq!(
            parse(html).content,
            "This paragraph is long enough to be kept.\n\nAnother paragraph that clears the bar."
        );
    }

    #[test]
    fn test_short_paragraphs_give_empty_content() {
        let html = r#"<body><p>tiny</p><div>Some other text here</div></body>"#;
        assert_eq!(parse(html).content, "");
    }

    #[test]
    fn test_content_without_paragraphs_is_visible_text() {
        let html = r#"<body>
            <div>Hello <b>world</b></div>
            <script>var hidden = 1;</script>
            <style>body { color: red; }</style>
            <noscript>enable js</noscript>
        </body>"#;
        assert_eq!(parse(html).content, "Hello world");
    }

    #[test]
    fn test_content_selector_scopes_extraction() {
        let extractor = PageExtractor::new("a", "article").unwrap();
        let html = r#"<body>
            <nav>Navigation text</nav>
            <article><h1>Headline</h1><span>Body copy</span></article>
        </body>"#;
        assert_eq!(extractor.parse(html, &base_url()).content, "Headline Body copy");
    }

    #[test]
    fn test_content_falls_back_to_body() {
        let extractor = PageExtractor::new("a", "main#missing").unwrap();
        let html = r#"<body><div>Fallback text</div></body>"#;
        assert_eq!(extractor.parse(html, &base_url()).content, "Fallback text");
    }

    #[test]
    fn test_extract_relative_links() {
        let html = r#"<body>
            <a href="/absolute">Absolute</a>
            <a href="relative">Relative</a>
            <a href="../up">Up</a>
            <a href="https://other.org/x">Other</a>
        </body>"#;
        assert_eq!(
            parse(html).links,
            vec![
                "https://example.com/absolute",
                "https://example.com/dir/relative",
                "https://example.com/up",
                "https://other.org/x",
            ]
        );
    }

    #[test]
    fn test_skip_special_links() {
        let html = r##"<body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Phone</a>
            <a href="data:text/html,<p>x</p>">Data</a>
            <a href="#section">Anchor</a>
            <a href="ftp://example.com/file">FTP</a>
            <a>No href</a>
            <a href="/valid">Valid</a>
        </body>"##;
        assert_eq!(parse(html).links, vec!["https://example.com/valid"]);
    }

    #[test]
    fn test_links_deduplicated_without_fragments() {
        let html = r##"<body>
            <a href="/b">B</a>
            <a href="/a#top">A top</a>
            <a href="/b">B again</a>
            <a href="/a#bottom">A bottom</a>
        </body>"##;
        assert_eq!(
            parse(html).links,
            vec!["https://example.com/b", "https://example.com/a"]
        );
    }

    #[test]
    fn test_link_selector_scopes_links() {
        let extractor = PageExtractor::new("nav a", "body").unwrap();
        let html = r#"<body>
            <nav><a href="/one">One</a></nav>
            <footer><a href="/two">Two</a></footer>
        </body>"#;
        assert_eq!(
            extractor.parse(html, &base_url()).links,
            vec!["https://example.com/one"]
        );
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(
            PageExtractor::new("a[[", "body"),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_malformed_html_is_tolerated() {
        let parsed = parse("<html><body><div><a href='/x'>unclosed");
        assert_eq!(parsed.links, vec!["https://example.com/x"]);
        assert_eq!(parsed.content, "unclosed");
    }
}
