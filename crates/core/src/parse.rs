//! HTML parsing and element access.
//!
//! This module provides the [`Document`] and [`Element`] types the rest of
//! the pipeline works against. The one non-obvious piece is
//! [`Element::visible_text`]: complexity scoring and content location must
//! measure what a reader actually sees, so chrome subtrees (script, style,
//! nav, header, footer, aside) are skipped during text collection rather
//! than counted.
//!
//! # Example
//!
//! ```rust
//! use claritas_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <article><p>Readable text.</p><nav>Skip me</nav></article>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let article = &doc.select("article").unwrap()[0];
//! assert!(!article.visible_text().contains("Skip me"));
//! ```

use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};

use crate::{ClaritasError, Result};

/// Tags whose subtrees never count as readable content.
const CHROME_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides CSS-selector queries plus a
/// document-order element walk used by the content locator.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use claritas_core::parse::Document;
    ///
    /// let doc = Document::parse("<html><body><p>Hello</p></body></html>").unwrap();
    /// assert!(doc.text_content().contains("Hello"));
    /// ```
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ClaritasError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = Selector::parse(selector)
            .map_err(|e| ClaritasError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        Ok(self.html.select(&sel).map(Element::new).collect())
    }

    /// Walks every element in document order.
    ///
    /// The locator relies on this ordering for its first-candidate-wins
    /// tie-break, which selector queries alone cannot provide once several
    /// selector lists are merged.
    pub fn elements(&'_ self) -> Vec<Element<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(scraper::ElementRef::wrap)
            .map(Element::new)
            .collect()
    }

    /// Gets the title of the document, if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    /// Gets all text content from the document root.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// A wrapper around scraper's ElementRef.
///
/// Element represents a single node in the parsed tree and provides the
/// attribute, text, and structural queries the scoring code needs.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub(crate) fn new(element: scraper::ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Stable identity of the underlying node within its document.
    pub fn node_id(&self) -> ego_tree::NodeId {
        self.element.id()
    }

    /// Gets the inner HTML of this element.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Gets the outer HTML of this element, including its own tags.
    ///
    /// This is the serialization the snapshot/restore cycle round-trips:
    /// callers must treat the returned string as the byte-exact original.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the raw text content of this element, chrome included.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the readable text of this element.
    ///
    /// Skips script/style/nav/header/footer/aside subtrees and any subtree
    /// whose class or id marks it as a sidebar, menu, or ad, then trims.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        collect_visible_text(*self.element, &mut out);
        out.trim().to_string()
    }

    /// Character length of the readable text.
    pub fn visible_text_len(&self) -> usize {
        self.visible_text().chars().count()
    }

    /// Gets the value of an attribute, or `None` if absent.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Gets the class attribute lowercased, or an empty string.
    pub fn class_attr(&self) -> String {
        self.attr("class").unwrap_or_default().to_lowercase()
    }

    /// Gets the id attribute lowercased, or an empty string.
    pub fn id_attr(&self) -> String {
        self.attr("id").unwrap_or_default().to_lowercase()
    }

    /// Gets the parent element, if any.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element
            .parent()
            .and_then(scraper::ElementRef::wrap)
            .map(Element::new)
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ClaritasError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = Selector::parse(selector)
            .map_err(|e| ClaritasError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        Ok(self.element.select(&sel).map(Element::new).collect())
    }

    /// Counts descendant elements matching a selector.
    pub fn count(&self, selector: &str) -> usize {
        self.select(selector).map(|v| v.len()).unwrap_or(0)
    }
}

fn is_chrome_element(el: &scraper::node::Element) -> bool {
    if CHROME_TAGS.contains(&el.name()) {
        return true;
    }
    let marker = |s: &str| {
        let s = s.to_lowercase();
        s.contains("sidebar") || s.contains("menu") || s.split(&['-', '_', ' '][..]).any(|p| p == "ad")
    };
    el.attr("class").is_some_and(marker) || el.attr("id").is_some_and(marker)
}

fn collect_visible_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => {
                if !is_chrome_element(el) {
                    collect_visible_text(child, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page</title>
        </head>
        <body>
            <h1>Heading</h1>
            <article id="story">
                <p class="content">Paragraph 1</p>
                <p class="content">Paragraph 2</p>
                <nav>Table of contents</nav>
                <div class="sidebar">Related stories</div>
                <a href="https://example.com">Link</a>
            </article>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        assert_eq!(doc.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
        assert_eq!(elements[1].text(), "Paragraph 2");
    }

    #[test]
    fn test_visible_text_skips_chrome() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let article = &doc.select("article").unwrap()[0];
        let visible = article.visible_text();

        assert!(visible.contains("Paragraph 1"));
        assert!(!visible.contains("Table of contents"));
        assert!(!visible.contains("Related stories"));
        // raw text keeps everything
        assert!(article.text().contains("Table of contents"));
    }

    #[test]
    fn test_element_attributes() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let article = &doc.select("article").unwrap()[0];

        assert_eq!(article.id_attr(), "story");
        assert_eq!(article.tag_name(), "article");
        assert_eq!(article.count("p"), 2);
        assert_eq!(article.count("a"), 1);
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(ClaritasError::HtmlParseError(_))));
    }

    #[test]
    fn test_elements_in_document_order() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let tags: Vec<String> = doc
            .elements()
            .iter()
            .map(|e| e.tag_name())
            .filter(|t| t == "h1" || t == "article")
            .collect();

        assert_eq!(tags, vec!["h1".to_string(), "article".to_string()]);
    }

    #[test]
    fn test_ad_marker_is_word_matched() {
        let html = r#"<div class="ad-break">x</div><div class="advanced-reading">y</div>"#;
        let doc = Document::parse(html).unwrap();
        let divs = doc.select("div").unwrap();
        let body = doc.select("body").unwrap();

        assert_eq!(divs.len(), 2);
        let visible = body[0].visible_text();
        assert!(!visible.contains('x'));
        assert!(visible.contains('y'));
    }
}
