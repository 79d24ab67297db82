//! Primary-content location.
//!
//! Finds the single element most likely to be "the article" in a parsed
//! document. Candidates come from a fixed list of semantic selectors plus
//! any block container with enough readable text; each candidate is scored
//! on text length, semantic tags, class/id keywords, paragraph density,
//! and link density. The highest score wins, first in document order on
//! ties, and a page where nothing scores positive is a hard
//! [`ClaritasError::NoContent`] failure — a simplify request must not
//! proceed without a region.
//!
//! Location is a pure read: nothing in the document is touched.

use std::collections::HashSet;

use crate::parse::{Document, Element};
use crate::{ClaritasError, Result};

/// Selectors that commonly mark the main content region across CMSes.
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    ".content",
    ".main-content",
    ".post-content",
    ".entry-content",
    "#content",
    "#main",
    ".mw-parser-output",
    ".markdown-body",
    ".post",
    ".article-body",
    ".story-body",
    ".entry",
    ".page-content",
    ".single-content",
];

/// Class/id fragments that suggest a content container.
const POSITIVE_KEYWORDS: &[&str] = &["content", "main", "article", "post", "entry", "body", "text"];

/// Class/id fragments that suggest navigation, chrome, or ads.
const NEGATIVE_KEYWORDS: &[&str] = &["nav", "sidebar", "menu", "header", "footer", "ad", "comment"];

/// Configuration for content location.
#[derive(Debug, Clone)]
pub struct LocateConfig {
    /// Candidates at or below this many readable characters are rejected.
    pub min_text_len: usize,
    /// Bonus for semantic tags (main/article) and `role="main"`.
    pub semantic_bonus: f64,
    /// Bonus per positive keyword hit in class or id.
    pub keyword_bonus: f64,
    /// Penalty per negative keyword hit in class or id.
    pub negative_penalty: f64,
    /// Link-density threshold above which the penalty kicks in.
    pub link_density_limit: f64,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            min_text_len: 200,
            semantic_bonus: 15.0,
            keyword_bonus: 5.0,
            negative_penalty: 10.0,
            link_density_limit: 5.0,
        }
    }
}

/// A located content region with its winning score.
#[derive(Debug, Clone)]
pub struct Located<'a> {
    pub element: Element<'a>,
    pub score: f64,
}

/// Scores one candidate element. Floor is 0; candidates with too little
/// readable text score 0 outright.
pub fn score_candidate(element: &Element<'_>, config: &LocateConfig) -> f64 {
    let text = element.visible_text();
    let text_len = text.chars().count();

    let mut score = if text_len > 1000 {
        10.0
    } else if text_len > 500 {
        5.0
    } else if text_len > config.min_text_len {
        2.0
    } else {
        return 0.0;
    };

    let tag = element.tag_name();
    if tag == "main" || tag == "article" {
        score += config.semantic_bonus;
    }
    if element.attr("role") == Some("main") {
        score += config.semantic_bonus;
    }

    let class = element.class_attr();
    let id = element.id_attr();
    for keyword in POSITIVE_KEYWORDS {
        if class.contains(keyword) {
            score += config.keyword_bonus;
        }
        if id.contains(keyword) {
            score += config.keyword_bonus;
        }
    }
    for keyword in NEGATIVE_KEYWORDS {
        if class.contains(keyword) || id.contains(keyword) {
            score -= config.negative_penalty;
        }
    }

    let paragraphs = element.count("p");
    if paragraphs > 3 {
        score += paragraphs as f64;
    }

    let links = element.count("a");
    let link_density = links as f64 / (text_len as f64 / 100.0).max(1.0);
    if link_density > config.link_density_limit {
        score -= link_density * 2.0;
    }

    score.max(0.0)
}

/// Locates the primary content region of a document.
///
/// # Errors
///
/// Returns [`ClaritasError::NoContent`] when no candidate scores above zero.
///
/// # Example
///
/// ```rust
/// use claritas_core::locate::{LocateConfig, locate_content};
/// use claritas_core::parse::Document;
///
/// let body = "Readable prose. ".repeat(40);
/// let html = format!("<html><body><article><p>{}</p></article></body></html>", body);
/// let doc = Document::parse(&html).unwrap();
///
/// let located = locate_content(&doc, &LocateConfig::default()).unwrap();
/// assert_eq!(located.element.tag_name(), "article");
/// ```
pub fn locate_content<'a>(doc: &'a Document, config: &LocateConfig) -> Result<Located<'a>> {
    let mut candidate_ids = HashSet::new();

    for selector in CONTENT_SELECTORS {
        for element in doc.select(selector)? {
            candidate_ids.insert(element.node_id());
        }
    }

    for element in doc.select("div, section, article")? {
        if element.visible_text_len() > config.min_text_len {
            candidate_ids.insert(element.node_id());
        }
    }

    // Walk in document order so equal scores resolve to the earliest node.
    let mut best: Option<Located<'a>> = None;
    for element in doc.elements() {
        if !candidate_ids.contains(&element.node_id()) {
            continue;
        }
        let score = score_candidate(&element, config);
        if score <= 0.0 {
            continue;
        }
        let better = match &best {
            Some(current) => score > current.score,
            None => true,
        };
        if better {
            best = Some(Located { element, score });
        }
    }

    best.ok_or(ClaritasError::NoContent)
}
