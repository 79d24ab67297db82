//! Rebuilding structured content from rewritten flat text.
//!
//! The rewrite engine hands back flat text; this module parses it into
//! [`Section`]s, renders a fresh region, and re-splices the interactive
//! elements (links, buttons, forms, media) that were captured from the
//! original region before the swap. Splicing is a best-effort
//! reconciliation pass over ~50-character text contexts: an element whose
//! context no longer appears in the rewritten text is dropped (logged, not
//! an error), except forms, which are always appended at the end.
//!
//! The original region is captured as a byte-exact [`RegionSnapshot`]
//! before the first mutation; restoring it reproduces the original
//! serialization exactly. The swap itself is atomic here — the staged
//! dim/swap/restore transition is a rendering concern for visual hosts.

use serde::Serialize;
use tracing::debug;

use crate::parse::Element;

/// One structural unit parsed from rewritten flat text.
///
/// Created per simplification pass and discarded after the region is
/// rebuilt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "content")]
pub enum Section {
    Heading(String),
    List(Vec<String>),
    Important(String),
    Paragraph(String),
}

/// What kind of interactive element was preserved, with what it needs to
/// be rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub enum PreservedKind {
    Link { href: String, title: Option<String>, target: Option<String> },
    Button { label: String },
    Form { action: Option<String>, method: Option<String>, inner_html: String },
    Media { tag: String, src: Option<String>, alt: Option<String> },
}

/// An interactive element captured from the original region, with the
/// surrounding text used to find its place in the rewritten content.
#[derive(Debug, Clone, PartialEq)]
pub struct PreservedElement {
    pub kind: PreservedKind,
    /// The element's own text (empty for media).
    pub text: String,
    /// Up to 50 characters of text preceding the element.
    pub context_before: String,
    /// Up to 50 characters of text following the element.
    pub context_after: String,
}

/// Byte-exact serialization of the region before any mutation.
///
/// The snapshot is never modified; [`RegionSnapshot::html`] returns the
/// original bytes for the whole simplify/restore cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSnapshot {
    html: String,
}

impl RegionSnapshot {
    /// Captures the region's current serialization.
    pub fn capture(element: &Element<'_>) -> Self {
        Self { html: element.outer_html() }
    }

    /// The original serialization, byte for byte.
    pub fn html(&self) -> &str {
        &self.html
    }
}

/// The rebuilt region.
#[derive(Debug, Clone)]
pub struct ReconstructedRegion {
    pub html: String,
    pub sections: Vec<Section>,
}

/// Parses rewritten flat text into sections.
///
/// Rules, applied per trimmed non-blank line in order: `## ` prefix makes
/// a heading; a bullet prefix (`• ` or `- `) accumulates into the open
/// list, which any other line closes; a line mentioning
/// important/note/warning becomes an Important callout; everything else
/// is a paragraph.
pub fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut open_list: Option<Vec<String>> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(heading) = line.strip_prefix("## ") {
            if let Some(items) = open_list.take() {
                sections.push(Section::List(items));
            }
            sections.push(Section::Heading(heading.trim().to_string()));
            continue;
        }

        if let Some(item) = line.strip_prefix("• ").or_else(|| line.strip_prefix("- ")) {
            open_list.get_or_insert_with(Vec::new).push(item.trim().to_string());
            continue;
        }

        if let Some(items) = open_list.take() {
            sections.push(Section::List(items));
        }

        let lower = line.to_lowercase();
        if lower.contains("important") || lower.contains("note") || lower.contains("warning") {
            sections.push(Section::Important(line.to_string()));
        } else {
            sections.push(Section::Paragraph(line.to_string()));
        }
    }

    if let Some(items) = open_list.take() {
        sections.push(Section::List(items));
    }

    sections
}

/// Captures the interactive elements of a region ahead of the swap.
pub fn collect_preserved(region: &Element<'_>) -> Vec<PreservedElement> {
    let region_text = region.visible_text();
    let mut preserved = Vec::new();

    let context_for = |own_text: &str, fallback: Option<&Element<'_>>| -> (String, String) {
        let trimmed = own_text.trim();
        if !trimmed.is_empty()
            && let Some(at) = region_text.find(trimmed)
        {
            let before: String = region_text[..at]
                .chars()
                .rev()
                .take(50)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            let after: String = region_text[at + trimmed.len()..].chars().take(50).collect();
            return (before.trim().to_string(), after.trim().to_string());
        }
        // No own text to anchor on: fall back to the parent's text.
        let parent_text = fallback
            .and_then(|el| el.parent())
            .map(|p| p.visible_text())
            .unwrap_or_default();
        (parent_text.chars().take(50).collect::<String>().trim().to_string(), String::new())
    };

    for link in region.select("a[href]").unwrap_or_default() {
        let text = link.text().trim().to_string();
        let (context_before, context_after) = context_for(&text, Some(&link));
        preserved.push(PreservedElement {
            kind: PreservedKind::Link {
                href: link.attr("href").unwrap_or_default().to_string(),
                title: link.attr("title").map(str::to_string),
                target: link.attr("target").map(str::to_string),
            },
            text,
            context_before,
            context_after,
        });
    }

    for button in region
        .select("button, input[type=\"button\"], input[type=\"submit\"]")
        .unwrap_or_default()
    {
        let label = if button.tag_name() == "button" {
            button.text().trim().to_string()
        } else {
            button.attr("value").unwrap_or_default().to_string()
        };
        let (context_before, context_after) = context_for(&label, Some(&button));
        preserved.push(PreservedElement {
            kind: PreservedKind::Button { label: label.clone() },
            text: label,
            context_before,
            context_after,
        });
    }

    for form in region.select("form").unwrap_or_default() {
        let (context_before, context_after) = context_for("", Some(&form));
        preserved.push(PreservedElement {
            kind: PreservedKind::Form {
                action: form.attr("action").map(str::to_string),
                method: form.attr("method").map(str::to_string),
                inner_html: form.inner_html(),
            },
            text: String::new(),
            context_before,
            context_after,
        });
    }

    for media in region.select("img, video, audio, iframe").unwrap_or_default() {
        let (context_before, context_after) = context_for("", Some(&media));
        preserved.push(PreservedElement {
            kind: PreservedKind::Media {
                tag: media.tag_name(),
                src: media.attr("src").map(str::to_string),
                alt: media.attr("alt").map(str::to_string),
            },
            text: String::new(),
            context_before,
            context_after,
        });
    }

    preserved
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

struct RenderedBlock {
    html: String,
    text: String,
}

fn render_section(section: &Section) -> RenderedBlock {
    match section {
        Section::Heading(text) => RenderedBlock {
            html: format!("<h3 class=\"claritas-heading\">{}</h3>", escape_text(text)),
            text: text.clone(),
        },
        Section::List(items) => {
            let body: String = items
                .iter()
                .map(|item| format!("<li class=\"claritas-list-item\">{}</li>", escape_text(item)))
                .collect();
            RenderedBlock {
                html: format!("<ul class=\"claritas-list\">{}</ul>", body),
                text: items.join(" "),
            }
        }
        Section::Important(text) => RenderedBlock {
            html: format!("<div class=\"claritas-important\">{}</div>", escape_text(text)),
            text: text.clone(),
        },
        Section::Paragraph(text) => RenderedBlock {
            html: format!("<p class=\"claritas-paragraph\">{}</p>", escape_text(text)),
            text: text.clone(),
        },
    }
}

fn link_html(href: &str, title: Option<&str>, target: Option<&str>, text: &str) -> String {
    let mut attrs = format!(" href=\"{}\"", escape_attr(href));
    if let Some(title) = title {
        attrs.push_str(&format!(" title=\"{}\"", escape_attr(title)));
    }
    if let Some(target) = target {
        attrs.push_str(&format!(" target=\"{}\"", escape_attr(target)));
    }
    format!("<a{}>{}</a>", attrs, escape_text(text))
}

fn media_html(tag: &str, src: Option<&str>, alt: Option<&str>) -> String {
    let mut attrs = String::new();
    if let Some(src) = src {
        attrs.push_str(&format!(" src=\"{}\"", escape_attr(src)));
    }
    if let Some(alt) = alt {
        attrs.push_str(&format!(" alt=\"{}\"", escape_attr(alt)));
    }
    match tag {
        "img" => format!("<img{}>", attrs),
        other => format!("<{}{}></{}>", other, attrs, other),
    }
}

fn form_html(action: Option<&str>, method: Option<&str>, inner_html: &str) -> String {
    let mut attrs = String::new();
    if let Some(action) = action {
        attrs.push_str(&format!(" action=\"{}\"", escape_attr(action)));
    }
    if let Some(method) = method {
        attrs.push_str(&format!(" method=\"{}\"", escape_attr(method)));
    }
    format!("<form{}>{}</form>", attrs, inner_html)
}

/// Context prefix used when scanning for an element's new home.
fn context_needle(context: &str) -> Option<String> {
    let needle: String = context.chars().take(20).collect();
    let needle = needle.trim().to_string();
    if needle.is_empty() { None } else { Some(needle) }
}

/// Rebuilds the region from rewritten flat text, re-splicing preserved
/// interactive elements.
///
/// Links whose text survives the rewrite are wrapped back around their
/// first occurrence; media land after the block whose text matches their
/// captured context; forms are appended at the end regardless. Anything
/// that finds no match is dropped with a debug log — reconstruction never
/// fails over a lost element.
pub fn reconstruct(simplified_text: &str, preserved: &[PreservedElement]) -> ReconstructedRegion {
    let sections = parse_sections(simplified_text);
    let mut blocks: Vec<RenderedBlock> = sections.iter().map(render_section).collect();
    let mut trailing: Vec<String> = Vec::new();

    for element in preserved {
        match &element.kind {
            PreservedKind::Link { href, title, target } => {
                let needle = element.text.trim();
                let spliced = !needle.is_empty()
                    && blocks.iter_mut().any(|block| {
                        if !block.text.contains(needle) {
                            return false;
                        }
                        let escaped = escape_text(needle);
                        let anchor = link_html(href, title.as_deref(), target.as_deref(), needle);
                        block.html = block.html.replacen(&escaped, &anchor, 1);
                        true
                    });
                if !spliced {
                    debug!(href = href.as_str(), "dropping link with no matching text");
                }
            }
            PreservedKind::Button { label } => {
                // Buttons are captured for the restore cycle but have no
                // anchorable counterpart in text-only output.
                debug!(label = label.as_str(), "button not re-spliced into rewritten region");
            }
            PreservedKind::Media { tag, src, alt } => {
                let before = context_needle(&element.context_before);
                let after = context_needle(&element.context_after);
                let position = blocks.iter().position(|block| {
                    before.as_deref().is_some_and(|n| block.text.contains(n))
                        || after.as_deref().is_some_and(|n| block.text.contains(n))
                });
                match position {
                    Some(index) => {
                        let html = media_html(tag, src.as_deref(), alt.as_deref());
                        blocks.insert(index + 1, RenderedBlock { html, text: String::new() });
                    }
                    None => {
                        debug!(tag = tag.as_str(), "dropping media with no matching context");
                    }
                }
            }
            PreservedKind::Form { action, method, inner_html } => {
                trailing.push(form_html(action.as_deref(), method.as_deref(), inner_html));
            }
        }
    }

    let html = blocks
        .iter()
        .map(|b| b.html.as_str())
        .chain(trailing.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("\n");

    ReconstructedRegion { html, sections }
}
