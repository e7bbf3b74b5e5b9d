//! Heading-driven segmentation
//!
//! Walks the body in document order. Every h1–h3 closes the open section and
//! opens a new one; everything in between feeds the open section. A page with
//! no such heading collapses into a single "Main Content" section.

use ego_tree::iter::Edge;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Node};
use url::Url;

use super::classify::classify_heading;
use super::text::{document_text, element_text, spaced_text};
use super::{ContentExtractor, MAX_FALLBACK_CHARS, MAX_SECTION_HTML};
use crate::types::{Image, Link, Section, SectionContent, SectionType};
use crate::util::truncate_chars;

const UNTITLED_LABEL: &str = "Untitled Section";
const FALLBACK_LABEL: &str = "Main Content";

/// Accumulator for the section currently being filled
struct SectionBuilder {
    id: String,
    section_type: SectionType,
    label: String,
    raw_html: String,
    truncated: bool,
    headings: Vec<String>,
    text: Vec<String>,
    links: Vec<Link>,
    images: Vec<Image>,
    lists: Vec<Vec<String>>,
    tables: Vec<Vec<Vec<String>>>,
}

impl SectionBuilder {
    fn open(heading: &ElementRef, level: u8, heading_index: usize) -> Self {
        let text = element_text(heading);
        let section_type = classify_heading(heading_index, level, &text);
        let label = if text.is_empty() {
            UNTITLED_LABEL.to_string()
        } else {
            text
        };

        let parent_html = heading
            .parent()
            .and_then(ElementRef::wrap)
            .map(|parent| parent.html())
            .unwrap_or_else(|| heading.html());
        let (raw_html, truncated) = truncate_chars(&parent_html, MAX_SECTION_HTML);

        Self {
            id: format!("{}-{}", section_type, heading_index),
            section_type,
            headings: vec![label.clone()],
            label,
            raw_html,
            truncated,
            text: Vec::new(),
            links: Vec::new(),
            images: Vec::new(),
            lists: Vec::new(),
            tables: Vec::new(),
        }
    }

    fn finish(self, source_url: &str) -> Section {
        Section {
            id: self.id,
            section_type: self.section_type,
            label: self.label,
            source_url: source_url.to_string(),
            content: SectionContent {
                headings: self.headings,
                text: self.text.join(" "),
                links: self.links,
                images: self.images,
                lists: self.lists,
                tables: self.tables,
            },
            raw_html: self.raw_html,
            truncated: self.truncated,
        }
    }
}

/// Level of an h1–h3 element, the only ones that open sections
fn section_heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        _ => None,
    }
}

/// Resolve an attribute value against the base URL.
///
/// Empty values and anything `Url::join` rejects are treated as absent.
fn resolve(base: Option<&Url>, value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    base?.join(value).ok().map(|url| url.to_string())
}

/// Nearest enclosing `<table>` of a row
fn owning_table(row: &ElementRef) -> Option<NodeId> {
    row.ancestors()
        .find(|node| node.value().as_element().is_some_and(|el| el.name() == "table"))
        .map(|node| node.id())
}

impl ContentExtractor {
    /// Segment an already noise-stripped document.
    pub(super) fn segment_document(&self, document: &Html, base_url: &str) -> Vec<Section> {
        let body = self
            .body_selector
            .as_ref()
            .and_then(|selector| document.select(selector).next());

        let sections = match body {
            Some(body) => self.collect_sections(&body, base_url),
            None => Vec::new(),
        };

        if sections.is_empty() {
            return vec![Self::fallback_section(document, base_url)];
        }
        sections
    }

    fn collect_sections(&self, body: &ElementRef, base_url: &str) -> Vec<Section> {
        let base = Url::parse(base_url).ok();
        let mut sections = Vec::new();
        let mut current: Option<SectionBuilder> = None;
        let mut heading_index = 0usize;
        // Text inside the opening heading is its label, not section text
        let mut open_heading: Option<NodeId> = None;

        for edge in body.traverse() {
            let node = match edge {
                Edge::Open(node) => node,
                Edge::Close(node) => {
                    if open_heading == Some(node.id()) {
                        open_heading = None;
                    }
                    continue;
                }
            };

            match node.value() {
                Node::Element(el) => {
                    let Some(element) = ElementRef::wrap(node) else {
                        continue;
                    };

                    if let Some(level) = section_heading_level(el.name()) {
                        if let Some(done) = current.take() {
                            sections.push(done.finish(base_url));
                        }
                        current = Some(SectionBuilder::open(&element, level, heading_index));
                        open_heading = Some(node.id());
                        heading_index += 1;
                        continue;
                    }

                    if let Some(section) = current.as_mut() {
                        self.collect_element(section, &element, base.as_ref());
                    }
                }
                Node::Text(text) => {
                    if open_heading.is_some() {
                        continue;
                    }
                    if let Some(section) = current.as_mut() {
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            section.text.push(trimmed.to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(done) = current.take() {
            sections.push(done.finish(base_url));
        }

        sections
    }

    /// Contribute one non-boundary element to the open section
    fn collect_element(&self, section: &mut SectionBuilder, element: &ElementRef, base: Option<&Url>) {
        let el = element.value();
        match el.name() {
            "a" => {
                if let Some(href) = resolve(base, el.attr("href")) {
                    section.links.push(Link {
                        text: element_text(element),
                        href,
                    });
                }
            }
            "img" => {
                if let Some(src) = resolve(base, el.attr("src")) {
                    section.images.push(Image {
                        src,
                        alt: el.attr("alt").unwrap_or_default().trim().to_string(),
                    });
                }
            }
            "h4" | "h5" | "h6" => {
                let text = element_text(element);
                if !text.is_empty() {
                    section.headings.push(text);
                }
            }
            "ul" | "ol" => {
                let items: Vec<String> = element
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|child| child.value().name() == "li")
                    .map(|li| spaced_text(&li))
                    .filter(|item| !item.is_empty())
                    .collect();
                if !items.is_empty() {
                    section.lists.push(items);
                }
            }
            "table" => {
                let Some(row_selector) = &self.row_selector else {
                    return;
                };
                // Rows of nested tables belong to those tables
                let rows: Vec<Vec<String>> = element
                    .select(row_selector)
                    .filter(|row| owning_table(row) == Some(element.id()))
                    .map(|row| {
                        row.children()
                            .filter_map(ElementRef::wrap)
                            .filter(|cell| matches!(cell.value().name(), "th" | "td"))
                            .map(|cell| spaced_text(&cell))
                            .collect::<Vec<_>>()
                    })
                    .filter(|cells| !cells.is_empty())
                    .collect();
                if !rows.is_empty() {
                    section.tables.push(rows);
                }
            }
            _ => {}
        }
    }

    /// Single whole-page section used when the body has no h1–h3
    fn fallback_section(document: &Html, base_url: &str) -> Section {
        let (text, _) = truncate_chars(&document_text(document), MAX_FALLBACK_CHARS);
        let (raw_html, _) = truncate_chars(&document.html(), MAX_FALLBACK_CHARS);

        Section {
            id: format!("{}-0", SectionType::Section),
            section_type: SectionType::Section,
            label: FALLBACK_LABEL.to_string(),
            source_url: base_url.to_string(),
            content: SectionContent {
                text,
                ..Default::default()
            },
            raw_html,
            truncated: true,
        }
    }
}
