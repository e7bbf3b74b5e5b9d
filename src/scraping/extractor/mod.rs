//! Structured content extraction from HTML
//!
//! - Strips script/style/noscript noise before anything else looks at the tree
//! - Parses page metadata (title, description, language)
//! - Segments the body into typed sections at h1–h3 boundaries

mod classify;
mod metadata;
mod sections;
mod text;

pub use classify::classify_heading;

use scraper::{Html, Selector};

use crate::types::{Meta, Section};

/// Maximum characters of parent markup kept per heading section
pub const MAX_SECTION_HTML: usize = 3000;

/// Maximum characters of text and markup kept in the no-heading fallback section
pub const MAX_FALLBACK_CHARS: usize = 2000;

/// Elements whose subtrees never contribute text, links or markup
const NOISE_TAGS: &[&str] = &["script", "style", "noscript"];

/// Content extractor
///
/// Holds pre-compiled selectors; cheap to share and reuse across pages.
pub struct ContentExtractor {
    pub(crate) body_selector: Option<Selector>,
    pub(crate) title_selector: Option<Selector>,
    pub(crate) description_selector: Option<Selector>,
    pub(crate) html_selector: Option<Selector>,
    pub(crate) row_selector: Option<Selector>,
}

impl ContentExtractor {
    /// Create a new content extractor
    pub fn new() -> Self {
        Self {
            body_selector: Selector::parse("body").ok(),
            title_selector: Selector::parse("title").ok(),
            description_selector: Selector::parse("meta[name=\"description\"]").ok(),
            html_selector: Selector::parse("html").ok(),
            row_selector: Selector::parse("tr").ok(),
        }
    }

    /// Parse markup once and produce both metadata and sections.
    ///
    /// Noise elements are removed before either pass runs.
    pub fn analyze(&self, html: &str, base_url: &str) -> (Meta, Vec<Section>) {
        let mut document = Html::parse_document(html);
        self.strip_noise(&mut document);

        let meta = self.extract_meta(&document);
        let sections = self.segment_document(&document, base_url);
        (meta, sections)
    }

    /// Segment raw markup into sections.
    pub fn segment(&self, html: &str, base_url: &str) -> Vec<Section> {
        let mut document = Html::parse_document(html);
        self.strip_noise(&mut document);
        self.segment_document(&document, base_url)
    }

    /// Detach every script, style and noscript subtree from the document.
    pub fn strip_noise(&self, document: &mut Html) {
        let ids: Vec<_> = document
            .tree
            .nodes()
            .filter(|node| {
                node.value()
                    .as_element()
                    .is_some_and(|el| NOISE_TAGS.contains(&el.name()))
            })
            .map(|node| node.id())
            .collect();

        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}
