//! Core types for the scrape result
//!
//! Everything here serializes to the JSON shape returned by the HTTP API
//! (camelCase field names, `null` for absent optionals).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Page metadata
// ============================================================================

/// Best-effort page metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub title: String,
    pub description: String,
    pub language: String,
    /// Always `None` for now; see `ContentExtractor::extract_meta`
    pub canonical: Option<String>,
}

// ============================================================================
// Sections
// ============================================================================

/// Semantic type assigned to a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Hero,
    Footer,
    News,
    About,
    Services,
    Team,
    Testimonials,
    Faq,
    Info,
    /// Synthetic whole-page section emitted when a page has no headings
    Section,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Footer => "footer",
            Self::News => "news",
            Self::About => "about",
            Self::Services => "services",
            Self::Team => "team",
            Self::Testimonials => "testimonials",
            Self::Faq => "faq",
            Self::Info => "info",
            Self::Section => "section",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hyperlink found inside a section. `href` is always absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// An image found inside a section. `src` is always absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
}

/// Collected content of a section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionContent {
    pub headings: Vec<String>,
    pub text: String,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    /// One entry per `<ul>`/`<ol>`: the text of its items
    pub lists: Vec<Vec<String>>,
    /// One entry per `<table>`: rows of cell text
    pub tables: Vec<Vec<Vec<String>>>,
}

/// A heading-delimited region of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub label: String,
    pub source_url: String,
    pub content: SectionContent,
    pub raw_html: String,
    pub truncated: bool,
}

// ============================================================================
// Interaction trace
// ============================================================================

/// A click performed during interactive exploration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Click {
    /// Best-effort CSS selector, not guaranteed unique
    pub selector: String,
    pub description: String,
}

/// Trace of what the interactive renderer did on the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interactions {
    pub clicks: Vec<Click>,
    pub scrolls: u32,
    /// Visited page URLs in first-seen order, without duplicates or `about:` entries
    pub pages: Vec<String>,
}

impl Interactions {
    /// Append a page URL unless it is empty, an `about:` placeholder, or already present.
    ///
    /// Returns true if the URL was added.
    pub fn record_page(&mut self, url: &str) -> bool {
        if url.is_empty() || url.starts_with("about:") {
            return false;
        }
        if self.pages.iter().any(|p| p == url) {
            return false;
        }
        self.pages.push(url.to_string());
        true
    }
}

// ============================================================================
// Result
// ============================================================================

/// A sub-stage failure that did not abort the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorItem {
    pub message: String,
    pub phase: String,
}

impl ErrorItem {
    pub fn new(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: phase.into(),
        }
    }
}

/// Full structured result for one scraped URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub url: String,
    /// ISO-8601 UTC instant with a trailing `Z`
    pub scraped_at: String,
    pub meta: Meta,
    pub sections: Vec<Section>,
    pub interactions: Interactions,
    pub errors: Vec<ErrorItem>,
}

/// Format a timestamp the way `scrapedAt` is reported
pub fn format_scraped_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_page_skips_about_and_duplicates() {
        let mut interactions = Interactions::default();
        assert!(!interactions.record_page("about:blank"));
        assert!(interactions.record_page("https://example.com/"));
        assert!(!interactions.record_page("https://example.com/"));
        assert!(!interactions.record_page(""));
        assert!(interactions.record_page("https://example.com/a"));
        assert_eq!(
            interactions.pages,
            vec!["https://example.com/", "https://example.com/a"]
        );
    }

    #[test]
    fn test_scraped_at_has_trailing_z() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(format_scraped_at(at), "2024-03-01T12:30:00.000000Z");
    }

    #[test]
    fn test_section_serializes_camel_case() {
        let section = Section {
            id: "hero-0".to_string(),
            section_type: SectionType::Hero,
            label: "Welcome".to_string(),
            source_url: "https://e.com".to_string(),
            content: SectionContent::default(),
            raw_html: "<h1>Welcome</h1>".to_string(),
            truncated: false,
        };

        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["type"], "hero");
        assert_eq!(json["sourceUrl"], "https://e.com");
        assert_eq!(json["rawHtml"], "<h1>Welcome</h1>");
        assert!(json["content"]["links"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_meta_canonical_serializes_as_null() {
        let json = serde_json::to_value(Meta::default()).unwrap();
        assert!(json["canonical"].is_null());
        assert_eq!(json["title"], "");
    }
}
