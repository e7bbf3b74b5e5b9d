//! Metadata extraction: title, description, language

use scraper::Html;

use super::ContentExtractor;
use crate::types::Meta;

impl ContentExtractor {
    /// Extract page metadata from a parsed document.
    ///
    /// Every field is best-effort and defaults to empty. `canonical` is
    /// deliberately left unset; `<link rel="canonical">` is not consulted.
    pub fn extract_meta(&self, document: &Html) -> Meta {
        Meta {
            title: self.extract_title(document).unwrap_or_default(),
            description: self.extract_description(document).unwrap_or_default(),
            language: self.extract_language(document).unwrap_or_default(),
            canonical: None,
        }
    }

    /// Text of the `<title>` element, if present and non-empty
    pub(super) fn extract_title(&self, document: &Html) -> Option<String> {
        let selector = self.title_selector.as_ref()?;
        let title_elem = document.select(selector).next()?;
        let title = title_elem.text().collect::<String>().trim().to_string();
        (!title.is_empty()).then_some(title)
    }

    /// `content` of `<meta name="description">`
    pub(super) fn extract_description(&self, document: &Html) -> Option<String> {
        let selector = self.description_selector.as_ref()?;
        let elem = document.select(selector).next()?;
        let content = elem.value().attr("content")?.trim();
        (!content.is_empty()).then(|| content.to_string())
    }

    /// `lang` attribute of the root `<html>` element
    pub(super) fn extract_language(&self, document: &Html) -> Option<String> {
        let selector = self.html_selector.as_ref()?;
        let html_elem = document.select(selector).next()?;
        html_elem.value().attr("lang").map(|lang| lang.to_string())
    }
}
