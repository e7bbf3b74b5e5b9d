//! Text extraction and normalization

use scraper::{ElementRef, Html};

use crate::util::collapse_whitespace;

/// Whitespace-collapsed text of an element and all its descendants
pub(super) fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Like `element_text`, but text nodes are space-separated.
///
/// Used for list items and table cells, where nested blocks would otherwise
/// run together.
pub(super) fn spaced_text(element: &ElementRef) -> String {
    let pieces: Vec<&str> = element
        .text()
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect();

    collapse_whitespace(&pieces.join(" "))
}

/// Every text node in the document, trimmed and space-joined.
///
/// Includes head text such as `<title>`; callers strip noise elements first.
pub(super) fn document_text(document: &Html) -> String {
    let pieces: Vec<&str> = document
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect();

    collapse_whitespace(&pieces.join(" "))
}
