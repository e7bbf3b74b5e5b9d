//! Keyword-based section classification

use crate::types::SectionType;

/// Keyword groups in priority order; the first group with a hit wins
const KEYWORD_RULES: &[(SectionType, &[&str])] = &[
    (SectionType::Footer, &["footer", "contact", "copyright"]),
    (SectionType::News, &["news", "blog", "article", "post"]),
    (SectionType::About, &["about", "who we are", "our story"]),
    (SectionType::Services, &["service", "what we do", "offer"]),
    (SectionType::Team, &["team", "our team", "people"]),
    (SectionType::Testimonials, &["testimonial", "review", "feedback"]),
    (SectionType::Faq, &["faq", "question", "help"]),
];

/// Classify a heading.
///
/// `heading_index` counts h1–h3 headings seen so far (0-based) and `level` is
/// the heading level. The first heading and every h1 are always `Hero`.
pub fn classify_heading(heading_index: usize, level: u8, label: &str) -> SectionType {
    if heading_index == 0 || level == 1 {
        return SectionType::Hero;
    }

    let label = label.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| label.contains(k)))
        .map(|(section_type, _)| *section_type)
        .unwrap_or(SectionType::Info)
}
