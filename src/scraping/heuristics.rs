//! Rendering-mode heuristic
//!
//! Decides from raw markup whether a page probably needs script execution to
//! show its real content. The answer is advisory: callers must fall back to
//! the static markup when rendering fails.

/// Substrings (matched against lower-cased markup) that indicate a
/// client-rendered application shell
const JS_SIGNALS: &[&str] = &[
    "react",
    "vue",
    "angular",
    "__next_data__", // Next.js hydration payload
    "id=\"root\"",   // React mount point
    "id=\"__next\"", // Next.js mount point
];

/// Pages with fewer alphanumeric characters than this are treated as empty shells
const MIN_ALNUM_CHARS: usize = 200;

/// Check if markup needs JavaScript rendering.
///
/// The alphanumeric count runs over the whole raw markup, tag names and
/// attributes included.
pub fn needs_js_rendering(html: &str) -> bool {
    let lower = html.to_lowercase();

    if JS_SIGNALS.iter().any(|signal| lower.contains(signal)) {
        return true;
    }

    alnum_count(&lower) < MIN_ALNUM_CHARS
}

/// Count letters and digits, stopping early once the threshold is reached
fn alnum_count(html: &str) -> usize {
    html.chars()
        .filter(|c| c.is_alphanumeric())
        .take(MIN_ALNUM_CHARS)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_static_page() -> String {
        let paragraph = "<p>This paragraph carries plenty of ordinary server rendered text.</p>";
        format!(
            "<html><head><title>Plain</title></head><body>{}</body></html>",
            paragraph.repeat(10)
        )
    }

    #[test]
    fn test_static_page_does_not_need_js() {
        assert!(!needs_js_rendering(&long_static_page()));
    }

    #[test]
    fn test_root_mount_any_case() {
        assert!(needs_js_rendering(r#"<div ID="ROOT"></div>"#));

        let mut html = long_static_page();
        html.push_str(r#"<div id="root"></div>"#);
        assert!(needs_js_rendering(&html));
    }

    #[test]
    fn test_framework_markers() {
        let base = long_static_page();
        for marker in [
            "<script src=\"/react-dom.js\"></script>",
            "<div data-v-app>Vue</div>",
            "<app-root ng-version=\"17\">Angular</app-root>",
            "<script id=\"__NEXT_DATA__\" type=\"application/json\">{}</script>",
            "<div id=\"__next\"></div>",
        ] {
            let html = format!("{}{}", base, marker);
            assert!(needs_js_rendering(&html), "marker not detected: {}", marker);
        }
    }

    #[test]
    fn test_sparse_markup_needs_js() {
        assert!(needs_js_rendering("<html><body><p>Loading</p></body></html>"));
        assert!(needs_js_rendering(""));
    }

    #[test]
    fn test_threshold_boundary() {
        // Exactly 200 alphanumerics is enough; 199 is not.
        assert!(!needs_js_rendering(&"a".repeat(200)));
        assert!(needs_js_rendering(&"a".repeat(199)));
        // Punctuation and whitespace never count.
        assert!(needs_js_rendering(&"a -".repeat(199)));
    }

    #[test]
    fn test_count_includes_markup_itself() {
        // No visible text, but long attribute values push the count over.
        let attrs = "x".repeat(250);
        let html = format!("<div class=\"{}\"></div>", attrs);
        assert!(!needs_js_rendering(&html));
    }
}
