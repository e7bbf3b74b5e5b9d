//! Headless exploration configuration

use serde::{Deserialize, Serialize};

/// Interactive renderer configuration
///
/// All durations are milliseconds. Every wait is bounded by one of these and
/// a timeout only degrades the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Number of scroll iterations after the initial navigation
    pub scrolls: u32,
    /// Vertical distance per scroll (pixels)
    pub scroll_delta: i64,
    /// Pause after each scroll
    pub scroll_settle_ms: u64,
    /// Timeout for every navigation and load-state wait
    pub navigation_timeout_ms: u64,
    /// Upper bound on click attempts
    pub max_click_attempts: u32,
    /// Timeout for scrolling a link into view before clicking
    pub scroll_into_view_timeout_ms: u64,
    /// Timeout for the click itself
    pub click_timeout_ms: u64,
    /// How long to watch for a popup after a click
    pub popup_timeout_ms: u64,
    /// Pause after an in-place click
    pub click_settle_ms: u64,
    /// Pause after a recovery navigation
    pub recovery_settle_ms: u64,
    /// Maximum characters of link text kept in a click description
    pub description_max_chars: usize,
    /// Stop exploring once this many pages are recorded...
    pub target_pages: usize,
    /// ...and at least this many clicks
    pub target_clicks: usize,
    /// Extra command-line arguments for the browser process
    pub browser_args: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scrolls: 3,
            scroll_delta: 2000,
            scroll_settle_ms: 1500,
            navigation_timeout_ms: 15_000,
            max_click_attempts: 2,
            scroll_into_view_timeout_ms: 2000,
            click_timeout_ms: 4000,
            popup_timeout_ms: 1200,
            click_settle_ms: 800,
            recovery_settle_ms: 600,
            description_max_chars: 80,
            target_pages: 3,
            target_clicks: 1,
            browser_args: vec![
                "--disable-gpu".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--no-first-run".to_string(),
            ],
        }
    }
}
