//! Static fetch configuration

use serde::{Deserialize, Serialize};

use super::DEFAULT_USER_AGENT;

/// Static page fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout for the static fetch (seconds)
    pub request_timeout_secs: u64,
    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,
    /// Maximum response size (bytes)
    pub max_content_size: usize,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Launch a headless browser when the page looks script-rendered
    pub enable_js_rendering: bool,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
            max_content_size: 10 * 1024 * 1024, // 10 MB
            max_redirects: 10,
            enable_js_rendering: true,
        }
    }
}
