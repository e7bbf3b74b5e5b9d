//! pagesift: structured single-page extraction
//!
//! Turns a URL into a sectioned, typed view of the page:
//! - Static fetch with a cheap "does this need a browser?" heuristic
//! - Bounded headless exploration (scroll, click, recover) via chromiumoxide
//! - Heading-driven segmentation with keyword classification
//! - JSON HTTP API (axum) and a CLI

pub mod api;
pub mod config;
pub mod scraping;
pub mod types;
pub mod util;

pub use config::Config;
pub use types::*;
