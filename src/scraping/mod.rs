//! Single-page scraping
//!
//! Turns one URL into a structured, sectioned view of the page. Static markup
//! is fetched first; pages that look script-driven are re-rendered in a
//! headless browser that scrolls and follows a couple of links before the
//! markup is captured.
//!
//! Key components:
//! - `FetchEngine`: bounded static HTTP fetch
//! - `needs_js_rendering`: cheap static-vs-rendered decision
//! - `ChromiumRenderer`: interactive exploration in headless Chromium
//! - `ContentExtractor`: metadata and heading-based segmentation
//! - `ScrapePipeline`: orchestrates the above into a `ScrapeResult`

pub mod extractor;
pub mod fetcher;
pub mod heuristics;
pub mod pipeline;
pub mod render;

pub use extractor::ContentExtractor;
pub use fetcher::{FetchEngine, FetchError, PageFetcher};
pub use heuristics::needs_js_rendering;
pub use pipeline::{PipelineError, ScrapePipeline};
pub use render::{ChromiumRenderer, NoopRenderer, PageRenderer, RenderError, RenderOutput};
