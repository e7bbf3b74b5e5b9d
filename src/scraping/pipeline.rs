//! Scrape pipeline: fetch → heuristic → optional render → extract → assemble

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::extractor::ContentExtractor;
use super::fetcher::{FetchConfig, FetchEngine, FetchError, PageFetcher};
use super::heuristics::needs_js_rendering;
use super::render::{ChromiumRenderer, NoopRenderer, PageRenderer};
use crate::config::Config;
use crate::types::{format_scraped_at, ErrorItem, Interactions, ScrapeResult};

/// Errors that abort a scrape
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to fetch page: {0}")]
    Fetch(#[from] FetchError),
    #[error("Extraction error: {0}")]
    Extraction(String),
}

/// Single-page scrape pipeline
///
/// Holds no per-request state; share it behind an `Arc` across requests.
pub struct ScrapePipeline {
    fetcher: Arc<dyn PageFetcher>,
    renderer: Arc<dyn PageRenderer>,
    extractor: Arc<ContentExtractor>,
}

impl ScrapePipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            fetcher,
            renderer,
            extractor: Arc::new(ContentExtractor::new()),
        }
    }

    /// Build the production pipeline: reqwest fetcher plus Chromium renderer,
    /// or `NoopRenderer` when JS rendering is disabled.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let fetcher = FetchEngine::new(FetchConfig::from(&config.scraping))?;
        let renderer: Arc<dyn PageRenderer> = if config.scraping.enable_js_rendering {
            Arc::new(ChromiumRenderer::new(config.render.clone()))
        } else {
            Arc::new(NoopRenderer)
        };
        Ok(Self::new(Arc::new(fetcher), renderer))
    }

    /// Scrape one page into a `ScrapeResult`.
    ///
    /// Only an invalid URL, a failed static fetch or a crashed extraction
    /// task are errors. A failed render falls back to the static markup and
    /// is reported in `errors`.
    pub async fn scrape(&self, url: &str) -> Result<ScrapeResult, PipelineError> {
        let started = Instant::now();
        let parsed = validate_url(url)?;

        let fetched = self.fetcher.fetch(&parsed).await?;
        debug!(
            "Fetched {} ({} bytes, {:?})",
            fetched.final_url,
            fetched.body.len(),
            fetched.fetch_duration
        );

        let mut html = fetched.body;
        let mut interactions = Interactions::default();
        let mut errors = Vec::new();

        if needs_js_rendering(&html) {
            debug!("{} looks script-driven, rendering", url);
            match self.renderer.render(url).await {
                Ok(output) => {
                    for record in output.failed_steps() {
                        let json = serde_json::to_string(record)
                            .unwrap_or_else(|_| record.status.to_string());
                        debug!("Render step for {} did not complete: {}", url, json);
                    }
                    html = output.html;
                    interactions = output.interactions;
                }
                Err(e) => {
                    warn!("Falling back to static markup for {}: {}", url, e);
                    errors.push(ErrorItem::new("render", e.to_string()));
                }
            }
        }

        let extractor = Arc::clone(&self.extractor);
        let base_url = url.to_string();
        let (meta, sections) =
            tokio::task::spawn_blocking(move || extractor.analyze(&html, &base_url))
                .await
                .map_err(|e| PipelineError::Extraction(e.to_string()))?;

        info!(
            "Scraped {} in {:?}: {} sections, {} pages, {} errors",
            url,
            started.elapsed(),
            sections.len(),
            interactions.pages.len(),
            errors.len()
        );

        Ok(ScrapeResult {
            url: url.to_string(),
            scraped_at: format_scraped_at(Utc::now()),
            meta,
            sections,
            interactions,
            errors,
        })
    }
}

/// Accept only absolute http(s) URLs.
pub fn validate_url(url: &str) -> Result<Url, PipelineError> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(PipelineError::InvalidUrl(
            "url must start with http:// or https://".to_string(),
        ));
    }
    Url::parse(url).map_err(|e| PipelineError::InvalidUrl(format!("{}: {}", url, e)))
}
