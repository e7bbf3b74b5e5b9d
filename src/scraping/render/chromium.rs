//! Chromium-backed browser session (chromiumoxide, headless)

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::target::TargetId;
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{
    bounded, render_with, AnchorInfo, BrowserSession, BrowsingContext, ClickOutcome, PageRenderer,
    RenderError, RenderOptions, RenderOutput, StepError, StepResult,
};
use crate::config::RenderConfig;

/// Interval between popup checks after a click
const POPUP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Snapshot of every `a[href]` in document order, as a JSON string
const ANCHOR_SCAN_JS: &str = r#"JSON.stringify(Array.from(document.querySelectorAll('a[href]')).map(function (a) {
    var rect = a.getBoundingClientRect();
    var style = window.getComputedStyle(a);
    return {
        href: a.getAttribute('href') || '',
        text: (a.innerText || '').trim(),
        ariaLabel: (a.getAttribute('aria-label') || '').trim(),
        visible: rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden'
    };
}))"#;

/// One headless Chromium process with a single main tab
pub struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    popup: Option<Page>,
    /// Bound for plain CDP round-trips (URL reads, element lookups)
    command_timeout: Duration,
}

impl ChromiumSession {
    /// Launch a headless browser and open a blank tab.
    pub async fn launch(config: &RenderConfig) -> Result<Self, RenderError> {
        let command_timeout = Duration::from_millis(config.navigation_timeout_ms);
        let browser_config = BrowserConfig::builder()
            .args(config.browser_args.iter().cloned())
            .request_timeout(command_timeout)
            .build()
            .map_err(RenderError::Launch)?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(RenderError::Launch(format!("failed to open tab: {}", e)));
            }
        };

        debug!("Launched headless browser");
        Ok(Self {
            browser,
            handler: handler_task,
            page,
            popup: None,
            command_timeout,
        })
    }

    fn context_page(&self, context: BrowsingContext) -> StepResult<&Page> {
        match context {
            BrowsingContext::Main => Ok(&self.page),
            BrowsingContext::Popup => self
                .popup
                .as_ref()
                .ok_or_else(|| StepError::Browser("no popup is open".to_string())),
        }
    }

    async fn anchor_element(&self, index: usize) -> StepResult<Element> {
        let elements = bounded(self.command_timeout, self.page.find_elements("a[href]")).await?;
        elements
            .into_iter()
            .nth(index)
            .ok_or_else(|| StepError::Browser(format!("anchor {} is no longer in the page", index)))
    }

    async fn target_ids(&self) -> StepResult<HashSet<TargetId>> {
        let pages = bounded(self.command_timeout, self.browser.pages()).await?;
        Ok(pages.iter().map(|page| page.target_id().clone()).collect())
    }

    /// Poll for a page target that was not in `known`, until `window` passes.
    async fn watch_for_popup(&self, known: &HashSet<TargetId>, window: Duration) -> Option<Page> {
        let deadline = Instant::now() + window;
        loop {
            if let Ok(Ok(pages)) = tokio::time::timeout(window, self.browser.pages()).await {
                if let Some(page) = pages.into_iter().find(|p| !known.contains(p.target_id())) {
                    return Some(page);
                }
            }
            if Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(POPUP_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> StepResult<()> {
        bounded(timeout, self.page.goto(url)).await.map(|_| ())
    }

    async fn current_url(&mut self, context: BrowsingContext) -> StepResult<String> {
        let page = self.context_page(context)?;
        let url = bounded(self.command_timeout, page.url()).await?;
        Ok(url.unwrap_or_default())
    }

    async fn scroll_by(&mut self, delta_y: i64) -> StepResult<()> {
        let script = format!("window.scrollBy(0, {})", delta_y);
        bounded(self.command_timeout, self.page.evaluate(script.as_str()))
            .await
            .map(|_| ())
    }

    async fn content(&mut self) -> StepResult<String> {
        bounded(self.command_timeout, self.page.content()).await
    }

    async fn anchors(&mut self) -> StepResult<Vec<AnchorInfo>> {
        let result = bounded(self.command_timeout, self.page.evaluate(ANCHOR_SCAN_JS)).await?;
        let json: String = result
            .into_value()
            .map_err(|e| StepError::Browser(format!("unexpected anchor scan result: {}", e)))?;
        serde_json::from_str(&json)
            .map_err(|e| StepError::Browser(format!("malformed anchor scan result: {}", e)))
    }

    async fn scroll_into_view(&mut self, index: usize, timeout: Duration) -> StepResult<()> {
        let element = self.anchor_element(index).await?;
        bounded(timeout, element.scroll_into_view()).await.map(|_| ())
    }

    async fn click(
        &mut self,
        index: usize,
        click_timeout: Duration,
        popup_window: Duration,
    ) -> StepResult<ClickOutcome> {
        let known = self.target_ids().await?;
        let element = self.anchor_element(index).await?;
        bounded(click_timeout, element.click()).await?;

        match self.watch_for_popup(&known, popup_window).await {
            Some(popup) => {
                if let Some(previous) = self.popup.replace(popup) {
                    let _ = previous.close().await;
                }
                Ok(ClickOutcome::Popup)
            }
            None => Ok(ClickOutcome::InPlace),
        }
    }

    async fn wait_for_load(&mut self, context: BrowsingContext, timeout: Duration) -> StepResult<()> {
        let page = self.context_page(context)?;
        bounded(timeout, page.wait_for_navigation()).await.map(|_| ())
    }

    async fn close(&mut self) -> StepResult<()> {
        if let Some(popup) = self.popup.take() {
            let _ = popup.close().await;
        }
        let closed = bounded(self.command_timeout, self.browser.close()).await;
        if closed.is_ok() {
            if let Err(e) = bounded(self.command_timeout, self.browser.wait()).await {
                debug!("Browser process did not exit cleanly: {}", e);
            }
        }
        self.handler.abort();
        closed.map(|_| ())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// `PageRenderer` that launches a fresh Chromium per call
pub struct ChromiumRenderer {
    config: RenderConfig,
    options: RenderOptions,
}

impl ChromiumRenderer {
    pub fn new(config: RenderConfig) -> Self {
        let options = RenderOptions::from(&config);
        Self { config, options }
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&self, url: &str) -> Result<RenderOutput, RenderError> {
        let started = Instant::now();
        let mut session = ChromiumSession::launch(&self.config).await?;

        let output = render_with(&mut session, url, &self.options).await;
        match &output {
            Ok(output) => info!(
                "Rendered {} in {:?}: {} pages, {} clicks, {} scrolls",
                url,
                started.elapsed(),
                output.interactions.pages.len(),
                output.interactions.clicks.len(),
                output.interactions.scrolls
            ),
            Err(e) => warn!("Rendering {} failed: {}", url, e),
        }
        output
    }
}
