//! Interactive rendering through a headless browser
//!
//! The browser sits behind the `BrowserSession` trait so the exploration
//! state machine (`driver`) can run against Chromium in production and a
//! scripted session in tests.
//!
//! Every session call returns a `StepResult`. Timeouts surface as
//! `StepError::Timeout` and the driver decides which ones are fatal (only
//! outright navigation failure and markup capture are).

pub mod chromium;
mod driver;

pub use chromium::{ChromiumRenderer, ChromiumSession};
pub use driver::{render_with, select_candidate, Candidate, RenderOptions};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::types::Interactions;

/// Failure of a single browser step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Browser(String),
}

pub type StepResult<T> = Result<T, StepError>;

/// Environment-level failures that end a render call
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Interactive rendering unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to launch browser: {0}")]
    Launch(String),
    #[error("Navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: StepError,
    },
    #[error("Failed to capture rendered markup: {0}")]
    Capture(#[source] StepError),
}

/// Which browsing context a call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowsingContext {
    /// The tab opened for the target URL
    Main,
    /// The most recent popup opened by a click
    Popup,
}

/// Snapshot of one `a[href]` element, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnchorInfo {
    /// Raw `href` attribute
    pub href: String,
    /// Rendered link text
    pub text: String,
    /// `aria-label` attribute
    pub aria_label: String,
    pub visible: bool,
}

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing new opened; the main page may or may not have navigated
    InPlace,
    /// A new browsing context opened and is now `BrowsingContext::Popup`
    Popup,
}

/// A single headless browser session with one main tab
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate the main tab and wait for the document to load.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> StepResult<()>;

    /// Current URL of a browsing context.
    async fn current_url(&mut self, context: BrowsingContext) -> StepResult<String>;

    /// Scroll the main tab vertically.
    async fn scroll_by(&mut self, delta_y: i64) -> StepResult<()>;

    /// Let the page settle.
    async fn pause(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Serialized markup of the main tab.
    async fn content(&mut self) -> StepResult<String>;

    /// All `a[href]` elements of the main tab in document order.
    async fn anchors(&mut self) -> StepResult<Vec<AnchorInfo>>;

    /// Scroll the anchor at `index` (as returned by `anchors`) into view.
    async fn scroll_into_view(&mut self, index: usize, timeout: Duration) -> StepResult<()>;

    /// Click the anchor at `index`, watching `popup_window` for a new context.
    async fn click(
        &mut self,
        index: usize,
        click_timeout: Duration,
        popup_window: Duration,
    ) -> StepResult<ClickOutcome>;

    /// Wait for a browsing context to finish loading.
    async fn wait_for_load(&mut self, context: BrowsingContext, timeout: Duration) -> StepResult<()>;

    /// Close the browser. Called exactly once per session.
    async fn close(&mut self) -> StepResult<()>;
}

/// Which driver step a record refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Navigate { url: String },
    RecordPage,
    Scroll { iteration: u32 },
    Capture,
    Scan { attempt: u32 },
    ScrollIntoView { attempt: u32 },
    Click { attempt: u32 },
    PopupLoad { attempt: u32 },
    PageLoad { attempt: u32 },
    Recover { attempt: u32, url: String },
    ResolveUrl { attempt: u32 },
    Close,
}

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    TimedOut,
    Failed(String),
}

impl StepStatus {
    pub fn of<T>(result: &StepResult<T>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(StepError::Timeout(_)) => Self::TimedOut,
            Err(StepError::Browser(message)) => Self::Failed(message.clone()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

/// Outcome of one driver step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    #[serde(flatten)]
    pub step: Step,
    pub status: StepStatus,
}

/// Rendered page plus what it took to get there
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Markup captured after the scroll loop
    pub html: String,
    pub interactions: Interactions,
    /// Every step in execution order, including soft failures
    pub steps: Vec<StepRecord>,
}

impl RenderOutput {
    /// Steps that timed out or failed, in execution order
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|record| !record.status.is_ok())
    }
}

/// Produces rendered markup for a URL
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RenderOutput, RenderError>;
}

/// Renderer used when interactive rendering is switched off
pub struct NoopRenderer;

#[async_trait]
impl PageRenderer for NoopRenderer {
    async fn render(&self, _url: &str) -> Result<RenderOutput, RenderError> {
        Err(RenderError::Unavailable(
            "JavaScript rendering is disabled".to_string(),
        ))
    }
}

/// Run a browser call under a deadline, mapping both failure kinds to `StepError`.
pub(crate) async fn bounded<T, E, F>(limit: Duration, fut: F) -> StepResult<T>
where
    E: fmt::Display,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(StepError::Browser(e.to_string())),
        Err(_) => Err(StepError::Timeout(limit)),
    }
}
