//! Exploration state machine
//!
//! navigate → record initial page → scroll loop → capture → click-and-recover
//! loop → close. Only a hard navigation failure and a failed capture abort
//! the run; everything else is recorded as a step and skipped.

use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{
    AnchorInfo, BrowserSession, BrowsingContext, ClickOutcome, RenderError, RenderOutput, Step,
    StepError, StepRecord, StepResult, StepStatus,
};
use crate::config::RenderConfig;
use crate::types::{Click, Interactions};
use crate::util::truncate_chars;

/// Step timings and limits for one exploration run
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub scrolls: u32,
    pub scroll_delta: i64,
    pub scroll_settle: Duration,
    pub navigation_timeout: Duration,
    pub max_click_attempts: u32,
    pub scroll_into_view_timeout: Duration,
    pub click_timeout: Duration,
    pub popup_window: Duration,
    pub click_settle: Duration,
    pub recovery_settle: Duration,
    pub description_max_chars: usize,
    pub target_pages: usize,
    pub target_clicks: usize,
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            scrolls: config.scrolls,
            scroll_delta: config.scroll_delta,
            scroll_settle: Duration::from_millis(config.scroll_settle_ms),
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            max_click_attempts: config.max_click_attempts,
            scroll_into_view_timeout: Duration::from_millis(config.scroll_into_view_timeout_ms),
            click_timeout: Duration::from_millis(config.click_timeout_ms),
            popup_window: Duration::from_millis(config.popup_timeout_ms),
            click_settle: Duration::from_millis(config.click_settle_ms),
            recovery_settle: Duration::from_millis(config.recovery_settle_ms),
            description_max_chars: config.description_max_chars,
            target_pages: config.target_pages,
            target_clicks: config.target_clicks,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

/// A link chosen for the next click
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Position in the anchor list the candidate was picked from
    pub index: usize,
    /// Absolute target URL
    pub target: String,
    /// `a[href="..."]`, for logging only
    pub selector: String,
    pub description: String,
}

/// Pick the first clickable, unvisited link.
///
/// `base_url` is the page's current URL and resolves relative hrefs. Anchors
/// that are hidden, pseudo-links (fragment, `javascript:`, `mailto:`,
/// `tel:`), unresolvable, or already in `visited` are skipped.
pub fn select_candidate(
    anchors: &[AnchorInfo],
    base_url: &str,
    visited: &HashSet<String>,
    description_max_chars: usize,
) -> Option<Candidate> {
    let base = Url::parse(base_url).ok();

    anchors.iter().enumerate().find_map(|(index, anchor)| {
        if !anchor.visible {
            return None;
        }
        let href = anchor.href.trim();
        if is_pseudo_link(href) {
            return None;
        }
        let target = match &base {
            Some(base) => base.join(href).ok()?,
            None => Url::parse(href).ok()?,
        };
        let target = target.to_string();
        if visited.contains(&target) {
            return None;
        }

        Some(Candidate {
            index,
            selector: format!("a[href=\"{}\"]", anchor.href.replace('"', "\\\"")),
            description: format!("Click link: {}", describe(anchor, description_max_chars)),
            target,
        })
    })
}

fn is_pseudo_link(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
}

fn describe(anchor: &AnchorInfo, max_chars: usize) -> String {
    let label = [&anchor.text, &anchor.aria_label, &anchor.href]
        .into_iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or_default();
    truncate_chars(label, max_chars).0
}

/// Run the full exploration against `session`.
///
/// The session is closed before returning on every path.
pub async fn render_with<S>(
    session: &mut S,
    url: &str,
    options: &RenderOptions,
) -> Result<RenderOutput, RenderError>
where
    S: BrowserSession + ?Sized,
{
    let mut explorer = Explorer::new(options);
    let result = explorer.run(session, url).await;

    let closed = session.close().await;
    if let Err(e) = &closed {
        warn!("Failed to close browser session: {}", e);
    }
    explorer.record(Step::Close, &closed);

    result.map(|html| RenderOutput {
        html,
        interactions: explorer.interactions,
        steps: explorer.steps,
    })
}

enum Attempt {
    Clicked,
    Abandoned,
    NoCandidate,
}

struct Explorer<'a> {
    options: &'a RenderOptions,
    interactions: Interactions,
    visited: HashSet<String>,
    steps: Vec<StepRecord>,
}

impl<'a> Explorer<'a> {
    fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            interactions: Interactions::default(),
            visited: HashSet::new(),
            steps: Vec::new(),
        }
    }

    fn record<T>(&mut self, step: Step, result: &StepResult<T>) {
        let status = StepStatus::of(result);
        if !status.is_ok() {
            debug!("Render step {:?} {}", step, status);
        }
        self.steps.push(StepRecord { step, status });
    }

    fn record_page(&mut self, url: &str) {
        if self.interactions.record_page(url) {
            debug!("Recorded page {}", url);
        }
        self.visited.insert(url.to_string());
    }

    fn rich_enough(&self) -> bool {
        self.interactions.pages.len() >= self.options.target_pages
            && self.interactions.clicks.len() >= self.options.target_clicks
    }

    async fn run<S>(&mut self, session: &mut S, url: &str) -> Result<String, RenderError>
    where
        S: BrowserSession + ?Sized,
    {
        let navigated = session.navigate(url, self.options.navigation_timeout).await;
        self.record(Step::Navigate { url: url.to_string() }, &navigated);
        match navigated {
            Ok(()) => {}
            Err(StepError::Timeout(limit)) => {
                debug!("Navigation to {} timed out after {:?}, continuing", url, limit);
            }
            Err(source) => {
                return Err(RenderError::Navigation {
                    url: url.to_string(),
                    source,
                });
            }
        }

        let landed = session.current_url(BrowsingContext::Main).await;
        self.record(Step::RecordPage, &landed);
        if let Ok(landed) = landed {
            self.record_page(&landed);
        }

        for iteration in 1..=self.options.scrolls {
            let scrolled = session.scroll_by(self.options.scroll_delta).await;
            self.record(Step::Scroll { iteration }, &scrolled);
            session.pause(self.options.scroll_settle).await;
            self.interactions.scrolls += 1;
        }

        let captured = session.content().await;
        self.record(Step::Capture, &captured);
        let html = captured.map_err(RenderError::Capture)?;

        for attempt in 1..=self.options.max_click_attempts {
            if self.rich_enough() {
                debug!("Exploration target reached after {} attempts", attempt - 1);
                break;
            }
            match self.attempt(session, attempt).await {
                Attempt::NoCandidate => break,
                Attempt::Clicked | Attempt::Abandoned => {}
            }
        }

        Ok(html)
    }

    async fn attempt<S>(&mut self, session: &mut S, attempt: u32) -> Attempt
    where
        S: BrowserSession + ?Sized,
    {
        let base = session.current_url(BrowsingContext::Main).await;
        let anchors = match &base {
            Ok(_) => session.anchors().await,
            Err(e) => Err(e.clone()),
        };
        self.record(Step::Scan { attempt }, &anchors);
        let (Ok(base), Ok(anchors)) = (base, anchors) else {
            return Attempt::Abandoned;
        };

        let Some(candidate) = select_candidate(
            &anchors,
            &base,
            &self.visited,
            self.options.description_max_chars,
        ) else {
            debug!("No clickable link left on {}", base);
            return Attempt::NoCandidate;
        };
        self.visited.insert(candidate.target.clone());
        debug!("{} ({})", candidate.description, candidate.target);

        let in_view = session
            .scroll_into_view(candidate.index, self.options.scroll_into_view_timeout)
            .await;
        self.record(Step::ScrollIntoView { attempt }, &in_view);

        let clicked = session
            .click(
                candidate.index,
                self.options.click_timeout,
                self.options.popup_window,
            )
            .await;
        self.record(Step::Click { attempt }, &clicked);
        let Ok(outcome) = clicked else {
            return Attempt::Abandoned;
        };

        let resulting = match outcome {
            ClickOutcome::Popup => {
                let loaded = session
                    .wait_for_load(BrowsingContext::Popup, self.options.navigation_timeout)
                    .await;
                self.record(Step::PopupLoad { attempt }, &loaded);
                session.current_url(BrowsingContext::Popup).await
            }
            ClickOutcome::InPlace => self.settle_in_place(session, attempt, &base, &candidate).await,
        };
        self.record(Step::ResolveUrl { attempt }, &resulting);
        let Ok(resulting) = resulting else {
            return Attempt::Abandoned;
        };

        self.record_page(&resulting);
        self.interactions.clicks.push(Click {
            selector: candidate.selector,
            description: candidate.description,
        });
        Attempt::Clicked
    }

    /// Wait out an in-place click, navigating to the target directly if the
    /// URL did not change.
    async fn settle_in_place<S>(
        &mut self,
        session: &mut S,
        attempt: u32,
        before: &str,
        candidate: &Candidate,
    ) -> StepResult<String>
    where
        S: BrowserSession + ?Sized,
    {
        let loaded = session
            .wait_for_load(BrowsingContext::Main, self.options.navigation_timeout)
            .await;
        self.record(Step::PageLoad { attempt }, &loaded);
        session.pause(self.options.click_settle).await;

        let after = session.current_url(BrowsingContext::Main).await?;
        if after != before {
            return Ok(after);
        }

        let recovered = session
            .navigate(&candidate.target, self.options.navigation_timeout)
            .await;
        self.record(
            Step::Recover {
                attempt,
                url: candidate.target.clone(),
            },
            &recovered,
        );
        session.pause(self.options.recovery_settle).await;
        session.current_url(BrowsingContext::Main).await
    }
}
