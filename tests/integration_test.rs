//! Integration tests for pagesift
//!
//! These tests drive the public API end to end with in-memory fetchers and
//! renderers; nothing here touches the network or launches a browser, except
//! the HTTP tests which talk to a router bound on localhost.

use async_trait::async_trait;
use pagesift::{
    api::{handlers::AppState, routes::create_router},
    config::Config,
    scraping::{
        fetcher::{FetchError, FetchResult, PageFetcher},
        needs_js_rendering, ContentExtractor, NoopRenderer, PageRenderer, RenderError,
        RenderOutput, ScrapePipeline,
    },
    types::{Interactions, SectionType},
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const LANDING_PAGE: &str = r#"<html lang="en"><head><title>T</title><meta name="description" content="D"></head><body><h1>Welcome</h1><p>Hi</p><h2>Contact Us</h2><a href="/x">X</a></body></html>"#;

/// Fetcher that serves a fixed body for every URL
struct FixedFetcher(String);

#[async_trait]
impl PageFetcher for FixedFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        Ok(FetchResult {
            final_url: url.clone(),
            status_code: 200,
            body: self.0.clone(),
            content_type: "text/html; charset=utf-8".to_string(),
            fetch_duration: Duration::from_millis(2),
        })
    }
}

/// Renderer that always fails the way a missing browser does
struct BrokenRenderer;

#[async_trait]
impl PageRenderer for BrokenRenderer {
    async fn render(&self, _url: &str) -> Result<RenderOutput, RenderError> {
        Err(RenderError::Launch("could not find a Chrome executable".to_string()))
    }
}

fn pipeline(body: &str, renderer: Arc<dyn PageRenderer>) -> ScrapePipeline {
    ScrapePipeline::new(Arc::new(FixedFetcher(body.to_string())), renderer)
}

#[test]
fn test_landing_page_extraction() {
    let extractor = ContentExtractor::new();
    let (meta, sections) = extractor.analyze(LANDING_PAGE, "https://e.com");

    assert_eq!(meta.title, "T");
    assert_eq!(meta.description, "D");
    assert_eq!(meta.language, "en");
    assert_eq!(meta.canonical, None);

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].id, "hero-0");
    assert_eq!(sections[0].label, "Welcome");
    assert_eq!(sections[0].content.text, "Hi");
    assert_eq!(sections[1].id, "footer-1");
    assert_eq!(sections[1].label, "Contact Us");
    assert_eq!(sections[1].content.links.len(), 1);
    assert_eq!(sections[1].content.links[0].text, "X");
    assert_eq!(sections[1].content.links[0].href, "https://e.com/x");
}

#[test]
fn test_heading_order_is_preserved() {
    let html = "<body><h1>First</h1><h2>Second</h2><h2>Third</h2></body>";
    let sections = ContentExtractor::new().segment(html, "https://e.com/");

    let labels: Vec<&str> = sections.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["First", "Second", "Third"]);
    assert_eq!(sections[0].section_type, SectionType::Hero);
}

#[test]
fn test_headingless_page_falls_back_to_one_section() {
    let paragraph = "Plain words without any structure at all. ".repeat(100);
    let html = format!("<html><body><div><p>{}</p></div></body></html>", paragraph);
    let sections = ContentExtractor::new().segment(&html, "https://e.com/");

    assert_eq!(sections.len(), 1);
    let section = &sections[0];
    assert_eq!(section.id, "section-0");
    assert_eq!(section.section_type, SectionType::Section);
    assert!(section.truncated);
    assert!(!section.content.text.is_empty());
    assert!(section.content.text.starts_with("Plain words"));
    assert!(section.content.text.chars().count() <= 2000);
}

#[test]
fn test_all_link_forms_resolve_to_absolute() {
    let html = r#"<body>
        <h1>Links</h1>
        <a href="/root">root</a>
        <a href="relative/page">relative</a>
        <a href="../up">up</a>
        <a href="//cdn.example.org/lib">protocol-relative</a>
        <a href="https://other.example.net/abs">absolute</a>
        <a href="?q=1">query</a>
    </body>"#;
    let sections = ContentExtractor::new().segment(html, "https://e.com/docs/guide/");
    let hrefs: Vec<&str> = sections[0]
        .content
        .links
        .iter()
        .map(|l| l.href.as_str())
        .collect();

    assert_eq!(
        hrefs,
        vec![
            "https://e.com/root",
            "https://e.com/docs/guide/relative/page",
            "https://e.com/docs/up",
            "https://cdn.example.org/lib",
            "https://other.example.net/abs",
            "https://e.com/docs/guide/?q=1",
        ]
    );
    for href in hrefs {
        assert!(Url::parse(href).is_ok(), "not absolute: {}", href);
    }
}

#[test]
fn test_raw_html_budget_on_large_sections() {
    let filler = "<p>lorem ipsum dolor sit amet</p>".repeat(300);
    let html = format!("<body><div><h2>Big</h2>{}</div><div><h2>Small</h2></div></body>", filler);
    let sections = ContentExtractor::new().segment(&html, "https://e.com/");

    assert_eq!(sections.len(), 2);
    assert!(sections[0].truncated);
    assert_eq!(sections[0].raw_html.chars().count(), 3000);
    assert!(!sections[1].truncated);
    assert!(sections[1].raw_html.chars().count() < 3000);
}

#[test]
fn test_heuristic_signals() {
    let long_static = format!("<html><body><p>{}</p></body></html>", "content ".repeat(50));
    assert!(!needs_js_rendering(&long_static));
    assert!(needs_js_rendering(r#"<DIV ID="ROOT"></DIV>"#));
    assert!(needs_js_rendering("<p>tiny</p>"));
}

#[tokio::test]
async fn test_pipeline_falls_back_when_renderer_breaks() {
    // Short page, so the heuristic asks for a render
    let pipeline = pipeline(LANDING_PAGE, Arc::new(BrokenRenderer));
    let result = pipeline.scrape("https://e.com").await.unwrap();

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].phase, "render");
    assert!(result.errors[0].message.contains("Chrome"));
    assert_eq!(result.sections.len(), 2);
    assert_eq!(result.sections[1].content.links[0].href, "https://e.com/x");
    assert_eq!(result.interactions, Interactions::default());
}

#[tokio::test]
async fn test_pipeline_result_serializes_to_api_shape() {
    let pipeline = pipeline(LANDING_PAGE, Arc::new(NoopRenderer));
    let result = pipeline.scrape("https://e.com").await.unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["url"], "https://e.com");
    assert!(json["scrapedAt"].as_str().unwrap().ends_with('Z'));
    assert_eq!(json["meta"]["canonical"], serde_json::Value::Null);
    assert_eq!(json["sections"][0]["type"], "hero");
    assert_eq!(json["sections"][0]["sourceUrl"], "https://e.com");
    assert!(json["sections"][0]["rawHtml"].is_string());
    assert_eq!(json["interactions"]["scrolls"], 0);
    assert_eq!(json["errors"][0]["phase"], "render");
}

async fn spawn_api(body: &str) -> String {
    let state = AppState {
        pipeline: Arc::new(pipeline(body, Arc::new(NoopRenderer))),
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });
    format!("http://{}/api/v1", addr)
}

#[tokio::test]
async fn test_http_api_round_trip() {
    let base = spawn_api(LANDING_PAGE).await;
    let client = reqwest::Client::new();

    let health = client.get(format!("{}/health", base)).send().await.unwrap();
    assert_eq!(health.status().as_u16(), 200);

    let response = client
        .post(format!("{}/scrape", base))
        .header("content-type", "application/json")
        .body(r#"{"url":"https://e.com"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let json: serde_json::Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert_eq!(json["result"]["sections"][1]["id"], "footer-1");

    let response = client
        .post(format!("{}/scrape", base))
        .header("content-type", "application/json")
        .body(r#"{"url":"e.com"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let json: serde_json::Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_http_api_rejects_malformed_body() {
    let base = spawn_api(LANDING_PAGE).await;
    let response = reqwest::Client::new()
        .post(format!("{}/scrape", base))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[test]
fn test_default_config_round_trips_through_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagesift.toml");
    std::fs::write(&path, Config::default().to_toml().unwrap()).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.render.scrolls, 3);
    assert_eq!(loaded.render.navigation_timeout_ms, 15_000);
    assert!(loaded.scraping.enable_js_rendering);
}
