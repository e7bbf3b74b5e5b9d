//! HTTP API Server
//!
//! Axum-based HTTP server for the scrape API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::Method;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::HttpConfig;
use crate::scraping::ScrapePipeline;

use super::handlers::AppState;
use super::routes::create_router;

/// HTTP API server
pub struct HttpServer {
    config: HttpConfig,
    pipeline: Arc<ScrapePipeline>,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(config: HttpConfig, pipeline: Arc<ScrapePipeline>) -> Self {
        Self { config, pipeline }
    }

    /// Run the HTTP server until `shutdown` fires
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .context("Invalid HTTP listen address")?;

        let app_state = AppState {
            pipeline: self.pipeline.clone(),
        };

        let mut app = create_router(app_state);

        if self.config.cors_enabled {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any)
                .allow_origin(Any);
            app = app.layer(cors);
        }

        app = app.layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(&addr)
            .await
            .context("Failed to bind HTTP server")?;

        info!("HTTP API server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("HTTP server shutting down");
            })
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_invalid_listen_addr() {
        let mut config = Config::default();
        config.scraping.enable_js_rendering = false;
        let pipeline = Arc::new(ScrapePipeline::from_config(&config).unwrap());

        let http = HttpConfig {
            listen_addr: "not-an-address".to_string(),
            cors_enabled: false,
        };
        let (_tx, rx) = broadcast::channel(1);
        let err = HttpServer::new(http, pipeline).run(rx).await.unwrap_err();
        assert!(err.to_string().contains("Invalid HTTP listen address"));
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_server() {
        let mut config = Config::default();
        config.scraping.enable_js_rendering = false;
        let pipeline = Arc::new(ScrapePipeline::from_config(&config).unwrap());

        let http = HttpConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            cors_enabled: true,
        };
        let (tx, rx) = broadcast::channel(1);
        let server = tokio::spawn(async move { HttpServer::new(http, pipeline).run(rx).await });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        tx.send(()).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
