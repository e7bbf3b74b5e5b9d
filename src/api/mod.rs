//! HTTP API
//!
//! `POST /api/v1/scrape` runs the scrape pipeline for one URL;
//! `GET /api/v1/health` reports liveness.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use server::HttpServer;
