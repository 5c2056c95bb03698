//! PetPortrait Server - HTTP API for pet photo captions
//!
//! This crate exposes the caption pipeline over HTTP. A client posts a
//! base64 photo and gets back a caption with hashtags:
//!
//! ```text
//! POST /captions/generate
//! {"imageBase64": "data:image/jpeg;base64,/9j/..."}
//!
//! 200 {"caption": "Max loves the park!", "hashtags": ["#dogpark", "#happydog"]}
//! ```
//!
//! # Features
//!
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: `server.toml` plus `PETPORTRAIT_SERVER__*` environment
//!   overrides, and `PORT` for the listen port
//! - **Metrics**: Prometheus text on `/metrics` for stage latency and outcomes
//! - **Graceful Shutdown**: SIGTERM and Ctrl+C
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//! - `POST /captions/generate` - Caption a photo (also `/api/captions/generate`)
//!
//! Errors are JSON bodies of the form `{"error": "...", "details": "..."}`,
//! with `details` omitted when there is nothing to add.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{ErrorResponse, ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
