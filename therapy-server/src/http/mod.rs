//! HTTP layer
//!
//! Axum server with:
//! - Locale-prefixed therapy routes rendered as JSON views
//! - CORS (localhost only by default)
//! - Request tracing and timeouts
//! - Graceful shutdown

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;
pub mod view;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use view::View;
