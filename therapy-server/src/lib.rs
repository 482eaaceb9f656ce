//! therapy-server: therapy stubs and labels over HTTP
//!
//! Stubs are listed five per page, searched across their text fields and
//! edited through forms. Labels are found by name prefix with their stubs
//! loaded, and added or removed in batches through a unit of work.

pub mod config;
pub mod db;
pub mod forms;
pub mod http;
pub mod i18n;
pub mod models;

pub use config::TherapyConfig;
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
