//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing and timeout middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, StatusCode};
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::ServerSection;
use crate::db::{LabelRepository, MemoryStore, PgLabelRepo, PgStubRepo, StubRepository};
use crate::i18n::{I18nError, Translator};
use crate::models::SupportedLocales;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerSection::default().into()
    }
}

impl From<ServerSection> for ServerConfig {
    fn from(section: ServerSection) -> Self {
        Self {
            bind_addr: section.bind,
            cors_permissive: section.cors_permissive,
            timeout_secs: section.timeout_secs,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub stubs: Arc<dyn StubRepository>,
    pub labels: Arc<dyn LabelRepository>,
    pub translator: Translator,
    pub locales: SupportedLocales,
}

impl AppState {
    pub fn new(
        stubs: Arc<dyn StubRepository>,
        labels: Arc<dyn LabelRepository>,
        locales: SupportedLocales,
    ) -> Result<Self, ServerError> {
        let translator = Translator::embedded(&locales.default)?;
        for locale in &locales.supported {
            if !translator.has_locale(locale) {
                tracing::warn!(%locale, "no catalog for locale, default messages will be used");
            }
        }

        Ok(Self {
            stubs,
            labels,
            translator,
            locales,
        })
    }

    /// Repositories backed by PostgreSQL.
    pub fn postgres(pool: PgPool, locales: SupportedLocales) -> Result<Self, ServerError> {
        Self::new(
            Arc::new(PgStubRepo::new(pool.clone())),
            Arc::new(PgLabelRepo::new(pool)),
            locales,
        )
    }

    /// Both repositories served by one in-process store.
    pub fn in_memory(store: MemoryStore, locales: SupportedLocales) -> Result<Self, ServerError> {
        Self::new(Arc::new(store.clone()), Arc::new(store), locales)
    }

    /// Translate `key` for `locale`.
    pub fn t(&self, locale: &str, key: &str, params: &[(&str, &str)]) -> String {
        self.translator.translate(locale, key, params)
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    let port = config.bind_addr.port();
    let origins: Vec<HeaderValue> = ["localhost", "127.0.0.1"]
        .iter()
        .filter_map(|host| HeaderValue::from_str(&format!("http://{host}:{port}")).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Requests running past the configured limit answer 408.
fn timeout_layer(config: &ServerConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.timeout_secs.max(1)),
    )
}

/// Assemble every route with the middleware stack.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(timeout_layer(config))
        .layer(cors_layer(config));

    Router::new()
        .merge(routes::health::router())
        .merge(routes::main::router())
        .merge(routes::stubs::router())
        .merge(routes::labels::router())
        .layer(middleware)
        .with_state(Arc::new(state))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// migrations::run(&pool).await?;
/// let state = AppState::postgres(pool, SupportedLocales::default())?;
/// run_server(state, ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translations: {0}")]
    Translations(#[from] I18nError),
}
