//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the connection fails.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/therapy").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a PostgreSQL connection pool with custom options.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(max_connections, "connecting to database");
    PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await
}
