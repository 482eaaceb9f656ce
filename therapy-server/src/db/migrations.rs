//! Schema for stubs, labels and their association

use sqlx::PgPool;

/// Create tables and indexes if they don't exist yet.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running therapy migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS therapy_stubs (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            excerpt TEXT NOT NULL DEFAULT '',
            background TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS therapy_labels (
            id BIGSERIAL PRIMARY KEY,
            short_name TEXT NOT NULL,
            report_name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS therapy_label_stubs (
            label_id BIGINT NOT NULL REFERENCES therapy_labels(id) ON DELETE CASCADE,
            stub_id BIGINT NOT NULL REFERENCES therapy_stubs(id) ON DELETE CASCADE,
            PRIMARY KEY (label_id, stub_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("Therapy migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> Result<(), sqlx::Error> {
    // text_pattern_ops lets prefix LIKE use the index
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_therapy_labels_short_name ON therapy_labels(short_name text_pattern_ops)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_therapy_labels_report_name ON therapy_labels(report_name text_pattern_ops)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_therapy_label_stubs_stub ON therapy_label_stubs(stub_id)")
        .execute(pool)
        .await?;

    Ok(())
}
