//! Stub repository
//!
//! - list: filtered, paginated, ordered by id
//! - update: COALESCE per column so absent fields stay untouched

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::StubRepository;
use crate::db::{DbError, StubFilter};
use crate::models::{Paginated, Pagination, Stub, StubChanges, StubData};

const STUB_COLUMNS: &str =
    "stub.id, stub.name, stub.description, stub.excerpt, stub.background, stub.created_at, stub.updated_at";

/// PostgreSQL stub repository
#[derive(Clone)]
pub struct PgStubRepo {
    pool: PgPool,
}

impl PgStubRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StubRepository for PgStubRepo {
    async fn list(&self, filter: &StubFilter, page: Pagination) -> Result<Paginated<Stub>, DbError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM therapy_stubs stub");
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {STUB_COLUMNS} FROM therapy_stubs stub"));
        filter.push_where(&mut select);
        select
            .push(" ORDER BY stub.id ASC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        tracing::debug!(sql = select.sql(), page = page.page, "listing stubs");
        let items: Vec<Stub> = select.build_query_as().fetch_all(&self.pool).await?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn find(&self, id: i64) -> Result<Option<Stub>, DbError> {
        let stub = sqlx::query_as::<_, Stub>(&format!(
            "SELECT {STUB_COLUMNS} FROM therapy_stubs stub WHERE stub.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stub)
    }

    async fn create(&self, data: StubData) -> Result<Stub, DbError> {
        let stub: Stub = sqlx::query_as(
            r#"
            INSERT INTO therapy_stubs (name, description, excerpt, background)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, excerpt, background, created_at, updated_at
            "#,
        )
        .bind(data.name.as_str())
        .bind(&data.description)
        .bind(&data.excerpt)
        .bind(&data.background)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id = stub.id, name = %stub.name, "stub created");
        Ok(stub)
    }

    async fn update(&self, id: i64, changes: StubChanges) -> Result<Stub, DbError> {
        if changes.is_empty() {
            return self.get(id).await;
        }

        let stub: Stub = sqlx::query_as(
            r#"
            UPDATE therapy_stubs SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                excerpt = COALESCE($4, excerpt),
                background = COALESCE($5, background),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, excerpt, background, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name.as_ref().map(|n| n.as_str()))
        .bind(changes.description.as_deref())
        .bind(changes.excerpt.as_deref())
        .bind(changes.background.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("stub", id))?;

        tracing::info!(id, "stub updated");
        Ok(stub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrations};
    use crate::models::StubName;

    // Run with: DATABASE_URL=postgres://... cargo test -p therapy-server -- --ignored

    async fn repo() -> PgStubRepo {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        PgStubRepo::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_then_find_round_trips() {
        let repo = repo().await;
        let data = StubData::new("Round trip", "desc", "exc", "bg").unwrap();
        let created = repo.create(data).await.unwrap();

        let found = repo.find(created.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Round trip");
        assert_eq!(found.description, "desc");
        assert_eq!(found.excerpt, "exc");
        assert_eq!(found.background, "bg");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn partial_update_keeps_other_columns() {
        let repo = repo().await;
        let created = repo
            .create(StubData::new("Partial", "keep me", "old", "keep too").unwrap())
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                StubChanges {
                    name: Some(StubName::new("Renamed").unwrap()),
                    excerpt: Some("new".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.excerpt, "new");
        assert_eq!(updated.description, "keep me");
        assert_eq!(updated.background, "keep too");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn search_pages_hold_at_most_five() {
        let repo = repo().await;
        for i in 0..7 {
            repo.create(StubData::new(&format!("pgsearch-{i}"), "", "", "").unwrap())
                .await
                .unwrap();
        }

        let page = repo
            .list(&StubFilter::search("pgsearch-"), Pagination::new(1, 5))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 5);
        assert!(page.total >= 7);
        assert!(page.items.iter().all(|s| s.name.contains("pgsearch-")));
        assert!(page.items.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_missing_is_not_found() {
        let repo = repo().await;
        let err = repo
            .update(i64::MAX, StubChanges { excerpt: Some("x".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "stub", .. }));
    }
}
