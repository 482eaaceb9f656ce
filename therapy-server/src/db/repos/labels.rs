//! Label repository
//!
//! - search: LEFT JOIN through the association so stubs arrive with their
//!   labels in one query
//! - flush: every change of a batch runs in one transaction

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::LabelRepository;
use crate::db::{DbError, FlushOutcome, LabelChange, LabelQuery};
use crate::models::{Label, LabelWithStubs, Stub};

const LABEL_WITH_STUBS_SELECT: &str = r#"
    SELECT
        label.id AS label_id,
        label.short_name,
        label.report_name,
        stub.id AS stub_id,
        stub.name AS stub_name,
        stub.description AS stub_description,
        stub.excerpt AS stub_excerpt,
        stub.background AS stub_background,
        stub.created_at AS stub_created_at,
        stub.updated_at AS stub_updated_at
    FROM therapy_labels label
    LEFT JOIN therapy_label_stubs ls ON ls.label_id = label.id
    LEFT JOIN therapy_stubs stub ON stub.id = ls.stub_id
"#;

/// One row of the label/stub join. Stub columns are NULL for labels
/// without stubs.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct LabelStubRow {
    pub label_id: i64,
    pub short_name: String,
    pub report_name: String,
    pub stub_id: Option<i64>,
    pub stub_name: Option<String>,
    pub stub_description: Option<String>,
    pub stub_excerpt: Option<String>,
    pub stub_background: Option<String>,
    pub stub_created_at: Option<DateTime<Utc>>,
    pub stub_updated_at: Option<DateTime<Utc>>,
}

impl LabelStubRow {
    fn stub(&self) -> Option<Stub> {
        Some(Stub {
            id: self.stub_id?,
            name: self.stub_name.clone()?,
            description: self.stub_description.clone().unwrap_or_default(),
            excerpt: self.stub_excerpt.clone().unwrap_or_default(),
            background: self.stub_background.clone().unwrap_or_default(),
            created_at: self.stub_created_at?,
            updated_at: self.stub_updated_at?,
        })
    }
}

/// Fold join rows (ordered by label id) into labels with their stubs.
pub(crate) fn group_rows(rows: Vec<LabelStubRow>) -> Vec<LabelWithStubs> {
    let mut labels: Vec<LabelWithStubs> = Vec::new();

    for row in rows {
        let stub = row.stub();
        match labels.last_mut() {
            Some(current) if current.label.id == row.label_id => {
                current.stubs.extend(stub);
            }
            _ => labels.push(LabelWithStubs {
                label: Label {
                    id: row.label_id,
                    short_name: row.short_name,
                    report_name: row.report_name,
                },
                stubs: stub.into_iter().collect(),
            }),
        }
    }

    labels
}

/// PostgreSQL label repository
#[derive(Clone)]
pub struct PgLabelRepo {
    pool: PgPool,
}

impl PgLabelRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LabelRepository for PgLabelRepo {
    async fn find_labels_by_request(&self, query: &LabelQuery) -> Result<Vec<LabelWithStubs>, DbError> {
        let mut select = QueryBuilder::<Postgres>::new(LABEL_WITH_STUBS_SELECT);
        select.push(" WHERE ");
        query.push_predicate(&mut select, "label");
        select.push(" ORDER BY label.id ASC, stub.id ASC");

        tracing::debug!(prefix = query.prefix(), "searching labels");
        let rows: Vec<LabelStubRow> = select.build_query_as().fetch_all(&self.pool).await?;

        Ok(group_rows(rows))
    }

    async fn find(&self, id: i64) -> Result<Option<LabelWithStubs>, DbError> {
        let rows: Vec<LabelStubRow> = sqlx::query_as(&format!(
            "{LABEL_WITH_STUBS_SELECT} WHERE label.id = $1 ORDER BY stub.id ASC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_rows(rows).pop())
    }

    async fn flush(&self, changes: Vec<LabelChange>) -> Result<FlushOutcome, DbError> {
        let mut tx = self.pool.begin().await?;
        let mut outcome = FlushOutcome::default();

        // Any early return drops `tx`, which rolls the whole batch back.
        for change in changes {
            match change {
                LabelChange::Add(new_label) => {
                    let label: Label = sqlx::query_as(
                        r#"
                        INSERT INTO therapy_labels (short_name, report_name)
                        VALUES ($1, $2)
                        RETURNING id, short_name, report_name
                        "#,
                    )
                    .bind(new_label.short_name.as_str())
                    .bind(new_label.report_name.as_str())
                    .fetch_one(&mut *tx)
                    .await?;

                    for stub_id in &new_label.stub_ids {
                        let linked = sqlx::query(
                            r#"
                            INSERT INTO therapy_label_stubs (label_id, stub_id)
                            SELECT $1, id FROM therapy_stubs WHERE id = $2
                            ON CONFLICT DO NOTHING
                            "#,
                        )
                        .bind(label.id)
                        .bind(stub_id)
                        .execute(&mut *tx)
                        .await?;

                        if linked.rows_affected() == 0 {
                            return Err(DbError::not_found("stub", stub_id));
                        }
                    }

                    outcome.added.push(label);
                }
                LabelChange::Remove(id) => {
                    let deleted = sqlx::query("DELETE FROM therapy_labels WHERE id = $1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;

                    if deleted.rows_affected() == 0 {
                        return Err(DbError::not_found("label", id));
                    }

                    outcome.removed.push(id);
                }
            }
        }

        tx.commit().await?;
        tracing::info!(
            added = outcome.added.len(),
            removed = outcome.removed.len(),
            "label changes flushed"
        );
        Ok(outcome)
    }
}
