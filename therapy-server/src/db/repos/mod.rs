//! Repository interfaces and their PostgreSQL implementations
//!
//! Handlers receive `Arc<dyn StubRepository>` / `Arc<dyn LabelRepository>`
//! through application state. [`crate::db::MemoryStore`] implements both
//! traits for tests and local runs without a database.

pub mod labels;
pub mod stubs;

use async_trait::async_trait;

use super::{DbError, FlushOutcome, LabelChange, LabelQuery, StubFilter};
use crate::models::{Label, LabelWithStubs, NewLabel, Paginated, Pagination, Stub, StubChanges, StubData};

pub use labels::PgLabelRepo;
pub use stubs::PgStubRepo;

/// Stub persistence
#[async_trait]
pub trait StubRepository: Send + Sync {
    /// One page of stubs matching `filter`, ordered by ascending id.
    async fn list(&self, filter: &StubFilter, page: Pagination) -> Result<Paginated<Stub>, DbError>;

    async fn find(&self, id: i64) -> Result<Option<Stub>, DbError>;

    async fn create(&self, data: StubData) -> Result<Stub, DbError>;

    /// Apply only the fields present in `changes`.
    async fn update(&self, id: i64, changes: StubChanges) -> Result<Stub, DbError>;

    async fn get(&self, id: i64) -> Result<Stub, DbError> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("stub", id))
    }
}

/// Label persistence
#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Labels matching `query`, ordered by ascending id, stubs loaded.
    async fn find_labels_by_request(&self, query: &LabelQuery) -> Result<Vec<LabelWithStubs>, DbError>;

    async fn find(&self, id: i64) -> Result<Option<LabelWithStubs>, DbError>;

    /// Apply a batch atomically. Used by [`crate::db::UnitOfWork::commit`].
    async fn flush(&self, changes: Vec<LabelChange>) -> Result<FlushOutcome, DbError>;

    /// Persist one label and flush immediately.
    async fn add(&self, label: NewLabel) -> Result<Label, DbError> {
        let short_name = label.short_name.as_str().to_owned();
        self.flush(vec![LabelChange::Add(label)])
            .await?
            .added
            .pop()
            .ok_or_else(|| DbError::not_found("label", short_name))
    }

    /// Delete one label and flush immediately.
    async fn remove(&self, id: i64) -> Result<(), DbError> {
        self.flush(vec![LabelChange::Remove(id)]).await?;
        Ok(())
    }
}
