//! Deferred label persistence
//!
//! Callers collect label additions and removals in a [`UnitOfWork`] and
//! decide when to flush them. Nothing reaches the store before
//! [`UnitOfWork::commit`], and a commit applies every change or none.

use serde::Serialize;

use super::{DbError, LabelRepository};
use crate::models::{Label, NewLabel};

/// One pending label operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelChange {
    Add(NewLabel),
    Remove(i64),
}

/// What a flush persisted, in submission order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlushOutcome {
    pub added: Vec<Label>,
    pub removed: Vec<i64>,
}

/// Caller-owned batch of label changes. Dropping it discards the batch.
#[derive(Debug, Default)]
pub struct UnitOfWork {
    pending: Vec<LabelChange>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: NewLabel) -> &mut Self {
        self.pending.push(LabelChange::Add(label));
        self
    }

    pub fn remove(&mut self, id: i64) -> &mut Self {
        self.pending.push(LabelChange::Remove(id));
        self
    }

    pub fn pending(&self) -> &[LabelChange] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Flush every pending change atomically.
    pub async fn commit(self, repo: &dyn LabelRepository) -> Result<FlushOutcome, DbError> {
        if self.pending.is_empty() {
            return Ok(FlushOutcome::default());
        }

        tracing::debug!(changes = self.pending.len(), "committing label unit of work");
        repo.flush(self.pending).await
    }
}
