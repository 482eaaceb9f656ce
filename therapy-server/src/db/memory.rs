//! In-process store implementing both repository traits
//!
//! Backs the router tests and `therapy serve --in-memory`. Search semantics
//! match the SQL ones through the shared query descriptors.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{DbError, FlushOutcome, LabelChange, LabelQuery, LabelRepository, StubFilter, StubRepository};
use crate::models::{Label, LabelWithStubs, Paginated, Pagination, Stub, StubChanges, StubData};

#[derive(Debug, Clone, Default)]
struct Tables {
    stubs: BTreeMap<i64, Stub>,
    labels: BTreeMap<i64, Label>,
    /// (label_id, stub_id)
    links: BTreeSet<(i64, i64)>,
    last_stub_id: i64,
    last_label_id: i64,
}

impl Tables {
    fn labels_of(&self, stub_id: i64) -> Vec<&Label> {
        self.links
            .iter()
            .filter(|(_, s)| *s == stub_id)
            .filter_map(|(l, _)| self.labels.get(l))
            .collect()
    }

    fn with_stubs(&self, label: &Label) -> LabelWithStubs {
        let stubs = self
            .links
            .range((label.id, i64::MIN)..=(label.id, i64::MAX))
            .filter_map(|(_, stub_id)| self.stubs.get(stub_id).cloned())
            .collect();

        LabelWithStubs {
            label: label.clone(),
            stubs,
        }
    }

    fn apply(&mut self, change: LabelChange, outcome: &mut FlushOutcome) -> Result<(), DbError> {
        match change {
            LabelChange::Add(new_label) => {
                if let Some(missing) = new_label.stub_ids.iter().find(|id| !self.stubs.contains_key(*id)) {
                    return Err(DbError::not_found("stub", missing));
                }

                self.last_label_id += 1;
                let label = Label {
                    id: self.last_label_id,
                    short_name: new_label.short_name.as_str().to_owned(),
                    report_name: new_label.report_name.as_str().to_owned(),
                };
                for stub_id in new_label.stub_ids {
                    self.links.insert((label.id, stub_id));
                }
                self.labels.insert(label.id, label.clone());
                outcome.added.push(label);
            }
            LabelChange::Remove(id) => {
                if self.labels.remove(&id).is_none() {
                    return Err(DbError::not_found("label", id));
                }
                self.links.retain(|(label_id, _)| *label_id != id);
                outcome.removed.push(id);
            }
        }
        Ok(())
    }
}

/// Shared in-memory store; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StubRepository for MemoryStore {
    async fn list(&self, filter: &StubFilter, page: Pagination) -> Result<Paginated<Stub>, DbError> {
        let tables = self.tables.read().await;
        let matching: Vec<&Stub> = tables
            .stubs
            .values()
            .filter(|stub| filter.matches(stub, &tables.labels_of(stub.id)))
            .collect();

        let items = matching
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|stub| (*stub).clone())
            .collect();

        Ok(Paginated {
            items,
            total: matching.len() as i64,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn find(&self, id: i64) -> Result<Option<Stub>, DbError> {
        Ok(self.tables.read().await.stubs.get(&id).cloned())
    }

    async fn create(&self, data: StubData) -> Result<Stub, DbError> {
        let mut tables = self.tables.write().await;
        tables.last_stub_id += 1;

        let now = Utc::now();
        let stub = Stub {
            id: tables.last_stub_id,
            name: data.name.into_string(),
            description: data.description,
            excerpt: data.excerpt,
            background: data.background,
            created_at: now,
            updated_at: now,
        };
        tables.stubs.insert(stub.id, stub.clone());

        tracing::info!(id = stub.id, name = %stub.name, "stub created");
        Ok(stub)
    }

    async fn update(&self, id: i64, changes: StubChanges) -> Result<Stub, DbError> {
        let mut tables = self.tables.write().await;
        let stub = tables
            .stubs
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("stub", id))?;

        if changes.apply_to(stub) {
            stub.updated_at = Utc::now();
            tracing::info!(id, "stub updated");
        }
        Ok(stub.clone())
    }
}

#[async_trait]
impl LabelRepository for MemoryStore {
    async fn find_labels_by_request(&self, query: &LabelQuery) -> Result<Vec<LabelWithStubs>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .labels
            .values()
            .filter(|label| query.matches(label))
            .map(|label| tables.with_stubs(label))
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Option<LabelWithStubs>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.labels.get(&id).map(|label| tables.with_stubs(label)))
    }

    async fn flush(&self, changes: Vec<LabelChange>) -> Result<FlushOutcome, DbError> {
        let mut tables = self.tables.write().await;

        // Work on a copy and swap it in only when every change applied.
        let mut staged = tables.clone();
        let mut outcome = FlushOutcome::default();
        for change in changes {
            staged.apply(change, &mut outcome)?;
        }
        *tables = staged;

        tracing::info!(
            added = outcome.added.len(),
            removed = outcome.removed.len(),
            "label changes flushed"
        );
        Ok(outcome)
    }
}
