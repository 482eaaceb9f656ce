//! Query descriptors
//!
//! A descriptor knows how to push its predicate into a `sqlx::QueryBuilder`
//! and how to evaluate the same predicate against an in-memory record, so
//! both repository backends share one definition of "matches".

use sqlx::{Postgres, QueryBuilder};

use crate::models::{Label, Stub};

/// Columns covered by free-text stub search
const STUB_SEARCH_COLUMNS: [&str; 4] = [
    "stub.name",
    "stub.description",
    "stub.excerpt",
    "stub.background",
];

/// Escape LIKE wildcards so user input only ever matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Label filter: short name OR report name starts with a prefix.
///
/// This is the composable form of the label search. Use
/// [`LabelQuery::push_predicate`] or [`LabelQuery::push_id_subquery`] to embed
/// it in another statement; `LabelRepository::find_labels_by_request`
/// executes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelQuery {
    prefix: String,
}

impl LabelQuery {
    pub fn by_name_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// LIKE pattern for the prefix
    pub fn pattern(&self) -> String {
        format!("{}%", escape_like(&self.prefix))
    }

    /// Push `(alias.short_name LIKE $n OR alias.report_name LIKE $m)`.
    pub fn push_predicate(&self, qb: &mut QueryBuilder<'_, Postgres>, alias: &str) {
        let pattern = self.pattern();
        qb.push("(")
            .push(alias)
            .push(".short_name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR ")
            .push(alias)
            .push(".report_name LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    /// Push a `SELECT id` subquery over matching labels.
    pub fn push_id_subquery(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push("SELECT matched.id FROM therapy_labels matched WHERE ");
        self.push_predicate(qb, "matched");
    }

    pub fn matches(&self, label: &Label) -> bool {
        label.short_name.starts_with(&self.prefix) || label.report_name.starts_with(&self.prefix)
    }
}

/// Stub list filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubFilter {
    /// Substring looked up in name, description, excerpt and background
    pub search: Option<String>,
    /// Keep only stubs attached to a matching label
    pub label: Option<LabelQuery>,
}

impl StubFilter {
    /// No filtering: every stub.
    pub fn all() -> Self {
        Self::default()
    }

    /// Substring search. An empty term means no text filter.
    pub fn search(term: &str) -> Self {
        Self {
            search: Some(term.to_owned()).filter(|t| !t.is_empty()),
            label: None,
        }
    }

    pub fn with_label(mut self, query: LabelQuery) -> Self {
        self.label = Some(query);
        self
    }

    /// Push the WHERE clause (nothing when unfiltered). Expects the stubs
    /// table to be aliased `stub`.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        let mut clauses = 0;

        if let Some(term) = &self.search {
            qb.push(clause_keyword(clauses));
            clauses += 1;
            let pattern = format!("%{}%", escape_like(term));
            qb.push("(");
            for (i, column) in STUB_SEARCH_COLUMNS.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(column)
                    .push(" LIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\'");
            }
            qb.push(")");
        }

        if let Some(label) = &self.label {
            qb.push(clause_keyword(clauses));
            qb.push("stub.id IN (SELECT ls.stub_id FROM therapy_label_stubs ls WHERE ls.label_id IN (");
            label.push_id_subquery(qb);
            qb.push("))");
        }
    }

    /// In-memory evaluation; `labels` are the labels attached to `stub`.
    pub fn matches(&self, stub: &Stub, labels: &[&Label]) -> bool {
        let text_ok = match &self.search {
            Some(term) => stub.searchable_fields().iter().any(|field| field.contains(term.as_str())),
            None => true,
        };
        let label_ok = match &self.label {
            Some(query) => labels.iter().any(|label| query.matches(label)),
            None => true,
        };
        text_ok && label_ok
    }
}

fn clause_keyword(preceding: usize) -> &'static str {
    if preceding == 0 {
        " WHERE "
    } else {
        " AND "
    }
}
