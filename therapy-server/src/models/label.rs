//! Labels and their stub association

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::check_len;
use super::{Stub, ValidationError};

/// Maximum length for label short names
const MAX_SHORT_NAME_LEN: usize = 64;

/// Maximum length for label report names
const MAX_REPORT_NAME_LEN: usize = 255;

/// Persisted label record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Label {
    pub id: i64,
    pub short_name: String,
    pub report_name: String,
}

/// Label with its stubs eagerly loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelWithStubs {
    #[serde(flatten)]
    pub label: Label,
    pub stubs: Vec<Stub>,
}

/// Validated label name (short or report form)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelName(String);

impl LabelName {
    /// Short name: non-empty, max 64 characters.
    pub fn short(s: &str) -> Result<Self, ValidationError> {
        Self::validated("short_name", s, MAX_SHORT_NAME_LEN)
    }

    /// Report name: non-empty, max 255 characters.
    pub fn report(s: &str) -> Result<Self, ValidationError> {
        Self::validated("report_name", s, MAX_REPORT_NAME_LEN)
    }

    fn validated(field: &'static str, s: &str, max: usize) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field });
        }
        check_len(field, trimmed, max)?;
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A label waiting to be persisted, with the stubs it should be attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLabel {
    pub short_name: LabelName,
    pub report_name: LabelName,
    pub stub_ids: Vec<i64>,
}

impl NewLabel {
    pub fn new(short_name: &str, report_name: &str, stub_ids: Vec<i64>) -> Result<Self, ValidationError> {
        Ok(Self::from_names(
            LabelName::short(short_name)?,
            LabelName::report(report_name)?,
            stub_ids,
        ))
    }

    /// Build from already validated names. Stub ids end up sorted and unique.
    pub fn from_names(short_name: LabelName, report_name: LabelName, mut stub_ids: Vec<i64>) -> Self {
        stub_ids.sort_unstable();
        stub_ids.dedup();

        Self {
            short_name,
            report_name,
            stub_ids,
        }
    }
}
