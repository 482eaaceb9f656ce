//! Stub form: creation and field-level edit

use serde::{Deserialize, Serialize};

use super::{collect, FieldErrors};
use crate::models::stub::validate_excerpt;
use crate::models::{Stub, StubChanges, StubData, StubName};

/// Raw submission. Absent inputs stay `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StubFormInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    pub background: Option<String>,
    /// "Save" button
    pub save: Option<String>,
    /// "Save and create another" button
    #[serde(rename = "saveAndNew")]
    pub save_and_new: Option<String>,
}

/// Which submit control was activated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    Save,
    SaveAndNew,
}

/// Values shown in the form inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StubFormValues {
    pub name: String,
    pub description: String,
    pub excerpt: String,
    pub background: String,
}

impl From<&Stub> for StubFormValues {
    fn from(stub: &Stub) -> Self {
        Self {
            name: stub.name.clone(),
            description: stub.description.clone(),
            excerpt: stub.excerpt.clone(),
            background: stub.background.clone(),
        }
    }
}

/// Form state handed to the view
#[derive(Debug, Clone, Default, Serialize)]
pub struct StubForm {
    pub values: StubFormValues,
    pub errors: FieldErrors,
    pub submitted: bool,
}

impl StubForm {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Prefilled from a stored record.
    pub fn from_entity(stub: &Stub) -> Self {
        Self {
            values: StubFormValues::from(stub),
            errors: FieldErrors::new(),
            submitted: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl StubFormInput {
    pub fn action(&self) -> SubmitAction {
        if self.save_and_new.is_some() {
            SubmitAction::SaveAndNew
        } else {
            SubmitAction::Save
        }
    }

    /// Bind a creation submission. Absent text inputs count as empty.
    pub fn bind_new(&self) -> Result<StubData, StubForm> {
        let mut errors = FieldErrors::new();
        let name = collect(&mut errors, StubName::new(self.name.as_deref().unwrap_or_default()));
        let excerpt = collect(&mut errors, validate_excerpt(self.excerpt.as_deref().unwrap_or_default()));

        match (name, excerpt) {
            (Some(name), Some(excerpt)) if errors.is_empty() => Ok(StubData {
                name,
                description: trimmed(&self.description).unwrap_or_default(),
                excerpt,
                background: trimmed(&self.background).unwrap_or_default(),
            }),
            _ => Err(self.rejected(StubFormValues::default(), errors)),
        }
    }

    /// Bind an edit submission against the stored record. Only inputs that
    /// were submitted become changes.
    pub fn bind_changes(&self, current: &Stub) -> Result<StubChanges, StubForm> {
        let mut errors = FieldErrors::new();

        let name = match self.name.as_deref() {
            Some(raw) => collect(&mut errors, StubName::new(raw)),
            None => None,
        };
        let excerpt = match self.excerpt.as_deref() {
            Some(raw) => collect(&mut errors, validate_excerpt(raw)),
            None => None,
        };

        if !errors.is_empty() {
            return Err(self.rejected(StubFormValues::from(current), errors));
        }

        Ok(StubChanges {
            name,
            description: trimmed(&self.description),
            excerpt,
            background: trimmed(&self.background),
        })
    }

    /// Form state echoing the submission over `base`.
    fn rejected(&self, base: StubFormValues, errors: FieldErrors) -> StubForm {
        let pick = |submitted: &Option<String>, fallback: String| submitted.clone().unwrap_or(fallback);
        StubForm {
            values: StubFormValues {
                name: pick(&self.name, base.name),
                description: pick(&self.description, base.description),
                excerpt: pick(&self.excerpt, base.excerpt),
                background: pick(&self.background, base.background),
            },
            errors,
            submitted: true,
        }
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|v| v.trim().to_owned())
}
