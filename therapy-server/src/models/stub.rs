//! Stub records and their validated inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::check_len;
use super::ValidationError;

/// Maximum length for stub names
const MAX_NAME_LEN: usize = 255;

/// Maximum length for stub excerpts
const MAX_EXCERPT_LEN: usize = 1000;

/// Persisted stub record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Stub {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub excerpt: String,
    pub background: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stub {
    /// The four columns free-text search looks at.
    pub fn searchable_fields(&self) -> [&str; 4] {
        [&self.name, &self.description, &self.excerpt, &self.background]
    }
}

/// Validated stub name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubName(String);

impl StubName {
    /// Create a new stub name.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 255 characters
    ///
    /// # Example
    /// ```
    /// use therapy_server::models::StubName;
    ///
    /// assert!(StubName::new("Anxiety").is_ok());
    /// assert!(StubName::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        check_len("name", trimmed, MAX_NAME_LEN)?;

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for StubName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate an excerpt; surrounding whitespace is dropped.
pub fn validate_excerpt(s: &str) -> Result<String, ValidationError> {
    let trimmed = s.trim();
    check_len("excerpt", trimmed, MAX_EXCERPT_LEN)?;
    Ok(trimmed.to_owned())
}

/// Everything needed to persist a new stub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubData {
    pub name: StubName,
    pub description: String,
    pub excerpt: String,
    pub background: String,
}

impl StubData {
    pub fn new(
        name: &str,
        description: &str,
        excerpt: &str,
        background: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: StubName::new(name)?,
            description: description.trim().to_owned(),
            excerpt: validate_excerpt(excerpt)?,
            background: background.trim().to_owned(),
        })
    }
}

/// Field-level update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubChanges {
    pub name: Option<StubName>,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    pub background: Option<String>,
}

impl StubChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.excerpt.is_none()
            && self.background.is_none()
    }

    /// Apply in place. Returns true when any field was present.
    pub fn apply_to(&self, stub: &mut Stub) -> bool {
        if let Some(name) = &self.name {
            stub.name = name.as_str().to_owned();
        }
        if let Some(description) = &self.description {
            stub.description = description.clone();
        }
        if let Some(excerpt) = &self.excerpt {
            stub.excerpt = excerpt.clone();
        }
        if let Some(background) = &self.background {
            stub.background = background.clone();
        }
        !self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub() -> Stub {
        let now = Utc::now();
        Stub {
            id: 1,
            name: "Anxiety".into(),
            description: "Worry".into(),
            excerpt: "Short".into(),
            background: "Long".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn name_rules() {
        assert_eq!(StubName::new("  Grief  ").unwrap().as_str(), "Grief");
        assert!(matches!(
            StubName::new("").unwrap_err(),
            ValidationError::Empty { field: "name" }
        ));

        assert!(StubName::new(&"a".repeat(255)).is_ok());
        let err = StubName::new(&"a".repeat(256)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 255, .. }));
    }

    #[test]
    fn excerpt_limit() {
        assert!(validate_excerpt(&"x".repeat(1000)).is_ok());
        assert!(validate_excerpt(&"x".repeat(1001)).is_err());
    }

    #[test]
    fn data_allows_empty_text_fields() {
        let data = StubData::new("Anger", "", "", "").unwrap();
        assert_eq!(data.name.as_str(), "Anger");
        assert!(data.description.is_empty());
    }

    #[test]
    fn changes_touch_only_present_fields() {
        let mut record = stub();
        let changes = StubChanges {
            excerpt: Some("New excerpt".into()),
            ..Default::default()
        };

        assert!(changes.apply_to(&mut record));
        assert_eq!(record.excerpt, "New excerpt");
        assert_eq!(record.name, "Anxiety");
        assert_eq!(record.description, "Worry");
        assert_eq!(record.background, "Long");
    }

    #[test]
    fn empty_changes_are_a_no_op() {
        let mut record = stub();
        let before = record.clone();
        assert!(!StubChanges::default().apply_to(&mut record));
        assert_eq!(record, before);
    }
}
