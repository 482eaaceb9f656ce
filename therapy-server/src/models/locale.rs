//! Locale codes for the route prefix
//!
//! Format: two lowercase letters, optionally followed by `_` and a region
//! (`en`, `pl`, `pt_BR`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ValidationError;

static LOCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2}(_[A-Z]{2})?$").expect("invalid locale regex"));

/// Validated locale code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "locale" });
        }
        if !LOCALE_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "locale",
                reason: "expected a code like 'en' or 'pt_BR'",
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locales accepted in the route prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportedLocales {
    pub supported: Vec<String>,
    pub default: String,
}

impl Default for SupportedLocales {
    fn default() -> Self {
        Self {
            supported: vec!["en".to_owned(), "pl".to_owned()],
            default: "en".to_owned(),
        }
    }
}

impl SupportedLocales {
    /// Resolve a path segment against the supported set.
    pub fn resolve(&self, segment: &str) -> Option<Locale> {
        if !self.supported.iter().any(|l| l == segment) {
            return None;
        }
        Locale::new(segment).ok()
    }

    pub fn default_locale(&self) -> Locale {
        Locale::new(&self.default).unwrap_or_else(|_| Locale("en".to_owned()))
    }

    /// Every entry must be a well-formed code and the default must be listed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.supported.is_empty() {
            return Err(ValidationError::Empty { field: "locales.supported" });
        }
        for code in &self.supported {
            Locale::new(code)?;
        }
        if !self.supported.contains(&self.default) {
            return Err(ValidationError::InvalidFormat {
                field: "locales.default",
                reason: "default locale must be one of the supported locales",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_format() {
        assert!(Locale::new("en").is_ok());
        assert!(Locale::new("pt_BR").is_ok());
        assert!(Locale::new("EN").is_err());
        assert!(Locale::new("english").is_err());
        assert!(Locale::new("").is_err());
    }

    #[test]
    fn resolves_only_supported() {
        let locales = SupportedLocales::default();
        assert_eq!(locales.resolve("pl").unwrap().as_str(), "pl");
        assert!(locales.resolve("de").is_none());
    }

    #[test]
    fn validate_default_membership() {
        let mut locales = SupportedLocales::default();
        assert!(locales.validate().is_ok());

        locales.default = "de".into();
        assert!(locales.validate().is_err());

        locales.supported = vec![];
        assert!(locales.validate().is_err());
    }
}
