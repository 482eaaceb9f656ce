//! Message catalogs
//!
//! One flat TOML table per locale, embedded at compile time. Lookup order:
//! requested locale, then the default locale, then the key itself.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("../translations/messages.en.toml")),
    ("pl", include_str!("../translations/messages.pl.toml")),
];

type Catalog = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("invalid catalog for locale '{locale}': {source}")]
    Catalog {
        locale: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Translator {
    catalogs: HashMap<String, Catalog>,
    default_locale: String,
}

impl Translator {
    /// Catalogs shipped with the binary.
    pub fn embedded(default_locale: &str) -> Result<Self, I18nError> {
        Self::from_sources(EMBEDDED.iter().copied(), default_locale)
    }

    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
        default_locale: &str,
    ) -> Result<Self, I18nError> {
        let mut catalogs = HashMap::new();
        for (locale, content) in sources {
            let catalog: Catalog = toml::from_str(content).map_err(|source| I18nError::Catalog {
                locale: locale.to_owned(),
                source,
            })?;
            catalogs.insert(locale.to_owned(), catalog);
        }

        Ok(Self {
            catalogs,
            default_locale: default_locale.to_owned(),
        })
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.catalogs.contains_key(locale)
    }

    /// Translate `key`, substituting `{name}` placeholders from `params`.
    pub fn translate(&self, locale: &str, key: &str, params: &[(&str, &str)]) -> String {
        let message = [locale, self.default_locale.as_str()]
            .iter()
            .filter_map(|l| self.catalogs.get(*l))
            .find_map(|catalog| catalog.get(key));

        let Some(message) = message else {
            tracing::debug!(locale, key, "missing translation");
            return key.to_owned();
        };

        params.iter().fold(message.clone(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> Translator {
        Translator::embedded("en").unwrap()
    }

    #[test]
    fn embedded_catalogs_parse() {
        let t = translator();
        assert!(t.has_locale("en"));
        assert!(t.has_locale("pl"));
    }

    #[test]
    fn substitutes_parameters() {
        let title = translator().translate(
            "en",
            "app-edit-therapy-stub-form-title",
            &[("stub_name", "Grief")],
        );
        assert_eq!(title, "Edit therapy stub: Grief");
    }

    #[test]
    fn uses_requested_locale() {
        assert_eq!(
            translator().translate("pl", "app-new-therapy-stub-form-title", &[]),
            "Nowy zalążek terapii"
        );
    }

    #[test]
    fn falls_back_to_default_locale_then_key() {
        let t = translator();
        assert_eq!(t.translate("de", "app-main-title", &[]), "Therapy");
        assert_eq!(t.translate("pl", "app-new-therapy-label-form-title", &[]), "New label");
        assert_eq!(t.translate("en", "no-such-key", &[]), "no-such-key");
    }

    #[test]
    fn rejects_malformed_catalog() {
        let err = Translator::from_sources([("xx", "not = [valid")], "xx").unwrap_err();
        assert!(err.to_string().contains("xx"));
    }
}
