use std::env;

use quiz_core::model::CountryCode;
use storage::repository::ProgressKeys;

/// Non-member entities admitted alongside UN members (Vatican, Palestine, Kosovo, Taiwan).
pub const DEFAULT_EXTRA_CODES: [&str; 4] = ["VAT", "PSE", "UNK", "TWN"];

pub const DEFAULT_DB_URL: &str = "sqlite://geo-quiz.sqlite3";
pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1";
pub const DEFAULT_LOCALE: &str = "fra";

/// Settings for the country catalog client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Key into the catalog's `translations` object (`fra`, `deu`, ...).
    pub translation_locale: String,
    pub extra_codes: Vec<CountryCode>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COUNTRIES_URL.into(),
            translation_locale: DEFAULT_LOCALE.into(),
            extra_codes: parse_codes(&DEFAULT_EXTRA_CODES.join(",")),
        }
    }
}

/// Top-level configuration, resolved from the environment with defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizConfig {
    pub db_url: String,
    pub catalog: CatalogConfig,
    pub progress_keys: ProgressKeys,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.into(),
            catalog: CatalogConfig::default(),
            progress_keys: ProgressKeys::default(),
        }
    }
}

impl QuizConfig {
    /// Read `GEO_QUIZ_*` variables, falling back to defaults for unset or blank values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`QuizConfig::from_env`] with an injectable variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
        };

        let mut config = Self::default();
        if let Some(db_url) = get("GEO_QUIZ_DB_URL") {
            config.db_url = db_url;
        }
        if let Some(base_url) = get("GEO_QUIZ_COUNTRIES_URL") {
            config.catalog.base_url = base_url;
        }
        if let Some(locale) = get("GEO_QUIZ_LOCALE") {
            config.catalog.translation_locale = locale.to_ascii_lowercase();
        }
        if let Some(codes) = get("GEO_QUIZ_EXTRA_CODES") {
            config.catalog.extra_codes = parse_codes(&codes);
        }
        config
    }
}

/// Parse a comma-separated code list, ignoring invalid entries.
#[must_use]
pub fn parse_codes(raw: &str) -> Vec<CountryCode> {
    raw.split(',')
        .filter_map(|part| CountryCode::new(part).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_without_env() {
        let config = QuizConfig::from_lookup(|_| None);
        assert_eq!(config, QuizConfig::default());
        assert_eq!(config.catalog.extra_codes.len(), 4);
    }

    #[test]
    fn env_values_override_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GEO_QUIZ_DB_URL", "sqlite::memory:"),
            ("GEO_QUIZ_LOCALE", " DEU "),
            ("GEO_QUIZ_EXTRA_CODES", "vat, twn,bad-code"),
            ("GEO_QUIZ_COUNTRIES_URL", "   "),
        ]);
        let config = QuizConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_string()));

        assert_eq!(config.db_url, "sqlite::memory:");
        assert_eq!(config.catalog.translation_locale, "deu");
        assert_eq!(config.catalog.base_url, DEFAULT_COUNTRIES_URL);
        assert_eq!(
            config.catalog.extra_codes,
            vec![CountryCode::new("VAT").unwrap(), CountryCode::new("TWN").unwrap()]
        );
    }
}
