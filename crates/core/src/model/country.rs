use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::code::CountryCode;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CountryError {
    #[error("common name cannot be empty")]
    EmptyCommonName,
}

//
// ─── COUNTRY ───────────────────────────────────────────────────────────────────
//

/// A country as delivered by the catalog. Read-only to the quiz engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    code: CountryCode,
    name_common: String,
    name_official: String,
    alt_spellings: Vec<String>,
    translation_common: Option<String>,
    translation_official: Option<String>,
    capitals: Vec<String>,
    region: String,
    flag_url: Option<String>,
    flag_alt: Option<String>,
}

impl Country {
    /// Creates a country with its two structured names.
    ///
    /// An empty official name falls back to the common name.
    ///
    /// # Errors
    ///
    /// Returns `CountryError::EmptyCommonName` if the common name is blank.
    pub fn new(
        code: CountryCode,
        name_common: impl Into<String>,
        name_official: impl Into<String>,
    ) -> Result<Self, CountryError> {
        let name_common = name_common.into().trim().to_string();
        if name_common.is_empty() {
            return Err(CountryError::EmptyCommonName);
        }
        let name_official = name_official.into().trim().to_string();
        let name_official = if name_official.is_empty() {
            name_common.clone()
        } else {
            name_official
        };

        Ok(Self {
            code,
            name_common,
            name_official,
            alt_spellings: Vec::new(),
            translation_common: None,
            translation_official: None,
            capitals: Vec::new(),
            region: String::new(),
            flag_url: None,
            flag_alt: None,
        })
    }

    #[must_use]
    pub fn with_alt_spellings<I, S>(mut self, spellings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alt_spellings = spellings.into_iter().map(Into::into).collect();
        self
    }

    /// Attach target-locale names. Blank values are treated as absent.
    #[must_use]
    pub fn with_translation(
        mut self,
        common: Option<impl Into<String>>,
        official: Option<impl Into<String>>,
    ) -> Self {
        self.translation_common = non_blank(common.map(Into::into));
        self.translation_official = non_blank(official.map(Into::into));
        self
    }

    #[must_use]
    pub fn with_capitals<I, S>(mut self, capitals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capitals = capitals.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    #[must_use]
    pub fn with_flag(mut self, url: Option<String>, alt: Option<String>) -> Self {
        self.flag_url = non_blank(url);
        self.flag_alt = non_blank(alt);
        self
    }

    #[must_use]
    pub fn code(&self) -> &CountryCode {
        &self.code
    }

    #[must_use]
    pub fn name_common(&self) -> &str {
        &self.name_common
    }

    #[must_use]
    pub fn name_official(&self) -> &str {
        &self.name_official
    }

    #[must_use]
    pub fn alt_spellings(&self) -> &[String] {
        &self.alt_spellings
    }

    #[must_use]
    pub fn translation_common(&self) -> Option<&str> {
        self.translation_common.as_deref()
    }

    #[must_use]
    pub fn translation_official(&self) -> Option<&str> {
        self.translation_official.as_deref()
    }

    #[must_use]
    pub fn capitals(&self) -> &[String] {
        &self.capitals
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn flag_url(&self) -> Option<&str> {
        self.flag_url.as_deref()
    }

    #[must_use]
    pub fn flag_alt(&self) -> Option<&str> {
        self.flag_alt.as_deref()
    }

    /// Name shown to the player: the translation when present, else the common name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.translation_common().unwrap_or(&self.name_common)
    }

    /// Region comparison used for pool filtering (exact, case-insensitive).
    #[must_use]
    pub fn in_region(&self, region: &str) -> bool {
        self.region.eq_ignore_ascii_case(region.trim())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> CountryCode {
        CountryCode::new(raw).unwrap()
    }

    #[test]
    fn blank_common_name_is_rejected() {
        let err = Country::new(code("FRA"), "   ", "French Republic").unwrap_err();
        assert_eq!(err, CountryError::EmptyCommonName);
    }

    #[test]
    fn official_name_falls_back_to_common() {
        let country = Country::new(code("FRA"), "France", "").unwrap();
        assert_eq!(country.name_official(), "France");
    }

    #[test]
    fn display_name_prefers_translation() {
        let country = Country::new(code("DEU"), "Germany", "Federal Republic of Germany")
            .unwrap()
            .with_translation(Some("Allemagne"), Some("République fédérale d'Allemagne"));
        assert_eq!(country.display_name(), "Allemagne");

        let untranslated = Country::new(code("DEU"), "Germany", "")
            .unwrap()
            .with_translation(Some(" "), None::<String>);
        assert_eq!(untranslated.display_name(), "Germany");
        assert_eq!(untranslated.translation_common(), None);
    }

    #[test]
    fn region_match_ignores_case() {
        let country = Country::new(code("FRA"), "France", "")
            .unwrap()
            .with_region("Europe");
        assert!(country.in_region("europe"));
        assert!(!country.in_region("Asia"));
    }
}
