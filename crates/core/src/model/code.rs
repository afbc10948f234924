use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error type for parsing a country code from string
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid country code: {raw:?} (expected three ASCII letters)")]
pub struct CountryCodeError {
    raw: String,
}

impl CountryCodeError {
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// ISO 3166-1 alpha-3 style key for a country (`FRA`, `DEU`, ...).
///
/// Always stored upper-case so it can be used directly as a set/map key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Creates a validated `CountryCode`.
    ///
    /// # Errors
    ///
    /// Returns `CountryCodeError` unless the trimmed input is exactly three ASCII letters.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CountryCodeError> {
        let raw = raw.as_ref();
        let trimmed = raw.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CountryCodeError {
                raw: raw.to_string(),
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountryCode({})", self.0)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CountryCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_uppercased_and_trimmed() {
        let code = CountryCode::new(" fra ").unwrap();
        assert_eq!(code.as_str(), "FRA");
        assert_eq!(code.to_string(), "FRA");
    }

    #[test]
    fn code_from_str_rejects_wrong_length() {
        assert!("FR".parse::<CountryCode>().is_err());
        assert!("FRAN".parse::<CountryCode>().is_err());
    }

    #[test]
    fn code_rejects_non_letters() {
        let err = CountryCode::new("F1A").unwrap_err();
        assert_eq!(err.raw(), "F1A");
    }

    #[test]
    fn code_string_conversions_roundtrip() {
        let code = CountryCode::try_from("deu".to_string()).unwrap();
        assert_eq!(String::from(code.clone()), "DEU");
        assert_eq!(code, CountryCode::new("DEU").unwrap());
    }
}
