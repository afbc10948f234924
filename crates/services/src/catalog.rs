use std::collections::HashMap;

use async_trait::async_trait;
use quiz_core::model::{Country, CountryCode};
use reqwest::Client;
use serde::Deserialize;

use crate::config::CatalogConfig;
use crate::error::CatalogError;

const FIELDS: &str = "name,flags,cca3,unMember,translations,region,altSpellings,capital";

/// Source of the country pool.
#[async_trait]
pub trait CountrySource: Send + Sync {
    /// Retrieve the finalized pool of countries.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the pool cannot be retrieved or parsed.
    async fn fetch_countries(&self) -> Result<Vec<Country>, CatalogError>;
}

/// Client for the public REST Countries API.
#[derive(Clone)]
pub struct RestCountriesClient {
    client: Client,
    config: CatalogConfig,
}

impl RestCountriesClient {
    #[must_use]
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    async fn fetch_countries(&self) -> Result<Vec<Country>, CatalogError> {
        let url = format!("{}/all", self.config.base_url.trim_end_matches('/'));
        tracing::debug!(%url, "fetching country catalog");

        let response = self
            .client
            .get(url)
            .query(&[("fields", FIELDS)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        parse_countries(&body, &self.config)
    }
}

/// Fixed pool, for tests and offline play.
#[derive(Clone, Debug, Default)]
pub struct StaticCountrySource {
    countries: Vec<Country>,
}

impl StaticCountrySource {
    #[must_use]
    pub fn new(countries: Vec<Country>) -> Self {
        Self { countries }
    }
}

#[async_trait]
impl CountrySource for StaticCountrySource {
    async fn fetch_countries(&self) -> Result<Vec<Country>, CatalogError> {
        if self.countries.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(self.countries.clone())
    }
}

/// Parse a REST Countries payload into the reference pool.
///
/// Keeps UN members plus `config.extra_codes`. Entries with an unusable code or
/// name are skipped with a warning; duplicate codes keep the first entry.
///
/// # Errors
///
/// Returns `CatalogError::Parse` for malformed JSON and `CatalogError::Empty`
/// when nothing survives filtering.
pub fn parse_countries(json: &str, config: &CatalogConfig) -> Result<Vec<Country>, CatalogError> {
    let raw: Vec<RawCountry> = serde_json::from_str(json)?;
    let mut seen = std::collections::HashSet::new();
    let mut countries = Vec::with_capacity(raw.len());

    for entry in raw {
        let code = match CountryCode::new(&entry.cca3) {
            Ok(code) => code,
            Err(err) => {
                tracing::warn!(%err, "skipping catalog entry");
                continue;
            }
        };
        if !entry.un_member && !config.extra_codes.contains(&code) {
            continue;
        }
        if !seen.insert(code.clone()) {
            tracing::warn!(%code, "duplicate catalog entry ignored");
            continue;
        }

        let translation = entry.translations.get(&config.translation_locale);
        let country = match Country::new(code.clone(), entry.name.common, entry.name.official) {
            Ok(country) => country,
            Err(err) => {
                tracing::warn!(%code, %err, "skipping catalog entry");
                continue;
            }
        };

        countries.push(
            country
                .with_alt_spellings(entry.alt_spellings)
                .with_translation(
                    translation.and_then(|t| t.common.clone()),
                    translation.and_then(|t| t.official.clone()),
                )
                .with_capitals(entry.capital)
                .with_region(entry.region)
                .with_flag(entry.flags.png.or(entry.flags.svg), entry.flags.alt),
        );
    }

    if countries.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(countries)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCountry {
    name: RawName,
    cca3: String,
    #[serde(default)]
    un_member: bool,
    #[serde(default)]
    alt_spellings: Vec<String>,
    #[serde(default)]
    translations: HashMap<String, RawTranslation>,
    #[serde(default)]
    region: String,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    flags: RawFlags,
}

#[derive(Debug, Deserialize)]
struct RawName {
    common: String,
    #[serde(default)]
    official: String,
}

#[derive(Debug, Deserialize)]
struct RawTranslation {
    common: Option<String>,
    official: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFlags {
    png: Option<String>,
    svg: Option<String>,
    alt: Option<String>,
}
