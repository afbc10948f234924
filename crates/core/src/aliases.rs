//! Hand-maintained informal names that the catalog does not carry.

use std::collections::HashMap;

use crate::model::CountryCode;

/// French-locale short forms, abbreviations and historical names, keyed by code.
const FRENCH_ALIASES: &[(&str, &[&str])] = &[
    ("ARE", &["Emirats", "EAU", "Emirats arabes"]),
    ("BEN", &["Dahomey"]),
    ("BFA", &["Haute-Volta"]),
    ("BIH", &["Bosnie"]),
    ("CAF", &["Centrafrique", "RCA"]),
    ("CIV", &["Cote d'Ivoire"]),
    ("COD", &["RDC", "Congo-Kinshasa", "Zaire"]),
    ("COG", &["Congo-Brazzaville"]),
    ("CPV", &["Cap-Vert"]),
    ("CZE", &["Tchequie"]),
    ("DOM", &["Republique dominicaine"]),
    ("FSM", &["Micronesie"]),
    ("GBR", &["Angleterre", "Royaume-Uni", "UK", "Grande-Bretagne"]),
    ("GNQ", &["Guinee equatoriale"]),
    ("IRN", &["Perse"]),
    ("KHM", &["Cambodge", "Kampuchea"]),
    ("KOR", &["Coree du Sud"]),
    ("LKA", &["Ceylan"]),
    ("MDA", &["Moldavie"]),
    ("MKD", &["Macedoine", "Macedoine du Nord"]),
    ("MMR", &["Birmanie"]),
    ("NLD", &["Hollande"]),
    ("PRK", &["Coree du Nord"]),
    ("PSE", &["Palestine"]),
    ("RUS", &["Russie"]),
    ("STP", &["Sao Tome"]),
    ("SWZ", &["Swaziland"]),
    ("TLS", &["Timor oriental"]),
    ("TWN", &["Taiwan", "Formose"]),
    ("UNK", &["Kosovo"]),
    ("USA", &["Etats-Unis", "USA", "Amerique"]),
    ("VAT", &["Vatican", "Saint-Siege"]),
    ("ZWE", &["Rhodesie"]),
];

/// Lookup of extra accepted names per country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<CountryCode, Vec<String>>,
}

impl AliasTable {
    /// Table with no aliases at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The curated French-locale table shipped with the game.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (raw, aliases) in FRENCH_ALIASES {
            // The table is static; a malformed key would simply never match.
            let Ok(code) = CountryCode::new(raw) else {
                continue;
            };
            for alias in *aliases {
                table = table.with_alias(code.clone(), *alias);
            }
        }
        table
    }

    #[must_use]
    pub fn with_alias(mut self, code: CountryCode, alias: impl Into<String>) -> Self {
        self.entries.entry(code).or_default().push(alias.into());
        self
    }

    /// Aliases for `code`; empty when the table has no entry.
    #[must_use]
    pub fn aliases_for(&self, code: &CountryCode) -> &[String] {
        self.entries.get(code).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
