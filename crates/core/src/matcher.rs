use std::collections::HashSet;

use crate::aliases::AliasTable;
use crate::model::{Country, GameMode};
use crate::normalize::normalize;

/// Decides whether a raw guess names the given country (or its capital).
///
/// Matching is exact equality after [`normalize`]; there is no partial or
/// typo-tolerant matching.
#[derive(Debug, Clone, Default)]
pub struct AnswerMatcher {
    aliases: AliasTable,
}

impl AnswerMatcher {
    #[must_use]
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    /// Matcher backed by the built-in curated alias table.
    #[must_use]
    pub fn with_builtin_aliases() -> Self {
        Self::new(AliasTable::builtin())
    }

    #[must_use]
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Normalized accepted answers for `country` in `mode`.
    ///
    /// Capital mode accepts only the capitals. Every other mode accepts the
    /// structured names, alt spellings, translations and curated aliases.
    #[must_use]
    pub fn candidates(&self, country: &Country, mode: GameMode) -> HashSet<String> {
        let raw: Vec<&str> = match mode {
            GameMode::Capital => country.capitals().iter().map(String::as_str).collect(),
            GameMode::Learning | GameMode::Survival | GameMode::Custom => {
                let mut names = vec![country.name_common(), country.name_official()];
                names.extend(country.alt_spellings().iter().map(String::as_str));
                names.extend(country.translation_common());
                names.extend(country.translation_official());
                names.extend(
                    self.aliases
                        .aliases_for(country.code())
                        .iter()
                        .map(String::as_str),
                );
                names
            }
        };

        raw.into_iter()
            .map(normalize)
            .filter(|candidate| !candidate.is_empty())
            .collect()
    }

    #[must_use]
    pub fn is_correct(&self, country: &Country, mode: GameMode, guess: &str) -> bool {
        let guess = normalize(guess);
        if guess.is_empty() {
            return false;
        }
        self.candidates(country, mode).contains(&guess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CountryCode;

    fn country(code: &str, common: &str) -> Country {
        Country::new(CountryCode::new(code).unwrap(), common, "").unwrap()
    }

    #[test]
    fn diacritics_and_punctuation_variants_match() {
        let civ = country("CIV", "Côte d'Ivoire");
        let matcher = AnswerMatcher::new(AliasTable::empty());

        for guess in ["cote d ivoire", "COTE-D'IVOIRE", "côte d'ivoire"] {
            assert!(matcher.is_correct(&civ, GameMode::Learning, guess), "{guess}");
        }
        assert!(!matcher.is_correct(&civ, GameMode::Learning, "ghana"));
    }

    #[test]
    fn partial_names_do_not_match() {
        let matcher = AnswerMatcher::default();
        let bih = country("BIH", "Bosnia and Herzegovina");
        assert!(!matcher.is_correct(&bih, GameMode::Survival, "bosnia and"));
        assert!(!matcher.is_correct(&bih, GameMode::Survival, "bosnia and herzegovinaa"));
    }

    #[test]
    fn official_alt_spellings_and_translations_match() {
        let deu = Country::new(
            CountryCode::new("DEU").unwrap(),
            "Germany",
            "Federal Republic of Germany",
        )
        .unwrap()
        .with_alt_spellings(["DE", "Deutschland"])
        .with_translation(Some("Allemagne"), Some("République fédérale d'Allemagne"));
        let matcher = AnswerMatcher::default();

        for guess in [
            "federal republic of germany",
            "deutschland",
            "de",
            "allemagne",
            "republique federale d allemagne",
        ] {
            assert!(matcher.is_correct(&deu, GameMode::Custom, guess), "{guess}");
        }
    }

    #[test]
    fn curated_aliases_apply_outside_capital_mode() {
        let usa = country("USA", "United States");
        let matcher = AnswerMatcher::with_builtin_aliases();
        assert!(matcher.is_correct(&usa, GameMode::Learning, "états-unis"));
        assert!(!matcher.is_correct(&usa, GameMode::Capital, "états-unis"));

        let without = AnswerMatcher::new(AliasTable::empty());
        assert!(!without.is_correct(&usa, GameMode::Learning, "états-unis"));
    }

    #[test]
    fn capital_mode_accepts_any_capital_only() {
        let zaf = country("ZAF", "South Africa").with_capitals([
            "Pretoria",
            "Cape Town",
            "Bloemfontein",
        ]);
        let matcher = AnswerMatcher::default();
        assert!(matcher.is_correct(&zaf, GameMode::Capital, "cape town"));
        assert!(matcher.is_correct(&zaf, GameMode::Capital, "PRETORIA"));
        assert!(!matcher.is_correct(&zaf, GameMode::Capital, "johannesburg"));
        assert!(!matcher.is_correct(&zaf, GameMode::Capital, "south africa"));
    }

    #[test]
    fn country_without_capital_never_matches_in_capital_mode() {
        let ata = country("ATA", "Antarctica");
        let matcher = AnswerMatcher::default();
        assert!(matcher.candidates(&ata, GameMode::Capital).is_empty());
        assert!(!matcher.is_correct(&ata, GameMode::Capital, ""));
        assert!(!matcher.is_correct(&ata, GameMode::Capital, "antarctica"));
    }

    #[test]
    fn empty_guess_never_matches_blank_candidates() {
        let odd = country("XXA", "Xland").with_alt_spellings(["", "--"]);
        let matcher = AnswerMatcher::default();
        assert!(!matcher.is_correct(&odd, GameMode::Learning, "  "));
        assert!(!matcher.candidates(&odd, GameMode::Learning).contains(""));
    }
}
