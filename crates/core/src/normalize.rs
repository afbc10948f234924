//! Canonical form used to compare player guesses with country names.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Reduce `text` to lower-case ASCII words separated by single spaces.
///
/// Accents are removed (`"Côte"` -> `"cote"`), every character outside
/// `[a-z0-9]` becomes a separator, and separators are collapsed and trimmed.
/// The result is a fixed point: `normalize(&normalize(s)) == normalize(s)`.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    let chars = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase);

    for ch in chars {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_and_case() {
        assert_eq!(normalize("São Paulo"), "sao paulo");
        assert_eq!(normalize("ÉTATS-UNIS"), "etats unis");
    }

    #[test]
    fn punctuation_becomes_single_space() {
        assert_eq!(normalize("Côte d'Ivoire"), "cote d ivoire");
        assert_eq!(normalize("  Guinea--Bissau!! "), "guinea bissau");
        assert_eq!(normalize("St. Kitts\t&\nNevis"), "st kitts nevis");
    }

    #[test]
    fn empty_and_symbol_only_inputs_are_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("'-.,"), "");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(normalize("Zone 51"), "zone 51");
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "São Tomé and Príncipe",
            "COTE-D'IVOIRE",
            "  Bosnia   and Herzegovina ",
            "Åland",
            "Curaçao",
            "Straße",
            "İstanbul",
            "日本",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
            assert!(once.chars().all(|c| c == ' ' || c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
