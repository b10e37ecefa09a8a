//! Unicode harmonisation of OCR and groundtruth texts.
//!
//! OCR engines and transcribers pick different code points for characters that look
//! the same on the page. Before line-level comparison both sides are folded onto one
//! canonical code point per apostrophe, quote and dash.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::config::UnicodeForm;

lazy_static! {
    static ref HARMONISATION_PATTERNS: Vec<(Regex, &'static str)> = {
        vec![
            // Greek koronis, modifier apostrophe and ASCII apostrophe -> right single quote
            (Regex::new(r"[\x{1FBD}\x{02BC}']").unwrap(), "\u{2019}"),
            // em dash -> hyphen-minus
            (Regex::new(r"\x{2014}").unwrap(), "-"),
            // low double quote -> ASCII double quote
            (Regex::new(r"\x{201E}").unwrap(), "\""),
        ]
    };
}

/// Folds visually-equivalent apostrophes, quotes and dashes onto canonical code points.
pub fn harmonise_unicode(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, replacement) in HARMONISATION_PATTERNS.iter() {
        if pattern.is_match(&result) {
            result = pattern.replace_all(&result, *replacement).into_owned();
        }
    }
    result
}

/// Trims, optionally composes or decomposes, then harmonises `text`.
pub fn normalize_text(text: &str, form: Option<UnicodeForm>) -> String {
    let trimmed = text.trim();
    let composed: String = match form {
        Some(UnicodeForm::Nfc) => trimmed.nfc().collect(),
        Some(UnicodeForm::Nfd) => trimmed.nfd().collect(),
        None => trimmed.to_string(),
    };
    harmonise_unicode(&composed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harmonise_apostrophes() {
        assert_eq!(harmonise_unicode("l'homme"), "l\u{2019}homme");
        assert_eq!(harmonise_unicode("δ\u{1FBD}"), "δ\u{2019}");
        assert_eq!(harmonise_unicode("don\u{02BC}t"), "don\u{2019}t");
    }

    #[test]
    fn test_harmonise_dashes_and_quotes() {
        assert_eq!(harmonise_unicode("a\u{2014}b"), "a-b");
        assert_eq!(harmonise_unicode("\u{201E}Ja\""), "\"Ja\"");
        assert_eq!(harmonise_unicode("plain text"), "plain text");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  l'homme\n", None), "l\u{2019}homme");
        // e + combining acute composes to a single scalar
        let composed = normalize_text("e\u{0301}", Some(UnicodeForm::Nfc));
        assert_eq!(composed.chars().count(), 1);
        let decomposed = normalize_text("\u{00E9}", Some(UnicodeForm::Nfd));
        assert_eq!(decomposed.chars().count(), 2);
    }
}
