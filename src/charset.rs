//! Unicode character-set classes used to break error counts down by script.
//!
//! Classes are fixed code-point ranges and are disjoint: no character belongs to
//! more than one class. Characters outside every class (whitespace, most symbols)
//! are simply not counted.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::editops::{EditOp, editops};
use crate::error::{EvalError, Result};

/// A closed set of disjoint character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharsetClass {
    Latin,
    Greek,
    Numeral,
    Punctuation,
}

const LATIN_RANGES: &[(char, char)] = &[
    ('A', 'Z'),
    ('a', 'z'),
    ('\u{00C0}', '\u{00FF}'),
    ('\u{0152}', '\u{0153}'),
];

// Greek and Coptic, Greek Extended, and the combining diacritics of polytonic Greek.
const GREEK_RANGES: &[(char, char)] = &[
    ('\u{0373}', '\u{03FF}'),
    ('\u{1F00}', '\u{1FFF}'),
    ('\u{0300}', '\u{0301}'),
    ('\u{0308}', '\u{0308}'),
    ('\u{0313}', '\u{0314}'),
    ('\u{0342}', '\u{0342}'),
    ('\u{0345}', '\u{0345}'),
];

const NUMERAL_RANGES: &[(char, char)] = &[('0', '9')];

const PUNCTUATION_RANGES: &[(char, char)] = &[
    ('\u{0021}', '\u{002F}'),
    ('\u{003A}', '\u{003F}'),
    ('\u{005B}', '\u{0060}'),
    ('\u{007B}', '\u{007E}'),
    ('\u{00A8}', '\u{00A8}'),
    ('\u{00B7}', '\u{00B7}'),
];

impl CharsetClass {
    /// All classes, in reporting order.
    pub const ALL: [CharsetClass; 4] = [
        CharsetClass::Latin,
        CharsetClass::Greek,
        CharsetClass::Numeral,
        CharsetClass::Punctuation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CharsetClass::Latin => "latin",
            CharsetClass::Greek => "greek",
            CharsetClass::Numeral => "numeral",
            CharsetClass::Punctuation => "punctuation",
        }
    }

    fn ranges(&self) -> &'static [(char, char)] {
        match self {
            CharsetClass::Latin => LATIN_RANGES,
            CharsetClass::Greek => GREEK_RANGES,
            CharsetClass::Numeral => NUMERAL_RANGES,
            CharsetClass::Punctuation => PUNCTUATION_RANGES,
        }
    }

    pub fn contains(&self, c: char) -> bool {
        self.ranges().iter().any(|&(lo, hi)| lo <= c && c <= hi)
    }

    /// The class of `c`, if any.
    pub fn of(c: char) -> Option<CharsetClass> {
        Self::ALL.into_iter().find(|class| class.contains(c))
    }
}

impl fmt::Display for CharsetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharsetClass {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "latin" => Ok(CharsetClass::Latin),
            "greek" => Ok(CharsetClass::Greek),
            "numeral" | "numbers" => Ok(CharsetClass::Numeral),
            "punctuation" => Ok(CharsetClass::Punctuation),
            _ => Err(EvalError::unknown_charset(s)),
        }
    }
}

/// A charset selector: one of the fixed classes, or a custom pattern.
///
/// Chars are counted by pattern matches over the whole text, so a multi-character
/// pattern counts once per match. Error attribution tests each groundtruth character
/// on its own.
#[derive(Debug, Clone)]
pub enum Charset {
    Class(CharsetClass),
    Pattern(Regex),
}

impl Charset {
    /// Resolves a class name, falling back to compiling `name` as a regex.
    pub fn parse(name: &str) -> Result<Self> {
        if let Ok(class) = name.parse::<CharsetClass>() {
            return Ok(Charset::Class(class));
        }
        Regex::new(name)
            .map(Charset::Pattern)
            .map_err(|_| EvalError::unknown_charset(name))
    }

    pub fn contains(&self, c: char) -> bool {
        match self {
            Charset::Class(class) => class.contains(c),
            Charset::Pattern(pattern) => {
                let mut buf = [0u8; 4];
                pattern.is_match(c.encode_utf8(&mut buf))
            }
        }
    }

    pub fn count_chars(&self, text: &str) -> usize {
        match self {
            Charset::Class(class) => text.chars().filter(|&c| class.contains(c)).count(),
            Charset::Pattern(pattern) => pattern.find_iter(text).count(),
        }
    }

    /// Counts edit operations between `pred_text` and `gt_text` whose groundtruth-side
    /// character belongs to this charset.
    ///
    /// An insertion (extra predicted character) is charged to the groundtruth character
    /// that follows it; an insertion past the end of the groundtruth is not charged.
    pub fn count_errors(&self, gt_text: &str, pred_text: &str) -> usize {
        let gt: Vec<char> = gt_text.chars().collect();
        let pred: Vec<char> = pred_text.chars().collect();
        self.count_errors_in(&gt, &editops(&pred, &gt))
    }

    /// Same as [`Charset::count_errors`] for operations already computed on the
    /// characters of the groundtruth `gt`.
    pub fn count_errors_in(&self, gt: &[char], ops: &[EditOp]) -> usize {
        ops.iter()
            .filter(|op| gt.get(op.gt_pos).is_some_and(|&c| self.contains(c)))
            .count()
    }
}

impl From<CharsetClass> for Charset {
    fn from(class: CharsetClass) -> Self {
        Charset::Class(class)
    }
}

/// Counts the characters of `text` belonging to `charset`.
///
/// `charset` is a class name (`latin`, `greek`, `numeral`/`numbers`, `punctuation`) or
/// a regex whose non-overlapping matches are counted, e.g. `[ô-ÿ]`.
///
/// ```
/// use rust_ocr_eval::count_chars_by_charset;
///
/// assert_eq!(count_chars_by_charset("γεια σας, world", "greek").unwrap(), 7);
/// ```
pub fn count_chars_by_charset(text: &str, charset: &str) -> Result<usize> {
    Ok(Charset::parse(charset)?.count_chars(text))
}

/// Counts the erroneous groundtruth characters of `charset` when `pred_text` is read
/// against `gt_text`.
pub fn count_errors_by_charset(gt_text: &str, pred_text: &str, charset: &str) -> Result<usize> {
    Ok(Charset::parse(charset)?.count_errors(gt_text, pred_text))
}

/// Share of `class` characters among the characters relevant to that class: alphabetic
/// characters for scripts, alphanumeric ones for numerals, all characters for punctuation.
pub fn charset_proportion(text: &str, class: CharsetClass) -> f64 {
    let relevant: Vec<char> = match class {
        CharsetClass::Latin | CharsetClass::Greek => text.chars().filter(|c| c.is_alphabetic()).collect(),
        CharsetClass::Numeral => text.chars().filter(|c| c.is_alphanumeric()).collect(),
        CharsetClass::Punctuation => text.chars().collect(),
    };
    if relevant.is_empty() {
        return 0.0;
    }
    let matching = relevant.iter().filter(|&&c| class.contains(c)).count();
    matching as f64 / relevant.len() as f64
}

/// True when at least `threshold` of the relevant characters of `text` are in `class`.
pub fn is_charset_string(text: &str, class: CharsetClass, threshold: f64) -> bool {
    !text.is_empty() && charset_proportion(text, class) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "abdεθ-:123ξ,";

    #[test]
    fn test_count_chars_by_charset() {
        assert_eq!(count_chars_by_charset(SAMPLE, "latin").unwrap(), 3);
        assert_eq!(count_chars_by_charset(SAMPLE, "greek").unwrap(), 3);
        assert_eq!(count_chars_by_charset(SAMPLE, "numeral").unwrap(), 3);
        assert_eq!(count_chars_by_charset(SAMPLE, "numbers").unwrap(), 3);
        assert_eq!(count_chars_by_charset(SAMPLE, "punctuation").unwrap(), 3);
    }

    #[test]
    fn test_count_errors_by_charset() {
        let pred = "aaedεx-x1x3ξ,";
        assert_eq!(count_errors_by_charset(SAMPLE, pred, "latin").unwrap(), 2);
        assert_eq!(count_errors_by_charset(SAMPLE, pred, "greek").unwrap(), 1);
        assert_eq!(count_errors_by_charset(SAMPLE, pred, "numeral").unwrap(), 1);
        assert_eq!(count_errors_by_charset(SAMPLE, pred, "punctuation").unwrap(), 1);
    }

    #[test]
    fn test_trailing_insertion_is_not_charged() {
        assert_eq!(count_errors_by_charset("abc", "abcd", "latin").unwrap(), 0);
        assert_eq!(count_errors_by_charset("abc", "xabc", "latin").unwrap(), 1);
    }

    #[test]
    fn test_pattern_fallback() {
        assert_eq!(count_chars_by_charset("ôûa", r"[ô-ÿ]").unwrap(), 2);
        // multi-character patterns count whole matches
        assert_eq!(count_chars_by_charset("abcab", "ab").unwrap(), 2);
        assert_eq!(count_chars_by_charset("a b", "ab").unwrap(), 0);
    }

    #[test]
    fn test_unknown_charset() {
        let err = count_chars_by_charset("abc", "[unclosed").unwrap_err();
        assert!(matches!(err, EvalError::UnknownCharset { .. }));
        assert!("cyrillic".parse::<CharsetClass>().is_err());
    }

    #[test]
    fn test_classes_are_disjoint() {
        for code in 0..=0x10FFFFu32 {
            if let Some(c) = char::from_u32(code) {
                let hits = CharsetClass::ALL.iter().filter(|class| class.contains(c)).count();
                assert!(hits <= 1, "U+{:04X} matches {} classes", code, hits);
            }
        }
    }

    #[test]
    fn test_class_counts_bounded_by_length() {
        for text in [SAMPLE, "γεια σας, world", "  \t\n", "Œuvre 1848 — ἀρετή!"] {
            let total: usize = CharsetClass::ALL
                .iter()
                .map(|&class| Charset::from(class).count_chars(text))
                .sum();
            assert!(total <= text.chars().count());
        }
        assert_eq!(count_chars_by_charset("a b", "punctuation").unwrap(), 0);
    }

    #[test]
    fn test_string_predicates() {
        assert!(is_charset_string("λ\u{03CC}γος", CharsetClass::Greek, 0.5));
        assert!(!is_charset_string("logos", CharsetClass::Greek, 0.5));
        assert!(is_charset_string("p. 123", CharsetClass::Numeral, 0.5));
        assert!(!is_charset_string("", CharsetClass::Latin, 0.5));
        assert_eq!(charset_proportion("...", CharsetClass::Latin), 0.0);
    }
}
