//! Region-aware error counts for coordinate-based evaluation.
//!
//! Counts are kept per scope (the whole page, or one region type) and per level
//! (words, chars, or one charset class). A word lying in several regions is counted
//! in each of them and always in the global scope. Correctness rates are derived from
//! the counts on demand and never stored.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::charset::CharsetClass;
use crate::document::RegionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Scope {
    Global,
    Region(RegionType),
}

impl Scope {
    /// Global first, then every region type in layout order.
    pub fn all() -> impl Iterator<Item = Scope> {
        std::iter::once(Scope::Global).chain(RegionType::ALL.into_iter().map(Scope::Region))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Region(region_type) => fmt::Display::fmt(region_type, f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Level {
    Words,
    Chars,
    Charset(CharsetClass),
}

impl Level {
    /// Words, chars, then every charset class.
    pub fn all() -> impl Iterator<Item = Level> {
        [Level::Words, Level::Chars]
            .into_iter()
            .chain(CharsetClass::ALL.into_iter().map(Level::Charset))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Words => f.write_str("words"),
            Level::Chars => f.write_str("chars"),
            Level::Charset(class) => fmt::Display::fmt(class, f),
        }
    }
}

/// Counts for one (scope, level) cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Units present in the groundtruth.
    pub total: usize,
    /// Units for which a predicted counterpart was found.
    pub evaluated: usize,
    /// Erroneous units, or edit-distance mass for character levels.
    pub false_count: usize,
}

impl Tally {
    /// `1 - false / evaluated`, or `None` when nothing was evaluated.
    pub fn correctness_rate(&self) -> Option<f64> {
        if self.evaluated == 0 {
            return None;
        }
        Some(1.0 - self.false_count as f64 / self.evaluated as f64)
    }

    fn add(&mut self, other: &Tally) {
        self.total += other.total;
        self.evaluated += other.evaluated;
        self.false_count += other.false_count;
    }
}

/// One reporting row: a (scope, level) cell with its derived rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorCountRow {
    pub scope: String,
    pub level: String,
    pub total: usize,
    pub evaluated: usize,
    pub false_count: usize,
    pub correctness_rate: Option<f64>,
}

/// Accumulates across pages; merging two accumulators adds them cell-wise.
#[derive(Debug, Clone, Default)]
pub struct ErrorCounts {
    cells: BTreeMap<(Scope, Level), Tally>,
}

// Untouched and all-zero cells compare equal.
impl PartialEq for ErrorCounts {
    fn eq(&self, other: &Self) -> bool {
        self.cells
            .keys()
            .chain(other.cells.keys())
            .all(|&(scope, level)| self.get(scope, level) == other.get(scope, level))
    }
}

impl Eq for ErrorCounts {}

impl ErrorCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts for a cell; untouched cells read as zero.
    pub fn get(&self, scope: Scope, level: Level) -> Tally {
        self.cells.get(&(scope, level)).copied().unwrap_or_default()
    }

    pub fn tally_mut(&mut self, scope: Scope, level: Level) -> &mut Tally {
        self.cells.entry((scope, level)).or_default()
    }

    pub fn correctness_rate(&self, scope: Scope, level: Level) -> Option<f64> {
        self.get(scope, level).correctness_rate()
    }

    pub fn merge(&mut self, other: &ErrorCounts) {
        for (key, tally) in &other.cells {
            self.cells.entry(*key).or_default().add(tally);
        }
    }

    /// Correctness rates of every cell. Reading twice without updates in between
    /// gives identical results.
    pub fn finalize(&self) -> BTreeMap<(Scope, Level), Option<f64>> {
        Scope::all()
            .flat_map(|scope| Level::all().map(move |level| (scope, level)))
            .map(|(scope, level)| ((scope, level), self.correctness_rate(scope, level)))
            .collect()
    }

    /// One row per (scope, level), global first, regions in layout order.
    pub fn rows(&self) -> Vec<ErrorCountRow> {
        Scope::all()
            .flat_map(|scope| Level::all().map(move |level| (scope, level)))
            .map(|(scope, level)| {
                let tally = self.get(scope, level);
                ErrorCountRow {
                    scope: scope.to_string(),
                    level: level.to_string(),
                    total: tally.total,
                    evaluated: tally.evaluated,
                    false_count: tally.false_count,
                    correctness_rate: tally.correctness_rate(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cell_rate_is_undefined() {
        let counts = ErrorCounts::new();
        assert_eq!(counts.correctness_rate(Scope::Region(RegionType::Footnote), Level::Words), None);
        assert_eq!(counts.get(Scope::Global, Level::Chars), Tally::default());
    }

    #[test]
    fn test_rate() {
        let mut counts = ErrorCounts::new();
        let tally = counts.tally_mut(Scope::Global, Level::Chars);
        tally.total = 10;
        tally.evaluated = 8;
        tally.false_count = 2;
        assert_eq!(counts.correctness_rate(Scope::Global, Level::Chars), Some(0.75));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut counts = ErrorCounts::new();
        *counts.tally_mut(Scope::Global, Level::Words) = Tally {
            total: 3,
            evaluated: 3,
            false_count: 1,
        };
        let first = counts.finalize();
        let second = counts.finalize();
        assert_eq!(first, second);
        assert_eq!(first.len(), (RegionType::ALL.len() + 1) * 6);
    }

    #[test]
    fn test_rows_order() {
        let rows = ErrorCounts::new().rows();
        assert_eq!(rows[0].scope, "global");
        assert_eq!(rows[0].level, "words");
        assert_eq!(rows[1].level, "chars");
        assert_eq!(rows[2].level, "latin");
        assert_eq!(rows[6].scope, "commentary");
    }

    #[test]
    fn test_merge_adds_cells() {
        let mut a = ErrorCounts::new();
        a.tally_mut(Scope::Global, Level::Words).total = 2;
        let mut b = ErrorCounts::new();
        b.tally_mut(Scope::Global, Level::Words).total = 3;
        b.tally_mut(Scope::Region(RegionType::Title), Level::Words).evaluated = 1;

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        assert_eq!(ab, ba);
        assert_eq!(ab.get(Scope::Global, Level::Words).total, 5);
    }
}
