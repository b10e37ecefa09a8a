//! Coordinate-based evaluation: words are matched by box overlap, not by content.
//!
//! For each groundtruth word, in page order:
//! - its scopes are resolved (global, plus every region type whose box contains it),
//!   and its totals are counted in each of them;
//! - the first remaining predicted word whose box overlaps it to the threshold in both
//!   directions is taken as its counterpart and removed from the pool;
//! - if a counterpart exists, the pair is scored and its edit operations recorded;
//!   otherwise the word only counts towards `total`.
//!
//! Predicted words left in the pool are not charged. Matching is first-fit and
//! depends on word order.

use serde::Serialize;

use crate::charset::{Charset, CharsetClass};
use crate::config::EvaluationConfig;
use crate::counts::{ErrorCounts, Level, Scope};
use crate::document::{PageLike, RegionLike, RegionType, WordLike};
use crate::editops::editops;
use crate::error::Result;
use crate::geometry::BoundingBox;
use crate::record::EditOperationsRecord;

/// A rendering surface receiving the words of a page for visual diffing.
pub trait DiffSurface {
    fn insert_word(&mut self, text: &str, bbox: &BoundingBox, is_groundtruth: bool, is_false: bool, matched: bool);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiff;

impl DiffSurface for NoDiff {
    fn insert_word(&mut self, _text: &str, _bbox: &BoundingBox, _is_groundtruth: bool, _is_false: bool, _matched: bool) {}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub text: String,
    pub bbox: BoundingBox,
    pub is_groundtruth: bool,
    pub is_false: bool,
    pub matched: bool,
}

/// The words of one page, tagged for rendering by an external reporter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffLayer {
    pub page_id: String,
    pub entries: Vec<DiffEntry>,
}

impl DiffLayer {
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            entries: Vec::new(),
        }
    }
}

impl DiffSurface for DiffLayer {
    fn insert_word(&mut self, text: &str, bbox: &BoundingBox, is_groundtruth: bool, is_false: bool, matched: bool) {
        self.entries.push(DiffEntry {
            text: text.to_string(),
            bbox: *bbox,
            is_groundtruth,
            is_false,
            matched,
        });
    }
}

/// Matched vs. total groundtruth words of one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub gt_words: usize,
    pub matched_words: usize,
    pub unmatched_predictions: usize,
}

/// Running region-aware counts and edit operations over any number of pages.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateEvaluator {
    word_overlap_threshold: f64,
    region_inclusion_threshold: f64,
    counts: ErrorCounts,
    editops: EditOperationsRecord,
}

impl CoordinateEvaluator {
    pub fn new(config: &EvaluationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            word_overlap_threshold: config.word_overlap_threshold,
            region_inclusion_threshold: config.region_inclusion_threshold,
            counts: ErrorCounts::new(),
            editops: EditOperationsRecord::new(),
        })
    }

    pub fn counts(&self) -> &ErrorCounts {
        &self.counts
    }

    pub fn editops(&self) -> &EditOperationsRecord {
        &self.editops
    }

    pub fn into_parts(self) -> (ErrorCounts, EditOperationsRecord) {
        (self.counts, self.editops)
    }

    /// Adds counts and edit operations of `other` into `self`.
    pub fn merge(&mut self, other: &CoordinateEvaluator) {
        self.counts.merge(&other.counts);
        self.editops.merge(&other.editops);
    }

    /// Evaluates one page pair into the running counts.
    pub fn add_page<G, P>(&mut self, gt_page: &G, pred_page: &P, surface: &mut dyn DiffSurface) -> PageSummary
    where
        G: PageLike,
        P: PageLike,
    {
        // the pool is scoped to this call
        let mut pool: Vec<&P::Word> = pred_page.words().iter().collect();
        let mut summary = PageSummary {
            gt_words: gt_page.words().len(),
            ..Default::default()
        };

        for gt_word in gt_page.words() {
            let scopes = word_scopes(gt_word, gt_page.regions(), self.region_inclusion_threshold);
            let gt_chars: Vec<char> = gt_word.text().chars().collect();
            let charset_counts: Vec<(CharsetClass, usize)> = CharsetClass::ALL
                .into_iter()
                .map(|class| (class, gt_chars.iter().filter(|&&c| class.contains(c)).count()))
                .collect();

            for &scope in &scopes {
                self.counts.tally_mut(scope, Level::Words).total += 1;
                self.counts.tally_mut(scope, Level::Chars).total += gt_chars.len();
                for &(class, count) in &charset_counts {
                    self.counts.tally_mut(scope, Level::Charset(class)).total += count;
                }
            }

            let found = pool
                .iter()
                .position(|pred| pred.bbox().overlaps_with_threshold(gt_word.bbox(), self.word_overlap_threshold));

            let Some(index) = found else {
                surface.insert_word(gt_word.text(), gt_word.bbox(), true, true, false);
                continue;
            };
            let pred_word = pool.remove(index);
            summary.matched_words += 1;

            let pred_chars: Vec<char> = pred_word.text().chars().collect();
            let ops = editops(&pred_chars, &gt_chars);
            let distance = ops.len();
            let charset_errors: Vec<(CharsetClass, usize)> = CharsetClass::ALL
                .into_iter()
                .map(|class| (class, Charset::from(class).count_errors_in(&gt_chars, &ops)))
                .collect();

            for &scope in &scopes {
                let words = self.counts.tally_mut(scope, Level::Words);
                words.evaluated += 1;
                words.false_count += distance.min(1);

                let chars = self.counts.tally_mut(scope, Level::Chars);
                chars.evaluated += gt_chars.len();
                chars.false_count += distance;

                for (&(class, count), &(_, errors)) in charset_counts.iter().zip(&charset_errors) {
                    let tally = self.counts.tally_mut(scope, Level::Charset(class));
                    tally.evaluated += count;
                    tally.false_count += errors;
                }
            }

            self.editops.record(gt_word.text(), pred_word.text(), &ops);

            let is_false = distance > 0;
            surface.insert_word(gt_word.text(), gt_word.bbox(), true, is_false, true);
            surface.insert_word(pred_word.text(), pred_word.bbox(), false, is_false, true);
        }

        summary.unmatched_predictions = pool.len();
        for pred_word in pool {
            surface.insert_word(pred_word.text(), pred_word.bbox(), false, true, false);
        }

        tracing::debug!(
            "Page {}: matched {} of {} groundtruth words, {} predicted words left over",
            gt_page.id(),
            summary.matched_words,
            summary.gt_words,
            summary.unmatched_predictions
        );

        summary
    }
}

/// Global, plus each region type enclosing `word`. Each type appears once even when
/// several regions of that type contain the word.
fn word_scopes<W, R>(word: &W, regions: &[R], inclusion_threshold: f64) -> Vec<Scope>
where
    W: WordLike,
    R: RegionLike,
{
    let mut region_types: Vec<RegionType> = match word.region_types() {
        Some(types) => types.to_vec(),
        None => regions
            .iter()
            .filter(|region| word.bbox().is_within_with_threshold(region.bbox(), inclusion_threshold))
            .map(|region| region.region_type())
            .collect(),
    };
    region_types.sort();
    region_types.dedup();

    std::iter::once(Scope::Global)
        .chain(region_types.into_iter().map(Scope::Region))
        .collect()
}

/// Character error rate over spatially matched words only, without region breakdown.
///
/// Groundtruth words with no overlapping prediction are left out entirely. Returns 0
/// when no word could be matched.
pub fn simple_coordinates_based_evaluation<G, P>(gt_words: &[G], pred_words: &[P], overlap_threshold: f64) -> f64
where
    G: WordLike,
    P: WordLike,
{
    let mut pool: Vec<&P> = pred_words.iter().collect();
    let mut matched_words = 0usize;
    let mut total_characters = 0usize;
    let mut total_edit_distance = 0usize;

    for gt_word in gt_words {
        let found = pool
            .iter()
            .position(|pred| pred.bbox().overlaps_with_threshold(gt_word.bbox(), overlap_threshold));
        if let Some(index) = found {
            let pred_word = pool.remove(index);
            total_characters += gt_word.text().chars().count();
            total_edit_distance += crate::editops::char_distance(pred_word.text(), gt_word.text());
            matched_words += 1;
        }
    }

    tracing::info!(
        "Evaluating on {} words, for a total of {} words.",
        matched_words,
        gt_words.len()
    );

    if total_characters == 0 {
        return 0.0;
    }
    total_edit_distance as f64 / total_characters as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Page, Region, Word};
    use crate::editops::EditKind;
    use crate::record::EMPTY_SIDE;

    fn bbox(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> BoundingBox {
        BoundingBox::new(xmin, ymin, xmax, ymax).unwrap()
    }

    fn word(text: &str, x: f64) -> Word {
        Word::new(text, bbox(x, 0.0, x + 10.0, 10.0))
    }

    fn evaluator() -> CoordinateEvaluator {
        CoordinateEvaluator::new(&EvaluationConfig::default()).unwrap()
    }

    #[test]
    fn test_single_page_counts() {
        let gt = Page::new("p1")
            .with_words(vec![word("maison", 0.0), word("je", 20.0), word("λ\u{03CC}γος", 40.0)])
            .with_regions(vec![Region::new(RegionType::Commentary, bbox(0.0, 0.0, 100.0, 10.0))]);
        let pred = Page::new("p1").with_words(vec![word("maeson", 1.0), word("je", 20.0), word("λογος", 40.0)]);

        let mut evaluator = evaluator();
        let summary = evaluator.add_page(&gt, &pred, &mut NoDiff);
        assert_eq!(summary.matched_words, 3);

        let counts = evaluator.counts();
        for scope in [Scope::Global, Scope::Region(RegionType::Commentary)] {
            let words = counts.get(scope, Level::Words);
            assert_eq!((words.total, words.evaluated, words.false_count), (3, 3, 2));
            let chars = counts.get(scope, Level::Chars);
            assert_eq!((chars.total, chars.evaluated, chars.false_count), (13, 13, 2));
        }
        assert_eq!(counts.get(Scope::Global, Level::Charset(CharsetClass::Latin)).false_count, 1);
        assert_eq!(counts.get(Scope::Global, Level::Charset(CharsetClass::Greek)).false_count, 1);
        assert_eq!(counts.get(Scope::Region(RegionType::Footnote), Level::Words).total, 0);
        assert_eq!(counts.correctness_rate(Scope::Region(RegionType::Footnote), Level::Words), None);
        assert_eq!(evaluator.editops().get("i", "e", EditKind::Substitute), 1);
    }

    #[test]
    fn test_overlapping_regions_count_twice() {
        let gt = Page::new("p1")
            .with_words(vec![word("ab", 0.0), word("cd", 50.0)])
            .with_regions(vec![
                Region::new(RegionType::Commentary, bbox(0.0, 0.0, 100.0, 10.0)),
                Region::new(RegionType::Footnote, bbox(0.0, 0.0, 20.0, 10.0)),
            ]);
        let pred = Page::new("p1").with_words(vec![word("ax", 0.0), word("cd", 50.0)]);

        let mut evaluator = evaluator();
        evaluator.add_page(&gt, &pred, &mut NoDiff);
        let counts = evaluator.counts();

        assert_eq!(counts.get(Scope::Global, Level::Words).total, 2);
        assert_eq!(counts.get(Scope::Region(RegionType::Commentary), Level::Words).total, 2);
        let footnote = counts.get(Scope::Region(RegionType::Footnote), Level::Words);
        assert_eq!((footnote.total, footnote.evaluated, footnote.false_count), (1, 1, 1));
        assert_eq!(counts.get(Scope::Region(RegionType::Commentary), Level::Words).false_count, 1);
    }

    #[test]
    fn test_unmatched_words_only_count_in_total() {
        let gt = Page::new("p1").with_words(vec![word("ab", 0.0), word("cd", 50.0)]);
        // second prediction is far away; an extra spurious word is not charged
        let pred = Page::new("p1").with_words(vec![word("ab", 0.0), word("zz", 200.0), word("yy", 300.0)]);

        let mut evaluator = evaluator();
        let mut layer = DiffLayer::new("p1");
        let summary = evaluator.add_page(&gt, &pred, &mut layer);
        assert_eq!(summary.matched_words, 1);
        assert_eq!(summary.unmatched_predictions, 2);

        let words = evaluator.counts().get(Scope::Global, Level::Words);
        assert_eq!((words.total, words.evaluated, words.false_count), (2, 1, 0));
        assert_eq!(evaluator.counts().correctness_rate(Scope::Global, Level::Words), Some(1.0));

        assert_eq!(layer.entries.len(), 5);
        assert_eq!(layer.entries.iter().filter(|e| e.matched).count(), 2);
        assert!(layer.entries.iter().filter(|e| !e.matched).all(|e| e.is_false));
    }

    #[test]
    fn test_first_fit_not_best_fit() {
        let gt = Page::new("p1").with_words(vec![word("ab", 0.0)]);
        // both overlap enough; the first one wins even though the second is exact
        let pred = Page::new("p1").with_words(vec![word("xy", 1.0), word("ab", 0.0)]);

        let mut evaluator = evaluator();
        evaluator.add_page(&gt, &pred, &mut NoDiff);
        assert_eq!(evaluator.counts().get(Scope::Global, Level::Words).false_count, 1);
        assert_eq!(evaluator.editops().get("a", "x", EditKind::Substitute), 1);
        assert_eq!(evaluator.editops().get(EMPTY_SIDE, "x", EditKind::Insert), 0);
    }

    #[test]
    fn test_preresolved_region_types() {
        let gt = Page::new("p1").with_words(vec![
            word("ab", 0.0).with_region_types(vec![RegionType::Title, RegionType::Title, RegionType::Preface]),
        ]);
        let pred = Page::new("p1").with_words(vec![word("ab", 0.0)]);

        let mut evaluator = evaluator();
        evaluator.add_page(&gt, &pred, &mut NoDiff);
        assert_eq!(evaluator.counts().get(Scope::Region(RegionType::Title), Level::Words).total, 1);
        assert_eq!(evaluator.counts().get(Scope::Region(RegionType::Preface), Level::Words).total, 1);
    }

    #[test]
    fn test_sequential_pages_equal_merged_pages() {
        let page_a = (
            Page::new("a").with_words(vec![word("maison", 0.0), word("je", 20.0)]),
            Page::new("a").with_words(vec![word("maeson", 0.0), word("ie", 20.0)]),
        );
        let page_b = (
            Page::new("b")
                .with_words(vec![word("soleil", 0.0)])
                .with_regions(vec![Region::new(RegionType::Title, bbox(0.0, 0.0, 50.0, 10.0))]),
            Page::new("b").with_words(vec![word("so1eil", 0.0)]),
        );

        let mut sequential = evaluator();
        sequential.add_page(&page_a.0, &page_a.1, &mut NoDiff);
        sequential.add_page(&page_b.0, &page_b.1, &mut NoDiff);

        let mut merged = evaluator();
        merged.add_page(&page_a.0, &page_a.1, &mut NoDiff);
        let mut separate = evaluator();
        separate.add_page(&page_b.0, &page_b.1, &mut NoDiff);
        merged.merge(&separate);

        assert_eq!(sequential.counts(), merged.counts());
        assert_eq!(sequential.editops(), merged.editops());
        assert_eq!(sequential.counts().finalize(), merged.counts().finalize());
    }

    #[test]
    fn test_simple_coordinates_based_evaluation() {
        let gt = vec![word("maison", 0.0), word("je", 20.0), word("lost", 500.0)];
        let pred = vec![word("maeson", 0.0), word("je", 20.0)];
        let cer = simple_coordinates_based_evaluation(&gt, &pred, 0.8);
        assert_eq!(cer, 1.0 / 8.0);
        assert_eq!(simple_coordinates_based_evaluation::<Word, Word>(&gt, &[], 0.8), 0.0);
    }
}
