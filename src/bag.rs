//! Bag-of-words evaluation: content-only matching that ignores word positions.
//!
//! Each groundtruth word, in input order, is paired with the remaining predicted word
//! at minimal edit distance (earliest one on ties), which is then removed from the
//! pool. Groundtruth words left without a candidate cost their full length, and so do
//! predicted words left over at the end. The pairing is greedy and order-dependent.

use serde::Serialize;

use crate::editops::distance;

/// Running counters of a bag-of-words evaluation. Rates are derived on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BagEvaluationCounts {
    pub gt_words: usize,
    pub pred_words: usize,
    /// Exact matches.
    pub true_words: usize,
    /// Groundtruth characters.
    pub chars: usize,
    /// Summed edit distance, including unmatched words on both sides.
    pub distance: usize,
}

fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 { 0.0 } else { numerator / denominator }
}

impl BagEvaluationCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates one page worth of words into the running counters.
    pub fn add_page<G, P>(&mut self, gt_words: &[G], pred_words: &[P])
    where
        G: AsRef<str>,
        P: AsRef<str>,
    {
        let mut pool: Vec<Vec<char>> = pred_words.iter().map(|w| w.as_ref().chars().collect()).collect();

        self.gt_words += gt_words.len();
        self.pred_words += pred_words.len();

        for gt_word in gt_words {
            let gt: Vec<char> = gt_word.as_ref().chars().collect();
            self.chars += gt.len();

            let best = pool
                .iter()
                .enumerate()
                .map(|(index, pred)| (index, distance(pred, &gt)))
                // first minimum wins
                .min_by_key(|&(_, d)| d);

            match best {
                Some((index, d)) => {
                    if d == 0 {
                        self.true_words += 1;
                    }
                    self.distance += d;
                    pool.remove(index);
                }
                None => self.distance += gt.len(),
            }
        }

        self.distance += pool.iter().map(Vec::len).sum::<usize>();
    }

    /// Adds every counter of `other` into `self`.
    pub fn merge(&mut self, other: &BagEvaluationCounts) {
        self.gt_words += other.gt_words;
        self.pred_words += other.pred_words;
        self.true_words += other.true_words;
        self.chars += other.chars;
        self.distance += other.distance;
    }

    pub fn precision(&self) -> f64 {
        safe_divide(self.true_words as f64, self.pred_words as f64)
    }

    pub fn recall(&self) -> f64 {
        safe_divide(self.true_words as f64, self.gt_words as f64)
    }

    pub fn f1(&self) -> f64 {
        let (precision, recall) = (self.precision(), self.recall());
        safe_divide(2.0 * precision * recall, precision + recall)
    }

    /// Correct word rate.
    pub fn cwr(&self) -> f64 {
        safe_divide(self.true_words as f64, self.gt_words as f64)
    }

    /// Correct character rate.
    pub fn ccr(&self) -> f64 {
        1.0 - safe_divide(self.distance as f64, self.chars as f64)
    }

    pub fn rates(&self) -> BagRates {
        BagRates {
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
            cwr: self.cwr(),
            ccr: self.ccr(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BagRates {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub cwr: f64,
    pub ccr: f64,
}

/// Evaluates a single pair of word bags.
pub fn bag_of_words_evaluation<G, P>(gt_words: &[G], pred_words: &[P]) -> BagEvaluationCounts
where
    G: AsRef<str>,
    P: AsRef<str>,
{
    let mut counts = BagEvaluationCounts::new();
    counts.add_page(gt_words, pred_words);
    counts
}
