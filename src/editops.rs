//! Levenshtein distance and edit operations over arbitrary token sequences.
//!
//! Tokens are characters for character-level evaluation and words for word-level
//! evaluation. Operations are expressed from the point of view of the OCR output:
//! reading `pred` against `gt`, an extra predicted token is an insertion and a
//! groundtruth token absent from the prediction is a deletion.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Substitute,
    Insert,
    Delete,
}

impl EditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditKind::Substitute => "substitute",
            EditKind::Insert => "insert",
            EditKind::Delete => "delete",
        }
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single edit operation.
///
/// - `Substitute`: `pred[pred_pos]` stands for `gt[gt_pos]`.
/// - `Insert`: `pred[pred_pos]` is spurious; `gt_pos` is the index of the groundtruth
///   token that follows it (may equal `gt.len()`).
/// - `Delete`: `gt[gt_pos]` is missing; `pred_pos` is the index of the predicted token
///   that follows the gap (may equal `pred.len()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOp {
    pub kind: EditKind,
    pub pred_pos: usize,
    pub gt_pos: usize,
}

// Row-major (len(a) + 1) x (len(b) + 1) cost matrix.
fn cost_matrix<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Vec<usize>> {
    let mut d = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in d[0].iter_mut().enumerate() {
        *cell = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            d[i][j] = (d[i - 1][j - 1] + cost).min(d[i - 1][j] + 1).min(d[i][j - 1] + 1);
        }
    }
    d
}

/// Levenshtein distance between two token sequences.
pub fn distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    // Two-row variant; the full matrix is only needed for backtracking.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ta) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, tb) in b.iter().enumerate() {
            let cost = usize::from(ta != tb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Character-level Levenshtein distance.
pub fn char_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    distance(&a, &b)
}

/// Word-level Levenshtein distance over whitespace-separated tokens.
pub fn word_distance(a: &str, b: &str) -> usize {
    let a: Vec<&str> = a.split_whitespace().collect();
    let b: Vec<&str> = b.split_whitespace().collect();
    distance(&a, &b)
}

/// Edit operations turning `pred` into `gt`, in increasing position order.
///
/// The returned list has exactly `distance(pred, gt)` entries. When several optimal
/// alignments exist, the backtrace prefers a match, then a substitution, then an
/// insertion, then a deletion.
pub fn editops<T: PartialEq>(pred: &[T], gt: &[T]) -> Vec<EditOp> {
    let d = cost_matrix(pred, gt);
    let mut ops = Vec::with_capacity(d[pred.len()][gt.len()]);
    let (mut i, mut j) = (pred.len(), gt.len());

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && pred[i - 1] == gt[j - 1] && d[i][j] == d[i - 1][j - 1] {
            i -= 1;
            j -= 1;
        } else if i > 0 && j > 0 && d[i][j] == d[i - 1][j - 1] + 1 {
            ops.push(EditOp {
                kind: EditKind::Substitute,
                pred_pos: i - 1,
                gt_pos: j - 1,
            });
            i -= 1;
            j -= 1;
        } else if i > 0 && d[i][j] == d[i - 1][j] + 1 {
            ops.push(EditOp {
                kind: EditKind::Insert,
                pred_pos: i - 1,
                gt_pos: j,
            });
            i -= 1;
        } else {
            ops.push(EditOp {
                kind: EditKind::Delete,
                pred_pos: i,
                gt_pos: j - 1,
            });
            j -= 1;
        }
    }

    ops.reverse();
    ops
}

/// Character-level edit operations turning `pred` into `gt`.
pub fn char_editops(pred: &str, gt: &str) -> Vec<EditOp> {
    let pred: Vec<char> = pred.chars().collect();
    let gt: Vec<char> = gt.chars().collect();
    editops(&pred, &gt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(char_distance("kitten", "sitting"), 3);
        assert_eq!(char_distance("", "abc"), 3);
        assert_eq!(char_distance("abc", ""), 3);
        assert_eq!(char_distance("maison", "maeson"), 1);
        assert_eq!(char_distance("122", "122.cou"), 4);
        // scalar values, not bytes
        assert_eq!(char_distance("λ\u{03CC}γος", "λογος"), 1);
    }

    #[test]
    fn test_word_distance() {
        assert_eq!(word_distance("the quick brown fox", "the quick brown fox"), 0);
        assert_eq!(word_distance("the quick brown fox", "the qiuck fox"), 2);
        assert_eq!(word_distance("  a   b ", "a b"), 0);
    }

    #[test]
    fn test_editops_count_matches_distance() {
        let pairs = [("kitten", "sitting"), ("aaedεx-x1x3ξ,", "abdεθ-:123ξ,"), ("", "ab"), ("ab", ""), ("same", "same")];
        for (pred, gt) in pairs {
            assert_eq!(char_editops(pred, gt).len(), char_distance(pred, gt), "{} / {}", pred, gt);
        }
    }

    #[test]
    fn test_editops_positions() {
        assert_eq!(
            char_editops("xabc", "abc"),
            vec![EditOp {
                kind: EditKind::Insert,
                pred_pos: 0,
                gt_pos: 0
            }]
        );
        assert_eq!(
            char_editops("ac", "abc"),
            vec![EditOp {
                kind: EditKind::Delete,
                pred_pos: 1,
                gt_pos: 1
            }]
        );
        assert_eq!(
            char_editops("abd", "abc"),
            vec![EditOp {
                kind: EditKind::Substitute,
                pred_pos: 2,
                gt_pos: 2
            }]
        );
        assert!(char_editops("same", "same").is_empty());
    }
}
