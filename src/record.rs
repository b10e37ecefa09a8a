//! Frequency record of the edit operations observed across an evaluation run.

use std::collections::HashMap;

use serde::Serialize;

use crate::editops::{EditKind, EditOp};

/// Placeholder for the empty side of an insertion or deletion.
pub const EMPTY_SIDE: &str = "∅";

/// Key of an edit-operation record: (groundtruth unit, predicted unit, kind).
///
/// Insertions have [`EMPTY_SIDE`] as groundtruth unit, deletions as predicted unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EditKey {
    pub gt: String,
    pub pred: String,
    pub kind: EditKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditCount {
    #[serde(flatten)]
    pub key: EditKey,
    pub count: u64,
}

/// Grows monotonically; only used for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOperationsRecord {
    counts: HashMap<EditKey, u64>,
}

impl EditOperationsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the character-level `ops` that turn `pred_word` into `gt_word`.
    ///
    /// `ops` must have been computed on the characters of `pred_word` and `gt_word`.
    pub fn record(&mut self, gt_word: &str, pred_word: &str, ops: &[EditOp]) {
        let gt: Vec<char> = gt_word.chars().collect();
        let pred: Vec<char> = pred_word.chars().collect();

        for op in ops {
            let gt_side = match op.kind {
                EditKind::Insert => None,
                EditKind::Substitute | EditKind::Delete => gt.get(op.gt_pos),
            };
            let pred_side = match op.kind {
                EditKind::Delete => None,
                EditKind::Substitute | EditKind::Insert => pred.get(op.pred_pos),
            };
            let key = EditKey {
                gt: gt_side.map_or_else(|| EMPTY_SIDE.to_string(), char::to_string),
                pred: pred_side.map_or_else(|| EMPTY_SIDE.to_string(), char::to_string),
                kind: op.kind,
            };
            *self.counts.entry(key).or_insert(0) += 1;
        }
    }

    pub fn get(&self, gt: &str, pred: &str, kind: EditKind) -> u64 {
        let key = EditKey {
            gt: gt.to_string(),
            pred: pred.to_string(),
            kind,
        };
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Adds every count of `other` into `self`.
    pub fn merge(&mut self, other: &EditOperationsRecord) {
        for (key, count) in &other.counts {
            *self.counts.entry(key.clone()).or_insert(0) += count;
        }
    }

    /// Number of distinct operations.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of recorded operations.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EditKey, &u64)> {
        self.counts.iter()
    }

    /// Entries by descending count, ties broken by key.
    pub fn sorted_by_frequency(&self) -> Vec<EditCount> {
        let mut entries: Vec<EditCount> = self
            .counts
            .iter()
            .map(|(key, &count)| EditCount { key: key.clone(), count })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        entries
    }
}
