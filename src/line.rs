//! Corpus-level evaluation of paired groundtruth/OCR text files.
//!
//! A corpus is two directories. Every file of the OCR directory ending in
//! `ocr_suffix` is paired with the groundtruth file sharing its stem and ending in
//! `gt_suffix`. Unlike the commentary sweep, a missing groundtruth file fails the
//! whole run.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::config::EvaluationConfig;
use crate::editops::{char_distance, char_editops, word_distance};
use crate::error::{EvalError, Result};
use crate::normalize::normalize_text;
use crate::record::EditOperationsRecord;

/// Per-pair detail of a line-level run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRecord {
    pub id: String,
    pub gt: String,
    pub ocr: String,
    pub chars: usize,
    pub chars_distance: usize,
    pub words: usize,
    pub words_distance: usize,
}

impl LineRecord {
    pub fn new(id: impl Into<String>, gt: impl Into<String>, ocr: impl Into<String>) -> Self {
        let gt = gt.into();
        let ocr = ocr.into();
        Self {
            id: id.into(),
            chars: gt.chars().count(),
            chars_distance: char_distance(&ocr, &gt),
            words: gt.split_whitespace().count(),
            words_distance: word_distance(&ocr, &gt),
            gt,
            ocr,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEvaluation {
    pub records: Vec<LineRecord>,
    pub editops: EditOperationsRecord,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn safe_divide(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl LineEvaluation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates one groundtruth/OCR pair and adds it to the running totals.
    pub fn add_pair(&mut self, id: impl Into<String>, gt: &str, ocr: &str) {
        self.editops.record(gt, ocr, &char_editops(ocr, gt));
        self.records.push(LineRecord::new(id, gt, ocr));
    }

    pub fn merge(&mut self, other: &LineEvaluation) {
        self.records.extend(other.records.iter().cloned());
        self.editops.merge(&other.editops);
    }

    pub fn total_chars(&self) -> usize {
        self.records.iter().map(|r| r.chars).sum()
    }

    pub fn total_chars_distance(&self) -> usize {
        self.records.iter().map(|r| r.chars_distance).sum()
    }

    pub fn total_words(&self) -> usize {
        self.records.iter().map(|r| r.words).sum()
    }

    pub fn total_words_distance(&self) -> usize {
        self.records.iter().map(|r| r.words_distance).sum()
    }

    /// Character error rate, rounded to 3 decimals; 0 on an empty corpus.
    pub fn cer(&self) -> f64 {
        round3(safe_divide(self.total_chars_distance(), self.total_chars()))
    }

    /// Word error rate, rounded to 3 decimals; 0 on an empty corpus.
    pub fn wer(&self) -> f64 {
        round3(safe_divide(self.total_words_distance(), self.total_words()))
    }
}

#[derive(Debug, Clone)]
pub struct LineEvaluator {
    config: EvaluationConfig,
}

impl LineEvaluator {
    pub fn new(config: &EvaluationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config: config.clone() })
    }

    /// A groundtruth file can only pass for an OCR file when `gt_suffix` extends
    /// `ocr_suffix` (`.gt.txt` over `.txt`). Otherwise every OCR-suffixed name is kept.
    fn is_groundtruth_name(&self, name: &str) -> bool {
        let gt_suffix = &self.config.gt_suffix;
        gt_suffix.len() > self.config.ocr_suffix.len()
            && gt_suffix.ends_with(self.config.ocr_suffix.as_str())
            && name.ends_with(gt_suffix.as_str())
    }

    /// Pairs every OCR file of `ocr_dir` with its groundtruth file in `gt_dir`, in
    /// file name order.
    pub fn pair_files(&self, gt_dir: &Path, ocr_dir: &Path) -> Result<Vec<(String, PathBuf, PathBuf)>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(ocr_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                tracing::debug!("Skipping non UTF-8 file name {:?}", file_name);
                continue;
            };
            if name.ends_with(&self.config.ocr_suffix) && !self.is_groundtruth_name(name) {
                names.push(name.to_string());
            }
        }
        names.sort();

        names
            .into_iter()
            .map(|name| {
                let stem = name[..name.len() - self.config.ocr_suffix.len()].to_string();
                let gt_path = gt_dir.join(format!("{}{}", stem, self.config.gt_suffix));
                if !gt_path.is_file() {
                    return Err(EvalError::missing_groundtruth(&stem, gt_path.display().to_string()));
                }
                Ok((stem, gt_path, ocr_dir.join(&name)))
            })
            .collect()
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        let text = fs::read_to_string(path)?;
        if self.config.normalize {
            Ok(normalize_text(&text, self.config.unicode_form))
        } else {
            Ok(text)
        }
    }

    fn evaluate_pair(&self, id: String, gt_path: &Path, ocr_path: &Path) -> Result<LineEvaluation> {
        let gt = self.read_text(gt_path)?;
        let ocr = self.read_text(ocr_path)?;
        let mut evaluation = LineEvaluation::new();
        evaluation.add_pair(id, &gt, &ocr);
        Ok(evaluation)
    }

    /// Evaluates the whole corpus. Fails before reading any text if a groundtruth
    /// file is missing.
    pub fn evaluate_dirs(&self, gt_dir: impl AsRef<Path>, ocr_dir: impl AsRef<Path>) -> Result<LineEvaluation> {
        let pairs = self.pair_files(gt_dir.as_ref(), ocr_dir.as_ref())?;

        let partials: Vec<LineEvaluation> = if self.config.parallel {
            pairs
                .into_par_iter()
                .map(|(id, gt_path, ocr_path)| self.evaluate_pair(id, &gt_path, &ocr_path))
                .collect::<Result<_>>()?
        } else {
            pairs
                .into_iter()
                .map(|(id, gt_path, ocr_path)| self.evaluate_pair(id, &gt_path, &ocr_path))
                .collect::<Result<_>>()?
        };

        let mut evaluation = LineEvaluation::new();
        for partial in &partials {
            evaluation.merge(partial);
        }

        tracing::info!(
            "Evaluated {} files: CER {:.3}, WER {:.3}",
            evaluation.records.len(),
            evaluation.cer(),
            evaluation.wer()
        );
        Ok(evaluation)
    }
}

/// Evaluates the OCR files of `ocr_dir` against `gt_dir` with `config`.
pub fn line_by_line_evaluation(
    gt_dir: impl AsRef<Path>,
    ocr_dir: impl AsRef<Path>,
    config: &EvaluationConfig,
) -> Result<LineEvaluation> {
    LineEvaluator::new(config)?.evaluate_dirs(gt_dir, ocr_dir)
}
