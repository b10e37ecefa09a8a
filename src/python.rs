//! Python bindings via PyO3.
//!
//! Exposes the text-level evaluators to Python as the `rust_ocr_eval` module.
//! Crate errors are mapped to the closest built-in Python exception.

use std::collections::HashMap;

use pyo3::exceptions::{PyFileNotFoundError, PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::config::EvaluationConfig;
use crate::error::EvalError;

fn to_py_err(err: EvalError) -> PyErr {
    match err {
        EvalError::MissingGroundtruth { .. } => PyFileNotFoundError::new_err(err.to_string()),
        EvalError::Io(_) => PyIOError::new_err(err.to_string()),
        EvalError::UnknownCharset { .. }
        | EvalError::MissingPrediction { .. }
        | EvalError::InvalidBoundingBox { .. }
        | EvalError::InvalidConfig(_) => PyValueError::new_err(err.to_string()),
    }
}

/// Count the characters of `text` belonging to `charset`
/// (latin, greek, numeral, punctuation, or a regex pattern)
#[pyfunction]
fn count_chars_by_charset(text: &str, charset: &str) -> PyResult<usize> {
    crate::charset::count_chars_by_charset(text, charset).map_err(to_py_err)
}

/// Count the edit operations between `gt` and `pred` that touch `charset`
#[pyfunction]
fn count_errors_by_charset(gt: &str, pred: &str, charset: &str) -> PyResult<usize> {
    crate::charset::count_errors_by_charset(gt, pred, charset).map_err(to_py_err)
}

/// Fold apostrophes, quotes and dashes onto canonical code points
#[pyfunction]
fn harmonise_unicode(text: &str) -> String {
    crate::normalize::harmonise_unicode(text)
}

/// Bag-of-words evaluation of one page
/// Returns: dict with counts and precision/recall/f1/cwr/ccr
#[pyfunction]
fn bag_of_words_evaluation(gt_bag: Vec<String>, pred_bag: Vec<String>) -> HashMap<String, f64> {
    let counts = crate::bag::bag_of_words_evaluation(&gt_bag, &pred_bag);
    let rates = counts.rates();

    let mut result = HashMap::new();
    result.insert("gt_words".to_string(), counts.gt_words as f64);
    result.insert("pred_words".to_string(), counts.pred_words as f64);
    result.insert("true_words".to_string(), counts.true_words as f64);
    result.insert("chars".to_string(), counts.chars as f64);
    result.insert("distance".to_string(), counts.distance as f64);
    result.insert("precision".to_string(), rates.precision);
    result.insert("recall".to_string(), rates.recall);
    result.insert("f1".to_string(), rates.f1);
    result.insert("cwr".to_string(), rates.cwr);
    result.insert("ccr".to_string(), rates.ccr);
    result
}

/// Line-level evaluation of a corpus directory pair
/// Returns: (cer, wer, {(gt_char, pred_char, kind): count})
#[pyfunction]
#[pyo3(signature = (gt_dir, ocr_dir, gt_suffix=".gt.txt", ocr_suffix=".txt", normalize=true))]
fn line_by_line_evaluation(
    gt_dir: String,
    ocr_dir: String,
    gt_suffix: &str,
    ocr_suffix: &str,
    normalize: bool,
) -> PyResult<(f64, f64, HashMap<(String, String, String), u64>)> {
    let config = EvaluationConfig::default()
        .with_suffixes(gt_suffix, ocr_suffix)
        .with_normalize(normalize);
    let evaluation = crate::line::line_by_line_evaluation(&gt_dir, &ocr_dir, &config).map_err(to_py_err)?;

    let editops = evaluation
        .editops
        .iter()
        .map(|(key, &count)| ((key.gt.clone(), key.pred.clone(), key.kind.to_string()), count))
        .collect();

    Ok((evaluation.cer(), evaluation.wer(), editops))
}

#[pymodule]
fn rust_ocr_eval(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(count_chars_by_charset, m)?)?;
    m.add_function(wrap_pyfunction!(count_errors_by_charset, m)?)?;
    m.add_function(wrap_pyfunction!(harmonise_unicode, m)?)?;
    m.add_function(wrap_pyfunction!(bag_of_words_evaluation, m)?)?;
    m.add_function(wrap_pyfunction!(line_by_line_evaluation, m)?)?;
    Ok(())
}
