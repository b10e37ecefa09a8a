//! OCR evaluation against groundtruth transcriptions.
//!
//! Three evaluators share one set of counters:
//!
//! - bag-of-words: order-free greedy pairing of predicted and groundtruth words
//!   ([`bag_of_words_evaluation`]);
//! - coordinate-based: words paired by bounding-box overlap, with error counts broken
//!   down by layout region and character set ([`CoordinateEvaluator`]);
//! - line-level: CER/WER over a directory of paired text files ([`LineEvaluator`]).
//!
//! [`evaluate_commentary`] runs the first two over every page of a commentary.
//! Accumulators merge by plain addition, so pages can be evaluated on the rayon
//! pool and summed in any order.
//!
//! With the `python` feature the text-level functions are also exposed as the
//! `rust_ocr_eval` Python module.

pub mod bag;
pub mod charset;
pub mod commentary;
pub mod config;
pub mod coordinate;
pub mod counts;
pub mod document;
pub mod editops;
pub mod error;
pub mod geometry;
pub mod line;
pub mod normalize;
pub mod record;

#[cfg(feature = "python")]
mod python;

pub use bag::{BagEvaluationCounts, BagRates, bag_of_words_evaluation};
pub use charset::{Charset, CharsetClass, count_chars_by_charset, count_errors_by_charset};
pub use commentary::{CommentaryEvaluation, evaluate_commentary};
pub use config::{EvaluationConfig, UnicodeForm};
pub use coordinate::{
    CoordinateEvaluator, DiffEntry, DiffLayer, DiffSurface, NoDiff, PageSummary, simple_coordinates_based_evaluation,
};
pub use counts::{ErrorCountRow, ErrorCounts, Level, Scope, Tally};
pub use document::{Commentary, CommentaryLike, Page, PageLike, Region, RegionLike, RegionType, Word, WordLike};
pub use editops::{EditKind, EditOp};
pub use error::{EvalError, Result};
pub use geometry::BoundingBox;
pub use line::{LineEvaluation, LineEvaluator, LineRecord, line_by_line_evaluation};
pub use normalize::{harmonise_unicode, normalize_text};
pub use record::{EMPTY_SIDE, EditCount, EditKey, EditOperationsRecord};
