//! Evaluation of every groundtruth page of a commentary.
//!
//! Pages are independent: each one is evaluated into its own accumulators, on the
//! rayon pool when `parallel` is set, and the results are summed afterwards in page
//! order. A page that cannot be evaluated is logged and skipped; the rest of the run
//! goes on.

use rayon::prelude::*;

use crate::bag::BagEvaluationCounts;
use crate::config::EvaluationConfig;
use crate::coordinate::{CoordinateEvaluator, DiffLayer, NoDiff};
use crate::counts::ErrorCounts;
use crate::document::{CommentaryLike, PageLike, WordLike};
use crate::error::{EvalError, Result};
use crate::record::EditOperationsRecord;

/// Aggregated results of a commentary run.
#[derive(Debug, Clone)]
pub struct CommentaryEvaluation {
    pub bag: BagEvaluationCounts,
    pub coordinates: CoordinateEvaluator,
    /// One layer per evaluated page, in page order; empty when diffs are not collected.
    pub diffs: Vec<DiffLayer>,
    pub evaluated_pages: Vec<String>,
    pub skipped_pages: Vec<String>,
}

impl CommentaryEvaluation {
    pub fn counts(&self) -> &ErrorCounts {
        self.coordinates.counts()
    }

    pub fn editops(&self) -> &EditOperationsRecord {
        self.coordinates.editops()
    }
}

struct PageEvaluation {
    bag: BagEvaluationCounts,
    coordinates: CoordinateEvaluator,
    diff: Option<DiffLayer>,
}

fn evaluate_page<C>(commentary: &C, gt_page: &C::Page, config: &EvaluationConfig) -> Result<PageEvaluation>
where
    C: CommentaryLike,
{
    let pred_page = commentary
        .predicted_page(gt_page.id())
        .ok_or_else(|| EvalError::MissingPrediction {
            id: gt_page.id().to_string(),
        })?;

    let gt_bag: Vec<&str> = gt_page.words().iter().map(|w| w.text()).collect();
    let pred_bag: Vec<&str> = pred_page.words().iter().map(|w| w.text()).collect();
    let mut bag = BagEvaluationCounts::new();
    bag.add_page(&gt_bag, &pred_bag);

    let mut coordinates = CoordinateEvaluator::new(config)?;
    let diff = if config.collect_diffs {
        let mut layer = DiffLayer::new(gt_page.id());
        coordinates.add_page(gt_page, pred_page, &mut layer);
        Some(layer)
    } else {
        coordinates.add_page(gt_page, pred_page, &mut NoDiff);
        None
    };

    Ok(PageEvaluation { bag, coordinates, diff })
}

/// Runs bag-of-words and coordinate-based evaluation over all groundtruth pages of
/// `commentary`, pairing each with the predicted page of the same id.
pub fn evaluate_commentary<C>(commentary: &C, config: &EvaluationConfig) -> Result<CommentaryEvaluation>
where
    C: CommentaryLike + Sync,
    C::Page: Sync,
{
    config.validate()?;
    let gt_pages = commentary.groundtruth_pages();

    let results: Vec<(String, Result<PageEvaluation>)> = if config.parallel {
        gt_pages
            .par_iter()
            .map(|page| (page.id().to_string(), evaluate_page(commentary, *page, config)))
            .collect()
    } else {
        gt_pages
            .iter()
            .map(|page| (page.id().to_string(), evaluate_page(commentary, *page, config)))
            .collect()
    };

    let mut evaluation = CommentaryEvaluation {
        bag: BagEvaluationCounts::new(),
        coordinates: CoordinateEvaluator::new(config)?,
        diffs: Vec::new(),
        evaluated_pages: Vec::new(),
        skipped_pages: Vec::new(),
    };

    for (page_id, result) in results {
        match result {
            Ok(page) => {
                evaluation.bag.merge(&page.bag);
                evaluation.coordinates.merge(&page.coordinates);
                evaluation.diffs.extend(page.diff);
                evaluation.evaluated_pages.push(page_id);
            }
            Err(e) => {
                tracing::warn!("Skipping page {}: {}", page_id, e);
                evaluation.skipped_pages.push(page_id);
            }
        }
    }

    tracing::info!(
        "Evaluated {} of {} groundtruth pages",
        evaluation.evaluated_pages.len(),
        gt_pages.len()
    );

    Ok(evaluation)
}
