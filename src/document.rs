//! Read-only view of the document model consumed by the evaluators.
//!
//! Evaluators only ever need a word's text and box, a region's type and box, and a
//! way to pair groundtruth pages with their predicted counterparts. The traits below
//! are that narrow contract; the plain structs implement it for callers that have no
//! richer model of their own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::geometry::BoundingBox;

/// Layout categories of a commentary page, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionType {
    Commentary,
    PrimaryText,
    Preface,
    Translation,
    Introduction,
    LineNumberText,
    LineNumberCommentary,
    PageNumber,
    Appendix,
    AppCrit,
    Bibliography,
    Footnote,
    Index,
    RunningHeader,
    TableOfContents,
    Title,
    PrintedMarginalia,
    HandwrittenMarginalia,
    Other,
    Undefined,
    LineRegion,
}

impl RegionType {
    pub const ALL: [RegionType; 21] = [
        RegionType::Commentary,
        RegionType::PrimaryText,
        RegionType::Preface,
        RegionType::Translation,
        RegionType::Introduction,
        RegionType::LineNumberText,
        RegionType::LineNumberCommentary,
        RegionType::PageNumber,
        RegionType::Appendix,
        RegionType::AppCrit,
        RegionType::Bibliography,
        RegionType::Footnote,
        RegionType::Index,
        RegionType::RunningHeader,
        RegionType::TableOfContents,
        RegionType::Title,
        RegionType::PrintedMarginalia,
        RegionType::HandwrittenMarginalia,
        RegionType::Other,
        RegionType::Undefined,
        RegionType::LineRegion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionType::Commentary => "commentary",
            RegionType::PrimaryText => "primary_text",
            RegionType::Preface => "preface",
            RegionType::Translation => "translation",
            RegionType::Introduction => "introduction",
            RegionType::LineNumberText => "line_number_text",
            RegionType::LineNumberCommentary => "line_number_commentary",
            RegionType::PageNumber => "page_number",
            RegionType::Appendix => "appendix",
            RegionType::AppCrit => "app_crit",
            RegionType::Bibliography => "bibliography",
            RegionType::Footnote => "footnote",
            RegionType::Index => "index",
            RegionType::RunningHeader => "running_header",
            RegionType::TableOfContents => "table_of_contents",
            RegionType::Title => "title",
            RegionType::PrintedMarginalia => "printed_marginalia",
            RegionType::HandwrittenMarginalia => "handwritten_marginalia",
            RegionType::Other => "other",
            RegionType::Undefined => "undefined",
            RegionType::LineRegion => "line_region",
        }
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionType {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        RegionType::ALL
            .into_iter()
            .find(|region_type| region_type.as_str() == s)
            .ok_or_else(|| EvalError::invalid_config(format!("Unknown region type '{}'", s)))
    }
}

/// A word as seen by the evaluators.
pub trait WordLike {
    fn text(&self) -> &str;

    fn bbox(&self) -> &BoundingBox;

    /// Region types already resolved by the document model, if any. When `None`,
    /// the evaluator resolves them against the page regions.
    fn region_types(&self) -> Option<&[RegionType]> {
        None
    }
}

pub trait RegionLike {
    fn region_type(&self) -> RegionType;

    fn bbox(&self) -> &BoundingBox;
}

pub trait PageLike {
    type Word: WordLike;
    type Region: RegionLike;

    fn id(&self) -> &str;

    fn words(&self) -> &[Self::Word];

    fn regions(&self) -> &[Self::Region];
}

/// A commentary pairs its groundtruth pages with predicted pages sharing their id.
pub trait CommentaryLike {
    type Page: PageLike;

    /// Pages that have a groundtruth transcription, in evaluation order.
    fn groundtruth_pages(&self) -> Vec<&Self::Page>;

    fn predicted_page(&self, id: &str) -> Option<&Self::Page>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub bbox: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_types: Option<Vec<RegionType>>,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            region_types: None,
        }
    }

    pub fn with_region_types(mut self, region_types: Vec<RegionType>) -> Self {
        self.region_types = Some(region_types);
        self
    }
}

impl WordLike for Word {
    fn text(&self) -> &str {
        &self.text
    }

    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    fn region_types(&self) -> Option<&[RegionType]> {
        self.region_types.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub region_type: RegionType,
    pub bbox: BoundingBox,
}

impl Region {
    pub fn new(region_type: RegionType, bbox: BoundingBox) -> Self {
        Self { region_type, bbox }
    }
}

impl RegionLike for Region {
    fn region_type(&self) -> RegionType {
        self.region_type
    }

    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub words: Vec<Word>,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl Page {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_words(mut self, words: Vec<Word>) -> Self {
        self.words = words;
        self
    }

    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.regions = regions;
        self
    }
}

impl PageLike for Page {
    type Word = Word;
    type Region = Region;

    fn id(&self) -> &str {
        &self.id
    }

    fn words(&self) -> &[Word] {
        &self.words
    }

    fn regions(&self) -> &[Region] {
        &self.regions
    }
}

/// Groundtruth and predicted pages of one commentary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Commentary {
    pub id: String,
    pub groundtruth_pages: Vec<Page>,
    pub predicted_pages: Vec<Page>,
}

impl CommentaryLike for Commentary {
    type Page = Page;

    fn groundtruth_pages(&self) -> Vec<&Page> {
        self.groundtruth_pages.iter().collect()
    }

    fn predicted_page(&self, id: &str) -> Option<&Page> {
        self.predicted_pages.iter().find(|page| page.id == id)
    }
}
