//! Axis-aligned bounding boxes and the overlap tests used for word matching.

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// Axis-aligned rectangle in page coordinates. Always satisfies
/// `xmin <= xmax` and `ymin <= ymax`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoxCoords")]
pub struct BoundingBox {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

// Deserialisation goes through `BoundingBox::new` so stored boxes are validated too.
#[derive(Deserialize)]
struct BoxCoords {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

impl TryFrom<BoxCoords> for BoundingBox {
    type Error = EvalError;

    fn try_from(c: BoxCoords) -> Result<Self> {
        BoundingBox::new(c.xmin, c.ymin, c.xmax, c.ymax)
    }
}

impl BoundingBox {
    /// Fails with [`EvalError::InvalidBoundingBox`] when the box is inverted or has
    /// non-finite coordinates.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self> {
        let finite = [xmin, ymin, xmax, ymax].iter().all(|v| v.is_finite());
        if !finite || xmax < xmin || ymax < ymin {
            return Err(EvalError::InvalidBoundingBox { xmin, ymin, xmax, ymax });
        }
        Ok(Self { xmin, ymin, xmax, ymax })
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn intersection_area(&self, other: &BoundingBox) -> f64 {
        let width = self.xmax.min(other.xmax) - self.xmin.max(other.xmin);
        let height = self.ymax.min(other.ymax) - self.ymin.max(other.ymin);
        if width <= 0.0 || height <= 0.0 {
            return 0.0;
        }
        width * height
    }

    /// Share of this box's area covered by `other`; 0 for a degenerate box.
    pub fn overlap_proportion(&self, other: &BoundingBox) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        self.intersection_area(other) / area
    }

    /// True when `self` lies entirely inside `container`, borders included.
    pub fn is_within(&self, container: &BoundingBox) -> bool {
        self.xmin >= container.xmin
            && self.ymin >= container.ymin
            && self.xmax <= container.xmax
            && self.ymax <= container.ymax
    }

    /// True when at least `threshold` of this box lies inside `container`. A threshold
    /// of 1.0 or more is strict containment.
    pub fn is_within_with_threshold(&self, container: &BoundingBox, threshold: f64) -> bool {
        if threshold >= 1.0 {
            return self.is_within(container);
        }
        self.overlap_proportion(container) >= threshold
    }

    /// Symmetric overlap test: the shared area must reach `threshold` of each box's
    /// own area. This is not IoU.
    pub fn overlaps_with_threshold(&self, other: &BoundingBox, threshold: f64) -> bool {
        self.overlap_proportion(other) >= threshold && other.overlap_proportion(self) >= threshold
    }
}
