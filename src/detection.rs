use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::error::Error;

/// Contains left-top and right-bottom corners of a detected object
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c")]
    pub class: i32,
}

impl Detection {
    #[inline]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32, class: i32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
            class,
        }
    }

    /// Builds a detection from a detector row `(x1, y1, x2, y2, confidence, class_id)`.
    /// The class id is truncated towards zero.
    #[inline]
    pub fn from_row(row: &[f32; 6]) -> Self {
        Self::new(row[0], row[1], row[2], row[3], row[4], row[5] as i32)
    }

    #[inline(always)]
    pub fn bbox(&self) -> BBox<Ltrb> {
        BBox::ltrb(self.x1, self.y1, self.x2, self.y2)
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Checks the geometry the motion model relies on: finite values and a
    /// strictly positive width and height (the aspect ratio is `w / h`).
    pub fn validate(&self, index: usize) -> Result<(), Error> {
        let invalid = |reason: String| Error::InvalidDetection { index, reason };

        if !self.bbox().is_finite() || !self.confidence.is_finite() {
            return Err(invalid(format!("non-finite values in {:?}", self)));
        }

        if self.width() <= 0.0 || self.height() <= 0.0 {
            return Err(invalid(format!(
                "non-positive size {}x{}",
                self.width(),
                self.height()
            )));
        }

        Ok(())
    }
}
