use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::ids::TrackId;

/// Reported state of a confirmed track
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrackState {
    pub track_id: TrackId,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class: i32,

    // per frame, in px
    pub vx: f32,
    pub vy: f32,

    // per frame, in px^2
    pub varea: f32,
}

impl TrackState {
    #[inline]
    pub fn bbox(&self) -> BBox<Ltrb> {
        BBox::ltrb(self.x1, self.y1, self.x2, self.y2)
    }

    /// `(x1, y1, x2, y2, confidence, class_id, vx, vy, varea, track_id)`
    pub fn to_row(&self) -> [f32; 10] {
        [
            self.x1,
            self.y1,
            self.x2,
            self.y2,
            self.confidence,
            self.class as f32,
            self.vx,
            self.vy,
            self.varea,
            self.track_id as f32,
        ]
    }
}
