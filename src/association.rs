//! Detection to track assignment on IoU.

use munkres::{solve_assignment, WeightMatrix};
use ndarray::prelude::*;

use crate::bbox::{BBox, Ltrb};
use crate::Detection;

/// Cost of a padded row or column of the square assignment matrix
const NO_OVERLAP_COST: f32 = 1.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Association {
    /// `(detection index, track index)`, ascending by detection
    pub matches: Vec<(usize, usize)>,
    pub unmatched_detections: Vec<usize>,
    pub unmatched_tracks: Vec<usize>,
}

/// IoU of every detection (rows) against every track (columns)
pub fn iou_matrix(detections: &[BBox<Ltrb>], tracks: &[BBox<Ltrb>]) -> Array2<f32> {
    Array2::from_shape_fn((detections.len(), tracks.len()), |(d, t)| {
        detections[d].iou(&tracks[t])
    })
}

/// Pairs of the `iou >= threshold` mask when it already is a one-to-one
/// matching (at most one entry per row and per column).
fn unique_pairs(ious: ArrayView2<'_, f32>, threshold: f32) -> Option<Vec<(usize, usize)>> {
    let mask = ious.mapv(|v| v >= threshold);

    let rows_ok = mask.outer_iter().all(|r| r.iter().filter(|&&m| m).count() <= 1);
    let cols_ok = mask.axis_iter(Axis(1)).all(|c| c.iter().filter(|&&m| m).count() <= 1);

    if !(rows_ok && cols_ok) {
        return None;
    }

    Some(
        mask.indexed_iter()
            .filter(|(_, &m)| m)
            .map(|(pos, _)| pos)
            .collect(),
    )
}

/// Assignment maximizing the total IoU, solved with Munkres on `1 - iou`
/// over a square matrix padded with non-overlapping entries.
///
/// Ties are resolved by the solver's scan order: rows are processed top to
/// bottom and each one takes the leftmost zero-cost column still free, so
/// among equally good assignments the lower indices pair up first.
fn optimal_pairs(ious: ArrayView2<'_, f32>) -> Vec<(usize, usize)> {
    let (rows, cols) = ious.dim();
    let n = rows.max(cols);

    let mut weights = WeightMatrix::from_fn(n, |(r, c)| {
        if r < rows && c < cols {
            1.0 - ious[[r, c]]
        } else {
            NO_OVERLAP_COST
        }
    });

    match solve_assignment(&mut weights) {
        Ok(positions) => positions
            .into_iter()
            .filter(|p| p.row < rows && p.column < cols)
            .map(|p| (p.row, p.column))
            .collect(),
        Err(err) => {
            log::warn!("assignment could not be solved ({:?}), leaving all unmatched", err);
            Vec::new()
        }
    }
}

/// Matches detections to predicted track boxes.
///
/// Pairs below `threshold` never count as a match: both sides are reported
/// unmatched instead.
pub fn associate(detections: &[Detection], tracks: &[BBox<Ltrb>], threshold: f32) -> Association {
    if tracks.is_empty() {
        return Association {
            unmatched_detections: (0..detections.len()).collect(),
            ..Default::default()
        };
    }

    if detections.is_empty() {
        return Association {
            unmatched_tracks: (0..tracks.len()).collect(),
            ..Default::default()
        };
    }

    let boxes: Vec<_> = detections.iter().map(Detection::bbox).collect();
    let ious = iou_matrix(&boxes, tracks);

    let candidates = match unique_pairs(ious.view(), threshold) {
        Some(pairs) => pairs,
        None => optimal_pairs(ious.view()),
    };

    let mut det_matched = vec![false; detections.len()];
    let mut trk_matched = vec![false; tracks.len()];
    let mut matches = Vec::with_capacity(candidates.len());

    for (d, t) in candidates {
        if ious[[d, t]] >= threshold {
            det_matched[d] = true;
            trk_matched[t] = true;
            matches.push((d, t));
        }
    }

    matches.sort_unstable();

    let unmatched = |flags: Vec<bool>| {
        flags
            .into_iter()
            .enumerate()
            .filter(|(_, m)| !m)
            .map(|(i, _)| i)
            .collect()
    };

    Association {
        matches,
        unmatched_detections: unmatched(det_matched),
        unmatched_tracks: unmatched(trk_matched),
    }
}
