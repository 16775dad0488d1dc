use std::collections::VecDeque;

use crate::bbox::{BBox, Ltrb};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub bbox: BBox<Ltrb>,
    pub centroid: (i32, i32),
    pub confidence: f32,
    pub class: i32,
}

/// Per-track trajectory: observed detections in a bounded ring plus the
/// boxes predicted since the last correction.
#[derive(Debug, Clone)]
pub struct History {
    observed: VecDeque<Observation>,
    predicted: Vec<BBox<Ltrb>>,
    capacity: usize,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            observed: VecDeque::with_capacity(capacity),
            predicted: Vec::new(),
            capacity,
        }
    }

    /// Appends an observation, dropping the oldest one when full.
    pub fn observe(&mut self, obs: Observation) -> Option<Observation> {
        let dropped = if self.observed.len() == self.capacity {
            self.observed.pop_front()
        } else {
            None
        };

        self.observed.push_back(obs);
        self.predicted.clear();

        dropped
    }

    #[inline]
    pub fn push_prediction(&mut self, bbox: BBox<Ltrb>) {
        self.predicted.push(bbox);
    }

    #[inline]
    pub fn last_observation(&self) -> Option<&Observation> {
        self.observed.back()
    }

    #[inline]
    pub fn last_prediction(&self) -> Option<&BBox<Ltrb>> {
        self.predicted.last()
    }

    /// Observations, oldest first
    #[inline]
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.observed.iter()
    }

    /// Predicted boxes since the last correction, oldest first
    #[inline]
    pub fn predictions(&self) -> &[BBox<Ltrb>] {
        &self.predicted
    }

    #[inline]
    pub fn centroids(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.observed.iter().map(|o| o.centroid)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }
}
