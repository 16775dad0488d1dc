use std::collections::BTreeMap;

use crate::association::associate;
use crate::bbox::{BBox, Ltrb};
use crate::config::SortConfig;
use crate::error::Error;
use crate::ids::{IdAllocator, TrackId};
use crate::track::TrackState;
use crate::tracker::Object;
use crate::Detection;

/// Live tracks of one video source.
///
/// Tracks are keyed by identity, so iteration follows creation order and
/// removals never shift the other entries.
pub struct Scene {
    config: SortConfig,
    tracks: BTreeMap<TrackId, Object>,
    ids: IdAllocator,
    frame_count: u64,
}

impl Scene {
    pub fn new(config: SortConfig) -> Result<Self, Error> {
        Self::with_ids(config, IdAllocator::default())
    }

    pub fn with_ids(config: SortConfig, ids: IdAllocator) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            tracks: BTreeMap::new(),
            ids,
            frame_count: 0,
        })
    }

    /// Predicts every track, drops the ones whose box or confidence is not
    /// finite and returns the remaining `(id, predicted box)` in creation order.
    fn predict(&mut self) -> Vec<(TrackId, BBox<Ltrb>)> {
        let mut predicted = Vec::with_capacity(self.tracks.len());
        let mut degenerate = Vec::new();

        for (&id, obj) in self.tracks.iter_mut() {
            let bbox = obj.predict();

            if obj.is_finite() {
                predicted.push((id, bbox));
            } else {
                degenerate.push(id);
            }
        }

        for id in degenerate {
            log::debug!("track {} diverged, dropping it", id);
            self.tracks.remove(&id);
        }

        predicted
    }

    /// Runs one tracking step over the detections of a frame and returns the
    /// confirmed tracks, ordered by identity.
    ///
    /// Detections with non-finite values or a non-positive size reject the
    /// whole frame before any track is touched. So does a frame that could
    /// spawn more tracks than there are identities left.
    pub fn update(&mut self, detections: &[Detection]) -> Result<Vec<TrackState>, Error> {
        for (index, det) in detections.iter().enumerate() {
            det.validate(index)?;
        }

        let remaining = self.ids.remaining();
        if remaining < detections.len() as u64 {
            return Err(Error::IdsExhausted {
                needed: detections.len(),
                remaining,
            });
        }

        self.frame_count += 1;

        let predicted = self.predict();
        let boxes: Vec<_> = predicted.iter().map(|(_, bbox)| *bbox).collect();
        let assoc = associate(detections, &boxes, self.config.iou_threshold);

        let mut failed = Vec::new();
        for &(d, t) in &assoc.matches {
            let id = predicted[t].0;

            if let Some(obj) = self.tracks.get_mut(&id) {
                if let Err(err) = obj.correct(&detections[d]) {
                    log::debug!("track {} failed to correct: {}", id, err);
                    failed.push(id);
                }
            }
        }

        for id in failed {
            self.tracks.remove(&id);
        }

        for &d in &assoc.unmatched_detections {
            let id = self.ids.next().ok_or(Error::IdsExhausted {
                needed: 1,
                remaining: 0,
            })?;
            let obj = Object::new(
                id,
                &detections[d],
                &self.config.noise,
                self.config.history_capacity,
                self.config.birth_counts_as_hit,
            );

            self.tracks.insert(id, obj);
        }

        let max_age = self.config.max_age;
        self.tracks.retain(|id, obj| {
            let alive = obj.time_since_update <= max_age;
            if !alive {
                log::debug!(
                    "evicting track {} (time since update {}, hits {})",
                    id,
                    obj.time_since_update,
                    obj.hits
                );
            }

            alive
        });

        Ok(self.confirmed())
    }

    #[inline]
    fn is_confirmed(&self, obj: &Object) -> bool {
        obj.time_since_update < self.config.max_age && obj.hits >= self.config.min_hits
    }

    /// Tracks that pass the emission gate in the current state
    pub fn confirmed(&self) -> Vec<TrackState> {
        self.tracks
            .values()
            .filter(|obj| self.is_confirmed(obj))
            .map(Object::state)
            .collect()
    }

    /// Drops every live track. Identities keep growing afterwards.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    #[inline]
    pub fn get(&self, id: TrackId) -> Option<&Object> {
        self.tracks.get(&id)
    }

    /// All live tracks, tentative ones included, in creation order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.tracks.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn config(&self) -> &SortConfig {
        &self.config
    }
}
