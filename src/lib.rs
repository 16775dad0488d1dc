pub mod association;
pub mod bbox;
pub mod config;
pub mod detection;
pub mod error;
pub mod frame;
pub mod ids;
pub mod kalman;
pub mod pipeline;
pub mod scene;
pub mod tracker;

mod history;
mod track;

pub use config::{MotionNoise, SortConfig};
pub use detection::Detection;
pub use frame::Frame;
pub use history::{History, Observation};
pub use scene::Scene;
pub use track::TrackState;

use error::Error;
use nalgebra as na;
use std::collections::HashMap;
use std::{fmt, rc::Rc};

pub trait Float: na::RealField + Copy + fmt::Debug + 'static {}

impl<T> Float for T where T: na::RealField + Copy + fmt::Debug + 'static {}

pub trait Tracking {
    fn update(&mut self, frame: &Frame, src: &str) -> Result<(), error::Error>;
    fn tracks(&self, src: &str) -> Rc<[TrackState]>;
}

/// SORT tracker over any number of named sources, each with its own scene
/// and its own identity sequence.
pub struct SortTracker {
    config: SortConfig,
    scenes: HashMap<String, Scene>,
}

impl SortTracker {
    pub fn new(config: SortConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            scenes: HashMap::new(),
        })
    }

    #[inline]
    pub fn scene(&self, src: &str) -> Option<&Scene> {
        self.scenes.get(src)
    }

    #[inline]
    pub fn remove(&mut self, src: &str) -> Option<Scene> {
        self.scenes.remove(src)
    }
}

impl Default for SortTracker {
    fn default() -> Self {
        Self {
            config: SortConfig::default(),
            scenes: HashMap::new(),
        }
    }
}

impl crate::Tracking for SortTracker {
    fn update(&mut self, frame: &Frame, src: &str) -> Result<(), Error> {
        let scene = match self.scenes.get_mut(src) {
            Some(scene) => scene,
            None => {
                log::debug!("new source `{}`", src);

                self.scenes
                    .entry(src.to_string())
                    .or_insert(Scene::new(self.config.clone())?)
            }
        };

        scene.update(&frame.detections)?;

        Ok(())
    }

    #[inline]
    fn tracks(&self, src: &str) -> Rc<[TrackState]> {
        if let Some(scene) = self.scenes.get(src) {
            return scene.confirmed().into();
        }

        Rc::new([])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_are_independent() {
        let mut tracker = SortTracker::new(SortConfig::new(1, 1, 0.3)).unwrap();
        let frame = Frame::new(0, 0.0, vec![Detection::new(0.0, 0.0, 10.0, 10.0, 0.9, 0)]);

        tracker.update(&frame, "front").unwrap();
        tracker.update(&frame, "rear").unwrap();

        let front = tracker.tracks("front");
        let rear = tracker.tracks("rear");
        assert_eq!(front.len(), 1);
        assert_eq!(rear.len(), 1);
        assert_eq!(front[0].track_id, 1);
        assert_eq!(rear[0].track_id, 1);

        assert!(tracker.tracks("side").is_empty());
        assert!(tracker.scene("side").is_none());
    }

    #[test]
    fn test_empty_frames_age_tracks() {
        let mut tracker = SortTracker::new(SortConfig::new(1, 1, 0.3)).unwrap();
        let frame = Frame::new(0, 0.0, vec![Detection::new(0.0, 0.0, 10.0, 10.0, 0.9, 0)]);

        tracker.update(&frame, "cam").unwrap();
        tracker.update(&Frame::default(), "cam").unwrap();
        assert!(tracker.tracks("cam").is_empty());
        assert_eq!(tracker.scene("cam").map(Scene::len), Some(1));

        tracker.update(&Frame::default(), "cam").unwrap();
        assert_eq!(tracker.scene("cam").map(Scene::len), Some(0));
    }
}
