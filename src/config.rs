use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::kalman::{DIM_X, DIM_Z};

/// Diagonals of the motion model covariances.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MotionNoise {
    /// initial state uncertainty, velocities are unobserved at birth
    pub initial: [f32; DIM_X],
    /// measurement noise of `(cx, cy, s, r, conf)`; shape and confidence are
    /// trusted less than position
    pub measurement: [f32; DIM_Z],
    /// process noise, lowered on the velocities to damp scale drift
    pub process: [f32; DIM_X],
}

impl Default for MotionNoise {
    fn default() -> Self {
        Self {
            initial: [10.0, 10.0, 10.0, 10.0, 10.0, 10_000.0, 10_000.0, 10_000.0],
            measurement: [1.0, 1.0, 10.0, 10.0, 10.0],
            process: [1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 0.5, 0.25],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SortConfig {
    /// frames a track survives without a match
    pub max_age: u32,
    /// hits needed before a track is reported
    pub min_hits: u32,
    /// minimum IoU to accept a detection-track pair
    pub iou_threshold: f32,
    /// count the detection a track is born from as its first hit
    pub birth_counts_as_hit: bool,
    /// observed boxes kept per track
    pub history_capacity: usize,
    pub noise: MotionNoise,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            max_age: 1,
            min_hits: 3,
            iou_threshold: 0.3,
            birth_counts_as_hit: true,
            history_capacity: 128,
            noise: MotionNoise::default(),
        }
    }
}

impl SortConfig {
    pub fn new(max_age: u32, min_hits: u32, iou_threshold: f32) -> Self {
        Self {
            max_age,
            min_hits,
            iou_threshold,
            ..Default::default()
        }
    }

    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self, Error> {
        let config: SortConfig = serde_json::from_reader(reader)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_age < 1 {
            return Err(Error::InvalidConfig("max_age must be at least 1".into()));
        }

        if self.min_hits < 1 {
            return Err(Error::InvalidConfig("min_hits must be at least 1".into()));
        }

        if !(self.iou_threshold > 0.0 && self.iou_threshold < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "iou_threshold must be in (0, 1), got {}",
                self.iou_threshold
            )));
        }

        if self.history_capacity < 1 {
            return Err(Error::InvalidConfig(
                "history_capacity must be at least 1".into(),
            ));
        }

        let noise = &self.noise;
        let positive = noise
            .initial
            .iter()
            .chain(noise.measurement.iter())
            .chain(noise.process.iter())
            .all(|v| v.is_finite() && *v > 0.0);

        if !positive {
            return Err(Error::InvalidConfig(
                "noise variances must be finite and positive".into(),
            ));
        }

        Ok(())
    }
}
