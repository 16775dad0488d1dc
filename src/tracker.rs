use crate::bbox::{BBox, Ltrb};
use crate::config::MotionNoise;
use crate::error::Error;
use crate::history::{History, Observation};
use crate::ids::TrackId;
use crate::kalman::{KalmanFilter, Measurement, StateVector};
use crate::track::TrackState;
use crate::Detection;

/// Index of the area component and of its velocity in the state vector
const AREA: usize = 2;
const AREA_VELOCITY: usize = 7;

#[inline]
fn measurement(det: &Detection) -> Measurement<f32> {
    let z = det.bbox().as_xysr();

    Measurement::new(z.cx(), z.cy(), z.scale(), z.aspect_ratio(), det.confidence)
}

#[inline]
fn observation(det: &Detection) -> Observation {
    let bbox = det.bbox();

    Observation {
        bbox,
        centroid: bbox.centroid(),
        confidence: det.confidence,
        class: det.class,
    }
}

/// A single tracked object: constant velocity Kalman filter over
/// `[cx, cy, s, r, conf, vx, vy, vs]` plus lifecycle counters.
#[derive(Debug, Clone)]
pub struct Object {
    pub id: TrackId,
    /// predictions made since birth
    pub age: u32,
    /// matched detections, including the birth one if configured so
    pub hits: u32,
    /// consecutive steps with a match
    pub hit_streak: u32,
    /// steps since the last match
    pub time_since_update: u32,
    /// class of the latest matched detection
    pub class: i32,
    pub history: History,
    kf: KalmanFilter<f32>,
}

impl Object {
    pub fn new(
        id: TrackId,
        det: &Detection,
        noise: &MotionNoise,
        history_capacity: usize,
        birth_counts_as_hit: bool,
    ) -> Self {
        let z = measurement(det);
        let x = StateVector::from_column_slice(&[z[0], z[1], z[2], z[3], z[4], 0.0, 0.0, 0.0]);

        let mut history = History::with_capacity(history_capacity);
        history.observe(observation(det));

        let hits = u32::from(birth_counts_as_hit);

        Self {
            id,
            age: 0,
            hits,
            hit_streak: hits,
            time_since_update: 0,
            class: det.class,
            history,
            kf: KalmanFilter::constant_velocity(
                x,
                &noise.initial,
                &noise.measurement,
                &noise.process,
            ),
        }
    }

    /// Advances the state one frame and returns the predicted box.
    pub fn predict(&mut self) -> BBox<Ltrb> {
        // never let the scale go negative
        if self.kf.x[AREA_VELOCITY] + self.kf.x[AREA] <= 0.0 {
            self.kf.x[AREA_VELOCITY] = 0.0;
        }

        self.kf.predict();
        self.age += 1;

        if self.time_since_update > 0 {
            self.hit_streak = 0;
        }
        self.time_since_update += 1;

        let bbox = self.bbox();
        self.history.push_prediction(bbox);

        bbox
    }

    /// Corrects the state with a matched detection.
    pub fn correct(&mut self, det: &Detection) -> Result<(), Error> {
        self.kf.update(&measurement(det))?;

        self.time_since_update = 0;
        self.hits += 1;
        self.hit_streak += 1;
        self.class = det.class;
        self.history.observe(observation(det));

        Ok(())
    }

    /// Current box estimate
    #[inline]
    pub fn bbox(&self) -> BBox<Ltrb> {
        let x = self.kf.state();

        BBox::xysr(x[0], x[1], x[2], x[3]).as_ltrb()
    }

    pub fn state(&self) -> TrackState {
        let x = self.kf.state();
        let bbox = self.bbox();

        TrackState {
            track_id: self.id,
            x1: bbox.left(),
            y1: bbox.top(),
            x2: bbox.right(),
            y2: bbox.bottom(),
            confidence: x[4],
            class: self.class,
            vx: x[5],
            vy: x[6],
            varea: x[AREA_VELOCITY],
        }
    }

    /// `false` once the box estimate or the confidence went non-finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.bbox().is_finite() && self.kf.state()[4].is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn object(det: &Detection) -> Object {
        Object::new(7, det, &MotionNoise::default(), 16, true)
    }

    fn assert_box(bbox: BBox<Ltrb>, expected: [f32; 4], epsilon: f32) {
        for (a, b) in bbox.as_slice().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = epsilon);
        }
    }

    #[test]
    fn test_initial_state() {
        let det = Detection::new(0.0, 0.0, 10.0, 20.0, 0.8, 2);
        let obj = object(&det);

        assert_eq!(obj.id, 7);
        assert_eq!(obj.hits, 1);
        assert_eq!(obj.hit_streak, 1);
        assert_eq!(obj.time_since_update, 0);
        assert_eq!(obj.class, 2);
        assert_eq!(obj.history.len(), 1);
        assert_box(obj.bbox(), [0.0, 0.0, 10.0, 20.0], 1e-4);

        let state = obj.state();
        assert_abs_diff_eq!(state.confidence, 0.8, epsilon = 1e-6);
        assert_eq!((state.vx, state.vy, state.varea), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_birth_without_hit() {
        let det = Detection::new(0.0, 0.0, 10.0, 10.0, 0.8, 0);
        let obj = Object::new(1, &det, &MotionNoise::default(), 16, false);

        assert_eq!(obj.hits, 0);
        assert_eq!(obj.hit_streak, 0);
    }

    #[test]
    fn test_predict_counters() {
        let det = Detection::new(0.0, 0.0, 10.0, 10.0, 0.9, 0);
        let mut obj = object(&det);

        let pred = obj.predict();
        assert_box(pred, [0.0, 0.0, 10.0, 10.0], 1e-4);
        assert_eq!(obj.age, 1);
        assert_eq!(obj.time_since_update, 1);
        // the streak survives the first prediction after a hit
        assert_eq!(obj.hit_streak, 1);
        assert_eq!(obj.history.predictions().len(), 1);

        obj.predict();
        assert_eq!(obj.age, 2);
        assert_eq!(obj.time_since_update, 2);
        assert_eq!(obj.hit_streak, 0);
    }

    #[test]
    fn test_correct_resets_counters() {
        let det = Detection::new(0.0, 0.0, 10.0, 10.0, 0.9, 0);
        let mut obj = object(&det);

        obj.predict();
        obj.correct(&Detection::new(1.0, 0.0, 11.0, 10.0, 0.9, 4))
            .unwrap();

        assert_eq!(obj.time_since_update, 0);
        assert_eq!(obj.hits, 2);
        assert_eq!(obj.hit_streak, 2);
        assert_eq!(obj.class, 4);
        assert!(obj.history.predictions().is_empty());
        assert_eq!(obj.history.len(), 2);

        // moved right, the filter follows and picks up a positive velocity
        let state = obj.state();
        assert!(state.x1 > 0.5 && state.x1 <= 1.0);
        assert!(state.vx > 0.0);
    }

    #[test]
    fn test_constant_motion_is_followed() {
        let mut obj = object(&Detection::new(0.0, 0.0, 10.0, 10.0, 0.9, 0));

        for i in 1..=10 {
            obj.predict();
            let x = 2.0 * i as f32;
            obj.correct(&Detection::new(x, 0.0, x + 10.0, 10.0, 0.9, 0))
                .unwrap();
        }

        let pred = obj.predict();
        assert_abs_diff_eq!(pred.left(), 22.0, epsilon = 0.5);
        assert_abs_diff_eq!(obj.state().vx, 2.0, epsilon = 0.2);
    }

    #[test]
    fn test_negative_area_velocity_is_zeroed() {
        let mut obj = object(&Detection::new(0.0, 0.0, 10.0, 10.0, 0.9, 0));
        obj.kf.x[AREA] = 10.0;
        obj.kf.x[AREA_VELOCITY] = -20.0;

        let pred = obj.predict();

        assert_eq!(obj.kf.x[AREA_VELOCITY], 0.0);
        assert!(pred.is_finite());
        assert_abs_diff_eq!(pred.area(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_non_finite_confidence_is_not_finite() {
        let mut obj = object(&Detection::new(0.0, 0.0, 10.0, 10.0, 0.9, 0));
        assert!(obj.is_finite());

        obj.kf.x[4] = f32::NAN;

        assert!(obj.bbox().is_finite());
        assert!(!obj.is_finite());
    }
}
