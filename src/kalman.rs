//! Linear Kalman filter over the box state used by the trackers.
//!
//! State is `[cx, cy, s, r, conf, vx, vy, vs]`, measurement is `[cx, cy, s, r, conf]`.

use crate::error::Error;
use crate::Float;
use nalgebra as na;

pub const DIM_X: usize = 8;
pub const DIM_Z: usize = 5;

/// Number of leading state components that carry a velocity.
const DIM_V: usize = 3;

pub type StateVector<F> = na::SVector<F, DIM_X>;
pub type StateMatrix<F> = na::SMatrix<F, DIM_X, DIM_X>;
pub type Measurement<F> = na::SVector<F, DIM_Z>;
pub type MeasurementMatrix<F> = na::SMatrix<F, DIM_Z, DIM_Z>;
pub type ObservationMatrix<F> = na::SMatrix<F, DIM_Z, DIM_X>;

#[derive(Debug, Clone)]
pub struct KalmanFilter<F: Float> {
    /// state
    pub x: StateVector<F>,
    /// state covariance
    pub p: StateMatrix<F>,
    /// state transition
    pub f: StateMatrix<F>,
    /// observation model
    pub h: ObservationMatrix<F>,
    /// measurement noise
    pub r: MeasurementMatrix<F>,
    /// process noise
    pub q: StateMatrix<F>,
}

impl<F: Float> KalmanFilter<F> {
    /// Constant velocity model: `cx`, `cy` and `s` are advanced by their
    /// velocities each step, `r` and `conf` carry over unchanged.
    pub fn constant_velocity(
        x: StateVector<F>,
        p_diag: &[F; DIM_X],
        r_diag: &[F; DIM_Z],
        q_diag: &[F; DIM_X],
    ) -> Self {
        let mut f = StateMatrix::identity();
        for i in 0..DIM_V {
            f[(i, DIM_Z + i)] = F::one();
        }

        Self {
            x,
            p: StateMatrix::from_diagonal(&StateVector::from_column_slice(p_diag)),
            f,
            h: ObservationMatrix::identity(),
            r: MeasurementMatrix::from_diagonal(&Measurement::from_column_slice(r_diag)),
            q: StateMatrix::from_diagonal(&StateVector::from_column_slice(q_diag)),
        }
    }

    pub fn predict(&mut self) {
        self.x = self.f * self.x;
        self.p = self.f * self.p * self.f.transpose() + self.q;
    }

    /// Measurement update. The covariance uses the Joseph form, which keeps
    /// `p` symmetric positive semi-definite under rounding.
    pub fn update(&mut self, z: &Measurement<F>) -> Result<(), Error> {
        let y = z - self.h * self.x;
        let s = self.h * self.p * self.h.transpose() + self.r;
        let s_inv = s.try_inverse().ok_or_else(|| {
            Error::Degenerate("innovation covariance is not invertible".to_string())
        })?;

        let k = self.p * self.h.transpose() * s_inv;
        let i_kh = StateMatrix::<F>::identity() - k * self.h;

        self.x += k * y;
        self.p = i_kh * self.p * i_kh.transpose() + k * self.r * k.transpose();

        Ok(())
    }

    #[inline]
    pub fn state(&self) -> &StateVector<F> {
        &self.x
    }

    #[inline]
    pub fn covariance(&self) -> &StateMatrix<F> {
        &self.p
    }
}
