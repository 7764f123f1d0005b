//! Constant-velocity Kalman predictor over a bounding box
//!
//! State is `[x, y, w, h, vx, vy, vw, vh]`: the top-left/width/height box
//! plus a velocity for each of the four components. Measurements are the
//! box itself. Noise is scaled by the box height, so large boxes tolerate
//! proportionally larger jumps.

use nalgebra::{SMatrix, SVector};

use crate::common::bbox::BBox;
use crate::types::MotionConfig;

/// Kalman state dimension
pub const STATE_DIM: usize = 8;
/// Measurement dimension
pub const MEAS_DIM: usize = 4;

pub type StateVector = SVector<f64, STATE_DIM>;
pub type StateCovariance = SMatrix<f64, STATE_DIM, STATE_DIM>;
pub type MeasVector = SVector<f64, MEAS_DIM>;
type ObservationMatrix = SMatrix<f64, MEAS_DIM, STATE_DIM>;

/// Gaussian motion state of a single track
#[derive(Debug, Clone, PartialEq)]
pub struct MotionState {
    /// Mean state vector
    pub mean: StateVector,
    /// State covariance
    pub covariance: StateCovariance,
}

impl MotionState {
    /// Current box estimate.
    ///
    /// Width and height are clamped at zero; the filter may drive them
    /// negative while a shrinking box is coasting.
    pub fn bbox(&self) -> BBox {
        BBox::new(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2].max(0.0) as f32,
            self.mean[3].max(0.0) as f32,
        )
    }
}

/// Constant-velocity motion model with unit time step
#[derive(Debug, Clone)]
pub struct ConstantVelocityModel {
    transition: StateCovariance,
    observation: ObservationMatrix,
    std_weight_position: f64,
    std_weight_velocity: f64,
    min_noise_extent: f64,
}

impl ConstantVelocityModel {
    /// Build the model from motion configuration
    pub fn new(config: &MotionConfig) -> Self {
        // F = [I, I; 0, I]
        let mut transition = StateCovariance::identity();
        for i in 0..MEAS_DIM {
            transition[(i, MEAS_DIM + i)] = 1.0;
        }

        // H = [I, 0]
        let mut observation = ObservationMatrix::zeros();
        for i in 0..MEAS_DIM {
            observation[(i, i)] = 1.0;
        }

        Self {
            transition,
            observation,
            std_weight_position: config.std_weight_position,
            std_weight_velocity: config.std_weight_velocity,
            min_noise_extent: config.min_noise_extent,
        }
    }

    #[inline]
    fn noise_extent(&self, height: f64) -> f64 {
        height.max(self.min_noise_extent)
    }

    /// Create a motion state centred on a fresh measurement with zero velocity
    pub fn initiate(&self, bbox: &BBox) -> MotionState {
        let z = measurement(bbox);
        let mut mean = StateVector::zeros();
        mean.fixed_rows_mut::<MEAS_DIM>(0).copy_from(&z);

        let s = self.noise_extent(z[3]);
        let pos = 2.0 * self.std_weight_position * s;
        let vel = 10.0 * self.std_weight_velocity * s;
        let covariance = StateCovariance::from_diagonal(&StateVector::from_column_slice(&[
            pos * pos,
            pos * pos,
            pos * pos,
            pos * pos,
            vel * vel,
            vel * vel,
            vel * vel,
            vel * vel,
        ]));

        MotionState { mean, covariance }
    }

    /// Advance a state one step: `x' = F x`, `P' = F P Fᵀ + Q`
    pub fn predict(&self, state: &mut MotionState) {
        let s = self.noise_extent(state.mean[3]);
        let pos = self.std_weight_position * s;
        let vel = self.std_weight_velocity * s;
        let process_noise = StateCovariance::from_diagonal(&StateVector::from_column_slice(&[
            pos * pos,
            pos * pos,
            pos * pos,
            pos * pos,
            vel * vel,
            vel * vel,
            vel * vel,
            vel * vel,
        ]));

        state.mean = self.transition * state.mean;
        state.covariance =
            self.transition * state.covariance * self.transition.transpose() + process_noise;
    }

    /// Correct a predicted state with a measured box.
    ///
    /// Returns `false` if the innovation covariance was not positive definite;
    /// the state is then re-initiated on the measurement.
    pub fn correct(&self, state: &mut MotionState, bbox: &BBox) -> bool {
        let z = measurement(bbox);
        let s = self.noise_extent(state.mean[3]);
        let std = self.std_weight_position * s;
        let measurement_noise = SMatrix::<f64, MEAS_DIM, MEAS_DIM>::identity() * (std * std);

        let projected_cov =
            self.observation * state.covariance * self.observation.transpose() + measurement_noise;

        let chol = match projected_cov.cholesky() {
            Some(chol) => chol,
            None => {
                *state = self.initiate(bbox);
                return false;
            }
        };

        // K = P Hᵀ S⁻¹, solved as S Kᵀ = H P
        let ph_t = state.covariance * self.observation.transpose();
        let gain = chol.solve(&ph_t.transpose()).transpose();

        let innovation = z - self.observation * state.mean;
        let correction = gain * self.observation * state.covariance;
        state.mean += gain * innovation;
        state.covariance -= correction;
        true
    }
}

#[inline]
fn measurement(bbox: &BBox) -> MeasVector {
    MeasVector::new(bbox.x as f64, bbox.y as f64, bbox.w as f64, bbox.h as f64)
}
