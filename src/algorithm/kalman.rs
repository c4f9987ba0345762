//! Constant-velocity position/velocity estimator for 2D touch samples.
//!
//! Covariance is tracked as two scalars (position and velocity uncertainty) shared by both
//! axes instead of a full 4x4 matrix. This is lower fidelity than a textbook Kalman filter.
//!
//! `update` overwrites velocity with `gain * innovation` rather than blending it with the
//! prediction. That makes velocity a per-sample derivative estimate, and release momentum is
//! scaled against that magnitude, so it must stay as is.

use crate::models::config::KalmanConfig;
use crate::models::geometry::PlanarVector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanFilter2D {
    position: PlanarVector,
    velocity: PlanarVector,
    cov_p: f64,
    cov_v: f64,
    process_noise_position: f64,
    process_noise_velocity: f64,
    measurement_noise: f64,
    initial_uncertainty: f64,
}

impl KalmanFilter2D {
    pub fn new(config: &KalmanConfig) -> Self {
        let initial_uncertainty = config.initial_uncertainty.max(0.0);
        Self {
            position: PlanarVector::ZERO,
            velocity: PlanarVector::ZERO,
            cov_p: initial_uncertainty,
            cov_v: initial_uncertainty,
            process_noise_position: config.process_noise_position.max(0.0),
            process_noise_velocity: config.process_noise_velocity.max(0.0),
            measurement_noise: config.measurement_noise.max(f64::EPSILON),
            initial_uncertainty,
        }
    }

    pub fn predict(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.position += self.velocity * dt;
        self.cov_p += self.process_noise_position;
        self.cov_v += self.process_noise_velocity;
    }

    pub fn update(&mut self, measurement: PlanarVector) {
        let gain = self.cov_p / (self.cov_p + self.measurement_noise);
        let innovation = measurement - self.position;
        self.position += innovation * gain;
        self.velocity = innovation * gain;
        self.cov_p *= 1.0 - gain;
        self.cov_v *= 1.0 - 0.5 * gain;
    }

    pub fn position(&self) -> PlanarVector {
        self.position
    }

    pub fn velocity(&self) -> PlanarVector {
        self.velocity
    }

    pub fn predicted_position(&self, dt: f64) -> PlanarVector {
        self.position + self.velocity * dt
    }

    pub fn position_uncertainty(&self) -> f64 {
        self.cov_p
    }

    pub fn velocity_uncertainty(&self) -> f64 {
        self.cov_v
    }

    pub fn reset(&mut self, position: PlanarVector) {
        self.position = position;
        self.velocity = PlanarVector::ZERO;
        self.cov_p = self.initial_uncertainty;
        self.cov_v = self.initial_uncertainty;
    }
}

impl Default for KalmanFilter2D {
    fn default() -> Self {
        Self::new(&KalmanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_updates_converge_on_measurement() {
        let mut kalman = KalmanFilter2D::default();
        let target = PlanarVector::new(40.0, -12.0);
        let mut previous_cov = kalman.position_uncertainty();
        for _ in 0..200 {
            kalman.update(target);
            let cov = kalman.position_uncertainty();
            assert!(cov < previous_cov);
            previous_cov = cov;
        }
        assert!(kalman.position().distance(target) < 0.01);
        assert!(previous_cov < 0.05);
    }

    #[test]
    fn velocity_is_overwritten_with_weighted_innovation() {
        let config = KalmanConfig {
            measurement_noise: 1.0,
            initial_uncertainty: 1.0,
            ..KalmanConfig::default()
        };
        let mut kalman = KalmanFilter2D::new(&config);
        kalman.update(PlanarVector::new(10.0, 0.0));
        // gain 0.5: half the innovation moves position and becomes the velocity.
        assert!((kalman.position().x - 5.0).abs() < 1e-12);
        assert!((kalman.velocity().x - 5.0).abs() < 1e-12);
        assert!((kalman.position_uncertainty() - 0.5).abs() < 1e-12);
        assert!((kalman.velocity_uncertainty() - 0.75).abs() < 1e-12);

        kalman.update(PlanarVector::new(5.0, 0.0));
        assert!(kalman.velocity().x.abs() < 1e-12);
    }

    #[test]
    fn predict_advances_and_inflates() {
        let mut kalman = KalmanFilter2D::default();
        kalman.reset(PlanarVector::new(0.0, 0.0));
        kalman.update(PlanarVector::new(4.0, 2.0));
        let velocity = kalman.velocity();
        let before = kalman.position();
        let expected = kalman.predicted_position(0.5);
        let cov_p = kalman.position_uncertainty();
        let cov_v = kalman.velocity_uncertainty();

        kalman.predict(0.5);
        assert_eq!(kalman.position(), expected);
        assert_eq!(kalman.position(), before + velocity * 0.5);
        assert_eq!(kalman.position_uncertainty(), cov_p + 1.0);
        assert_eq!(kalman.velocity_uncertainty(), cov_v + 1.0);
    }

    #[test]
    fn reset_restores_initial_uncertainty() {
        let mut kalman = KalmanFilter2D::default();
        kalman.update(PlanarVector::new(3.0, 3.0));
        kalman.reset(PlanarVector::new(1.0, 2.0));
        assert_eq!(kalman.position(), PlanarVector::new(1.0, 2.0));
        assert_eq!(kalman.velocity(), PlanarVector::ZERO);
        assert_eq!(kalman.position_uncertainty(), 1_000.0);
        assert_eq!(kalman.velocity_uncertainty(), 1_000.0);
    }
}
