use std::f64::consts::PI;

use crate::models::geometry::PlanarVector;

/// Single-axis exponential moving average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassFilter {
    alpha: f64,
    last: Option<f64>,
}

impl LowPassFilter {
    /// `alpha = 1` passes samples through; `alpha = 0` holds the first sample forever.
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self { alpha, last: None }
    }

    /// RC low-pass discretized at `sample_rate_hz`. Unusable parameters fall back to the identity filter.
    pub fn from_cutoff(cutoff_hz: f64, sample_rate_hz: f64) -> Self {
        Self::new(alpha_from_cutoff(cutoff_hz, sample_rate_hz))
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }

    pub fn filter(&mut self, value: f64) -> f64 {
        let next = match self.last {
            None => value,
            Some(previous) => self.alpha * value + (1.0 - self.alpha) * previous,
        };
        self.last = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

pub fn alpha_from_cutoff(cutoff_hz: f64, sample_rate_hz: f64) -> f64 {
    let usable = |value: f64| value.is_finite() && value > 0.0;
    if !usable(cutoff_hz) || !usable(sample_rate_hz) {
        return 1.0;
    }
    let rc = 1.0 / (2.0 * PI * cutoff_hz);
    let dt = 1.0 / sample_rate_hz;
    dt / (rc + dt)
}

/// Two independent axis filters that always reset together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassFilter2D {
    x: LowPassFilter,
    y: LowPassFilter,
}

impl LowPassFilter2D {
    pub fn new(alpha: f64) -> Self {
        Self {
            x: LowPassFilter::new(alpha),
            y: LowPassFilter::new(alpha),
        }
    }

    pub fn from_cutoff(cutoff_hz: f64, sample_rate_hz: f64) -> Self {
        Self::new(alpha_from_cutoff(cutoff_hz, sample_rate_hz))
    }

    pub fn alpha(&self) -> f64 {
        self.x.alpha()
    }

    pub fn filter(&mut self, point: PlanarVector) -> PlanarVector {
        PlanarVector::new(self.x.filter(point.x), self.y.filter(point.y))
    }

    pub fn last(&self) -> Option<PlanarVector> {
        match (self.x.last(), self.y.last()) {
            (Some(x), Some(y)) => Some(PlanarVector::new(x, y)),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_one_is_identity() {
        let mut filter = LowPassFilter::new(1.0);
        for value in [3.0, -7.5, 100.0, 0.0, 1e-9] {
            assert_eq!(filter.filter(value), value);
        }
    }

    #[test]
    fn alpha_zero_holds_first_sample() {
        let mut filter = LowPassFilter::new(0.0);
        assert_eq!(filter.filter(4.0), 4.0);
        for value in [10.0, -3.0, 999.0] {
            assert_eq!(filter.filter(value), 4.0);
        }
    }

    #[test]
    fn blends_with_previous_output() {
        let mut filter = LowPassFilter::new(0.25);
        filter.filter(0.0);
        assert!((filter.filter(8.0) - 2.0).abs() < 1e-12);
        assert!((filter.filter(8.0) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn cutoff_derivation_matches_rc_formula() {
        let alpha = alpha_from_cutoff(10.0, 60.0);
        let rc = 1.0 / (2.0 * PI * 10.0);
        let dt = 1.0 / 60.0;
        assert!((alpha - dt / (rc + dt)).abs() < 1e-12);
        assert!(alpha > 0.0 && alpha < 1.0);
    }

    #[test]
    fn invalid_cutoff_falls_back_to_identity() {
        assert_eq!(alpha_from_cutoff(0.0, 60.0), 1.0);
        assert_eq!(alpha_from_cutoff(10.0, f64::NAN), 1.0);
    }

    #[test]
    fn first_sample_after_reset_passes_through() {
        let mut filter = LowPassFilter2D::new(0.5);
        filter.filter(PlanarVector::new(10.0, 10.0));
        filter.filter(PlanarVector::new(20.0, 20.0));
        filter.reset();
        assert_eq!(filter.last(), None);
        assert_eq!(
            filter.filter(PlanarVector::new(-4.0, 6.0)),
            PlanarVector::new(-4.0, 6.0)
        );
    }
}
