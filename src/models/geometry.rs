//! Planar vectors and axis-aligned bounds shared by every stage of the pipeline.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A point or displacement in a 2D coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarVector {
    pub x: f64,
    pub y: f64,
}

impl PlanarVector {
    pub const ZERO: PlanarVector = PlanarVector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn magnitude_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn dot(self, other: PlanarVector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Unit vector in the same direction; the zero vector maps to itself.
    pub fn normalize(self) -> Self {
        let length = self.magnitude();
        if length <= f64::EPSILON {
            return Self::ZERO;
        }
        Self::new(self.x / length, self.y / length)
    }

    /// Counter-clockwise rotation by `radians`.
    pub fn rotate(self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn distance(self, other: PlanarVector) -> f64 {
        (other - self).magnitude()
    }

    /// `atan2(y, x)`, in (-pi, pi].
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn lerp(self, other: PlanarVector, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for PlanarVector {
    type Output = PlanarVector;

    fn add(self, rhs: PlanarVector) -> PlanarVector {
        PlanarVector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for PlanarVector {
    fn add_assign(&mut self, rhs: PlanarVector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for PlanarVector {
    type Output = PlanarVector;

    fn sub(self, rhs: PlanarVector) -> PlanarVector {
        PlanarVector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for PlanarVector {
    fn sub_assign(&mut self, rhs: PlanarVector) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for PlanarVector {
    type Output = PlanarVector;

    fn mul(self, rhs: f64) -> PlanarVector {
        self.scale(rhs)
    }
}

impl Neg for PlanarVector {
    type Output = PlanarVector;

    fn neg(self) -> PlanarVector {
        PlanarVector::new(-self.x, -self.y)
    }
}

/// Axis-aligned box. The constructor orders the corners so `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectBounds {
    pub min: PlanarVector,
    pub max: PlanarVector,
}

impl RectBounds {
    pub fn new(a: PlanarVector, b: PlanarVector) -> Self {
        Self {
            min: PlanarVector::new(a.x.min(b.x), a.y.min(b.y)),
            max: PlanarVector::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Bounds anchored at the origin.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(PlanarVector::ZERO, PlanarVector::new(width, height))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> PlanarVector {
        self.min.lerp(self.max, 0.5)
    }

    pub fn contains(&self, point: PlanarVector) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn clamp(&self, point: PlanarVector) -> PlanarVector {
        PlanarVector::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Scales the box about its center. Zero-area boxes and non-finite factors are returned as is.
    pub fn scale(&self, factor: f64) -> Self {
        if !factor.is_finite() || (self.width() <= 0.0 && self.height() <= 0.0) {
            return *self;
        }
        let center = self.center();
        let half = PlanarVector::new(self.width() * 0.5, self.height() * 0.5) * factor.abs();
        Self::new(center - half, center + half)
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.x <= self.max.x && self.min.y <= self.max.y
    }
}

impl Default for RectBounds {
    fn default() -> Self {
        Self::from_size(1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn normalize_yields_unit_length() {
        for v in [
            PlanarVector::new(3.0, 4.0),
            PlanarVector::new(-0.001, 0.0),
            PlanarVector::new(1e6, -2e6),
        ] {
            assert!((v.normalize().magnitude() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn normalize_of_zero_is_zero() {
        assert_eq!(PlanarVector::ZERO.normalize(), PlanarVector::ZERO);
    }

    #[test]
    fn rotate_quarter_turn() {
        let rotated = PlanarVector::new(1.0, 0.0).rotate(PI / 2.0);
        assert!(rotated.x.abs() < 1e-12);
        assert!((rotated.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn angle_range_includes_pi() {
        assert!((PlanarVector::new(-1.0, 0.0).angle() - PI).abs() < 1e-12);
        assert!((PlanarVector::new(0.0, -1.0).angle() + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_is_idempotent_and_in_bounds() {
        let bounds = RectBounds::from_size(372.0, 824.0);
        for p in [
            PlanarVector::new(-50.0, 900.0),
            PlanarVector::new(10.0, 10.0),
            PlanarVector::new(400.0, -1.0),
            PlanarVector::new(372.0, 824.0),
        ] {
            let once = bounds.clamp(p);
            assert_eq!(bounds.clamp(once), once);
            assert!(bounds.contains(once));
        }
    }

    #[test]
    fn constructor_orders_corners() {
        let bounds = RectBounds::new(PlanarVector::new(10.0, 5.0), PlanarVector::new(0.0, 20.0));
        assert_eq!(bounds.min, PlanarVector::new(0.0, 5.0));
        assert_eq!(bounds.max, PlanarVector::new(10.0, 20.0));
        assert!(bounds.is_valid());
    }

    #[test]
    fn scale_about_center() {
        let scaled = RectBounds::from_size(100.0, 50.0).scale(0.5);
        assert_eq!(scaled.center(), PlanarVector::new(50.0, 25.0));
        assert!((scaled.width() - 50.0).abs() < 1e-12);
        assert!((scaled.height() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn scale_of_degenerate_bounds_is_unchanged() {
        let point = RectBounds::new(PlanarVector::new(3.0, 3.0), PlanarVector::new(3.0, 3.0));
        assert_eq!(point.scale(4.0), point);
        let bounds = RectBounds::from_size(10.0, 10.0);
        assert_eq!(bounds.scale(f64::NAN), bounds);
    }
}
