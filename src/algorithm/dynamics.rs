//! Post-release cursor motion: spring attraction, frictional momentum and attractor fields.

use crate::models::config::{MomentumConfig, SpringConfig};
use crate::models::geometry::{PlanarVector, RectBounds};

/// Distance below which an attractor exerts no force.
const ATTRACTOR_EPSILON: f64 = 1e-6;
const REST_EPSILON: f64 = 1e-6;

/// A physical model that moves a position forward by one step.
pub trait DynamicalSystem {
    fn advance(&mut self, position: PlanarVector, dt: f64) -> PlanarVector;

    fn is_active(&self) -> bool;

    fn reset(&mut self);
}

/// Advances `system` one step and keeps the result inside `bounds`.
pub fn drive<S: DynamicalSystem>(
    system: &mut S,
    position: PlanarVector,
    dt: f64,
    bounds: &RectBounds,
) -> PlanarVector {
    bounds.clamp(system.advance(position, dt))
}

pub fn critical_damping(stiffness: f64, mass: f64) -> f64 {
    2.0 * (stiffness.max(0.0001) * mass.max(0.0001)).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringDamper {
    pub position: PlanarVector,
    pub velocity: PlanarVector,
    pub target: PlanarVector,
    k: f64,
    damping_ratio: f64,
    m: f64,
}

impl SpringDamper {
    pub fn new(stiffness: f64, damping_ratio: f64, mass: f64) -> Self {
        Self {
            position: PlanarVector::ZERO,
            velocity: PlanarVector::ZERO,
            target: PlanarVector::ZERO,
            k: stiffness.max(0.0001),
            damping_ratio: damping_ratio.max(0.0),
            m: mass.max(0.0001),
        }
    }

    pub fn from_config(config: &SpringConfig) -> Self {
        Self::new(config.stiffness, config.damping_ratio, config.mass)
    }

    /// `c = 2 * zeta * sqrt(k * m)`.
    pub fn damping(&self) -> f64 {
        self.damping_ratio * critical_damping(self.k, self.m)
    }

    /// Analytic estimate of the time to settle within about 2% of the target.
    pub fn settling_time(&self) -> f64 {
        let natural_frequency = (self.k / self.m).sqrt();
        let decay = self.damping_ratio * natural_frequency;
        if decay <= 0.0 {
            return f64::INFINITY;
        }
        4.0 / decay
    }

    /// One explicit Euler step toward `target`.
    pub fn step(&mut self, dt: f64) -> PlanarVector {
        let safe_dt = dt.max(0.000_001);
        let force = (self.position - self.target) * -self.k - self.velocity * self.damping();
        self.velocity += force * (safe_dt / self.m);
        self.position += self.velocity * safe_dt;
        self.position
    }
}

impl DynamicalSystem for SpringDamper {
    fn advance(&mut self, position: PlanarVector, dt: f64) -> PlanarVector {
        self.position = position;
        self.step(dt)
    }

    fn is_active(&self) -> bool {
        self.position.distance(self.target) > REST_EPSILON || self.velocity.magnitude() > REST_EPSILON
    }

    fn reset(&mut self) {
        self.velocity = PlanarVector::ZERO;
        self.target = self.position;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumSystem {
    velocity: PlanarVector,
    friction: f64,
    min_speed: f64,
}

impl MomentumSystem {
    pub fn new(friction: f64, min_speed: f64) -> Self {
        Self {
            velocity: PlanarVector::ZERO,
            friction: friction.clamp(0.0, 1.0),
            min_speed: min_speed.max(0.0),
        }
    }

    pub fn from_config(config: &MomentumConfig) -> Self {
        Self::new(config.friction, config.min_speed)
    }

    pub fn velocity(&self) -> PlanarVector {
        self.velocity
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn apply_impulse(&mut self, impulse: PlanarVector) {
        if impulse.is_finite() {
            self.velocity += impulse;
        }
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != PlanarVector::ZERO
    }

    /// Applies one tick of friction, then returns `position + velocity * dt`.
    pub fn update(&mut self, position: PlanarVector, dt: f64) -> PlanarVector {
        self.velocity = self.velocity * self.friction;
        if self.velocity.magnitude() < self.min_speed {
            self.velocity = PlanarVector::ZERO;
        }
        position + self.velocity * dt
    }
}

impl Default for MomentumSystem {
    fn default() -> Self {
        Self::from_config(&MomentumConfig::default())
    }
}

impl DynamicalSystem for MomentumSystem {
    fn advance(&mut self, position: PlanarVector, dt: f64) -> PlanarVector {
        self.update(position, dt)
    }

    fn is_active(&self) -> bool {
        self.is_moving()
    }

    fn reset(&mut self) {
        self.velocity = PlanarVector::ZERO;
    }
}

/// Point attractors with inverse-square pull. Replace the whole field to change it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttractorField {
    attractors: Vec<PlanarVector>,
    strength: f64,
    radius: f64,
    capture_radius: f64,
}

impl AttractorField {
    pub fn new(attractors: Vec<PlanarVector>, strength: f64, radius: f64, capture_radius: f64) -> Self {
        let radius = radius.max(0.0);
        Self {
            attractors,
            strength,
            radius,
            capture_radius: capture_radius.clamp(0.0, radius),
        }
    }

    pub fn attractors(&self) -> &[PlanarVector] {
        &self.attractors
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn capture_radius(&self) -> f64 {
        self.capture_radius
    }

    /// Sum of `strength / d^2` toward every attractor with `epsilon < d <= radius`.
    pub fn force(&self, at: PlanarVector) -> PlanarVector {
        let mut total = PlanarVector::ZERO;
        for attractor in &self.attractors {
            let offset = *attractor - at;
            let distance = offset.magnitude();
            if distance <= ATTRACTOR_EPSILON || distance > self.radius {
                continue;
            }
            total += offset.normalize() * (self.strength / (distance * distance));
        }
        total
    }

    pub fn nearest(&self, to: PlanarVector) -> Option<PlanarVector> {
        self.attractors
            .iter()
            .copied()
            .min_by(|a, b| a.distance(to).total_cmp(&b.distance(to)))
    }

    pub fn is_captured(&self, point: PlanarVector) -> bool {
        self.attractors
            .iter()
            .any(|attractor| attractor.distance(point) <= self.capture_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spring_converges_to_target() {
        let mut spring = SpringDamper::new(170.0, 1.0, 1.0);
        spring.target = PlanarVector::new(100.0, -40.0);
        for _ in 0..240 {
            spring.step(1.0 / 120.0);
        }
        assert!(spring.position.distance(spring.target) < 0.5);
    }

    #[test]
    fn critical_spring_does_not_overshoot_much() {
        let mut spring = SpringDamper::new(170.0, 1.0, 1.0);
        spring.target = PlanarVector::new(10.0, 0.0);
        let mut max_x: f64 = 0.0;
        for _ in 0..600 {
            max_x = max_x.max(spring.step(1.0 / 240.0).x);
        }
        assert!(max_x < 10.2);
    }

    #[test]
    fn settling_time_matches_analytic_estimate() {
        let spring = SpringDamper::new(100.0, 0.5, 1.0);
        assert!((spring.settling_time() - 0.8).abs() < 1e-12);
        assert!((spring.damping() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn undamped_spring_never_settles() {
        assert!(SpringDamper::new(100.0, 0.0, 1.0).settling_time().is_infinite());
    }

    #[test]
    fn momentum_decays_then_snaps_to_zero() {
        let mut momentum = MomentumSystem::new(0.9, 0.1);
        momentum.apply_impulse(PlanarVector::new(10.0, 0.0));
        let mut position = PlanarVector::ZERO;
        let mut previous_speed = momentum.velocity().magnitude();
        let mut ticks = 0;
        while momentum.is_moving() {
            position = momentum.update(position, 1.0);
            let speed = momentum.velocity().magnitude();
            assert!(speed < previous_speed);
            if speed > 0.0 {
                assert!(speed >= 0.1);
            }
            previous_speed = speed;
            ticks += 1;
            assert!(ticks < 1_000);
        }
        assert_eq!(momentum.velocity(), PlanarVector::ZERO);
        assert!(!momentum.is_moving());
        assert!(position.x > 0.0);
    }

    #[test]
    fn momentum_update_returns_advanced_position() {
        let mut momentum = MomentumSystem::new(0.5, 0.1);
        momentum.apply_impulse(PlanarVector::new(4.0, 2.0));
        let next = momentum.update(PlanarVector::new(1.0, 1.0), 0.5);
        assert_eq!(next, PlanarVector::new(2.0, 1.5));
    }

    #[test]
    fn force_is_zero_outside_radius() {
        let field = AttractorField::new(
            vec![PlanarVector::new(0.0, 0.0), PlanarVector::new(100.0, 0.0)],
            50.0,
            20.0,
            5.0,
        );
        for p in [
            PlanarVector::new(50.0, 0.0),
            PlanarVector::new(0.0, 30.0),
            PlanarVector::new(121.0, 0.0),
        ] {
            assert_eq!(field.force(p), PlanarVector::ZERO);
        }
    }

    #[test]
    fn force_points_toward_attractor_in_range() {
        let attractor = PlanarVector::new(10.0, 10.0);
        let field = AttractorField::new(vec![attractor, PlanarVector::new(500.0, 500.0)], 50.0, 30.0, 2.0);
        for p in [
            PlanarVector::new(0.0, 0.0),
            PlanarVector::new(25.0, 12.0),
            PlanarVector::new(10.0, 35.0),
        ] {
            let force = field.force(p);
            let toward = attractor - p;
            assert!(force.magnitude() > 0.0);
            assert!((force.normalize().dot(toward.normalize()) - 1.0).abs() < 1e-9);
            assert!((force.magnitude() - 50.0 / toward.magnitude_squared()).abs() < 1e-9);
        }
    }

    #[test]
    fn attractor_at_the_point_is_skipped() {
        let field = AttractorField::new(vec![PlanarVector::new(3.0, 3.0)], 50.0, 30.0, 2.0);
        assert_eq!(field.force(PlanarVector::new(3.0, 3.0)), PlanarVector::ZERO);
    }

    #[test]
    fn nearest_and_capture() {
        let field = AttractorField::new(
            vec![PlanarVector::new(0.0, 0.0), PlanarVector::new(10.0, 0.0)],
            1.0,
            50.0,
            2.0,
        );
        assert_eq!(field.nearest(PlanarVector::new(7.0, 1.0)), Some(PlanarVector::new(10.0, 0.0)));
        assert!(field.is_captured(PlanarVector::new(9.0, 1.0)));
        assert!(!field.is_captured(PlanarVector::new(5.0, 0.0)));

        let empty = AttractorField::new(Vec::new(), 1.0, 50.0, 2.0);
        assert_eq!(empty.nearest(PlanarVector::ZERO), None);
    }

    #[test]
    fn drive_clamps_into_bounds() {
        let mut momentum = MomentumSystem::new(1.0, 0.1);
        momentum.apply_impulse(PlanarVector::new(1_000.0, 0.0));
        let bounds = RectBounds::from_size(100.0, 100.0);
        let next = drive(&mut momentum, PlanarVector::new(50.0, 50.0), 1.0, &bounds);
        assert_eq!(next, PlanarVector::new(100.0, 50.0));
    }
}
