//! Bezier sampling used to pre-smooth strokes before template matching.

use crate::models::geometry::PlanarVector;

/// De Casteljau evaluation over a scratch buffer, one reduction pass per degree.
pub fn evaluate(control: &[PlanarVector], t: f64) -> Option<PlanarVector> {
    let first = *control.first()?;
    if control.len() == 1 {
        return Some(first);
    }

    let t = t.clamp(0.0, 1.0);
    let mut scratch = control.to_vec();
    for level in (1..scratch.len()).rev() {
        for idx in 0..level {
            scratch[idx] = scratch[idx].lerp(scratch[idx + 1], t);
        }
    }
    Some(scratch[0])
}

/// `samples + 1` evenly spaced parameter values, endpoints included.
pub fn sample_curve(control: &[PlanarVector], samples: usize) -> Vec<PlanarVector> {
    if control.is_empty() {
        return Vec::new();
    }

    let samples = samples.max(1);
    (0..=samples)
        .filter_map(|step| evaluate(control, step as f64 / samples as f64))
        .collect()
}

/// Chains quadratic segments between consecutive midpoints, using each interior point as the
/// control point. Endpoints of the path are kept.
pub fn smooth_path(points: &[PlanarVector], samples_per_segment: usize) -> Vec<PlanarVector> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let samples = samples_per_segment.max(2);
    let last_idx = points.len() - 1;
    let mut result = Vec::with_capacity((points.len() - 2) * samples + 2);
    result.push(points[0]);

    for idx in 1..last_idx {
        let start = if idx == 1 {
            points[0]
        } else {
            points[idx - 1].lerp(points[idx], 0.5)
        };
        let end = if idx + 1 == last_idx {
            points[last_idx]
        } else {
            points[idx].lerp(points[idx + 1], 0.5)
        };

        let segment = sample_curve(&[start, points[idx], end], samples);
        result.extend(segment.into_iter().skip(1));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_hits_endpoints() {
        let control = [
            PlanarVector::new(0.0, 0.0),
            PlanarVector::new(5.0, 10.0),
            PlanarVector::new(10.0, 0.0),
        ];
        assert_eq!(evaluate(&control, 0.0), Some(control[0]));
        assert_eq!(evaluate(&control, 1.0), Some(control[2]));
    }

    #[test]
    fn quadratic_midpoint() {
        let control = [
            PlanarVector::new(0.0, 0.0),
            PlanarVector::new(5.0, 10.0),
            PlanarVector::new(10.0, 0.0),
        ];
        let mid = evaluate(&control, 0.5).expect("non-empty control");
        assert!((mid.x - 5.0).abs() < 1e-12);
        assert!((mid.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn high_degree_curve_is_evaluated_without_recursion() {
        let control: Vec<PlanarVector> = (0..5_000)
            .map(|i| PlanarVector::new(i as f64, (i % 7) as f64))
            .collect();
        let point = evaluate(&control, 1.0).expect("non-empty control");
        assert_eq!(point, control[control.len() - 1]);
    }

    #[test]
    fn empty_control_yields_nothing() {
        assert_eq!(evaluate(&[], 0.5), None);
        assert!(sample_curve(&[], 4).is_empty());
    }

    #[test]
    fn smoothing_keeps_path_endpoints() {
        let path = [
            PlanarVector::new(0.0, 0.0),
            PlanarVector::new(10.0, 10.0),
            PlanarVector::new(20.0, 0.0),
            PlanarVector::new(30.0, 10.0),
        ];
        let smoothed = smooth_path(&path, 4);
        assert_eq!(smoothed.first(), Some(&path[0]));
        assert_eq!(smoothed.last(), Some(&path[3]));
        assert_eq!(smoothed.len(), 1 + 2 * 4);
    }
}
