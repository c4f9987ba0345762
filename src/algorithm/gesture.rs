//! Unistroke recognition for one press-move-release path.
//!
//! Short, nearly stationary strokes are taps and long, nearly straight strokes are swipes.
//! Anything else is resampled to a fixed point count, normalized into the [-1, 1] square and
//! compared against registered templates by mean point distance.

use std::f64::consts::{PI, SQRT_2};

use crate::algorithm::bezier;
use crate::models::config::GestureConfig;
use crate::models::events::{GestureKind, SwipeDirection};
use crate::models::geometry::PlanarVector;

/// Largest possible distance between two points of the normalized square.
const MAX_NORMALIZED_DISTANCE: f64 = 2.0 * SQRT_2;
const BUILTIN_CIRCLE_POINTS: usize = 32;

/// A labelled reference stroke, stored exactly as registered.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTemplate {
    pub label: GestureKind,
    pub points: Vec<PlanarVector>,
}

impl GestureTemplate {
    pub fn new(label: GestureKind, points: Vec<PlanarVector>) -> Self {
        Self { label, points }
    }

    /// Resampled and normalized form used for matching; `None` for a stroke without length.
    pub fn normalized(&self, point_count: usize) -> Option<Vec<PlanarVector>> {
        resample(&self.points, point_count).map(|points| normalize(&points))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureMatch {
    pub kind: GestureKind,
    pub score: f64,
}

#[derive(Debug, Clone)]
struct PreparedTemplate {
    label: GestureKind,
    points: Vec<PlanarVector>,
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    templates: Vec<GestureTemplate>,
    prepared: Vec<PreparedTemplate>,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            templates: Vec::new(),
            prepared: Vec::new(),
        }
    }

    pub fn with_builtin_templates(config: GestureConfig) -> Self {
        let mut recognizer = Self::new(config);
        for template in builtin_templates() {
            recognizer.register_template(template);
        }
        recognizer
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn templates(&self) -> &[GestureTemplate] {
        &self.templates
    }

    /// Adds a template after the existing ones. Strokes without length cannot be matched and
    /// are refused.
    pub fn register_template(&mut self, template: GestureTemplate) -> bool {
        let Some(points) = template.normalized(self.config.resample_points) else {
            log::warn!(
                "gesture: template {:?} has no length and was not registered",
                template.label
            );
            return false;
        };

        self.prepared.push(PreparedTemplate {
            label: template.label.clone(),
            points,
        });
        self.templates.push(template);
        true
    }

    pub fn recognize(&self, points: &[PlanarVector]) -> Option<GestureMatch> {
        let (first, last) = match (points.first(), points.last()) {
            (Some(first), Some(last)) if points.len() >= 2 => (*first, *last),
            _ => return None,
        };

        let displacement = last - first;
        let distance = displacement.magnitude();
        if distance < self.config.tap_max_distance && points.len() < self.config.tap_max_samples {
            return Some(GestureMatch {
                kind: GestureKind::Tap,
                score: 1.0,
            });
        }

        let length = path_length(points);
        if distance > self.config.swipe_min_distance
            && length < self.config.swipe_max_straightness * distance
        {
            return Some(GestureMatch {
                kind: GestureKind::Swipe {
                    direction: swipe_direction(displacement),
                },
                score: 1.0,
            });
        }

        if length < self.config.min_template_path_length
            || aspect_ratio(points) < self.config.min_template_aspect
        {
            return None;
        }
        self.match_template(points)
    }

    /// Best template above the threshold. Equal scores keep the template registered first.
    pub fn match_template(&self, points: &[PlanarVector]) -> Option<GestureMatch> {
        let smoothed;
        let candidate = if self.config.pre_smooth {
            smoothed = bezier::smooth_path(points, self.config.smoothing_samples);
            &smoothed[..]
        } else {
            points
        };

        let resampled = resample(candidate, self.config.resample_points)?;
        let normalized = normalize(&resampled);

        let mut best: Option<GestureMatch> = None;
        for template in &self.prepared {
            let score = similarity(&normalized, &template.points);
            if best.as_ref().map_or(true, |current| score > current.score) {
                best = Some(GestureMatch {
                    kind: template.label.clone(),
                    score,
                });
            }
        }

        let best = best?;
        log::debug!(
            "gesture: best template {:?} score={:.3} threshold={:.3}",
            best.kind,
            best.score,
            self.config.match_threshold
        );
        (best.score > self.config.match_threshold).then_some(best)
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::with_builtin_templates(GestureConfig::default())
    }
}

pub fn path_length(points: &[PlanarVector]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance(pair[1]))
        .sum()
}

/// Shorter side of the bounding box over the longer one; 0 for a box without extent.
pub fn aspect_ratio(points: &[PlanarVector]) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    let (mut min, mut max) = (*first, *first);
    for point in points {
        min = PlanarVector::new(min.x.min(point.x), min.y.min(point.y));
        max = PlanarVector::new(max.x.max(point.x), max.y.max(point.y));
    }
    let (width, height) = (max.x - min.x, max.y - min.y);
    let major = width.max(height);
    if major <= f64::EPSILON {
        return 0.0;
    }
    width.min(height) / major
}

/// Walks the path and emits a point every `path_length / (count - 1)` units of arc length.
/// Paths with fewer than two points or no length have no resampling.
pub fn resample(points: &[PlanarVector], count: usize) -> Option<Vec<PlanarVector>> {
    if points.len() < 2 || count < 2 {
        return None;
    }

    let length = path_length(points);
    if !length.is_finite() || length <= f64::EPSILON {
        return None;
    }

    let interval = length / (count - 1) as f64;
    let mut result = Vec::with_capacity(count);
    result.push(points[0]);

    let mut accumulated = 0.0;
    let mut previous = points[0];
    let mut idx = 1usize;
    while idx < points.len() && result.len() < count {
        let current = points[idx];
        let segment = previous.distance(current);
        if segment > 0.0 && accumulated + segment >= interval {
            let t = (interval - accumulated) / segment;
            let crossing = previous.lerp(current, t);
            result.push(crossing);
            previous = crossing;
            accumulated = 0.0;
        } else {
            accumulated += segment;
            previous = current;
            idx += 1;
        }
    }

    // Rounding can leave the final crossing just short of the end.
    let last = points[points.len() - 1];
    while result.len() < count {
        result.push(last);
    }
    Some(result)
}

/// Centers the bounding box on the origin and scales its larger side to 2. A box without
/// extent is returned unmodified.
pub fn normalize(points: &[PlanarVector]) -> Vec<PlanarVector> {
    let Some(first) = points.first() else {
        return Vec::new();
    };

    let (mut min, mut max) = (*first, *first);
    for point in points {
        min = PlanarVector::new(min.x.min(point.x), min.y.min(point.y));
        max = PlanarVector::new(max.x.max(point.x), max.y.max(point.y));
    }

    let scale = (max.x - min.x).max(max.y - min.y);
    if scale <= f64::EPSILON {
        return points.to_vec();
    }

    let center = min.lerp(max, 0.5);
    points
        .iter()
        .map(|point| (*point - center) * (2.0 / scale))
        .collect()
}

/// `1 - mean_distance / (2 * sqrt 2)` over paired points.
pub fn similarity(a: &[PlanarVector], b: &[PlanarVector]) -> f64 {
    let pairs = a.len().min(b.len());
    if pairs == 0 {
        return 0.0;
    }

    let total: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(left, right)| left.distance(*right))
        .sum();
    1.0 - (total / pairs as f64) / MAX_NORMALIZED_DISTANCE
}

/// Quantizes the displacement angle into four 90-degree sectors centered on the axes.
pub fn swipe_direction(displacement: PlanarVector) -> SwipeDirection {
    let mut degrees = displacement.angle() * 180.0 / PI;
    if degrees < -45.0 {
        degrees += 360.0;
    }

    if degrees < 45.0 {
        SwipeDirection::Right
    } else if degrees < 135.0 {
        SwipeDirection::Up
    } else if degrees < 225.0 {
        SwipeDirection::Left
    } else {
        SwipeDirection::Down
    }
}

pub fn builtin_templates() -> Vec<GestureTemplate> {
    let circle = (0..=BUILTIN_CIRCLE_POINTS)
        .map(|step| {
            let angle = 2.0 * PI * step as f64 / BUILTIN_CIRCLE_POINTS as f64;
            PlanarVector::new(angle.cos(), angle.sin())
        })
        .collect();

    vec![
        GestureTemplate::new(GestureKind::Circle, circle),
        GestureTemplate::new(
            GestureKind::Check,
            vec![
                PlanarVector::new(0.0, 0.6),
                PlanarVector::new(0.35, 1.0),
                PlanarVector::new(1.0, 0.0),
            ],
        ),
        GestureTemplate::new(
            GestureKind::Caret,
            vec![
                PlanarVector::new(0.0, 1.0),
                PlanarVector::new(0.5, 0.0),
                PlanarVector::new(1.0, 1.0),
            ],
        ),
        GestureTemplate::new(
            GestureKind::Zigzag,
            vec![
                PlanarVector::new(0.0, 0.0),
                PlanarVector::new(0.25, 1.0),
                PlanarVector::new(0.5, 0.0),
                PlanarVector::new(0.75, 1.0),
                PlanarVector::new(1.0, 0.0),
            ],
        ),
    ]
}
