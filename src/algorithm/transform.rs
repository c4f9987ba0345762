use crate::models::geometry::{PlanarVector, RectBounds};

/// Affine map between two bounded spaces (touchpad space to target-screen space).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    source: RectBounds,
    target: RectBounds,
}

impl CoordinateTransform {
    pub fn new(source: RectBounds, target: RectBounds) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> RectBounds {
        self.source
    }

    pub fn target(&self) -> RectBounds {
        self.target
    }

    /// Per-axis scale factors. An empty source axis maps to a factor of 1.
    pub fn scale(&self) -> PlanarVector {
        PlanarVector::new(
            axis_scale(self.source.width(), self.target.width()),
            axis_scale(self.source.height(), self.target.height()),
        )
    }

    pub fn map_point(&self, point: PlanarVector) -> PlanarVector {
        let scale = self.scale();
        PlanarVector::new(
            self.target.min.x + (point.x - self.source.min.x) * scale.x,
            self.target.min.y + (point.y - self.source.min.y) * scale.y,
        )
    }

    /// Displacements ignore the origin offset and only scale.
    pub fn map_delta(&self, delta: PlanarVector) -> PlanarVector {
        let scale = self.scale();
        PlanarVector::new(delta.x * scale.x, delta.y * scale.y)
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.target, self.source)
    }
}

fn axis_scale(source_extent: f64, target_extent: f64) -> f64 {
    if source_extent.abs() <= f64::EPSILON {
        1.0
    } else {
        target_extent / source_extent
    }
}
