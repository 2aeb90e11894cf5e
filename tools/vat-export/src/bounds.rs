//! Animation bounds
//!
//! The playback shader displaces vertices anywhere inside the baked range, so
//! the render mesh gets bounds covering every sampled pose, mirrored about
//! the origin.

use glam::Vec3;

use crate::mesh::Aabb;
use crate::sample::VertexSample;

/// Running componentwise min/max over sampled positions, starting at the origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundsAccumulator {
    min: Vec3,
    max: Vec3,
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn include_samples(&mut self, samples: &[VertexSample]) {
        for sample in samples {
            self.include(sample.position);
        }
    }

    /// Raw accumulated range
    pub fn raw(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }

    /// Symmetric bounds scaled by `root_scale`.
    ///
    /// The corner with the larger length wins: if `|max| > |min|` then
    /// `min = -max`, otherwise `max = -min`.
    pub fn resolve(&self, root_scale: Vec3) -> Aabb {
        let (min, max) = if self.max.length() > self.min.length() {
            (-self.max, self.max)
        } else {
            (self.min, -self.min)
        };
        Aabb::new(min * root_scale, max * root_scale)
    }
}
