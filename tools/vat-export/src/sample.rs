//! Per-frame vertex samples

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// One baked vertex at one frame.
///
/// `#[repr(C)]` and `Pod` so a frame set uploads to the compute stage as
/// raw bytes (24 bytes per sample).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexSample {
    pub position: Vec3,
    pub normal: Vec3,
}

impl VertexSample {
    pub const ZERO: Self = Self {
        position: Vec3::ZERO,
        normal: Vec3::ZERO,
    };

    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// Index-stable samples of one frame, always `max_vertex_count` long
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSampleSet(Vec<VertexSample>);

impl FrameSampleSet {
    /// Zero-filled set of `len` slots
    pub fn zeroed(len: usize) -> Self {
        Self(vec![VertexSample::ZERO; len])
    }

    pub fn as_slice(&self) -> &[VertexSample] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [VertexSample] {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VertexSample> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<VertexSample> {
        self.0
    }
}
