//! Animated mesh sources
//!
//! A source is a seekable animation: seeking rewrites the mesh part
//! snapshots in place, so anything read from [`AnimatedSource::parts`] is only
//! valid until the next [`AnimatedSource::seek`]. The borrow returned by
//! `parts()` enforces that; samplers copy out what they need.

mod memory;
mod obj_sequence;

pub use memory::MemorySource;
pub use obj_sequence::{load_obj_frame, ObjSequenceSource, DEFAULT_SEQUENCE_FPS};

use glam::{Quat, Vec2, Vec3, Vec4};
use std::path::Path;

use crate::error::BakeError;

/// Local transform of a mesh part's parent node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for ParentTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ParentTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// `position + rotation * (point ⊙ scale)`
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (point * self.scale)
    }

    /// Rotation only. Scale is not applied to normals.
    #[inline]
    pub fn transform_normal(&self, normal: Vec3) -> Vec3 {
        self.rotation * normal
    }
}

/// Snapshot of one sub-mesh at the source's current time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshPart {
    pub name: String,
    pub parent: ParentTransform,
    pub positions: Vec<Vec3>,
    /// Empty if the part has no normals
    pub normals: Vec<Vec3>,
    /// Empty if the part has no UVs
    pub uvs: Vec<Vec2>,
    /// Empty if the part has no vertex colors
    pub colors: Vec<Vec4>,
    /// Triangle list
    pub indices: Vec<u32>,
}

impl MeshPart {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }
}

/// Seekable animated mesh source
pub trait AnimatedSource {
    /// Clip length in seconds
    fn duration(&self) -> f32;

    /// Nominal start time of the clip
    fn start_time(&self) -> f32;

    /// Scale of the source's root node, baked into final positions
    fn root_scale(&self) -> Vec3 {
        Vec3::ONE
    }

    /// Move every mesh part to its deformed state at `time`.
    ///
    /// Must be deterministic and idempotent.
    fn seek(&mut self, time: f32) -> Result<(), BakeError>;

    /// Mesh parts at the current time, in a stable order
    fn parts(&self) -> &[MeshPart];

    /// Albedo texture of the first part's material, passed through to the result
    fn main_texture(&self) -> Option<&Path> {
        None
    }
}

/// Total triangle count across all parts
pub fn total_triangles(parts: &[MeshPart]) -> usize {
    parts.iter().map(MeshPart::triangle_count).sum()
}

/// Total vertex count across all parts
pub fn total_vertices(parts: &[MeshPart]) -> usize {
    parts.iter().map(MeshPart::vertex_count).sum()
}
