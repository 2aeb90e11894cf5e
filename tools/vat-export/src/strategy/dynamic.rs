//! Dynamic topology: placeholder triangle soup, per-corner samples

use glam::Vec3;

use super::TopologyStrategy;
use crate::error::{BakeError, BakeResult, ConfigError};
use crate::mesh::{Aabb, BakedMesh};
use crate::sample::{FrameSampleSet, VertexSample};
use crate::source::MeshPart;
use crate::topology::TopologyType;

/// Connectivity changes between frames, so every triangle corner gets its own
/// slot. The render mesh is `max_triangles * 3` unindexed placeholder
/// vertices; the shader moves them from the position image.
///
/// Only the first mesh part is sampled.
#[derive(Debug, Clone, Copy)]
pub struct DynamicStrategy {
    max_triangles: usize,
}

impl DynamicStrategy {
    pub fn new(max_triangles: usize) -> Self {
        Self { max_triangles }
    }

    fn capacity(&self) -> usize {
        self.max_triangles * 3
    }
}

impl TopologyStrategy for DynamicStrategy {
    fn topology(&self) -> TopologyType {
        TopologyType::Dynamic
    }

    fn max_vertex_count(&self, _parts: &[MeshPart]) -> usize {
        self.capacity()
    }

    fn build(&self, _parts: &[MeshPart], _root_scale: Vec3) -> BakedMesh {
        let count = self.capacity();
        let mut mesh = BakedMesh {
            positions: vec![Vec3::ZERO; count],
            uvs: None,
            normals: Some(vec![Vec3::Y; count]),
            colors: None,
            indices: (0..count as u32).collect(),
            bounds: Aabb::default(),
        };
        mesh.recalculate_bounds();
        mesh
    }

    fn sample(
        &self,
        parts: &[MeshPart],
        frame: u32,
        max_vertex_count: usize,
    ) -> BakeResult<FrameSampleSet> {
        let part = parts
            .first()
            .ok_or(ConfigError::DynamicSourceHasNoPart { frame })?;

        let mut set = FrameSampleSet::zeroed(max_vertex_count);
        if part.indices.len() > max_vertex_count {
            tracing::warn!(
                "Frame {}: {} corners exceed {} slots, truncated",
                frame,
                part.indices.len(),
                max_vertex_count
            );
        }

        for (slot, &index) in set.as_mut_slice().iter_mut().zip(&part.indices) {
            let i = index as usize;
            let position = part.positions.get(i).copied().ok_or_else(|| {
                BakeError::Source(format!(
                    "part '{}' index {} out of range ({} vertices) at frame {}",
                    part.name,
                    index,
                    part.vertex_count(),
                    frame
                ))
            })?;
            let normal = part.normals.get(i).copied().unwrap_or(Vec3::ZERO);
            *slot = VertexSample::new(position, normal);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(triangles: usize) -> MeshPart {
        let n = triangles * 3;
        MeshPart {
            name: "fluid".into(),
            positions: (0..n).map(|i| Vec3::splat(i as f32 + 1.0)).collect(),
            normals: vec![Vec3::X; n],
            indices: (0..n as u32).rev().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_placeholder_mesh() {
        let mesh = DynamicStrategy::new(4).build(&[], Vec3::ONE);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.indices, (0..12).collect::<Vec<u32>>());
        assert!(mesh.positions.iter().all(|p| *p == Vec3::ZERO));
        assert!(mesh.normals.unwrap().iter().all(|n| *n == Vec3::Y));
        assert!(mesh.uvs.is_none());
        assert!(mesh.colors.is_none());
    }

    #[test]
    fn test_samples_corners_in_index_order_and_pads() {
        let strategy = DynamicStrategy::new(3);
        let set = strategy.sample(&[part(2)], 0, 9).unwrap();
        assert_eq!(set.len(), 9);
        assert_eq!(set.as_slice()[0].position, Vec3::splat(6.0));
        assert_eq!(set.as_slice()[5].position, Vec3::splat(1.0));
        assert_eq!(set.as_slice()[5].normal, Vec3::X);
        assert_eq!(set.as_slice()[6], VertexSample::ZERO);
    }

    #[test]
    fn test_only_first_part_sampled() {
        let set = DynamicStrategy::new(2)
            .sample(&[part(1), part(1)], 0, 6)
            .unwrap();
        assert_eq!(set.as_slice()[3], VertexSample::ZERO);
    }

    #[test]
    fn test_excess_corners_truncated() {
        let set = DynamicStrategy::new(1).sample(&[part(2)], 4, 3).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.as_slice()[0].position, Vec3::splat(6.0));
    }

    #[test]
    fn test_missing_part_is_error() {
        let result = DynamicStrategy::new(1).sample(&[], 3, 3);
        assert_eq!(
            result,
            Err(BakeError::Configuration(ConfigError::DynamicSourceHasNoPart {
                frame: 3
            }))
        );
    }

    #[test]
    fn test_bad_index_is_source_error() {
        let mut bad = part(1);
        bad.indices[1] = 99;
        let result = DynamicStrategy::new(1).sample(&[bad], 0, 3);
        assert!(matches!(result, Err(BakeError::Source(_))));
    }
}
