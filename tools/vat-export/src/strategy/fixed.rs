//! Fixed topology: merged mesh, per-vertex samples

use glam::{Vec2, Vec3, Vec4};

use super::TopologyStrategy;
use crate::error::BakeResult;
use crate::mesh::{Aabb, BakedMesh};
use crate::sample::{FrameSampleSet, VertexSample};
use crate::source::{total_vertices, MeshPart};
use crate::topology::TopologyType;

/// Connectivity is stable, so the render mesh is every part merged and each
/// frame samples the same vertices in the same order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStrategy;

/// Append `attr` if the part has it, else `count` copies of `fill`
fn extend_or_fill<T: Copy>(out: &mut Vec<T>, attr: &[T], count: usize, fill: T) {
    if attr.is_empty() {
        out.extend(std::iter::repeat_n(fill, count));
    } else {
        out.extend(attr.iter().copied().chain(std::iter::repeat(fill)).take(count));
    }
}

impl TopologyStrategy for FixedStrategy {
    fn topology(&self) -> TopologyType {
        TopologyType::Fixed
    }

    fn max_vertex_count(&self, parts: &[MeshPart]) -> usize {
        total_vertices(parts)
    }

    fn build(&self, parts: &[MeshPart], root_scale: Vec3) -> BakedMesh {
        let has_uv = parts.iter().any(MeshPart::has_uvs);
        let has_normal = parts.iter().any(MeshPart::has_normals);
        let has_color = parts.iter().any(MeshPart::has_colors);

        let vertex_count = total_vertices(parts);
        let mut positions = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::new();
        let mut normals = Vec::new();
        let mut colors = Vec::new();
        let mut indices = Vec::new();

        let mut offset = 0u32;
        for part in parts {
            let count = part.vertex_count();
            positions.extend(part.positions.iter().map(|p| *p * root_scale));
            if has_uv {
                extend_or_fill(&mut uvs, &part.uvs, count, Vec2::ZERO);
            }
            if has_normal {
                extend_or_fill(&mut normals, &part.normals, count, Vec3::ZERO);
            }
            if has_color {
                extend_or_fill(&mut colors, &part.colors, count, Vec4::ZERO);
            }
            indices.extend(part.indices.iter().map(|i| i + offset));
            offset += count as u32;
        }

        let mut mesh = BakedMesh {
            positions,
            uvs: has_uv.then_some(uvs),
            normals: has_normal.then_some(normals),
            colors: has_color.then_some(colors),
            indices,
            bounds: Aabb::default(),
        };
        mesh.recalculate_bounds();

        tracing::debug!(
            "Merged {} parts: {} vertices, {} triangles",
            parts.len(),
            mesh.vertex_count(),
            mesh.index_count() / 3
        );
        mesh
    }

    fn sample(
        &self,
        parts: &[MeshPart],
        frame: u32,
        max_vertex_count: usize,
    ) -> BakeResult<FrameSampleSet> {
        let mut set = FrameSampleSet::zeroed(max_vertex_count);
        let slots = set.as_mut_slice();

        let mut written = 0;
        'parts: for part in parts {
            for (i, vertex) in part.positions.iter().enumerate() {
                let Some(slot) = slots.get_mut(written) else {
                    break 'parts;
                };
                let normal = part.normals.get(i).copied().unwrap_or(Vec3::ZERO);
                *slot = VertexSample::new(
                    part.parent.transform_point(*vertex),
                    part.parent.transform_normal(normal),
                );
                written += 1;
            }
        }

        let available = total_vertices(parts);
        if available > max_vertex_count {
            tracing::warn!(
                "Frame {}: {} vertices exceed {} slots, truncated",
                frame,
                available,
                max_vertex_count
            );
        }
        Ok(set)
    }
}
