//! Topology strategies
//!
//! Fixed and Dynamic topology differ in how the render mesh is built and how
//! each frame is flattened into samples. Both sit behind [`TopologyStrategy`],
//! chosen once per bake by [`select`].

mod dynamic;
mod fixed;

pub use dynamic::DynamicStrategy;
pub use fixed::FixedStrategy;

use glam::Vec3;

use crate::error::BakeResult;
use crate::mesh::BakedMesh;
use crate::sample::FrameSampleSet;
use crate::source::MeshPart;
use crate::topology::{TopologyReport, TopologyType};

pub trait TopologyStrategy {
    fn topology(&self) -> TopologyType;

    /// Sample slots per frame for a source whose parts at the start time are `parts`
    fn max_vertex_count(&self, parts: &[MeshPart]) -> usize;

    /// Build the static render mesh from the parts at the start time
    fn build(&self, parts: &[MeshPart], root_scale: Vec3) -> BakedMesh;

    /// Flatten the current parts into exactly `max_vertex_count` samples
    fn sample(
        &self,
        parts: &[MeshPart],
        frame: u32,
        max_vertex_count: usize,
    ) -> BakeResult<FrameSampleSet>;
}

/// Strategy for a classified source
pub fn select(report: &TopologyReport) -> Box<dyn TopologyStrategy> {
    match report.topology {
        TopologyType::Fixed => Box::new(FixedStrategy),
        TopologyType::Dynamic => Box::new(DynamicStrategy::new(report.max_triangles)),
    }
}
