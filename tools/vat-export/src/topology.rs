//! Topology classification
//!
//! Fixed topology keeps the same triangle count at every sampled time and can
//! ship its own connectivity. Anything else (fluids, fracture, remeshing) is
//! Dynamic and bakes as an unindexed triangle soup.

use crate::error::BakeResult;
use crate::source::{total_triangles, AnimatedSource};
use crate::timing::FrameTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyType {
    Fixed,
    Dynamic,
}

impl TopologyType {
    pub fn is_dynamic(self) -> bool {
        self == TopologyType::Dynamic
    }
}

impl std::fmt::Display for TopologyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyType::Fixed => write!(f, "fixed"),
            TopologyType::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Classification outcome with the triangle range that decided it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyReport {
    pub topology: TopologyType,
    pub min_triangles: usize,
    pub max_triangles: usize,
    pub frames_visited: u32,
}

/// Sample triangle counts over `timing.frame_count` frames.
///
/// `Fixed` iff the minimum equals the maximum. The source is sought back to
/// `timing.start` before returning.
pub fn classify<S: AnimatedSource + ?Sized>(
    source: &mut S,
    timing: &FrameTiming,
) -> BakeResult<TopologyReport> {
    let mut min_triangles = usize::MAX;
    let mut max_triangles = 0;

    for frame in 0..timing.frame_count {
        source.seek(timing.time_at(frame))?;
        let triangles = total_triangles(source.parts());
        min_triangles = min_triangles.min(triangles);
        max_triangles = max_triangles.max(triangles);
    }
    source.seek(timing.start)?;

    let topology = if min_triangles == max_triangles {
        TopologyType::Fixed
    } else {
        TopologyType::Dynamic
    };

    tracing::info!(
        "Topology {} ({} frames, triangles {}..={})",
        topology,
        timing.frame_count,
        min_triangles,
        max_triangles
    );

    Ok(TopologyReport {
        topology,
        min_triangles,
        max_triangles,
        frames_visited: timing.frame_count,
    })
}
