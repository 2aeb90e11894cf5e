//! Host side of the encode step

use crate::compute::{
    ComputeStage, DispatchGrid, EncodeParams, EncodeTargets, ResourceScope, VatImage,
};
use crate::error::{BakeError, BakeResult};
use crate::layout::TextureLayout;
use crate::sample::VertexSample;

/// Smallest grid whose threads cover every texel of `layout`
pub fn dispatch_grid(layout: &TextureLayout, group_size: (u32, u32)) -> DispatchGrid {
    DispatchGrid {
        groups_x: layout.width.div_ceil(group_size.0.max(1)).max(1),
        groups_y: layout.height.div_ceil(group_size.1.max(1)).max(1),
    }
}

/// Whether `grid` launches a thread for every texel
pub fn covers(grid: &DispatchGrid, group_size: (u32, u32), layout: &TextureLayout) -> bool {
    let (threads_x, threads_y) = grid.threads(group_size);
    threads_x >= layout.width && threads_y >= layout.height
}

/// Upload the frame-major sample buffer, run the scatter kernel and read the
/// images back. Resources stay owned by `scope`.
pub fn encode<C: ComputeStage + ?Sized>(
    scope: &mut ResourceScope<'_, C>,
    layout: &TextureLayout,
    params: &EncodeParams,
    samples: &[VertexSample],
    targets: EncodeTargets,
) -> BakeResult<(VatImage, Option<VatImage>)> {
    let expected = layout.frames_sampled as usize * layout.max_vertex_count as usize;
    if samples.len() != expected {
        return Err(BakeError::Compute(format!(
            "sample buffer holds {} samples, layout expects {}",
            samples.len(),
            expected
        )));
    }

    let group_size = scope.thread_group_size();
    let grid = dispatch_grid(layout, group_size);
    if !covers(&grid, group_size, layout) {
        return Err(BakeError::Compute(format!(
            "dispatch grid {:?} does not cover {}x{}",
            grid, layout.width, layout.height
        )));
    }
    tracing::debug!(
        "Dispatching {}x{} groups of {}x{} threads",
        grid.groups_x,
        grid.groups_y,
        group_size.0,
        group_size.1
    );

    let buffer = scope.upload_samples(samples)?;
    scope.dispatch(params, buffer, targets, grid)?;

    let position = scope.read_back(targets.position)?;
    let normal = targets
        .normal
        .map(|handle| scope.read_back(handle))
        .transpose()?;
    Ok((position, normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxTextureWidth;

    #[test]
    fn test_grid_covers_non_multiple_sizes() {
        let layout = TextureLayout::plan(300, 20, MaxTextureWidth::W512);
        let grid = dispatch_grid(&layout, (8, 8));
        assert_eq!(layout.width, 512);
        assert_eq!(layout.height, 21);
        assert_eq!(grid, DispatchGrid { groups_x: 64, groups_y: 3 });
        assert!(covers(&grid, (8, 8), &layout));
    }

    #[test]
    fn test_short_grid_does_not_cover() {
        let layout = TextureLayout::plan(100, 20, MaxTextureWidth::W128);
        let grid = DispatchGrid {
            groups_x: 16,
            groups_y: 2,
        };
        assert!(!covers(&grid, (8, 8), &layout));
    }
}
