//! CPU compute stage
//!
//! Runs the scatter kernel one image row per rayon task. Only texels inside
//! the launched thread grid are written, the same as a GPU dispatch.

use half::f16;
use hashbrown::HashMap;
use rayon::prelude::*;
use vat_common::{pack_normal_alpha, texel_to_f16, TexelFormat};

use super::{
    BufferHandle, ComputeStage, DispatchGrid, EncodeParams, EncodeTargets, ImageHandle, VatImage,
};
use crate::error::{BakeError, BakeResult};
use crate::sample::VertexSample;

/// Threads per group, matching an 8x8 compute workgroup
pub const CPU_THREAD_GROUP: (u32, u32) = (8, 8);

#[derive(Debug, Default)]
pub struct CpuComputeStage {
    images: HashMap<ImageHandle, VatImage>,
    buffers: HashMap<BufferHandle, Vec<VertexSample>>,
    next_id: u32,
}

impl CpuComputeStage {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Round a texel through the image's storage format
#[inline]
fn store(format: TexelFormat, texel: [f32; 4]) -> [f32; 4] {
    match format {
        TexelFormat::Rgba32Float => texel,
        TexelFormat::Rgba16Float => texel_to_f16(texel).map(f16::to_f32),
    }
}

/// Sample feeding texel (x, y), if any
#[inline]
fn sample_at<'a>(
    samples: &'a [VertexSample],
    params: &EncodeParams,
    x: u32,
    y: u32,
) -> Option<&'a VertexSample> {
    let rows = params.rows_per_frame.max(1);
    let frame = (y / rows) as usize;
    let slot = (y % rows) * params.texture_width + x;
    if slot >= params.max_vertex_count {
        return None;
    }
    samples.get(frame * params.max_vertex_count as usize + slot as usize)
}

/// One launch of the scatter kernel over a row-parallel grid
struct ScatterKernel<'a> {
    samples: &'a [VertexSample],
    params: &'a EncodeParams,
    covered_x: u32,
    position_format: TexelFormat,
    normal_format: TexelFormat,
}

impl ScatterKernel<'_> {
    fn row(&self, y: u32, pos_row: &mut [[f32; 4]], mut nrm_row: Option<&mut [[f32; 4]]>) {
        let params = self.params;
        for x in 0..self.covered_x {
            let Some(sample) = sample_at(self.samples, params, x, y) else {
                continue;
            };
            let p = sample.position * params.root_scale;
            let alpha = if params.pack_normal_into_alpha {
                pack_normal_alpha(sample.normal)
            } else {
                1.0
            };
            pos_row[x as usize] = store(self.position_format, [p.x, p.y, p.z, alpha]);
            if let Some(nrm_row) = nrm_row.as_deref_mut() {
                let n = sample.normal;
                nrm_row[x as usize] = store(self.normal_format, [n.x, n.y, n.z, 1.0]);
            }
        }
    }
}

impl ComputeStage for CpuComputeStage {
    fn thread_group_size(&self) -> (u32, u32) {
        CPU_THREAD_GROUP
    }

    fn create_image(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        format: TexelFormat,
    ) -> BakeResult<ImageHandle> {
        if width == 0 || height == 0 {
            return Err(BakeError::Compute(format!(
                "cannot allocate {}x{} image '{}'",
                width, height, label
            )));
        }
        let handle = ImageHandle::new(self.next_id());
        self.images
            .insert(handle, VatImage::new(label, width, height, format));
        tracing::debug!("Allocated image '{}' {}x{} {:?}", label, width, height, format);
        Ok(handle)
    }

    fn upload_samples(&mut self, samples: &[VertexSample]) -> BakeResult<BufferHandle> {
        let handle = BufferHandle::new(self.next_id());
        tracing::debug!(
            "Uploaded {} samples ({} bytes)",
            samples.len(),
            bytemuck::cast_slice::<VertexSample, u8>(samples).len()
        );
        self.buffers.insert(handle, samples.to_vec());
        Ok(handle)
    }

    fn dispatch(
        &mut self,
        params: &EncodeParams,
        buffer: BufferHandle,
        targets: EncodeTargets,
        grid: DispatchGrid,
    ) -> BakeResult<()> {
        let samples = self
            .buffers
            .get(&buffer)
            .ok_or_else(|| BakeError::Compute(format!("unknown sample buffer {:?}", buffer)))?;

        let mut position = self.images.remove(&targets.position).ok_or_else(|| {
            BakeError::Compute(format!("unknown position image {:?}", targets.position))
        })?;
        let mut normal = match targets.normal {
            Some(handle) => match self.images.remove(&handle) {
                Some(image) => Some(image),
                None => {
                    self.images.insert(targets.position, position);
                    return Err(BakeError::Compute(format!(
                        "unknown normal image {:?}",
                        handle
                    )));
                }
            },
            None => None,
        };

        let (threads_x, threads_y) = grid.threads(CPU_THREAD_GROUP);
        let width = position.width as usize;
        let kernel = ScatterKernel {
            samples,
            params,
            covered_x: threads_x.min(position.width),
            position_format: position.format,
            normal_format: normal.as_ref().map_or(TexelFormat::Rgba16Float, |n| n.format),
        };
        let covered_y = threads_y.min(position.height) as usize;

        let pos_rows = position.texels.par_chunks_mut(width).take(covered_y);
        match normal.as_mut() {
            Some(nrm_image) => pos_rows
                .zip(nrm_image.texels.par_chunks_mut(width))
                .enumerate()
                .for_each(|(y, (pos_row, nrm_row))| kernel.row(y as u32, pos_row, Some(nrm_row))),
            None => pos_rows
                .enumerate()
                .for_each(|(y, pos_row)| kernel.row(y as u32, pos_row, None)),
        }

        self.images.insert(targets.position, position);
        if let (Some(handle), Some(image)) = (targets.normal, normal) {
            self.images.insert(handle, image);
        }
        Ok(())
    }

    fn read_back(&mut self, image: ImageHandle) -> BakeResult<VatImage> {
        self.images
            .get(&image)
            .cloned()
            .ok_or_else(|| BakeError::Compute(format!("unknown image {:?}", image)))
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
    }

    fn release_image(&mut self, image: ImageHandle) {
        self.images.remove(&image);
    }

    fn live_resources(&self) -> usize {
        self.images.len() + self.buffers.len()
    }
}
