//! Compute stage contract
//!
//! The encode step scatters a flat, frame-major sample buffer into the VAT
//! images. Any backend that can allocate images, take an uploaded buffer,
//! run the scatter over a dispatch grid and read images back implements
//! [`ComputeStage`]. [`CpuComputeStage`] is always available.
//!
//! Resources belong to one bake. [`ResourceScope`] tracks what a bake
//! allocates and releases it on drop, so early returns (cancellation,
//! errors) never leak.

mod cpu;

pub use cpu::CpuComputeStage;

use glam::Vec3;
use vat_common::TexelFormat;

use crate::error::BakeResult;
use crate::sample::VertexSample;

/// Opaque handle to an image owned by a compute stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(u32);

impl ImageHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

/// Opaque handle to an uploaded sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

impl BufferHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

/// Uniform inputs of the scatter kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeParams {
    pub max_vertex_count: u32,
    pub texture_width: u32,
    pub rows_per_frame: u32,
    pub pack_normal_into_alpha: bool,
    /// Applied to every sampled position
    pub root_scale: Vec3,
}

/// Thread groups launched along x and y
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGrid {
    pub groups_x: u32,
    pub groups_y: u32,
}

impl DispatchGrid {
    /// Threads launched along each axis for `group_size` threads per group
    pub fn threads(&self, group_size: (u32, u32)) -> (u32, u32) {
        (
            self.groups_x.saturating_mul(group_size.0),
            self.groups_y.saturating_mul(group_size.1),
        )
    }
}

/// Images the kernel writes; `normal` is `None` when packing into alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeTargets {
    pub position: ImageHandle,
    pub normal: Option<ImageHandle>,
}

/// A read-back VAT image, row-major RGBA
#[derive(Debug, Clone, PartialEq)]
pub struct VatImage {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: TexelFormat,
    pub texels: Vec<[f32; 4]>,
}

impl VatImage {
    /// A zero-cleared image
    pub fn new(label: &str, width: u32, height: u32, format: TexelFormat) -> Self {
        Self {
            label: label.to_string(),
            width,
            height,
            format,
            texels: vec![[0.0; 4]; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        self.texels[(y * self.width + x) as usize]
    }
}

/// A parallel compute backend able to run the VAT scatter kernel
pub trait ComputeStage {
    /// Threads per group along x and y
    fn thread_group_size(&self) -> (u32, u32);

    /// Allocate a zero-cleared image
    fn create_image(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        format: TexelFormat,
    ) -> BakeResult<ImageHandle>;

    fn upload_samples(&mut self, samples: &[VertexSample]) -> BakeResult<BufferHandle>;

    /// Run the scatter kernel over `grid`. Texels outside the launched
    /// threads are left untouched.
    fn dispatch(
        &mut self,
        params: &EncodeParams,
        samples: BufferHandle,
        targets: EncodeTargets,
        grid: DispatchGrid,
    ) -> BakeResult<()>;

    fn read_back(&mut self, image: ImageHandle) -> BakeResult<VatImage>;

    fn release_buffer(&mut self, buffer: BufferHandle);

    fn release_image(&mut self, image: ImageHandle);

    /// Images and buffers currently allocated
    fn live_resources(&self) -> usize;
}

/// Owns every resource one bake allocates on a compute stage
pub struct ResourceScope<'a, C: ComputeStage + ?Sized> {
    stage: &'a mut C,
    images: Vec<ImageHandle>,
    buffers: Vec<BufferHandle>,
}

impl<'a, C: ComputeStage + ?Sized> ResourceScope<'a, C> {
    pub fn new(stage: &'a mut C) -> Self {
        Self {
            stage,
            images: Vec::new(),
            buffers: Vec::new(),
        }
    }

    pub fn thread_group_size(&self) -> (u32, u32) {
        self.stage.thread_group_size()
    }

    pub fn create_image(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        format: TexelFormat,
    ) -> BakeResult<ImageHandle> {
        let image = self.stage.create_image(label, width, height, format)?;
        self.images.push(image);
        Ok(image)
    }

    pub fn upload_samples(&mut self, samples: &[VertexSample]) -> BakeResult<BufferHandle> {
        let buffer = self.stage.upload_samples(samples)?;
        self.buffers.push(buffer);
        Ok(buffer)
    }

    pub fn dispatch(
        &mut self,
        params: &EncodeParams,
        samples: BufferHandle,
        targets: EncodeTargets,
        grid: DispatchGrid,
    ) -> BakeResult<()> {
        self.stage.dispatch(params, samples, targets, grid)
    }

    pub fn read_back(&mut self, image: ImageHandle) -> BakeResult<VatImage> {
        self.stage.read_back(image)
    }

    /// Resources held by this scope
    pub fn held(&self) -> usize {
        self.images.len() + self.buffers.len()
    }
}

impl<C: ComputeStage + ?Sized> Drop for ResourceScope<'_, C> {
    fn drop(&mut self) {
        for buffer in self.buffers.drain(..) {
            self.stage.release_buffer(buffer);
        }
        for image in self.images.drain(..) {
            self.stage.release_image(image);
        }
    }
}
