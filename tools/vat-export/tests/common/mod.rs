//! Test sources and helpers shared by the integration tests

#![allow(dead_code)]

use glam::Vec3;
use std::io::Write;
use std::path::Path;
use vat_common::TexelFormat;
use vat_export::compute::{
    BufferHandle, ComputeStage, CpuComputeStage, DispatchGrid, EncodeParams, EncodeTargets,
    ImageHandle,
};
use vat_export::sample::VertexSample;
use vat_export::{BakeConfig, BakeResult, MemorySource, MeshPart, ParentTransform, VatImage};

/// Keyframes per second of the generated sources
pub const KEYFRAME_RATE: f32 = 20.0;

/// Config sampling keyframes one to one (no start adjustment)
pub fn exact_config() -> BakeConfig {
    BakeConfig {
        sampling_rate: 20,
        time_adjust: 0.0,
        ..BakeConfig::default()
    }
}

/// Quad rising by 0.25 per keyframe
fn quad(frame: usize) -> MeshPart {
    let y = frame as f32 * 0.25;
    MeshPart {
        name: "quad".into(),
        positions: vec![
            Vec3::new(0.0, y, 0.0),
            Vec3::new(1.0, y, 0.0),
            Vec3::new(1.0, y, 1.0),
            Vec3::new(0.0, y, 1.0),
        ],
        normals: vec![Vec3::Y; 4],
        indices: vec![0, 1, 2, 0, 2, 3],
        ..Default::default()
    }
}

/// Static triangle under a parent offset by +2 on x
fn offset_triangle() -> MeshPart {
    MeshPart {
        name: "tri".into(),
        parent: ParentTransform {
            position: Vec3::new(2.0, 0.0, 0.0),
            ..ParentTransform::IDENTITY
        },
        positions: vec![Vec3::ZERO, Vec3::X, Vec3::Z],
        normals: vec![Vec3::Y; 3],
        indices: vec![0, 1, 2],
        ..Default::default()
    }
}

/// Fixed topology: 7 vertices over two parts, `keyframes` keyframes
pub fn rising_source(keyframes: usize) -> MemorySource {
    let frames = (0..keyframes)
        .map(|f| vec![quad(f), offset_triangle()])
        .collect();
    MemorySource::new(frames, KEYFRAME_RATE)
}

/// Triangle soup of `count` triangles, corner `i` at height `frame * 0.5`
pub fn soup(count: usize, frame: usize) -> MeshPart {
    let y = frame as f32 * 0.5;
    let positions = (0..count * 3)
        .map(|i| Vec3::new((i % 3) as f32, y, (i / 3) as f32))
        .collect();
    MeshPart {
        name: "fluid".into(),
        positions,
        normals: vec![Vec3::Z; count * 3],
        indices: (0..(count * 3) as u32).collect(),
        ..Default::default()
    }
}

/// Dynamic topology: triangle count cycles 1, 2, 3
pub fn fluid_source(keyframes: usize) -> MemorySource {
    let frames = (0..keyframes).map(|f| vec![soup(f % 3 + 1, f)]).collect();
    MemorySource::new(frames, KEYFRAME_RATE)
}

/// Compute stage wrapper counting allocations and releases
#[derive(Debug, Default)]
pub struct TrackingStage {
    pub inner: CpuComputeStage,
    pub created: usize,
    pub released: usize,
}

impl ComputeStage for TrackingStage {
    fn thread_group_size(&self) -> (u32, u32) {
        self.inner.thread_group_size()
    }

    fn create_image(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        format: TexelFormat,
    ) -> BakeResult<ImageHandle> {
        let image = self.inner.create_image(label, width, height, format)?;
        self.created += 1;
        Ok(image)
    }

    fn upload_samples(&mut self, samples: &[VertexSample]) -> BakeResult<BufferHandle> {
        let buffer = self.inner.upload_samples(samples)?;
        self.created += 1;
        Ok(buffer)
    }

    fn dispatch(
        &mut self,
        params: &EncodeParams,
        samples: BufferHandle,
        targets: EncodeTargets,
        grid: DispatchGrid,
    ) -> BakeResult<()> {
        self.inner.dispatch(params, samples, targets, grid)
    }

    fn read_back(&mut self, image: ImageHandle) -> BakeResult<VatImage> {
        self.inner.read_back(image)
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        self.released += 1;
        self.inner.release_buffer(buffer);
    }

    fn release_image(&mut self, image: ImageHandle) {
        self.released += 1;
        self.inner.release_image(image);
    }

    fn live_resources(&self) -> usize {
        self.inner.live_resources()
    }
}

/// Write `frames` OBJ files into `dir`; frame `f` holds `f % 2 + 1` triangles
pub fn write_obj_sequence(dir: &Path, frames: usize) -> std::io::Result<()> {
    for f in 0..frames {
        let mut file = std::fs::File::create(dir.join(format!("frame_{:04}.obj", f)))?;
        writeln!(file, "# frame {}", f)?;
        writeln!(file, "o fluid")?;
        let triangles = f % 2 + 1;
        for t in 0..triangles {
            let z = t as f32;
            let y = f as f32 * 0.125;
            writeln!(file, "v 0 {} {}", y, z)?;
            writeln!(file, "v 1 {} {}", y, z)?;
            writeln!(file, "v 0 {} {}", y + 1.0, z)?;
        }
        writeln!(file, "vn 0 0 1")?;
        for t in 0..triangles {
            let base = t * 3 + 1;
            writeln!(file, "f {}//1 {}//1 {}//1", base, base + 1, base + 2)?;
        }
    }
    Ok(())
}
