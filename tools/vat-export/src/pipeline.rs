//! Baking pipeline
//!
//! classify → build mesh → plan layout → sample every frame → resolve bounds
//! → encode. Sampling is sequential because seeking mutates the source; the
//! compute stage is the only parallel part.

use std::path::{Path, PathBuf};

use vat_common::TexelFormat;

use crate::bounds::BoundsAccumulator;
use crate::cancel::CancelToken;
use crate::compute::{
    ComputeStage, CpuComputeStage, EncodeParams, EncodeTargets, ResourceScope, VatImage,
};
use crate::config::BakeConfig;
use crate::encode::encode;
use crate::error::{BakeResult, ConfigError};
use crate::layout::TextureLayout;
use crate::mesh::BakedMesh;
use crate::source::AnimatedSource;
use crate::sample::VertexSample;
use crate::strategy::{select, TopologyStrategy};
use crate::timing::FrameTiming;
use crate::topology::{classify, TopologyReport, TopologyType};

/// Called once per sampled frame with `(frames done, frames total)`
pub type ProgressSink<'a> = Box<dyn FnMut(u32, u32) + 'a>;

/// Everything a bake produces
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub mesh: BakedMesh,
    pub position_image: VatImage,
    /// `None` when normals are packed into the position alpha
    pub normal_image: Option<VatImage>,
    /// Albedo texture of the source, passed through untouched
    pub main_texture: Option<PathBuf>,
    pub report: TopologyReport,
    pub layout: TextureLayout,
    /// Source clip length in seconds
    pub duration: f32,
    pub pack_normal_into_alpha: bool,
}

impl ConversionResult {
    pub fn topology(&self) -> TopologyType {
        self.report.topology
    }
}

pub struct Baker<'a> {
    config: BakeConfig,
    cancel: Option<CancelToken>,
    progress: Option<ProgressSink<'a>>,
}

impl<'a> Baker<'a> {
    pub fn new(config: BakeConfig) -> Self {
        Self {
            config,
            cancel: None,
            progress: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, sink: impl FnMut(u32, u32) + 'a) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn config(&self) -> &BakeConfig {
        &self.config
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Bake `source` using `stage` for the encode step.
    ///
    /// Returns `Ok(None)` if cancelled. Every compute resource allocated here
    /// is released before returning, whatever the outcome.
    pub fn run<S, C>(
        &mut self,
        source: &mut S,
        stage: &mut C,
    ) -> BakeResult<Option<ConversionResult>>
    where
        S: AnimatedSource + ?Sized,
        C: ComputeStage + ?Sized,
    {
        self.config.validate()?;
        let timing = FrameTiming::for_source(source.start_time(), source.duration(), &self.config)?;

        source.seek(timing.start)?;
        if source.parts().is_empty() {
            return Err(ConfigError::NoMeshParts.into());
        }

        let report = classify(source, &timing)?;
        let strategy = select(&report);
        let root_scale = source.root_scale();

        let max_vertex_count = strategy.max_vertex_count(source.parts());
        if max_vertex_count == 0 {
            return Err(ConfigError::EmptyGeometry.into());
        }
        let mut mesh = strategy.build(source.parts(), root_scale);

        let layout = TextureLayout::plan(
            max_vertex_count as u32,
            timing.frame_count,
            self.config.max_texture_width,
        );
        layout.check_capacity()?;

        let pack = self.config.pack_normal_into_alpha;
        let mut scope = ResourceScope::new(stage);
        let targets = EncodeTargets {
            position: scope.create_image(
                "vat_position",
                layout.width,
                layout.height,
                if pack {
                    TexelFormat::Rgba32Float
                } else {
                    TexelFormat::Rgba16Float
                },
            )?,
            normal: if pack {
                None
            } else {
                Some(scope.create_image(
                    "vat_normal",
                    layout.width,
                    layout.height,
                    TexelFormat::Rgba16Float,
                )?)
            },
        };

        let frames_sampled = timing.frames_sampled();
        let sampled = self.sample_frames(source, &timing, strategy.as_ref(), max_vertex_count);
        let (samples, bounds) = match sampled {
            Ok(Some(sampled)) => sampled,
            Ok(None) => {
                source.seek(timing.start)?;
                return Ok(None);
            }
            Err(err) => {
                if let Err(reset) = source.seek(timing.start) {
                    tracing::warn!("Failed to rewind source after error: {}", reset);
                }
                return Err(err);
            }
        };

        mesh.bounds = bounds.resolve(root_scale);
        tracing::debug!(
            "Animation bounds {:?}..{:?}",
            mesh.bounds.min,
            mesh.bounds.max
        );

        let params = EncodeParams {
            max_vertex_count: layout.max_vertex_count,
            texture_width: layout.width,
            rows_per_frame: layout.rows_per_frame,
            pack_normal_into_alpha: pack,
            root_scale,
        };
        let (position_image, normal_image) =
            encode(&mut scope, &layout, &params, &samples, targets)?;
        drop(scope);

        source.seek(timing.start)?;

        tracing::info!(
            "Baked {} frames of {} slots ({} topology)",
            frames_sampled,
            max_vertex_count,
            report.topology
        );

        Ok(Some(ConversionResult {
            mesh,
            position_image,
            normal_image,
            main_texture: source.main_texture().map(Path::to_path_buf),
            report,
            layout,
            duration: source.duration(),
            pack_normal_into_alpha: pack,
        }))
    }

    /// Seek and sample every frame, leaving the source wherever it stopped.
    ///
    /// `Ok(None)` when cancelled between frames.
    fn sample_frames<S>(
        &mut self,
        source: &mut S,
        timing: &FrameTiming,
        strategy: &dyn TopologyStrategy,
        max_vertex_count: usize,
    ) -> BakeResult<Option<(Vec<VertexSample>, BoundsAccumulator)>>
    where
        S: AnimatedSource + ?Sized,
    {
        let frames_sampled = timing.frames_sampled();
        let mut samples = Vec::with_capacity(frames_sampled as usize * max_vertex_count);
        let mut bounds = BoundsAccumulator::new();

        for frame in 0..frames_sampled {
            if self.cancelled() {
                tracing::info!("Bake cancelled at frame {} of {}", frame, frames_sampled);
                return Ok(None);
            }

            source.seek(timing.time_at(frame))?;
            let set = strategy.sample(source.parts(), frame, max_vertex_count)?;
            bounds.include_samples(set.as_slice());
            samples.extend(set.into_inner());

            if let Some(progress) = self.progress.as_mut() {
                progress(frame + 1, frames_sampled);
            }
        }
        Ok(Some((samples, bounds)))
    }
}

/// Bake `source` on the CPU compute stage
pub fn bake<S: AnimatedSource + ?Sized>(
    source: &mut S,
    config: &BakeConfig,
) -> BakeResult<Option<ConversionResult>> {
    let mut stage = CpuComputeStage::new();
    Baker::new(config.clone()).run(source, &mut stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BakeError;
    use crate::source::{MemorySource, MeshPart};
    use glam::Vec3;

    fn triangle(y: f32) -> Vec<MeshPart> {
        vec![MeshPart {
            positions: vec![Vec3::new(0.0, y, 0.0), Vec3::X, Vec3::Z],
            normals: vec![Vec3::Y; 3],
            indices: vec![0, 1, 2],
            ..Default::default()
        }]
    }

    fn rising(frames: usize) -> MemorySource {
        MemorySource::new((0..frames).map(|f| triangle(f as f32)).collect(), 20.0)
    }

    #[test]
    fn test_empty_parts_rejected_before_sampling() {
        let mut source = MemorySource::new(vec![Vec::new(); 21], 20.0);
        let result = bake(&mut source, &BakeConfig::default());
        assert_eq!(result, Err(BakeError::Configuration(ConfigError::NoMeshParts)));
    }

    #[test]
    fn test_zero_frames_fail_fast() {
        let mut source = MemorySource::new(vec![triangle(0.0)], 20.0);
        let result = bake(&mut source, &BakeConfig::default());
        assert!(matches!(
            result,
            Err(BakeError::Configuration(ConfigError::ZeroFrameCount { .. }))
        ));
        assert_eq!(source.seek_count(), 0);
    }

    #[test]
    fn test_progress_reports_every_frame() {
        let mut source = rising(21);
        let mut seen = Vec::new();
        let mut stage = CpuComputeStage::new();
        let result = Baker::new(BakeConfig::default())
            .with_progress(|done, total| seen.push((done, total)))
            .run(&mut source, &mut stage)
            .unwrap();
        assert!(result.is_some());
        assert_eq!(seen.len(), 21);
        assert_eq!(seen.last(), Some(&(21, 21)));
    }

    #[test]
    fn test_failed_frame_rewinds_source() {
        // Frame 10 loses its only part midway through a dynamic clip
        let frames = (0..21)
            .map(|f| match f {
                10 => Vec::new(),
                f if f % 2 == 0 => triangle(f as f32),
                f => {
                    let mut parts = triangle(f as f32);
                    parts[0].indices.extend([0, 2, 1]);
                    parts
                }
            })
            .collect();
        let mut source = MemorySource::new(frames, 20.0);
        let config = BakeConfig {
            time_adjust: 0.0,
            ..BakeConfig::default()
        };
        let mut stage = CpuComputeStage::new();

        let result = Baker::new(config).run(&mut source, &mut stage);
        assert_eq!(
            result,
            Err(BakeError::Configuration(ConfigError::DynamicSourceHasNoPart {
                frame: 10
            }))
        );
        assert_eq!(source.current_keyframe(), Some(0));
        assert_eq!(stage.live_resources(), 0);
    }

    #[test]
    fn test_cancel_before_start_returns_none() {
        let mut source = rising(21);
        let token = CancelToken::new();
        token.cancel();
        let mut stage = CpuComputeStage::new();
        let result = Baker::new(BakeConfig::default())
            .with_cancel(token)
            .run(&mut source, &mut stage)
            .unwrap();
        assert!(result.is_none());
        assert_eq!(stage.live_resources(), 0);
    }
}
