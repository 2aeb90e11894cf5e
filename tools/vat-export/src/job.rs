//! One source → one set of VAT files

use anyhow::{Context, Result};
use glam::Vec3;
use std::path::{Path, PathBuf};

use crate::compute::CpuComputeStage;
use crate::config::BakeConfig;
use crate::export::{resolve_shader, write_result, ExportOptions, ExportedFiles};
use crate::pipeline::Baker;
use crate::source::ObjSequenceSource;

/// A fully resolved bake of one OBJ sequence
#[derive(Debug, Clone, PartialEq)]
pub struct BakeJob {
    /// Output file stem
    pub name: String,
    /// Directory of per-frame OBJ files
    pub input: PathBuf,
    /// Playback rate of the frame sequence
    pub fps: f32,
    pub config: BakeConfig,
    pub root_scale: Vec3,
    /// Overrides the texture found through the OBJ material library
    pub main_texture: Option<PathBuf>,
    pub export: ExportOptions,
}

impl BakeJob {
    /// Load, bake and write the job into `output_dir`.
    ///
    /// Returns `None` if the bake was cancelled.
    pub fn run(&self, output_dir: &Path) -> Result<Option<ExportedFiles>> {
        resolve_shader(self.export.shader.as_deref())
            .with_context(|| format!("Invalid material for '{}'", self.name))?;

        tracing::info!("Baking {} from {:?}", self.name, self.input);

        let mut source = ObjSequenceSource::load(&self.input, self.fps)
            .with_context(|| format!("Failed to load source '{}'", self.name))?
            .with_root_scale(self.root_scale);
        if let Some(texture) = &self.main_texture {
            source = source.with_main_texture(texture);
        }

        let mut stage = CpuComputeStage::new();
        let result = Baker::new(self.config.clone())
            .with_progress(|done, total| tracing::debug!("{}: frame {}/{}", self.name, done, total))
            .run(&mut source, &mut stage)
            .with_context(|| format!("Failed to bake '{}'", self.name))?;

        let Some(result) = result else {
            tracing::warn!("Bake of '{}' cancelled, nothing written", self.name);
            return Ok(None);
        };

        let files = write_result(&result, output_dir, &self.name, &self.export)?;
        Ok(Some(files))
    }
}
