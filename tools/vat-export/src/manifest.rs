//! Manifest parsing and batch baking
//!
//! Parses vat.toml and bakes every listed source. Relative paths resolve
//! against the manifest's directory.
//!
//! ```toml
//! [output]
//! dir = "baked/"
//!
//! [defaults]
//! sampling_rate = 20
//! max_texture_width = 4096
//!
//! [sources]
//! flag = "sim/flag"
//!
//! [sources.splash]
//! path = "sim/splash"
//! fps = 30
//! pack_normal_into_alpha = true
//! main_texture = "textures/water.png"
//! ```

use anyhow::{bail, Context, Result};
use glam::Vec3;
use hashbrown::HashMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use vat_common::DEFAULT_SHADER_NAME;

use crate::config::{BakeConfig, MaxTextureWidth};
use crate::error::ConfigError;
use crate::export::{ExportOptions, ExportedFiles};
use crate::job::BakeJob;
use crate::source::DEFAULT_SEQUENCE_FPS;

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub defaults: BakeConfig,
    #[serde(default)]
    pub sources: HashMap<String, SourceEntry>,
    /// Directory relative paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Playback shader written into every material
    #[serde(default = "default_shader")]
    pub shader: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            shader: default_shader(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("baked/")
}

fn default_shader() -> String {
    DEFAULT_SHADER_NAME.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SourceEntry {
    Simple(PathBuf),
    Detailed(SourceSettings),
}

/// Per-source settings; unset fields fall back to `[defaults]`
#[derive(Debug, Deserialize)]
pub struct SourceSettings {
    pub path: PathBuf,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default)]
    pub sampling_rate: Option<u32>,
    #[serde(default)]
    pub time_adjust: Option<f32>,
    #[serde(default)]
    pub max_texture_width: Option<MaxTextureWidth>,
    #[serde(default)]
    pub pack_normal_into_alpha: Option<bool>,
    #[serde(default)]
    pub root_scale: Option<[f32; 3]>,
    #[serde(default)]
    pub main_texture: Option<PathBuf>,
    #[serde(default)]
    pub shader: Option<String>,
}

impl SourceEntry {
    pub fn path(&self) -> &Path {
        match self {
            SourceEntry::Simple(p) => p,
            SourceEntry::Detailed(settings) => &settings.path,
        }
    }

    fn settings(&self) -> Option<&SourceSettings> {
        match self {
            SourceEntry::Simple(_) => None,
            SourceEntry::Detailed(settings) => Some(settings),
        }
    }

    /// `defaults` with this entry's overrides applied
    pub fn bake_config(&self, defaults: &BakeConfig) -> BakeConfig {
        let mut config = defaults.clone();
        if let Some(s) = self.settings() {
            if let Some(rate) = s.sampling_rate {
                config.sampling_rate = rate;
            }
            if let Some(adjust) = s.time_adjust {
                config.time_adjust = adjust;
            }
            if let Some(width) = s.max_texture_width {
                config.max_texture_width = width;
            }
            if let Some(pack) = s.pack_normal_into_alpha {
                config.pack_normal_into_alpha = pack;
            }
        }
        config
    }

    pub fn fps(&self) -> f32 {
        self.settings()
            .and_then(|s| s.fps)
            .unwrap_or(DEFAULT_SEQUENCE_FPS)
    }

    pub fn root_scale(&self) -> Vec3 {
        self.settings()
            .and_then(|s| s.root_scale)
            .map_or(Vec3::ONE, Vec3::from_array)
    }
}

impl Manifest {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Source names in a stable order
    pub fn source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve the bake job of source `name`
    pub fn job(&self, name: &str, preview: bool) -> Result<BakeJob> {
        let entry = self
            .sources
            .get(name)
            .with_context(|| format!("Unknown source '{}'", name))?;
        let settings = entry.settings();

        Ok(BakeJob {
            name: name.to_string(),
            input: self.resolve(entry.path()),
            fps: entry.fps(),
            config: entry.bake_config(&self.defaults),
            root_scale: entry.root_scale(),
            main_texture: settings
                .and_then(|s| s.main_texture.as_deref())
                .map(|p| self.resolve(p)),
            export: ExportOptions {
                shader: Some(
                    settings
                        .and_then(|s| s.shader.clone())
                        .unwrap_or_else(|| self.output.shader.clone()),
                ),
                preview,
            },
        })
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(manifest)
}

/// Validate a manifest without baking
pub fn validate(manifest: &Manifest) -> Result<()> {
    if manifest.sources.is_empty() {
        bail!("Manifest lists no sources");
    }

    for name in manifest.source_names() {
        let job = manifest.job(name, false)?;
        if !job.input.is_dir() {
            bail!("Source '{}' directory not found: {:?}", name, job.input);
        }
        if job.fps <= 0.0 {
            bail!("Source '{}' fps must be positive, got {}", name, job.fps);
        }
        job.config
            .validate()
            .with_context(|| format!("Invalid bake settings for source '{}'", name))?;
        if job.export.shader.as_deref().is_none_or(|s| s.trim().is_empty()) {
            return Err(ConfigError::MissingMaterialReference)
                .with_context(|| format!("Source '{}' has no shader", name));
        }
        if let Some(texture) = &job.main_texture {
            if !texture.exists() {
                tracing::warn!("Source '{}' main texture not found: {:?}", name, texture);
            }
        }
    }
    Ok(())
}

/// Bake every source in the manifest
pub fn build_all(
    manifest: &Manifest,
    output_override: Option<&Path>,
    preview: bool,
) -> Result<Vec<ExportedFiles>> {
    let output_dir = output_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest.resolve(&manifest.output.dir));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut written = Vec::new();
    for name in manifest.source_names() {
        let job = manifest.job(name, preview)?;
        if let Some(files) = job.run(&output_dir)? {
            written.push(files);
        }
    }

    tracing::info!("Baked {} sources into {:?}", written.len(), output_dir);
    Ok(written)
}
