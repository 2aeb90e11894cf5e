//! VAT material description (`<name>_mat.json`)
//!
//! Everything a runtime needs to bind the baked images to the playback
//! shader: texture references, clip length, vertex count and the topology
//! switch. Serialized as JSON so engine integrations can read it without
//! linking this crate.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default playback shader name
pub const DEFAULT_SHADER_NAME: &str = "VAT/TextureAnimPlayer";

/// Shader keyword enabled for dynamic-topology (fluid) bakes
pub const FLUID_KEYWORD: &str = "IS_FLUID";

/// Material bindings for a baked VAT asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatMaterial {
    /// Playback shader name
    pub shader: String,
    /// Albedo texture passed through from the source, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_texture: Option<String>,
    /// Position image file name
    pub position_texture: String,
    /// Normal image file name (absent when normals are packed into alpha)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_texture: Option<String>,
    /// Clip length in source time units
    pub length: f32,
    /// Vertex count of the static mesh
    pub vert_count: u32,
    /// Vertex slots per frame in the images
    pub max_vertex_count: u32,
    /// Texture rows per frame
    pub rows_per_frame: u32,
    /// Sampled frames stored in the images (including the closing frame)
    pub frame_count: u32,
    /// 1.0 for dynamic topology, 0.0 otherwise
    pub is_fluid: f32,
    /// Normals live in the position image's alpha channel
    pub pack_normal_into_alpha: bool,
    /// Enabled shader keywords
    #[serde(default)]
    pub keywords: Vec<String>,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
}

impl VatMaterial {
    /// Write the material as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize material")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write material: {:?}", path))?;
        Ok(())
    }

    /// Load a material written by [`VatMaterial::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read material: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse material: {:?}", path))
    }

    pub fn is_fluid(&self) -> bool {
        self.is_fluid != 0.0
    }
}
