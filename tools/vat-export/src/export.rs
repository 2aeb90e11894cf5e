//! Writing baked results to disk
//!
//! One bake named `name` produces:
//! - `<name>.pos.vattex` and `<name>.nrm.vattex` (the latter omitted when packed)
//! - `<name>_mesh.vatmesh`
//! - `<name>_mat.json`
//! - optionally `<name>.pos.png` / `<name>.nrm.png` previews

use anyhow::{bail, Context, Result};
use half::f16;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use vat_common::formats::material::FLUID_KEYWORD;
use vat_common::{
    f32_to_unorm8, texel_to_f16, BinarySerializable, TexelFormat, VatMaterial, VatMeshHeader, VatTextureHeader,
    DEFAULT_SHADER_NAME, FORMAT_COLOR, FORMAT_NORMAL, FORMAT_UV, VAT_MATERIAL_EXT, VAT_MESH_EXT,
    VAT_TEXTURE_EXT,
};

use crate::compute::VatImage;
use crate::error::ConfigError;
use crate::mesh::{Aabb, BakedMesh};
use crate::pipeline::ConversionResult;

/// How results are written
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Playback shader; `None` is a missing material reference
    pub shader: Option<String>,
    /// Also write 8-bit PNG previews of the images
    pub preview: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            shader: Some(DEFAULT_SHADER_NAME.to_string()),
            preview: false,
        }
    }
}

/// Paths written by [`write_result`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportedFiles {
    pub position: PathBuf,
    pub normal: Option<PathBuf>,
    pub mesh: PathBuf,
    pub material: PathBuf,
    pub previews: Vec<PathBuf>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Material bindings for `result`
/// Trimmed playback shader name, or `MissingMaterialReference` when blank
pub fn resolve_shader(shader: Option<&str>) -> Result<&str, ConfigError> {
    shader
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingMaterialReference)
}

pub fn build_material(
    result: &ConversionResult,
    position: &Path,
    normal: Option<&Path>,
    shader: Option<&str>,
) -> Result<VatMaterial, ConfigError> {
    let shader = resolve_shader(shader)?;

    let fluid = result.topology().is_dynamic();
    Ok(VatMaterial {
        shader: shader.to_string(),
        main_texture: result
            .main_texture
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
        position_texture: file_name(position),
        normal_texture: normal.map(file_name),
        length: result.duration,
        vert_count: result.mesh.vertex_count() as u32,
        max_vertex_count: result.layout.max_vertex_count,
        rows_per_frame: result.layout.rows_per_frame,
        frame_count: result.layout.frames_sampled,
        is_fluid: if fluid { 1.0 } else { 0.0 },
        pack_normal_into_alpha: result.pack_normal_into_alpha,
        keywords: if fluid {
            vec![FLUID_KEYWORD.to_string()]
        } else {
            Vec::new()
        },
        bounds_min: result.mesh.bounds.min.to_array(),
        bounds_max: result.mesh.bounds.max.to_array(),
    })
}

/// Write a complete VatTexture file
pub fn write_vat_texture<W: Write>(
    w: &mut W,
    image: &VatImage,
    rows_per_frame: u32,
    frame_count: u32,
) -> Result<()> {
    let header = VatTextureHeader::new(
        image.width,
        image.height,
        rows_per_frame,
        frame_count,
        image.format,
    );
    w.write_all(&header.serialize())?;

    match image.format {
        TexelFormat::Rgba16Float => {
            let texels: Vec<[f16; 4]> = image.texels.iter().map(|t| texel_to_f16(*t)).collect();
            w.write_all(bytemuck::cast_slice(&texels))?;
        }
        TexelFormat::Rgba32Float => w.write_all(bytemuck::cast_slice(&image.texels))?,
    }
    Ok(())
}

/// Parse the format header at the start of `bytes` read from `path`
pub fn read_header<H: BinarySerializable>(bytes: &[u8], path: &Path) -> Result<H> {
    H::deserialize(bytes).with_context(|| format!("Invalid header: {:?}", path))
}

/// Read a VatTexture file back as f32 texels
pub fn read_vat_texture(path: &Path) -> Result<(VatTextureHeader, Vec<[f32; 4]>)> {
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .with_context(|| format!("Failed to read texture: {:?}", path))?;

    let header: VatTextureHeader = read_header(&bytes, path)?;
    let data = &bytes[VatTextureHeader::SIZE..];
    if data.len() != header.data_size() {
        bail!(
            "Texture {:?} holds {} data bytes, header expects {}",
            path,
            data.len(),
            header.data_size()
        );
    }

    let texels = match header.format {
        TexelFormat::Rgba16Float => data
            .chunks_exact(8)
            .map(|t| {
                std::array::from_fn(|c| f16::from_le_bytes([t[c * 2], t[c * 2 + 1]]).to_f32())
            })
            .collect(),
        TexelFormat::Rgba32Float => data
            .chunks_exact(16)
            .map(|t| {
                std::array::from_fn(|c| {
                    f32::from_le_bytes([t[c * 4], t[c * 4 + 1], t[c * 4 + 2], t[c * 4 + 3]])
                })
            })
            .collect(),
    };
    Ok((header, texels))
}

/// Write a complete VatMesh file
pub fn write_vat_mesh<W: Write>(w: &mut W, mesh: &BakedMesh) -> Result<()> {
    let mut format = 0;
    if mesh.uvs.is_some() {
        format |= FORMAT_UV;
    }
    if mesh.normals.is_some() {
        format |= FORMAT_NORMAL;
    }
    if mesh.colors.is_some() {
        format |= FORMAT_COLOR;
    }

    let header = VatMeshHeader::new(
        mesh.vertex_count() as u32,
        mesh.index_count() as u32,
        format,
        mesh.bounds.min.to_array(),
        mesh.bounds.max.to_array(),
    );
    w.write_all(&header.serialize())?;
    w.write_all(bytemuck::cast_slice(&mesh.positions))?;
    if let Some(uvs) = &mesh.uvs {
        w.write_all(bytemuck::cast_slice(uvs))?;
    }
    if let Some(normals) = &mesh.normals {
        w.write_all(bytemuck::cast_slice(normals))?;
    }
    if let Some(colors) = &mesh.colors {
        w.write_all(bytemuck::cast_slice(colors))?;
    }
    for i in &mesh.indices {
        w.write_all(&i.to_le_bytes())?;
    }
    Ok(())
}

fn write_file(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> Result<()>) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create output: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).with_context(|| format!("Failed to write {:?}", path))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {:?}", path))?;
    Ok(())
}

/// Remap `value` from `[min, max]` into unorm8
fn remap(value: f32, min: f32, max: f32) -> u8 {
    let range = max - min;
    if range.abs() <= f32::EPSILON {
        return f32_to_unorm8(0.5);
    }
    f32_to_unorm8((value - min) / range)
}

fn write_position_preview(path: &Path, image: &VatImage, bounds: &Aabb) -> Result<()> {
    let (min, max) = (bounds.min, bounds.max);
    let preview = image::RgbaImage::from_fn(image.width, image.height, |x, y| {
        let t = image.texel(x, y);
        image::Rgba([
            remap(t[0], min.x, max.x),
            remap(t[1], min.y, max.y),
            remap(t[2], min.z, max.z),
            255,
        ])
    });
    preview
        .save(path)
        .with_context(|| format!("Failed to write preview: {:?}", path))
}

fn write_normal_preview(path: &Path, image: &VatImage) -> Result<()> {
    let preview = image::RgbaImage::from_fn(image.width, image.height, |x, y| {
        let t = image.texel(x, y);
        image::Rgba([
            remap(t[0], -1.0, 1.0),
            remap(t[1], -1.0, 1.0),
            remap(t[2], -1.0, 1.0),
            255,
        ])
    });
    preview
        .save(path)
        .with_context(|| format!("Failed to write preview: {:?}", path))
}

/// Write every output file of `result` into `dir`
pub fn write_result(
    result: &ConversionResult,
    dir: &Path,
    name: &str,
    options: &ExportOptions,
) -> Result<ExportedFiles> {
    let position = dir.join(format!("{}.pos.{}", name, VAT_TEXTURE_EXT));
    let normal = result
        .normal_image
        .as_ref()
        .map(|_| dir.join(format!("{}.nrm.{}", name, VAT_TEXTURE_EXT)));

    // Resolve the material before touching the filesystem
    let material = build_material(
        result,
        &position,
        normal.as_deref(),
        options.shader.as_deref(),
    )?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    let layout = &result.layout;
    write_file(&position, |w| {
        write_vat_texture(w, &result.position_image, layout.rows_per_frame, layout.frames_sampled)
    })?;
    tracing::info!("Wrote {:?}", position);

    if let (Some(path), Some(image)) = (&normal, &result.normal_image) {
        write_file(path, |w| {
            write_vat_texture(w, image, layout.rows_per_frame, layout.frames_sampled)
        })?;
        tracing::info!("Wrote {:?}", path);
    }

    let mesh = dir.join(format!("{}_mesh.{}", name, VAT_MESH_EXT));
    write_file(&mesh, |w| write_vat_mesh(w, &result.mesh))?;
    tracing::info!("Wrote {:?}", mesh);

    let material_path = dir.join(format!("{}_mat.{}", name, VAT_MATERIAL_EXT));
    material.save(&material_path)?;
    tracing::info!("Wrote {:?}", material_path);

    let mut previews = Vec::new();
    if options.preview {
        let path = dir.join(format!("{}.pos.png", name));
        write_position_preview(&path, &result.position_image, &result.mesh.bounds)?;
        previews.push(path);
        if let Some(image) = &result.normal_image {
            let path = dir.join(format!("{}.nrm.png", name));
            write_normal_preview(&path, image)?;
            previews.push(path);
        }
        tracing::debug!("Wrote {} previews", previews.len());
    }

    Ok(ExportedFiles {
        position,
        normal,
        mesh,
        material: material_path,
        previews,
    })
}
