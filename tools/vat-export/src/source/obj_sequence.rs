//! Wavefront OBJ frame sequence source
//!
//! Simulation tools export remeshing geometry (fluids, destruction) as one OBJ
//! per frame. Files in a directory are sorted by name and played back at a
//! fixed rate. Each `o`/`g` block becomes a mesh part.

use anyhow::{bail, Context, Result};
use glam::{Vec2, Vec3, Vec4};
use hashbrown::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{AnimatedSource, MemorySource, MeshPart};
use crate::error::BakeError;

/// Default playback rate of an OBJ sequence (frames per second)
pub const DEFAULT_SEQUENCE_FPS: f32 = 24.0;

/// An animated source loaded from a directory of per-frame OBJ files
#[derive(Debug, Clone)]
pub struct ObjSequenceSource {
    inner: MemorySource,
    frame_paths: Vec<PathBuf>,
}

impl ObjSequenceSource {
    /// Load every `.obj` file in `dir` (sorted by file name) as one frame at `fps`
    pub fn load(dir: &Path, fps: f32) -> Result<Self> {
        if fps <= 0.0 {
            bail!("Sequence frame rate must be positive, got {}", fps);
        }

        let mut frame_paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read sequence directory: {:?}", dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("obj"))
            })
            .collect();
        frame_paths.sort();

        if frame_paths.is_empty() {
            bail!("No .obj frames found in {:?}", dir);
        }

        let keyframes = frame_paths
            .iter()
            .map(|path| load_obj_frame(path))
            .collect::<Result<Vec<_>>>()?;

        let mut inner = MemorySource::new(keyframes, fps);
        if let Some(texture) = find_main_texture(&frame_paths[0])? {
            inner = inner.with_main_texture(texture);
        }

        tracing::info!(
            "Loaded OBJ sequence {:?}: {} frames at {} fps ({:.2}s)",
            dir,
            frame_paths.len(),
            fps,
            inner.duration()
        );

        Ok(Self { inner, frame_paths })
    }

    pub fn with_root_scale(mut self, root_scale: Vec3) -> Self {
        self.inner = self.inner.with_root_scale(root_scale);
        self
    }

    /// Override the albedo texture detected from the first frame's material
    pub fn with_main_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner = self.inner.with_main_texture(path);
        self
    }

    pub fn frame_paths(&self) -> &[PathBuf] {
        &self.frame_paths
    }
}

impl AnimatedSource for ObjSequenceSource {
    fn duration(&self) -> f32 {
        self.inner.duration()
    }

    fn start_time(&self) -> f32 {
        self.inner.start_time()
    }

    fn root_scale(&self) -> Vec3 {
        self.inner.root_scale()
    }

    fn seek(&mut self, time: f32) -> Result<(), BakeError> {
        self.inner.seek(time)
    }

    fn parts(&self) -> &[MeshPart] {
        self.inner.parts()
    }

    fn main_texture(&self) -> Option<&Path> {
        self.inner.main_texture()
    }
}

/// Corner reference: (position, uv, normal), all 0-based
type Corner = (usize, Option<usize>, Option<usize>);

/// Part under construction; corners are de-indexed per unique (v, vt, vn)
#[derive(Default)]
struct PartBuilder {
    name: String,
    corners: Vec<Corner>,
    remap: HashMap<Corner, u32>,
    indices: Vec<u32>,
}

impl PartBuilder {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn push_corner(&mut self, corner: Corner) {
        let next = self.corners.len() as u32;
        let index = *self.remap.entry(corner).or_insert_with(|| {
            self.corners.push(corner);
            next
        });
        self.indices.push(index);
    }

    fn finish(
        self,
        positions: &[Vec3],
        colors: &[Option<Vec4>],
        tex_coords: &[Vec2],
        normals: &[Vec3],
    ) -> MeshPart {
        let has_uvs = self.corners.iter().all(|c| c.1.is_some());
        let has_normals = self.corners.iter().all(|c| c.2.is_some());
        let has_colors = self.corners.iter().all(|c| colors[c.0].is_some());

        let mut part = MeshPart {
            name: self.name,
            indices: self.indices,
            ..Default::default()
        };
        for &(vi, vti, vni) in &self.corners {
            part.positions.push(positions[vi]);
            if has_uvs {
                part.uvs.push(vti.and_then(|i| tex_coords.get(i).copied()).unwrap_or(Vec2::ZERO));
            }
            if has_normals {
                part.normals.push(vni.and_then(|i| normals.get(i).copied()).unwrap_or(Vec3::Y));
            }
            if has_colors {
                part.colors.push(colors[vi].unwrap_or(Vec4::ONE));
            }
        }
        part
    }
}

/// Parse one OBJ frame into mesh parts
pub fn load_obj_frame(input: &Path) -> Result<Vec<MeshPart>> {
    let file = File::open(input).with_context(|| format!("Failed to open OBJ: {:?}", input))?;
    let reader = BufReader::new(file);

    let mut positions: Vec<Vec3> = Vec::new();
    let mut colors: Vec<Option<Vec4>> = Vec::new();
    let mut tex_coords: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();

    let mut builders: Vec<PartBuilder> = Vec::new();
    let mut current = PartBuilder::named("default");

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read OBJ: {:?}", input))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "v" if parts.len() >= 4 => {
                positions.push(Vec3::new(
                    parse_f32(parts[1]),
                    parse_f32(parts[2]),
                    parse_f32(parts[3]),
                ));
                // Vertex colors: "v x y z r g b"
                colors.push((parts.len() >= 7).then(|| {
                    Vec4::new(
                        parse_f32(parts[4]),
                        parse_f32(parts[5]),
                        parse_f32(parts[6]),
                        1.0,
                    )
                }));
            }
            "vt" if parts.len() >= 3 => {
                tex_coords.push(Vec2::new(parse_f32(parts[1]), parse_f32(parts[2])));
            }
            "vn" if parts.len() >= 4 => {
                normals.push(Vec3::new(
                    parse_f32(parts[1]),
                    parse_f32(parts[2]),
                    parse_f32(parts[3]),
                ));
            }
            "o" | "g" => {
                let name = parts.get(1).copied().unwrap_or("unnamed");
                let previous = std::mem::replace(&mut current, PartBuilder::named(name));
                if !previous.indices.is_empty() {
                    builders.push(previous);
                }
            }
            "f" if parts.len() >= 4 => {
                let face: Vec<Corner> = parts[1..]
                    .iter()
                    .map(|v| {
                        parse_obj_corner(v, positions.len(), tex_coords.len(), normals.len())
                    })
                    .collect::<Option<_>>()
                    .with_context(|| {
                        format!("Invalid face on line {} of {:?}", line_no + 1, input)
                    })?;

                // Triangulate (fan triangulation for convex polygons)
                for i in 1..face.len() - 1 {
                    for &idx in &[0, i, i + 1] {
                        current.push_corner(face[idx]);
                    }
                }
            }
            _ => {}
        }
    }
    if !current.indices.is_empty() {
        builders.push(current);
    }

    if builders.is_empty() && positions.is_empty() {
        bail!("No geometry found in OBJ file {:?}", input);
    }

    Ok(builders
        .into_iter()
        .map(|b| b.finish(&positions, &colors, &tex_coords, &normals))
        .collect())
}

fn parse_f32(s: &str) -> f32 {
    s.parse().unwrap_or(0.0)
}

/// Resolve a 1-based (or negative, relative) OBJ index against `count` elements
fn resolve_index(s: &str, count: usize) -> Option<usize> {
    let raw: i64 = s.parse().ok()?;
    let index = if raw < 0 { count as i64 + raw } else { raw - 1 };
    (0..count as i64).contains(&index).then_some(index as usize)
}

/// Parse OBJ vertex reference: "v", "v/vt", "v/vt/vn", or "v//vn"
fn parse_obj_corner(
    s: &str,
    position_count: usize,
    uv_count: usize,
    normal_count: usize,
) -> Option<Corner> {
    let mut refs = s.split('/');

    let vi = resolve_index(refs.next()?, position_count)?;
    let vti = match refs.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, uv_count)?),
        _ => None,
    };
    let vni = match refs.next() {
        Some(n) if !n.is_empty() => Some(resolve_index(n, normal_count)?),
        _ => None,
    };

    Some((vi, vti, vni))
}

/// Find the first `map_Kd` of the first `mtllib` referenced by an OBJ file
fn find_main_texture(obj: &Path) -> Result<Option<PathBuf>> {
    let base = obj.parent().unwrap_or(Path::new("."));
    let content =
        std::fs::read_to_string(obj).with_context(|| format!("Failed to read OBJ: {:?}", obj))?;
    let Some(mtllib) = content
        .lines()
        .find_map(|line| line.trim().strip_prefix("mtllib "))
    else {
        return Ok(None);
    };

    let mtl_path = base.join(mtllib.trim());
    let Ok(mtl) = std::fs::read_to_string(&mtl_path) else {
        tracing::warn!("Material library {:?} not found, no main texture", mtl_path);
        return Ok(None);
    };

    Ok(mtl
        .lines()
        .find_map(|line| line.trim().strip_prefix("map_Kd "))
        .map(|texture| base.join(texture.trim())))
}
