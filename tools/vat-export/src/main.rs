//! vat-export - Vertex animation texture baker
//!
//! Bakes per-frame OBJ sequences into VAT images (.vattex), a static mesh
//! (.vatmesh) and a material description (_mat.json)

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::{Path, PathBuf};

use vat_common::{VatMeshHeader, VAT_MESH_EXT, VAT_TEXTURE_EXT};
use vat_export::config::{DEFAULT_SAMPLING_RATE, DEFAULT_TIME_ADJUST};
use vat_export::export::{read_header, read_vat_texture, ExportOptions};
use vat_export::job::BakeJob;
use vat_export::source::DEFAULT_SEQUENCE_FPS;
use vat_export::{manifest, BakeConfig, MaxTextureWidth};

#[derive(Parser)]
#[command(name = "vat-export")]
#[command(about = "Vertex animation texture baker")]
#[command(version)]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake a single directory of per-frame OBJ files
    Bake {
        /// Directory of .obj frames (sorted by name)
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Output name (default: input directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Playback rate of the frame sequence
        #[arg(long, default_value_t = DEFAULT_SEQUENCE_FPS)]
        fps: f32,

        /// Frames sampled per second
        #[arg(short = 'r', long, default_value_t = DEFAULT_SAMPLING_RATE)]
        sampling_rate: u32,

        /// Offset added to the start time before sampling
        #[arg(long, default_value_t = DEFAULT_TIME_ADJUST, allow_hyphen_values = true)]
        time_adjust: f32,

        /// Maximum texture width and height (32..8192, power of two)
        #[arg(short = 'w', long, default_value_t = 8192)]
        max_width: u32,

        /// Pack normals into the position image's alpha channel
        #[arg(long)]
        pack_normals: bool,

        /// Uniform root scale
        #[arg(long, default_value_t = 1.0)]
        scale: f32,

        /// Albedo texture referenced by the material
        #[arg(long)]
        main_texture: Option<PathBuf>,

        /// Playback shader name
        #[arg(long, default_value = vat_common::DEFAULT_SHADER_NAME)]
        shader: String,

        /// Also write PNG previews
        #[arg(long)]
        preview: bool,
    },

    /// Bake every source in a manifest
    Build {
        /// Path to vat.toml manifest
        #[arg(default_value = "vat.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write PNG previews
        #[arg(long)]
        preview: bool,
    },

    /// Validate manifest without baking
    Check {
        /// Path to vat.toml manifest
        #[arg(default_value = "vat.toml")]
        manifest: PathBuf,
    },

    /// Print the header of a .vattex or .vatmesh file
    Inspect {
        /// File to inspect
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Commands::Bake {
            input,
            output,
            name,
            fps,
            sampling_rate,
            time_adjust,
            max_width,
            pack_normals,
            scale,
            main_texture,
            shader,
            preview,
        } => {
            let config = BakeConfig {
                sampling_rate,
                time_adjust,
                max_texture_width: MaxTextureWidth::try_from(max_width)?,
                pack_normal_into_alpha: pack_normals,
            };
            config.validate()?;

            let name = match name {
                Some(name) => name,
                None => default_name(&input)?,
            };
            let job = BakeJob {
                name,
                input,
                fps,
                config,
                root_scale: Vec3::splat(scale),
                main_texture,
                export: ExportOptions {
                    shader: Some(shader),
                    preview,
                },
            };
            if job.run(&output)?.is_some() {
                tracing::info!("Bake complete!");
            }
        }

        Commands::Build {
            manifest,
            output,
            preview,
        } => {
            tracing::info!("Building from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            manifest::build_all(&config, output.as_deref(), preview)?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!(
                "Manifest is valid: {} sources",
                config.source_names().len()
            );
        }

        Commands::Inspect { file } => inspect(&file)?,
    }

    Ok(())
}

fn default_name(input: &Path) -> Result<String> {
    match input.file_name() {
        Some(stem) => Ok(stem.to_string_lossy().into_owned()),
        None => bail!("Cannot derive an output name from {:?}, pass --name", input),
    }
}

fn inspect(file: &Path) -> Result<()> {
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    if ext == VAT_TEXTURE_EXT {
        let (header, texels) = read_vat_texture(file)?;
        println!("{}", file.display());
        println!("  size:           {}x{}", header.width, header.height);
        println!("  format:         {:?}", header.format);
        println!("  rows per frame: {}", header.rows_per_frame);
        println!("  frames:         {}", header.frame_count);
        for (channel, label) in ["r", "g", "b", "a"].iter().enumerate() {
            let (min, max) = texels.iter().fold((f32::MAX, f32::MIN), |(lo, hi), t| {
                (lo.min(t[channel]), hi.max(t[channel]))
            });
            println!("  {}:              {} .. {}", label, min, max);
        }
    } else if ext == VAT_MESH_EXT {
        let bytes =
            std::fs::read(file).with_context(|| format!("Failed to read mesh: {:?}", file))?;
        let header: VatMeshHeader = read_header(&bytes, file)?;
        println!("{}", file.display());
        println!("  vertices: {}", header.vertex_count);
        println!("  indices:  {}", header.index_count);
        println!("  format:   {:#04b}", header.format);
        println!("  bounds:   {:?} .. {:?}", header.bounds_min, header.bounds_max);
    } else {
        bail!("Unsupported file type: {:?}", file);
    }
    Ok(())
}
