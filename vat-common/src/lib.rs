//! Shared types and utilities for vertex animation textures (VAT)
//!
//! This crate provides the on-disk contract shared between:
//! - `vat-export` (baking pipeline and CLI)
//! - any runtime loader that binds baked VAT assets to a playback shader
//!
//! # Modules
//!
//! - [`packing`] - Texel packing utilities (f32 → f16, octahedral normals in alpha)
//! - [`formats`] - Binary VAT texture/mesh formats and the material description

pub mod formats;
pub mod packing;

// Re-export commonly used packing items
pub use packing::{
    decode_octahedral, encode_octahedral, f32_to_unorm8, pack_normal_alpha, texel_to_f16,
    unpack_normal_alpha, FORMAT_COLOR, FORMAT_NORMAL, FORMAT_UV,
};

// Re-export commonly used format items
pub use formats::{
    BinarySerializable, TexelFormat, VatMaterial, VatMeshHeader, VatTextureHeader,
    DEFAULT_SHADER_NAME, VAT_MATERIAL_EXT, VAT_MESH_EXT, VAT_TEXTURE_EXT,
};
