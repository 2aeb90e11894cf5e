//! VAT binary asset formats
//!
//! These are POD (Plain Old Data) formats written by the baker and read by
//! runtime loaders. No magic bytes - the format is determined by extension.
//!
//! All binary headers implement the [`BinarySerializable`] trait for consistent
//! serialization/deserialization.

pub mod material;
pub mod mesh;
mod serialization;
pub mod texture;

pub use material::*;
pub use mesh::*;
pub use serialization::BinarySerializable;
pub use texture::*;

/// VAT texture file extension (without dot)
pub const VAT_TEXTURE_EXT: &str = "vattex";

/// Static VAT mesh file extension (without dot)
pub const VAT_MESH_EXT: &str = "vatmesh";

/// Material description file extension (without dot)
pub const VAT_MATERIAL_EXT: &str = "json";
