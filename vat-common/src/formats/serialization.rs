//! Binary serialization trait for format headers.
//!
//! All VAT format headers implement `BinarySerializable` so generic writers
//! and readers can handle them uniformly, while each header keeps its
//! type-specific `to_bytes()` returning a fixed-size array.

/// Trait for binary-serializable format headers.
///
/// The trait returns `Vec<u8>` because associated const generics in return
/// types (`[u8; Self::SIZE]`) are not yet stable in Rust.
///
/// # Example
///
/// ```
/// use vat_common::formats::{BinarySerializable, TexelFormat, VatTextureHeader};
///
/// let header = VatTextureHeader::new(64, 8, 1, 8, TexelFormat::Rgba16Float);
///
/// let bytes = header.serialize();
/// let parsed = VatTextureHeader::deserialize(&bytes).unwrap();
/// assert_eq!(parsed, header);
/// ```
pub trait BinarySerializable: Sized {
    /// Size of the serialized header in bytes.
    const SIZE: usize;

    /// Serialize to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Deserialize from bytes.
    ///
    /// Returns `None` if the byte slice is too short or contains invalid data.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

impl BinarySerializable for super::VatTextureHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::VatMeshHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{TexelFormat, VatMeshHeader, VatTextureHeader};

    fn check_size<T: BinarySerializable>(value: &T) {
        assert_eq!(value.serialize().len(), T::SIZE);
    }

    #[test]
    fn test_serialized_sizes_match_consts() {
        check_size(&VatTextureHeader::new(8, 8, 1, 8, TexelFormat::Rgba32Float));
        check_size(&VatMeshHeader::new(3, 3, 0, [0.0; 3], [1.0; 3]));
    }

    #[test]
    fn test_generic_roundtrip() {
        let header = VatMeshHeader::new(12, 18, 4, [-1.0; 3], [1.0; 3]);
        let parsed = VatMeshHeader::deserialize(&header.serialize()).unwrap();
        assert_eq!(parsed, header);
    }
}
