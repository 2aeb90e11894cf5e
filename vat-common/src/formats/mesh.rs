//! VatMesh binary format (.vatmesh)
//!
//! The static render mesh that accompanies a pair of VAT images.
//! POD format - no magic bytes.
//!
//! # Layout
//! ```text
//! 0x00: vertex_count u32
//! 0x04: index_count u32
//! 0x08: format u8 (attribute flags, see `packing::FORMAT_*`)
//! 0x09: padding (3 bytes)
//! 0x0C: bounds_min [f32; 3]
//! 0x18: bounds_max [f32; 3]
//! 0x24: positions (vertex_count × 12 bytes)
//! var:  uvs (vertex_count × 8 bytes), if FORMAT_UV
//! var:  normals (vertex_count × 12 bytes), if FORMAT_NORMAL
//! var:  colors (vertex_count × 16 bytes), if FORMAT_COLOR
//! var:  indices (index_count × 4 bytes, u32)
//! ```

use crate::packing::{FORMAT_COLOR, FORMAT_NORMAL, FORMAT_UV};

/// VatMesh header (36 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct VatMeshHeader {
    pub vertex_count: u32,
    pub index_count: u32,
    pub format: u8,
    pub _padding: [u8; 3],
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
}

impl VatMeshHeader {
    pub const SIZE: usize = 36;

    pub fn new(
        vertex_count: u32,
        index_count: u32,
        format: u8,
        bounds_min: [f32; 3],
        bounds_max: [f32; 3],
    ) -> Self {
        Self {
            vertex_count,
            index_count,
            format,
            _padding: [0; 3],
            bounds_min,
            bounds_max,
        }
    }

    /// Size of the vertex + index payload following the header
    pub fn data_size(&self) -> usize {
        let mut per_vertex = 12;
        if self.format & FORMAT_UV != 0 {
            per_vertex += 8;
        }
        if self.format & FORMAT_NORMAL != 0 {
            per_vertex += 12;
        }
        if self.format & FORMAT_COLOR != 0 {
            per_vertex += 16;
        }
        self.vertex_count as usize * per_vertex + self.index_count as usize * 4
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.index_count.to_le_bytes());
        bytes[8] = self.format;
        for (i, v) in self.bounds_min.iter().chain(self.bounds_max.iter()).enumerate() {
            let at = 12 + i * 4;
            bytes[at..at + 4].copy_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let read_u32 = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let read_f32 = |at: usize| f32::from_bits(read_u32(at));
        Some(Self {
            vertex_count: read_u32(0),
            index_count: read_u32(4),
            format: bytes[8],
            _padding: [0; 3],
            bounds_min: [read_f32(12), read_f32(16), read_f32(20)],
            bounds_max: [read_f32(24), read_f32(28), read_f32(32)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = VatMeshHeader::new(
            24,
            36,
            FORMAT_UV | FORMAT_NORMAL,
            [-3.0, -1.0, -1.0],
            [3.0, 1.0, 1.0],
        );
        let parsed = VatMeshHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_data_size_positions_only() {
        let header = VatMeshHeader::new(3, 3, 0, [0.0; 3], [0.0; 3]);
        assert_eq!(header.data_size(), 3 * 12 + 3 * 4);
    }

    #[test]
    fn test_data_size_all_attributes() {
        let header = VatMeshHeader::new(
            2,
            0,
            FORMAT_UV | FORMAT_NORMAL | FORMAT_COLOR,
            [0.0; 3],
            [0.0; 3],
        );
        assert_eq!(header.data_size(), 2 * (12 + 8 + 12 + 16));
    }
}
