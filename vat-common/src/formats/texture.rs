//! VatTexture binary format (.vattex)
//!
//! One baked VAT image (positions or normals), row-major, row 0 (frame 0) first.
//! POD format - no magic bytes.
//!
//! # Layout
//! ```text
//! 0x00: width u32
//! 0x04: height u32
//! 0x08: rows_per_frame u32
//! 0x0C: frame_count u32 (sampled frames, including the closing frame)
//! 0x10: format u8 (TexelFormat)
//! 0x11: padding (3 bytes)
//! 0x14: texel_data (width × height × texel size)
//! ```

/// Texel storage format of a VAT image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TexelFormat {
    /// 4 × f16, 8 bytes per texel
    Rgba16Float = 0,
    /// 4 × f32, 16 bytes per texel (required when a normal is packed into alpha)
    Rgba32Float = 1,
}

impl TexelFormat {
    /// Bytes per texel
    pub const fn texel_size(self) -> usize {
        match self {
            TexelFormat::Rgba16Float => 8,
            TexelFormat::Rgba32Float => 16,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TexelFormat::Rgba16Float),
            1 => Some(TexelFormat::Rgba32Float),
            _ => None,
        }
    }
}

/// VatTexture header (20 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct VatTextureHeader {
    pub width: u32,
    pub height: u32,
    pub rows_per_frame: u32,
    pub frame_count: u32,
    pub format: TexelFormat,
    pub _padding: [u8; 3],
}

impl VatTextureHeader {
    pub const SIZE: usize = 20;

    pub fn new(
        width: u32,
        height: u32,
        rows_per_frame: u32,
        frame_count: u32,
        format: TexelFormat,
    ) -> Self {
        Self {
            width,
            height,
            rows_per_frame,
            frame_count,
            format,
            _padding: [0; 3],
        }
    }

    /// Size of the texel payload following the header
    pub fn data_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.texel_size()
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.width.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.height.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.rows_per_frame.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.frame_count.to_le_bytes());
        bytes[16] = self.format as u8;
        // padding bytes stay 0
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
        Some(Self {
            width: read_u32(0),
            height: read_u32(4),
            rows_per_frame: read_u32(8),
            frame_count: read_u32(12),
            format: TexelFormat::from_u8(bytes[16])?,
            _padding: [0; 3],
        })
    }
}
