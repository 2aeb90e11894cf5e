//! Texel and vertex attribute packing utilities
//!
//! Provides the conversions used when VAT images are written to disk:
//! - f32 → f16 (IEEE 754 half-float) texels
//! - normal → octahedral 12:12 integer stored exactly in an f32 alpha channel
//! - f32 → unorm8 for preview images
//!
//! Used by both `vat-export` (baking) and runtime loaders (decoding).

use glam::Vec3;
use half::f16;

// ============================================================================
// Mesh Attribute Flags
// ============================================================================

/// Mesh attribute flag: Has UV coordinates (2 floats)
pub const FORMAT_UV: u8 = 1;
/// Mesh attribute flag: Has per-vertex color (RGBA, 4 floats)
pub const FORMAT_COLOR: u8 = 2;
/// Mesh attribute flag: Has normals (3 floats)
pub const FORMAT_NORMAL: u8 = 4;

/// Bits per octahedral axis in the alpha-packed normal.
///
/// Two axes of 12 bits give a 24-bit integer, which an f32 represents exactly.
const OCT_AXIS_BITS: u32 = 12;
const OCT_AXIS_MAX: u32 = (1 << OCT_AXIS_BITS) - 1;

// ============================================================================
// Basic Conversion Functions
// ============================================================================

/// Convert f32 to unsigned normalized 8-bit integer (unorm8)
///
/// Maps f32 range [0.0, 1.0] to u8 range [0, 255].
#[inline]
pub fn f32_to_unorm8(value: f32) -> u8 {
    let clamped = value.clamp(0.0, 1.0);
    (clamped * 255.0).round() as u8
}

/// Convert an RGBA f32 texel to RGBA f16
#[inline]
pub fn texel_to_f16(texel: [f32; 4]) -> [f16; 4] {
    [
        f16::from_f32(texel[0]),
        f16::from_f32(texel[1]),
        f16::from_f32(texel[2]),
        f16::from_f32(texel[3]),
    ]
}

// ============================================================================
// Normal Packing
// ============================================================================

/// Encode normalized direction to octahedral coordinates in [-1, 1]²
#[inline]
pub fn encode_octahedral(dir: Vec3) -> (f32, f32) {
    let dir = dir.normalize_or_zero();

    let l1_norm = dir.x.abs() + dir.y.abs() + dir.z.abs();
    if l1_norm == 0.0 {
        return (0.0, 0.0);
    }

    let mut u = dir.x / l1_norm;
    let mut v = dir.y / l1_norm;

    if dir.z < 0.0 {
        let u_abs = u.abs();
        let v_abs = v.abs();
        u = (1.0 - v_abs) * if u >= 0.0 { 1.0 } else { -1.0 };
        v = (1.0 - u_abs) * if v >= 0.0 { 1.0 } else { -1.0 };
    }

    (u, v)
}

/// Decode octahedral coordinates in [-1, 1]² back to normalized direction
#[inline]
pub fn decode_octahedral(u: f32, v: f32) -> Vec3 {
    let mut dir = Vec3::new(u, v, 1.0 - u.abs() - v.abs());

    if dir.z < 0.0 {
        let old_x = dir.x;
        dir.x = (1.0 - dir.y.abs()) * if old_x >= 0.0 { 1.0 } else { -1.0 };
        dir.y = (1.0 - old_x.abs()) * if dir.y >= 0.0 { 1.0 } else { -1.0 };
    }

    dir.normalize_or_zero()
}

#[inline]
fn snorm_to_axis(value: f32) -> u32 {
    ((value.clamp(-1.0, 1.0) * 0.5 + 0.5) * OCT_AXIS_MAX as f32).round() as u32
}

#[inline]
fn axis_to_snorm(value: u32) -> f32 {
    (value as f32 / OCT_AXIS_MAX as f32) * 2.0 - 1.0
}

/// Pack a normal into a single f32 channel (octahedral, 12 bits per axis)
///
/// The result is an integer in `[0, 2^24)` stored as f32, so it survives an
/// RGBA32F image unchanged. The playback shader decodes it with
/// `uint(a) >> 12` and `uint(a) & 0xFFF`.
#[inline]
pub fn pack_normal_alpha(normal: Vec3) -> f32 {
    let (u, v) = encode_octahedral(normal);
    let packed = (snorm_to_axis(u) << OCT_AXIS_BITS) | snorm_to_axis(v);
    packed as f32
}

/// Unpack a normal previously packed with [`pack_normal_alpha`]
#[inline]
pub fn unpack_normal_alpha(alpha: f32) -> Vec3 {
    let packed = alpha.max(0.0) as u32;
    let u = axis_to_snorm((packed >> OCT_AXIS_BITS) & OCT_AXIS_MAX);
    let v = axis_to_snorm(packed & OCT_AXIS_MAX);
    decode_octahedral(u, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_to_unorm8_range() {
        assert_eq!(f32_to_unorm8(-1.0), 0);
        assert_eq!(f32_to_unorm8(0.0), 0);
        assert_eq!(f32_to_unorm8(1.0), 255);
        assert_eq!(f32_to_unorm8(2.0), 255);
    }

    #[test]
    fn test_texel_to_f16() {
        let packed = texel_to_f16([1.0, -2.0, 0.5, 0.0]);
        assert_eq!(packed[0], f16::from_f32(1.0));
        assert_eq!(packed[1], f16::from_f32(-2.0));
        assert_eq!(packed[2], f16::from_f32(0.5));
        assert_eq!(packed[3], f16::from_f32(0.0));
    }

    #[test]
    fn test_octahedral_roundtrip() {
        let test_dirs = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.577, 0.577, 0.577),
            Vec3::new(-0.3, 0.2, -0.9),
        ];

        for dir in test_dirs {
            let normalized = dir.normalize();
            let packed = pack_normal_alpha(normalized);
            let decoded = unpack_normal_alpha(packed);
            let error = (decoded - normalized).length();
            assert!(error < 0.01, "Roundtrip failed for {:?}", normalized);
        }
    }

    #[test]
    fn test_packed_alpha_is_exact_integer() {
        let alpha = pack_normal_alpha(Vec3::new(0.2, -0.7, 0.4));
        assert_eq!(alpha.fract(), 0.0);
        assert!(alpha < (1u32 << 24) as f32);
    }

    #[test]
    fn test_zero_normal_packs_to_center() {
        let alpha = pack_normal_alpha(Vec3::ZERO);
        let center = snorm_to_axis(0.0);
        assert_eq!(alpha as u32, (center << OCT_AXIS_BITS) | center);
    }
}
