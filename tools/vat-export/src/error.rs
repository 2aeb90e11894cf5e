//! Bake pipeline errors
//!
//! Cancellation is not an error: [`crate::pipeline::Baker::run`] returns
//! `Ok(None)` when the caller cancels.

/// Invalid input detected before any sampling work starts
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// `floor(duration * sampling_rate)` is zero
    #[error("source yields no frames (duration {duration}s at {sampling_rate} frames/s)")]
    ZeroFrameCount { duration: f32, sampling_rate: u32 },

    /// Frame count does not fit a `u32` with room for the closing frame
    #[error("source yields too many frames (duration {duration}s at {sampling_rate} frames/s)")]
    TooManyFrames { duration: f32, sampling_rate: u32 },

    #[error("sampling rate must be at least 1 frame per second")]
    InvalidSamplingRate(u32),

    /// Not one of the supported power-of-two widths
    #[error("unsupported max texture width {0} (expected a power of two from 32 to 8192)")]
    InvalidTextureWidth(u32),

    #[error("source has no mesh parts")]
    NoMeshParts,

    /// Dynamic topology samples the first part, which was missing at some frame
    #[error("dynamic topology source has no mesh part at frame {frame}")]
    DynamicSourceHasNoPart { frame: u32 },

    #[error("source has mesh parts but no vertices to bake")]
    EmptyGeometry,

    #[error("no playback shader configured for the material")]
    MissingMaterialReference,
}

/// Error raised while baking a source into a VAT
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BakeError {
    #[error("invalid bake configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// Texture height exceeds the configured (square) maximum
    #[error(
        "texture height {height} exceeds max texture width {max_width}; \
         lower the sampling rate or raise the max texture width"
    )]
    Capacity { height: u32, max_width: u32 },

    /// The animated source failed to seek or returned inconsistent buffers
    #[error("animated source error: {0}")]
    Source(String),

    /// The compute stage failed to allocate, dispatch or read back
    #[error("compute stage error: {0}")]
    Compute(String),
}

pub type BakeResult<T> = Result<T, BakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: BakeError = ConfigError::NoMeshParts.into();
        assert_eq!(err, BakeError::Configuration(ConfigError::NoMeshParts));
    }

    #[test]
    fn test_capacity_message_names_both_sizes() {
        let err = BakeError::Capacity {
            height: 9000,
            max_width: 8192,
        };
        let message = err.to_string();
        assert!(message.contains("9000"));
        assert!(message.contains("8192"));
    }
}
