//! Bake configuration

use serde::Deserialize;

use crate::error::ConfigError;

/// Default sampling rate (frames per second of source time)
pub const DEFAULT_SAMPLING_RATE: u32 = 20;

/// Default start time correction: one frame at 24 fps, earlier
pub const DEFAULT_TIME_ADJUST: f32 = -0.041_666_67;

/// Maximum texture width. Height is bounded by the same value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "u32")]
pub enum MaxTextureWidth {
    W32,
    W64,
    W128,
    W256,
    W512,
    W1024,
    W2048,
    W4096,
    #[default]
    W8192,
}

impl MaxTextureWidth {
    pub const ALL: [MaxTextureWidth; 9] = [
        MaxTextureWidth::W32,
        MaxTextureWidth::W64,
        MaxTextureWidth::W128,
        MaxTextureWidth::W256,
        MaxTextureWidth::W512,
        MaxTextureWidth::W1024,
        MaxTextureWidth::W2048,
        MaxTextureWidth::W4096,
        MaxTextureWidth::W8192,
    ];

    pub const fn pixels(self) -> u32 {
        match self {
            MaxTextureWidth::W32 => 32,
            MaxTextureWidth::W64 => 64,
            MaxTextureWidth::W128 => 128,
            MaxTextureWidth::W256 => 256,
            MaxTextureWidth::W512 => 512,
            MaxTextureWidth::W1024 => 1024,
            MaxTextureWidth::W2048 => 2048,
            MaxTextureWidth::W4096 => 4096,
            MaxTextureWidth::W8192 => 8192,
        }
    }
}

impl TryFrom<u32> for MaxTextureWidth {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|w| w.pixels() == value)
            .ok_or(ConfigError::InvalidTextureWidth(value))
    }
}

impl std::fmt::Display for MaxTextureWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

/// User-facing bake parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    /// Frames sampled per second of source time
    pub sampling_rate: u32,
    /// Offset added to the source's start time before sampling
    pub time_adjust: f32,
    /// Upper bound for both texture dimensions
    pub max_texture_width: MaxTextureWidth,
    /// Store normals in the position image's alpha instead of a second image
    pub pack_normal_into_alpha: bool,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            sampling_rate: DEFAULT_SAMPLING_RATE,
            time_adjust: DEFAULT_TIME_ADJUST,
            max_texture_width: MaxTextureWidth::default(),
            pack_normal_into_alpha: false,
        }
    }
}

impl BakeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling_rate == 0 {
            return Err(ConfigError::InvalidSamplingRate(self.sampling_rate));
        }
        Ok(())
    }
}
