//! vat-export library
//!
//! Bakes animated mesh sources into vertex animation textures: a static
//! render mesh plus position and normal images addressed by (vertex, frame).

pub mod bounds;
pub mod cancel;
pub mod compute;
pub mod config;
pub mod encode;
pub mod error;
pub mod export;
pub mod job;
pub mod layout;
pub mod manifest;
pub mod mesh;
pub mod pipeline;
pub mod sample;
pub mod source;
pub mod strategy;
pub mod timing;
pub mod topology;

// Re-export the pieces most callers need
pub use cancel::CancelToken;
pub use compute::{ComputeStage, CpuComputeStage, VatImage};
pub use config::{BakeConfig, MaxTextureWidth};
pub use error::{BakeError, BakeResult, ConfigError};
pub use pipeline::{bake, Baker, ConversionResult};
pub use source::{AnimatedSource, MemorySource, MeshPart, ObjSequenceSource, ParentTransform};
pub use topology::TopologyType;
