//! In-memory keyframe source

use glam::Vec3;
use std::path::{Path, PathBuf};

use super::{AnimatedSource, MeshPart};
use crate::error::BakeError;

/// Times within this fraction of a keyframe interval snap forward to it
const KEYFRAME_SNAP: f32 = 1e-3;

/// A source backed by pre-evaluated keyframes at a fixed rate.
///
/// Seeking selects keyframe `floor((time - start) * rate)`, clamped to the
/// available range, and copies it into the live snapshot. Times before the
/// start (the default time adjustment samples slightly early) hold the
/// first keyframe.
#[derive(Debug, Clone)]
pub struct MemorySource {
    keyframes: Vec<Vec<MeshPart>>,
    keyframe_rate: f32,
    start_time: f32,
    duration: f32,
    root_scale: Vec3,
    main_texture: Option<PathBuf>,
    current: Vec<MeshPart>,
    current_index: Option<usize>,
    seek_count: usize,
}

impl MemorySource {
    /// Build a source from keyframes sampled at `keyframe_rate` per second.
    ///
    /// Duration defaults to `(keyframes - 1) / keyframe_rate`, so the last
    /// keyframe sits exactly at the end of the clip.
    pub fn new(keyframes: Vec<Vec<MeshPart>>, keyframe_rate: f32) -> Self {
        let duration = if keyframe_rate > 0.0 {
            keyframes.len().saturating_sub(1) as f32 / keyframe_rate
        } else {
            0.0
        };
        let current = keyframes.first().cloned().unwrap_or_default();
        let current_index = (!keyframes.is_empty()).then_some(0);
        Self {
            keyframes,
            keyframe_rate,
            start_time: 0.0,
            duration,
            root_scale: Vec3::ONE,
            main_texture: None,
            current,
            current_index,
            seek_count: 0,
        }
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_start_time(mut self, start_time: f32) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_root_scale(mut self, root_scale: Vec3) -> Self {
        self.root_scale = root_scale;
        self
    }

    pub fn with_main_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.main_texture = Some(path.into());
        self
    }

    /// Number of `seek` calls so far
    pub fn seek_count(&self) -> usize {
        self.seek_count
    }

    /// Keyframe currently loaded into the snapshot
    pub fn current_keyframe(&self) -> Option<usize> {
        self.current_index
    }

    fn keyframe_at(&self, time: f32) -> usize {
        let last = self.keyframes.len().saturating_sub(1);
        let offset = ((time - self.start_time) * self.keyframe_rate + KEYFRAME_SNAP).floor();
        if offset.is_nan() || offset <= 0.0 {
            0
        } else {
            (offset as usize).min(last)
        }
    }
}

impl AnimatedSource for MemorySource {
    fn duration(&self) -> f32 {
        self.duration
    }

    fn start_time(&self) -> f32 {
        self.start_time
    }

    fn root_scale(&self) -> Vec3 {
        self.root_scale
    }

    fn seek(&mut self, time: f32) -> Result<(), BakeError> {
        if self.keyframes.is_empty() {
            return Err(BakeError::Source("memory source has no keyframes".into()));
        }
        self.seek_count += 1;
        let index = self.keyframe_at(time);
        if self.current_index != Some(index) {
            self.current.clone_from(&self.keyframes[index]);
            self.current_index = Some(index);
        }
        Ok(())
    }

    fn parts(&self) -> &[MeshPart] {
        &self.current
    }

    fn main_texture(&self) -> Option<&Path> {
        self.main_texture.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyframe(triangles: usize) -> Vec<MeshPart> {
        vec![MeshPart {
            positions: vec![Vec3::ZERO; triangles * 3],
            indices: (0..(triangles * 3) as u32).collect(),
            ..Default::default()
        }]
    }

    #[test]
    fn test_duration_from_keyframes() {
        let source = MemorySource::new(vec![keyframe(1); 11], 10.0);
        assert!((source.duration() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_seek_selects_keyframe() {
        let mut source = MemorySource::new(vec![keyframe(1), keyframe(2), keyframe(3)], 1.0);
        source.seek(1.5).unwrap();
        assert_eq!(source.current_keyframe(), Some(1));
        assert_eq!(source.parts()[0].triangle_count(), 2);
    }

    #[test]
    fn test_seek_clamps() {
        let mut source = MemorySource::new(vec![keyframe(1), keyframe(2)], 1.0);
        source.seek(-0.5).unwrap();
        assert_eq!(source.current_keyframe(), Some(0));
        source.seek(100.0).unwrap();
        assert_eq!(source.current_keyframe(), Some(1));
    }

    #[test]
    fn test_empty_source_fails_to_seek() {
        let mut source = MemorySource::new(Vec::new(), 1.0);
        assert!(source.seek(0.0).is_err());
        assert!(source.parts().is_empty());
    }
}
