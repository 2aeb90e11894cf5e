//! Sample time planning

use crate::config::BakeConfig;
use crate::error::ConfigError;

/// Evenly spaced sample times over a source clip.
///
/// `frame_count = floor(duration * sampling_rate)` intervals of
/// `dt = duration / frame_count`. Classification visits frames
/// `0..frame_count`; the bake visits `0..=frame_count`, so the closing pose
/// at `start + duration` is captured too.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    pub start: f32,
    pub duration: f32,
    pub frame_count: u32,
    pub dt: f32,
}

impl FrameTiming {
    pub fn new(start: f32, duration: f32, sampling_rate: u32) -> Result<Self, ConfigError> {
        if sampling_rate == 0 {
            return Err(ConfigError::InvalidSamplingRate(sampling_rate));
        }
        let frames = (duration * sampling_rate as f32).floor();
        if !frames.is_finite() || frames < 1.0 {
            return Err(ConfigError::ZeroFrameCount {
                duration,
                sampling_rate,
            });
        }
        if frames >= u32::MAX as f32 {
            return Err(ConfigError::TooManyFrames {
                duration,
                sampling_rate,
            });
        }
        let frame_count = frames as u32;
        Ok(Self {
            start,
            duration,
            frame_count,
            dt: duration / frame_count as f32,
        })
    }

    /// Timing for a source under `config`, applying the start time adjustment
    pub fn for_source(
        source_start: f32,
        duration: f32,
        config: &BakeConfig,
    ) -> Result<Self, ConfigError> {
        Self::new(
            source_start + config.time_adjust,
            duration,
            config.sampling_rate,
        )
    }

    #[inline]
    pub fn time_at(&self, frame: u32) -> f32 {
        self.start + self.dt * frame as f32
    }

    /// Number of sample sets the bake produces
    pub fn frames_sampled(&self) -> u32 {
        self.frame_count + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_floors() {
        let timing = FrameTiming::new(0.0, 1.04, 20).unwrap();
        assert_eq!(timing.frame_count, 20);
        assert!((timing.dt - 0.052).abs() < 1e-6);
        assert_eq!(timing.frames_sampled(), 21);
    }

    #[test]
    fn test_last_sample_lands_on_clip_end() {
        let timing = FrameTiming::new(0.5, 2.0, 10).unwrap();
        assert!((timing.time_at(timing.frame_count) - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_short_clip_fails_fast() {
        assert_eq!(
            FrameTiming::new(0.0, 0.04, 20),
            Err(ConfigError::ZeroFrameCount {
                duration: 0.04,
                sampling_rate: 20
            })
        );
    }

    #[test]
    fn test_huge_clip_rejected() {
        assert_eq!(
            FrameTiming::new(0.0, 1.0e10, 20),
            Err(ConfigError::TooManyFrames {
                duration: 1.0e10,
                sampling_rate: 20
            })
        );
        let timing = FrameTiming::new(0.0, 1.0e8, 20).unwrap();
        assert_eq!(timing.frames_sampled(), timing.frame_count + 1);
    }

    #[test]
    fn test_time_adjust_applied() {
        let config = BakeConfig::default();
        let timing = FrameTiming::for_source(1.0, 1.0, &config).unwrap();
        assert!((timing.start - (1.0 - 1.0 / 24.0)).abs() < 1e-6);
    }
}
