//! Texture layout planning
//!
//! Each frame occupies `rows_per_frame` consecutive rows. Slot `v` of frame
//! `f` lives at `x = v % width`, `y = f * rows_per_frame + v / width`.

use crate::config::MaxTextureWidth;
use crate::error::BakeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureLayout {
    pub width: u32,
    pub height: u32,
    pub rows_per_frame: u32,
    /// Sample sets stored, `frame_count + 1`
    pub frames_sampled: u32,
    pub max_vertex_count: u32,
    pub max_width: u32,
}

impl TextureLayout {
    /// Smallest power-of-two width (capped at `max_width`) holding one frame
    /// per `rows_per_frame` rows, for `frame_count` intervals.
    pub fn plan(max_vertex_count: u32, frame_count: u32, max_width: MaxTextureWidth) -> Self {
        let max_width = max_width.pixels();
        let width = max_vertex_count
            .max(1)
            .checked_next_power_of_two()
            .map_or(max_width, |w| w.min(max_width));
        let rows_per_frame = max_vertex_count.div_ceil(width).max(1);
        let frames_sampled = frame_count.saturating_add(1);
        let height = frames_sampled.saturating_mul(rows_per_frame);

        let layout = Self {
            width,
            height,
            rows_per_frame,
            frames_sampled,
            max_vertex_count,
            max_width,
        };
        tracing::info!(
            "Texture layout {}x{} ({} rows per frame, {} frames)",
            layout.width,
            layout.height,
            layout.rows_per_frame,
            layout.frames_sampled
        );
        layout
    }

    /// Height must fit the same maximum as width
    pub fn check_capacity(&self) -> Result<(), BakeError> {
        if self.height > self.max_width {
            tracing::error!(
                "Texture height {} exceeds max width {}",
                self.height,
                self.max_width
            );
            return Err(BakeError::Capacity {
                height: self.height,
                max_width: self.max_width,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn texel_coord(&self, vertex: u32, frame: u32) -> (u32, u32) {
        (
            vertex % self.width,
            frame * self.rows_per_frame + vertex / self.width,
        )
    }
}
