use glam::UVec2;

use crate::anim::frames::{FRAMES_PER_DIRECTION, FRAME_COUNT};

/// Pixel rectangle inside the sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Geometry of a 4x4 walk-cycle sheet.
///
/// Rows are directions (Down, Left, Right, Up from the top), columns are
/// the four steps of each cycle, so frame `i` sits at row `i / 4`,
/// column `i % 4`. Only slicing math lives here; decoding the image is
/// the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSheet {
    frame: UVec2,
}

impl SpriteSheet {
    pub fn new(width: u32, height: u32) -> Self {
        let grid = FRAMES_PER_DIRECTION as u32;
        Self {
            frame: UVec2::new(width / grid, height / grid),
        }
    }

    /// Source rect of frame `index`, measured from the sheet's top-left.
    pub fn frame_rect(&self, index: usize) -> Option<FrameRect> {
        if index >= FRAME_COUNT {
            return None;
        }
        let row = (index / FRAMES_PER_DIRECTION) as u32;
        let col = (index % FRAMES_PER_DIRECTION) as u32;
        Some(FrameRect {
            x: col * self.frame.x,
            y: row * self.frame.y,
            w: self.frame.x,
            h: self.frame.y,
        })
    }

    /// All 16 frames in index order.
    pub fn frames(&self) -> Vec<FrameRect> {
        (0..FRAME_COUNT).filter_map(|i| self.frame_rect(i)).collect()
    }

    /// Destination size when a frame is drawn into a square of `edge` pixels.
    pub fn scale_to(&self, edge: u32) -> UVec2 {
        if self.frame.x == 0 || self.frame.y == 0 {
            return UVec2::splat(edge);
        }
        let scale = edge as f32 / self.frame.x.max(self.frame.y) as f32;
        UVec2::new(
            (self.frame.x as f32 * scale).round() as u32,
            (self.frame.y as f32 * scale).round() as u32,
        )
    }
}
