use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::foundation::error::StoryResult;

/// One rendered frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 rows, top to bottom.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied by alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha RGBA8, as image encoders expect.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// What an export pipeline needs from the editor. Encoding is the exporter's job.
pub trait FrameExporter {
    /// Render the scene as it looks at playback time `time_s`.
    fn render_frame_at(&mut self, time_s: f64) -> StoryResult<FrameRGBA>;

    /// Render the scene at the current playback position.
    fn snapshot(&mut self) -> StoryResult<FrameRGBA>;
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
