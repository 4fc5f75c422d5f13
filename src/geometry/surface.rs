use crate::foundation::core::{Affine, CANVAS_HEIGHT, CANVAS_WIDTH, Point, Rect, Vec2, Viewport};
use crate::foundation::error::StoryResult;

/// How media with a foreign aspect ratio is placed into the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Scale to fill the canvas, cropping the overflowing axis.
    #[default]
    Cover,
    /// Scale to fit inside the canvas, leaving bars on the short axis.
    Contain,
}

/// Mapping between the fixed logical canvas and a physical viewport.
///
/// The canvas is letterboxed or pillarboxed into the viewport with one uniform scale. All
/// drawing happens in canvas units; [`RenderSurface::canvas_to_screen_affine`] is the single
/// outer transform the renderer applies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSurface {
    viewport: Viewport,
    scale: f64,
    offset: Vec2,
}

impl RenderSurface {
    /// Build the mapping for a physical viewport of `width x height` pixels.
    pub fn new(width: f64, height: f64) -> StoryResult<Self> {
        Ok(Self::from_viewport(Viewport::new(width, height)?))
    }

    /// Build the mapping from an already validated viewport.
    pub fn from_viewport(viewport: Viewport) -> Self {
        let scale = (viewport.width / CANVAS_WIDTH).min(viewport.height / CANVAS_HEIGHT);
        let display_w = CANVAS_WIDTH * scale;
        let display_h = CANVAS_HEIGHT * scale;
        let offset = Vec2::new(
            (viewport.width - display_w) / 2.0,
            (viewport.height - display_h) / 2.0,
        );
        Self {
            viewport,
            scale,
            offset,
        }
    }

    /// Logical canvas size in canvas units.
    pub fn canvas_size(&self) -> (f64, f64) {
        (CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    /// Physical viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Uniform canvas-to-screen scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Centering offset of the displayed canvas inside the viewport.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Displayed canvas size in physical pixels.
    pub fn display_size(&self) -> (f64, f64) {
        (CANVAS_WIDTH * self.scale, CANVAS_HEIGHT * self.scale)
    }

    /// Integer pixel size of the viewport (rounded up).
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.viewport.width.ceil().max(1.0) as u32,
            self.viewport.height.ceil().max(1.0) as u32,
        )
    }

    /// Visible canvas rectangle in screen coordinates.
    pub fn display_rect(&self) -> Rect {
        let (w, h) = self.display_size();
        Rect::new(self.offset.x, self.offset.y, self.offset.x + w, self.offset.y + h)
    }

    /// Map a screen point into canvas space.
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }

    /// Map a canvas point into screen space.
    pub fn canvas_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.offset.x,
            p.y * self.scale + self.offset.y,
        )
    }

    /// Map a screen-space movement into canvas units. Offsets do not apply to deltas.
    pub fn screen_delta_to_canvas(&self, d: Vec2) -> Vec2 {
        Vec2::new(d.x / self.scale, d.y / self.scale)
    }

    /// Return `true` when `p` (screen space) lies on the visible canvas.
    pub fn contains_screen_point(&self, p: Point) -> bool {
        let r = self.display_rect();
        p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
    }

    /// The outer transform from canvas units to device pixels.
    pub fn canvas_to_screen_affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }
}

/// Canvas-space rectangle for media of `natural_w x natural_h` under `fit`.
///
/// Degenerate natural sizes fill the whole canvas.
pub fn media_rect(natural_w: f64, natural_h: f64, fit: FitMode) -> Rect {
    let full = Rect::new(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);
    if !natural_w.is_finite() || !natural_h.is_finite() || natural_w <= 0.0 || natural_h <= 0.0 {
        return full;
    }

    let media_aspect = natural_w / natural_h;
    let canvas_aspect = CANVAS_WIDTH / CANVAS_HEIGHT;
    let media_is_wider = media_aspect > canvas_aspect;

    let (w, h) = match (fit, media_is_wider) {
        // Wider media under cover matches heights and overflows horizontally.
        (FitMode::Cover, true) | (FitMode::Contain, false) => {
            (CANVAS_HEIGHT * media_aspect, CANVAS_HEIGHT)
        }
        (FitMode::Cover, false) | (FitMode::Contain, true) => {
            (CANVAS_WIDTH, CANVAS_WIDTH / media_aspect)
        }
    };

    let x = (CANVAS_WIDTH - w) / 2.0;
    let y = (CANVAS_HEIGHT - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/surface.rs"]
mod tests;
