use crate::assets::color::ColorDef;
use crate::draw::path::{DrawingPath, StrokeTool};
use crate::foundation::core::Point;

/// Samples closer than this to the previous one are dropped.
pub const MIN_POINT_DISTANCE: f64 = 0.5;

/// The in-progress stroke, kept apart from committed paths until the gesture ends.
#[derive(Clone, Debug, Default)]
pub struct StrokeSession {
    live: Option<DrawingPath>,
}

impl StrokeSession {
    /// Idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stroke, discarding any stroke already in progress.
    pub fn begin(&mut self, tool: StrokeTool, color: ColorDef, width: f64) {
        if self.live.is_some() {
            tracing::debug!("replacing unfinished stroke");
        }
        self.live = Some(DrawingPath::new(tool, color, width, Vec::new()));
    }

    /// Append a canvas-space sample. Returns `false` when idle, non-finite or de-duplicated.
    pub fn push_point(&mut self, p: Point) -> bool {
        let Some(live) = self.live.as_mut() else {
            return false;
        };
        if !(p.x.is_finite() && p.y.is_finite()) {
            return false;
        }
        if let Some(last) = live.points.last()
            && last.distance(p) < MIN_POINT_DISTANCE
        {
            return false;
        }
        live.points.push(p);
        true
    }

    /// Return `true` while a stroke is in progress.
    pub fn is_active(&self) -> bool {
        self.live.is_some()
    }

    /// Samples of the stroke in progress.
    pub fn live_points(&self) -> &[Point] {
        self.live.as_ref().map(|l| l.points.as_slice()).unwrap_or(&[])
    }

    /// The stroke in progress as a path, for rendering.
    pub fn live_path(&self) -> Option<&DrawingPath> {
        self.live.as_ref().filter(|l| !l.points.is_empty())
    }

    /// Finish the stroke. Strokes with no samples produce nothing.
    pub fn end(&mut self) -> Option<DrawingPath> {
        self.live.take().filter(|l| !l.points.is_empty())
    }

    /// Drop the stroke in progress without committing.
    pub fn cancel(&mut self) {
        self.live = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/session.rs"]
mod tests;
