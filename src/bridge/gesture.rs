use std::sync::Arc;

use crate::bridge::cells::{Component, TransformCells};
use crate::editor::handle::Editor;
use crate::foundation::core::{ElementId, Vec2};
use crate::scene::element::Transform;

/// Gesture recognizer tuning, in canvas units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureOpts {
    /// Pan distance below which a release counts as a tap.
    pub tap_slop: f64,
    /// Allowed scale range for pinch.
    pub scale_range: (f64, f64),
    /// Scale change below which a pinch counts as a tap.
    pub scale_slop: f64,
    /// Rotation in degrees below which a rotate counts as a tap.
    pub rotation_slop_deg: f64,
}

impl Default for GestureOpts {
    fn default() -> Self {
        Self {
            tap_slop: 4.0,
            scale_range: (0.2, 5.0),
            scale_slop: 0.01,
            rotation_slop_deg: 0.5,
        }
    }
}

/// Recognizer type; each owns exactly one component group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Writes translation.
    Pan,
    /// Writes scale.
    Pinch,
    /// Writes rotation.
    Rotate,
}

impl GestureKind {
    /// Component group written by this gesture.
    pub fn component(self) -> Component {
        match self {
            Self::Pan => Component::Translate,
            Self::Pinch => Component::Scale,
            Self::Rotate => Component::Rotation,
        }
    }
}

/// How a gesture finished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureOutcome {
    /// Moved beyond slop; this transform was written to the store.
    Committed(Transform),
    /// Released without meaningful movement; nothing was written.
    Tap,
    /// Aborted; the cells were restored and nothing was written.
    Cancelled,
}

/// Starts gestures against an [`Editor`].
#[derive(Clone, Debug)]
pub struct GestureController {
    editor: Editor,
    opts: GestureOpts,
}

impl GestureController {
    /// Controller for `editor`.
    pub fn new(editor: Editor, opts: GestureOpts) -> Self {
        Self { editor, opts }
    }

    /// Tuning in use.
    pub fn opts(&self) -> GestureOpts {
        self.opts
    }

    /// Start a gesture on `id`.
    ///
    /// Returns `None` when the element does not exist or another active gesture already writes
    /// the same component. Selects the element on success.
    pub fn begin(&self, id: ElementId, kind: GestureKind) -> Option<ActiveGesture> {
        let stored = self.editor.transform_of(id)?;
        let cells = self.editor.registry().cells_or_seed(id, &stored);
        if !cells.try_claim(kind.component()) {
            tracing::debug!(element = %id, ?kind, "component already owned by another gesture");
            return None;
        }
        self.editor.select(Some(id));
        let start = cells.load();
        Some(ActiveGesture {
            editor: self.editor.clone(),
            id,
            kind,
            cells,
            start,
            opts: self.opts,
            moved: false,
            finished: false,
        })
    }
}

/// A running gesture. Dropping it without [`ActiveGesture::end`] cancels it.
#[derive(Debug)]
pub struct ActiveGesture {
    editor: Editor,
    id: ElementId,
    kind: GestureKind,
    cells: Arc<TransformCells>,
    start: Transform,
    opts: GestureOpts,
    moved: bool,
    finished: bool,
}

impl ActiveGesture {
    /// Target element.
    pub fn element(&self) -> ElementId {
        self.id
    }

    /// Recognizer type.
    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    /// Cells being written.
    pub fn cells(&self) -> &Arc<TransformCells> {
        &self.cells
    }

    /// Return `true` once movement exceeded slop.
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    /// Pan by `total` canvas units since the gesture began.
    pub fn update_pan(&mut self, total: Vec2) -> bool {
        if self.kind != GestureKind::Pan || !(total.x.is_finite() && total.y.is_finite()) {
            return false;
        }
        self.cells.set_translate(
            self.start.translate_x + total.x,
            self.start.translate_y + total.y,
        );
        self.moved |= total.hypot() > self.opts.tap_slop;
        true
    }

    /// Scale by `factor` relative to the scale at gesture start, clamped to the scale range.
    pub fn update_pinch(&mut self, factor: f64) -> bool {
        if self.kind != GestureKind::Pinch || !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let (lo, hi) = self.opts.scale_range;
        let s = (self.start.scale * factor).clamp(lo, hi);
        self.cells.set_scale(s);
        self.moved |= (s - self.start.scale).abs() > self.opts.scale_slop;
        true
    }

    /// Rotate by `delta_deg` since the gesture began.
    pub fn update_rotate(&mut self, delta_deg: f64) -> bool {
        if self.kind != GestureKind::Rotate || !delta_deg.is_finite() {
            return false;
        }
        self.cells.set_rotation(self.start.rotation_deg + delta_deg);
        self.moved |= delta_deg.abs() > self.opts.rotation_slop_deg;
        true
    }

    /// Release. Commits the owned component once if the gesture moved; the other components are
    /// taken from the store, not from the cells.
    pub fn end(mut self) -> GestureOutcome {
        self.finished = true;
        let component = self.kind.component();
        if !self.moved {
            self.cells.write_component(component, &self.start);
            self.cells.release(component);
            return GestureOutcome::Tap;
        }

        let latest = self.cells.load();
        let outcome = match self.editor.commit_component(self.id, component, &latest) {
            Ok(committed) => GestureOutcome::Committed(committed),
            Err(err) => {
                tracing::warn!(element = %self.id, %err, "gesture commit failed");
                self.cells.write_component(component, &self.start);
                GestureOutcome::Cancelled
            }
        };
        self.cells.release(component);
        outcome
    }

    /// Abort, restoring the start value of the owned component.
    pub fn cancel(mut self) -> GestureOutcome {
        self.abort();
        GestureOutcome::Cancelled
    }

    fn abort(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let component = self.kind.component();
        self.cells.write_component(component, &self.start);
        self.cells.release(component);
    }
}

impl Drop for ActiveGesture {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/gesture.rs"]
mod tests;
