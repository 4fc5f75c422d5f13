use crate::draw::path::DrawingPath;
use crate::editor::history::{History, HistoryOpts, Snapshot};
use crate::editor::state::{Background, EditorState, MediaRef, Playback};
use crate::foundation::core::ElementId;
use crate::foundation::error::{StoryError, StoryResult};
use crate::grading::adjust::{AdjustmentsPatch, FilterAdjustments};
use crate::grading::engine::LutSelection;
use crate::grading::presets::ActiveFilter;
use crate::scene::element::{CanvasElement, ElementDraft, ElementPatch, Transform};

/// Owner of [`EditorState`] and its undo history.
///
/// Add, remove and stroke mutations push the pre-mutation element and path lists onto the undo
/// stack. Updates (including gesture commits) do not, unless
/// [`HistoryOpts::record_transform_commits`] is set.
#[derive(Clone, Debug)]
pub struct EditorStore {
    state: EditorState,
    history: History,
    opts: HistoryOpts,
    next_id: u64,
}

impl Default for EditorStore {
    fn default() -> Self {
        Self::new(HistoryOpts::default())
    }
}

impl EditorStore {
    /// Empty store.
    pub fn new(opts: HistoryOpts) -> Self {
        Self {
            state: EditorState::default(),
            history: History::new(opts.max_depth),
            opts,
            next_id: 1,
        }
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// History options.
    pub fn opts(&self) -> HistoryOpts {
        self.opts
    }

    /// Return `true` when [`EditorStore::undo`] would change something.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Return `true` when [`EditorStore::redo`] would change something.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            elements: self.state.elements.clone(),
            paths: self.state.paths.clone(),
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.state.elements = snap.elements;
        self.state.paths = snap.paths;
        self.fix_selection();
    }

    fn record(&mut self) {
        let snap = self.snapshot();
        self.history.push(snap);
    }

    fn fix_selection(&mut self) {
        if let Some(sel) = self.state.selected
            && self.state.element(sel).is_none()
        {
            self.state.selected = None;
        }
    }

    fn index_of(&self, id: ElementId) -> StoryResult<usize> {
        self.state
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoryError::validation(format!("unknown element {id}")))
    }

    /// Add an element. A draft without z-index is placed above everything.
    pub fn add_element(&mut self, draft: ElementDraft) -> StoryResult<ElementId> {
        if !draft.transform.is_finite() {
            return Err(StoryError::validation("element transform must be finite"));
        }
        self.record();
        let id = ElementId(self.next_id);
        self.next_id += 1;
        let z_index = draft
            .z_index
            .unwrap_or_else(|| self.state.max_z().map_or(0, |z| z.saturating_add(1)));
        let opacity = if draft.opacity.is_finite() {
            draft.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.state.elements.push(CanvasElement {
            id,
            transform: draft.transform,
            z_index,
            opacity,
            timestamp: draft.timestamp,
            kind: draft.kind,
        });
        tracing::debug!(element = %id, z_index, "added element");
        Ok(id)
    }

    /// Apply a partial update.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> StoryResult<()> {
        let idx = self.index_of(id)?;
        let mut updated = self.state.elements[idx].clone();
        if !patch.apply(&mut updated) {
            return Err(StoryError::validation(format!(
                "rejected non-finite update for {id}"
            )));
        }
        if updated == self.state.elements[idx] {
            return Ok(());
        }
        if self.opts.record_transform_commits {
            self.record();
        }
        self.state.elements[idx] = updated;
        Ok(())
    }

    /// Write a finished gesture's transform. Uses the update path.
    pub fn commit_transform(&mut self, id: ElementId, t: Transform) -> StoryResult<()> {
        self.update_element(id, &ElementPatch::transform(t))
    }

    /// Raise `id` above every other element.
    pub fn bring_to_front(&mut self, id: ElementId) -> StoryResult<()> {
        let idx = self.index_of(id)?;
        let current = self.state.elements[idx].z_index;
        let top = self
            .state
            .elements
            .iter()
            .filter(|e| e.id != id)
            .map(|e| e.z_index)
            .max();
        match top {
            Some(top) if top >= current => self.update_element(
                id,
                &ElementPatch {
                    z_index: Some(top.saturating_add(1)),
                    ..ElementPatch::default()
                },
            ),
            _ => Ok(()),
        }
    }

    /// Remove an element. Returns `false` when `id` is unknown.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        let Ok(idx) = self.index_of(id) else {
            return false;
        };
        self.record();
        self.state.elements.remove(idx);
        self.fix_selection();
        true
    }

    /// Select an element (or clear the selection). Unknown ids leave the selection unchanged.
    pub fn select_element(&mut self, id: Option<ElementId>) -> bool {
        match id {
            Some(id) if self.state.element(id).is_none() => false,
            _ => {
                self.state.selected = id;
                true
            }
        }
    }

    /// Commit a finished stroke.
    pub fn add_drawing_path(&mut self, path: DrawingPath) {
        self.record();
        self.state.paths.push(path);
    }

    /// Remove the most recent stroke.
    pub fn undo_last_path(&mut self) -> Option<DrawingPath> {
        if self.state.paths.is_empty() {
            return None;
        }
        self.record();
        self.state.paths.pop()
    }

    /// Remove every stroke. Returns how many were removed.
    pub fn clear_drawing(&mut self) -> usize {
        let n = self.state.paths.len();
        if n > 0 {
            self.record();
            self.state.paths.clear();
        }
        n
    }

    /// Select a preset (or none).
    pub fn set_filter(&mut self, filter: Option<ActiveFilter>) {
        self.state.filter.filter = filter;
    }

    /// Apply slider changes.
    pub fn set_adjustments(&mut self, patch: &AdjustmentsPatch) {
        self.state.filter.adjustments.apply_patch(patch);
    }

    /// Return every slider to neutral.
    pub fn reset_adjustments(&mut self) {
        self.state.filter.adjustments = FilterAdjustments::default();
    }

    /// Select a LUT (or none).
    pub fn set_lut(&mut self, lut: Option<LutSelection>) {
        self.state.filter.lut = lut;
    }

    /// Replace the background media. Playback restarts at zero.
    pub fn set_media(&mut self, media: Option<MediaRef>) {
        self.state.media = media;
        self.state.playback = Playback::default();
    }

    /// Replace the bottom layer.
    pub fn set_background(&mut self, background: Background) {
        self.state.background = background;
    }

    /// Move the playback position, clamped to the known duration.
    pub fn set_video_time(&mut self, time_s: f64) {
        if !time_s.is_finite() {
            return;
        }
        let d = self.state.playback.duration_s;
        self.state.playback.time_s = if d > 0.0 {
            time_s.clamp(0.0, d)
        } else {
            time_s.max(0.0)
        };
    }

    /// Record the media duration.
    pub fn set_video_duration(&mut self, duration_s: f64) {
        if duration_s.is_finite() && duration_s >= 0.0 {
            self.state.playback.duration_s = duration_s;
            if duration_s > 0.0 {
                self.state.playback.time_s = self.state.playback.time_s.min(duration_s);
            }
        }
    }

    /// Flip play/pause. Returns the new state.
    pub fn toggle_play(&mut self) -> bool {
        self.state.playback.playing = !self.state.playback.playing;
        self.state.playback.playing
    }

    /// Step back one history entry. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(prev) => {
                self.restore(prev);
                true
            }
            None => false,
        }
    }

    /// Step forward one history entry. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    /// Drop all undo/redo entries, keeping the current state.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Return to the initial empty state, optionally keeping the loaded media.
    ///
    /// Element ids keep counting up so stale handles never alias new elements.
    pub fn reset(&mut self, keep_media: bool) {
        let media = if keep_media {
            self.state.media.take()
        } else {
            None
        };
        let playback = if keep_media {
            Playback {
                duration_s: self.state.playback.duration_s,
                ..Playback::default()
            }
        } else {
            Playback::default()
        };
        self.state = EditorState {
            media,
            playback,
            ..EditorState::default()
        };
        self.history.clear();
        tracing::debug!(keep_media, "editor reset");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/store.rs"]
mod tests;
