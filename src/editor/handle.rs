use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::bridge::cells::Component;
use crate::bridge::registry::{MountGuard, TransformRegistry};
use crate::editor::history::HistoryOpts;
use crate::editor::state::EditorState;
use crate::editor::store::EditorStore;
use crate::foundation::core::ElementId;
use crate::foundation::error::{StoryError, StoryResult};
use crate::scene::element::Transform;

/// Shared handle to the editor store and the live transform registry.
///
/// Every mutation made through [`Editor::mutate`] resynchronises mounted transform cells from
/// the store afterwards, so undo/redo and programmatic edits show up in the bridge.
#[derive(Clone, Debug)]
pub struct Editor {
    store: Arc<RwLock<EditorStore>>,
    registry: Arc<TransformRegistry>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(HistoryOpts::default())
    }
}

impl Editor {
    /// Empty editor.
    pub fn new(opts: HistoryOpts) -> Self {
        Self::from_store(EditorStore::new(opts))
    }

    /// Wrap an existing store.
    pub fn from_store(store: EditorStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            registry: Arc::new(TransformRegistry::new()),
        }
    }

    /// The live transform registry.
    pub fn registry(&self) -> &Arc<TransformRegistry> {
        &self.registry
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, EditorStore> {
        match self.store.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, EditorStore> {
        match self.store.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Run `f` with shared access to the store.
    pub fn read<R>(&self, f: impl FnOnce(&EditorStore) -> R) -> R {
        let store = self.read_guard();
        f(&*store)
    }

    /// Clone of the current state, for a render pass.
    pub fn snapshot(&self) -> EditorState {
        self.read_guard().state().clone()
    }

    /// Run `f` with exclusive access, then resync mounted cells.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut EditorStore) -> R) -> R {
        let mut store = self.write_guard();
        let out = f(&mut *store);
        self.registry.resync_all(
            store
                .state()
                .elements
                .iter()
                .map(|e| (e.id, &e.transform)),
        );
        out
    }

    /// Register live cells for `id`, seeded from its stored transform.
    pub fn mount(&self, id: ElementId) -> Option<MountGuard> {
        let seed = self.read_guard().state().element(id)?.transform;
        Some(self.registry.mount(id, &seed))
    }

    /// Stored transform of `id`.
    pub fn transform_of(&self, id: ElementId) -> Option<Transform> {
        self.read_guard().state().element(id).map(|e| e.transform)
    }

    /// Select `id`. Returns `false` when it does not exist.
    pub fn select(&self, id: Option<ElementId>) -> bool {
        self.write_guard().select_element(id)
    }

    /// Write a finished gesture's transform into the store.
    pub fn commit_transform(&self, id: ElementId, t: Transform) -> StoryResult<()> {
        self.mutate(|s| s.commit_transform(id, t))
    }

    /// Commit only component group `c` of `live`, keeping every other value the store holds.
    /// Read and write happen under one write lock.
    pub fn commit_component(
        &self,
        id: ElementId,
        c: Component,
        live: &Transform,
    ) -> StoryResult<Transform> {
        self.mutate(|s| {
            let stored = s
                .state()
                .element(id)
                .map(|e| e.transform)
                .ok_or_else(|| StoryError::validation(format!("unknown element {id}")))?;
            let merged = c.merge(stored, live);
            s.commit_transform(id, merged)?;
            Ok(merged)
        })
    }

    /// Undo one step.
    pub fn undo(&self) -> bool {
        self.mutate(EditorStore::undo)
    }

    /// Redo one step.
    pub fn redo(&self) -> bool {
        self.mutate(EditorStore::redo)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/handle.rs"]
mod tests;
