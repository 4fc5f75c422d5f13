use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::bridge::cells::TransformCells;
use crate::foundation::core::ElementId;
use crate::scene::element::Transform;

/// Live transform cells of mounted elements, keyed by element id.
#[derive(Debug, Default)]
pub struct TransformRegistry {
    cells: RwLock<HashMap<ElementId, Arc<TransformCells>>>,
}

/// Keeps an element's cells registered; deregisters them when dropped.
#[must_use = "dropping the guard unmounts the element's transform cells"]
#[derive(Debug)]
pub struct MountGuard {
    registry: Arc<TransformRegistry>,
    id: ElementId,
    cells: Arc<TransformCells>,
}

impl MountGuard {
    /// Mounted element.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// The registered cells.
    pub fn cells(&self) -> &Arc<TransformCells> {
        &self.cells
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        self.registry.unmount(self.id, &self.cells);
    }
}

impl TransformRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register fresh cells for `id`, seeded from `seed`. A later mount of the same id replaces
    /// the earlier cells.
    pub fn mount(self: &Arc<Self>, id: ElementId, seed: &Transform) -> MountGuard {
        let cells = Arc::new(TransformCells::new(seed));
        match self.cells.write() {
            Ok(mut map) => {
                map.insert(id, cells.clone());
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(id, cells.clone());
            }
        }
        tracing::debug!(element = %id, "mounted transform cells");
        MountGuard {
            registry: self.clone(),
            id,
            cells,
        }
    }

    fn unmount(&self, id: ElementId, cells: &Arc<TransformCells>) {
        let mut map = match self.cells.write() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        if map.get(&id).is_some_and(|c| Arc::ptr_eq(c, cells)) {
            map.remove(&id);
            tracing::debug!(element = %id, "unmounted transform cells");
        }
    }

    /// Registered cells for `id`.
    pub fn cells(&self, id: ElementId) -> Option<Arc<TransformCells>> {
        match self.cells.read() {
            Ok(map) => map.get(&id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(&id).cloned(),
        }
    }

    /// Registered cells, or unregistered cells seeded from `fallback` when `id` is not mounted.
    pub fn cells_or_seed(&self, id: ElementId, fallback: &Transform) -> Arc<TransformCells> {
        self.cells(id)
            .unwrap_or_else(|| Arc::new(TransformCells::new(fallback)))
    }

    /// The transform to draw `id` with: live cells when mounted, else `authoritative`.
    pub fn current(&self, id: ElementId, authoritative: &Transform) -> Transform {
        self.cells(id)
            .map(|c| c.load())
            .unwrap_or(*authoritative)
    }

    /// Copy an authoritative transform into `id`'s cells, leaving gesture-claimed parts alone.
    pub fn resync(&self, id: ElementId, t: &Transform) {
        if let Some(cells) = self.cells(id) {
            cells.resync(t);
        }
    }

    /// [`TransformRegistry::resync`] for every listed element.
    pub fn resync_all<'a>(&self, elements: impl IntoIterator<Item = (ElementId, &'a Transform)>) {
        let map = match self.cells.read() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (id, t) in elements {
            if let Some(cells) = map.get(&id) {
                cells.resync(t);
            }
        }
    }

    /// Number of mounted elements.
    pub fn len(&self) -> usize {
        match self.cells.read() {
            Ok(map) => map.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Return `true` when nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/registry.rs"]
mod tests;
