use std::collections::HashMap;

use crate::foundation::error::{StoryError, StoryResult};
use crate::render::cpu::{clear_pixmap, surface_dims};

/// Scratch surfaces used during one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerSlot {
    /// Final frame.
    Scene,
    /// Media layer before grading.
    Media,
    /// Isolated drawing group.
    Drawing,
    /// One stroke pass before it is blended into its group.
    Pass,
    /// One element before it is blended into the scene.
    Element,
}

/// Pool limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfacePoolOpts {
    /// Largest surface, in pixels.
    pub max_pixels: u64,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_pixels: 4096 * 4096,
        }
    }
}

/// Reuses layer pixmaps across frames so steady-state rendering does not allocate.
#[derive(Debug, Default)]
pub struct SurfacePool {
    opts: SurfacePoolOpts,
    surfaces: HashMap<LayerSlot, vello_cpu::Pixmap>,
}

impl SurfacePool {
    /// Empty pool.
    pub fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            surfaces: HashMap::new(),
        }
    }

    /// Check out the surface for `slot`, cleared to transparent.
    ///
    /// A pooled pixmap is reused when its size matches; otherwise a new one is allocated.
    pub fn take(
        &mut self,
        slot: LayerSlot,
        width: u32,
        height: u32,
    ) -> StoryResult<vello_cpu::Pixmap> {
        if u64::from(width) * u64::from(height) > self.opts.max_pixels {
            return Err(StoryError::validation(format!(
                "surface {width}x{height} exceeds pool limit of {} pixels",
                self.opts.max_pixels
            )));
        }
        let (w, h) = surface_dims(width, height)?;
        match self.surfaces.remove(&slot) {
            Some(mut pixmap) if pixmap.width() == w && pixmap.height() == h => {
                clear_pixmap(&mut pixmap, [0, 0, 0, 0]);
                Ok(pixmap)
            }
            _ => Ok(vello_cpu::Pixmap::new(w, h)),
        }
    }

    /// Return a surface for reuse by the next frame.
    pub fn give_back(&mut self, slot: LayerSlot, pixmap: vello_cpu::Pixmap) {
        self.surfaces.insert(slot, pixmap);
    }

    /// Number of pooled surfaces.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Return `true` when nothing is pooled.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Drop every pooled surface.
    pub fn clear(&mut self) {
        self.surfaces.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface_pool.rs"]
mod tests;
