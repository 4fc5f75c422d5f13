use crate::assets::color::ColorDef;
use crate::assets::media::MediaKind;
use crate::draw::path::DrawingPath;
use crate::foundation::core::ElementId;
use crate::geometry::surface::FitMode;
use crate::grading::engine::FilterState;
use crate::scene::element::CanvasElement;

/// The background media placed under everything else.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaRef {
    /// URI resolved by the media source.
    pub uri: String,
    /// Still or video.
    #[serde(default)]
    pub kind: MediaKind,
    /// Placement inside the canvas.
    #[serde(default)]
    pub fit: FitMode,
}

/// Video playback position.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Playback {
    /// Current position in seconds.
    pub time_s: f64,
    /// Known duration in seconds (0 = unknown).
    pub duration_s: f64,
    /// Whether playback is running.
    pub playing: bool,
}

/// Bottom canvas layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Background {
    /// One color.
    Solid {
        /// Fill color.
        color: ColorDef,
    },
    /// Two-stop vertical gradient.
    Gradient {
        /// Color at the top edge.
        top: ColorDef,
        /// Color at the bottom edge.
        bottom: ColorDef,
    },
}

impl Default for Background {
    fn default() -> Self {
        Self::Solid {
            color: ColorDef::BLACK,
        }
    }
}

/// Authoritative editor content.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorState {
    /// Elements in insertion order (draw order comes from `z_index`).
    pub elements: Vec<CanvasElement>,
    /// Selected element, always a member of `elements` when set.
    pub selected: Option<ElementId>,
    /// Committed freehand strokes.
    pub paths: Vec<DrawingPath>,
    /// Preset, sliders and LUT.
    pub filter: FilterState,
    /// Background media.
    pub media: Option<MediaRef>,
    /// Video position.
    pub playback: Playback,
    /// Bottom layer.
    pub background: Background,
}

impl EditorState {
    /// Element with `id`.
    pub fn element(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Largest z-index in use.
    pub fn max_z(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.z_index).max()
    }

    /// Elements visible at the current playback time, ascending by z-index.
    ///
    /// Equal z-indices keep insertion order.
    pub fn draw_order(&self) -> Vec<&CanvasElement> {
        let media = self.media.as_ref().map(|m| m.kind);
        let mut out: Vec<&CanvasElement> = self
            .elements
            .iter()
            .filter(|e| e.is_visible_at(media, self.playback.time_s))
            .collect();
        out.sort_by_key(|e| e.z_index);
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/state.rs"]
mod tests;
