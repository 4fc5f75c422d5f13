use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

use crate::assets::decode::decode_image;
use crate::assets::media::{InMemoryMedia, MediaKind};
use crate::assets::registry::{AssetKind, AssetRegistry};
use crate::draw::path::DrawingPath;
use crate::editor::history::HistoryOpts;
use crate::editor::state::{Background, MediaRef};
use crate::editor::store::EditorStore;
use crate::foundation::core::Viewport;
use crate::foundation::error::{StoryError, StoryResult};
use crate::grading::adjust::{Adjustment, AdjustmentsPatch, FilterAdjustments};
use crate::grading::engine::LutSelection;
use crate::grading::presets::{ActiveFilter, FilterPreset};
use crate::scene::element::{ElementDraft, ElementKind};

/// File reference inside a scene document. `source` is relative to the document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneAsset {
    /// Asset category.
    pub kind: AssetKind,
    /// File path.
    pub source: String,
}

/// JSON description of a complete editor scene, used for fixtures and the CLI.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneDoc {
    /// Output viewport; callers may override it.
    pub viewport: Option<Viewport>,
    /// Bottom layer.
    pub background: Background,
    /// Background photo or video.
    pub media: Option<MediaRef>,
    /// Playback position in seconds, for timestamped elements and video frames.
    pub time_s: f64,
    /// Assets keyed by the ids elements and LUT selections use.
    pub assets: BTreeMap<String, SceneAsset>,
    /// Elements, added in order.
    pub elements: Vec<ElementDraft>,
    /// Committed drawing strokes.
    pub paths: Vec<DrawingPath>,
    /// Preset filter.
    pub filter: Option<ActiveFilter>,
    /// Slider values.
    pub adjustments: FilterAdjustments,
    /// LUT grading.
    pub lut: Option<LutSelection>,
}

impl SceneDoc {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> StoryResult<Self> {
        serde_json::from_str(text).map_err(|e| StoryError::serde(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> StoryResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StoryError::serde(e.to_string()))
    }

    /// Check references before building a store.
    pub fn validate(&self) -> StoryResult<()> {
        if let Some(vp) = self.viewport {
            Viewport::new(vp.width, vp.height)?;
        }
        if !self.time_s.is_finite() || self.time_s < 0.0 {
            return Err(StoryError::validation("time_s must be finite and >= 0"));
        }
        if let Some(f) = &self.filter
            && FilterPreset::by_id(&f.preset).is_none()
        {
            return Err(StoryError::validation(format!(
                "unknown filter preset '{}'",
                f.preset
            )));
        }
        if let Some(lut) = &self.lut {
            self.expect_asset(&lut.asset, AssetKind::Lut, "lut")?;
        }
        for (i, el) in self.elements.iter().enumerate() {
            match &el.kind {
                ElementKind::Sticker(s) => {
                    self.expect_asset(&s.asset, AssetKind::Sticker, &format!("element {i}"))?
                }
                ElementKind::Text(t) => {
                    self.expect_asset(&t.font, AssetKind::Font, &format!("element {i}"))?
                }
                ElementKind::Image(_) | ElementKind::Drawing(_) => {}
            }
        }
        Ok(())
    }

    fn expect_asset(&self, id: &str, kind: AssetKind, owner: &str) -> StoryResult<()> {
        match self.assets.get(id) {
            Some(a) if a.kind == kind => Ok(()),
            Some(a) => Err(StoryError::validation(format!(
                "{owner} references asset '{id}' as {kind:?}, but it is {:?}",
                a.kind
            ))),
            None => Err(StoryError::validation(format!(
                "{owner} references missing asset '{id}'"
            ))),
        }
    }

    /// Build a store holding this scene with an empty undo history.
    pub fn to_store(&self, opts: HistoryOpts) -> StoryResult<EditorStore> {
        self.validate()?;
        let mut store = EditorStore::new(opts);
        store.set_background(self.background);
        store.set_media(self.media.clone());
        for draft in &self.elements {
            store.add_element(draft.clone())?;
        }
        for path in &self.paths {
            store.add_drawing_path(path.clone());
        }
        store.set_filter(self.filter.clone());
        let patch = Adjustment::ALL
            .iter()
            .fold(AdjustmentsPatch::new(), |p, &a| p.with(a, self.adjustments.get(a)));
        store.set_adjustments(&patch);
        store.set_lut(self.lut.clone());
        store.set_video_time(self.time_s);
        store.clear_history();
        Ok(store)
    }

    /// Read every referenced asset file below `root` into a registry.
    pub fn load_assets(&self, root: &Path) -> StoryResult<AssetRegistry> {
        let mut registry = AssetRegistry::new();
        for (id, asset) in &self.assets {
            registry.register_file(id.as_str(), asset.kind, &root.join(&asset.source))?;
        }
        tracing::debug!(count = registry.len(), "loaded scene assets");
        Ok(registry)
    }

    /// Decode the still media and image elements below `root`.
    ///
    /// Video media is not decoded here; hosts feed frames through their own
    /// [`crate::assets::media::MediaSource`].
    pub fn load_media(&self, root: &Path) -> StoryResult<InMemoryMedia> {
        let media = InMemoryMedia::new();
        let mut uris: Vec<&str> = Vec::new();
        if let Some(m) = &self.media
            && m.kind == MediaKind::Image
        {
            uris.push(&m.uri);
        }
        for el in &self.elements {
            if let ElementKind::Image(img) = &el.kind {
                uris.push(&img.uri);
            }
        }
        for uri in uris {
            let path = root.join(uri);
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read media '{}'", path.display()))?;
            media.insert_still(uri, decode_image(&bytes)?);
        }
        Ok(media)
    }

    /// Read and parse a document file.
    pub fn load(path: &Path) -> StoryResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
