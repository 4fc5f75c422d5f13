use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::error::{StoryError, StoryResult};

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// Horizontal alignment of text lines inside the element box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Left edge.
    Start,
    /// Centered.
    #[default]
    Center,
    /// Right edge.
    End,
}

impl TextAlign {
    fn to_parley(self) -> parley::Alignment {
        match self {
            Self::Start => parley::Alignment::Start,
            Self::Center => parley::Alignment::Center,
            Self::End => parley::Alignment::End,
        }
    }
}

/// A shaped text block plus the font it was shaped with.
#[derive(Clone)]
pub struct ShapedText {
    /// Parley layout in local pixels.
    pub layout: Arc<parley::Layout<TextBrushRgba8>>,
    /// Font bytes used to draw the glyphs.
    pub font_bytes: Arc<[u8]>,
}

impl std::fmt::Debug for ShapedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapedText")
            .field("width", &self.layout.width())
            .field("height", &self.layout.height())
            .field("font_bytes", &self.font_bytes.len())
            .finish()
    }
}

/// Builds Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<u64, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Fresh Parley contexts with no registered fonts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    /// Shape `text` with the first family found in `font_bytes`.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
        align: TextAlign,
    ) -> StoryResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StoryError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        let width = max_width_px.filter(|w| w.is_finite() && *w > 0.0);
        layout.break_all_lines(width);
        layout.align(width, align.to_parley(), parley::AlignmentOptions::default());
        Ok(layout)
    }

    // Registering the same bytes twice would add a duplicate family to the collection.
    fn family_for(&mut self, font_bytes: &[u8]) -> StoryResult<String> {
        let key = xxhash_rust::xxh3::xxh3_64(font_bytes);
        if let Some(name) = self.families.get(&key) {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StoryError::decode("no font families registered from font bytes")
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StoryError::decode("registered font family has no name"))?
            .to_string();
        self.families.insert(key, name.clone());
        Ok(name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
