use crate::assets::color::ColorDef;
use crate::assets::media::MediaKind;
use crate::assets::text::TextAlign;
use crate::draw::path::DrawingPath;
use crate::foundation::core::{Affine, CANVAS_HEIGHT, CANVAS_WIDTH, ElementId, Vec2};

/// How long an element anchored to a video timestamp stays on screen, in seconds.
pub const ELEMENT_VISIBILITY_SECS: f64 = 3.0;

/// Placement of an element in canvas units.
///
/// `translate_*` is where the element's local center lands; scale and rotation pivot there.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Center x in canvas units.
    pub translate_x: f64,
    /// Center y in canvas units.
    pub translate_y: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Clockwise rotation in degrees.
    pub rotation_deg: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate_x: CANVAS_WIDTH / 2.0,
            translate_y: CANVAS_HEIGHT / 2.0,
            scale: 1.0,
            rotation_deg: 0.0,
        }
    }
}

impl Transform {
    /// Centered on `(x, y)` with unit scale and no rotation.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::default()
        }
    }

    /// Return `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.translate_x.is_finite()
            && self.translate_y.is_finite()
            && self.scale.is_finite()
            && self.rotation_deg.is_finite()
    }

    /// Translation as a vector.
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }

    /// Local-to-canvas affine for content of `local_size`, whose origin is its top-left corner.
    pub fn to_affine(&self, local_size: (f64, f64)) -> Affine {
        let (w, h) = local_size;
        Affine::translate(self.translation())
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale(self.scale)
            * Affine::translate((-w / 2.0, -h / 2.0))
    }
}

/// Text element payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextPayload {
    /// Text content; `\n` breaks lines.
    pub content: String,
    /// Font asset id.
    pub font: String,
    /// Font size in canvas units.
    #[serde(default = "default_text_size")]
    pub size_px: f32,
    /// Glyph color.
    #[serde(default)]
    pub color: ColorDef,
    /// Optional rounded box drawn behind the text.
    #[serde(default)]
    pub background: Option<ColorDef>,
    /// Line alignment.
    #[serde(default)]
    pub align: TextAlign,
    /// Wrap width in canvas units.
    #[serde(default)]
    pub max_width: Option<f32>,
}

fn default_text_size() -> f32 {
    64.0
}

/// Sticker payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StickerPayload {
    /// Sticker asset id.
    pub asset: String,
    /// Box width in canvas units.
    pub width: f64,
    /// Box height in canvas units.
    pub height: f64,
}

/// Placed image payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImagePayload {
    /// Media URI resolved through the media source.
    pub uri: String,
    /// Box width in canvas units.
    pub width: f64,
    /// Box height in canvas units.
    pub height: f64,
}

/// A group of committed strokes moved as one element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DrawingPayload {
    /// Strokes in the element's local space.
    pub strokes: Vec<DrawingPath>,
    /// Local box width.
    pub width: f64,
    /// Local box height.
    pub height: f64,
}

/// Per-kind element payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// SVG or raster sticker.
    Sticker(StickerPayload),
    /// Text block.
    Text(TextPayload),
    /// Stroke group.
    Drawing(DrawingPayload),
    /// Placed photo.
    Image(ImagePayload),
}

impl ElementKind {
    /// Short kind label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sticker(_) => "sticker",
            Self::Text(_) => "text",
            Self::Drawing(_) => "drawing",
            Self::Image(_) => "image",
        }
    }

    /// Local box size, when the kind carries one. Text is measured at layout time.
    pub fn local_size(&self) -> Option<(f64, f64)> {
        match self {
            Self::Sticker(s) => Some((s.width, s.height)),
            Self::Image(i) => Some((i.width, i.height)),
            Self::Drawing(d) => Some((d.width, d.height)),
            Self::Text(_) => None,
        }
    }
}

/// One movable element on the canvas.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CanvasElement {
    /// Store-allocated id.
    pub id: ElementId,
    /// Authoritative placement.
    #[serde(default)]
    pub transform: Transform,
    /// Draw order; higher draws later.
    #[serde(default)]
    pub z_index: i32,
    /// Opacity in `[0, 1]`.
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    /// Video-timeline anchor in seconds.
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Payload.
    #[serde(flatten)]
    pub kind: ElementKind,
}

fn full_opacity() -> f32 {
    1.0
}

impl CanvasElement {
    /// Whether the element shows at playback `time_s`.
    ///
    /// Anchored elements are time-limited only over video media.
    pub fn is_visible_at(&self, media: Option<MediaKind>, time_s: f64) -> bool {
        match (self.timestamp, media) {
            (Some(ts), Some(MediaKind::Video)) => {
                time_s >= ts && time_s < ts + ELEMENT_VISIBILITY_SECS
            }
            _ => true,
        }
    }
}

/// An element before the store has given it an id.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementDraft {
    /// Initial placement.
    #[serde(default)]
    pub transform: Transform,
    /// Draw order; `None` places it above everything.
    #[serde(default)]
    pub z_index: Option<i32>,
    /// Opacity in `[0, 1]`.
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    /// Video-timeline anchor.
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Payload.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl ElementDraft {
    /// Default placement for `kind`.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            transform: Transform::default(),
            z_index: None,
            opacity: 1.0,
            timestamp: None,
            kind,
        }
    }

    /// Set the placement.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the draw order.
    pub fn with_z(mut self, z: i32) -> Self {
        self.z_index = Some(z);
        self
    }

    /// Anchor to a video time.
    pub fn with_timestamp(mut self, time_s: f64) -> Self {
        self.timestamp = Some(time_s);
        self
    }
}

/// Partial element update; `None` fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementPatch {
    /// New placement.
    pub transform: Option<Transform>,
    /// New draw order.
    pub z_index: Option<i32>,
    /// New opacity.
    pub opacity: Option<f32>,
    /// New anchor (`Some(None)` clears it).
    pub timestamp: Option<Option<f64>>,
    /// Replacement payload.
    pub kind: Option<ElementKind>,
}

impl ElementPatch {
    /// Patch that only moves the element.
    pub fn transform(t: Transform) -> Self {
        Self {
            transform: Some(t),
            ..Self::default()
        }
    }

    /// Return `true` when the patch changes the transform.
    pub fn touches_transform(&self) -> bool {
        self.transform.is_some()
    }

    /// Apply to `el`. Non-finite transforms and opacities are rejected as a whole.
    pub fn apply(&self, el: &mut CanvasElement) -> bool {
        if let Some(t) = &self.transform
            && !t.is_finite()
        {
            return false;
        }
        if let Some(o) = self.opacity
            && !o.is_finite()
        {
            return false;
        }
        if let Some(t) = self.transform {
            el.transform = t;
        }
        if let Some(z) = self.z_index {
            el.z_index = z;
        }
        if let Some(o) = self.opacity {
            el.opacity = o.clamp(0.0, 1.0);
        }
        if let Some(ts) = self.timestamp {
            el.timestamp = ts;
        }
        if let Some(kind) = &self.kind {
            el.kind = kind.clone();
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/element.rs"]
mod tests;
