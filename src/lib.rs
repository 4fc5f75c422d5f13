//! storycanvas is the rendering and interaction core of a story editor.
//!
//! A story is a fixed 1080x1920 canvas holding background media, freehand drawing strokes and
//! transformable elements (text, stickers, images). The crate is organised around three loops:
//!
//! - An [`Editor`] owns the authoritative state and its undo history
//! - A [`GestureController`] writes live transforms into lock-free cells while a finger is down
//! - A [`Compositor`] (usually driven through an [`EditorSession`]) draws frames from both
//!
//! Color grading resolves to either a single 4x5 matrix or a compiled 3D LUT shader; LUTs are
//! parsed and packed on a worker thread so the frame loop never waits for them.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Shared value types, errors and numeric helpers.
pub mod foundation {
    /// Canvas constants, ids and small value types.
    pub mod core;
    /// Crate error type.
    pub mod error;
    pub(crate) mod math;
}

/// Canvas to viewport mapping.
pub mod geometry {
    /// Fit, scale and offset of the canvas inside a viewport.
    pub mod surface;
}

/// Matrix color grading.
pub mod grading {
    /// User adjustment sliders.
    pub mod adjust;
    /// Resolution of filter state to a per-frame color transform.
    pub mod engine;
    /// 4x5 color matrices.
    pub mod matrix;
    /// Built-in filter presets.
    pub mod presets;
}

/// 3D LUT grading.
pub mod lut {
    /// Atlas packing and caching.
    pub mod atlas;
    /// `.cube` parsing.
    pub mod parse;
    /// Atlas sampling program.
    pub mod shader;
}

/// Asset bytes and decoders.
pub mod assets {
    /// Color literals.
    pub mod color;
    /// Image and SVG decoding.
    pub mod decode;
    /// Host media frames.
    pub mod media;
    /// Explicit asset registry.
    pub mod registry;
    /// SVG rasterization.
    pub mod svg_raster;
    /// Text layout.
    pub mod text;
}

/// Canvas content.
pub mod scene {
    /// Elements and their transforms.
    pub mod element;
    /// JSON scene documents.
    pub mod model;
}

/// Freehand drawing.
pub mod draw {
    /// Tools, smoothing and stroke passes.
    pub mod path;
    /// The live stroke buffer.
    pub mod session;
}

/// Live gesture transforms.
pub mod bridge {
    /// Atomic transform cells.
    pub mod cells;
    /// Gesture recognizer glue.
    pub mod gesture;
    /// Mounted cell registry.
    pub mod registry;
}

/// Authoritative editor state.
pub mod editor {
    /// Shared editor handle.
    pub mod handle;
    /// Undo and redo stacks.
    pub mod history;
    /// Editor content.
    pub mod state;
    /// Mutations.
    pub mod store;
}

/// Frame compositing.
pub mod render {
    /// Premultiplied blend operators.
    pub mod blend;
    /// Gaussian blur.
    pub mod blur;
    /// Layered compositor.
    pub mod compositor;
    pub(crate) mod cpu;
    pub(crate) mod elements;
    /// Frame buffers and the export contract.
    pub mod export;
    /// Vignette and grain.
    pub mod overlay;
    /// Stroke rasterization.
    pub mod strokes;
    /// Reusable layer surfaces.
    pub mod surface_pool;
}

/// Editing sessions and background resource preparation.
pub mod session;

pub use crate::foundation::core::{
    Affine, BezPath, CANVAS_HEIGHT, CANVAS_WIDTH, ElementId, Point, Rect, Rgba8Premul, Vec2,
    Viewport,
};
pub use crate::foundation::error::{StoryError, StoryResult};

pub use crate::assets::color::ColorDef;
pub use crate::assets::media::{InMemoryMedia, MediaFrame, MediaKind, MediaSource, NoMedia};
pub use crate::assets::registry::{AssetKind, AssetRegistry};
pub use crate::bridge::gesture::{ActiveGesture, GestureController, GestureKind, GestureOpts};
pub use crate::bridge::registry::TransformRegistry;
pub use crate::draw::path::{DrawingPath, StrokeTool};
pub use crate::editor::handle::Editor;
pub use crate::editor::history::HistoryOpts;
pub use crate::editor::state::EditorState;
pub use crate::editor::store::EditorStore;
pub use crate::geometry::surface::{FitMode, RenderSurface};
pub use crate::grading::engine::{ColorTransform, GradingEngine};
pub use crate::lut::parse::{LutStrictness, parse_cube};
pub use crate::lut::shader::{LutShader, ShaderCaps};
pub use crate::render::compositor::{Compositor, CompositorOpts, FrameInputs};
pub use crate::render::export::{FrameExporter, FrameRGBA};
pub use crate::scene::element::{CanvasElement, ElementDraft, ElementKind, Transform};
pub use crate::scene::model::SceneDoc;
pub use crate::session::{EditorSession, SessionOpts};
