use std::sync::Arc;

use super::*;
use crate::assets::decode::DecodedImage;
use crate::assets::media::{InMemoryMedia, MediaKind, NoMedia};
use crate::assets::registry::AssetKind;
use crate::draw::path::StrokeTool;
use crate::editor::state::MediaRef;
use crate::foundation::core::{ElementId, Point};
use crate::geometry::surface::FitMode;
use crate::grading::matrix::ColorMatrix;
use crate::scene::element::{CanvasElement, ElementKind, StickerPayload, Transform};

const RED: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#ff0000"/></svg>"##;
const GREEN: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#00ff00"/></svg>"##;

struct Fixture {
    state: EditorState,
    media: InMemoryMedia,
    assets: AssetRegistry,
    grading: ColorTransform,
    surface: RenderSurface,
}

impl Fixture {
    fn new(w: f64, h: f64) -> Self {
        Self {
            state: EditorState::default(),
            media: InMemoryMedia::new(),
            assets: AssetRegistry::new(),
            grading: ColorTransform::Identity,
            surface: RenderSurface::new(w, h).unwrap(),
        }
    }

    fn with_red_media(mut self) -> Self {
        self.media
            .insert_still("bg", DecodedImage::solid(4, 4, [255, 0, 0, 255]));
        self.state.media = Some(MediaRef {
            uri: "bg".to_owned(),
            kind: MediaKind::Image,
            fit: FitMode::Cover,
        });
        self
    }

    fn render(
        &self,
        registry: Option<&TransformRegistry>,
        live: Option<&DrawingPath>,
    ) -> FrameRGBA {
        let inputs = FrameInputs {
            state: &self.state,
            registry,
            media: &self.media,
            assets: &self.assets,
            grading: &self.grading,
            live_stroke: live,
            surface: &self.surface,
        };
        Compositor::default().render(&inputs).unwrap()
    }
}

fn sticker(id: u64, asset: &str, z: i32) -> CanvasElement {
    CanvasElement {
        id: ElementId(id),
        transform: Transform::default(),
        z_index: z,
        opacity: 1.0,
        timestamp: None,
        kind: ElementKind::Sticker(StickerPayload {
            asset: asset.to_owned(),
            width: 200.0,
            height: 200.0,
        }),
    }
}

#[test]
fn letterbox_bars_keep_clear_color() {
    let mut fx = Fixture::new(200.0, 192.0);
    fx.state.background = Background::Solid {
        color: ColorDef::WHITE,
    };
    let frame = fx.render(None, None);
    assert_eq!((frame.width, frame.height), (200, 192));
    assert_eq!(frame.pixel(10, 96), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(100, 96), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(190, 96), Some([0, 0, 0, 255]));
}

#[test]
fn gradient_background_runs_top_to_bottom() {
    let mut fx = Fixture::new(108.0, 192.0);
    fx.state.background = Background::Gradient {
        top: ColorDef::WHITE,
        bottom: ColorDef::BLACK,
    };
    let frame = fx.render(None, None);
    let top = frame.pixel(50, 0).unwrap();
    let bottom = frame.pixel(50, 191).unwrap();
    assert!(top[0] > 250 && bottom[0] < 5);
}

#[test]
fn missing_media_leaves_background() {
    let mut fx = Fixture::new(108.0, 192.0);
    fx.state.media = Some(MediaRef {
        uri: "not-decoded-yet".to_owned(),
        kind: MediaKind::Video,
        fit: FitMode::Cover,
    });
    let frame = fx.render(None, None);
    assert_eq!(frame.pixel(54, 96), Some([0, 0, 0, 255]));
}

#[test]
fn media_is_graded_in_one_pass() {
    let mut fx = Fixture::new(108.0, 192.0).with_red_media();
    assert_eq!(fx.render(None, None).pixel(54, 96), Some([255, 0, 0, 255]));

    fx.grading = ColorTransform::Matrix(ColorMatrix::saturation(0.0));
    let px = fx.render(None, None).pixel(54, 96).unwrap();
    assert_eq!(px[0], px[1]);
    assert_eq!(px[1], px[2]);
    assert_eq!(px[3], 255);
}

#[test]
fn eraser_never_clears_media() {
    let mut fx = Fixture::new(108.0, 192.0).with_red_media();
    fx.state.paths.push(DrawingPath::new(
        StrokeTool::Pen,
        ColorDef::rgba(0.0, 0.0, 1.0, 1.0),
        24.0,
        vec![Point::new(100.0, 960.0), Point::new(980.0, 960.0)],
    ));
    let eraser = DrawingPath::new(
        StrokeTool::Eraser,
        ColorDef::WHITE,
        80.0,
        vec![Point::new(540.0, 700.0), Point::new(540.0, 1200.0)],
    );

    let before = fx.render(None, Some(&eraser));
    assert_eq!(before.pixel(54, 96), Some([255, 0, 0, 255]));
    assert_eq!(before.pixel(20, 96), Some([0, 0, 255, 255]));
    assert_eq!(before.pixel(54, 80), Some([255, 0, 0, 255]));
}

#[test]
fn elements_draw_in_z_order_from_live_cells() {
    let mut fx = Fixture::new(108.0, 192.0);
    fx.assets.register("red", AssetKind::Sticker, RED.to_vec());
    fx.assets.register("green", AssetKind::Sticker, GREEN.to_vec());
    fx.state.elements.push(sticker(1, "red", 5));
    fx.state.elements.push(sticker(2, "green", 1));

    assert_eq!(fx.render(None, None).pixel(54, 96), Some([255, 0, 0, 255]));

    let registry = Arc::new(TransformRegistry::new());
    let guard = registry.mount(ElementId(1), &Transform::default());
    guard.cells().set_translate(100.0, 100.0);
    assert_eq!(
        fx.render(Some(&registry), None).pixel(54, 96),
        Some([0, 255, 0, 255])
    );
}

#[test]
fn broken_sticker_skips_only_that_element() {
    let mut fx = Fixture::new(108.0, 192.0);
    fx.assets.register("bad", AssetKind::Sticker, b"not an image".to_vec());
    fx.assets.register("green", AssetKind::Sticker, GREEN.to_vec());
    fx.state.elements.push(sticker(1, "green", 1));
    fx.state.elements.push(sticker(2, "bad", 5));
    assert_eq!(fx.render(None, None).pixel(54, 96), Some([0, 255, 0, 255]));
}

#[test]
fn timestamped_elements_follow_video_playback() {
    let mut fx = Fixture::new(108.0, 192.0);
    fx.assets.register("green", AssetKind::Sticker, GREEN.to_vec());
    let mut el = sticker(1, "green", 1);
    el.timestamp = Some(5.0);
    fx.state.elements.push(el);
    fx.state.media = Some(MediaRef {
        uri: "clip".to_owned(),
        kind: MediaKind::Video,
        fit: FitMode::Cover,
    });

    fx.state.playback.time_s = 1.0;
    assert_eq!(fx.render(None, None).pixel(54, 96), Some([0, 0, 0, 255]));
    fx.state.playback.time_s = 6.0;
    assert_eq!(fx.render(None, None).pixel(54, 96), Some([0, 255, 0, 255]));
}

#[test]
fn no_media_source_renders_background_only() {
    let state = EditorState::default();
    let surface = RenderSurface::new(10.0, 10.0).unwrap();
    let assets = AssetRegistry::new();
    let inputs = FrameInputs {
        state: &state,
        registry: None,
        media: &NoMedia,
        assets: &assets,
        grading: &ColorTransform::Identity,
        live_stroke: None,
        surface: &surface,
    };
    let frame = Compositor::new(CompositorOpts::default()).render(&inputs).unwrap();
    assert_eq!(frame.data.len(), 10 * 10 * 4);
}
