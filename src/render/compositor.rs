use crate::assets::color::ColorDef;
use crate::assets::media::{MediaFrame, MediaSource};
use crate::assets::registry::AssetRegistry;
use crate::bridge::registry::TransformRegistry;
use crate::draw::path::DrawingPath;
use crate::editor::state::{Background, EditorState};
use crate::foundation::core::Rect;
use crate::foundation::error::{StoryError, StoryResult};
use crate::geometry::surface::{RenderSurface, media_rect};
use crate::grading::adjust::Adjustment;
use crate::grading::engine::{ColorTransform, sharpen_rgba8_premul};
use crate::render::blend::over_in_place;
use crate::render::cpu::{clear_pixmap, image_paint};
use crate::render::elements::{ElementFrame, ElementPainter, paint_image_rect};
use crate::render::export::FrameRGBA;
use crate::render::overlay::{apply_grain, apply_vignette, grain_seed};
use crate::render::strokes::StrokePainter;
use crate::render::surface_pool::{LayerSlot, SurfacePool, SurfacePoolOpts};

/// Compositor settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositorOpts {
    /// Straight RGBA8 color of the letterbox/pillarbox bars.
    pub clear_rgba: [u8; 4],
    /// Scratch surface limits.
    pub pool: SurfacePoolOpts,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            clear_rgba: [0, 0, 0, 255],
            pool: SurfacePoolOpts::default(),
        }
    }
}

/// Everything one frame reads. The compositor never mutates any of it.
#[derive(Clone, Copy)]
pub struct FrameInputs<'a> {
    /// Authoritative editor content.
    pub state: &'a EditorState,
    /// Live transform cells; mounted elements draw from here instead of the store.
    pub registry: Option<&'a TransformRegistry>,
    /// Decoded media frames.
    pub media: &'a dyn MediaSource,
    /// Sticker and font bytes.
    pub assets: &'a AssetRegistry,
    /// Color transform for the media layer, resolved once for this frame.
    pub grading: &'a ColorTransform,
    /// In-progress stroke, drawn on top of committed strokes inside the drawing group.
    pub live_stroke: Option<&'a DrawingPath>,
    /// Output surface.
    pub surface: &'a RenderSurface,
}

/// Draws the layered scene into premultiplied RGBA8.
///
/// Layers, bottom to top: background, graded media with its overlays, the isolated drawing
/// group, then elements by ascending z-index. A layer whose resources are missing or fail is
/// left out; the rest of the frame still renders.
#[derive(Debug, Default)]
pub struct Compositor {
    opts: CompositorOpts,
    pool: SurfacePool,
    elements: ElementPainter,
}

fn pixel_bounds(r: Rect, width: u32, height: u32) -> (usize, usize, usize, usize) {
    let clamp = |v: f64, max: u32| v.round().clamp(0.0, f64::from(max)) as usize;
    (
        clamp(r.x0, width),
        clamp(r.y0, height),
        clamp(r.x1, width),
        clamp(r.y1, height),
    )
}

/// Zero every pixel outside `rect`.
fn clip_to_rect(data: &mut [u8], width: u32, height: u32, rect: Rect) {
    let (x0, y0, x1, y1) = pixel_bounds(rect, width, height);
    for (y, row) in data.chunks_exact_mut(width as usize * 4).enumerate() {
        if y < y0 || y >= y1 {
            row.fill(0);
            continue;
        }
        row[..x0 * 4].fill(0);
        row[x1 * 4..].fill(0);
    }
}

fn fill_background(data: &mut [u8], width: u32, height: u32, rect: Rect, bg: &Background) {
    let (x0, y0, x1, y1) = pixel_bounds(rect, width, height);
    let span = (y1 - y0).max(1) as f64;
    for y in y0..y1 {
        let color = match bg {
            Background::Solid { color } => *color,
            Background::Gradient { top, bottom } => {
                let t = ((y - y0) as f64 + 0.5) / span;
                ColorDef::rgba(
                    top.r + (bottom.r - top.r) * t,
                    top.g + (bottom.g - top.g) * t,
                    top.b + (bottom.b - top.b) * t,
                    top.a + (bottom.a - top.a) * t,
                )
            }
        };
        let src = color.to_rgba8_premul().to_array();
        let row = &mut data[y * width as usize * 4..(y + 1) * width as usize * 4];
        for px in row[x0 * 4..x1 * 4].chunks_exact_mut(4) {
            let out = crate::render::blend::over([px[0], px[1], px[2], px[3]], src, 1.0);
            px.copy_from_slice(&out);
        }
    }
}

impl Compositor {
    /// Compositor with its own surface pool.
    pub fn new(opts: CompositorOpts) -> Self {
        Self {
            opts,
            pool: SurfacePool::new(opts.pool),
            elements: ElementPainter::default(),
        }
    }

    /// Settings in use.
    pub fn opts(&self) -> CompositorOpts {
        self.opts
    }

    /// Render one frame.
    ///
    /// Fails only on an unusable output size, before anything is drawn.
    #[tracing::instrument(skip_all, fields(elements = inputs.state.elements.len()))]
    pub fn render(&mut self, inputs: &FrameInputs<'_>) -> StoryResult<FrameRGBA> {
        let (width, height) = inputs.surface.pixel_size();
        if width == 0 || height == 0 {
            return Err(StoryError::validation("render surface has no pixels"));
        }
        let mut scene = self.pool.take(LayerSlot::Scene, width, height)?;
        let [r, g, b, a] = self.opts.clear_rgba;
        clear_pixmap(
            &mut scene,
            ColorDef::from_rgba8(r, g, b, a).to_rgba8_premul().to_array(),
        );

        let display = inputs.surface.display_rect();
        fill_background(
            scene.data_as_u8_slice_mut(),
            width,
            height,
            display,
            &inputs.state.background,
        );

        if let Err(err) = self.media_layer(inputs, &mut scene, width, height) {
            tracing::warn!(%err, "media layer skipped");
        }
        if let Err(err) = self.drawing_layer(inputs, &mut scene, width, height) {
            tracing::warn!(%err, "drawing layer skipped");
        }
        self.element_layers(inputs, &mut scene, width, height)?;

        let frame = FrameRGBA {
            width,
            height,
            data: scene.data_as_u8_slice().to_vec(),
            premultiplied: true,
        };
        self.pool.give_back(LayerSlot::Scene, scene);
        Ok(frame)
    }

    fn media_layer(
        &mut self,
        inputs: &FrameInputs<'_>,
        scene: &mut vello_cpu::Pixmap,
        width: u32,
        height: u32,
    ) -> StoryResult<()> {
        let Some(media) = &inputs.state.media else {
            return Ok(());
        };
        let time_s = inputs.state.playback.time_s;
        let MediaFrame::Ready(decoded) = inputs.media.frame(&media.uri, time_s) else {
            tracing::debug!(uri = %media.uri, "media frame not ready");
            return Ok(());
        };

        let mut layer = self.pool.take(LayerSlot::Media, width, height)?;
        let result = (|| {
            let placed = media_rect(f64::from(decoded.width), f64::from(decoded.height), media.fit);
            paint_image_rect(
                &mut layer,
                image_paint(&decoded)?,
                placed,
                inputs.surface.canvas_to_screen_affine(),
            )?;
            let display = inputs.surface.display_rect();
            let data = layer.data_as_u8_slice_mut();
            clip_to_rect(data, width, height, display);

            inputs.grading.apply_premul_rgba8(data, width);
            let adj = &inputs.state.filter.adjustments;
            let sharpen = adj.get(Adjustment::Sharpen);
            if sharpen > 0.0 {
                sharpen_rgba8_premul(data, width, height, sharpen);
            }
            apply_vignette(data, width, display, adj.get(Adjustment::Vignette));
            apply_grain(data, width, adj.get(Adjustment::Grain), grain_seed(time_s));
            over_in_place(scene.data_as_u8_slice_mut(), data, 1.0)
        })();
        self.pool.give_back(LayerSlot::Media, layer);
        result
    }

    fn drawing_layer(
        &mut self,
        inputs: &FrameInputs<'_>,
        scene: &mut vello_cpu::Pixmap,
        width: u32,
        height: u32,
    ) -> StoryResult<()> {
        let paths = &inputs.state.paths;
        if paths.is_empty() && inputs.live_stroke.is_none() {
            return Ok(());
        }
        let mut group = self.pool.take(LayerSlot::Drawing, width, height)?;
        let mut scratch = self.pool.take(LayerSlot::Pass, width, height)?;
        let result = (|| {
            let mut painter = StrokePainter {
                group: &mut group,
                scratch: &mut scratch,
                transform: inputs.surface.canvas_to_screen_affine(),
                scale: inputs.surface.scale(),
            };
            for path in paths.iter().chain(inputs.live_stroke) {
                painter.paint_path(path)?;
            }
            over_in_place(
                scene.data_as_u8_slice_mut(),
                group.data_as_u8_slice(),
                1.0,
            )
        })();
        self.pool.give_back(LayerSlot::Drawing, group);
        self.pool.give_back(LayerSlot::Pass, scratch);
        result
    }

    fn element_layers(
        &mut self,
        inputs: &FrameInputs<'_>,
        scene: &mut vello_cpu::Pixmap,
        width: u32,
        height: u32,
    ) -> StoryResult<()> {
        let order = inputs.state.draw_order();
        if order.is_empty() {
            return Ok(());
        }
        let mut layer = self.pool.take(LayerSlot::Element, width, height)?;
        let mut scratch = self.pool.take(LayerSlot::Pass, width, height)?;
        let frame = ElementFrame {
            assets: inputs.assets,
            media: inputs.media,
            time_s: inputs.state.playback.time_s,
            outer: inputs.surface.canvas_to_screen_affine(),
            scale: inputs.surface.scale(),
        };

        for el in order {
            if el.opacity <= 0.0 {
                continue;
            }
            let transform = match inputs.registry {
                Some(reg) => reg.current(el.id, &el.transform),
                None => el.transform,
            };
            if !transform.is_finite() {
                tracing::warn!(element = %el.id, "non-finite live transform; element skipped");
                continue;
            }
            clear_pixmap(&mut layer, [0, 0, 0, 0]);
            match self
                .elements
                .paint(el, &transform, &frame, &mut layer, &mut scratch)
            {
                Ok(true) => {
                    if let Err(err) = over_in_place(
                        scene.data_as_u8_slice_mut(),
                        layer.data_as_u8_slice(),
                        el.opacity,
                    ) {
                        tracing::warn!(element = %el.id, %err, "element blend failed");
                    }
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(
                        element = %el.id,
                        kind = el.kind.label(),
                        %err,
                        "element skipped"
                    );
                }
            }
        }
        self.pool.give_back(LayerSlot::Element, layer);
        self.pool.give_back(LayerSlot::Pass, scratch);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
