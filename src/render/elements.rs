use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape;

use crate::assets::decode::{PreparedSvg, decode_image, looks_like_svg, parse_svg};
use crate::assets::media::MediaSource;
use crate::assets::registry::{AssetKind, AssetRegistry};
use crate::assets::svg_raster::{SvgRasterKey, rasterize_svg_to_premul_rgba8, svg_raster_params};
use crate::assets::text::{ShapedText, TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::StoryResult;
use crate::foundation::math::Fnv1a64;
use crate::render::cpu::{
    affine_to_cpu, bezpath_to_cpu, image_paint, image_paint_size, image_premul_bytes_to_pixmap,
    paint_into, rect_to_cpu,
};
use crate::render::strokes::StrokePainter;
use crate::scene::element::{CanvasElement, ElementKind, TextPayload, Transform};

const CACHE_LIMIT: usize = 256;

/// Padding around a text background, as a fraction of the font size.
pub const TEXT_BACKGROUND_PADDING: f64 = 0.25;

/// Everything an element needs from outside the element itself.
pub(crate) struct ElementFrame<'a> {
    pub assets: &'a AssetRegistry,
    pub media: &'a dyn MediaSource,
    pub time_s: f64,
    /// Canvas to device pixels.
    pub outer: Affine,
    pub scale: f64,
}

enum Sticker {
    Svg(PreparedSvg),
    Bitmap(vello_cpu::Image),
}

/// Per-compositor caches for shaped text, fonts and sticker rasters.
#[derive(Default)]
pub(crate) struct ElementPainter {
    text: TextLayoutEngine,
    layouts: HashMap<u64, ShapedText>,
    fonts: HashMap<u64, vello_cpu::peniko::FontData>,
    stickers: HashMap<u64, Arc<Sticker>>,
    svg_rasters: HashMap<SvgRasterKey, vello_cpu::Image>,
}

impl std::fmt::Debug for ElementPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementPainter")
            .field("layouts", &self.layouts.len())
            .field("fonts", &self.fonts.len())
            .field("stickers", &self.stickers.len())
            .field("svg_rasters", &self.svg_rasters.len())
            .finish()
    }
}

fn content_hash(bytes: &[u8]) -> u64 {
    xxhash_rust::xxh3::xxh3_64(bytes)
}

fn bounded<K, V>(map: &mut HashMap<K, V>) {
    if map.len() >= CACHE_LIMIT {
        map.clear();
    }
}

impl ElementPainter {
    /// Paint `el` at `transform` into `target` (cleared by the caller).
    ///
    /// Returns `Ok(false)` when a resource is missing or not ready, in which case nothing was
    /// drawn. `scratch` is used by drawing elements for per-pass rasterization.
    pub(crate) fn paint(
        &mut self,
        el: &CanvasElement,
        transform: &Transform,
        frame: &ElementFrame<'_>,
        target: &mut vello_cpu::Pixmap,
        scratch: &mut vello_cpu::Pixmap,
    ) -> StoryResult<bool> {
        match &el.kind {
            ElementKind::Text(t) => self.paint_text(t, transform, frame, target),
            ElementKind::Sticker(s) => {
                let Some(bytes) = frame.assets.bytes(&s.asset) else {
                    tracing::debug!(asset = %s.asset, "sticker asset not registered");
                    return Ok(false);
                };
                let full = frame.outer * transform.to_affine((s.width, s.height));
                self.paint_sticker(&s.asset, &bytes, (s.width, s.height), full, target)
            }
            ElementKind::Image(img) => {
                let Some(decoded) = frame.media.frame(&img.uri, frame.time_s).ready().cloned()
                else {
                    return Ok(false);
                };
                let full = frame.outer * transform.to_affine((img.width, img.height));
                let paint = image_paint(&decoded)?;
                paint_image_box(target, paint, (img.width, img.height), full)?;
                Ok(true)
            }
            ElementKind::Drawing(d) => {
                let full = frame.outer * transform.to_affine((d.width, d.height));
                let mut painter = StrokePainter {
                    group: target,
                    scratch,
                    transform: full,
                    scale: frame.scale * transform.scale.abs(),
                };
                for stroke in &d.strokes {
                    painter.paint_path(stroke)?;
                }
                Ok(!d.strokes.is_empty())
            }
        }
    }

    fn shaped(&mut self, t: &TextPayload, font_bytes: &Arc<[u8]>) -> StoryResult<ShapedText> {
        let mut h = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
        h.write_bytes(t.content.as_bytes());
        h.write_u64(content_hash(font_bytes));
        h.write_u64(u64::from(t.size_px.to_bits()));
        h.write_bytes(&t.color.to_rgba8());
        h.write_u64(t.align as u64);
        h.write_u64(t.max_width.map_or(u64::MAX, |w| u64::from(w.to_bits())));
        let key = h.finish();
        if let Some(shaped) = self.layouts.get(&key) {
            return Ok(shaped.clone());
        }

        let [r, g, b, a] = t.color.to_rgba8();
        let layout = self.text.layout_plain(
            &t.content,
            font_bytes,
            t.size_px,
            TextBrushRgba8 { r, g, b, a },
            t.max_width,
            t.align,
        )?;
        let shaped = ShapedText {
            layout: Arc::new(layout),
            font_bytes: font_bytes.clone(),
        };
        bounded(&mut self.layouts);
        self.layouts.insert(key, shaped.clone());
        Ok(shaped)
    }

    fn font(&mut self, font_bytes: &Arc<[u8]>) -> vello_cpu::peniko::FontData {
        let key = content_hash(font_bytes);
        self.fonts
            .entry(key)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
                    0,
                )
            })
            .clone()
    }

    fn paint_text(
        &mut self,
        t: &TextPayload,
        transform: &Transform,
        frame: &ElementFrame<'_>,
        target: &mut vello_cpu::Pixmap,
    ) -> StoryResult<bool> {
        if t.content.is_empty() {
            return Ok(false);
        }
        let font_bytes = match frame.assets.bytes_of(&t.font, AssetKind::Font) {
            Ok(b) => b,
            Err(_) => {
                tracing::debug!(font = %t.font, "font not available; skipping text");
                return Ok(false);
            }
        };
        let shaped = self.shaped(t, &font_bytes)?;
        let font = self.font(&font_bytes);
        let layout = &shaped.layout;
        let (w, h) = (f64::from(layout.width()), f64::from(layout.height()));
        let full = frame.outer * transform.to_affine((w, h));

        paint_into(target, |ctx| {
            ctx.set_transform(affine_to_cpu(full));
            if let Some(bg) = t.background {
                let pad = f64::from(t.size_px) * TEXT_BACKGROUND_PADDING;
                let rect = Rect::new(-pad, -pad, w + pad, h + pad);
                let shape = kurbo::RoundedRect::from_rect(rect, pad).to_path(0.1);
                ctx.set_paint(bg.to_cpu());
                ctx.fill_path(&bezpath_to_cpu(&shape));
            }
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        });
        Ok(true)
    }

    fn sticker(&mut self, asset: &str, bytes: &[u8]) -> StoryResult<Arc<Sticker>> {
        let key = content_hash(bytes);
        if let Some(s) = self.stickers.get(&key) {
            return Ok(s.clone());
        }
        let sticker = if looks_like_svg(bytes) {
            Sticker::Svg(parse_svg(bytes)?)
        } else {
            Sticker::Bitmap(image_paint(&decode_image(bytes)?)?)
        };
        tracing::debug!(asset, "prepared sticker");
        let sticker = Arc::new(sticker);
        bounded(&mut self.stickers);
        self.stickers.insert(key, sticker.clone());
        Ok(sticker)
    }

    fn paint_sticker(
        &mut self,
        asset: &str,
        bytes: &[u8],
        size: (f64, f64),
        full: Affine,
        target: &mut vello_cpu::Pixmap,
    ) -> StoryResult<bool> {
        match &*self.sticker(asset, bytes)? {
            Sticker::Bitmap(paint) => {
                paint_image_box(target, paint.clone(), size, full)?;
            }
            Sticker::Svg(svg) => {
                let (w, h, draw) = svg_raster_params(&svg.tree, size.0, size.1, full)?;
                let key = SvgRasterKey {
                    asset: asset.to_owned(),
                    width: w,
                    height: h,
                };
                let paint = match self.svg_rasters.get(&key) {
                    Some(p) => p.clone(),
                    None => {
                        let rgba = rasterize_svg_to_premul_rgba8(&svg.tree, w, h)?;
                        let pixmap = image_premul_bytes_to_pixmap(&rgba, w, h)?;
                        let paint = vello_cpu::Image {
                            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                            sampler: vello_cpu::peniko::ImageSampler::default(),
                        };
                        bounded(&mut self.svg_rasters);
                        self.svg_rasters.insert(key, paint.clone());
                        paint
                    }
                };
                paint_into(target, |ctx| {
                    ctx.set_transform(affine_to_cpu(draw));
                    ctx.set_paint(paint);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w as f64, h as f64));
                });
            }
        }
        Ok(true)
    }
}

/// Stretch `paint` over a `size` box in local space.
pub(crate) fn paint_image_box(
    target: &mut vello_cpu::Pixmap,
    paint: vello_cpu::Image,
    size: (f64, f64),
    full: Affine,
) -> StoryResult<()> {
    paint_image_rect(target, paint, Rect::new(0.0, 0.0, size.0, size.1), full)
}

/// Stretch `paint` over `rect`, with `rect` expressed in the space `full` maps to device pixels.
pub(crate) fn paint_image_rect(
    target: &mut vello_cpu::Pixmap,
    paint: vello_cpu::Image,
    rect: Rect,
    full: Affine,
) -> StoryResult<()> {
    let (iw, ih) = image_paint_size(&paint)?;
    if iw <= 0.0 || ih <= 0.0 || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return Ok(());
    }
    let place = full
        * Affine::translate((rect.x0, rect.y0))
        * Affine::scale_non_uniform(rect.width() / iw, rect.height() / ih);
    paint_into(target, |ctx| {
        ctx.set_transform(affine_to_cpu(place));
        ctx.set_paint(paint);
        ctx.fill_rect(&rect_to_cpu(Rect::new(0.0, 0.0, iw, ih)));
    });
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/elements.rs"]
mod tests;
