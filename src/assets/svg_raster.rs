use crate::foundation::core::Affine;
use crate::foundation::error::{StoryError, StoryResult};

/// Largest raster edge for a sticker, in pixels.
pub const MAX_SVG_RASTER_DIM: u32 = 8192;

/// Cache key for one rasterization of an SVG sticker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SvgRasterKey {
    /// Sticker asset id.
    pub asset: String,
    /// Raster width.
    pub width: u32,
    /// Raster height.
    pub height: u32,
}

/// Pick a raster size for drawing `tree` into a box of `box_w x box_h` canvas units under
/// `transform` (canvas to device).
///
/// Returns `(width, height, draw_transform)` where `draw_transform` maps raster pixels to device
/// pixels, so the sticker stays sharp when the element is scaled up.
pub fn svg_raster_params(
    tree: &usvg::Tree,
    box_w: f64,
    box_h: f64,
    transform: Affine,
) -> StoryResult<(u32, u32, Affine)> {
    let size = tree.size();
    let (sw, sh) = (f64::from(size.width()), f64::from(size.height()));
    if !(sw.is_finite() && sh.is_finite() && sw > 0.0 && sh > 0.0) {
        return Err(StoryError::render("svg has invalid width/height"));
    }
    if !(box_w.is_finite() && box_h.is_finite() && box_w > 0.0 && box_h > 0.0) {
        return Err(StoryError::render("sticker box must be positive"));
    }

    let [a, b, c, d, _e, _f] = transform.as_coeffs();
    let sx = (a * a + b * b).sqrt().max(1e-6);
    let sy = (c * c + d * d).sqrt().max(1e-6);

    let w = (box_w * sx).ceil().max(1.0);
    let h = (box_h * sy).ceil().max(1.0);
    let limit = f64::from(MAX_SVG_RASTER_DIM);
    if w > limit || h > limit {
        return Err(StoryError::render(format!(
            "svg raster size too large: {w}x{h} (max {MAX_SVG_RASTER_DIM})"
        )));
    }
    let (w, h) = (w as u32, h as u32);

    let draw = transform * Affine::scale_non_uniform(box_w / f64::from(w), box_h / f64::from(h));
    Ok((w, h, draw))
}

/// Render `tree` stretched to `width x height` into premultiplied RGBA8.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> StoryResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StoryError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.take())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
