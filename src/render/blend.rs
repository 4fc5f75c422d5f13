//! Premultiplied RGBA8 blend operators used to merge layer pixmaps.

use crate::foundation::error::{StoryError, StoryResult};
use crate::foundation::math::mul_div255_u8;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

fn opacity_u16(opacity: f32) -> u16 {
    ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

fn scale_px(px: PremulRgba8, op: u16) -> PremulRgba8 {
    if op == 255 {
        return px;
    }
    px.map(|c| mul_div255_u8(u16::from(c), op))
}

/// Source-over: `src * opacity` on top of `dst`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = opacity_u16(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }
    let s = scale_px(src, op);
    let inv = 255u16 - u16::from(s[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = s[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Multiply: `s·(1 − da) + d·(1 − sa) + s·d`, alpha as source-over.
pub fn multiply(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = opacity_u16(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }
    let s = scale_px(src, op);
    let inv_sa = 255u16 - u16::from(s[3]);
    let inv_da = 255u16 - u16::from(dst[3]);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = u16::from(s[i]);
        let dc = u16::from(dst[i]);
        let v = u16::from(mul_div255_u8(sc, inv_da))
            + u16::from(mul_div255_u8(dc, inv_sa))
            + u16::from(mul_div255_u8(sc, dc));
        out[i] = v.min(255) as u8;
    }
    out[3] = s[3].saturating_add(mul_div255_u8(u16::from(dst[3]), inv_sa));
    // Keep the premultiplied invariant c <= a.
    for i in 0..3 {
        out[i] = out[i].min(out[3]);
    }
    out
}

/// Destination-out: remove `dst` coverage where `src` is opaque.
pub fn destination_out(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = opacity_u16(opacity);
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let keep = 255u16 - u16::from(sa);
    dst.map(|c| mul_div255_u8(u16::from(c), keep))
}

fn blend_in_place(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
    what: &str,
    op: fn(PremulRgba8, PremulRgba8, f32) -> PremulRgba8,
) -> StoryResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StoryError::render(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = op([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// [`over`] across whole buffers.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> StoryResult<()> {
    blend_in_place(dst, src, opacity, "over_in_place", over)
}

/// [`multiply`] across whole buffers.
pub fn multiply_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> StoryResult<()> {
    blend_in_place(dst, src, opacity, "multiply_in_place", multiply)
}

/// [`destination_out`] across whole buffers.
pub fn destination_out_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> StoryResult<()> {
    blend_in_place(dst, src, opacity, "destination_out_in_place", destination_out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
