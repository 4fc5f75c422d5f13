//! Multiplicative finishing overlays applied to the graded media layer.

use rayon::prelude::*;

use crate::foundation::core::Rect;
use crate::foundation::math::{hash_u32, lerp, smoothstep};

/// Strongest darkening grain can apply to one pixel at intensity 1.
pub const GRAIN_STRENGTH: f32 = 0.35;

fn scale_px(px: &mut [u8], k: f32) {
    for c in px.iter_mut() {
        *c = (f32::from(*c) * k).round().clamp(0.0, 255.0) as u8;
    }
}

/// Darken radially towards the corners of `region` (device pixels).
///
/// The factor is `1 − v·smoothstep(0.35, 1.0, r)` where `r` is the distance from the region
/// center normalised so the corners sit at 1.
pub fn apply_vignette(data: &mut [u8], width: u32, region: Rect, intensity: f32) {
    if intensity <= 0.0 || width == 0 || region.width() <= 0.0 || region.height() <= 0.0 {
        return;
    }
    let v = intensity.min(1.0);
    let c = region.center();
    let (hw, hh) = (region.width() / 2.0, region.height() / 2.0);
    data.par_chunks_mut(width as usize * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let ny = ((y as f64 + 0.5 - c.y) / hh) as f32;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                if px[3] == 0 {
                    continue;
                }
                let nx = ((x as f64 + 0.5 - c.x) / hw) as f32;
                let r = (nx * nx + ny * ny).sqrt() / std::f32::consts::SQRT_2;
                let k = 1.0 - v * smoothstep(0.35, 1.0, r);
                if k < 1.0 {
                    scale_px(&mut px[..3], k);
                }
            }
        });
}

/// Frame-time seed for [`apply_grain`]; the pattern changes every millisecond of playback.
pub fn grain_seed(time_s: f64) -> u64 {
    if time_s.is_finite() {
        (time_s.max(0.0) * 1000.0).round() as u64
    } else {
        0
    }
}

/// Multiply every pixel by deterministic hash noise in `[1 − GRAIN_STRENGTH·g, 1]`.
pub fn apply_grain(data: &mut [u8], width: u32, intensity: f32, seed: u64) {
    if intensity <= 0.0 || width == 0 {
        return;
    }
    let g = intensity.min(1.0) * GRAIN_STRENGTH;
    data.par_chunks_mut(width as usize * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                if px[3] == 0 {
                    continue;
                }
                let n = hash_u32(seed, x as u32, y as u32) as f32 / u32::MAX as f32;
                scale_px(&mut px[..3], lerp(1.0, n, g));
            }
        });
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
