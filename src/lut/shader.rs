use std::sync::Arc;

use crate::foundation::error::{StoryError, StoryResult};
use crate::lut::atlas::{LutAtlas, PreparedLut};

/// Capabilities of the device the LUT shader runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderCaps {
    /// Whether runtime shaders can be compiled at all.
    pub shaders_supported: bool,
    /// Largest texture width the sampler accepts.
    pub max_texture_width: u32,
}

impl Default for ShaderCaps {
    fn default() -> Self {
        Self {
            shaders_supported: true,
            max_texture_width: 4096,
        }
    }
}

impl ShaderCaps {
    /// A device without runtime shader support.
    pub fn unsupported() -> Self {
        Self {
            shaders_supported: false,
            ..Self::default()
        }
    }
}

/// Compiled LUT grading program bound to one atlas.
///
/// Sampling uses two adjacent blue slices of the atlas, bilinear within each slice, blended by
/// the fractional blue coordinate. Source alpha is never modified.
#[derive(Clone, Debug)]
pub struct LutShader {
    atlas: Arc<LutAtlas>,
    domain_min: [f32; 3],
    domain_max: [f32; 3],
}

impl LutShader {
    /// Bind `atlas` with the default `[0,1]` domain.
    pub fn compile(atlas: Arc<LutAtlas>, caps: &ShaderCaps) -> StoryResult<Self> {
        Self::compile_with_domain(atlas, [0.0; 3], [1.0; 3], caps)
    }

    /// Bind a prepared LUT, carrying its domain.
    pub fn compile_prepared(prepared: &PreparedLut, caps: &ShaderCaps) -> StoryResult<Self> {
        Self::compile_with_domain(
            prepared.atlas.clone(),
            prepared.domain_min,
            prepared.domain_max,
            caps,
        )
    }

    /// Bind `atlas` with an explicit input domain.
    pub fn compile_with_domain(
        atlas: Arc<LutAtlas>,
        domain_min: [f32; 3],
        domain_max: [f32; 3],
        caps: &ShaderCaps,
    ) -> StoryResult<Self> {
        if !caps.shaders_supported {
            return Err(StoryError::lut("runtime shaders are not supported"));
        }
        if atlas.width > caps.max_texture_width {
            return Err(StoryError::lut(format!(
                "lut atlas width {} exceeds max texture width {}",
                atlas.width, caps.max_texture_width
            )));
        }
        if atlas.size < 2 || atlas.rgba.len() != (atlas.width * atlas.height * 4) as usize {
            return Err(StoryError::lut("lut atlas is malformed"));
        }
        Ok(Self {
            atlas,
            domain_min,
            domain_max,
        })
    }

    /// Grid size `N`.
    pub fn grid_size(&self) -> u32 {
        self.atlas.size
    }

    /// Bound atlas.
    pub fn atlas(&self) -> &Arc<LutAtlas> {
        &self.atlas
    }

    /// Graded RGB for a straight-alpha color.
    pub fn sample(&self, rgb: [f32; 3]) -> [f32; 3] {
        let n = self.atlas.size;
        let max_idx = (n - 1) as f32;
        let [r, g, b] = self.normalize(rgb);

        let bz = b * max_idx;
        let b0 = (bz.floor() as u32).min(n - 1);
        let b1 = (b0 + 1).min(n - 1);
        let fb = bz - b0 as f32;

        let lo = self.sample_slice(b0, r * max_idx, g * max_idx);
        let hi = self.sample_slice(b1, r * max_idx, g * max_idx);
        [
            lo[0] + (hi[0] - lo[0]) * fb,
            lo[1] + (hi[1] - lo[1]) * fb,
            lo[2] + (hi[2] - lo[2]) * fb,
        ]
    }

    /// Graded straight RGBA blended with the source by `intensity`, alpha preserved.
    pub fn shade(&self, rgba: [f32; 4], intensity: f32) -> [f32; 4] {
        let t = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if t == 0.0 {
            return rgba;
        }
        let graded = self.sample([rgba[0], rgba[1], rgba[2]]);
        [
            rgba[0] + (graded[0] - rgba[0]) * t,
            rgba[1] + (graded[1] - rgba[1]) * t,
            rgba[2] + (graded[2] - rgba[2]) * t,
            rgba[3],
        ]
    }

    fn normalize(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0; 3];
        for c in 0..3 {
            let (lo, hi) = if self.domain_max[c] > self.domain_min[c] {
                (self.domain_min[c], self.domain_max[c])
            } else {
                (0.0, 1.0)
            };
            let v = if rgb[c].is_finite() { rgb[c] } else { 0.0 };
            out[c] = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
        }
        out
    }

    // `x`/`y` are grid coordinates; texel centers sit at +0.5 so integer coordinates hit a
    // texel exactly and fractions blend its right/lower neighbour.
    fn sample_slice(&self, slice: u32, x: f32, y: f32) -> [f32; 3] {
        let n = self.atlas.size;
        let x0 = (x.floor() as u32).min(n - 1);
        let y0 = (y.floor() as u32).min(n - 1);
        let x1 = (x0 + 1).min(n - 1);
        let y1 = (y0 + 1).min(n - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let base = slice * n;
        let t00 = self.atlas.texel(base + x0, y0);
        let t10 = self.atlas.texel(base + x1, y0);
        let t01 = self.atlas.texel(base + x0, y1);
        let t11 = self.atlas.texel(base + x1, y1);

        let mut out = [0.0f32; 3];
        for c in 0..3 {
            let top = f32::from(t00[c]) + (f32::from(t10[c]) - f32::from(t00[c])) * fx;
            let bottom = f32::from(t01[c]) + (f32::from(t11[c]) - f32::from(t01[c])) * fx;
            out[c] = (top + (bottom - top) * fy) / 255.0;
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lut/shader.rs"]
mod tests;
