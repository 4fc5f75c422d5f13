use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::error::StoryResult;
use crate::grading::adjust::FilterAdjustments;
use crate::grading::matrix::{ColorMatrix, color_matrix_rgba8_premul};
use crate::grading::presets::ActiveFilter;
use crate::lut::atlas::{LutAtlasCache, LutSourceId, PreparedLut};
use crate::lut::parse::LutStrictness;
use crate::lut::shader::{LutShader, ShaderCaps};

/// A LUT chosen for the media layer, referenced by asset id.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LutSelection {
    /// Asset id of the `.cube` bytes in the asset registry.
    pub asset: String,
    /// Blend strength in `[0, 1]`.
    #[serde(default = "full_intensity")]
    pub intensity: f32,
}

fn full_intensity() -> f32 {
    1.0
}

impl LutSelection {
    /// Select `asset` at `intensity` (clamped, non-finite becomes 0).
    pub fn new(asset: impl Into<String>, intensity: f32) -> Self {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            asset: asset.into(),
            intensity,
        }
    }
}

/// Everything that decides the media layer's grade.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Named preset, if any.
    pub filter: Option<ActiveFilter>,
    /// Slider values.
    pub adjustments: FilterAdjustments,
    /// Active LUT, if any.
    pub lut: Option<LutSelection>,
}

impl FilterState {
    /// The single matrix for matrix mode: preset first, then the user's adjustments.
    pub fn matrix(&self) -> ColorMatrix {
        let preset = self
            .filter
            .as_ref()
            .map(ActiveFilter::matrix)
            .unwrap_or(ColorMatrix::IDENTITY);
        self.adjustments.to_matrix().compose(&preset)
    }
}

/// The per-frame color transform applied to the media layer in one pass.
#[derive(Clone, Debug)]
pub enum ColorTransform {
    /// No grading.
    Identity,
    /// Matrix mode.
    Matrix(ColorMatrix),
    /// LUT mode.
    Lut {
        /// Compiled shader.
        shader: Arc<LutShader>,
        /// Blend strength in `(0, 1]`.
        intensity: f32,
    },
}

impl ColorTransform {
    /// Return `true` when applying this transform changes nothing.
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Apply to one straight-alpha color.
    pub fn apply_straight(&self, rgba: [f32; 4]) -> [f32; 4] {
        match self {
            Self::Identity => rgba,
            Self::Matrix(m) => {
                let out = m.apply_rgba(rgba);
                out.map(|c| c.clamp(0.0, 1.0))
            }
            Self::Lut { shader, intensity } => shader.shade(rgba, *intensity),
        }
    }

    /// Apply in place to premultiplied RGBA8 rows of `width` pixels, in parallel.
    pub fn apply_premul_rgba8(&self, data: &mut [u8], width: u32) {
        let row_bytes = (width as usize * 4).max(4);
        match self {
            Self::Identity => {}
            Self::Matrix(m) => {
                let src = data.to_vec();
                data.par_chunks_mut(row_bytes)
                    .zip(src.par_chunks(row_bytes))
                    .for_each(|(dst, src)| color_matrix_rgba8_premul(src, dst, m));
            }
            Self::Lut { shader, intensity } => {
                data.par_chunks_mut(row_bytes).for_each(|row| {
                    for px in row.chunks_exact_mut(4) {
                        if px[3] == 0 {
                            continue;
                        }
                        let a = f32::from(px[3]) / 255.0;
                        let straight = [
                            f32::from(px[0]) / 255.0 / a,
                            f32::from(px[1]) / 255.0 / a,
                            f32::from(px[2]) / 255.0 / a,
                            a,
                        ];
                        let out = shader.shade(straight, *intensity);
                        for c in 0..3 {
                            px[c] = ((out[c].clamp(0.0, 1.0) * a) * 255.0).round() as u8;
                        }
                    }
                });
            }
        }
    }
}

/// Resolves filter state to a [`ColorTransform`] and owns prepared LUT shaders.
pub struct GradingEngine {
    caps: ShaderCaps,
    atlases: LutAtlasCache,
    shaders: HashMap<String, (LutSourceId, Arc<LutShader>)>,
}

impl Default for GradingEngine {
    fn default() -> Self {
        Self::new(ShaderCaps::default())
    }
}

impl GradingEngine {
    /// Create an engine for a device with `caps`.
    pub fn new(caps: ShaderCaps) -> Self {
        Self {
            caps,
            atlases: LutAtlasCache::new(),
            shaders: HashMap::new(),
        }
    }

    /// Use `strictness` when building LUTs synchronously.
    pub fn with_strictness(mut self, strictness: LutStrictness) -> Self {
        self.atlases = self.atlases.with_strictness(strictness);
        self
    }

    /// Device capabilities.
    pub fn caps(&self) -> ShaderCaps {
        self.caps
    }

    /// Pick the transform for this frame.
    ///
    /// A compiled shader with positive LUT intensity wins; otherwise the composed matrix is
    /// used, collapsing to [`ColorTransform::Identity`] when it has no effect.
    pub fn resolve(state: &FilterState, shader: Option<&Arc<LutShader>>) -> ColorTransform {
        if let (Some(shader), Some(sel)) = (shader, state.lut.as_ref())
            && sel.intensity > 0.0
        {
            return ColorTransform::Lut {
                shader: shader.clone(),
                intensity: sel.intensity,
            };
        }
        let m = state.matrix();
        if m.is_identity(1e-6) {
            ColorTransform::Identity
        } else {
            ColorTransform::Matrix(m)
        }
    }

    /// [`GradingEngine::resolve`] using the shader installed for the state's LUT, if ready.
    pub fn resolve_state(&self, state: &FilterState) -> ColorTransform {
        let shader = state.lut.as_ref().and_then(|sel| self.shader_for(&sel.asset));
        Self::resolve(state, shader.as_ref())
    }

    /// Shader installed for `asset`, if it is ready.
    pub fn shader_for(&self, asset: &str) -> Option<Arc<LutShader>> {
        self.shaders.get(asset).map(|(_, s)| s.clone())
    }

    /// Return `true` when `bytes` for `asset` are already compiled.
    pub fn is_ready(&self, asset: &str, bytes: &[u8]) -> bool {
        let id = LutSourceId::new(asset, bytes);
        self.shaders.get(asset).is_some_and(|(src, _)| *src == id)
    }

    /// Build and compile synchronously, reusing cached atlases.
    ///
    /// Shader compile failures are returned so callers can log them; resolution then keeps
    /// using matrix mode for this asset.
    pub fn prepare_lut(&mut self, asset: &str, bytes: &[u8]) -> StoryResult<Arc<LutShader>> {
        let prepared = self.atlases.get_or_build(asset, bytes)?;
        let shader = Arc::new(LutShader::compile_prepared(&prepared, &self.caps)?);
        self.shaders
            .insert(asset.to_owned(), (prepared.source.clone(), shader.clone()));
        Ok(shader)
    }

    /// Install a LUT prepared elsewhere (the resource worker).
    pub fn install(&mut self, prepared: Arc<PreparedLut>, shader: Arc<LutShader>) {
        let source = prepared.source.clone();
        self.atlases.insert(prepared);
        self.shaders.insert(source.asset.clone(), (source, shader));
    }

    /// Keep an atlas whose shader could not be compiled, so a later retry skips parsing.
    pub fn cache_atlas(&mut self, prepared: Arc<PreparedLut>) {
        self.atlases.insert(prepared);
    }

    /// Drop the shader for `asset`.
    pub fn uninstall(&mut self, asset: &str) {
        self.shaders.remove(asset);
    }

    /// Cached atlas for `id`, if any.
    pub fn cached_atlas(&mut self, id: &LutSourceId) -> Option<Arc<PreparedLut>> {
        self.atlases.get(id)
    }
}

/// 3x3 unsharp pass over premultiplied RGBA8. `amount` in `[0, 1]`; 0 is a no-op.
pub fn sharpen_rgba8_premul(data: &mut [u8], width: u32, height: u32, amount: f32) {
    if !(amount.is_finite() && amount > 0.0) || width < 3 || height < 3 {
        return;
    }
    let a = amount.min(1.0);
    let w = width as usize;
    let h = height as usize;
    if data.len() != w * h * 4 {
        return;
    }
    let src = data.to_vec();
    data.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let at = |xx: usize, yy: usize, c: usize| f32::from(src[(yy * w + xx) * 4 + c]);
            let up = y.saturating_sub(1);
            let down = (y + 1).min(h - 1);
            let left = x.saturating_sub(1);
            let right = (x + 1).min(w - 1);
            let alpha = src[(y * w + x) * 4 + 3];
            for c in 0..3 {
                let center = at(x, y, c);
                let neighbours = at(left, y, c) + at(right, y, c) + at(x, up, c) + at(x, down, c);
                let v = center * (1.0 + 4.0 * a) - neighbours * a;
                row[x * 4 + c] = v.round().clamp(0.0, f32::from(alpha)) as u8;
            }
        }
    });
}

#[cfg(test)]
#[path = "../../tests/unit/grading/engine.rs"]
mod tests;
