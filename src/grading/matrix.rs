//! 4x5 affine color matrices.
//!
//! Layout is row-major, 4 rows (R, G, B, A) by 5 columns: the first four columns are the
//! linear part and the fifth is the additive offset, in normalized `[0, 1]` channel units.

/// Rec.709 luma weights used by luminance-preserving operations.
pub const LUMA_R: f32 = 0.2126;
/// Rec.709 luma weight for green.
pub const LUMA_G: f32 = 0.7152;
/// Rec.709 luma weight for blue.
pub const LUMA_B: f32 = 0.0722;

/// A 4x5 color matrix applied to straight-alpha RGBA.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ColorMatrix(pub [f32; 20]);

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColorMatrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    /// Raw row-major coefficients.
    pub fn as_array(&self) -> &[f32; 20] {
        &self.0
    }

    /// Return `true` when every coefficient is within `eps` of the identity.
    pub fn is_identity(&self, eps: f32) -> bool {
        self.0
            .iter()
            .zip(Self::IDENTITY.0.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    /// Per-channel scale with offsets, leaving alpha untouched.
    pub fn scale_offset(scale: [f32; 3], offset: [f32; 3]) -> Self {
        let [sr, sg, sb] = scale;
        let [or, og, ob] = offset;
        Self([
            sr, 0.0, 0.0, 0.0, or, //
            0.0, sg, 0.0, 0.0, og, //
            0.0, 0.0, sb, 0.0, ob, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    /// Pure additive RGB offset.
    pub fn offset(offset: [f32; 3]) -> Self {
        Self::scale_offset([1.0, 1.0, 1.0], offset)
    }

    /// Luminance-preserving saturation: `0` is grayscale, `1` identity, `>1` boosts.
    pub fn saturation(s: f32) -> Self {
        let inv = 1.0 - s;
        let r = inv * LUMA_R;
        let g = inv * LUMA_G;
        let b = inv * LUMA_B;
        Self([
            r + s, g, b, 0.0, 0.0, //
            r, g + s, b, 0.0, 0.0, //
            r, g, b + s, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    /// Compose two matrices so that the result applies `rhs` first and then `self`.
    ///
    /// Linear parts multiply; the right-hand offset is carried through the left-hand linear part
    /// and added to the left-hand offset exactly once.
    pub fn compose(&self, rhs: &ColorMatrix) -> ColorMatrix {
        let a = &self.0;
        let b = &rhs.0;
        let mut out = [0.0f32; 20];
        for row in 0..4 {
            for col in 0..4 {
                let mut acc = 0.0;
                for k in 0..4 {
                    acc += a[row * 5 + k] * b[k * 5 + col];
                }
                out[row * 5 + col] = acc;
            }
            let mut t = a[row * 5 + 4];
            for k in 0..4 {
                t += a[row * 5 + k] * b[k * 5 + 4];
            }
            out[row * 5 + 4] = t;
        }
        ColorMatrix(out)
    }

    /// Interpolate from the identity (`t = 0`) to `self` (`t = 1`).
    pub fn lerp_identity(&self, t: f32) -> ColorMatrix {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mut out = [0.0f32; 20];
        for (i, o) in out.iter_mut().enumerate() {
            let id = Self::IDENTITY.0[i];
            *o = id + (self.0[i] - id) * t;
        }
        ColorMatrix(out)
    }

    /// Apply to one straight-alpha color. Results are not clamped.
    pub fn apply_rgba(&self, c: [f32; 4]) -> [f32; 4] {
        let m = &self.0;
        let [r, g, b, a] = c;
        [
            m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4],
            m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9],
            m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14],
            m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19],
        ]
    }
}

/// Apply `m` to premultiplied RGBA8 pixels, writing premultiplied results into `dst`.
pub(crate) fn color_matrix_rgba8_premul(src: &[u8], dst: &mut [u8], m: &ColorMatrix) {
    debug_assert_eq!(src.len(), dst.len());
    let m = &m.0;
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let pr = s[0] as f32 / 255.0;
        let pg = s[1] as f32 / 255.0;
        let pb = s[2] as f32 / 255.0;
        let pa = s[3] as f32 / 255.0;

        // Convert premul -> straight for matrix application.
        let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
        let r = pr * inv_a;
        let g = pg * inv_a;
        let b = pb * inv_a;
        let a = pa;

        let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0);
        let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0);
        let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0);
        let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0);

        // Convert straight -> premul.
        let pr = (out_r * out_a).clamp(0.0, 1.0);
        let pg = (out_g * out_a).clamp(0.0, 1.0);
        let pb = (out_b * out_a).clamp(0.0, 1.0);

        d[0] = (pr * 255.0).round().clamp(0.0, 255.0) as u8;
        d[1] = (pg * 255.0).round().clamp(0.0, 255.0) as u8;
        d[2] = (pb * 255.0).round().clamp(0.0, 255.0) as u8;
        d[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grading/matrix.rs"]
mod tests;
