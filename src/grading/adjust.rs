use crate::grading::matrix::ColorMatrix;

/// Named adjustment sliders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// Additive exposure-like offset.
    Brightness,
    /// Scale around mid gray.
    Contrast,
    /// Luminance-preserving saturation.
    Saturation,
    /// Warm/cool balance (red vs blue).
    Temperature,
    /// Green/magenta balance.
    Tint,
    /// Gain on bright tones.
    Highlights,
    /// Lift on dark tones.
    Shadows,
    /// Radial darkening overlay.
    Vignette,
    /// Unsharp-mask strength.
    Sharpen,
    /// Shadow-lifting wash.
    Fade,
    /// Film grain overlay strength.
    Grain,
}

impl Adjustment {
    /// Every slider in display order.
    pub const ALL: [Adjustment; 11] = [
        Adjustment::Brightness,
        Adjustment::Contrast,
        Adjustment::Saturation,
        Adjustment::Temperature,
        Adjustment::Tint,
        Adjustment::Highlights,
        Adjustment::Shadows,
        Adjustment::Vignette,
        Adjustment::Sharpen,
        Adjustment::Fade,
        Adjustment::Grain,
    ];

    /// Inclusive slider range. Neutral is always `0`.
    pub fn range(self) -> (f32, f32) {
        match self {
            Adjustment::Vignette | Adjustment::Sharpen | Adjustment::Fade | Adjustment::Grain => {
                (0.0, 1.0)
            }
            _ => (-1.0, 1.0),
        }
    }

    /// Clamp `v` into this slider's range; non-finite input yields `None`.
    pub fn clamp(self, v: f32) -> Option<f32> {
        if !v.is_finite() {
            return None;
        }
        let (lo, hi) = self.range();
        Some(v.clamp(lo, hi))
    }
}

/// Current slider values. `Default` is fully neutral.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FilterAdjustments {
    /// See [`Adjustment::Brightness`].
    pub brightness: f32,
    /// See [`Adjustment::Contrast`].
    pub contrast: f32,
    /// See [`Adjustment::Saturation`].
    pub saturation: f32,
    /// See [`Adjustment::Temperature`].
    pub temperature: f32,
    /// See [`Adjustment::Tint`].
    pub tint: f32,
    /// See [`Adjustment::Highlights`].
    pub highlights: f32,
    /// See [`Adjustment::Shadows`].
    pub shadows: f32,
    /// See [`Adjustment::Vignette`].
    pub vignette: f32,
    /// See [`Adjustment::Sharpen`].
    pub sharpen: f32,
    /// See [`Adjustment::Fade`].
    pub fade: f32,
    /// See [`Adjustment::Grain`].
    pub grain: f32,
}

/// Partial update of [`FilterAdjustments`]; `None` fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdjustmentsPatch {
    values: Vec<(Adjustment, f32)>,
}

impl AdjustmentsPatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slider value to the patch.
    pub fn with(mut self, which: Adjustment, value: f32) -> Self {
        self.values.push((which, value));
        self
    }

    /// Return `true` when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FilterAdjustments {
    /// Read one slider.
    pub fn get(&self, which: Adjustment) -> f32 {
        match which {
            Adjustment::Brightness => self.brightness,
            Adjustment::Contrast => self.contrast,
            Adjustment::Saturation => self.saturation,
            Adjustment::Temperature => self.temperature,
            Adjustment::Tint => self.tint,
            Adjustment::Highlights => self.highlights,
            Adjustment::Shadows => self.shadows,
            Adjustment::Vignette => self.vignette,
            Adjustment::Sharpen => self.sharpen,
            Adjustment::Fade => self.fade,
            Adjustment::Grain => self.grain,
        }
    }

    /// Write one slider, clamped to its range. Non-finite values are ignored.
    pub fn set(&mut self, which: Adjustment, value: f32) {
        let Some(v) = which.clamp(value) else {
            tracing::debug!(?which, value, "ignoring non-finite adjustment");
            return;
        };
        let slot = match which {
            Adjustment::Brightness => &mut self.brightness,
            Adjustment::Contrast => &mut self.contrast,
            Adjustment::Saturation => &mut self.saturation,
            Adjustment::Temperature => &mut self.temperature,
            Adjustment::Tint => &mut self.tint,
            Adjustment::Highlights => &mut self.highlights,
            Adjustment::Shadows => &mut self.shadows,
            Adjustment::Vignette => &mut self.vignette,
            Adjustment::Sharpen => &mut self.sharpen,
            Adjustment::Fade => &mut self.fade,
            Adjustment::Grain => &mut self.grain,
        };
        *slot = v;
    }

    /// Apply a partial update in patch order.
    pub fn apply_patch(&mut self, patch: &AdjustmentsPatch) {
        for &(which, value) in &patch.values {
            self.set(which, value);
        }
    }

    /// Return `true` when every slider is neutral.
    pub fn is_neutral(&self) -> bool {
        Adjustment::ALL.iter().all(|&a| self.get(a) == 0.0)
    }

    /// Clamp every field into range, replacing non-finite values with neutral.
    pub fn sanitized(mut self) -> Self {
        for a in Adjustment::ALL {
            let v = self.get(a);
            let v = a.clamp(v).unwrap_or(0.0);
            self.set(a, v);
        }
        self
    }

    /// Build the combined matrix of the matrix-expressible sliders.
    ///
    /// Order: brightness, contrast, saturation, temperature, tint, highlights, shadows, fade.
    /// Vignette, sharpen and grain are not matrix terms and are ignored here.
    pub fn to_matrix(&self) -> ColorMatrix {
        let mut out = ColorMatrix::IDENTITY;
        for (which, value) in [
            (Adjustment::Brightness, self.brightness),
            (Adjustment::Contrast, self.contrast),
            (Adjustment::Saturation, self.saturation),
            (Adjustment::Temperature, self.temperature),
            (Adjustment::Tint, self.tint),
            (Adjustment::Highlights, self.highlights),
            (Adjustment::Shadows, self.shadows),
            (Adjustment::Fade, self.fade),
        ] {
            if value == 0.0 {
                continue;
            }
            if let Some(m) = elementary_matrix(which, value) {
                out = m.compose(&out);
            }
        }
        out
    }
}

/// The matrix contributed by one slider, or `None` for overlay-style sliders.
pub fn elementary_matrix(which: Adjustment, value: f32) -> Option<ColorMatrix> {
    let v = which.clamp(value)?;
    let m = match which {
        Adjustment::Brightness => ColorMatrix::offset([0.25 * v; 3]),
        Adjustment::Contrast => {
            let k = 1.0 + v;
            let o = 0.5 * (1.0 - k);
            ColorMatrix::scale_offset([k; 3], [o; 3])
        }
        Adjustment::Saturation => ColorMatrix::saturation(1.0 + v),
        Adjustment::Temperature => ColorMatrix::offset([0.1 * v, 0.0, -0.1 * v]),
        Adjustment::Tint => ColorMatrix::offset([0.05 * v, -0.1 * v, 0.05 * v]),
        Adjustment::Highlights => ColorMatrix::scale_offset([1.0 + 0.25 * v; 3], [0.0; 3]),
        Adjustment::Shadows => ColorMatrix::scale_offset([1.0 - 0.1 * v; 3], [0.1 * v; 3]),
        Adjustment::Fade => ColorMatrix::scale_offset([1.0 - 0.15 * v; 3], [0.15 * v; 3]),
        Adjustment::Vignette | Adjustment::Sharpen | Adjustment::Grain => return None,
    };
    Some(m)
}

#[cfg(test)]
#[path = "../../tests/unit/grading/adjust.rs"]
mod tests;
