use crate::grading::matrix::ColorMatrix;

/// A built-in named filter look.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterPreset {
    /// Stable identifier used by hosts and scene documents.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Full-strength matrix.
    pub matrix: ColorMatrix,
}

const PRESETS: &[FilterPreset] = &[
    FilterPreset {
        id: "none",
        label: "Original",
        matrix: ColorMatrix::IDENTITY,
    },
    FilterPreset {
        id: "mono",
        label: "Mono",
        matrix: ColorMatrix([
            0.2126, 0.7152, 0.0722, 0.0, 0.0, //
            0.2126, 0.7152, 0.0722, 0.0, 0.0, //
            0.2126, 0.7152, 0.0722, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
    },
    FilterPreset {
        id: "sepia",
        label: "Sepia",
        matrix: ColorMatrix([
            0.393, 0.769, 0.189, 0.0, 0.0, //
            0.349, 0.686, 0.168, 0.0, 0.0, //
            0.272, 0.534, 0.131, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
    },
    FilterPreset {
        id: "vivid",
        label: "Vivid",
        matrix: ColorMatrix([
            1.4252, -0.3576, -0.0361, 0.0, -0.02, //
            -0.0638, 1.1426, -0.0361, 0.0, -0.02, //
            -0.0638, -0.3576, 1.4639, 0.0, -0.02, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
    },
    FilterPreset {
        id: "cool",
        label: "Cool",
        matrix: ColorMatrix([
            0.9, 0.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, 0.02, //
            0.0, 0.0, 1.1, 0.0, 0.06, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
    },
    FilterPreset {
        id: "warm",
        label: "Warm",
        matrix: ColorMatrix([
            1.1, 0.0, 0.0, 0.0, 0.06, //
            0.0, 1.0, 0.0, 0.0, 0.02, //
            0.0, 0.0, 0.9, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
    },
    FilterPreset {
        id: "fade",
        label: "Fade",
        matrix: ColorMatrix([
            0.8, 0.05, 0.05, 0.0, 0.1, //
            0.05, 0.8, 0.05, 0.0, 0.1, //
            0.05, 0.05, 0.8, 0.0, 0.1, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
    },
    FilterPreset {
        id: "noir",
        label: "Noir",
        matrix: ColorMatrix([
            0.3189, 1.0728, 0.1083, 0.0, -0.25, //
            0.3189, 1.0728, 0.1083, 0.0, -0.25, //
            0.3189, 1.0728, 0.1083, 0.0, -0.25, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]),
    },
];

impl FilterPreset {
    /// All built-in presets, `none` first.
    pub fn all() -> &'static [FilterPreset] {
        PRESETS
    }

    /// Look up a preset by id (case-insensitive).
    pub fn by_id(id: &str) -> Option<&'static FilterPreset> {
        let id = id.trim();
        PRESETS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
    }
}

/// A preset selection plus its strength.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ActiveFilter {
    /// Preset id, resolved through [`FilterPreset::by_id`].
    pub preset: String,
    /// Strength in `[0, 1]`.
    #[serde(default = "full_intensity")]
    pub intensity: f32,
}

fn full_intensity() -> f32 {
    1.0
}

impl ActiveFilter {
    /// Select `preset` at `intensity` (clamped).
    pub fn new(preset: impl Into<String>, intensity: f32) -> Self {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            preset: preset.into(),
            intensity,
        }
    }

    /// The preset matrix interpolated by intensity. Unknown ids resolve to the identity.
    pub fn matrix(&self) -> ColorMatrix {
        match FilterPreset::by_id(&self.preset) {
            Some(p) => p.matrix.lerp_identity(self.intensity),
            None => {
                tracing::warn!(preset = %self.preset, "unknown filter preset; using identity");
                ColorMatrix::IDENTITY
            }
        }
    }
}
