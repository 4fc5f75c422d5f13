use std::sync::Arc;

use kurbo::Shape;
use smallvec::SmallVec;

use crate::assets::color::ColorDef;
use crate::foundation::core::{BezPath, Point, Vec2};

/// Freehand drawing tools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeTool {
    /// Opaque round pen.
    #[default]
    Pen,
    /// Translucent marker, flattened as one group so overlaps do not darken.
    Marker,
    /// Glowing stroke drawn in three passes.
    Neon,
    /// Flat-capped multiply stroke.
    Highlighter,
    /// Clears drawing pixels.
    Eraser,
    /// Pen with an arrow head at the end.
    Arrow,
}

/// Line cap used by a tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeCap {
    /// Round caps and joins.
    Round,
    /// Flat caps, round joins.
    Butt,
}

/// How a stroke combines with what is already in the drawing group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeComposite {
    /// Normal alpha blending.
    SourceOver,
    /// Draw opaque into an isolated layer, then blend that layer at the tool opacity.
    OpaqueGroup,
    /// Multiply with the group below.
    Multiply,
    /// Remove group pixels under the stroke.
    Clear,
}

/// Width range and compositing rule of a tool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolPreset {
    /// Smallest allowed width.
    pub min_width: f64,
    /// Largest allowed width.
    pub max_width: f64,
    /// Width a new stroke starts with.
    pub default_width: f64,
    /// Stroke opacity.
    pub opacity: f32,
    /// Cap style.
    pub cap: StrokeCap,
    /// Blend rule.
    pub composite: StrokeComposite,
}

impl StrokeTool {
    /// Every tool, in picker order.
    pub const ALL: [StrokeTool; 6] = [
        Self::Pen,
        Self::Marker,
        Self::Neon,
        Self::Highlighter,
        Self::Eraser,
        Self::Arrow,
    ];

    /// Preset for this tool.
    pub fn preset(self) -> ToolPreset {
        use StrokeCap::{Butt, Round};
        use StrokeComposite::{Clear, Multiply, OpaqueGroup, SourceOver};
        let (min_width, max_width, default_width, opacity, cap, composite) = match self {
            Self::Pen => (2.0, 24.0, 6.0, 1.0, Round, SourceOver),
            Self::Marker => (8.0, 40.0, 16.0, 0.6, Round, OpaqueGroup),
            Self::Neon => (4.0, 24.0, 10.0, 1.0, Round, SourceOver),
            Self::Highlighter => (12.0, 48.0, 24.0, 0.4, Butt, Multiply),
            Self::Eraser => (8.0, 80.0, 28.0, 1.0, Round, Clear),
            Self::Arrow => (3.0, 16.0, 6.0, 1.0, Round, SourceOver),
        };
        ToolPreset {
            min_width,
            max_width,
            default_width,
            opacity,
            cap,
            composite,
        }
    }

    /// Clamp `width` into the tool's range; non-finite widths become the default.
    pub fn clamp_width(self, width: f64) -> f64 {
        let p = self.preset();
        if width.is_finite() {
            width.clamp(p.min_width, p.max_width)
        } else {
            p.default_width
        }
    }
}

/// A committed stroke. Immutable once added to the editor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DrawingPath {
    /// Canvas-space samples in input order.
    pub points: Vec<Point>,
    /// Stroke color.
    pub color: ColorDef,
    /// Stroke width in canvas units.
    pub width: f64,
    /// Tool used.
    pub tool: StrokeTool,
    /// Opacity in `[0, 1]`.
    #[serde(default = "full_opacity")]
    pub opacity: f32,
}

fn full_opacity() -> f32 {
    1.0
}

impl DrawingPath {
    /// Build with the tool's preset opacity and a clamped width.
    pub fn new(tool: StrokeTool, color: ColorDef, width: f64, points: Vec<Point>) -> Self {
        Self {
            points,
            color,
            width: tool.clamp_width(width),
            tool,
            opacity: tool.preset().opacity,
        }
    }
}

/// How a pass paints its geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PassStyle {
    /// Stroke the outline.
    Stroke {
        /// Stroke width.
        width: f64,
        /// Cap style.
        cap: StrokeCap,
    },
    /// Fill the interior.
    Fill,
}

/// One render pass of a stroke.
#[derive(Clone, Debug)]
pub struct StrokePass {
    /// Geometry in canvas space; shared by every pass drawing the same stroke body.
    pub geometry: Arc<BezPath>,
    /// Stroke or fill.
    pub style: PassStyle,
    /// Paint color.
    pub color: ColorDef,
    /// Gaussian blur radius in canvas units (0 = sharp).
    pub blur_radius: f64,
    /// Blend rule.
    pub composite: StrokeComposite,
    /// Opacity applied to the whole pass.
    pub opacity: f32,
}

/// Smooth a sample sequence with quadratic segments through consecutive midpoints.
///
/// One point gives a zero-length segment, two a straight line.
pub fn smooth_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    match points {
        [] => {}
        [p] => {
            path.move_to(*p);
            path.line_to(*p);
        }
        [a, b] => {
            path.move_to(*a);
            path.line_to(*b);
        }
        [first, .., last] => {
            path.move_to(*first);
            path.line_to(points[0].midpoint(points[1]));
            for i in 1..points.len() - 1 {
                path.quad_to(points[i], points[i].midpoint(points[i + 1]));
            }
            path.line_to(*last);
        }
    }
    path
}

/// Render passes for `path`, bottom first.
pub fn stroke_passes(path: &DrawingPath) -> SmallVec<[StrokePass; 3]> {
    let mut passes = SmallVec::new();
    if path.points.is_empty() {
        return passes;
    }
    let preset = path.tool.preset();
    let width = path.width;

    // A single sample draws a dot; each pass sizes its own circle.
    let dot = (path.points.len() == 1).then_some(path.points[0]);
    let line = Arc::new(match dot {
        Some(_) => BezPath::new(),
        None => smooth_path(&path.points),
    });
    let body = |k: f64| -> (Arc<BezPath>, PassStyle) {
        match dot {
            Some(center) => (
                Arc::new(kurbo::Circle::new(center, width * k / 2.0).to_path(0.1)),
                PassStyle::Fill,
            ),
            None => (
                line.clone(),
                PassStyle::Stroke {
                    width: width * k,
                    cap: preset.cap,
                },
            ),
        }
    };

    match path.tool {
        StrokeTool::Neon => {
            let (geometry, style) = body(3.0);
            passes.push(StrokePass {
                geometry,
                style,
                color: path.color,
                blur_radius: width,
                composite: StrokeComposite::SourceOver,
                opacity: path.opacity * 0.6,
            });
            let (geometry, style) = body(1.6);
            passes.push(StrokePass {
                geometry,
                style,
                color: path.color,
                blur_radius: width / 2.0,
                composite: StrokeComposite::SourceOver,
                opacity: path.opacity * 0.9,
            });
            let (geometry, style) = body(0.6);
            passes.push(StrokePass {
                geometry,
                style,
                color: ColorDef::WHITE,
                blur_radius: 0.0,
                composite: StrokeComposite::SourceOver,
                opacity: path.opacity,
            });
        }
        StrokeTool::Arrow => {
            let head = arrow_head(&path.points, width);
            let (geometry, style) = body(1.0);
            passes.push(StrokePass {
                geometry,
                style,
                color: path.color,
                blur_radius: 0.0,
                composite: preset.composite,
                opacity: path.opacity,
            });
            if let Some(head) = head {
                passes.push(StrokePass {
                    geometry: Arc::new(head),
                    style: PassStyle::Fill,
                    color: path.color,
                    blur_radius: 0.0,
                    composite: preset.composite,
                    opacity: path.opacity,
                });
            }
        }
        _ => {
            let (geometry, style) = body(1.0);
            passes.push(StrokePass {
                geometry,
                style,
                color: path.color,
                blur_radius: 0.0,
                composite: preset.composite,
                opacity: path.opacity,
            });
        }
    }
    passes
}

/// Filled triangle at the last point, pointing along the final non-degenerate segment.
pub fn arrow_head(points: &[Point], width: f64) -> Option<BezPath> {
    let tip = *points.last()?;
    let from = points
        .iter()
        .rev()
        .skip(1)
        .find(|p| (tip - **p).hypot() > 1e-6)?;
    let dir: Vec2 = (tip - *from).normalize();
    let normal = Vec2::new(-dir.y, dir.x);
    let len = (width * 3.0).max(12.0);
    let half = len * 0.6;
    let base = tip - dir * len;

    let mut head = BezPath::new();
    head.move_to(tip + dir * (width / 2.0));
    head.line_to(base + normal * half);
    head.line_to(base - normal * half);
    head.close_path();
    Some(head)
}

#[cfg(test)]
#[path = "../../tests/unit/draw/path.rs"]
mod tests;
