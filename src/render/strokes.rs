use crate::assets::color::ColorDef;
use crate::draw::path::{
    DrawingPath, PassStyle, StrokeCap, StrokeComposite, StrokePass, stroke_passes,
};
use crate::foundation::core::{Affine, BezPath};
use crate::foundation::error::StoryResult;
use crate::render::blend::{destination_out_in_place, multiply_in_place, over_in_place};
use crate::render::blur::{blur_params, blur_rgba8_premul_in_place};
use crate::render::cpu::{affine_to_cpu, bezpath_to_cpu, paint_into};

const STROKE_TOLERANCE: f64 = 0.1;

/// Outline of a stroke pass as a fillable path, in the pass's own space.
pub fn pass_outline(pass: &StrokePass) -> BezPath {
    match pass.style {
        PassStyle::Fill => (*pass.geometry).clone(),
        PassStyle::Stroke { width, cap } => {
            let (cap, join) = match cap {
                StrokeCap::Round => (kurbo::Cap::Round, kurbo::Join::Round),
                StrokeCap::Butt => (kurbo::Cap::Butt, kurbo::Join::Bevel),
            };
            let style = kurbo::Stroke::new(width).with_caps(cap).with_join(join);
            kurbo::stroke(
                pass.geometry.iter(),
                &style,
                &kurbo::StrokeOpts::default(),
                STROKE_TOLERANCE,
            )
        }
    }
}

/// Draws strokes into an isolated group pixmap.
///
/// Every pass is rasterized alone into `scratch`, optionally blurred, then blended into `group`
/// with its tool's rule. A clear pass only ever removes pixels from `group`.
pub(crate) struct StrokePainter<'a> {
    pub group: &'a mut vello_cpu::Pixmap,
    pub scratch: &'a mut vello_cpu::Pixmap,
    /// Stroke space to device pixels.
    pub transform: Affine,
    /// Device pixels per stroke unit, for blur radii.
    pub scale: f64,
}

impl StrokePainter<'_> {
    pub(crate) fn paint_path(&mut self, path: &DrawingPath) -> StoryResult<()> {
        for pass in stroke_passes(path) {
            self.paint_pass(&pass)?;
        }
        Ok(())
    }

    fn paint_pass(&mut self, pass: &StrokePass) -> StoryResult<()> {
        let outline = bezpath_to_cpu(&pass_outline(pass));
        let color = match pass.composite {
            StrokeComposite::Clear => ColorDef::BLACK,
            _ => pass.color,
        };
        let transform = affine_to_cpu(self.transform);
        paint_into(self.scratch, |ctx| {
            ctx.set_transform(transform);
            ctx.set_paint(color.to_cpu());
            ctx.fill_path(&outline);
        });

        if let Some((radius, sigma)) = blur_params(pass.blur_radius, self.scale) {
            let (w, h) = (u32::from(self.scratch.width()), u32::from(self.scratch.height()));
            blur_rgba8_premul_in_place(
                self.scratch.data_as_u8_slice_mut(),
                w,
                h,
                radius,
                sigma,
            )?;
        }

        let dst = self.group.data_as_u8_slice_mut();
        let src = self.scratch.data_as_u8_slice();
        match pass.composite {
            StrokeComposite::SourceOver | StrokeComposite::OpaqueGroup => {
                over_in_place(dst, src, pass.opacity)
            }
            StrokeComposite::Multiply => multiply_in_place(dst, src, pass.opacity),
            StrokeComposite::Clear => destination_out_in_place(dst, src, pass.opacity),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/strokes.rs"]
mod tests;
