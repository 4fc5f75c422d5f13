//! Glue between canvas-space geometry and the `vello_cpu` rasterizer.

use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, BezPath, Point};
use crate::foundation::error::{StoryError, StoryResult};

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn rect_to_cpu(r: kurbo::Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

pub(crate) fn surface_dims(width: u32, height: u32) -> StoryResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StoryError::render("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StoryError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

pub(crate) fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StoryResult<vello_cpu::Pixmap> {
    let (w, h) = surface_dims(width, height)?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StoryError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<_> = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Image paint for a decoded still or video frame.
pub(crate) fn image_paint(img: &DecodedImage) -> StoryResult<vello_cpu::Image> {
    let pixmap = image_premul_bytes_to_pixmap(&img.rgba8_premul, img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

pub(crate) fn image_paint_size(image: &vello_cpu::Image) -> StoryResult<(f64, f64)> {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => Ok((f64::from(p.width()), f64::from(p.height()))),
        vello_cpu::ImageSource::OpaqueId(_) => Err(StoryError::render(
            "cpu renderer does not support opaque image ids",
        )),
    }
}

pub(crate) fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

/// Clear `pixmap` to transparent and draw into it with a fresh context.
pub(crate) fn paint_into(
    pixmap: &mut vello_cpu::Pixmap,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    clear_pixmap(pixmap, [0, 0, 0, 0]);
    let mut ctx = vello_cpu::RenderContext::new(pixmap.width(), pixmap.height());
    draw(&mut ctx);
    ctx.flush();
    ctx.render_to_pixmap(pixmap);
}
