use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::StoryResult;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap already premultiplied pixels. Fails when the byte length does not match.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> StoryResult<Self> {
        if rgba8_premul.len() != width as usize * height as usize * 4 {
            return Err(crate::foundation::error::StoryError::decode(format!(
                "expected {}x{}x4 bytes, got {}",
                width,
                height,
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// A single-color image.
    pub fn solid(width: u32, height: u32, premul: [u8; 4]) -> Self {
        Self {
            width,
            height,
            rgba8_premul: Arc::new(premul.repeat(width as usize * height as usize)),
        }
    }
}

/// Parsed SVG sticker.
#[derive(Clone, Debug)]
pub struct PreparedSvg {
    /// Parsed tree.
    pub tree: Arc<usvg::Tree>,
}

/// Decode any format supported by `image` into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> StoryResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes, resolving text against system fonts.
pub fn parse_svg(bytes: &[u8]) -> StoryResult<PreparedSvg> {
    parse_svg_with_fonts(bytes, &[])
}

/// Parse SVG bytes, resolving text against system fonts plus `fonts` (raw TTF/OTF bytes).
pub fn parse_svg_with_fonts(bytes: &[u8], fonts: &[Arc<[u8]>]) -> StoryResult<PreparedSvg> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    for font in fonts {
        db.load_font_data(font.to_vec());
    }
    let opts = usvg::Options {
        fontdb: Arc::new(db),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// Return `true` when `bytes` look like SVG markup rather than a raster format.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

/// Premultiplied RGBA8 back to straight alpha.
pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
