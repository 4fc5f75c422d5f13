use super::*;
use crate::assets::decode::parse_svg;

const RED_SQUARE: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#ff0000"/></svg>"##;

#[test]
fn raster_size_follows_draw_scale() {
    let svg = parse_svg(RED_SQUARE).unwrap();
    let (w, h, draw) = svg_raster_params(&svg.tree, 100.0, 50.0, Affine::scale(2.0)).unwrap();
    assert_eq!((w, h), (200, 100));
    let corner = draw * kurbo::Point::new(200.0, 100.0);
    assert!((corner.x - 200.0).abs() < 1e-9);
    assert!((corner.y - 100.0).abs() < 1e-9);
}

#[test]
fn raster_rejects_huge_and_empty_boxes() {
    let svg = parse_svg(RED_SQUARE).unwrap();
    assert!(svg_raster_params(&svg.tree, 10.0, 10.0, Affine::scale(10_000.0)).is_err());
    assert!(svg_raster_params(&svg.tree, 0.0, 10.0, Affine::IDENTITY).is_err());
}

#[test]
fn rasterize_fills_premul_pixels() {
    let svg = parse_svg(RED_SQUARE).unwrap();
    let px = rasterize_svg_to_premul_rgba8(&svg.tree, 4, 4).unwrap();
    assert_eq!(px.len(), 4 * 4 * 4);
    assert_eq!(&px[0..4], &[255, 0, 0, 255]);
}
