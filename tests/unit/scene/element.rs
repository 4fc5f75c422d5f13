use super::*;
use crate::foundation::core::Point;

fn sticker(w: f64, h: f64) -> ElementKind {
    ElementKind::Sticker(StickerPayload {
        asset: "stickers/star".to_owned(),
        width: w,
        height: h,
    })
}

fn element(timestamp: Option<f64>) -> CanvasElement {
    CanvasElement {
        id: ElementId(1),
        transform: Transform::default(),
        z_index: 0,
        opacity: 1.0,
        timestamp,
        kind: sticker(100.0, 50.0),
    }
}

#[test]
fn affine_pivots_on_local_center() {
    let t = Transform {
        translate_x: 300.0,
        translate_y: 400.0,
        scale: 2.0,
        rotation_deg: 90.0,
    };
    let a = t.to_affine((100.0, 50.0));
    let center = a * Point::new(50.0, 25.0);
    assert!((center.x - 300.0).abs() < 1e-9 && (center.y - 400.0).abs() < 1e-9);

    // Local right edge midpoint: +50 along x, scaled to 100, rotated 90deg onto +y.
    let right = a * Point::new(100.0, 25.0);
    assert!((right.x - 300.0).abs() < 1e-9);
    assert!((right.y - 500.0).abs() < 1e-9);
}

#[test]
fn default_transform_is_canvas_center() {
    let t = Transform::default();
    assert_eq!((t.translate_x, t.translate_y), (540.0, 960.0));
    assert_eq!(t.scale, 1.0);
    assert!(t.is_finite());
    assert!(!Transform::at(f64::NAN, 0.0).is_finite());
}

#[test]
fn timestamp_visibility_only_for_video() {
    let el = element(Some(2.0));
    assert!(!el.is_visible_at(Some(MediaKind::Video), 1.9));
    assert!(el.is_visible_at(Some(MediaKind::Video), 2.0));
    assert!(el.is_visible_at(Some(MediaKind::Video), 4.99));
    assert!(!el.is_visible_at(Some(MediaKind::Video), 5.0));
    assert!(el.is_visible_at(Some(MediaKind::Image), 100.0));
    assert!(element(None).is_visible_at(Some(MediaKind::Video), 100.0));
}

#[test]
fn patch_applies_fields_and_rejects_non_finite() {
    let mut el = element(Some(1.0));
    let ok = ElementPatch {
        z_index: Some(7),
        opacity: Some(3.0),
        timestamp: Some(None),
        ..ElementPatch::default()
    };
    assert!(ok.apply(&mut el));
    assert_eq!(el.z_index, 7);
    assert_eq!(el.opacity, 1.0);
    assert_eq!(el.timestamp, None);

    let before = el.clone();
    let bad = ElementPatch {
        transform: Some(Transform::at(f64::INFINITY, 0.0)),
        z_index: Some(9),
        ..ElementPatch::default()
    };
    assert!(!bad.apply(&mut el));
    assert_eq!(el, before);
}

#[test]
fn element_json_uses_type_tag() {
    let el = element(None);
    let v = serde_json::to_value(&el).unwrap();
    assert_eq!(v["type"], "sticker");
    assert_eq!(v["asset"], "stickers/star");
    let back: CanvasElement = serde_json::from_value(v).unwrap();
    assert_eq!(back, el);
}
