use super::*;

#[test]
fn default_is_neutral_and_identity() {
    let a = FilterAdjustments::default();
    assert!(a.is_neutral());
    assert_eq!(a.to_matrix(), ColorMatrix::IDENTITY);
}

#[test]
fn setters_clamp_and_ignore_nan() {
    let mut a = FilterAdjustments::default();
    a.set(Adjustment::Brightness, 3.0);
    assert_eq!(a.brightness, 1.0);
    a.set(Adjustment::Vignette, -0.5);
    assert_eq!(a.vignette, 0.0);
    a.set(Adjustment::Contrast, 0.4);
    a.set(Adjustment::Contrast, f32::NAN);
    assert_eq!(a.contrast, 0.4);
}

#[test]
fn patch_applies_only_named_fields() {
    let mut a = FilterAdjustments {
        saturation: 0.5,
        ..Default::default()
    };
    a.apply_patch(
        &AdjustmentsPatch::new()
            .with(Adjustment::Brightness, 0.2)
            .with(Adjustment::Grain, 0.3),
    );
    assert_eq!(a.brightness, 0.2);
    assert_eq!(a.grain, 0.3);
    assert_eq!(a.saturation, 0.5);
}

#[test]
fn overlay_sliders_do_not_touch_the_matrix() {
    let a = FilterAdjustments {
        vignette: 1.0,
        grain: 1.0,
        sharpen: 1.0,
        ..Default::default()
    };
    assert_eq!(a.to_matrix(), ColorMatrix::IDENTITY);
    assert!(elementary_matrix(Adjustment::Vignette, 0.5).is_none());
}

#[test]
fn brightness_is_an_additive_offset() {
    let a = FilterAdjustments {
        brightness: 0.4,
        ..Default::default()
    };
    let out = a.to_matrix().apply_rgba([0.2, 0.2, 0.2, 1.0]);
    assert!((out[0] - 0.3).abs() < 1e-6);
    assert!((out[3] - 1.0).abs() < 1e-6);
}

#[test]
fn contrast_keeps_mid_gray_fixed() {
    let m = elementary_matrix(Adjustment::Contrast, 0.7).unwrap();
    let out = m.apply_rgba([0.5, 0.5, 0.5, 1.0]);
    assert!((out[0] - 0.5).abs() < 1e-6);
    let hi = m.apply_rgba([0.8, 0.8, 0.8, 1.0]);
    assert!(hi[0] > 0.8);
}

#[test]
fn combined_matrix_follows_documented_order() {
    let a = FilterAdjustments {
        brightness: 0.2,
        contrast: 0.5,
        ..Default::default()
    };
    let b = elementary_matrix(Adjustment::Brightness, 0.2).unwrap();
    let c = elementary_matrix(Adjustment::Contrast, 0.5).unwrap();
    let color = [0.1, 0.4, 0.7, 1.0];
    let expected = c.apply_rgba(b.apply_rgba(color));
    let got = a.to_matrix().apply_rgba(color);
    for i in 0..4 {
        assert!((expected[i] - got[i]).abs() < 1e-5);
    }
}

#[test]
fn fade_lifts_black_and_keeps_white() {
    let m = elementary_matrix(Adjustment::Fade, 1.0).unwrap();
    let black = m.apply_rgba([0.0, 0.0, 0.0, 1.0]);
    let white = m.apply_rgba([1.0, 1.0, 1.0, 1.0]);
    assert!((black[0] - 0.15).abs() < 1e-6);
    assert!((white[0] - 1.0).abs() < 1e-6);
}
