use super::*;

fn close(a: [f32; 4], b: [f32; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
}

#[test]
fn identity_compose_is_neutral() {
    let m = ColorMatrix::saturation(0.3).compose(&ColorMatrix::offset([0.1, 0.0, -0.1]));
    assert_eq!(ColorMatrix::IDENTITY.compose(&m), m);
    assert_eq!(m.compose(&ColorMatrix::IDENTITY), m);
}

#[test]
fn compose_applies_rhs_then_lhs() {
    let a = ColorMatrix::scale_offset([2.0, 0.5, 1.0], [0.1, 0.2, 0.0]);
    let b = ColorMatrix::saturation(0.4).compose(&ColorMatrix::offset([0.05, -0.02, 0.03]));
    let c = [0.3, 0.6, 0.9, 1.0];

    let sequential = a.apply_rgba(b.apply_rgba(c));
    let composed = a.compose(&b).apply_rgba(c);
    assert!(close(sequential, composed), "{sequential:?} vs {composed:?}");
}

#[test]
fn offsets_are_summed_exactly_once() {
    let a = ColorMatrix::offset([0.1, 0.1, 0.1]);
    let b = ColorMatrix::offset([0.2, 0.2, 0.2]);
    let out = a.compose(&b).apply_rgba([0.0, 0.0, 0.0, 1.0]);
    assert!(close(out, [0.3, 0.3, 0.3, 1.0]));
}

#[test]
fn scaled_lhs_scales_rhs_offset() {
    let a = ColorMatrix::scale_offset([2.0, 2.0, 2.0], [0.0; 3]);
    let b = ColorMatrix::offset([0.1, 0.0, 0.0]);
    let out = a.compose(&b).apply_rgba([0.0, 0.0, 0.0, 1.0]);
    assert!(close(out, [0.2, 0.0, 0.0, 1.0]));
}

#[test]
fn lerp_identity_endpoints() {
    let m = ColorMatrix::saturation(0.0);
    assert_eq!(m.lerp_identity(0.0), ColorMatrix::IDENTITY);
    assert_eq!(m.lerp_identity(1.0), m);
    assert_eq!(m.lerp_identity(f32::NAN), ColorMatrix::IDENTITY);
}

#[test]
fn saturation_zero_is_luma_gray() {
    let out = ColorMatrix::saturation(0.0).apply_rgba([1.0, 0.0, 0.0, 1.0]);
    assert!(close(out, [LUMA_R, LUMA_R, LUMA_R, 1.0]));
}

#[test]
fn premul_pass_identity_is_identity() {
    let src = vec![10u8, 20, 30, 40, 200, 100, 50, 255];
    let mut dst = vec![0u8; src.len()];
    color_matrix_rgba8_premul(&src, &mut dst, &ColorMatrix::IDENTITY);
    for (a, b) in src.iter().zip(dst.iter()) {
        assert!((*a as i32 - *b as i32).abs() <= 1);
    }
}

#[test]
fn premul_pass_transparent_stays_transparent_without_alpha_terms() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![9u8; 4];
    color_matrix_rgba8_premul(&src, &mut dst, &ColorMatrix::offset([0.5, 0.5, 0.5]));
    assert_eq!(dst, vec![0, 0, 0, 0]);
}
