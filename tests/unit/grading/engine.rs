use super::*;
use crate::grading::adjust::{Adjustment, AdjustmentsPatch};
use crate::grading::presets::FilterPreset;

fn identity_cube(n: usize) -> String {
    let mut s = format!("LUT_3D_SIZE {n}\n");
    let d = (n - 1) as f32;
    for b in 0..n {
        for g in 0..n {
            for r in 0..n {
                s.push_str(&format!("{} {} {}\n", r as f32 / d, g as f32 / d, b as f32 / d));
            }
        }
    }
    s
}

fn invert_cube() -> String {
    let mut s = String::from("LUT_3D_SIZE 2\n");
    for b in 0..2 {
        for g in 0..2 {
            for r in 0..2 {
                s.push_str(&format!("{} {} {}\n", 1 - r, 1 - g, 1 - b));
            }
        }
    }
    s
}

#[test]
fn neutral_state_resolves_to_identity() {
    let t = GradingEngine::resolve(&FilterState::default(), None);
    assert!(t.is_identity());
}

#[test]
fn preset_then_adjustments_order() {
    let mut adjustments = FilterAdjustments::default();
    adjustments.apply_patch(&AdjustmentsPatch::new().with(Adjustment::Brightness, 0.4));
    let state = FilterState {
        filter: Some(ActiveFilter::new("mono", 1.0)),
        adjustments,
        lut: None,
    };
    let expected = adjustments
        .to_matrix()
        .compose(&FilterPreset::by_id("mono").unwrap().matrix);
    assert_eq!(state.matrix(), expected);

    // Brightness offset lands after the grayscale mix, so pure red gains 0.1 on every channel.
    let out = state.matrix().apply_rgba([1.0, 0.0, 0.0, 1.0]);
    assert!((out[0] - (0.2126 + 0.1)).abs() < 1e-5);
    assert!((out[2] - (0.2126 + 0.1)).abs() < 1e-5);
}

#[test]
fn lut_wins_only_when_shader_ready_and_intensity_positive() {
    let mut engine = GradingEngine::default();
    let shader = engine.prepare_lut("invert", invert_cube().as_bytes()).unwrap();

    let mut state = FilterState {
        filter: Some(ActiveFilter::new("sepia", 1.0)),
        ..FilterState::default()
    };
    assert!(matches!(
        GradingEngine::resolve(&state, Some(&shader)),
        ColorTransform::Matrix(_)
    ));

    state.lut = Some(LutSelection::new("invert", 0.0));
    assert!(matches!(
        engine.resolve_state(&state),
        ColorTransform::Matrix(_)
    ));

    state.lut = Some(LutSelection::new("invert", 1.0));
    assert!(matches!(
        engine.resolve_state(&state),
        ColorTransform::Lut { .. }
    ));

    state.lut = Some(LutSelection::new("not-loaded", 1.0));
    assert!(matches!(
        engine.resolve_state(&state),
        ColorTransform::Matrix(_)
    ));
}

#[test]
fn unsupported_shaders_fall_back_to_matrix() {
    let mut engine = GradingEngine::new(ShaderCaps::unsupported());
    assert!(engine.prepare_lut("id", identity_cube(2).as_bytes()).is_err());
    let state = FilterState {
        lut: Some(LutSelection::new("id", 1.0)),
        ..FilterState::default()
    };
    assert!(engine.resolve_state(&state).is_identity());
}

#[test]
fn lut_pass_preserves_alpha_and_inverts() {
    let mut engine = GradingEngine::default();
    let shader = engine.prepare_lut("invert", invert_cube().as_bytes()).unwrap();
    let t = ColorTransform::Lut {
        shader,
        intensity: 1.0,
    };
    // Straight (1, 0, 0) at half alpha.
    let mut px = vec![128u8, 0, 0, 128, 0, 0, 0, 0];
    t.apply_premul_rgba8(&mut px, 2);
    assert_eq!(px[3], 128);
    assert!(px[0] <= 1);
    assert!((i32::from(px[1]) - 128).abs() <= 1);
    assert_eq!(&px[4..], &[0, 0, 0, 0]);
}

#[test]
fn matrix_pass_matches_straight_application() {
    let m = ColorMatrix::offset([0.2, 0.0, 0.0]);
    let t = ColorTransform::Matrix(m);
    let mut px = vec![0u8, 0, 0, 255];
    t.apply_premul_rgba8(&mut px, 1);
    assert_eq!(px, vec![51, 0, 0, 255]);
}

#[test]
fn repeated_prepare_reuses_cached_atlas() {
    let mut engine = GradingEngine::default();
    let bytes = identity_cube(4);
    let a = engine.prepare_lut("id", bytes.as_bytes()).unwrap();
    let b = engine.prepare_lut("id", bytes.as_bytes()).unwrap();
    assert!(Arc::ptr_eq(a.atlas(), b.atlas()));
    assert!(engine.is_ready("id", bytes.as_bytes()));
}

#[test]
fn sharpen_keeps_flat_regions_and_boosts_edges() {
    let (w, h) = (4u32, 3u32);
    let mut flat = [100u8, 100, 100, 255].repeat((w * h) as usize);
    let before = flat.clone();
    sharpen_rgba8_premul(&mut flat, w, h, 1.0);
    assert_eq!(flat, before);

    let mut edge = Vec::new();
    for _y in 0..h {
        for x in 0..w {
            let v = if x < 2 { 50u8 } else { 200 };
            edge.extend_from_slice(&[v, v, v, 255]);
        }
    }
    sharpen_rgba8_premul(&mut edge, w, h, 0.5);
    let px = |x: usize, y: usize| edge[(y * w as usize + x) * 4];
    assert!(px(1, 1) < 50);
    assert!(px(2, 1) > 200);
}
