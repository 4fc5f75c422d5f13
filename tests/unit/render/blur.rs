use super::*;

#[test]
fn radius_0_is_identity() {
    let mut data = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    blur_rgba8_premul_in_place(&mut data, 1, 2, 0, 1.0).unwrap();
    assert_eq!(data, vec![1u8, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn constant_image_is_unchanged() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    let mut data = src.clone();
    blur_rgba8_premul_in_place(&mut data, w, h, 3, 2.0).unwrap();
    assert_eq!(data, src);
}

#[test]
fn single_pixel_energy_spreads_but_is_preserved() {
    let (w, h) = (5u32, 5u32);
    let mut data = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    data[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    blur_rgba8_premul_in_place(&mut data, w, h, 2, 1.2).unwrap();

    assert!(data.chunks_exact(4).filter(|px| px[3] != 0).count() > 1);
    let sum_a: u32 = data.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 4);
}

#[test]
fn rejects_bad_sizes_and_sigma() {
    let mut data = vec![0u8; 12];
    assert!(blur_rgba8_premul_in_place(&mut data, 2, 2, 1, 1.0).is_err());
    let mut data = vec![0u8; 16];
    assert!(blur_rgba8_premul_in_place(&mut data, 2, 2, 1, 0.0).is_err());
}

#[test]
fn params_scale_with_surface() {
    assert_eq!(blur_params(0.0, 1.0), None);
    let (r, sigma) = blur_params(10.0, 0.5).unwrap();
    assert_eq!(r, 5);
    assert!((sigma - 2.5).abs() < 1e-6);
    assert_eq!(blur_params(10_000.0, 1.0).unwrap().0, MAX_BLUR_RADIUS);
}
