use super::*;

#[test]
fn straight_conversion_unpremultiplies() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![64, 0, 0, 128, 10, 20, 30, 255],
        premultiplied: true,
    };
    let straight = frame.to_straight_rgba();
    assert_eq!(straight[3], 128);
    assert!((i32::from(straight[0]) - 128).abs() <= 1);
    assert_eq!(&straight[4..], &[10, 20, 30, 255]);
}

#[test]
fn straight_frames_are_copied_verbatim() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: false,
    };
    assert_eq!(frame.to_straight_rgba(), frame.data);
}

#[test]
fn pixel_lookup_checks_bounds() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: true,
    };
    assert_eq!(frame.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(frame.pixel(2, 0), None);
    assert_eq!(frame.pixel(0, 1), None);
}
