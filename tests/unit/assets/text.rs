use super::*;

#[test]
fn rejects_invalid_size() {
    let mut engine = TextLayoutEngine::new();
    let Err(err) =
        engine.layout_plain("hi", b"", 0.0, TextBrushRgba8::default(), None, TextAlign::Start)
    else {
        panic!("zero size must be rejected");
    };
    assert!(matches!(err, StoryError::Validation(_)));
}

#[test]
fn rejects_bytes_without_fonts() {
    let mut engine = TextLayoutEngine::new();
    let Err(err) = engine.layout_plain(
        "hi",
        b"definitely not a font",
        24.0,
        TextBrushRgba8::default(),
        None,
        TextAlign::Center,
    ) else {
        panic!("non-font bytes must be rejected");
    };
    assert!(matches!(err, StoryError::Decode(_)));
}

#[test]
fn align_maps_to_parley() {
    assert!(matches!(TextAlign::Start.to_parley(), parley::Alignment::Start));
    assert!(matches!(TextAlign::Center.to_parley(), parley::Alignment::Center));
    assert!(matches!(TextAlign::End.to_parley(), parley::Alignment::End));
    assert_eq!(TextAlign::default(), TextAlign::Center);
}
