use super::*;
use serde_json::json;

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: ColorDef = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, ColorDef::rgba(1.0, 0.0, 0.0, 1.0));

    let c: ColorDef = serde_json::from_value(json!("00ff0080")).unwrap();
    assert_eq!(c.to_rgba8(), [0, 255, 0, 128]);

    assert!(serde_json::from_value::<ColorDef>(json!("#fff")).is_err());
    assert!(serde_json::from_value::<ColorDef>(json!("#gg0000")).is_err());
}

#[test]
fn parses_object_and_array() {
    let c: ColorDef = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, ColorDef::rgba(0.25, 0.5, 0.75, 1.0));

    let c: ColorDef = serde_json::from_value(json!([0.25, 0.5, 0.75, 0.9])).unwrap();
    assert_eq!(c, ColorDef::rgba(0.25, 0.5, 0.75, 0.9));

    assert!(serde_json::from_value::<ColorDef>(json!([1.0, 0.0])).is_err());
}

#[test]
fn serialized_form_reads_back() {
    let c = ColorDef::rgba(0.1, 0.2, 0.3, 0.4);
    let back: ColorDef = serde_json::from_str(&serde_json::to_string(&c).unwrap()).unwrap();
    assert_eq!(back, c);
}

#[test]
fn premul_conversion_and_opacity() {
    let c = ColorDef::rgba(1.0, 0.5, 0.0, 1.0).with_opacity(0.5);
    let p = c.to_rgba8_premul();
    assert_eq!(p.a, 128);
    assert_eq!(p.r, 128);
    assert_eq!(p.b, 0);
}
