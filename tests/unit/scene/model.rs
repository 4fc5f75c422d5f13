use super::*;

const DOC: &str = r##"{
  "viewport": { "width": 540, "height": 960 },
  "background": { "type": "gradient", "top": "#102030", "bottom": [0, 0, 0] },
  "time_s": 1.5,
  "assets": {
    "star": { "kind": "sticker", "source": "star.svg" },
    "inter": { "kind": "font", "source": "Inter.ttf" },
    "teal": { "kind": "lut", "source": "teal.cube" }
  },
  "elements": [
    { "type": "sticker", "asset": "star", "width": 200, "height": 200,
      "transform": { "translate_x": 300, "translate_y": 400, "scale": 1.5, "rotation_deg": 10 } },
    { "type": "text", "content": "hello", "font": "inter", "z_index": 7 }
  ],
  "paths": [
    { "points": [[10, 10], [20, 20], [30, 10]], "color": "#ff0000", "width": 6, "tool": "pen", "opacity": 1 }
  ],
  "filter": { "preset": "warm", "intensity": 0.5 },
  "adjustments": { "brightness": 0.2 },
  "lut": { "asset": "teal", "intensity": 0.8 }
}"##;

#[test]
fn parses_and_builds_store_without_history() {
    let doc = SceneDoc::from_json(DOC).unwrap();
    doc.validate().unwrap();
    let store = doc.to_store(HistoryOpts::default()).unwrap();
    let st = store.state();

    assert_eq!(st.elements.len(), 2);
    assert_eq!(st.elements[0].transform.scale, 1.5);
    assert_eq!(st.elements[1].z_index, 7);
    assert_eq!(st.paths.len(), 1);
    assert_eq!(st.filter.filter.as_ref().unwrap().preset, "warm");
    assert!((st.filter.adjustments.get(Adjustment::Brightness) - 0.2).abs() < 1e-6);
    assert_eq!(st.filter.lut.as_ref().unwrap().asset, "teal");
    assert_eq!(st.playback.time_s, 1.5);
    assert!(matches!(st.background, Background::Gradient { .. }));
    assert!(!store.can_undo());
}

#[test]
fn missing_or_mistyped_assets_are_rejected() {
    let mut doc = SceneDoc::from_json(DOC).unwrap();
    doc.assets.remove("star");
    assert!(matches!(doc.validate(), Err(StoryError::Validation(_))));

    let mut doc = SceneDoc::from_json(DOC).unwrap();
    doc.assets.get_mut("teal").unwrap().kind = AssetKind::Font;
    assert!(doc.validate().is_err());
}

#[test]
fn unknown_preset_and_bad_viewport_are_rejected() {
    let mut doc = SceneDoc::from_json(DOC).unwrap();
    doc.filter = Some(ActiveFilter::new("does-not-exist", 1.0));
    assert!(doc.validate().is_err());

    let mut doc = SceneDoc::from_json(DOC).unwrap();
    doc.viewport = Some(Viewport {
        width: 0.0,
        height: 10.0,
    });
    assert!(doc.validate().is_err());
}

#[test]
fn empty_document_is_valid() {
    let doc = SceneDoc::from_json("{}").unwrap();
    let store = doc.to_store(HistoryOpts::default()).unwrap();
    assert!(store.state().elements.is_empty());
    assert_eq!(store.state().background, Background::default());
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(
        SceneDoc::from_json("{ \"elements\": 3 }"),
        Err(StoryError::Serde(_))
    ));
}

#[test]
fn json_roundtrip_preserves_document() {
    let doc = SceneDoc::from_json(DOC).unwrap();
    let back = SceneDoc::from_json(&doc.to_json().unwrap()).unwrap();
    assert_eq!(doc, back);
}

#[test]
fn loads_asset_files_relative_to_root() {
    let dir = std::env::temp_dir().join(format!("storycanvas-model-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("teal.cube"), "LUT_3D_SIZE 2\n").unwrap();

    let doc = SceneDoc {
        assets: BTreeMap::from([(
            "teal".to_owned(),
            SceneAsset {
                kind: AssetKind::Lut,
                source: "teal.cube".to_owned(),
            },
        )]),
        ..SceneDoc::default()
    };
    let reg = doc.load_assets(&dir).unwrap();
    assert_eq!(&*reg.bytes("teal").unwrap(), b"LUT_3D_SIZE 2\n");

    let missing = SceneDoc {
        media: Some(MediaRef {
            uri: "nope.png".to_owned(),
            kind: MediaKind::Image,
            fit: Default::default(),
        }),
        ..SceneDoc::default()
    };
    assert!(missing.load_media(&dir).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
