use super::*;
use crate::scene::element::{ElementKind, ImagePayload, Transform};

fn el(id: u64, z: i32, timestamp: Option<f64>) -> CanvasElement {
    CanvasElement {
        id: ElementId(id),
        transform: Transform::default(),
        z_index: z,
        opacity: 1.0,
        timestamp,
        kind: ElementKind::Image(ImagePayload {
            uri: format!("img{id}"),
            width: 10.0,
            height: 10.0,
        }),
    }
}

#[test]
fn draw_order_sorts_by_z_and_is_stable() {
    let state = EditorState {
        elements: vec![el(1, 5, None), el(2, -1, None), el(3, 5, None)],
        ..EditorState::default()
    };
    let ids: Vec<u64> = state.draw_order().iter().map(|e| e.id.0).collect();
    assert_eq!(ids, vec![2, 1, 3]);
    assert_eq!(state.max_z(), Some(5));
}

#[test]
fn draw_order_hides_out_of_window_video_elements() {
    let mut state = EditorState {
        elements: vec![el(1, 0, Some(10.0)), el(2, 0, None)],
        media: Some(MediaRef {
            uri: "clip.mp4".to_owned(),
            kind: MediaKind::Video,
            fit: FitMode::Cover,
        }),
        ..EditorState::default()
    };
    assert_eq!(state.draw_order().len(), 1);
    state.playback.time_s = 11.0;
    assert_eq!(state.draw_order().len(), 2);
}

#[test]
fn background_json_forms() {
    let bg: Background =
        serde_json::from_str(r##"{"type":"gradient","top":"#000000","bottom":"#ffffff"}"##)
            .unwrap();
    assert!(matches!(bg, Background::Gradient { .. }));
    assert_eq!(Background::default(), Background::Solid { color: ColorDef::BLACK });
}
