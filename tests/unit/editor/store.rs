use super::*;
use crate::assets::color::ColorDef;
use crate::assets::media::MediaKind;
use crate::draw::path::StrokeTool;
use crate::foundation::core::Point;
use crate::geometry::surface::FitMode;
use crate::grading::adjust::Adjustment;
use crate::scene::element::{ElementKind, StickerPayload};

fn draft(asset: &str) -> ElementDraft {
    ElementDraft::new(ElementKind::Sticker(StickerPayload {
        asset: asset.to_owned(),
        width: 100.0,
        height: 100.0,
    }))
}

fn stroke(x: f64) -> DrawingPath {
    DrawingPath::new(
        StrokeTool::Pen,
        ColorDef::BLACK,
        4.0,
        vec![Point::new(x, 0.0), Point::new(x, 10.0)],
    )
}

#[test]
fn ids_are_monotonic_and_z_stacks_up() {
    let mut store = EditorStore::default();
    let a = store.add_element(draft("a")).unwrap();
    let b = store.add_element(draft("b")).unwrap();
    assert!(b.0 > a.0);
    assert_eq!(store.state().element(a).unwrap().z_index, 0);
    assert_eq!(store.state().element(b).unwrap().z_index, 1);
}

#[test]
fn three_adds_two_undos_one_redo() {
    let mut store = EditorStore::default();
    let first = store.add_element(draft("first")).unwrap();
    let second = store.add_element(draft("second")).unwrap();
    store.add_element(draft("third")).unwrap();
    let first_el = store.state().element(first).unwrap().clone();

    assert!(store.undo());
    assert!(store.undo());
    assert_eq!(store.state().elements, vec![first_el]);

    assert!(store.redo());
    assert_eq!(store.state().elements.len(), 2);
    assert!(store.state().element(second).is_some());
}

#[test]
fn undo_redo_round_trip_over_mixed_operations() {
    let mut store = EditorStore::default();
    let keep = store.add_element(draft("keep")).unwrap();
    let before = (store.state().elements.clone(), store.state().paths.clone());

    let temp = store.add_element(draft("temp")).unwrap();
    store.add_drawing_path(stroke(1.0));
    assert!(store.remove_element(temp));
    store.add_drawing_path(stroke(2.0));
    assert!(store.remove_element(keep));
    let after = (store.state().elements.clone(), store.state().paths.clone());

    for _ in 0..5 {
        assert!(store.undo());
    }
    assert_eq!((store.state().elements.clone(), store.state().paths.clone()), before);
    for _ in 0..5 {
        assert!(store.redo());
    }
    assert_eq!((store.state().elements.clone(), store.state().paths.clone()), after);
    assert!(!store.redo());
}

#[test]
fn updates_do_not_push_history_by_default() {
    let mut store = EditorStore::default();
    let id = store.add_element(draft("a")).unwrap();
    store
        .commit_transform(id, Transform::at(10.0, 10.0))
        .unwrap();
    assert!(store.undo());
    assert!(store.state().elements.is_empty());
    assert!(!store.can_undo());
}

#[test]
fn transform_commits_can_opt_into_history() {
    let mut store = EditorStore::new(HistoryOpts {
        record_transform_commits: true,
        ..HistoryOpts::default()
    });
    let id = store.add_element(draft("a")).unwrap();
    store.commit_transform(id, Transform::at(10.0, 10.0)).unwrap();
    assert!(store.undo());
    assert_eq!(
        store.state().element(id).unwrap().transform,
        Transform::default()
    );
}

#[test]
fn update_rejects_unknown_and_non_finite() {
    let mut store = EditorStore::default();
    let id = store.add_element(draft("a")).unwrap();
    assert!(store.commit_transform(ElementId(999), Transform::default()).is_err());
    assert!(
        store
            .commit_transform(id, Transform::at(f64::NAN, 0.0))
            .is_err()
    );
    assert!(
        store
            .add_element(draft("b").with_transform(Transform::at(f64::INFINITY, 0.0)))
            .is_err()
    );
}

#[test]
fn selection_follows_element_lifetime() {
    let mut store = EditorStore::default();
    let id = store.add_element(draft("a")).unwrap();
    assert!(store.select_element(Some(id)));
    assert!(!store.select_element(Some(ElementId(42))));
    assert_eq!(store.state().selected, Some(id));

    store.undo();
    assert_eq!(store.state().selected, None);
    store.redo();
    assert!(store.select_element(Some(id)));
    store.remove_element(id);
    assert_eq!(store.state().selected, None);
}

#[test]
fn stroke_undo_and_clear_are_undoable() {
    let mut store = EditorStore::default();
    store.add_drawing_path(stroke(1.0));
    store.add_drawing_path(stroke(2.0));
    assert_eq!(store.undo_last_path(), Some(stroke(2.0)));
    assert_eq!(store.clear_drawing(), 1);
    assert!(store.state().paths.is_empty());
    assert!(store.undo());
    assert_eq!(store.state().paths, vec![stroke(1.0)]);
    assert_eq!(store.clear_drawing(), 1);
    assert_eq!(store.clear_drawing(), 0);
    assert!(store.undo_last_path().is_none());
}

#[test]
fn bring_to_front_raises_above_max() {
    let mut store = EditorStore::default();
    let a = store.add_element(draft("a")).unwrap();
    let b = store.add_element(draft("b")).unwrap();
    store.bring_to_front(a).unwrap();
    assert!(store.state().element(a).unwrap().z_index > store.state().element(b).unwrap().z_index);
    let z = store.state().element(a).unwrap().z_index;
    store.bring_to_front(a).unwrap();
    assert_eq!(store.state().element(a).unwrap().z_index, z);
}

#[test]
fn filter_and_adjustment_state() {
    let mut store = EditorStore::default();
    store.set_filter(Some(ActiveFilter::new("sepia", 0.5)));
    store.set_adjustments(&AdjustmentsPatch::new().with(Adjustment::Contrast, 0.3));
    store.set_adjustments(&AdjustmentsPatch::new().with(Adjustment::Vignette, 2.0));
    assert_eq!(store.state().filter.adjustments.contrast, 0.3);
    assert_eq!(store.state().filter.adjustments.vignette, 1.0);
    store.reset_adjustments();
    assert!(store.state().filter.adjustments.is_neutral());
    assert!(store.state().filter.filter.is_some());
    store.set_lut(Some(LutSelection::new("lut", 0.8)));
    assert_eq!(store.state().filter.lut.as_ref().unwrap().intensity, 0.8);
}

#[test]
fn playback_clamps_and_toggles() {
    let mut store = EditorStore::default();
    store.set_video_duration(10.0);
    store.set_video_time(12.0);
    assert_eq!(store.state().playback.time_s, 10.0);
    store.set_video_time(-1.0);
    assert_eq!(store.state().playback.time_s, 0.0);
    store.set_video_time(f64::NAN);
    assert_eq!(store.state().playback.time_s, 0.0);
    assert!(store.toggle_play());
    assert!(!store.toggle_play());
}

#[test]
fn reset_optionally_keeps_media() {
    let media = MediaRef {
        uri: "clip.mp4".to_owned(),
        kind: MediaKind::Video,
        fit: FitMode::Cover,
    };
    let mut store = EditorStore::default();
    store.set_media(Some(media.clone()));
    store.set_video_duration(8.0);
    store.set_video_time(3.0);
    let id = store.add_element(draft("a")).unwrap();
    store.add_drawing_path(stroke(0.0));

    store.reset(true);
    assert_eq!(store.state().media, Some(media));
    assert_eq!(store.state().playback.time_s, 0.0);
    assert_eq!(store.state().playback.duration_s, 8.0);
    assert!(store.state().elements.is_empty() && store.state().paths.is_empty());
    assert!(!store.can_undo());

    let next = store.add_element(draft("b")).unwrap();
    assert!(next.0 > id.0);

    store.reset(false);
    assert_eq!(store.state(), &EditorState::default());
}
