use super::*;
use crate::assets::color::ColorDef;
use crate::draw::path::StrokeTool;
use crate::foundation::core::Point;

fn snap(n: usize) -> Snapshot {
    Snapshot {
        elements: Vec::new(),
        paths: (0..n)
            .map(|i| {
                DrawingPath::new(
                    StrokeTool::Pen,
                    ColorDef::BLACK,
                    4.0,
                    vec![Point::new(i as f64, 0.0)],
                )
            })
            .collect(),
    }
}

#[test]
fn empty_history_is_a_no_op() {
    let mut h = History::new(None);
    assert!(h.undo(snap(0)).is_none());
    assert!(h.redo(snap(0)).is_none());
    assert!(!h.can_undo() && !h.can_redo());
}

#[test]
fn undo_then_redo_swaps_snapshots() {
    let mut h = History::new(None);
    h.push(snap(0));
    let restored = h.undo(snap(1)).unwrap();
    assert_eq!(restored, snap(0));
    assert!(h.can_redo());
    let again = h.redo(restored).unwrap();
    assert_eq!(again, snap(1));
    assert_eq!(h.undo_len(), 1);
}

#[test]
fn push_clears_redo() {
    let mut h = History::new(None);
    h.push(snap(0));
    h.undo(snap(1)).unwrap();
    h.push(snap(0));
    assert!(!h.can_redo());
}

#[test]
fn depth_limit_drops_oldest() {
    let mut h = History::new(Some(2));
    for n in 0..4 {
        h.push(snap(n));
    }
    assert_eq!(h.undo_len(), 2);
    assert_eq!(h.undo(snap(4)).unwrap(), snap(3));
    assert_eq!(h.undo(snap(3)).unwrap(), snap(2));
    assert!(h.undo(snap(2)).is_none());
}
