use super::*;

#[test]
fn idle_session_ignores_points() {
    let mut s = StrokeSession::new();
    assert!(!s.push_point(Point::new(1.0, 1.0)));
    assert!(s.end().is_none());
}

#[test]
fn points_are_deduplicated_and_committed_on_end() {
    let mut s = StrokeSession::new();
    s.begin(StrokeTool::Pen, ColorDef::BLACK, 6.0);
    assert!(s.push_point(Point::new(0.0, 0.0)));
    assert!(!s.push_point(Point::new(0.2, 0.2)));
    assert!(s.push_point(Point::new(3.0, 0.0)));
    assert!(!s.push_point(Point::new(f64::NAN, 0.0)));
    assert_eq!(s.live_points().len(), 2);

    let path = s.end().unwrap();
    assert_eq!(path.points.len(), 2);
    assert_eq!(path.tool, StrokeTool::Pen);
    assert!(!s.is_active());
    assert!(s.live_points().is_empty());
}

#[test]
fn empty_stroke_commits_nothing_and_cancel_discards() {
    let mut s = StrokeSession::new();
    s.begin(StrokeTool::Neon, ColorDef::WHITE, 10.0);
    assert!(s.live_path().is_none());
    assert!(s.end().is_none());

    s.begin(StrokeTool::Eraser, ColorDef::WHITE, 20.0);
    s.push_point(Point::new(1.0, 1.0));
    assert!(s.live_path().is_some());
    s.cancel();
    assert!(s.end().is_none());
}
