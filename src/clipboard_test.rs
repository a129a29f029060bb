#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{Measurement, MeasurementKind, Shape, ShapeGeometry, ShapeStyle};
use crate::geometry::{Point, Rect};

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn store_with_mixed_selection() -> (EntityStore, EntityId, EntityId) {
    let mut store = EntityStore::new();
    let rect = store.add_shape(Shape::new(
        0,
        ShapeGeometry::Rectangle { x: 10.0, y: 10.0, width: 20.0, height: 20.0 },
        ShapeStyle::default(),
    ));
    let comment = store.add_measurement(Measurement::new(
        0,
        MeasurementKind::Comment { tip: pt(0.0, 0.0), frame: Rect::new(50.0, 50.0, 160.0, 60.0), text: "a".into() },
    ));
    store.set_selection([rect, comment]);
    (store, rect, comment)
}

#[test]
fn copy_empty_selection_keeps_previous_contents() {
    let (mut store, _, _) = store_with_mixed_selection();
    let mut clip = Clipboard::new();
    assert_eq!(clip.copy(&store), 2);
    store.clear_selection();
    assert_eq!(clip.copy(&store), 0);
    assert_eq!(clip.items().len(), 2);
}

#[test]
fn paste_offsets_every_point_and_retargets_page() {
    let (mut store, _, _) = store_with_mixed_selection();
    let mut clip = Clipboard::new();
    clip.copy(&store);

    let ids = clip.paste(&mut store, 3, 20.0);
    assert_eq!(ids.len(), 2);

    let shape = store.shape(&ids[0]).unwrap();
    assert_eq!(shape.page_index, 3);
    assert_eq!(shape.frame(), Some(Rect::new(30.0, 30.0, 20.0, 20.0)));

    let comment = store.measurement(&ids[1]).unwrap();
    assert_eq!(comment.page_index, 3);
    match &comment.kind {
        MeasurementKind::Comment { tip, frame, text } => {
            assert_eq!(*tip, pt(20.0, 20.0));
            assert_eq!(*frame, Rect::new(70.0, 70.0, 160.0, 60.0));
            assert_eq!(text, "a");
        }
        other => panic!("expected comment, got {other:?}"),
    }
}

#[test]
fn paste_never_mutates_originals() {
    let (mut store, rect, comment) = store_with_mixed_selection();
    let original_rect = store.shape(&rect).cloned();
    let original_comment = store.measurement(&comment).cloned();
    let mut clip = Clipboard::new();
    clip.copy(&store);
    clip.paste(&mut store, 0, 20.0);
    assert_eq!(store.shape(&rect).cloned(), original_rect);
    assert_eq!(store.measurement(&comment).cloned(), original_comment);
}

#[test]
fn paste_ids_are_fresh_and_selected() {
    let (mut store, rect, comment) = store_with_mixed_selection();
    let mut clip = Clipboard::new();
    clip.copy(&store);
    let first = clip.paste(&mut store, 0, 20.0);
    let second = clip.paste(&mut store, 0, 20.0);

    for id in first.iter().chain(&second) {
        assert_ne!(*id, rect);
        assert_ne!(*id, comment);
    }
    assert!(first.iter().all(|id| !second.contains(id)));
    assert_eq!(store.selection().ids(), second.as_slice());
    assert_eq!(store.len(), 6);
    assert_eq!(clip.items().len(), 2);
}

#[test]
fn paste_moves_point_sequences_and_count() {
    let mut store = EntityStore::new();
    let area = store.add_measurement(Measurement::new(
        0,
        MeasurementKind::Area { points: vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0)] },
    ));
    let count = store.add_measurement(Measurement::new(0, MeasurementKind::Count { point: pt(5.0, 5.0) }));
    store.set_selection([area, count]);
    let mut clip = Clipboard::new();
    clip.copy(&store);
    let ids = clip.paste(&mut store, 0, 5.0);

    assert_eq!(store.measurement(&ids[0]).unwrap().vertices(), &[pt(5.0, 5.0), pt(15.0, 5.0), pt(15.0, 15.0)]);
    assert_eq!(store.measurement(&ids[1]).unwrap().kind, MeasurementKind::Count { point: pt(10.0, 10.0) });
}

#[test]
fn cut_removes_selection_but_keeps_clipboard() {
    let (mut store, rect, comment) = store_with_mixed_selection();
    let mut clip = Clipboard::new();
    let removed = clip.cut(&mut store);
    assert_eq!(removed, vec![rect, comment]);
    assert!(store.is_empty());
    assert!(store.selection().is_empty());
    assert_eq!(clip.items().len(), 2);
}

#[test]
fn paste_empty_clipboard_changes_nothing() {
    let (mut store, rect, comment) = store_with_mixed_selection();
    let clip = Clipboard::new();
    assert!(clip.paste(&mut store, 0, 20.0).is_empty());
    assert_eq!(store.selection().ids(), &[rect, comment]);
    assert_eq!(store.len(), 2);
}
