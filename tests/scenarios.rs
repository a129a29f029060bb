//! End-to-end editing sessions driven through the public engine API.

#![allow(clippy::float_cmp)]

use proptest::prelude::*;

use takeoff::camera::Camera;
use takeoff::doc::{MeasurementKind, ProjectData, ShapeGeometry};
use takeoff::engine::{Action, EngineCore};
use takeoff::geometry::{Point, Rect, distance, polygon_area, to_real_area};
use takeoff::input::{Button, Key, Modifiers, Tool};
use takeoff::render::SurfaceKind;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn none() -> Modifiers {
    Modifiers::default()
}

fn click(core: &mut EngineCore, p: Point) {
    core.on_pointer_down(p, Button::Primary, none());
    core.on_pointer_up(p, Button::Primary, none());
}

fn drag(core: &mut EngineCore, from: Point, to: Point) {
    core.on_pointer_down(from, Button::Primary, none());
    core.on_pointer_move(to, none());
    core.on_pointer_up(to, Button::Primary, none());
}

fn draw(core: &mut EngineCore, tool: Tool, from: Point, to: Point) {
    core.set_tool(tool);
    drag(core, from, to);
}

// =============================================================
// Geometry properties
// =============================================================

#[test]
fn unit_square_has_unit_area() {
    let square = [pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)];
    assert_eq!(polygon_area(&square).unwrap(), 1.0);
}

#[test]
fn doubling_scale_quarters_real_area() {
    let a = 1234.5;
    let s = 3.0;
    assert!((to_real_area(a, 2.0 * s) - to_real_area(a, s) / 4.0).abs() < 1e-12);
}

proptest! {
    #[test]
    fn distance_is_symmetric(ax in -1e3..1e3f64, ay in -1e3..1e3f64, bx in -1e3..1e3f64, by in -1e3..1e3f64) {
        prop_assert_eq!(distance(pt(ax, ay), pt(bx, by)), distance(pt(bx, by), pt(ax, ay)));
    }
}

// =============================================================
// Editing sessions
// =============================================================

#[test]
fn draw_undo_redo_round_trip() {
    let mut core = EngineCore::new();
    draw(&mut core, Tool::Rectangle, pt(10.0, 10.0), pt(110.0, 60.0));
    let shape = core.store.shapes()[0].clone();
    assert_eq!(shape.geometry, ShapeGeometry::Rectangle { x: 10.0, y: 10.0, width: 100.0, height: 50.0 });
    assert_eq!(shape.rotation, 0.0);

    core.undo();
    assert!(core.store.is_empty());
    core.redo();
    assert_eq!(core.store.shapes(), &[shape]);
}

#[test]
fn calibrated_length_reads_two_meters() {
    let mut core = EngineCore::new();
    core.set_page_scale(0, 50.0, "m").unwrap();
    core.set_tool(Tool::Length);
    click(&mut core, pt(0.0, 0.0));
    click(&mut core, pt(100.0, 0.0));
    let scene = core.scene(SurfaceKind::UnboundedVector);
    assert!(scene.texts().any(|t| t == "2.00 m"));
}

#[test]
fn calibrate_dialog_flow() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Calibrate);
    click(&mut core, pt(0.0, 0.0));
    core.on_pointer_down(pt(0.0, 120.0), Button::Primary, none());
    let actions = core.on_pointer_up(pt(0.0, 120.0), Button::Primary, none());
    let Some(Action::CalibrationRequested { page_index, page_distance }) =
        actions.iter().find(|a| matches!(a, Action::CalibrationRequested { .. })).cloned()
    else {
        panic!("expected calibration request in {actions:?}");
    };
    // The host dialog says the captured line is 12 ft.
    core.set_page_scale(page_index, page_distance / 12.0, "ft").unwrap();

    core.set_tool(Tool::Length);
    click(&mut core, pt(0.0, 0.0));
    click(&mut core, pt(0.0, 60.0));
    let scene = core.scene(SurfaceKind::UnboundedVector);
    assert!(scene.texts().any(|t| t == "6.00 ft"));
}

#[test]
fn delete_one_selected_rectangle() {
    let mut core = EngineCore::new();
    draw(&mut core, Tool::Rectangle, pt(0.0, 0.0), pt(50.0, 50.0));
    let before = core.history.len();
    core.on_key_down(&Key("Delete".into()), none());
    assert!(core.store.is_empty());
    assert!(core.selection().is_empty());
    assert_eq!(core.history.len(), before + 1);
}

#[test]
fn east_past_west_yields_valid_rectangle() {
    let mut core = EngineCore::new();
    draw(&mut core, Tool::Rectangle, pt(0.0, 0.0), pt(100.0, 50.0));
    // East handle sits at (100, 25); drag it to x = -50.
    drag(&mut core, pt(100.0, 25.0), pt(-50.0, 25.0));
    assert_eq!(core.store.shapes()[0].frame(), Some(Rect::new(-50.0, 0.0, 50.0, 50.0)));
}

#[test]
fn marquee_includes_contained_and_excludes_disjoint() {
    let mut core = EngineCore::new();
    draw(&mut core, Tool::Rectangle, pt(10.0, 10.0), pt(40.0, 40.0));
    draw(&mut core, Tool::Rectangle, pt(300.0, 300.0), pt(340.0, 340.0));
    let near = core.store.shapes()[0].id;
    core.escape();

    drag(&mut core, pt(0.0, 0.0), pt(100.0, 100.0));
    assert_eq!(core.selection(), &[near]);
}

#[test]
fn paste_never_mutates_originals() {
    let mut core = EngineCore::new();
    draw(&mut core, Tool::Line, pt(0.0, 0.0), pt(10.0, 10.0));
    core.set_tool(Tool::Count);
    click(&mut core, pt(50.0, 50.0));
    let all: Vec<_> = core.store.shapes().iter().map(|s| s.id).chain(core.store.measurements().iter().map(|m| m.id)).collect();
    core.store.set_selection(all);
    let originals = core.store.snapshot();
    let ctrl = Modifiers { ctrl: true, ..Default::default() };

    core.on_key_down(&Key("c".into()), ctrl);
    core.on_key_down(&Key("v".into()), ctrl);
    core.on_key_down(&Key("v".into()), ctrl);

    assert_eq!(core.store.len(), 6);
    for s in &originals.shapes {
        assert_eq!(core.store.shape(&s.id), Some(s));
    }
    for m in &originals.measurements {
        assert_eq!(core.store.measurement(&m.id), Some(m));
    }
    let mut ids: Vec<_> = core.store.shapes().iter().map(|s| s.id).collect();
    ids.extend(core.store.measurements().iter().map(|m| m.id));
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 6);
}

#[test]
fn zoomed_session_keeps_screen_constant_targets() {
    let mut core = EngineCore::new();
    core.set_camera(Camera::new(0.0, 0.0, 4.0));
    draw(&mut core, Tool::Rectangle, pt(0.0, 0.0), pt(100.0, 50.0));
    // At 4x the 6px slop is 1.5 page units; the rotate handle is 6 units up.
    drag(&mut core, pt(50.0, -6.0), pt(150.0, 25.0));
    assert!((core.store.shapes()[0].rotation - 90.0).abs() < 1e-9);
}

#[test]
fn project_export_import_round_trip() {
    let mut core = EngineCore::new();
    core.set_page_scale(1, 25.4, "in").unwrap();
    core.set_page(1, 1000.0, 800.0);
    draw(&mut core, Tool::Circle, pt(0.0, 0.0), pt(20.0, 20.0));
    core.set_tool(Tool::Area);
    for p in [pt(0.0, 0.0), pt(30.0, 0.0), pt(30.0, 30.0)] {
        click(&mut core, p);
    }
    core.finalize();

    let json = serde_json::to_string(&core.project()).unwrap();
    let data: ProjectData = serde_json::from_str(&json).unwrap();

    let mut other = EngineCore::new();
    other.load_project(data);
    assert_eq!(other.project(), core.project());
    assert_eq!(other.store.calibration(1).unit, "in");
    let MeasurementKind::Area { points } = &other.store.measurements()[0].kind else {
        panic!("expected area");
    };
    assert_eq!(points.len(), 3);
}

// =============================================================
// History properties
// =============================================================

proptest! {
    /// N completed actions then N undos return to the starting document.
    #[test]
    fn n_actions_then_n_undos_restore_start(
        boxes in proptest::collection::vec((0u32..500, 0u32..500, 10u32..100, 10u32..100), 1..8),
    ) {
        let mut core = EngineCore::new();
        let start = core.store.snapshot();
        for (x, y, w, h) in &boxes {
            let (x, y) = (f64::from(*x), f64::from(*y));
            draw(&mut core, Tool::Rectangle, pt(x, y), pt(x + f64::from(*w), y + f64::from(*h)));
        }
        prop_assert_eq!(core.store.shapes().len(), boxes.len());
        let end = core.store.snapshot();
        for _ in &boxes {
            core.undo();
        }
        prop_assert_eq!(core.store.snapshot(), start);
        for _ in &boxes {
            core.redo();
        }
        prop_assert_eq!(core.store.snapshot(), end);
    }
}
